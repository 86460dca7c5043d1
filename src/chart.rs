use serde::{Deserialize, Serialize};

use crate::types::series::{NormalizedSeries, SentimentCategory, ValueDomain};

const X_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    StackedBar,
    MultiLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub name: String,
    pub category: SentimentCategory,
    pub color: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

/// Chart description handed to the web front-end, which does the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub traces: Vec<Trace>,
}

pub fn category_color(category: SentimentCategory) -> &'static str {
    match category {
        SentimentCategory::Positive => "green",
        SentimentCategory::Negative => "red",
        SentimentCategory::Neutral => "blue",
    }
}

fn title_case(category: SentimentCategory) -> String {
    let name = category.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ChartSpec {
    /// Share series become a stacked bar on a 0..1 axis; count series
    /// become one line per category.
    pub fn from_series(series: &NormalizedSeries) -> Self {
        let x: Vec<String> = series
            .timestamps()
            .map(|ts| ts.format(X_FORMAT).to_string())
            .collect();

        let traces = SentimentCategory::ALL
            .into_iter()
            .map(|category| Trace {
                name: title_case(category),
                category,
                color: category_color(category).to_string(),
                x: x.clone(),
                y: series.column(category),
            })
            .collect();

        let (kind, y_axis) = match series.domain() {
            ValueDomain::Share => (
                ChartKind::StackedBar,
                Axis {
                    title: "Compound Score".to_string(),
                    range: Some([0.0, 1.0]),
                    dtick: Some(0.1),
                },
            ),
            ValueDomain::Count => (
                ChartKind::MultiLine,
                Axis {
                    title: "Count".to_string(),
                    range: None,
                    dtick: None,
                },
            ),
        };

        ChartSpec {
            kind,
            x_axis: Axis {
                title: "Date".to_string(),
                range: None,
                dtick: None,
            },
            y_axis,
            traces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::{normalize_batch, normalize_stream};
    use crate::types::batch::BatchRecord;
    use crate::types::stream::StreamDocument;

    fn batch_series() -> NormalizedSeries {
        normalize_batch(&[
            BatchRecord {
                date: Some("2023-01-01".to_string()),
                pos: Some(0.6),
                neg: Some(0.1),
                neu: None,
            },
            BatchRecord {
                date: Some("2023-01-02".to_string()),
                neu: Some(0.9),
                ..Default::default()
            },
        ])
        .unwrap()
    }

    #[test]
    fn share_series_is_stacked_bar() {
        let chart = ChartSpec::from_series(&batch_series());
        assert_eq!(chart.kind, ChartKind::StackedBar);
        assert_eq!(chart.y_axis.title, "Compound Score");
        assert_eq!(chart.y_axis.range, Some([0.0, 1.0]));
        assert_eq!(chart.y_axis.dtick, Some(0.1));
    }

    #[test]
    fn traces_cover_every_category_in_order() {
        let chart = ChartSpec::from_series(&batch_series());
        let names: Vec<_> = chart.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Positive", "Negative", "Neutral"]);
        let colors: Vec<_> = chart.traces.iter().map(|t| t.color.as_str()).collect();
        assert_eq!(colors, vec!["green", "red", "blue"]);
        for trace in &chart.traces {
            assert_eq!(trace.x, vec!["2023-01-01T00:00:00", "2023-01-02T00:00:00"]);
            assert_eq!(trace.y.len(), 2);
        }
        assert_eq!(chart.traces[2].y, vec![0.0, 0.9]);
    }

    #[test]
    fn count_series_is_multi_line() {
        let doc: StreamDocument = serde_json::from_str(
            r#"{"_id":"d1","sentiment_data":{"2023-01-01T09:00":{"positive_count":1,"negative_count":0,"neutral_count":0}}}"#,
        )
        .unwrap();
        let chart = ChartSpec::from_series(&normalize_stream(&[doc]).unwrap());
        assert_eq!(chart.kind, ChartKind::MultiLine);
        assert_eq!(chart.y_axis.title, "Count");
        assert_eq!(chart.y_axis.range, None);
        assert_eq!(chart.traces[0].y, vec![1.0]);
    }

    #[test]
    fn empty_series_has_empty_traces() {
        let chart = ChartSpec::from_series(&NormalizedSeries::empty(ValueDomain::Count));
        assert_eq!(chart.traces.len(), 3);
        assert!(chart.traces.iter().all(|t| t.x.is_empty() && t.y.is_empty()));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ChartSpec::from_series(&batch_series())).unwrap();
        assert_eq!(json["kind"], "stacked_bar");
        assert_eq!(json["yAxis"]["title"], "Compound Score");
        assert!(json["xAxis"].get("range").is_none());
    }
}
