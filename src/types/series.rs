use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl SentimentCategory {
    /// Display order used by every chart and keyword panel.
    pub const ALL: [SentimentCategory; 3] = [
        SentimentCategory::Positive,
        SentimentCategory::Negative,
        SentimentCategory::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentCategory::Positive => "positive",
            SentimentCategory::Negative => "negative",
            SentimentCategory::Neutral => "neutral",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "positive" => Some(SentimentCategory::Positive),
            "negative" => Some(SentimentCategory::Negative),
            "neutral" => Some(SentimentCategory::Neutral),
            _ => None,
        }
    }
}

/// What the numbers in a series mean. Batch data carries fractional
/// compound-sentiment shares, stream data carries raw post counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDomain {
    Share,
    Count,
}

/// One value per sentiment category. Every row carries all three keys.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryValues {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl CategoryValues {
    pub fn new(positive: f64, negative: f64, neutral: f64) -> Self {
        Self {
            positive,
            negative,
            neutral,
        }
    }

    pub fn get(&self, category: SentimentCategory) -> f64 {
        match category {
            SentimentCategory::Positive => self.positive,
            SentimentCategory::Negative => self.negative,
            SentimentCategory::Neutral => self.neutral,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SentimentCategory, f64)> + '_ {
        SentimentCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> f64 {
        self.positive + self.negative + self.neutral
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub timestamp: NaiveDateTime,
    pub values: CategoryValues,
}

/// Timestamp-ordered rows ready for charting.
///
/// Only the loaders construct a series, and they guarantee the rows are
/// non-decreasing by timestamp. A series lives for a single render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    domain: ValueDomain,
    rows: Vec<NormalizedRow>,
}

impl NormalizedSeries {
    pub(crate) fn from_sorted(domain: ValueDomain, rows: Vec<NormalizedRow>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        Self { domain, rows }
    }

    pub fn empty(domain: ValueDomain) -> Self {
        Self {
            domain,
            rows: Vec::new(),
        }
    }

    pub fn domain(&self) -> ValueDomain {
        self.domain
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.rows.iter().map(|r| r.timestamp)
    }

    /// Values of a single category, aligned with [`Self::timestamps`].
    pub fn column(&self, category: SentimentCategory) -> Vec<f64> {
        self.rows.iter().map(|r| r.values.get(category)).collect()
    }

    pub fn is_chronological(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }
}
