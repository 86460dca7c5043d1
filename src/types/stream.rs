use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// A count written either as a JSON integer or as a whole float (`5.0`).
/// Negative and fractional values are rejected.
fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(n) = number.as_u64() {
        return Ok(Some(n));
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
        _ => Err(D::Error::custom(format!(
            "count must be a non-negative whole number, got {}",
            number
        ))),
    }
}

/// Post counts for one sub-daily window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketAggregate {
    #[serde(default, deserialize_with = "count")]
    pub positive_count: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub negative_count: Option<u64>,
    #[serde(default, deserialize_with = "count")]
    pub neutral_count: Option<u64>,
}

impl BucketAggregate {
    pub fn new(positive: u64, negative: u64, neutral: u64) -> Self {
        Self {
            positive_count: Some(positive),
            negative_count: Some(negative),
            neutral_count: Some(neutral),
        }
    }

    pub fn positive(&self) -> u64 {
        self.positive_count.unwrap_or(0)
    }

    pub fn negative(&self) -> u64 {
        self.negative_count.unwrap_or(0)
    }

    pub fn neutral(&self) -> u64 {
        self.neutral_count.unwrap_or(0)
    }
}

/// One day of streaming aggregates, keyed by bucket timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub sentiment_data: BTreeMap<String, BucketAggregate>,
}

impl StreamDocument {
    pub fn bucket_count(&self) -> usize {
        self.sentiment_data.len()
    }
}
