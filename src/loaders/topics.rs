use std::collections::BTreeMap;

use tracing::debug;

use crate::error::LoadError;
use crate::store::ObjectStore;
use crate::types::series::SentimentCategory;
use crate::types::topics::{Topic, TopicGroup, TopicSummary};

pub struct TopicKeywordLoader<'a> {
    store: &'a dyn ObjectStore,
    bucket: String,
    key: String,
}

impl<'a> TopicKeywordLoader<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &str, key: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn load(&self) -> Result<TopicSummary, LoadError> {
        let bytes = self.store.get_object(&self.bucket, &self.key)?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| LoadError::Decode(format!("topic payload is not JSON: {}", e)))?;
        normalize_topics(&value)
    }
}

/// Numeric ids first in numeric order, then anything else lexically.
fn topic_order(a: &Topic, b: &Topic) -> std::cmp::Ordering {
    match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.id.cmp(&b.id),
    }
}

/// Validate `{sentiment: {topic_id: [keyword, ...]}}` and order it for display.
pub fn normalize_topics(value: &serde_json::Value) -> Result<TopicSummary, LoadError> {
    let groups = value
        .as_object()
        .ok_or_else(|| LoadError::Decode("topic payload must be a JSON object".to_string()))?;

    let mut summary = TopicSummary::default();
    for (name, topics) in groups {
        let sentiment = SentimentCategory::from_name(name).ok_or_else(|| {
            LoadError::malformed(format!("sentiment '{}'", name), "unknown sentiment group")
        })?;
        let by_id: BTreeMap<String, Vec<String>> = serde_json::from_value(topics.clone())
            .map_err(|e| LoadError::malformed(format!("sentiment '{}'", name), e.to_string()))?;

        let mut topics: Vec<Topic> = by_id
            .into_iter()
            .map(|(id, keywords)| Topic { id, keywords })
            .collect();
        topics.sort_by(topic_order);
        summary.groups.push(TopicGroup { sentiment, topics });
    }

    summary.groups.sort_by_key(|g| g.sentiment);
    debug!(groups = summary.groups.len(), "Normalized topic keywords");
    Ok(summary)
}
