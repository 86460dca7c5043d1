use serde::{Deserialize, Serialize};

use super::series::SentimentCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicGroup {
    pub sentiment: SentimentCategory,
    pub topics: Vec<Topic>,
}

/// Frequent keywords per sentiment group, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicSummary {
    pub groups: Vec<TopicGroup>,
}

impl TopicSummary {
    pub fn group(&self, sentiment: SentimentCategory) -> Option<&TopicGroup> {
        self.groups.iter().find(|g| g.sentiment == sentiment)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
