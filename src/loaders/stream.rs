use std::cmp::Ordering;

use tracing::debug;

use crate::config::AppConfig;
use crate::error::LoadError;
use crate::store::DocumentStore;
use crate::timestamp::parse_timestamp;
use crate::types::series::{CategoryValues, NormalizedRow, NormalizedSeries, ValueDomain};
use crate::types::stream::StreamDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSource {
    pub collection: String,
}

impl StreamSource {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            collection: config.collection.clone(),
        }
    }
}

pub struct StreamResultLoader<'a> {
    store: &'a dyn DocumentStore,
    source: StreamSource,
}

impl<'a> StreamResultLoader<'a> {
    pub fn new(store: &'a dyn DocumentStore, source: StreamSource) -> Self {
        Self { store, source }
    }

    /// Query the collection and flatten it into a count-valued series.
    pub fn load(&self) -> Result<NormalizedSeries, LoadError> {
        let documents = self.store.find_all(&self.source.collection)?;
        normalize_stream(&documents)
    }
}

fn row_order(a: &NormalizedRow, b: &NormalizedRow) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.values.positive.total_cmp(&b.values.positive))
        .then_with(|| a.values.negative.total_cmp(&b.values.negative))
        .then_with(|| a.values.neutral.total_cmp(&b.values.neutral))
}

/// Flatten every (document, bucket) pair into one row and sort chronologically.
///
/// The document date key is only used to report errors. Ties on timestamp
/// are ordered by counts so the output does not depend on input order.
pub fn normalize_stream(documents: &[StreamDocument]) -> Result<NormalizedSeries, LoadError> {
    let total: usize = documents.iter().map(StreamDocument::bucket_count).sum();
    let mut rows = Vec::with_capacity(total);

    for document in documents {
        for (bucket, counts) in &document.sentiment_data {
            let timestamp =
                parse_timestamp(bucket).ok_or_else(|| LoadError::MalformedTimestamp {
                    document_id: document.id.clone(),
                    value: bucket.clone(),
                })?;
            rows.push(NormalizedRow {
                timestamp,
                values: CategoryValues::new(
                    counts.positive() as f64,
                    counts.negative() as f64,
                    counts.neutral() as f64,
                ),
            });
        }
    }

    rows.sort_by(row_order);
    debug!(
        documents = documents.len(),
        rows = rows.len(),
        "Flattened stream documents"
    );
    Ok(NormalizedSeries::from_sorted(ValueDomain::Count, rows))
}
