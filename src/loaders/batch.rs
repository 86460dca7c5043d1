use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::LoadError;
use crate::store::ObjectStore;
use crate::timestamp::parse_timestamp;
use crate::types::batch::BatchRecord;
use crate::types::series::{CategoryValues, NormalizedRow, NormalizedSeries, ValueDomain};

/// Where the batch job writes its per-day sentiment array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSource {
    pub bucket: String,
    pub key: String,
}

impl BatchSource {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            bucket: config.bucket.clone(),
            key: config.sentiment_key.clone(),
        }
    }
}

pub struct BatchResultLoader<'a> {
    store: &'a dyn ObjectStore,
    source: BatchSource,
}

impl<'a> BatchResultLoader<'a> {
    pub fn new(store: &'a dyn ObjectStore, source: BatchSource) -> Self {
        Self { store, source }
    }

    /// Fetch, decode and normalize the batch results.
    pub fn load(&self) -> Result<NormalizedSeries, LoadError> {
        let bytes = self.store.get_object(&self.source.bucket, &self.source.key)?;
        let records = parse_batch_payload(&bytes)?;
        debug!(
            bucket = %self.source.bucket,
            key = %self.source.key,
            records = records.len(),
            "Decoded batch records"
        );
        normalize_batch(&records)
    }
}

/// Decode a UTF-8 JSON array into typed records.
///
/// A payload that is not a JSON array is a decode failure; an element that
/// does not fit [`BatchRecord`] is reported by its index.
pub fn parse_batch_payload(bytes: &[u8]) -> Result<Vec<BatchRecord>, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::Decode(format!("batch payload is not UTF-8: {}", e)))?;
    let items: Vec<serde_json::Value> = serde_json::from_str(text)
        .map_err(|e| LoadError::Decode(format!("batch payload is not a JSON array: {}", e)))?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| LoadError::malformed(format!("#{}", index), e.to_string()))
        })
        .collect()
}

fn share(index: usize, field: &str, value: Option<f64>) -> Result<f64, LoadError> {
    match value {
        None => Ok(0.0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(LoadError::malformed(
            format!("#{}", index),
            format!("'{}' must be a non-negative number, got {}", field, v),
        )),
    }
}

/// Turn batch records into a share-valued series, one row per record.
///
/// Absent or null sentiment fields become 0. A record without a usable
/// `date` aborts the whole batch. Input is expected in ascending date
/// order; out-of-order input is sorted (stably) with a warning.
pub fn normalize_batch(records: &[BatchRecord]) -> Result<NormalizedSeries, LoadError> {
    let mut rows = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let date = record
            .date
            .as_deref()
            .ok_or_else(|| LoadError::malformed(format!("#{}", index), "missing 'date'"))?;
        let timestamp = parse_timestamp(date).ok_or_else(|| {
            LoadError::malformed(format!("#{}", index), format!("unparseable date '{}'", date))
        })?;

        rows.push(NormalizedRow {
            timestamp,
            values: CategoryValues::new(
                share(index, "pos", record.pos)?,
                share(index, "neg", record.neg)?,
                share(index, "neu", record.neu)?,
            ),
        });
    }

    if !rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        warn!(rows = rows.len(), "Batch records are not in date order, sorting");
        rows.sort_by_key(|r| r.timestamp);
    }

    Ok(NormalizedSeries::from_sorted(ValueDomain::Share, rows))
}
