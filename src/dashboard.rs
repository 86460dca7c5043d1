use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chart::ChartSpec;
use crate::config::AppConfig;
use crate::error::LoadError;
use crate::loaders::{BatchResultLoader, BatchSource, StreamResultLoader, StreamSource, TopicKeywordLoader};
use crate::store::{self, DocumentStore, ObjectStore};
use crate::types::topics::TopicSummary;

/// Everything the web front-end needs for one page render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub batch_sentiment: ChartSpec,
    pub stream_sentiment: ChartSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<TopicSummary>,
}

pub struct Dashboard {
    config: AppConfig,
}

impl Dashboard {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Open fresh store sessions and render. Nothing is reused between
    /// calls; the stores are dropped when this returns.
    pub fn render(&self) -> Result<DashboardView, LoadError> {
        let objects = store::open_object_store(&self.config.object_store)?;
        let documents = store::open_document_store(&self.config.document_store)?;
        self.render_with(objects.as_ref(), documents.as_ref())
    }

    /// Render against the given stores. Loaders run sequentially and the
    /// first failure aborts the render, so no partial view is produced.
    pub fn render_with(
        &self,
        objects: &dyn ObjectStore,
        documents: &dyn DocumentStore,
    ) -> Result<DashboardView, LoadError> {
        let batch = BatchResultLoader::new(objects, BatchSource::from_config(&self.config)).load()?;
        let stream =
            StreamResultLoader::new(documents, StreamSource::from_config(&self.config)).load()?;

        let topics = match &self.config.topic_key {
            Some(key) => Some(TopicKeywordLoader::new(objects, &self.config.bucket, key).load()?),
            None => None,
        };

        info!(
            batch_rows = batch.len(),
            stream_rows = stream.len(),
            topic_groups = topics.as_ref().map_or(0, |t| t.groups.len()),
            "Rendered dashboard"
        );

        Ok(DashboardView {
            batch_sentiment: ChartSpec::from_series(&batch),
            stream_sentiment: ChartSpec::from_series(&stream),
            topics,
        })
    }
}
