//! Query context: the dataset and configuration a hosting layer injects
//!
//! The engine never reads process-wide state. Whatever loads and caches the
//! dataset owns a context and hands queries to it.

use super::error::Result;
use super::record::Record;
use super::request::FilterRequest;
use super::scale::PiecewiseScale;
use super::statistics::{date_statistics, DateStatistics};
use crate::config::EngineConfig;
use crate::pipeline::{process_query, QueryResponse};
use log::info;
use std::path::Path;

/// Trait for anything that can answer map queries
///
/// Implementations must be fully populated before the first query.
pub trait MapContext {
    /// The complete, read-only dataset
    fn records(&self) -> &[Record];

    fn config(&self) -> &EngineConfig;

    /// Filter, describe and color the dataset for one request
    fn process(&self, request: &FilterRequest) -> QueryResponse<'_> {
        process_query(self.records(), request, self.config())
    }

    /// Date statistics of the full dataset
    fn date_statistics(&self) -> DateStatistics {
        date_statistics(self.records(), self.config().age_defaults())
    }

    /// Range-slider scale initialised from the full dataset
    fn slider_scale(&self) -> PiecewiseScale {
        PiecewiseScale::from_statistics(&self.date_statistics(), self.config().slider)
    }
}

/// A dataset held in memory together with its engine configuration
#[derive(Debug, Clone, Default)]
pub struct DatasetContext {
    records: Vec<Record>,
    config: EngineConfig,
}

impl DatasetContext {
    pub fn new(records: Vec<Record>, config: EngineConfig) -> Self {
        Self { records, config }
    }

    /// Load a GeoJSON dataset file
    pub fn from_geojson_file(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let records = super::dataset::load_dataset(path)?;
        info!("DatasetContext: {} records ready", records.len());
        Ok(Self::new(records, config))
    }
}

impl MapContext for DatasetContext {
    fn records(&self) -> &[Record] {
        &self.records
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }
}
