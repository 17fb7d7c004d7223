//! Dataset storage seam
//!
//! The pipeline reads datasets through the `DatasetStore` trait so the
//! analysis stages never care where rows live. Store failures are the one
//! condition a run does not absorb: they surface as `Error::Store` so the
//! caller can retry, rather than being misreported as "no data".

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{Dataset, DatasetSummary, Record};

#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// All stored datasets, rows omitted
    async fn list_datasets(&self) -> Result<Vec<DatasetSummary>>;

    /// Materialized rows of one dataset
    async fn fetch_rows(&self, dataset_id: &str) -> Result<Vec<Record>>;
}

/// `HashMap`-backed store used by the CLI and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: HashMap<String, Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dataset: Dataset) {
        self.datasets.insert(dataset.id.clone(), dataset);
    }

    pub fn get(&self, dataset_id: &str) -> Option<&Dataset> {
        self.datasets.get(dataset_id)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[async_trait]
impl DatasetStore for MemoryStore {
    async fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
        let mut summaries: Vec<DatasetSummary> = self
            .datasets
            .values()
            .map(|dataset| DatasetSummary {
                id: dataset.id.clone(),
                name: dataset.name.clone(),
                columns: dataset.columns.clone(),
                column_types: dataset.column_types.clone(),
                uploaded_at: dataset.created_at,
            })
            .collect();
        // Listing order is part of the run's determinism
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }

    async fn fetch_rows(&self, dataset_id: &str) -> Result<Vec<Record>> {
        self.datasets
            .get(dataset_id)
            .map(|dataset| dataset.rows.clone())
            .ok_or_else(|| Error::NotFound(format!("dataset {}", dataset_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dataset(id: &str, name: &str) -> Dataset {
        Dataset {
            id: id.to_string(),
            name: name.to_string(),
            columns: vec!["goals".to_string()],
            column_types: HashMap::new(),
            rows: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_datasets_sorted_by_name() {
        let mut store = MemoryStore::new();
        store.insert(dataset("d2", "zebra"));
        store.insert(dataset("d1", "alpha"));

        let listed = store.list_datasets().await.unwrap();
        let names: Vec<&str> = listed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zebra"]);
    }

    #[tokio::test]
    async fn test_fetch_rows_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store.fetch_rows("missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
