use std::time::Duration;

use async_trait::async_trait;

use crate::core::export;
use crate::core::fetcher::Fetcher;
use crate::core::table::RecordTable;
use crate::domain::model::{
    FetchReport, FormatOutcome, PersistReport, ReviewQuery, TreeOutcome,
};
use crate::domain::ports::{ConfigProvider, Pipeline, ReviewSource, Storage};
use crate::utils::error::Result;

pub struct ReviewPipeline<R: ReviewSource, S: Storage, C: ConfigProvider> {
    fetcher: Fetcher<R>,
    storage: S,
    config: C,
}

impl<R: ReviewSource, S: Storage, C: ConfigProvider> ReviewPipeline<R, S, C> {
    pub fn new(source: R, storage: S, config: C) -> Self {
        Self {
            fetcher: Fetcher::new(source),
            storage,
            config,
        }
    }

    /// Mostly for tests, which do not want the 2s inter-batch delay.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.fetcher = self.fetcher.with_throttle(throttle);
        self
    }

    async fn write_delimited(&self, table: &RecordTable, file_name: &str) -> FormatOutcome {
        let body = export::to_delimited(table);
        match self.storage.write_file(file_name, body.as_bytes()).await {
            Ok(()) => FormatOutcome::Written {
                path: self.display_path(file_name),
            },
            Err(e) => {
                tracing::error!("Failed to save delimited output: {}", e);
                FormatOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn write_tree(&self, table: &RecordTable, file_name: &str) -> TreeOutcome {
        let primary: Result<()> = match export::to_pretty_tree(table) {
            Ok(body) => self.storage.write_file(file_name, body.as_bytes()).await,
            Err(e) => Err(e),
        };

        let primary_reason = match primary {
            Ok(()) => {
                return TreeOutcome::Pretty {
                    path: self.display_path(file_name),
                }
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            "Pretty JSON output failed ({}), falling back to one record per line",
            primary_reason
        );

        let fallback: Result<()> = match export::to_json_lines(table) {
            Ok(body) => self.storage.write_file(file_name, body.as_bytes()).await,
            Err(e) => Err(e),
        };

        match fallback {
            Ok(()) => TreeOutcome::LineDelimited {
                path: self.display_path(file_name),
                primary_reason,
            },
            Err(e) => {
                tracing::error!("All JSON output attempts failed: {}", e);
                TreeOutcome::Failed {
                    primary_reason,
                    fallback_reason: e.to_string(),
                }
            }
        }
    }

    fn display_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.config.output_path(), file_name)
    }
}

#[async_trait]
impl<R: ReviewSource, S: Storage, C: ConfigProvider> Pipeline for ReviewPipeline<R, S, C> {
    async fn extract(&self) -> Result<FetchReport> {
        let query = ReviewQuery {
            app_id: self.config.app_id().to_string(),
            lang: self.config.lang().to_string(),
            country: self.config.country().to_string(),
            sort: self.config.sort(),
        };

        Ok(self.fetcher.fetch(&query, self.config.target_count()).await)
    }

    async fn transform(&self, report: FetchReport) -> Result<RecordTable> {
        if report.reviews.is_empty() {
            tracing::warn!("No reviews fetched, the output files will be empty");
        }
        Ok(RecordTable::normalized(report.reviews))
    }

    async fn load(&self, table: &RecordTable) -> Result<PersistReport> {
        let stem = export::file_stem(self.config.target_count());

        let delimited = self
            .write_delimited(table, &format!("{}.csv", stem))
            .await;
        let tree = self.write_tree(table, &format!("{}.json", stem)).await;

        let report = PersistReport { delimited, tree };
        if !report.any_written() {
            tracing::error!("Both output formats failed; nothing was persisted");
        }
        Ok(report)
    }
}

/// In-memory storage used by the pipeline and engine tests.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::utils::error::EtlError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    pub struct MemoryStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        fail_writes: bool,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
                fail_writes: true,
            }
        }

        pub async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }

        pub async fn file_names(&self) -> Vec<String> {
            let files = self.files.lock().await;
            let mut names: Vec<String> = files.keys().cloned().collect();
            names.sort();
            names
        }
    }

    impl Storage for MemoryStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.fail_writes {
                return Err(EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "disk full",
                )));
            }
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    pub struct StaticConfig {
        pub target_count: usize,
    }

    impl ConfigProvider for StaticConfig {
        fn app_id(&self) -> &str {
            "com.gojek.app"
        }

        fn lang(&self) -> &str {
            "id"
        }

        fn country(&self) -> &str {
            "id"
        }

        fn sort(&self) -> crate::domain::model::SortOrder {
            crate::domain::model::SortOrder::Newest
        }

        fn target_count(&self) -> usize {
            self.target_count
        }

        fn output_path(&self) -> &str {
            "test_output"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{MemoryStorage, StaticConfig};
    use super::*;
    use crate::domain::model::{ContinuationToken, FetchOutcome, Record, ReviewBatch};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedSource {
        steps: Mutex<VecDeque<Result<ReviewBatch>>>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Result<ReviewBatch>>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
            }
        }
    }

    #[async_trait]
    impl ReviewSource for ScriptedSource {
        async fn fetch_batch(
            &self,
            _query: &ReviewQuery,
            _batch_size: usize,
            _token: Option<&ContinuationToken>,
        ) -> Result<ReviewBatch> {
            self.steps
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra fetch call")
        }
    }

    fn review(id: &str, score: i64) -> Record {
        serde_json::from_value(json!({
            "reviewId": id,
            "content": "ok",
            "score": score,
            "at": "2025-07-14T09:30:05+00:00",
        }))
        .unwrap()
    }

    fn pipeline(
        steps: Vec<Result<ReviewBatch>>,
        storage: MemoryStorage,
        target: usize,
    ) -> ReviewPipeline<ScriptedSource, MemoryStorage, StaticConfig> {
        ReviewPipeline::new(
            ScriptedSource::new(steps),
            storage,
            StaticConfig {
                target_count: target,
            },
        )
        .with_throttle(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_transform_renames_and_reformats() {
        let storage = MemoryStorage::new();
        let p = pipeline(vec![], storage, 10);

        let report = FetchReport {
            reviews: vec![serde_json::from_value::<Record>(json!({
                "reviewId": "r1",
                "reviewCreatedVersion": "4.1.2",
                "at": "2025-07-14T09:30:05+00:00",
            }))
            .unwrap()],
            outcome: FetchOutcome::Exhausted,
        };

        let table = p.transform(report).await.unwrap();
        assert_eq!(table.columns(), ["reviewId", "appVersion", "reviewDate"]);
        assert_eq!(
            table.rows()[0].get("reviewDate").unwrap(),
            "2025-07-14 09:30:05"
        );
    }

    #[tokio::test]
    async fn test_load_writes_both_formats() {
        let storage = MemoryStorage::new();
        let p = pipeline(vec![], storage.clone(), 10);

        let table = RecordTable::normalized(vec![review("r1", 5), review("r2", 1)]);
        let report = p.load(&table).await.unwrap();

        assert!(matches!(report.delimited, FormatOutcome::Written { .. }));
        assert!(matches!(report.tree, TreeOutcome::Pretty { .. }));

        let names = storage.file_names().await;
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with(".csv"));
        assert!(names[1].ends_with(".json"));

        let csv = String::from_utf8(storage.get_file(&names[0]).await.unwrap()).unwrap();
        assert!(csv.starts_with("reviewId,content,score,reviewDate\n"));
        assert_eq!(csv.lines().count(), 3);

        let json_body = String::from_utf8(storage.get_file(&names[1]).await.unwrap()).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json_body).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[tokio::test]
    async fn test_load_reports_failures_per_format_without_aborting() {
        let storage = MemoryStorage::failing();
        let p = pipeline(vec![], storage, 10);

        let table = RecordTable::normalized(vec![review("r1", 3)]);
        let report = p.load(&table).await.unwrap();

        assert!(matches!(report.delimited, FormatOutcome::Failed { .. }));
        match &report.tree {
            TreeOutcome::Failed {
                primary_reason,
                fallback_reason,
            } => {
                assert!(primary_reason.contains("disk full"));
                assert!(fallback_reason.contains("disk full"));
            }
            other => panic!("expected total JSON failure, got {:?}", other),
        }
        assert!(!report.any_written());
    }

    #[tokio::test]
    async fn test_extract_threads_config_through_fetcher() {
        let storage = MemoryStorage::new();
        let p = pipeline(
            vec![Ok(ReviewBatch {
                reviews: vec![review("r1", 5), review("r2", 4), review("r3", 3)],
                next: None,
            })],
            storage,
            100,
        );

        let report = p.extract().await.unwrap();
        assert_eq!(report.reviews.len(), 3);
        assert_eq!(report.outcome, FetchOutcome::Exhausted);
    }
}
