use crate::core::table::RecordTable;
use crate::domain::model::{
    ContinuationToken, FetchReport, PersistReport, ReviewBatch, ReviewQuery, SortOrder,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The external review-source collaborator. Retry, backoff and transport
/// concerns live behind this boundary, not in this crate.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn fetch_batch(
        &self,
        query: &ReviewQuery,
        batch_size: usize,
        token: Option<&ContinuationToken>,
    ) -> Result<ReviewBatch>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn app_id(&self) -> &str;
    fn lang(&self) -> &str;
    fn country(&self) -> &str;
    fn sort(&self) -> SortOrder;
    fn target_count(&self) -> usize;
    fn output_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<FetchReport>;
    async fn transform(&self, report: FetchReport) -> Result<RecordTable>;
    async fn load(&self, table: &RecordTable) -> Result<PersistReport>;
}
