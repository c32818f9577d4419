pub mod etl;
pub mod export;
pub mod fetcher;
pub mod pipeline;
pub mod table;

pub use crate::domain::model::{
    ContinuationToken, FetchOutcome, FetchReport, FormatOutcome, PersistReport, Record,
    ReviewBatch, ReviewQuery, SortOrder, TreeOutcome,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ReviewSource, Storage};
pub use crate::utils::error::Result;
