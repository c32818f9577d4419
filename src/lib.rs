pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{http::HttpReviewSource, storage::LocalStorage};
pub use config::CliConfig;
pub use core::{etl::EtlEngine, fetcher::Fetcher, pipeline::ReviewPipeline, table::RecordTable};
pub use domain::model::{FetchOutcome, FetchReport, PersistReport, Record, SortOrder};
pub use utils::error::{EtlError, Result};
