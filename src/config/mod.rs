use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::domain::model::SortOrder;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};

/// Every knob defaults to the canonical snapshot run, so invoking the binary
/// with no arguments performs the full fetch-normalize-persist cycle.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "review-etl")]
#[command(about = "Fetches app-store reviews and exports them as delimited text and JSON")]
pub struct CliConfig {
    #[arg(long, default_value = "5000", help = "How many reviews to fetch")]
    pub count: usize,

    #[arg(long, default_value = "com.gojek.app")]
    pub app_id: String,

    #[arg(long, default_value = "id")]
    pub lang: String,

    #[arg(long, default_value = "id")]
    pub country: String,

    #[arg(long, value_enum, default_value_t = SortOrder::Newest)]
    pub sort: SortOrder,

    #[arg(
        long,
        default_value = "http://localhost:8787",
        help = "Base URL of the review-feed gateway"
    )]
    pub feed_endpoint: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU/memory usage per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn lang(&self) -> &str {
        &self.lang
    }

    fn country(&self) -> &str {
        &self.country
    }

    fn sort(&self) -> SortOrder {
        self.sort
    }

    fn target_count(&self) -> usize {
        self.count
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("count", self.count, 1)?;
        validate_non_empty_string("app_id", &self.app_id)?;
        validate_non_empty_string("lang", &self.lang)?;
        validate_non_empty_string("country", &self.country)?;
        validate_url("feed_endpoint", &self.feed_endpoint)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}
