use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw review exactly as the feed returned it. The feed omits fields it
/// has no data for, so nothing here is guaranteed present; only `reviewId` is
/// assumed unique, and that by source semantics, not enforced locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// Opaque pagination token. Threaded unchanged from one fetch call to the
/// next; never inspected or mutated locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Only the source adapter should need this, to put the token back on
    /// the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of results from the review source. `next: None` means the source
/// is exhausted.
#[derive(Debug, Clone)]
pub struct ReviewBatch {
    pub reviews: Vec<Record>,
    pub next: Option<ContinuationToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Relevance,
    Newest,
    Rating,
}

impl SortOrder {
    /// Numeric code the feed protocol uses for each ordering.
    pub fn as_code(self) -> u8 {
        match self {
            SortOrder::Relevance => 1,
            SortOrder::Newest => 2,
            SortOrder::Rating => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewQuery {
    pub app_id: String,
    pub lang: String,
    pub country: String,
    pub sort: SortOrder,
}

/// Why the fetch loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The requested number of reviews was accumulated.
    Completed,
    /// The source signalled end-of-data before the target was reached.
    Exhausted,
    /// The source handed back a live token with an empty batch; looping
    /// further would never make progress.
    Stalled,
    /// A source call failed. Everything fetched before the failure is kept.
    TruncatedByError(String),
}

/// Result of one fetch pass. A short `reviews` list with a non-`Completed`
/// outcome is partial success, not failure.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub reviews: Vec<Record>,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatOutcome {
    Written { path: String },
    Failed { reason: String },
}

/// Outcome of the JSON tree format, which has its own fallback tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOutcome {
    Pretty {
        path: String,
    },
    /// Pretty serialization failed but the one-object-per-line fallback
    /// succeeded. Degraded but still parseable.
    LineDelimited {
        path: String,
        primary_reason: String,
    },
    Failed {
        primary_reason: String,
        fallback_reason: String,
    },
}

/// Per-format persistence results. The formats are independent; one failing
/// never blocks the other.
#[derive(Debug, Clone)]
pub struct PersistReport {
    pub delimited: FormatOutcome,
    pub tree: TreeOutcome,
}

impl PersistReport {
    pub fn any_written(&self) -> bool {
        matches!(self.delimited, FormatOutcome::Written { .. })
            || !matches!(self.tree, TreeOutcome::Failed { .. })
    }
}
