use std::time::Duration;

use crate::domain::model::{ContinuationToken, FetchOutcome, FetchReport, ReviewQuery};
use crate::domain::ports::ReviewSource;

pub const MAX_BATCH_SIZE: usize = 100;
pub const DEFAULT_THROTTLE: Duration = Duration::from_secs(2);

/// Drives the paginated fetch loop against a [`ReviewSource`] until the
/// target count is reached, the source runs dry, or a call fails. A failing
/// call truncates the result to what was already accumulated; it never
/// discards prior batches.
pub struct Fetcher<S: ReviewSource> {
    source: S,
    throttle: Duration,
}

impl<S: ReviewSource> Fetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            throttle: DEFAULT_THROTTLE,
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub async fn fetch(&self, query: &ReviewQuery, target: usize) -> FetchReport {
        let mut reviews = Vec::new();
        let mut token: Option<ContinuationToken> = None;

        tracing::info!("Fetching up to {} reviews for {}", target, query.app_id);

        while reviews.len() < target {
            let batch_size = MAX_BATCH_SIZE.min(target - reviews.len());

            let batch = match self.source.fetch_batch(query, batch_size, token.as_ref()).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!("Fetch failed after {} reviews: {}", reviews.len(), e);
                    return FetchReport {
                        reviews,
                        outcome: FetchOutcome::TruncatedByError(e.to_string()),
                    };
                }
            };

            let received = batch.reviews.len();
            reviews.extend(batch.reviews);
            reviews.truncate(target);
            token = batch.next;

            tracing::info!("Fetched {} of {} reviews", reviews.len(), target);

            if token.is_none() {
                tracing::info!("No more reviews available from the source");
                return FetchReport {
                    reviews,
                    outcome: FetchOutcome::Exhausted,
                };
            }

            // A live token with an empty batch would loop forever.
            if received == 0 {
                tracing::warn!("Source returned an empty batch with a continuation token, stopping");
                return FetchReport {
                    reviews,
                    outcome: FetchOutcome::Stalled,
                };
            }

            if reviews.len() < target {
                tokio::time::sleep(self.throttle).await;
            }
        }

        FetchReport {
            reviews,
            outcome: FetchOutcome::Completed,
        }
    }
}
