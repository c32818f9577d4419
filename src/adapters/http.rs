use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::model::{ContinuationToken, Record, ReviewBatch, ReviewQuery};
use crate::domain::ports::ReviewSource;
use crate::utils::error::{EtlError, Result};

/// Wire shape of one feed page. `nextToken` absent or null means the feed is
/// exhausted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedPage {
    #[serde(default)]
    reviews: Vec<Record>,
    #[serde(default)]
    next_token: Option<String>,
}

/// JSON-over-HTTP client for the review-feed gateway. No retry, no backoff;
/// a failed call surfaces as an error and the caller decides what to do with
/// the data it already has.
pub struct HttpReviewSource {
    client: Client,
    endpoint: String,
}

impl HttpReviewSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ReviewSource for HttpReviewSource {
    async fn fetch_batch(
        &self,
        query: &ReviewQuery,
        batch_size: usize,
        token: Option<&ContinuationToken>,
    ) -> Result<ReviewBatch> {
        let url = format!("{}/reviews", self.endpoint.trim_end_matches('/'));

        let mut params: Vec<(&str, String)> = vec![
            ("app", query.app_id.clone()),
            ("lang", query.lang.clone()),
            ("country", query.country.clone()),
            ("sort", query.sort.as_code().to_string()),
            ("count", batch_size.to_string()),
        ];
        if let Some(token) = token {
            params.push(("token", token.as_str().to_string()));
        }

        tracing::debug!("Requesting {} reviews from {}", batch_size, url);
        let response = self.client.get(&url).query(&params).send().await?;

        let status = response.status();
        tracing::debug!("Feed response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EtlError::SourceError {
                status: status.as_u16(),
                message,
            });
        }

        let page: FeedPage = response.json().await?;
        Ok(ReviewBatch {
            reviews: page.reviews,
            next: page.next_token.map(ContinuationToken::new),
        })
    }
}
