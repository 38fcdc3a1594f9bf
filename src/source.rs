use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use url::Url;

use crate::job::JobPage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u64,
}

/// The single failure kind of a page fetch. Variants only refine the message.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Where pages of postings come from.
pub trait JobSource {
    fn fetch_page(&self, request: &PageRequest) -> Result<JobPage, FetchError>;
}

pub struct HttpJobSource {
    client: reqwest::blocking::Client,
    endpoint: Url,
}

impl HttpJobSource {
    pub fn new(client: reqwest::blocking::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

impl JobSource for HttpJobSource {
    fn fetch_page(&self, request: &PageRequest) -> Result<JobPage, FetchError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            limit = request.limit,
            offset = request.offset,
            "fetching job page"
        );
        let body = serde_json::to_vec(request)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes()?;
        let page: JobPage = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            returned = page.jd_list.len(),
            total = ?page.total_count,
            "job page received"
        );
        Ok(page)
    }
}
