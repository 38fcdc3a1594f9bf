use anyhow::{Context, ensure};
use url::Url;

use crate::feed::DEFAULT_PAGE_SIZE;

pub const DEFAULT_ENDPOINT: &str = "https://api.weekday.technology/adhoc/getSampleJdJSON";

/// Environment variable holding the log filter, e.g. `JOBS_LOG=debug`.
pub const LOG_ENV: &str = "JOBS_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(clap::Args, Debug)]
pub(crate) struct SettingsArgs {
    /// Job listing endpoint (POST, JSON)
    #[arg(
        long,
        global = true,
        env = "JOBS_API_URL",
        default_value = DEFAULT_ENDPOINT
    )]
    endpoint: String,
    /// Number of postings requested per page
    #[arg(
        long,
        global = true,
        env = "JOBS_PAGE_SIZE",
        default_value_t = DEFAULT_PAGE_SIZE
    )]
    page_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Url,
    pub page_size: u32,
}

impl SettingsArgs {
    pub(crate) fn resolve(self) -> anyhow::Result<Settings> {
        let endpoint = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid endpoint URL: {}", self.endpoint))?;
        ensure!(
            matches!(endpoint.scheme(), "http" | "https"),
            "endpoint must be an http(s) URL: {}",
            endpoint
        );
        ensure!(self.page_size >= 1, "page size must be at least 1");
        Ok(Settings {
            endpoint,
            page_size: self.page_size,
        })
    }
}
