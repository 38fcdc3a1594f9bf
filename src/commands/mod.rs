pub mod browse;
pub mod list;
pub mod open;

use anyhow::{Context, bail};

use crate::feed::{JobFeed, PageOutcome};
use crate::filter::{FilterCriteria, FilterField, WorkMode, parse_base_pay, parse_experience};
use crate::job::JobPosting;
use crate::render;
use crate::source::JobSource;

const JOB_ALPHABET: [char; 34] = [
    'a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'A', 'S', 'D', 'F', 'G', 'H', 'J', 'K', 'L', 'q',
    'w', 'e', 'r', 't', 'y', 'i', 'o', 'p', 'z', 'x', 'c', 'v', 'b', 'n', 'm',
];

/// Handle for the job at `n` in the accumulated list.
pub(crate) fn index_to_shorthand(mut n: usize) -> String {
    let base = JOB_ALPHABET.len();
    if n == 0 {
        return JOB_ALPHABET[0].to_string();
    }
    let mut chars = Vec::new();
    while n > 0 {
        chars.push(JOB_ALPHABET[n % base]);
        n /= base;
    }
    chars.reverse();
    chars.into_iter().collect()
}

pub(crate) fn shorthand_to_index(shorthand: &str) -> Option<usize> {
    if shorthand.is_empty() {
        return None;
    }
    let base = JOB_ALPHABET.len();
    let mut n: usize = 0;
    for c in shorthand.chars() {
        let digit = JOB_ALPHABET.iter().position(|&a| a == c)?;
        n = n.checked_mul(base)?.checked_add(digit)?;
    }
    // Reject padded forms such as "as", which would alias "s".
    (index_to_shorthand(n) == shorthand).then_some(n)
}

pub(crate) fn resolve_job<'a>(
    feed: &'a JobFeed,
    shorthand: &str,
) -> anyhow::Result<&'a JobPosting> {
    match shorthand_to_index(shorthand).and_then(|i| feed.accumulated().get(i)) {
        Some(job) => Ok(job),
        None => bail!("Unknown job: {}", shorthand),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Trigger {
    Mount,
    Sentinel,
}

/// Loads one page behind a spinner. Failures are logged and handed back
/// with the offset attached; nothing is retried.
pub(crate) fn load_page<S: JobSource + ?Sized>(
    feed: &mut JobFeed,
    source: &S,
    trigger: Trigger,
) -> anyhow::Result<PageOutcome> {
    let offset = feed.next_offset();
    let sp = render::loading_spinner(offset);
    let result = match trigger {
        Trigger::Mount => feed.request_next_page(source),
        Trigger::Sentinel => feed.on_sentinel_visible(source),
    };
    sp.finish_and_clear();

    match &result {
        Ok(outcome) => {
            tracing::debug!(
                ?trigger,
                offset,
                page_size = feed.page_size(),
                ?outcome,
                "page request finished"
            );
        }
        Err(e) => {
            tracing::warn!(?trigger, offset, error = %e, "page request failed");
        }
    }
    result.with_context(|| format!("Error fetching jobs at offset {offset}"))
}

/// The filter panel, as command-line flags.
#[derive(clap::Args, Clone, Debug, Default)]
pub(crate) struct FilterArgs {
    /// Only jobs whose minimum experience is at most this many years
    #[arg(long, value_parser = parse_experience)]
    pub exp: Option<u32>,
    /// Company name contains this text
    #[arg(long)]
    pub company: Option<String>,
    /// Location contains this text, e.g. Mumbai
    #[arg(long)]
    pub location: Option<String>,
    /// Work mode: remote or onsite
    #[arg(long)]
    pub mode: Option<WorkMode>,
    /// Job role contains this text, e.g. frontend
    #[arg(long)]
    pub role: Option<String>,
    /// Minimum base pay in thousands, e.g. 50k
    #[arg(long = "min-pay", value_parser = parse_base_pay)]
    pub min_pay: Option<u32>,
}

impl FilterArgs {
    pub(crate) fn into_criteria(self) -> FilterCriteria {
        let mut criteria = FilterCriteria::default();
        criteria.merge([
            FilterField::Experience(self.exp),
            FilterField::Company(self.company),
            FilterField::Location(self.location),
            FilterField::WorkMode(self.mode),
            FilterField::Role(self.role),
            FilterField::MinBasePay(self.min_pay),
        ]);
        criteria
    }
}
