use std::io::IsTerminal;

use anyhow::ensure;

use crate::feed::{JobFeed, PageOutcome};
use crate::filter::FilterCriteria;
use crate::render::{format_status, render_feed};
use crate::sentinel::{PageBudget, Sentinel};
use crate::source::JobSource;

use super::{Trigger, index_to_shorthand, load_page};

/// Mounts a feed and lets `sentinel` pull further pages until it goes quiet
/// or a page fails to grow the list. Only a failed mount is an error; a later
/// failure is reported and the jobs loaded so far are kept.
pub(crate) fn fill_feed<S: JobSource + ?Sized>(
    feed: &mut JobFeed,
    source: &S,
    sentinel: &mut dyn Sentinel,
) -> anyhow::Result<()> {
    let mut outcome = load_page(feed, source, Trigger::Mount)?;
    while matches!(outcome, PageOutcome::Appended(_)) && sentinel.wait_visible() {
        outcome = match load_page(feed, source, Trigger::Sentinel) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{e:#}");
                break;
            }
        };
    }
    Ok(())
}

pub(crate) fn cmd_list<S: JobSource + ?Sized>(
    source: &S,
    page_size: u32,
    pages: u32,
    criteria: FilterCriteria,
) -> anyhow::Result<()> {
    let mut feed = JobFeed::new(page_size).with_criteria(criteria);
    let mut sentinel = PageBudget::new(pages.saturating_sub(1) as usize);
    fill_feed(&mut feed, source, &mut sentinel)?;

    ensure!(!feed.filtered_view().is_empty(), "No matching jobs");

    let snapshot = feed.snapshot();

    let color = std::io::stdout().is_terminal();
    println!("{}", render_feed(&snapshot, index_to_shorthand, color));
    eprintln!("{}", format_status(&snapshot));
    Ok(())
}
