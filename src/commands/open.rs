use anyhow::ensure;

use crate::feed::JobFeed;
use crate::job::JobPosting;
use crate::sentinel::PageBudget;
use crate::source::JobSource;

use super::list::fill_feed;
use super::resolve_job;

pub(crate) fn open_job(job: &JobPosting) -> anyhow::Result<()> {
    ensure!(!job.jd_link.is_empty(), "Job has no apply link");
    tracing::debug!(link = %job.jd_link, "opening apply link");
    open::that(&job.jd_link).map_err(|e| anyhow::anyhow!("Could not open URL: {}", e))?;
    Ok(())
}

pub(crate) fn cmd_open<S: JobSource + ?Sized>(
    source: &S,
    page_size: u32,
    pages: u32,
    shorthand: &str,
) -> anyhow::Result<()> {
    let mut feed = JobFeed::new(page_size);
    let mut sentinel = PageBudget::new(pages.saturating_sub(1) as usize);
    fill_feed(&mut feed, source, &mut sentinel)?;
    let job = resolve_job(&feed, shorthand)?;
    open_job(job)
}
