use std::fmt::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::feed::FeedSnapshot;
use crate::job::{JobPosting, capitalize};

const PREVIEW_WIDTH: usize = 160;
const DEFAULT_TERMINAL_WIDTH: usize = 80;
const CARD_INDENT: &str = "    ";

/// Bold, dim, accent, underline and reset codes; all empty without color.
fn palette(color: bool) -> [&'static str; 5] {
    if color {
        ["\x1b[1m", "\x1b[2m", "\x1b[36m", "\x1b[4m", "\x1b[0m"]
    } else {
        [""; 5]
    }
}

pub(crate) fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

/// Cuts `text` to at most `max_width` display columns, whitespace collapsed.
/// The flag tells whether anything was dropped.
pub(crate) fn truncate_to_width(text: &str, max_width: usize) -> (String, bool) {
    let collapsed = text.split_whitespace().join(" ");
    if collapsed.width() <= max_width {
        return (collapsed, false);
    }
    let mut out = String::new();
    let mut used = 0;
    for c in collapsed.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(c);
    }
    let mut out = out.trim_end().to_string();
    out.push('…');
    (out, true)
}

/// Greedy word wrap by display width. Paragraph breaks are kept.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(20);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.width() + 1 + word.width() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

pub(crate) fn format_card(job: &JobPosting, shorthand: &str, color: bool) -> String {
    let [bold, dim, accent, link, reset] = palette(color);
    let company = &job.company_name;
    let role = capitalize(&job.job_role);
    let salary = job.salary_range();
    let mut lines = vec![
        format!("{bold}{role}{reset}"),
        capitalize(&job.location),
        format!("{accent}Estimated Salary: {salary}{reset}"),
    ];

    let (preview, truncated) = truncate_to_width(&job.job_details_from_company, PREVIEW_WIDTH);
    if !preview.is_empty() {
        lines.push(format!("Description: {preview}"));
    }
    if truncated {
        lines.push(format!("{dim}(view more: view {shorthand}){reset}"));
    }
    lines.push(format!("Min Experience: {} years", job.min_experience()));
    if !job.jd_link.is_empty() {
        lines.push(format!("Apply: {link}{}{reset}", job.jd_link));
    }

    let mut out = String::new();
    writeln!(out, "{bold}{shorthand}{reset} {dim}{company}{reset}").unwrap();
    for line in lines {
        writeln!(out, "{CARD_INDENT}{line}").unwrap();
    }
    out
}

/// Full posting, the equivalent of the "view more" modal.
pub(crate) fn format_detail(job: &JobPosting, width: usize, color: bool) -> String {
    let [bold, dim, accent, link, reset] = palette(color);
    let rule = "─".repeat(width.min(DEFAULT_TERMINAL_WIDTH));
    let role = capitalize(&job.job_role);
    let salary = job.salary_range();
    let mut out = String::new();
    writeln!(out, "{rule}").unwrap();
    writeln!(out, "{bold}{role}{reset} · {}", job.company_name).unwrap();
    writeln!(out, "Location: {}", capitalize(&job.location)).unwrap();
    writeln!(out, "Estimated Salary: {accent}{salary}{reset}").unwrap();
    writeln!(out, "Experience: {}", job.experience_range()).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "{bold}About the job{reset}").unwrap();
    for line in wrap(&job.job_details_from_company, width) {
        writeln!(out, "{line}").unwrap();
    }
    if !job.jd_link.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "Apply: {link}{}{reset}", job.jd_link).unwrap();
    }
    if let Some(ref uid) = job.jd_uid {
        writeln!(out, "{dim}Ref: {uid}{reset}").unwrap();
    }
    writeln!(out, "{rule}").unwrap();
    out
}

pub(crate) fn render_cards(
    cards: &[(usize, &JobPosting)],
    shorthand: impl Fn(usize) -> String,
    color: bool,
) -> String {
    cards
        .iter()
        .map(|(index, job)| format_card(job, &shorthand(*index), color))
        .join("\n")
}

pub(crate) fn render_feed(
    snapshot: &FeedSnapshot<'_>,
    shorthand: impl Fn(usize) -> String,
    color: bool,
) -> String {
    render_cards(&snapshot.visible(), shorthand, color)
}

/// One-line summary shown under the cards.
pub(crate) fn format_status(snapshot: &FeedSnapshot<'_>) -> String {
    let shown = snapshot.visible().len();
    let loaded = snapshot.accumulated.len();
    let mut status = match snapshot.total_available {
        Some(total) => format!("{shown} shown, {loaded} of {total} loaded"),
        None => format!("{shown} shown, {loaded} loaded"),
    };
    if !snapshot.criteria.is_empty() {
        let filters = snapshot.criteria.describe();
        write!(status, " (filters: {filters})").unwrap();
    }
    if snapshot.fetching {
        status.push_str(" - loading");
    } else if snapshot.end_reached {
        status.push_str(" - no more jobs");
    }
    status
}

/// Loading indicator shown while a page is in flight.
pub(crate) fn loading_spinner(offset: u64) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    sp.enable_steady_tick(Duration::from_millis(80));
    sp.set_message(format!("Loading jobs from offset {offset}..."));
    sp
}
