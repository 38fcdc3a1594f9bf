use std::io::{BufRead, IsTerminal, Write};
use std::str::FromStr;

use anyhow::{bail, ensure};

use crate::feed::{JobFeed, PageOutcome};
use crate::filter::{FilterCriteria, FilterField};
use crate::render::{format_detail, format_status, render_cards, terminal_width};
use crate::source::JobSource;

use super::open::open_job;
use super::{Trigger, index_to_shorthand, load_page, resolve_job};

const PROMPT: &str = "jobs> ";

const HELP: &str = "\
Commands:
  <enter>, more          load the next page
  filter key=value ...   narrow the list (exp, company, location, mode, role, pay)
  clear                  drop all filters
  view <job>             show the full posting
  open <job>             open the apply link in the browser
  help                   show this message
  quit                   leave
";

#[derive(Debug, PartialEq)]
enum BrowseCommand {
    More,
    Filter(Vec<FilterField>),
    Clear,
    View(String),
    Open(String),
    Help,
    Quit,
}

/// Splits `company=Acme Corp role=dev` into one field per `key=`.
fn parse_filter_expr(expr: &str) -> anyhow::Result<Vec<FilterField>> {
    let mut raw: Vec<String> = Vec::new();
    for token in expr.split_whitespace() {
        if token.contains('=') {
            raw.push(token.to_string());
            continue;
        }
        match raw.last_mut() {
            Some(current) => {
                current.push(' ');
                current.push_str(token);
            }
            None => bail!("Invalid filter: {}. Expected key=value", token),
        }
    }
    raw.iter().map(|r| r.parse::<FilterField>()).collect()
}

fn required_arg(rest: &str, usage: &str) -> anyhow::Result<String> {
    ensure!(!rest.is_empty(), "Usage: {}", usage);
    Ok(rest.to_string())
}

impl FromStr for BrowseCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));
        let parsed = match command {
            "" | "more" | "m" => BrowseCommand::More,
            "filter" | "f" => {
                ensure!(!rest.is_empty(), "Usage: filter key=value ...");
                BrowseCommand::Filter(parse_filter_expr(rest)?)
            }
            "clear" => BrowseCommand::Clear,
            "view" | "v" => BrowseCommand::View(required_arg(rest, "view <job>")?),
            "open" | "o" => BrowseCommand::Open(required_arg(rest, "open <job>")?),
            "help" | "?" => BrowseCommand::Help,
            "quit" | "q" | "exit" => BrowseCommand::Quit,
            other => bail!(
                "Unknown command: {}. Type help for a list of commands",
                other
            ),
        };
        Ok(parsed)
    }
}

fn show_all<W: Write>(feed: &JobFeed, out: &mut W, color: bool) -> anyhow::Result<()> {
    let snapshot = feed.snapshot();
    let visible = snapshot.visible();
    if visible.is_empty() {
        writeln!(out, "No matching jobs")?;
    } else {
        writeln!(out, "{}", render_cards(&visible, index_to_shorthand, color))?;
    }
    writeln!(out, "{}", format_status(&snapshot))?;
    Ok(())
}

/// Appends the cards of the page that just arrived, like an infinite list.
fn show_appended<W: Write>(
    feed: &JobFeed,
    since: usize,
    out: &mut W,
    color: bool,
) -> anyhow::Result<()> {
    let snapshot = feed.snapshot();
    let fresh: Vec<_> = snapshot
        .visible()
        .into_iter()
        .filter(|(index, _)| *index >= since)
        .collect();
    if fresh.is_empty() {
        writeln!(out, "No new matching jobs on this page")?;
    } else {
        writeln!(out, "{}", render_cards(&fresh, index_to_shorthand, color))?;
    }
    writeln!(out, "{}", format_status(&snapshot))?;
    Ok(())
}

fn prompt<W: Write>(out: &mut W) -> anyhow::Result<()> {
    write!(out, "{PROMPT}")?;
    out.flush()?;
    Ok(())
}

pub(crate) fn run_session<S, R, W>(
    feed: &mut JobFeed,
    source: &S,
    input: R,
    out: &mut W,
    color: bool,
) -> anyhow::Result<()>
where
    S: JobSource + ?Sized,
    R: BufRead,
    W: Write,
{
    if let Err(e) = load_page(feed, source, Trigger::Mount) {
        writeln!(out, "error: {e:#}")?;
    }
    show_all(feed, out, color)?;
    prompt(out)?;

    for line in input.lines() {
        let command = match line?.parse::<BrowseCommand>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                prompt(out)?;
                continue;
            }
        };

        match command {
            BrowseCommand::More => {
                let since = feed.accumulated().len();
                match load_page(feed, source, Trigger::Sentinel) {
                    Ok(PageOutcome::Appended(_)) => show_appended(feed, since, out, color)?,
                    Ok(PageOutcome::Empty) => writeln!(out, "No more jobs")?,
                    Ok(PageOutcome::Busy | PageOutcome::Stale) => {}
                    Err(e) => writeln!(out, "error: {e:#}")?,
                }
            }
            BrowseCommand::Filter(fields) => {
                feed.set_filter_criteria(fields);
                tracing::debug!(filters = %feed.criteria().describe(), "filters changed");
                show_all(feed, out, color)?;
            }
            BrowseCommand::Clear => {
                feed.clear_filters();
                show_all(feed, out, color)?;
            }
            BrowseCommand::View(shorthand) => match resolve_job(feed, &shorthand) {
                Ok(job) => write!(out, "{}", format_detail(job, terminal_width(), color))?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
            BrowseCommand::Open(shorthand) => {
                if let Err(e) = resolve_job(feed, &shorthand).and_then(open_job) {
                    writeln!(out, "error: {e}")?;
                }
            }
            BrowseCommand::Help => write!(out, "{HELP}")?,
            BrowseCommand::Quit => return Ok(()),
        }
        prompt(out)?;
    }
    writeln!(out)?;
    Ok(())
}

pub(crate) fn cmd_browse<S: JobSource + ?Sized>(
    source: &S,
    page_size: u32,
    criteria: FilterCriteria,
) -> anyhow::Result<()> {
    let mut feed = JobFeed::new(page_size).with_criteria(criteria);
    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    run_session(&mut feed, source, std::io::stdin().lock(), &mut out, color)
}
