mod commands;
mod config;
mod feed;
mod filter;
mod http;
mod job;
mod render;
mod sentinel;
mod source;

use std::io::IsTerminal;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::FilterArgs;
use config::SettingsArgs;
use source::HttpJobSource;

/// Browse remote job postings from the terminal
#[derive(Parser)]
#[command(name = "jobs", version)]
struct Args {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load pages of jobs and print the matching ones
    List {
        /// How many pages to load
        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        pages: u32,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Page through jobs interactively; press enter to load more
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Open a job's apply link in the browser
    Open {
        /// Job shorthand, as shown by list
        shorthand: String,
        /// How many pages to load before resolving the shorthand
        #[arg(
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        pages: u32,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(config::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let settings = args.settings.resolve()?;
    tracing::debug!(
        endpoint = %settings.endpoint,
        page_size = settings.page_size,
        "settings resolved"
    );
    let source = HttpJobSource::new(http::http_client()?, settings.endpoint);

    match args.command {
        Some(Command::List { pages, filters }) => {
            commands::list::cmd_list(&source, settings.page_size, pages, filters.into_criteria())
        }
        Some(Command::Browse { filters }) => {
            commands::browse::cmd_browse(&source, settings.page_size, filters.into_criteria())
        }
        Some(Command::Open { shorthand, pages }) => {
            commands::open::cmd_open(&source, settings.page_size, pages, &shorthand)
        }
        None => commands::list::cmd_list(
            &source,
            settings.page_size,
            1,
            FilterArgs::default().into_criteria(),
        ),
    }
}

fn main() {
    init_logging();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_filters() {
        let argv = "jobs list --pages 3 --exp 3y --mode remote --min-pay 50k".split(' ');
        let args = Args::try_parse_from(argv).unwrap();
        match args.command {
            Some(Command::List { pages, filters }) => {
                assert_eq!(pages, 3);
                let criteria = filters.into_criteria();
                assert_eq!(criteria.experience_ceiling, Some(3));
                assert_eq!(criteria.work_mode, Some(filter::WorkMode::Remote));
                assert_eq!(criteria.min_base_pay, Some(50));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_parse_rejects_zero_pages() {
        let result = Args::try_parse_from(["jobs", "list", "--pages", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        let result = Args::try_parse_from(["jobs", "list", "--mode", "hybrid"]);
        assert!(result.is_err());
    }
}
