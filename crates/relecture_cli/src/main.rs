//! CLI entry point.
//!
//! # Responsibility
//! - Without arguments: print core ping/version to verify linkage.
//! - `review <config.json> <user-uuid> [mode]`: print one user's review and,
//!   when something is stale, one gentle reminder.
//!
//! # Invariants
//! - `review` only reads the database named by `database_path`; a config
//!   without it is an error, never an empty in-memory journal.
//! - Errors go to stderr with a non-zero exit code; never a panic.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use relecture_core::db::open_db;
use relecture_core::review::layout::excerpt;
use relecture_core::{
    init_logging_from_config, pick_reminder, render, FixedSessionProvider, JournalConfig,
    Reminder, ReviewLayout, ReviewService, ReviewState, Session, SqliteEntryRepository,
    SqliteLinkRepository, ViewMode,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "relecture_cli", version, about = "Relecture journal command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the review of one user's journal.
    Review {
        /// JSON journal configuration; must set `database_path`.
        config: PathBuf,
        /// Id of the signed-in user.
        user: Uuid,
        /// chronological|thematic|consolations|river|constellation
        #[arg(value_parser = parse_view_mode)]
        mode: Option<ViewMode>,
        /// Reference day for the reminder (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn parse_view_mode(value: &str) -> Result<ViewMode, String> {
    ViewMode::parse(value).ok_or_else(|| {
        let expected: Vec<&str> = ViewMode::ALL.iter().map(|mode| mode.as_str()).collect();
        format!("unknown view mode `{value}`; expected {}", expected.join("|"))
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        None => {
            println!("relecture_core ping={}", relecture_core::ping());
            println!("relecture_core version={}", relecture_core::core_version());
            ExitCode::SUCCESS
        }
        Some(Command::Review {
            config,
            user,
            mode,
            today,
        }) => match run_review(&config, user, mode.unwrap_or_default(), today) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("error: {message}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_review(
    config_path: &Path,
    user_id: Uuid,
    mode: ViewMode,
    today: Option<NaiveDate>,
) -> Result<(), String> {
    let config = JournalConfig::load(config_path).map_err(|err| err.to_string())?;
    let database_path = configured_database(&config)?;
    init_logging_from_config(&config)?;

    let conn = open_db(database_path).map_err(|err| err.to_string())?;
    let entries = SqliteEntryRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let links = SqliteLinkRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = ReviewService::new(entries, links)
        .with_recent_limit(config.effective_recent_links_limit());

    let provider = FixedSessionProvider::signed_in(Session::new(user_id));
    let snapshot = service
        .load_current(&provider)
        .map_err(|err| err.to_string())?;
    for failure in &snapshot.failures {
        eprintln!("warning: {} failed to load: {}", failure.source, failure.message);
    }

    let mut state = ReviewState::new();
    state.select_mode(mode);
    print_layout(&render(&snapshot, &state));

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    if let Some(reminder) = pick_reminder(
        &snapshot.entries,
        today,
        &config.reminder,
        &mut rand::thread_rng(),
    ) {
        println!("{}", format_reminder(&reminder));
    }
    Ok(())
}

fn configured_database(config: &JournalConfig) -> Result<&Path, String> {
    config
        .database_path
        .as_deref()
        .ok_or_else(|| "config must set `database_path` to review a journal".to_string())
}

fn format_reminder(reminder: &Reminder<'_>) -> String {
    format!(
        "reminder category={} entry={} days_since={} {}",
        reminder.category.as_str(),
        reminder.entry.entry_ref(),
        reminder.days_since,
        excerpt(reminder.entry)
    )
}

fn print_layout(layout: &ReviewLayout<'_>) {
    println!("view={}", layout.mode());
    match layout {
        ReviewLayout::Chronological(items) | ReviewLayout::Consolations(items) => {
            for item in items {
                println!(
                    "{} {} links={} {}",
                    item.entry.occurred_on,
                    item.entry_ref(),
                    item.link_count,
                    item.excerpt
                );
            }
        }
        ReviewLayout::Thematic(groups) => {
            for group in groups {
                println!("[{}]", group.theme.as_str());
                for item in &group.items {
                    println!("  {} {} {}", item.entry.occurred_on, item.entry_ref(), item.excerpt);
                }
            }
        }
        ReviewLayout::River(graph) | ReviewLayout::Constellation(graph) => {
            for node in &graph.nodes {
                println!(
                    "{} x={:.3} y={:.3} {}",
                    node.item.entry_ref(),
                    node.x,
                    node.y,
                    node.item.excerpt
                );
            }
            for edge in &graph.edges {
                println!("{} -{}-> {}", edge.source, edge.kind, edge.target);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{configured_database, format_reminder, Cli, Command};
    use chrono::NaiveDate;
    use clap::error::ErrorKind;
    use clap::{CommandFactory, Parser};
    use relecture_core::{
        Entry, EntryBody, JournalConfig, Prayer, Reminder, ReminderCategory, ViewMode,
    };
    use std::path::{Path, PathBuf};
    use uuid::Uuid;

    const USER: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments_selects_ping() {
        let cli = Cli::try_parse_from(["relecture_cli"]).expect("no args is valid");
        assert!(cli.command.is_none());
    }

    #[test]
    fn review_parses_config_user_and_mode() {
        let cli = Cli::try_parse_from(["relecture_cli", "review", "journal.json", USER, "River"])
            .expect("valid review");
        match cli.command {
            Some(Command::Review {
                config,
                user,
                mode,
                today,
            }) => {
                assert_eq!(config, PathBuf::from("journal.json"));
                assert_eq!(user, Uuid::parse_str(USER).expect("valid uuid"));
                assert_eq!(mode, Some(ViewMode::River));
                assert_eq!(today, None);
            }
            other => panic!("review expected, got {other:?}"),
        }
    }

    #[test]
    fn review_rejects_extra_arguments_and_unknown_modes() {
        let extra = Cli::try_parse_from([
            "relecture_cli",
            "review",
            "journal.json",
            USER,
            "river",
            "bogus-extra",
        ])
        .expect_err("extra argument must fail");
        assert_eq!(extra.kind(), ErrorKind::UnknownArgument);

        let unknown = Cli::try_parse_from(["relecture_cli", "review", "journal.json", USER, "map"])
            .expect_err("unknown mode must fail");
        assert_eq!(unknown.kind(), ErrorKind::ValueValidation);

        let bad_user = Cli::try_parse_from(["relecture_cli", "review", "journal.json", "me"])
            .expect_err("user must be a uuid");
        assert_eq!(bad_user.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn help_is_rendered_by_clap() {
        let help = Cli::try_parse_from(["relecture_cli", "--help"]).expect_err("help exits");
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        assert!(help.to_string().contains("review"));
    }

    #[test]
    fn review_requires_a_configured_database() {
        let err = configured_database(&JournalConfig::default()).expect_err("no path");
        assert!(err.contains("database_path"));

        let config = JournalConfig {
            database_path: Some(PathBuf::from("/tmp/journal.sqlite3")),
            ..JournalConfig::default()
        };
        assert_eq!(
            configured_database(&config).expect("path set"),
            Path::new("/tmp/journal.sqlite3")
        );
    }

    #[test]
    fn reminder_line_names_category_entry_and_age() {
        let entry = Entry {
            id: 2,
            owner: Uuid::nil(),
            occurred_on: NaiveDate::from_ymd_opt(2024, 1, 5).expect("valid date"),
            created_at: 0,
            body: EntryBody::Prayer(Prayer {
                intention: "reconciliation   with my brother".to_string(),
                people: Vec::new(),
                answered_on: None,
                answer_notes: None,
            }),
        };
        let reminder = Reminder {
            category: ReminderCategory::Prayer,
            entry: &entry,
            days_since: 148,
        };
        assert_eq!(
            format_reminder(&reminder),
            "reminder category=prayer entry=prayer#2 days_since=148 reconciliation with my brother"
        );
    }
}
