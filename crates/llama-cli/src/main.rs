//! Llama Matemática administration shell
//!
//! Signs in against the platform backend, keeps the session on disk and
//! exposes the admin pages as subcommands.

#![forbid(unsafe_code)]

mod pages;
mod reports;
mod shell;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use llama_client::Route;
use llama_core::{Config, EntityId};
use llama_views::PerformanceFilter;
use shell::Shell;
use std::path::PathBuf;
use tracing::info;

/// Command line interface for the admin shell
#[derive(Parser)]
#[command(
    name = "llama-admin",
    version = env!("CARGO_PKG_VERSION"),
    about = "Administration shell for the Llama Matemática learning platform"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account e-mail
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "LLAMA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Headline metrics and recent activity
    Dashboard,

    /// List the records of a resource
    List {
        /// Resource to list
        #[arg(value_enum)]
        resource: Resource,

        /// Parent record for nested resources (institution, course, topic or lesson)
        #[arg(short, long, value_name = "ID")]
        parent: Option<EntityId>,

        /// Case-insensitive search text
        #[arg(short, long)]
        search: Option<String>,

        /// Column key to sort by
        #[arg(long, value_name = "KEY")]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Student ranking
        #[arg(long, value_enum)]
        order: Option<Ranking>,
    },

    /// Delete a record
    Delete {
        /// Resource the record belongs to
        #[arg(value_enum)]
        resource: Resource,

        /// Record id
        #[arg(value_name = "ID")]
        id: EntityId,

        /// Parent record for nested resources
        #[arg(short, long, value_name = "ID")]
        parent: Option<EntityId>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Student performance report
    Reports {
        /// Student name contains
        #[arg(short, long)]
        search: Option<String>,

        /// Institution id
        #[arg(long, value_name = "ID")]
        institution: Option<EntityId>,

        /// Career id
        #[arg(long, value_name = "ID")]
        career: Option<EntityId>,

        /// Course id
        #[arg(long, value_name = "ID")]
        course: Option<EntityId>,

        /// Performance bucket
        #[arg(long, value_enum, default_value = "all")]
        level: Level,

        /// Write the filtered list as CSV into this directory
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
    },

    /// Analytics charts rendered as text
    Charts,
}

/// Resources reachable from `list` and `delete`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Resource {
    Institutions,
    Careers,
    Teachers,
    Students,
    Cycles,
    Courses,
    Topics,
    Lessons,
    Questions,
    Store,
    ItemTypes,
    Characters,
}

impl Resource {
    /// Page route, which needs the parent id for nested resources
    fn route(self, parent: Option<EntityId>) -> anyhow::Result<Route> {
        let require_parent = || {
            parent.with_context(|| format!("--parent is required for {self:?}").to_lowercase())
        };

        Ok(match self {
            Self::Institutions => Route::Institutions,
            Self::Careers => Route::Careers {
                institution_id: require_parent()?,
            },
            Self::Teachers => Route::Teachers,
            Self::Students => Route::Students,
            Self::Cycles => Route::Cycles,
            Self::Courses => Route::Courses,
            Self::Topics => Route::Topics {
                course_id: require_parent()?,
            },
            Self::Lessons => Route::Lessons {
                topic_id: require_parent()?,
            },
            Self::Questions => Route::Questions {
                lesson_id: require_parent()?,
            },
            Self::Store => Route::Store,
            Self::ItemTypes => Route::ItemTypes,
            Self::Characters => Route::Characters,
        })
    }
}

/// Student rankings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Ranking {
    /// Most experience first
    TopXp,
    /// Most gems first
    TopGems,
}

/// Report performance buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Level {
    All,
    Passing,
    AtRisk,
}

impl From<Level> for PerformanceFilter {
    fn from(level: Level) -> Self {
        match level {
            Level::All => Self::All,
            Level::Passing => Self::Passing,
            Level::AtRisk => Self::AtRisk,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    let config = Config::load_with(cli.config.as_deref(), None).context("loading configuration")?;
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    llama_core::init_logging(level, cli.json || config.logging.format == "json")?;
    info!(version = env!("CARGO_PKG_VERSION"), api = %config.api.api_root(), "llama-admin starting");

    match cli.command {
        Commands::Login { email, password } => {
            let shell = Shell::open(&config, Route::Login)?;
            shell.login(&email, &password).await
        }
        Commands::Logout => Shell::open(&config, Route::Dashboard)?.logout(),
        Commands::Whoami => {
            Shell::open(&config, Route::Dashboard)?.whoami();
            Ok(())
        }
        Commands::Dashboard => {
            let shell = Shell::enter(&config, Route::Dashboard)?;
            pages::dashboard(&shell).await
        }
        Commands::List {
            resource,
            parent,
            search,
            sort,
            desc,
            order,
        } => {
            let shell = Shell::enter(&config, resource.route(parent)?)?;
            let options = pages::ListOptions {
                search: search.unwrap_or_default(),
                sort,
                descending: desc,
                ranking: order.map(|order| match order {
                    Ranking::TopXp => llama_client::resources::StudentOrder::TopExperience,
                    Ranking::TopGems => llama_client::resources::StudentOrder::TopGems,
                }),
            };
            pages::list(&shell, resource, parent, &options).await
        }
        Commands::Delete {
            resource,
            id,
            parent,
            yes,
        } => {
            let shell = Shell::enter(&config, resource.route(parent)?)?;
            pages::delete(&shell, resource, parent, id, yes).await
        }
        Commands::Reports {
            search,
            institution,
            career,
            course,
            level,
            export,
        } => {
            let shell = Shell::enter(&config, Route::Reports)?;
            let filter = llama_views::ReportFilter {
                search: search.unwrap_or_default(),
                institution_id: institution,
                career_id: career,
                course_id: course,
                performance: level.into(),
            };
            reports::students(&shell, &filter, export.as_deref()).await
        }
        Commands::Charts => {
            let shell = Shell::enter(&config, Route::Reports)?;
            reports::charts(&shell).await
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(Resource::Careers, Some(3), Route::Careers { institution_id: 3 })]
    #[case(Resource::Questions, Some(8), Route::Questions { lesson_id: 8 })]
    #[case(Resource::Store, None, Route::Store)]
    #[case(Resource::Students, Some(1), Route::Students)]
    fn test_resource_routes(
        #[case] resource: Resource,
        #[case] parent: Option<EntityId>,
        #[case] expected: Route,
    ) {
        assert_eq!(resource.route(parent).unwrap(), expected);
    }

    #[test]
    fn test_nested_resource_needs_parent() {
        let err = Resource::Topics.route(None).unwrap_err();
        assert_eq!(err.to_string(), "--parent is required for topics");
    }

    #[test]
    fn test_parse_list_command() {
        let cli = Cli::try_parse_from([
            "llama-admin",
            "list",
            "students",
            "--sort",
            "experience",
            "--desc",
            "--order",
            "top-gems",
        ])
        .unwrap();

        match cli.command {
            Commands::List {
                resource,
                sort,
                desc,
                order,
                ..
            } => {
                assert_eq!(resource, Resource::Students);
                assert_eq!(sort.as_deref(), Some("experience"));
                assert!(desc);
                assert_eq!(order, Some(Ranking::TopGems));
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(Cli::try_parse_from(["llama-admin", "list", "cycles", "--desc"]).is_err());
    }
}
