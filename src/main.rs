//! Litgroups CLI application entry point
//!
//! # Usage
//!
//! ```bash
//! # Import a library, then browse it through the built-in groups
//! litgroups docs import papers.json
//! litgroups presets
//! litgroups open favorites
//!
//! # Save a group from an explicit filter
//! litgroups groups create "Since 2020" --filter '{"year": {"$gte": 2020}}' --sort '{"year": -1}'
//!
//! # Or describe it in plain language
//! litgroups preview "2020年后的深度学习文献"
//! litgroups groups ask "2020年后的深度学习文献"
//!
//! # Quiet mode (only output ids and counts)
//! litgroups -q groups list
//! ```
//!
//! # Configuration
//!
//! Settings are read from `~/.config/litgroups/config.toml` on Linux and from
//! `LITGROUPS__*` environment variables. The API key for `ask` and `preview`
//! may also come from `DEEPSEEK_API_KEY`.

use litgroups::{
    LitError,
    cli::{Cli, Commands},
    commands,
    config::AppConfig,
    db::{Database, OwnerId},
    executor::Page,
    groups::GroupManager,
};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, LitError>;

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "litgroups=debug" } else { "litgroups=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load()?;
    if let Some(path) = &cli.db {
        config.database_path = Some(path.clone());
    }
    let quiet = cli.quiet;

    if let Commands::Config { command } = &cli.command {
        return commands::config(&config, command, quiet);
    }

    let owner = OwnerId::new(cli.owner.as_deref().unwrap_or(&config.owner))?;
    let db = Database::open(config.database_path()?)?;
    let manager = GroupManager::from_config(&db, &config.query);

    match &cli.command {
        Commands::Presets => commands::presets(&manager, &owner, quiet)?,
        Commands::Groups { command } => {
            commands::groups(&manager, || commands::translator(&config), &owner, command, quiet)?;
        }
        Commands::Open {
            reference,
            page,
            limit,
            json,
        } => {
            let page = Page::new(*page, limit.unwrap_or(config.query.default_page_size));
            commands::open(&manager, &owner, reference, page, *json, quiet)?;
        }
        Commands::Preview { text } => {
            let translator = commands::translator(&config)?;
            commands::preview(&manager, &translator, &owner, text, quiet)?;
        }
        Commands::Docs { command } => commands::docs(&db, &owner, command, quiet)?,
        Commands::Config { command } => commands::config(&config, command, quiet)?,
    }

    Ok(())
}
