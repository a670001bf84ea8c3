use crate::{
    commands::{Commands, GlobalArgs},
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use engine_config::{
    env::EnvManager,
    settings::{SettingsBuilder, ValidatedSettings},
};
use engine_core::fetch::fetch_all;
use engine_runtime::{
    error::ViewError,
    execution::factory::{create_reader, create_session},
    view::{Applied, TableSession},
};
use model::view::state::{SortDirection, SortState};
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod browse;
mod commands;
mod error;
mod output;
mod shutdown;

/// Read when no `--env-file` is given and the file exists.
const DEFAULT_ENV_FILE: &str = ".tablescope/env";

#[derive(Parser, Debug)]
#[command(
    name = "tablescope",
    version,
    about = "Browse a paged remote table from the terminal"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match run(cli, &shutdown).await {
        Ok(()) if shutdown.is_shutdown_requested() => ExitCode::ShutdownRequested,
        Ok(()) => ExitCode::Success,
        Err(CliError::ShutdownRequested) => ExitCode::ShutdownRequested,
        Err(err) => {
            error!("{err}");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(cli: Cli, shutdown: &ShutdownCoordinator) -> Result<(), CliError> {
    let settings = load_settings(&cli.global)?;
    let cancel = shutdown.cancel_token();

    match cli.command {
        Commands::View {
            filter,
            sort,
            desc,
            page,
            json,
        } => {
            let mut session = open_session(&settings, cancel).await?;
            if let Some(text) = filter {
                session.set_filter(&text);
            }
            if let Some(column) = sort {
                let direction = if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                session.set_sort(SortState::by(column, direction));
            }
            walk_to(&mut session, page).await?;
            session.ensure_ready()?;

            let snapshot = session.snapshot();
            if json {
                println!("{}", output::render_json(&snapshot)?);
            } else {
                println!("{}", output::render_table(&snapshot));
            }
            if let Some(error) = session.status().error() {
                warn!(error, "Showing incomplete data");
            }
        }
        Commands::Columns => {
            let session = open_session(&settings, cancel).await?;
            println!("{}", output::render_columns(&session.columns()));
        }
        Commands::Fetch { output } => {
            let reader = create_reader(&settings)?;
            let outcome = fetch_all(&reader, &cancel).await;
            if shutdown.is_shutdown_requested() {
                return Err(CliError::ShutdownRequested);
            }
            if let Some(err) = &outcome.error {
                if err.is_auth() {
                    return Err(ViewError::Unauthenticated(err.to_string()).into());
                }
                if !err.keeps_partial_rows() {
                    return Err(ViewError::LoadFailed(err.to_string()).into());
                }
                warn!(%err, rows = outcome.rows.len(), "Fetch ended early, writing partial rows");
            }
            output::write_rows(&outcome.rows, output.as_deref()).await?;
            info!(rows = outcome.rows.len(), pages = outcome.pages, "Rows written");
        }
        Commands::Browse => {
            let mut session = create_session(&settings, cancel.clone())?;
            session.load().await?;
            let stdin = BufReader::new(tokio::io::stdin());
            browse::run(&mut session, stdin, cancel).await?;
        }
    }

    Ok(())
}

/// Defaults, then the process environment, then the `.env` file, then flags.
fn load_settings(global: &GlobalArgs) -> Result<ValidatedSettings, CliError> {
    let mut env = EnvManager::new();
    match env_file(global) {
        Some(path) => {
            info!(path = %path.display(), "Loading settings file");
            env.load_from_file(&path)?;
        }
        None => info!("No settings file, using the process environment"),
    }

    let settings = SettingsBuilder::from_env(&env)
        .endpoint(global.endpoint.clone())
        .fetch_mode(global.mode.clone())
        .fetch_page_size(global.page_size)
        .view_page_size(global.view_page_size)
        .build()?;
    Ok(settings)
}

fn env_file(global: &GlobalArgs) -> Option<PathBuf> {
    if let Some(path) = &global.env_file {
        return Some(path.clone());
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_ENV_FILE))
        .filter(|path| path.is_file())
}

async fn open_session(
    settings: &ValidatedSettings,
    cancel: CancellationToken,
) -> Result<TableSession, CliError> {
    let mut session = create_session(settings, cancel.clone())?;
    session.load().await?;
    if cancel.is_cancelled() {
        return Err(CliError::ShutdownRequested);
    }
    session.ensure_ready()?;
    Ok(session)
}

/// Moves to `page`, loading more remote pages until it exists or the
/// table runs out.
async fn walk_to(session: &mut TableSession, page: usize) -> Result<(), CliError> {
    while session.snapshot().total_pages < page && session.has_more() {
        if session.more().await? == Applied::Unchanged {
            break;
        }
        session.ensure_ready()?;
        if session.status().error().is_some() {
            break;
        }
    }
    session.go_to(page);
    Ok(())
}
