//! Binary entry point for the tgraph CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Resolve two references in project 7 against core library 1 and library 2
//! tgraph --store corpus.json --core-library 1 --library 2 --project 7 \
//!     'p.A.run()' 'java.util.List<? extends java.lang.Number>[]'
//!
//! # Plain lookups only, keeping the synthesized rows
//! tgraph --store corpus.json --config tgraph.json --mode plain --save corpus.json p.A
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use typegraph::cli::{load_store, run_resolve, save_store};
use typegraph::error::{OutputErrorCode, TypegraphError};
use typegraph::output::{emit_response, ErrorResponse};
use typegraph_core::config::{CliOverrides, ConfigFile, ModelMode, ResolverConfig};
use typegraph_core::types::ProjectId;

// ============================================================================
// CLI Structure
// ============================================================================

/// Resolve Java references against a mined entity/relation store.
///
/// Output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "tgraph", version, about = "Resolve Java references over a mined corpus")]
struct Cli {
    /// Store snapshot (JSON) to resolve against.
    #[arg(long)]
    store: PathBuf,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model mode: plain or virtual.
    #[arg(long)]
    mode: Option<ModelMode>,

    /// Root object type array members dispatch to.
    #[arg(long)]
    root_type: Option<String>,

    /// Project id of the platform core library.
    #[arg(long)]
    core_library: Option<u32>,

    /// Project id placeholder rows are filed under.
    #[arg(long)]
    unknowns_project: Option<u32>,

    /// Library project ids (repeatable or comma-separated).
    #[arg(long = "library", value_delimiter = ',')]
    libraries: Vec<u32>,

    /// Project ids to resolve in (repeatable or comma-separated).
    #[arg(long = "project", value_delimiter = ',')]
    projects: Vec<u32>,

    /// Write the store back to this path after resolving.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Fully qualified names to resolve.
    #[arg(required = true)]
    fqns: Vec<String>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let ids = |ids: &[u32]| {
            if ids.is_empty() {
                None
            } else {
                Some(ids.iter().copied().map(ProjectId::new).collect())
            }
        };
        CliOverrides {
            root_type: self.root_type.clone(),
            mode: self.mode,
            core_library: self.core_library.map(ProjectId::new),
            unknowns_project: self.unknowns_project.map(ProjectId::new),
            libraries: ids(&self.libraries),
            projects: ids(&self.projects),
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: &Cli) -> Result<(), TypegraphError> {
    let file = match &cli.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => None,
    };
    let config = ResolverConfig::resolve(file.as_ref(), &cli.overrides())?;
    tracing::debug!(
        "Resolved config: mode={} ({:?}), {} libraries, {} projects",
        config.mode.value,
        config.mode.source,
        config.libraries.value.len(),
        config.projects.value.len()
    );

    let store = load_store(&cli.store)?;
    let response = run_resolve(&config, &store, &cli.fqns)?;
    if let Some(path) = &cli.save {
        save_store(&store, path)?;
    }

    emit_response(&response, &mut io::stdout()).map_err(|e| TypegraphError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}
