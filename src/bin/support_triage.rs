use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;

use support_triage::config::{
    DEFAULT_BIND, LoadedConfig, load_config, request_timeout, resolve_base_url, resolve_log_path,
};
use support_triage::server::serve;
use support_triage::store::http::HttpEmailStore;
use support_triage::terminal::run_tui;

#[derive(Parser)]
#[command(name = "support_triage")]
#[command(about = "Triage support emails and edit AI-drafted replies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the triage TUI against an email store
    Tui {
        /// Store base URL (overrides env and config)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Serve a JSON fixture as a local email store
    Serve {
        /// Listen address, e.g. 127.0.0.1:8000
        #[arg(long)]
        bind: Option<String>,

        /// JSON array of emails
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
}

fn log_config_source(loaded: &LoadedConfig) {
    if loaded.template_written {
        log::info!("created template config at {}", loaded.path.display());
    } else {
        log::debug!("using config {}", loaded.path.display());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    let cfg = &loaded.config;

    match cli.cmd {
        Command::Tui { base_url } => {
            // the TUI owns the terminal, so logs go to a file
            let log_path = resolve_log_path(cfg)?;
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| anyhow!("cannot open log file {}: {e}", log_path.display()))?;
            env_logger::Builder::from_default_env()
                .target(env_logger::Target::Pipe(Box::new(log_file)))
                .init();
            log_config_source(&loaded);

            let base_url = resolve_base_url(cfg, base_url.as_deref())?;
            log::info!("using email store at {base_url}");
            let store = HttpEmailStore::new(&base_url, request_timeout(cfg))?;
            run_tui(Box::new(store))
        }

        Command::Serve { bind, fixture } => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init();
            log_config_source(&loaded);

            let bind = bind
                .or_else(|| cfg.bind.clone())
                .unwrap_or_else(|| DEFAULT_BIND.to_string());
            let fixture = fixture
                .or_else(|| cfg.fixture_path.as_ref().map(PathBuf::from))
                .ok_or_else(|| anyhow!("no fixture given: pass --fixture or set fixture_path"))?;
            serve(&bind, &fixture)
        }
    }
}
