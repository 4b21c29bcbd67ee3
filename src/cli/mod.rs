//! CLI command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};

pub mod assets;
pub mod config;
pub mod context;
pub mod ip;
pub mod status;
pub mod watch;

pub use context::{CommandContext, GlobalOptions};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-oriented colored output
    #[default]
    Pretty,
    /// JSON: wrapped objects for one-shot commands, one event per line for views
    Json,
}

/// homedash - status poller and offline asset cache for a homepage dashboard
#[derive(Parser, Debug)]
#[command(name = "homedash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, json)
    #[arg(
        long,
        global = true,
        env = "HOMEDASH_FORMAT",
        default_value = "pretty",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Dashboard backend base URL (overrides the config file)
    #[arg(long, global = true, env = "HOMEDASH_URL", hide_env = true)]
    pub url: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "HOMEDASH_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "HOMEDASH_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the backend once and show its status (exit 1 when offline)
    Status,

    /// Keep the status view live: periodic refresh, retries while offline
    Watch,

    /// Show LAN and public network addresses
    Ip,

    /// Manage the offline asset cache
    #[command(subcommand)]
    Assets(AssetsCommands),

    /// Show or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Asset cache subcommands
#[derive(Subcommand, Debug)]
pub enum AssetsCommands {
    /// Cache the asset manifest and activate the current generation
    Install,

    /// Remove stores from other generations and take control of fetches
    Activate,

    /// Fetch a path through the asset cache
    Fetch {
        /// Path (or full URL) to request, e.g. /static/js/app.js
        path: String,

        /// Treat the request as a page navigation
        #[arg(long)]
        navigate: bool,
    },

    /// List cached responses
    List {
        /// Store to list (defaults to the current generation)
        #[arg(long)]
        store: Option<String>,
    },

    /// Show cache statistics per store
    Status,

    /// Delete every store and entry
    Clear,

    /// Print the cache directory
    Path,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
