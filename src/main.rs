//! homedash - status poller and offline asset cache for a self-hosted homepage dashboard

use clap::Parser;
use log::LevelFilter;

mod cache;
mod cli;
mod client;
mod clock;
mod config;
mod error;
mod output;
mod status;
mod worker;

use cli::{AssetsCommands, Cli, Commands, ConfigCommands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `--debug` forces debug level; otherwise `RUST_LOG`, defaulting to warnings
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp_millis().init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Status => cli::status::run(&opts).await,
        Commands::Watch => cli::watch::run(&opts).await,
        Commands::Ip => cli::ip::run(&opts).await,
        Commands::Assets(cmd) => match cmd {
            AssetsCommands::Install => cli::assets::install(&opts).await,
            AssetsCommands::Activate => cli::assets::activate(&opts),
            AssetsCommands::Fetch { path, navigate } => {
                cli::assets::fetch(&opts, &path, navigate).await
            }
            AssetsCommands::List { store } => cli::assets::list(&opts, store.as_deref()),
            AssetsCommands::Status => cli::assets::status(&opts),
            AssetsCommands::Clear => cli::assets::clear(&opts),
            AssetsCommands::Path => cli::assets::path(&opts),
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cli::config::show(&opts),
            ConfigCommands::Path => cli::config::path(&opts),
            ConfigCommands::Init { force } => cli::config::init(&opts, force),
        },
    }
}
