use std::path::PathBuf;

use clap::{Parser, Subcommand};

use addon_repo::config::{RepoConfig, log_path};

#[derive(Parser)]
#[command(name = "addon-repo")]
#[command(version, about = "Add-on repository mirroring GitHub releases")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs to a file (defaults to the data directory)
    #[arg(long, global = true, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the repository over HTTP (default)
    Serve,
    /// Aggregate once and write a static repository directory
    Generate {
        /// Output directory
        #[arg(long, short)]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = cli.log_file.map(|path| path.unwrap_or_else(log_path));
    let _guard = addon_repo::logging::init(log_file.as_deref())?;

    let config = RepoConfig::load(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => runtime.block_on(addon_repo::server::run(config)),
        Command::Generate { out } => {
            runtime.block_on(addon_repo::repo::export::generate(&config, &out))
        }
    }
}
