use clap::Parser;
use swmm_cli::{Cli, Commands, SwmmConfig};
use tracing::debug;
use tracing_subscriber::FmtSubscriber;

mod commands;

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SwmmConfig::load(cli.config.as_deref())?;
    let level = match cli.log_level {
        Some(level) => level,
        None => config.log_level()?,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    debug!(?level, "logging configured");

    match &cli.command {
        Commands::Import { inp, out } => commands::import::handle(inp, out, &config),
        Commands::Export { dir, inp } => commands::export::handle(dir, inp, &config),
        Commands::Sections => commands::sections::handle(),
    }
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
