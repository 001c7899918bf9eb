mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so that JSON output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("convergent=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Init(args) => commands::registers::init(&cli, args),
        Commands::Add(args) => commands::registers::add(&cli, args),
        Commands::Remove(args) => commands::registers::remove(&cli, args),
        Commands::Update(args) => commands::registers::update(&cli, args),
        Commands::Assign(args) => commands::registers::assign(&cli, args),
        Commands::Increment(args) => commands::registers::increment(&cli, args),
        Commands::Show(args) => commands::show::run(&cli, args),
        Commands::Demo => commands::demo::run(cli.format),
    }
}
