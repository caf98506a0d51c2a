use clap::Parser;
use resolver::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let code = resolver::cli::run(cli)?;
    std::process::exit(code);
}
