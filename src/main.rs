use ansiterm::cli::{Cli, Command};
use ansiterm::config::Config;
use ansiterm::demo::{self, Drawing, KeyInspector};
use ansiterm::term::{Device, StdoutDevice};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ansiterm: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    ansiterm::logging::init_tracing()?;
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    tracing::info!(?config, "starting");

    match cli.command {
        Command::Keys {
            unhandled_interrupt,
        } => demo::run(KeyInspector::new(!unhandled_interrupt), &config).await?,
        Command::Draw => demo::run(Drawing::new(), &config).await?,
        Command::Size => {
            let size = StdoutDevice::new().size()?;
            println!("current: {:3} x {:3}", size.columns, size.rows);
        }
    }
    Ok(())
}
