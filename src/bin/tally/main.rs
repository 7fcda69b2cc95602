use anyhow::Result;
use options::{Command, LogFormat};
use structopt::StructOpt;
use tally::harness::ModuleRunner;
use tally::module::gateway::Gateway;
use tally::module::standalone::Standalone;
use tally::module::worker::Worker;
use tracing::info;

mod options;

#[tokio::main]
async fn main() -> Result<()> {
    let (command, runner) = init()?;

    match command {
        Command::Worker(options) => runner.run(Worker::new(options)).await,
        Command::Gateway(options) => runner.run(Gateway::new(options)).await,
        Command::Standalone(options) => runner.run(Standalone::new(options)).await,
    };

    Ok(())
}

fn init() -> Result<(Command, ModuleRunner)> {
    let options = options::MainOptions::from_args();

    let formatter = tracing_subscriber::fmt().with_env_filter(options.log);

    match options.log_format {
        LogFormat::Text => formatter.init(),
        LogFormat::Compact => formatter.compact().init(),
        LogFormat::Json => formatter.json().init(),
    };

    info!("Tally {}", env!("CARGO_PKG_VERSION"));

    Ok((options.command, ModuleRunner::default()))
}
