use std::str::FromStr;
use structopt::StructOpt;
use thiserror::Error;

#[derive(Debug, StructOpt)]
#[structopt(
    about = "Distributed arbitrary precision calculator on top of a message bus.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct MainOptions {
    /// Log level, scopable to different modules
    ///
    /// Levels: trace, debug, info, warn, error
    #[structopt(
        short,
        long,
        global = true,
        default_value = "info,hyper=warn,warp=warn",
        env = "RUST_LOG",
        value_name = "level"
    )]
    pub log: String,

    /// Format of log lines
    ///
    /// Formats: text, compact, json
    #[structopt(long, global = true, default_value = "text", env, value_name = "format")]
    pub log_format: LogFormat,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug)]
pub enum LogFormat {
    Text,
    Compact,
    Json,
}

#[derive(Debug, Error)]
#[error("unknown log format '{0}'")]
pub struct UnknownLogFormat(String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(UnknownLogFormat(s.to_owned())),
        }
    }
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Performs calculations requested through the message bus
    Worker(tally::module::worker::Options),
    /// Serves the HTTP interface and forwards calculations to workers
    Gateway(tally::module::gateway::Options),
    /// Runs a worker and a gateway in one process without external dependencies
    Standalone(tally::module::standalone::Options),
}
