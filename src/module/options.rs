//! Various options usable by modules
//!
//! The structs in this module allow other modules to flatten them into
//! their own options struct. This allows for a unified yet non-cluttered
//! option set.

use crate::library::helpers::parse_seconds;
use std::time::Duration;
use structopt::StructOpt;

/// Options for connecting to the Redis server
#[derive(Debug, StructOpt)]
pub struct RedisOptions {
    /// Redis database server URL
    #[structopt(
        short = "r",
        long = "redis",
        env = "REDIS",
        global = true,
        default_value = "redis://localhost/",
        value_name = "url"
    )]
    pub url: String,
}

/// Options relevant for message queueing
#[derive(Debug, StructOpt)]
pub struct QueueingOptions {
    /// Unique and stable identifier for this instance.
    /// It is used to identify and resume work after a crash
    /// or deliberate restart, thus it may not change across
    /// executions!
    #[structopt(env)]
    pub id: String,
}

/// Options for serving the HTTP interface and awaiting replies
#[derive(Debug, StructOpt)]
pub struct HttpOptions {
    /// Port on which the HTTP server listens
    #[structopt(short, long, env, default_value = "8080", value_name = "port")]
    pub port: u16,

    /// Number of seconds to wait for a calculator to reply
    #[structopt(
        long,
        env,
        default_value = "10",
        parse(try_from_str = parse_seconds),
        value_name = "seconds"
    )]
    pub reply_timeout: Duration,
}
