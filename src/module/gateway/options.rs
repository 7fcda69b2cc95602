use crate::module::options::{HttpOptions, QueueingOptions, RedisOptions};
use structopt::StructOpt;

/// Options for the gateway module
#[derive(Debug, StructOpt)]
pub struct Options {
    /// Queue on which this instance expects replies.
    /// It may be shared with other gateway instances.
    #[structopt(long, env, default_value = "calculator.replies", value_name = "key")]
    pub reply_queue: String,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub http: HttpOptions,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub queueing: QueueingOptions,

    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub redis: RedisOptions,
}
