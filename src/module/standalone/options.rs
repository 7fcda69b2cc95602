use crate::module::options::HttpOptions;
use structopt::StructOpt;

/// Options for the standalone module
#[derive(Debug, StructOpt)]
pub struct Options {
    #[allow(missing_docs)]
    #[structopt(flatten)]
    pub http: HttpOptions,
}
