//! Calculator specific structures, implementations, and logic

pub mod decimal;

mod calculator;
mod operation;
mod request;
mod response;

pub use calculator::*;
pub use operation::*;
pub use request::*;
pub use response::*;
