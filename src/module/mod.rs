//! Executable units built from the harness and the domain logic
//!
//! Each module can be launched through the binary and represents one role in a deployment.
//! Modules expose their command line options, which are built from the shared structures
//! in [`options`].

pub mod gateway;
pub mod options;
pub mod standalone;
pub mod worker;
