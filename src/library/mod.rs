//! Generic structures that are not specific to the calculator

pub mod communication;
pub mod helpers;

/// Boxed error type that can be sent between threads
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type with an empty success value and a [`BoxedError`]
pub type EmptyResult = Result<(), BoxedError>;
