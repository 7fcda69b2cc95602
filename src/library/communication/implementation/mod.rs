//! Implementations of the communication traits for different message busses

pub mod json;
pub mod memory;
pub mod redis;
