//! This library crate contains everything required to run a distributed calculator on top of a message bus.
//!
//! Submodules have been introduced to split responsibilities. Each module has a specific focus
//! and they together form a chain of dependencies from the low-level [`library`], over the calculator [`domain`]
//! specific logic, through the executable [`harness`], up to the high-level [`modules`](module) and contained service implementations.

#![warn(missing_docs)]

pub mod constants;
pub mod domain;
pub mod harness;
pub mod library;
pub mod module;
