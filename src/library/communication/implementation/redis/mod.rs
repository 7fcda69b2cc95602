//! Trait implementations using [`redis`](::redis)
//!
//! Queues are backed by [Redis Streams](https://redis.io/topics/streams-intro). Every stream entry
//! carries the serialized payload in the `payload` field and one additional field per
//! [header](super::super::event::MessageHeaders), prefixed with `header:`.

const STREAM_PAYLOAD_KEY: &str = "payload";
const STREAM_HEADER_PREFIX: &str = "header:";
const STREAM_ID_NEW: &str = "*";
const STREAM_ID_HEAD: &str = "0";
const STREAM_ID_TAIL: &str = "$";
const STREAM_ID_ADDITIONS: &str = ">";

use thiserror::Error;

mod factory;
mod publisher;
mod queue_entry;
mod queue_provider;

pub use factory::*;
pub use publisher::*;
pub use queue_entry::*;
pub use queue_provider::*;

/// Errors raised while reading entries from a stream
#[derive(Debug, Error)]
pub enum RedisQueueError {
    /// The entry has no payload field
    #[error("payload field missing from queue entry")]
    MissingPayload,
}
