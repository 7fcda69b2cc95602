use super::super::super::BoxedError;
use super::MessageHeaders;
use crate::library::EmptyResult;
use async_trait::async_trait;
use serde::Deserialize;

/// Describes a notification queue and its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDescriptor {
    key: String,
    limit: usize,
}

impl QueueDescriptor {
    /// Creates a new instance from raw parts
    pub fn new(key: String, limit: usize) -> Self {
        Self { key, limit }
    }

    /// Value which may be used by queue implementations to identify a queue
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Maximum number of notifications to be retained in the queue
    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Location within the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueLocation {
    /// Start of the queue (not necessarily the first notification as a queue is limited in length)
    Head,
    /// End of the queue (exclusive of the last message)
    Tail,
}

/// Entry retrieved from a [`Queue`](QueueDescriptor) providing a raw payload
#[async_trait]
pub trait RawQueueEntry {
    /// Payload of the item
    fn payload(&self) -> &[u8];

    /// Metadata the item was published with
    fn headers(&self) -> &MessageHeaders;

    /// Acknowledge the item as processed
    async fn acknowledge(&mut self) -> EmptyResult;
}

/// Useful functions for [`QueueEntry`] implementations with default implementations
pub trait QueueEntry: RawQueueEntry {
    /// Attempts to parse the wire-format payload into a given data structure
    fn parse_payload<'a, T>(&'a self) -> Result<T, BoxedError>
    where
        T: Deserialize<'a>;
}
