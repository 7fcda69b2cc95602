use super::super::super::BoxedError;
use super::{ConsumerGroupDescriptor, QueueDescriptor, QueueEntry};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::time::Duration;

/// Allows consumption of notification queues using [consumer groups](ConsumerGroupDescriptor)
#[async_trait]
pub trait QueueProvider {
    /// Type of [`QueueEntry`] returned by the provider
    type Entry: QueueEntry + Send + Sync;

    /// Subscribes to new notifications on a given queue joining the specified [`ConsumerGroup`](ConsumerGroupDescriptor)
    /// with the given [`ConsumerIdentifier`](super::ConsumerIdentifier) or creates it if it does not exist.
    ///
    /// When an `idle_timeout` is provided, the stream ends once no entry arrived within that duration.
    async fn consume(
        &self,
        queue: &QueueDescriptor,
        group: &ConsumerGroupDescriptor,
        consumer: &str, // &ConsumerIdentifier
        batch_size: usize,
        idle_timeout: Option<Duration>,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError>;
}
