use super::{super::super::EmptyResult, MessageHeaders, Notification, QueueDescriptor};
use async_trait::async_trait;

/// Structure which allows publishing of serialized data into a queue
#[async_trait]
pub trait RawNotificationPublisher {
    /// Sends an opaque payload with the given headers to a [`Queue`](QueueDescriptor)
    async fn publish_raw(
        &self,
        data: &[u8],
        headers: &MessageHeaders,
        descriptor: &QueueDescriptor,
    ) -> EmptyResult;
}

/// Publisher for [`Notifications`](Notification)
#[async_trait]
pub trait NotificationPublisher {
    /// Publishes a [`Notification`] to its designated queue
    async fn publish<N: Notification + Send + Sync>(&self, notification: &N) -> EmptyResult;

    /// Publishes a [`Notification`] with additional [`MessageHeaders`] to its designated queue
    async fn publish_with_headers<N: Notification + Send + Sync>(
        &self,
        notification: &N,
        headers: &MessageHeaders,
    ) -> EmptyResult;
}
