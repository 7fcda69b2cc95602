use super::event::{NotificationPublisher, QueueProvider};
use super::request::ResponsePublisher;

/// Factory to create communication primitives backed by a specific message bus
pub trait CommunicationFactory {
    /// [`QueueProvider`] implementation
    type QueueProvider: QueueProvider + Send + Sync;
    /// [`NotificationPublisher`] implementation
    type NotificationPublisher: NotificationPublisher + Send + Sync;
    /// [`ResponsePublisher`] implementation
    type ResponsePublisher: ResponsePublisher + Send + Sync;

    /// Creates a new [`QueueProvider`]
    fn queue_provider(&self) -> Self::QueueProvider;

    /// Creates a new [`NotificationPublisher`]
    fn notification_publisher(&self) -> Self::NotificationPublisher;

    /// Creates a new [`ResponsePublisher`]
    fn response_publisher(&self) -> Self::ResponsePublisher;
}
