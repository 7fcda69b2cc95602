//! In-process message bus
//!
//! Provides the same semantics as the networked implementations within a single process:
//! every [consumer group](ConsumerGroupDescriptor) of a queue receives each message, and within
//! a group every message is handed to exactly one consumer. Groups only see messages published
//! after they have been created, regardless of the requested [`QueueLocation`](super::super::event::QueueLocation),
//! so groups should be [declared](MemoryBus::declare) before anything is published.

use super::super::event::{
    ConsumerGroupDescriptor, MessageHeaders, QueueDescriptor, QueueProvider,
    RawNotificationPublisher, RawQueueEntry,
};
use super::super::request::RawResponsePublisher;
use super::super::CommunicationFactory;
use super::json::{JsonNotificationPublisher, JsonQueueEntry, JsonResponsePublisher};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct MemoryMessage {
    payload: Vec<u8>,
    headers: MessageHeaders,
}

type SharedReceiver = Arc<Mutex<mpsc::UnboundedReceiver<MemoryMessage>>>;

#[derive(Clone)]
struct MemoryGroup {
    sender: mpsc::UnboundedSender<MemoryMessage>,
    receiver: SharedReceiver,
}

impl MemoryGroup {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }
}

#[derive(Default)]
struct MemoryBusState {
    queues: Mutex<HashMap<String, HashMap<String, MemoryGroup>>>,
    acknowledged: AtomicUsize,
}

/// Message bus living in the memory of the current process
///
/// Clones share the same queues.
#[derive(Clone, Default)]
pub struct MemoryBus {
    state: Arc<MemoryBusState>,
}

impl MemoryBus {
    /// Creates the consumer group on the queue if it does not exist yet
    pub async fn declare(&self, queue: &QueueDescriptor, group: &ConsumerGroupDescriptor) {
        self.group_receiver(queue.key(), &group.identifier().to_string())
            .await;
    }

    /// Observes every message published to the queue from now on through a private consumer group
    pub async fn subscribe(&self, key: &str) -> BoxStream<'static, (Vec<u8>, MessageHeaders)> {
        let group = format!("subscription-{}", Uuid::new_v4());
        let receiver = self.group_receiver(key, &group).await;

        stream::unfold(receiver, |receiver| async move {
            let message = receiver.lock().await.recv().await?;
            Some(((message.payload, message.headers), receiver))
        })
        .boxed()
    }

    /// Total number of entries acknowledged by consumers
    pub fn acknowledged(&self) -> usize {
        self.state.acknowledged.load(Ordering::SeqCst)
    }

    async fn group_receiver(&self, key: &str, group: &str) -> SharedReceiver {
        let mut queues = self.state.queues.lock().await;

        queues
            .entry(key.to_owned())
            .or_default()
            .entry(group.to_owned())
            .or_insert_with(MemoryGroup::new)
            .receiver
            .clone()
    }

    async fn deliver(&self, key: &str, message: MemoryMessage) {
        let queues = self.state.queues.lock().await;

        if let Some(groups) = queues.get(key) {
            for group in groups.values() {
                // The receiving half lives as long as the group so this can not fail
                group.sender.send(message.clone()).ok();
            }
        }
    }
}

#[async_trait]
impl RawNotificationPublisher for MemoryBus {
    async fn publish_raw(
        &self,
        data: &[u8],
        headers: &MessageHeaders,
        descriptor: &QueueDescriptor,
    ) -> EmptyResult {
        let message = MemoryMessage {
            payload: data.to_vec(),
            headers: headers.clone(),
        };

        self.deliver(descriptor.key(), message).await;

        Ok(())
    }
}

#[async_trait]
impl RawResponsePublisher for MemoryBus {
    async fn publish_raw(
        &self,
        data: &[u8],
        headers: &MessageHeaders,
        location: &str,
    ) -> EmptyResult {
        let message = MemoryMessage {
            payload: data.to_vec(),
            headers: headers.clone(),
        };

        self.deliver(location, message).await;

        Ok(())
    }
}

impl JsonNotificationPublisher for MemoryBus {}
impl JsonResponsePublisher for MemoryBus {}

#[async_trait]
impl QueueProvider for MemoryBus {
    type Entry = MemoryQueueEntry;

    async fn consume(
        &self,
        queue: &QueueDescriptor,
        group: &ConsumerGroupDescriptor,
        _consumer: &str,
        _batch_size: usize,
        idle_timeout: Option<Duration>,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError> {
        let receiver = self
            .group_receiver(queue.key(), &group.identifier().to_string())
            .await;
        let state = self.state.clone();

        let stream = stream::unfold(
            (receiver, state),
            move |(receiver, state)| async move {
                let message = {
                    let mut receiver = receiver.lock().await;

                    match idle_timeout {
                        Some(idle_timeout) => timeout(idle_timeout, receiver.recv()).await.ok()?,
                        None => receiver.recv().await,
                    }
                }?;

                let entry = MemoryQueueEntry {
                    message,
                    state: state.clone(),
                };

                Some((Ok(entry), (receiver, state)))
            },
        )
        .boxed();

        Ok(stream)
    }
}

/// Entry retrieved from a [`MemoryBus`]
pub struct MemoryQueueEntry {
    message: MemoryMessage,
    state: Arc<MemoryBusState>,
}

#[async_trait]
impl RawQueueEntry for MemoryQueueEntry {
    fn payload(&self) -> &[u8] {
        &self.message.payload
    }

    fn headers(&self) -> &MessageHeaders {
        &self.message.headers
    }

    async fn acknowledge(&mut self) -> EmptyResult {
        self.state.acknowledged.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl JsonQueueEntry for MemoryQueueEntry {}

impl CommunicationFactory for MemoryBus {
    type QueueProvider = MemoryBus;
    type NotificationPublisher = MemoryBus;
    type ResponsePublisher = MemoryBus;

    fn queue_provider(&self) -> Self::QueueProvider {
        self.clone()
    }

    fn notification_publisher(&self) -> Self::NotificationPublisher {
        self.clone()
    }

    fn response_publisher(&self) -> Self::ResponsePublisher {
        self.clone()
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::library::communication::event::{ConsumerGroupIdentifier, QueueLocation};
    use pretty_assertions::assert_eq;

    fn queue() -> QueueDescriptor {
        QueueDescriptor::new("numbers".into(), 10)
    }

    fn group(name: &str) -> ConsumerGroupDescriptor {
        ConsumerGroupDescriptor::new(
            ConsumerGroupIdentifier::Other(name.into()),
            QueueLocation::Head,
        )
    }

    async fn publish(bus: &MemoryBus, payload: &[u8]) {
        RawNotificationPublisher::publish_raw(bus, payload, &MessageHeaders::default(), &queue())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn drop_messages_without_groups() {
        let bus = MemoryBus::default();
        publish(&bus, b"lost").await;

        let mut stream = bus
            .consume(&queue(), &group("late"), "a", 1, Some(Duration::from_millis(10)))
            .await
            .unwrap();

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn fan_out_across_groups() {
        let bus = MemoryBus::default();
        bus.declare(&queue(), &group("first")).await;
        bus.declare(&queue(), &group("second")).await;

        publish(&bus, b"1").await;

        for name in ["first", "second"] {
            let mut stream = bus
                .consume(&queue(), &group(name), "a", 1, Some(Duration::from_millis(10)))
                .await
                .unwrap();
            let entry = stream.next().await.unwrap().unwrap();
            assert_eq!(entry.payload(), b"1");
        }
    }

    #[tokio::test]
    async fn distribute_within_group() {
        let bus = MemoryBus::default();
        bus.declare(&queue(), &group("workers")).await;

        publish(&bus, b"1").await;
        publish(&bus, b"2").await;

        let idle = Some(Duration::from_millis(10));
        let mut first = bus
            .consume(&queue(), &group("workers"), "a", 1, idle)
            .await
            .unwrap();
        let mut second = bus
            .consume(&queue(), &group("workers"), "b", 1, idle)
            .await
            .unwrap();

        let a = first.next().await.unwrap().unwrap();
        let b = second.next().await.unwrap().unwrap();

        assert_eq!(a.payload(), b"1");
        assert_eq!(b.payload(), b"2");
        assert!(first.next().await.is_none());
        assert!(second.next().await.is_none());
    }

    #[tokio::test]
    async fn transport_headers_and_count_acknowledgements() {
        let bus = MemoryBus::default();
        bus.declare(&queue(), &group("workers")).await;

        let headers = MessageHeaders::default().with("reply-to", "somewhere");
        RawNotificationPublisher::publish_raw(&bus, b"1", &headers, &queue())
            .await
            .unwrap();

        let mut stream = bus
            .consume(&queue(), &group("workers"), "a", 1, None)
            .await
            .unwrap();
        let mut entry = stream.next().await.unwrap().unwrap();

        assert_eq!(entry.headers(), &headers);
        entry.acknowledge().await.unwrap();
        assert_eq!(bus.acknowledged(), 1);
    }

    #[tokio::test]
    async fn route_replies_to_their_location() {
        let bus = MemoryBus::default();
        let mut replies = bus.subscribe("elsewhere").await;

        RawResponsePublisher::publish_raw(&bus, b"payload", &MessageHeaders::default(), "elsewhere")
            .await
            .unwrap();

        let (payload, _) = replies.next().await.unwrap();
        assert_eq!(payload, b"payload".to_vec());
    }
}
