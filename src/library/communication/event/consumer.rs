use super::super::super::EmptyResult;
use super::{ConsumerGroupDescriptor, NotificationFrame, QueueDescriptor};
use super::{QueueEntry, QueueProvider, RawQueueEntry};
use async_trait::async_trait;
use futures::StreamExt;
use log::warn;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::time::Duration;

const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_CONCURRENCY: usize = DEFAULT_BATCH_SIZE;
const DEFAULT_IDLE_TIMEOUT: Option<Duration> = None;

/// Entity which may consume and process messages received from a queue
#[async_trait]
pub trait Consumer {
    /// Message to consume
    type Notification: DeserializeOwned + Send + Sync;

    /// Processes a message and returns whether it succeeded or failed
    async fn consume(&self, frame: NotificationFrame<Self::Notification>) -> EmptyResult;
}

/// Helper functions to aid the consumption of messages
#[async_trait]
pub trait ConsumerExt {
    /// Consumes messages from a queue using the given provider, processing each in its own task.
    ///
    /// Entries are acknowledged when they have been processed successfully. Entries whose
    /// payload can not be decoded are acknowledged as well so they are dropped instead of
    /// being redelivered forever.
    async fn consume_queue<Q>(
        &self,
        provider: Q,
        queue: &QueueDescriptor,
        group: &ConsumerGroupDescriptor,
        consumer: &str, // &ConsumerIdentifier
    ) -> EmptyResult
    where
        Q: QueueProvider + Send + Sync;
}

#[async_trait]
impl<C> ConsumerExt for C
where
    C: Consumer + Send + Sync,
{
    async fn consume_queue<Q>(
        &self,
        provider: Q,
        queue: &QueueDescriptor,
        group: &ConsumerGroupDescriptor,
        consumer: &str, // &ConsumerIdentifier
    ) -> EmptyResult
    where
        Q: QueueProvider + Send + Sync,
    {
        let stream = provider
            .consume(
                queue,
                group,
                consumer,
                DEFAULT_BATCH_SIZE,
                DEFAULT_IDLE_TIMEOUT,
            )
            .await?;

        stream
            .for_each_concurrent(Some(DEFAULT_CONCURRENCY), |item| async move {
                match item {
                    Ok(mut entry) => {
                        let processed = match entry.parse_payload::<C::Notification>() {
                            Ok(notification) => {
                                let frame =
                                    NotificationFrame::new(entry.headers().clone(), notification);

                                match self.consume(frame).await {
                                    Ok(_) => true,
                                    Err(e) => {
                                        warn!(
                                            "Failed to consume {}: {}",
                                            type_name::<C::Notification>(),
                                            e
                                        );
                                        false
                                    }
                                }
                            }
                            Err(e) => {
                                warn!(
                                    "Dropping undecodable {}: {}",
                                    type_name::<C::Notification>(),
                                    e
                                );
                                true
                            }
                        };

                        if processed {
                            if let Err(e) = entry.acknowledge().await {
                                warn!(
                                    "Failed to acknowledge {}: {}",
                                    type_name::<C::Notification>(),
                                    e
                                )
                            }
                        }
                    }
                    Err(e) => warn!(
                        "Failed to receive notification {}: {}",
                        type_name::<C::Notification>(),
                        e
                    ),
                }
            })
            .await;

        Ok(())
    }
}
