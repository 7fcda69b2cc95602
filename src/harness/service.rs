use crate::library::communication::event::{ConsumerExt, ConsumerGroupDescriptor, QueueDescriptor};
use crate::library::communication::CommunicationFactory;
use crate::library::EmptyResult;
use async_trait::async_trait;
use jatsl::{Job, JobManager};
use thiserror::Error;
use tracing::info;

/// Structure which can be instantiated with a [`CommunicationFactory`]
pub trait Service<F: CommunicationFactory + Send + Sync> {
    /// Name of the service displayed in log messages
    const NAME: &'static str;
    /// Instance type which will be instantiated
    type Instance: Send + Sync;
    /// Configuration type passed to the service
    type Config: Send + Sync;

    /// Queue the instance consumes
    fn queue(config: &Self::Config) -> QueueDescriptor;

    /// Creates a new instance which could be of a different type.
    /// This is common when `Self: RequestProcessor` where this
    /// function would return an instance of [`Responder`](crate::library::communication::request::Responder)
    /// containing an instance of `Self`.
    fn instantiate(factory: F, config: &Self::Config) -> Self::Instance;
}

/// The queue a service consumed has been closed
#[derive(Debug, Error)]
#[error("queue {0} has been closed")]
pub struct QueueClosed(String);

/// Runner for [`Service`] implementations where [`Service::Instance`] is conforming to the [`ConsumerExt`] trait
pub struct ServiceRunner<S: Service<F>, F: CommunicationFactory + Send + Sync> {
    factory: F,
    group: ConsumerGroupDescriptor,
    consumer: String,
    config: S::Config,
}

impl<S, F> ServiceRunner<S, F>
where
    S: Service<F>,
    F: CommunicationFactory + Send + Sync,
{
    /// Creates a new runner job which will use the provided factory, consumer group and name.
    pub fn new(
        factory: F,
        group: ConsumerGroupDescriptor,
        consumer: String,
        config: S::Config,
    ) -> Self {
        Self {
            factory,
            group,
            consumer,
            config,
        }
    }
}

#[async_trait]
impl<S, F> Job for ServiceRunner<S, F>
where
    S: Service<F> + Send + Sync,
    S::Instance: ConsumerExt,
    F: CommunicationFactory + Clone + Send + Sync,
{
    const NAME: &'static str = "ServiceRunner";

    fn name(&self) -> String {
        format!("{}({})", Self::NAME, S::NAME)
    }

    async fn execute(&self, manager: JobManager) -> EmptyResult {
        let queue = S::queue(&self.config);
        let provider = self.factory.queue_provider();
        let service = S::instantiate(self.factory.clone(), &self.config);

        info!(queue = queue.key(), group = %self.group.identifier(), "Consuming queue");
        manager.ready().await;

        service
            .consume_queue(provider, &queue, &self.group, &self.consumer)
            .await?;

        Err(QueueClosed(queue.key().to_owned()).into())
    }
}
