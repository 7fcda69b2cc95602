//! HTTP entry point forwarding calculations to the workers
//!
//! Each request is published with a fresh correlation identifier and the shared reply queue as
//! its reply location. Every gateway instance reads the reply queue through a consumer group of
//! its own so that it observes every reply and picks out the ones it is waiting for.

mod client;
mod options;
mod server;
mod services;

use crate::domain::CalculationRequest;
use crate::harness::{Heart, Module, RedisCommunicationFactory, ServiceRunner};
use crate::library::communication::event::{
    ConsumerGroupDescriptor, ConsumerGroupIdentifier, QueueLocation,
};
use crate::library::communication::request::{CorrelatingRequestor, PendingReplies};
use crate::library::communication::CommunicationFactory;
use crate::library::BoxedError;
use async_trait::async_trait;
use jatsl::{schedule, JobScheduler};
use std::time::Duration;

pub use client::{CalculationFailure, CalculatorClient};
pub use options::Options;
pub use server::{routes, ServerJob};
pub use services::{ReplyListenerConfig, ReplyListenerService};

/// Requestor used by gateways built on a given [`CommunicationFactory`]
pub type GatewayRequestor<F> =
    CorrelatingRequestor<<F as CommunicationFactory>::NotificationPublisher, CalculationRequest>;

/// Consumer group through which the gateway instance `id` reads replies
pub fn consumer_group(id: &str) -> ConsumerGroupDescriptor {
    ConsumerGroupDescriptor::new(
        ConsumerGroupIdentifier::Gateway(id.to_owned()),
        QueueLocation::Tail,
    )
}

/// Jobs that make up a gateway instance
pub struct GatewayJobs<F: CommunicationFactory + Send + Sync> {
    /// Consumer of the reply queue
    pub listener: ServiceRunner<ReplyListenerService, F>,
    /// HTTP server
    pub server: ServerJob<GatewayRequestor<F>>,
}

impl<F> GatewayJobs<F>
where
    F: CommunicationFactory + Send + Sync,
{
    /// Wires the reply listener and the HTTP server to a shared registry of pending replies
    pub fn new(
        factory: F,
        id: &str,
        service: &'static str,
        reply_queue: String,
        port: u16,
        reply_timeout: Duration,
    ) -> Self {
        let pending = PendingReplies::default();

        let requestor = CorrelatingRequestor::new(
            factory.notification_publisher(),
            pending.clone(),
            reply_queue.clone(),
        );
        let client = CalculatorClient::new(requestor, reply_timeout);

        let config = ReplyListenerConfig {
            pending,
            reply_queue,
        };
        let listener = ServiceRunner::new(factory, consumer_group(id), id.to_owned(), config);

        Self {
            listener,
            server: ServerJob::new(port, service, client),
        }
    }
}

/// Module implementation
pub struct Gateway {
    options: Options,
}

impl Gateway {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Gateway {
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = RedisCommunicationFactory::new(&self.options.redis.url)?;

        let GatewayJobs { listener, server } = GatewayJobs::new(
            factory,
            &self.options.queueing.id,
            "gateway",
            self.options.reply_queue.clone(),
            self.options.http.port,
            self.options.http.reply_timeout,
        );

        schedule!(scheduler, { listener, server });

        Ok(Some(Heart::without_heart_stone()))
    }
}
