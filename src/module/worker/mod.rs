//! Performs calculations requested through the request queue
//!
//! All workers share the [`Calculator`](ConsumerGroupIdentifier::Calculator) consumer group so
//! that every request is processed by exactly one of them. Replies are published to the
//! location named in the request metadata.

mod handler;
mod options;
mod services;

use crate::harness::{Heart, Module, RedisCommunicationFactory, ServiceRunner};
use crate::library::communication::event::{
    ConsumerGroupDescriptor, ConsumerGroupIdentifier, QueueLocation,
};
use crate::library::BoxedError;
use async_trait::async_trait;
use jatsl::{schedule, JobScheduler};

pub use handler::CalculationRequestHandler;
pub use options::Options;
pub use services::CalculatorService;

/// Consumer group shared by all workers
pub fn consumer_group() -> ConsumerGroupDescriptor {
    ConsumerGroupDescriptor::new(ConsumerGroupIdentifier::Calculator, QueueLocation::Head)
}

/// Module implementation
pub struct Worker {
    options: Options,
}

impl Worker {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Worker {
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let factory = RedisCommunicationFactory::new(&self.options.redis.url)?;
        let consumer = self.options.queueing.id.clone();

        let runner =
            ServiceRunner::<CalculatorService, _>::new(factory, consumer_group(), consumer, ());
        schedule!(scheduler, { runner });

        Ok(Some(Heart::without_heart_stone()))
    }
}
