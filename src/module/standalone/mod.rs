//! Single process deployment running a worker and a gateway on an in-memory bus
//!
//! Useful for local experiments and as a reference deployment. The bus provides the same
//! semantics as the networked one, thus both sides interact exactly like they would when
//! distributed across machines.

mod options;

use super::gateway::{self, GatewayJobs};
use super::worker::{self, CalculatorService};
use crate::constants::{QUEUE_CALCULATION_REPLIES, QUEUE_LIMIT};
use crate::domain::CalculationRequest;
use crate::harness::{Heart, Module, ServiceRunner};
use crate::library::communication::event::{Notification, QueueDescriptor};
use crate::library::communication::implementation::memory::MemoryBus;
use crate::library::BoxedError;
use async_trait::async_trait;
use jatsl::{schedule, JobScheduler};

pub use options::Options;

const INSTANCE_ID: &str = "standalone";

/// Module implementation
pub struct Standalone {
    options: Options,
}

impl Standalone {
    /// Creates a new instance from raw parts
    pub fn new(options: Options) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Module for Standalone {
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
        let bus = MemoryBus::default();
        let reply_queue = QueueDescriptor::new(QUEUE_CALCULATION_REPLIES.to_owned(), QUEUE_LIMIT);

        bus.declare(&CalculationRequest::queue(), &worker::consumer_group())
            .await;
        bus.declare(&reply_queue, &gateway::consumer_group(INSTANCE_ID))
            .await;

        let calculator = ServiceRunner::<CalculatorService, _>::new(
            bus.clone(),
            worker::consumer_group(),
            INSTANCE_ID.to_owned(),
            (),
        );

        let GatewayJobs { listener, server } = GatewayJobs::new(
            bus,
            INSTANCE_ID,
            INSTANCE_ID,
            reply_queue.key().to_owned(),
            self.options.http.port,
            self.options.http.reply_timeout,
        );

        schedule!(scheduler, { calculator, listener, server });

        Ok(Some(Heart::without_heart_stone()))
    }
}
