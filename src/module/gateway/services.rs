use crate::constants::QUEUE_LIMIT;
use crate::domain::CalculationResponse;
use crate::harness::Service;
use crate::library::communication::event::QueueDescriptor;
use crate::library::communication::request::{PendingReplies, ReplyListener, ResponseLocation};
use crate::library::communication::CommunicationFactory;

/// Configuration of the [`ReplyListenerService`]
pub struct ReplyListenerConfig {
    /// Registry of callers waiting for a reply
    pub pending: PendingReplies<CalculationResponse>,
    /// Queue on which replies arrive
    pub reply_queue: ResponseLocation,
}

/// Hands replies from the shared reply queue to waiting callers
pub struct ReplyListenerService;

impl<F> Service<F> for ReplyListenerService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "ReplyListenerService";
    type Instance = ReplyListener<CalculationResponse>;
    type Config = ReplyListenerConfig;

    fn queue(config: &Self::Config) -> QueueDescriptor {
        QueueDescriptor::new(config.reply_queue.clone(), QUEUE_LIMIT)
    }

    fn instantiate(_factory: F, config: &Self::Config) -> Self::Instance {
        ReplyListener::new(config.pending.clone())
    }
}
