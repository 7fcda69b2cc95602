use super::CalculationRequestHandler;
use crate::domain::CalculationRequest;
use crate::harness::Service;
use crate::library::communication::event::{Notification, QueueDescriptor};
use crate::library::communication::request::Responder;
use crate::library::communication::CommunicationFactory;

/// Answers calculation requests published on the request queue
pub struct CalculatorService;

impl<F> Service<F> for CalculatorService
where
    F: CommunicationFactory + Send + Sync,
{
    const NAME: &'static str = "CalculatorService";
    type Instance = Responder<CalculationRequestHandler, F::ResponsePublisher>;
    type Config = ();

    fn queue(_config: &Self::Config) -> QueueDescriptor {
        CalculationRequest::queue()
    }

    fn instantiate(factory: F, _config: &Self::Config) -> Self::Instance {
        Responder::new(
            CalculationRequestHandler::default(),
            factory.response_publisher(),
        )
    }
}
