use super::super::super::EmptyResult;
use super::super::event::MessageHeaders;
use super::CorrelationId;
use async_trait::async_trait;
use log::{debug, error};
use serde::Serialize;

/// Structure which allows publishing of serialized responses to a [`ResponseLocation`](super::ResponseLocation)
#[async_trait]
pub trait RawResponsePublisher {
    /// Sends an opaque payload with the given headers to a response location
    async fn publish_raw(&self, data: &[u8], headers: &MessageHeaders, location: &str)
        -> EmptyResult;
}

/// Publisher for responses to requests
#[async_trait]
pub trait ResponsePublisher {
    /// Sends a response to the given location, tagged with the [`CorrelationId`] of the request it answers
    async fn publish<R: Serialize + Send + Sync>(
        &self,
        response: &R,
        location: &str,
        correlation_id: &CorrelationId,
    ) -> EmptyResult;
}

/// Sends replies without ever failing
///
/// Transport failures are logged and swallowed. There is no retry; the requesting
/// side observes a lost reply as a timeout.
pub struct ReplyPublisher<P> {
    publisher: P,
}

impl<P> ReplyPublisher<P>
where
    P: ResponsePublisher + Send + Sync,
{
    /// Creates a new instance from raw parts
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    /// Publishes the response to `destination`, carrying the given correlation identifier
    pub async fn send<R: Serialize + Send + Sync>(
        &self,
        destination: &str,
        correlation_id: &CorrelationId,
        response: &R,
    ) {
        match self
            .publisher
            .publish(response, destination, correlation_id)
            .await
        {
            Ok(_) => debug!("Sent reply {} to {}", correlation_id, destination),
            Err(e) => error!(
                "Failed to send reply {} to {}: {}",
                correlation_id, destination, e
            ),
        }
    }
}
