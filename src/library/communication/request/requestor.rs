use super::super::super::BoxedError;
use super::super::event::{MessageHeaders, NotificationPublisher};
use super::{CorrelationId, PendingReplies, RegistryError, Request, ResponseLocation};
use super::{CORRELATION_ID_HEADER, REPLY_TO_HEADER};
use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use thiserror::Error;

/// Error type for sending requests
#[derive(Error, Debug)]
pub enum RequestError {
    /// Unable to register the pending reply
    #[error("unable to await a reply")]
    RegistrationFailed(#[from] RegistryError),
    /// Publishing of the request failed
    #[error("sending of request failed: {0}")]
    SendingFailure(#[source] BoxedError),
    /// No reply arrived before the deadline passed
    #[error("no reply received within {0:?}")]
    Timeout(Duration),
}

/// Handler for sending requests and awaiting their reply
#[async_trait]
pub trait Requestor<R: Request> {
    /// Sends out a request and waits at most `timeout` for the reply
    async fn request(&self, request: &R, timeout: Duration) -> Result<R::Response, RequestError>;
}

/// [`Requestor`] implementation correlating replies from a shared reply queue
///
/// The replies have to be fed into the [`PendingReplies`] registry by a
/// [`ReplyListener`](super::ReplyListener) consuming the reply location.
pub struct CorrelatingRequestor<P, R: Request> {
    publisher: P,
    pending: PendingReplies<R::Response>,
    reply_to: ResponseLocation,
}

impl<P, R> CorrelatingRequestor<P, R>
where
    P: NotificationPublisher,
    R: Request,
{
    /// Creates a new instance from raw parts
    pub fn new(
        publisher: P,
        pending: PendingReplies<R::Response>,
        reply_to: ResponseLocation,
    ) -> Self {
        Self {
            publisher,
            pending,
            reply_to,
        }
    }
}

#[async_trait]
impl<P, R> Requestor<R> for CorrelatingRequestor<P, R>
where
    P: NotificationPublisher + Send + Sync,
    R: Request + Send + Sync,
{
    /// Registers a pending reply under a fresh [`CorrelationId`], publishes the request and awaits the reply.
    ///
    /// The pending entry is removed on every path out of this function: dropping or consuming
    /// the [`PendingReply`](super::PendingReply) handle deregisters it.
    async fn request(&self, request: &R, timeout: Duration) -> Result<R::Response, RequestError> {
        let correlation_id = CorrelationId::random();
        let pending = self.pending.register(correlation_id.clone(), timeout)?;

        let headers = MessageHeaders::default()
            .with(REPLY_TO_HEADER, self.reply_to.as_str())
            .with(CORRELATION_ID_HEADER, correlation_id.as_bytes());

        self.publisher
            .publish_with_headers(request, &headers)
            .await
            .map_err(RequestError::SendingFailure)?;

        debug!("Awaiting reply {} on {}", correlation_id, self.reply_to);

        pending.wait().await.ok_or(RequestError::Timeout(timeout))
    }
}
