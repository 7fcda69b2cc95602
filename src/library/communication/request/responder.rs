use super::super::super::EmptyResult;
use super::super::event::{Consumer, NotificationFrame};
use super::{CorrelationId, ReplyPublisher, Request, ResponsePublisher};
use super::{CORRELATION_ID_HEADER, REPLY_TO_HEADER};
use async_trait::async_trait;
use log::warn;
use std::any::type_name;

/// Structure which processes requests and produces responses
///
/// Processing may not fail. Failures have to be expressed as part of the response
/// so that the requesting side learns about them.
#[async_trait]
pub trait RequestProcessor {
    /// Type of request to process
    type Request: Request;

    /// Handler for requests, returning a response
    async fn process(&self, request: Self::Request) -> <Self::Request as Request>::Response;
}

/// Convenience wrapper to process requests and send responses
///
/// Every request is expected to carry a [`REPLY_TO_HEADER`] and a [`CORRELATION_ID_HEADER`].
/// Requests lacking one of them can not be answered and are dropped without being processed.
pub struct Responder<C, P> {
    processor: C,
    replies: ReplyPublisher<P>,
}

impl<C, P> Responder<C, P>
where
    C: RequestProcessor,
    P: ResponsePublisher + Send + Sync,
{
    /// Creates a new responder from raw parts
    pub fn new(processor: C, publisher: P) -> Self {
        Self {
            processor,
            replies: ReplyPublisher::new(publisher),
        }
    }
}

#[async_trait]
impl<C, P> Consumer for Responder<C, P>
where
    C: RequestProcessor + Send + Sync,
    C::Request: Send + Sync,
    P: ResponsePublisher + Send + Sync,
{
    type Notification = C::Request;

    async fn consume(&self, frame: NotificationFrame<Self::Notification>) -> EmptyResult {
        let headers = frame.headers();
        let destination = headers.get_str(REPLY_TO_HEADER).map(str::to_owned);
        let correlation_id = headers.get(CORRELATION_ID_HEADER).map(CorrelationId::from);

        let (destination, correlation_id) = match (destination, correlation_id) {
            (Some(destination), Some(correlation_id)) => (destination, correlation_id),
            (destination, correlation_id) => {
                warn!(
                    "Dropping {} without reply metadata (reply-to present: {}, correlation-id present: {})",
                    type_name::<C::Request>(),
                    destination.is_some(),
                    correlation_id.is_some()
                );
                return Ok(());
            }
        };

        let response = self.processor.process(frame.into_inner()).await;
        self.replies
            .send(&destination, &correlation_id, &response)
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::library::communication::event::{MessageHeaders, Notification, QueueDescriptor};
    use crate::library::communication::implementation::memory::MemoryBus;
    use crate::library::BoxedError;
    use futures::StreamExt;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Echo(String);

    impl Notification for Echo {
        fn queue() -> QueueDescriptor {
            QueueDescriptor::new("echo.requests".into(), 10)
        }
    }

    impl Request for Echo {
        type Response = String;
    }

    #[derive(Default)]
    struct EchoProcessor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RequestProcessor for Arc<EchoProcessor> {
        type Request = Echo;

        async fn process(&self, request: Echo) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            request.0.to_uppercase()
        }
    }

    struct FailingPublisher;

    #[async_trait]
    impl ResponsePublisher for FailingPublisher {
        async fn publish<R: serde::Serialize + Send + Sync>(
            &self,
            _response: &R,
            _location: &str,
            _correlation_id: &CorrelationId,
        ) -> EmptyResult {
            Err(BoxedError::from("connection reset"))
        }
    }

    fn reply_headers(correlation_id: &CorrelationId) -> MessageHeaders {
        MessageHeaders::default()
            .with(REPLY_TO_HEADER, "echo.replies")
            .with(CORRELATION_ID_HEADER, correlation_id.as_bytes())
    }

    #[tokio::test]
    async fn reply_with_correlation_id() {
        let bus = MemoryBus::default();
        let mut replies = bus.subscribe("echo.replies").await;
        let processor = Arc::new(EchoProcessor::default());
        let responder = Responder::new(processor.clone(), bus.clone());
        let correlation_id = CorrelationId::random();

        let frame = NotificationFrame::new(reply_headers(&correlation_id), Echo("hi".into()));
        responder.consume(frame).await.unwrap();

        let (payload, headers) = replies.next().await.unwrap();
        assert_eq!(payload, br#""HI""#.to_vec());
        assert_eq!(
            headers.get(CORRELATION_ID_HEADER),
            Some(correlation_id.as_bytes())
        );
        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn drop_requests_without_reply_location() {
        let processor = Arc::new(EchoProcessor::default());
        let responder = Responder::new(processor.clone(), MemoryBus::default());
        let headers = MessageHeaders::default().with(CORRELATION_ID_HEADER, vec![1u8, 2, 3]);

        let frame = NotificationFrame::new(headers, Echo("hi".into()));
        responder.consume(frame).await.unwrap();

        assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn drop_requests_without_correlation_id() {
        let processor = Arc::new(EchoProcessor::default());
        let responder = Responder::new(processor.clone(), MemoryBus::default());
        let headers = MessageHeaders::default().with(REPLY_TO_HEADER, "echo.replies");

        let frame = NotificationFrame::new(headers, Echo("hi".into()));
        responder.consume(frame).await.unwrap();

        assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn swallow_reply_failures() {
        let processor = Arc::new(EchoProcessor::default());
        let responder = Responder::new(processor.clone(), FailingPublisher);
        let correlation_id = CorrelationId::random();

        let frame = NotificationFrame::new(reply_headers(&correlation_id), Echo("hi".into()));

        assert!(responder.consume(frame).await.is_ok());
        assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
    }
}
