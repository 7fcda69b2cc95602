//! Structures to realise request/reply interactions over an asynchronous message bus
//!
//! A [`Requestor`] publishes a [`Request`] like any other notification, but attaches two
//! [`MessageHeaders`](super::event::MessageHeaders): the [`ResponseLocation`] where the reply is expected
//! ([`REPLY_TO_HEADER`]) and a freshly generated [`CorrelationId`] ([`CORRELATION_ID_HEADER`]).
//! The caller then suspends on a [`PendingReply`] registered in [`PendingReplies`].
//!
//! On the other side a [`Responder`] processes the request and sends the response through
//! a [`ReplyPublisher`] to the requested location, copying the correlation identifier.
//! A [`ReplyListener`] consuming the reply queue hands every response to the matching
//! pending entry or discards it when nobody is waiting anymore.

mod correlation;
mod publisher;
mod reply_listener;
mod request;
mod requestor;
mod responder;

pub use correlation::*;
pub use publisher::*;
pub use reply_listener::*;
pub use request::*;
pub use requestor::*;
pub use responder::*;

/// Header carrying the [`ResponseLocation`] a reply should be sent to
pub const REPLY_TO_HEADER: &str = "reply-to";

/// Header carrying the [`CorrelationId`] which links a reply to its request
pub const CORRELATION_ID_HEADER: &str = "correlation-id";
