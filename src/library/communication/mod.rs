//! Structures to communicate between services in a distributed system
//!
//! In general, there are two modes of operation:
//!
//! 1. Publish and subscribe
//! 2. Request and reply
//!
//! The first is used primarily for work queues. A notification is published to a queue
//! and consumed by exactly one member of each interested consumer group.
//! The notification data structure implements the [`Notification`](event::Notification) trait and
//! thus describes where to expect it in a type-safe manner. For more details and
//! a more in-depth explanation, consult the [`event`] module.
//!
//! The second mode of operation is request and reply. A caller publishes a
//! [`Request`](request::Request) and suspends until the matching reply arrives or a deadline passes.
//! Since the bus is asynchronous, the reply is matched to the caller by an opaque
//! [`CorrelationId`](request::CorrelationId) that travels next to the payload as out-of-band
//! [`MessageHeaders`](event::MessageHeaders), together with the location the reply should be sent to.
//! Replies of all callers share one queue; every caller-side process listens on it and
//! discards those it is not waiting for.

mod communication_factory;

pub mod event;
pub mod implementation;
pub mod request;

pub use communication_factory::CommunicationFactory;
