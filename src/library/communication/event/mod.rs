//! Structures to realise a queue-driven service architecture
//!
//! Services have no knowledge of each other. Work is handed out by publishing a
//! [`Notification`] to the [`Queue`](QueueDescriptor) it belongs to and every
//! interested party may subscribe to that queue and process its entries.
//!
//! Notifications are consumed in a reliable and resilient way using
//! a concept called [`ConsumerGroups`](ConsumerGroupDescriptor). Instead of using
//! simple publish subscribe between all connected services, messages are stored in
//! a log-like data structure of limited length where old elements are evicted.
//!
//! When reading from this data structure, services may define a [`QueueLocation`] from
//! which they want to begin processing. Notifications have to be acknowledged once
//! processing concludes. Upon crashing, the [`Consumer`](ConsumerIdentifier) may then
//! resume from the last acknowledged notification.
//!
//! Multiple [`Consumers`](ConsumerIdentifier) may share a [`ConsumerGroup`](ConsumerGroupDescriptor).
//! All participants in a group collectively process the incoming notification stream where each
//! notification is assigned to only one consumer within the group, while every group receives
//! every notification.
//!
//! Each entry may carry [`MessageHeaders`] next to its payload. They transport metadata
//! that is not part of the payload body, like reply locations and correlation identifiers.

mod consumer;
mod consumer_group;
mod headers;
mod notification;
mod publisher;
mod queue;
mod queue_provider;

pub use consumer::*;
pub use consumer_group::*;
pub use headers::*;
pub use notification::*;
pub use publisher::*;
pub use queue::*;
pub use queue_provider::*;
