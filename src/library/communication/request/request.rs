use super::super::event::Notification;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Describes a location where a response should be sent to
///
/// References a queue which may be shared by many requesting processes. Each
/// of them filters the replies by their [`CorrelationId`](super::CorrelationId).
pub type ResponseLocation = String;

/// Query which can be replied to
///
/// Note that Requests should not have side effects! A reply may get lost in transit
/// in which case the caller observes a timeout and may repeat the request.
pub trait Request: Notification {
    /// Expected response type
    type Response: Serialize + DeserializeOwned + Debug + Send + Sync + 'static;
}
