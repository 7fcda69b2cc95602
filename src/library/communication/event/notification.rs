use super::{MessageHeaders, QueueDescriptor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::ops::Deref;

/// Unit of work that is published to a well-known queue
pub trait Notification: Serialize + DeserializeOwned + PartialEq + Debug {
    /// Queue on which this implementation can be sent and received
    fn queue() -> QueueDescriptor;
}

/// Received message together with the [`MessageHeaders`] it was transported with
#[derive(Debug)]
pub struct NotificationFrame<T> {
    headers: MessageHeaders,
    notification: T,
}

impl<T> NotificationFrame<T> {
    /// Creates a new instance from raw parts
    pub fn new(headers: MessageHeaders, notification: T) -> Self {
        Self {
            headers,
            notification,
        }
    }

    /// Metadata transported alongside the notification
    pub fn headers(&self) -> &MessageHeaders {
        &self.headers
    }

    /// Discards the headers
    pub fn into_inner(self) -> T {
        self.notification
    }

    /// Splits the frame into its headers and notification
    pub fn into_parts(self) -> (MessageHeaders, T) {
        (self.headers, self.notification)
    }
}

impl<T> Deref for NotificationFrame<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.notification
    }
}
