//! Serialization and deserialization provided by [`serde_json`] using marker traits
//!
//! This module allows implementors of traits that allow raw access to underlying messaging systems
//! to provide the higher-level traits relying on serialization. It does so by providing a number of
//! marker traits which, when implemented, provide default implementations of the higher-level traits
//! by translating between lower-level serialized data and higher-level strongly typed data by using
//! [`serde_json`].

use super::super::event::{
    MessageHeaders, Notification, NotificationPublisher, QueueEntry, RawNotificationPublisher,
    RawQueueEntry,
};
use super::super::request::{
    CorrelationId, RawResponsePublisher, ResponsePublisher, CORRELATION_ID_HEADER,
};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Marker trait providing a default [`NotificationPublisher`] implementation based on [`serde_json`]
pub trait JsonNotificationPublisher: RawNotificationPublisher + Send + Sync {}

#[async_trait]
impl<P> NotificationPublisher for P
where
    P: JsonNotificationPublisher,
{
    /// Serializes the notification using [`serde_json::to_vec`]
    async fn publish<N: Notification + Send + Sync>(&self, notification: &N) -> EmptyResult {
        self.publish_with_headers(notification, &MessageHeaders::default())
            .await
    }

    /// Serializes the notification using [`serde_json::to_vec`]
    async fn publish_with_headers<N: Notification + Send + Sync>(
        &self,
        notification: &N,
        headers: &MessageHeaders,
    ) -> EmptyResult {
        let data = serde_json::to_vec(notification)?;
        self.publish_raw(&data, headers, &N::queue()).await
    }
}

/// Marker trait providing a default [`QueueEntry`] implementation based on [`serde_json`]
pub trait JsonQueueEntry: RawQueueEntry {}

impl<E> QueueEntry for E
where
    E: JsonQueueEntry,
{
    /// Parses the payload using [`serde_json::from_slice`]
    fn parse_payload<'a, T>(&'a self) -> Result<T, BoxedError>
    where
        T: Deserialize<'a>,
    {
        serde_json::from_slice(self.payload()).map_err(Into::into)
    }
}

/// Marker trait providing a default [`ResponsePublisher`] implementation based on [`serde_json`]
pub trait JsonResponsePublisher: RawResponsePublisher + Send + Sync {}

#[async_trait]
impl<P> ResponsePublisher for P
where
    P: JsonResponsePublisher,
{
    /// Serializes the response using [`serde_json::to_vec`]
    async fn publish<R: Serialize + Send + Sync>(
        &self,
        response: &R,
        location: &str,
        correlation_id: &CorrelationId,
    ) -> EmptyResult {
        let data = serde_json::to_vec(response)?;
        let headers =
            MessageHeaders::default().with(CORRELATION_ID_HEADER, correlation_id.as_bytes());

        self.publish_raw(&data, &headers, location).await
    }
}
