use super::super::super::super::EmptyResult;
use super::super::super::event::{MessageHeaders, QueueDescriptor, RawNotificationPublisher};
use super::super::super::request::RawResponsePublisher;
use super::super::json::{JsonNotificationPublisher, JsonResponsePublisher};
use super::RedisFactory;
use super::{STREAM_HEADER_PREFIX, STREAM_ID_NEW, STREAM_PAYLOAD_KEY};
use crate::constants::QUEUE_LIMIT;
use async_trait::async_trait;
use redis::streams::StreamMaxlen;
use redis::AsyncCommands;

/// Multi-purpose publisher implementation using redis
///
/// - [`NotificationPublisher`](super::super::super::event::NotificationPublisher) implementation using [`XADD`](https://redis.io/commands/xadd)
/// - [`ResponsePublisher`](super::super::super::request::ResponsePublisher) implementation using [`XADD`](https://redis.io/commands/xadd) on the reply stream
#[derive(Clone)]
pub struct RedisPublisher<F: RedisFactory> {
    factory: F,
}

impl<F> RedisPublisher<F>
where
    F: RedisFactory,
{
    /// Creates a new instance from an existing redis connection factory
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    async fn append(
        &self,
        key: &str,
        limit: usize,
        data: &[u8],
        headers: &MessageHeaders,
    ) -> EmptyResult {
        let mut con = self.factory.multiplexed().await?;
        let fields = stream_fields(data, headers);

        con.xadd_maxlen::<_, _, _, _, ()>(key, StreamMaxlen::Approx(limit), STREAM_ID_NEW, &fields)
            .await?;

        Ok(())
    }
}

fn stream_fields(data: &[u8], headers: &MessageHeaders) -> Vec<(String, Vec<u8>)> {
    std::iter::once((STREAM_PAYLOAD_KEY.to_owned(), data.to_vec()))
        .chain(headers.iter().map(|(name, value)| {
            (format!("{}{}", STREAM_HEADER_PREFIX, name), value.to_vec())
        }))
        .collect()
}

impl<F> JsonNotificationPublisher for RedisPublisher<F> where F: RedisFactory + Send + Sync {}
impl<F> JsonResponsePublisher for RedisPublisher<F> where F: RedisFactory + Send + Sync {}

#[async_trait]
impl<F> RawNotificationPublisher for RedisPublisher<F>
where
    F: RedisFactory + Send + Sync,
{
    async fn publish_raw(
        &self,
        data: &[u8],
        headers: &MessageHeaders,
        descriptor: &QueueDescriptor,
    ) -> EmptyResult {
        self.append(descriptor.key(), descriptor.limit(), data, headers)
            .await
    }
}

#[async_trait]
impl<F> RawResponsePublisher for RedisPublisher<F>
where
    F: RedisFactory + Send + Sync,
{
    async fn publish_raw(
        &self,
        data: &[u8],
        headers: &MessageHeaders,
        location: &str,
    ) -> EmptyResult {
        self.append(location, QUEUE_LIMIT, data, headers).await
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefix_header_fields() {
        let headers = MessageHeaders::default()
            .with("reply-to", "calculator.replies")
            .with("correlation-id", vec![1u8, 2]);

        assert_eq!(
            stream_fields(b"{}", &headers),
            vec![
                ("payload".to_owned(), b"{}".to_vec()),
                ("header:correlation-id".to_owned(), vec![1u8, 2]),
                ("header:reply-to".to_owned(), b"calculator.replies".to_vec()),
            ]
        );
    }
}
