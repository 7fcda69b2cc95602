use super::super::super::super::BoxedError;
use super::super::json::JsonQueueEntry;
use super::RedisQueueError;
use super::{STREAM_HEADER_PREFIX, STREAM_PAYLOAD_KEY};
use crate::library::communication::event::{MessageHeaders, RawQueueEntry};
use async_trait::async_trait;
use redis::aio::ConnectionLike;
use redis::streams::StreamId;
use redis::AsyncCommands;

/// Redis based implementation of the [`QueueEntry`](crate::library::communication::event::QueueEntry) trait
pub struct RedisQueueEntry<C> {
    con: C,
    id: String,
    key: String,
    group: String,
    payload: Vec<u8>,
    headers: MessageHeaders,
}

impl<C> RedisQueueEntry<C>
where
    C: ConnectionLike + Send + Sync,
{
    pub(super) fn new(
        con: C,
        entry: StreamId,
        key: String,
        group: String,
    ) -> Result<Self, RedisQueueError> {
        let (payload, headers) = decode_stream_entry(&entry)?;

        Ok(Self {
            con,
            id: entry.id,
            key,
            group,
            payload,
            headers,
        })
    }
}

fn decode_stream_entry(entry: &StreamId) -> Result<(Vec<u8>, MessageHeaders), RedisQueueError> {
    let payload = entry
        .get(STREAM_PAYLOAD_KEY)
        .ok_or(RedisQueueError::MissingPayload)?;

    let headers = entry
        .map
        .iter()
        .filter_map(|(field, value)| {
            let name = field.strip_prefix(STREAM_HEADER_PREFIX)?;
            let value: Vec<u8> = redis::from_redis_value(value).ok()?;
            Some((name.to_owned(), value))
        })
        .collect();

    Ok((payload, headers))
}

#[async_trait]
impl<C> RawQueueEntry for RedisQueueEntry<C>
where
    C: ConnectionLike + Send + Sync,
{
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn headers(&self) -> &MessageHeaders {
        &self.headers
    }

    async fn acknowledge(&mut self) -> Result<(), BoxedError> {
        self.con
            .xack::<_, _, _, ()>(&self.key, &self.group, &[&self.id])
            .await?;

        Ok(())
    }
}

impl<C> JsonQueueEntry for RedisQueueEntry<C> where C: ConnectionLike + Send + Sync {}
