use super::super::super::super::BoxedError;
use super::super::super::event::{
    ConsumerGroupDescriptor, QueueDescriptor, QueueLocation, QueueProvider,
};
use super::{RedisFactory, RedisQueueEntry, STREAM_ID_ADDITIONS, STREAM_ID_HEAD, STREAM_ID_TAIL};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use log::{debug, error, warn};
use redis::aio::{ConnectionLike, MultiplexedConnection};
use redis::streams::{StreamId, StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, RedisError};
use std::convert::TryFrom;
use std::time::Duration;
use tokio::time::sleep;

const READ_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Queue provider implementation using [Redis Streams](https://redis.io/topics/streams-intro)
pub struct RedisQueueProvider<F: RedisFactory + Send + Sync> {
    factory: F,
}

impl<F: RedisFactory + Send + Sync> RedisQueueProvider<F> {
    /// Creates a new instance with a given [`RedisFactory`]
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl<F> QueueProvider for RedisQueueProvider<F>
where
    F: RedisFactory + Send + Sync,
{
    type Entry = RedisQueueEntry<MultiplexedConnection>;

    async fn consume(
        &self,
        queue: &QueueDescriptor,
        group: &ConsumerGroupDescriptor,
        consumer: &str,
        batch_size: usize,
        idle_timeout: Option<Duration>,
    ) -> Result<BoxStream<'static, Result<Self::Entry, BoxedError>>, BoxedError> {
        let key = queue.key().to_owned();
        let group_name = group.identifier().to_string();

        // XREADGROUP blocks, so it gets a dedicated connection
        let mut con = self.factory.owned().await?;
        create_consumer_group(&mut con, &key, &group_name, group.start()).await;

        // A block duration of zero waits forever
        let block = idle_timeout
            .map(|timeout| usize::try_from(timeout.as_millis()).unwrap_or(usize::MAX))
            .unwrap_or(0);

        let options = StreamReadOptions::default()
            .group(&group_name, consumer)
            .count(batch_size)
            .block(block);

        let ack_con = self.factory.multiplexed().await?;

        let stream = read_group(con, options, key.clone())
            .map(move |entry| -> Result<Self::Entry, BoxedError> {
                let entry =
                    RedisQueueEntry::new(ack_con.clone(), entry?, key.clone(), group_name.clone())?;

                Ok(entry)
            })
            .boxed();

        Ok(stream)
    }
}

async fn create_consumer_group<C: ConnectionLike + Send>(
    con: &mut C,
    key: &str,
    group: &str,
    start: &QueueLocation,
) {
    let start_id = match start {
        QueueLocation::Head => STREAM_ID_HEAD,
        QueueLocation::Tail => STREAM_ID_TAIL,
    };

    // BUSYGROUP is returned for existing groups
    if let Err(e) = con
        .xgroup_create_mkstream::<_, _, _, ()>(key, group, start_id)
        .await
    {
        debug!("Consumer group {} on {} not created: {}", group, key, e);
    }
}

/// Position from which the next XREADGROUP call reads
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReadCursor {
    /// Entries delivered to this consumer earlier but never acknowledged, after the given id
    Pending(String),
    /// Entries never delivered to any consumer of the group
    Additions,
}

impl ReadCursor {
    fn id(&self) -> &str {
        match self {
            Self::Pending(id) => id,
            Self::Additions => STREAM_ID_ADDITIONS,
        }
    }

    /// Cursor for the read following a batch which was read from this cursor
    fn advance(self, batch: &[StreamId]) -> Self {
        match (self, batch.last()) {
            (Self::Pending(_), Some(last)) => Self::Pending(last.id.clone()),
            _ => Self::Additions,
        }
    }
}

/// Reads the consumer's pending entries first, then continues with new ones.
///
/// The stream ends when the connection is lost so that the consumer can be restarted.
fn read_group<C: ConnectionLike + Send + 'static>(
    con: C,
    options: StreamReadOptions,
    key: String,
) -> BoxStream<'static, Result<StreamId, RedisError>> {
    let initial = Some((con, options, ReadCursor::Pending(STREAM_ID_HEAD.to_owned())));

    stream::unfold(initial, move |state| {
        let key = key.clone();

        async move {
            let (mut con, options, cursor) = state?;

            let reply = con
                .xread_options::<_, _, Option<StreamReadReply>>(&[&key], &[cursor.id()], &options)
                .await;

            match reply {
                Ok(reply) => {
                    let batch = reply
                        .and_then(|mut reply| reply.keys.pop())
                        .map(|stream| stream.ids)
                        .unwrap_or_default();

                    let cursor = cursor.advance(&batch);
                    Some((Ok(batch), Some((con, options, cursor))))
                }
                Err(e) if e.is_connection_dropped() || e.is_io_error() => {
                    warn!("Lost connection while reading from {}: {}", key, e);
                    Some((Err(e), None))
                }
                Err(e) => {
                    error!("Failed to read from {}: {}", key, e);
                    sleep(READ_RETRY_DELAY).await;
                    Some((Err(e), Some((con, options, cursor))))
                }
            }
        }
    })
    .flat_map(|batch| match batch {
        Ok(entries) => stream::iter(entries).map(Ok).boxed(),
        Err(e) => stream::once(async move { Err(e) }).boxed(),
    })
    .boxed()
}
