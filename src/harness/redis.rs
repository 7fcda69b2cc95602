use crate::library::communication::implementation::redis::{
    RedisFactory, RedisPublisher, RedisQueueProvider,
};
use crate::library::communication::CommunicationFactory;
use crate::library::BoxedError;
use async_trait::async_trait;
use redis::aio::{Connection, MultiplexedConnection};
use redis::{Client, RedisResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

const RETRY_INTERVAL: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

/// Communication factory connecting to a redis server
///
/// Clones share the same multiplexed connection which is established lazily.
#[derive(Clone)]
pub struct RedisCommunicationFactory {
    client: Client,
    shared: Arc<OnceCell<MultiplexedConnection>>,
}

impl RedisCommunicationFactory {
    /// Creates a new instance which connects to the given URL
    pub fn new(url: &str) -> RedisResult<Self> {
        Ok(Self {
            client: Client::open(url)?,
            shared: Arc::new(OnceCell::new()),
        })
    }
}

/// Retries connecting until it succeeds, warning once about the failure
async fn connect<T, C, Fut>(connector: C) -> T
where
    C: Fn() -> Fut,
    Fut: Future<Output = RedisResult<T>>,
{
    let mut warn = true;

    loop {
        match timeout(REQUEST_TIMEOUT, connector()).await {
            Ok(Ok(connection)) => return connection,
            Ok(Err(e)) => {
                if warn {
                    warn = false;
                    warn!("Unable to connect to redis server! ({})", e)
                }
            }
            Err(e) => {
                if warn {
                    warn = false;
                    warn!("Timed out while connecting to redis! ({})", e)
                }
            }
        }

        sleep(RETRY_INTERVAL).await;
    }
}

#[async_trait]
impl RedisFactory for RedisCommunicationFactory {
    async fn owned(&self) -> Result<Connection, BoxedError> {
        debug!("Opening dedicated redis connection");
        Ok(connect(|| self.client.get_async_connection()).await)
    }

    async fn multiplexed(&self) -> Result<MultiplexedConnection, BoxedError> {
        let connection = self
            .shared
            .get_or_init(|| async {
                debug!("Opening shared redis connection");
                connect(|| self.client.get_multiplexed_tokio_connection()).await
            })
            .await;

        Ok(connection.clone())
    }
}

impl CommunicationFactory for RedisCommunicationFactory {
    type QueueProvider = RedisQueueProvider<RedisCommunicationFactory>;
    type NotificationPublisher = RedisPublisher<RedisCommunicationFactory>;
    type ResponsePublisher = RedisPublisher<RedisCommunicationFactory>;

    fn queue_provider(&self) -> Self::QueueProvider {
        Self::QueueProvider::new(self.clone())
    }

    fn notification_publisher(&self) -> Self::NotificationPublisher {
        Self::NotificationPublisher::new(self.clone())
    }

    fn response_publisher(&self) -> Self::ResponsePublisher {
        Self::ResponsePublisher::new(self.clone())
    }
}

#[cfg(test)]
mod does {
    use super::*;

    #[test]
    fn reject_malformed_urls() {
        assert!(RedisCommunicationFactory::new("not a url").is_err());
        assert!(RedisCommunicationFactory::new("redis://localhost/").is_ok());
    }
}
