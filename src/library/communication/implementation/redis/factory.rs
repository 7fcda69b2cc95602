use super::super::super::super::BoxedError;
use async_trait::async_trait;
use redis::aio::{Connection, MultiplexedConnection};

/// Factory for redis connections
#[async_trait]
pub trait RedisFactory {
    /// Establishes an individual connection that may be used for blocking commands without disturbing other users
    async fn owned(&self) -> Result<Connection, BoxedError>;

    /// Retrieves a handle to a connection shared between multiple users which does not permit blocking commands
    async fn multiplexed(&self) -> Result<MultiplexedConnection, BoxedError>;
}
