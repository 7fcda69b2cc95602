use super::super::super::EmptyResult;
use super::super::event::{Consumer, NotificationFrame};
use super::{CorrelationId, PendingReplies, CORRELATION_ID_HEADER};
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::any::type_name;

/// [`Consumer`] handing replies from a shared reply queue to the callers waiting for them
///
/// Replies nobody is waiting for, either because the caller gave up already or because
/// the reply belongs to another process sharing the queue, are discarded.
pub struct ReplyListener<T> {
    pending: PendingReplies<T>,
}

impl<T> ReplyListener<T> {
    /// Creates a new listener delivering into the given registry
    pub fn new(pending: PendingReplies<T>) -> Self {
        Self { pending }
    }
}

#[async_trait]
impl<T> Consumer for ReplyListener<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    type Notification = T;

    async fn consume(&self, frame: NotificationFrame<T>) -> EmptyResult {
        let (headers, reply) = frame.into_parts();

        match headers.get(CORRELATION_ID_HEADER).map(CorrelationId::from) {
            Some(correlation_id) => {
                if !self.pending.resolve(&correlation_id, reply) {
                    debug!("Discarding reply {} as nobody awaits it", correlation_id);
                }
            }
            None => warn!(
                "Discarding {} without correlation identifier",
                type_name::<T>()
            ),
        }

        Ok(())
    }
}
