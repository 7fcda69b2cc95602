use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

/// Opaque identifier linking a request to its reply
///
/// It is generated by the caller for every outbound request and carried unmodified
/// from the request to the reply. Its content has no meaning to anybody but the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Vec<u8>);

impl CorrelationId {
    /// Generates a new identifier from the bytes of a random UUID
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_bytes().to_vec())
    }

    /// Raw bytes of the identifier
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for CorrelationId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for CorrelationId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }

        Ok(())
    }
}

/// Errors raised by the [`PendingReplies`] registry
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Another caller is already waiting on the identifier
    #[error("correlation identifier {0} is already registered")]
    DuplicateCorrelationId(CorrelationId),
}

/// Delivery slot of a single waiting caller
struct Slot<T> {
    sender: oneshot::Sender<T>,
    deadline: Instant,
}

/// Registry of callers waiting for exactly one reply each
///
/// Every entry is a single-use delivery slot keyed by a [`CorrelationId`] which carries the
/// deadline of its caller. Resolving an entry removes it from the registry in the same atomic
/// step, which guarantees that a slot is resolved at most once no matter whether the reply or
/// the deadline comes first. Clones share the same underlying registry.
pub struct PendingReplies<T> {
    entries: Arc<DashMap<CorrelationId, Slot<T>>>,
}

impl<T> PendingReplies<T> {
    /// Registers a new entry expiring after `timeout` and returns the handle a caller suspends on
    pub fn register(
        &self,
        id: CorrelationId,
        timeout: Duration,
    ) -> Result<PendingReply<T>, RegistryError> {
        let (sender, receiver) = oneshot::channel();
        let deadline = Instant::now() + timeout;

        match self.entries.entry(id.clone()) {
            Entry::Occupied(_) => return Err(RegistryError::DuplicateCorrelationId(id)),
            Entry::Vacant(slot) => {
                slot.insert(Slot { sender, deadline });
            }
        }

        Ok(PendingReply {
            id,
            deadline,
            receiver,
            entries: self.entries.clone(),
        })
    }

    /// Delivers a payload to the entry and removes it.
    ///
    /// Returns `false` if no entry exists for the identifier or its deadline has passed. Expired
    /// entries are removed without delivering the payload.
    pub fn resolve(&self, id: &CorrelationId, payload: T) -> bool {
        match self.entries.remove(id) {
            Some((_, slot)) if slot.deadline > Instant::now() => slot.sender.send(payload).is_ok(),
            _ => false,
        }
    }

    /// Removes an entry without resolving it. Calling this for an unknown identifier is a no-op.
    pub fn remove(&self, id: &CorrelationId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Number of callers currently waiting
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is waiting
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for PendingReplies<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl<T> Clone for PendingReplies<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

/// Handle of a caller waiting for a reply
///
/// Dropping the handle deregisters the entry, so a caller that stops waiting
/// for any reason never leaves an orphaned entry behind.
pub struct PendingReply<T> {
    id: CorrelationId,
    deadline: Instant,
    receiver: oneshot::Receiver<T>,
    entries: Arc<DashMap<CorrelationId, Slot<T>>>,
}

impl<T> PendingReply<T> {
    /// Identifier the entry is registered under
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.id
    }

    /// Point in time after which the entry no longer accepts a reply
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Suspends until the entry is resolved or its deadline passes, returning `None` in the latter case.
    ///
    /// When the deadline races a delivery, whoever removes the entry from the registry first wins.
    pub async fn wait(mut self) -> Option<T> {
        match timeout_at(self.deadline, &mut self.receiver).await {
            Ok(result) => result.ok(),
            Err(_) => {
                if self.entries.remove(&self.id).is_some() {
                    None
                } else {
                    // A delivery claimed the entry first and is about to hand over its payload
                    (&mut self.receiver).await.ok()
                }
            }
        }
    }
}

impl<T> Drop for PendingReply<T> {
    fn drop(&mut self) {
        self.entries.remove(&self.id);
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    const WAIT: Duration = Duration::from_secs(1);

    #[test]
    fn generate_distinct_identifiers() {
        let ids: HashSet<CorrelationId> = (0..1000).map(|_| CorrelationId::random()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn display_identifiers_as_hex() {
        let id = CorrelationId::from(vec![0x00, 0x0f, 0xab]);
        assert_eq!(id.to_string(), "000fab");
    }

    #[tokio::test]
    async fn deliver_resolved_payload() {
        let pending = PendingReplies::default();
        let id = CorrelationId::random();
        let reply = pending.register(id.clone(), Duration::from_secs(1)).unwrap();

        assert!(pending.resolve(&id, 42));
        assert_eq!(reply.wait().await, Some(42));
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn time_out_without_delivery() {
        let pending = PendingReplies::<u32>::default();
        let id = CorrelationId::random();
        let reply = pending.register(id.clone(), Duration::from_millis(10)).unwrap();

        assert_eq!(reply.wait().await, None);
        assert!(pending.is_empty());
        assert!(!pending.resolve(&id, 42));
    }

    #[tokio::test]
    async fn record_deadline_on_entry() {
        let pending = PendingReplies::<u32>::default();
        let before = Instant::now();
        let reply = pending.register(CorrelationId::random(), WAIT).unwrap();

        assert!(reply.deadline() >= before + WAIT);
        assert!(reply.deadline() <= Instant::now() + WAIT);
    }

    #[tokio::test]
    async fn refuse_delivery_after_deadline() {
        let pending = PendingReplies::<u32>::default();
        let id = CorrelationId::random();
        let reply = pending.register(id.clone(), Duration::from_millis(10)).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        // The waiter has not observed its deadline yet, the registry refuses the reply regardless
        assert!(!pending.resolve(&id, 42));
        assert!(pending.is_empty());
        assert_eq!(reply.wait().await, None);
    }

    #[test]
    fn reject_duplicate_registrations() {
        let pending = PendingReplies::<u32>::default();
        let id = CorrelationId::random();
        let _reply = pending.register(id.clone(), WAIT).unwrap();

        assert_eq!(
            pending.register(id.clone(), WAIT).err(),
            Some(RegistryError::DuplicateCorrelationId(id))
        );
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn ignore_unknown_identifiers() {
        let pending = PendingReplies::<u32>::default();
        let id = CorrelationId::random();
        let _reply = pending.register(id, WAIT).unwrap();

        assert!(!pending.resolve(&CorrelationId::random(), 42));
        assert!(!pending.remove(&CorrelationId::random()));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn remove_idempotently() {
        let pending = PendingReplies::<u32>::default();
        let id = CorrelationId::random();
        let _reply = pending.register(id.clone(), WAIT).unwrap();

        assert!(pending.remove(&id));
        assert!(!pending.remove(&id));
        assert!(!pending.resolve(&id, 42));
    }

    #[test]
    fn deregister_dropped_handles() {
        let pending = PendingReplies::<u32>::default();
        let id = CorrelationId::random();
        let reply = pending.register(id.clone(), WAIT).unwrap();

        drop(reply);

        assert!(pending.is_empty());
        assert!(!pending.resolve(&id, 42));
    }

    #[tokio::test]
    async fn keep_unrelated_waiters_apart() {
        let pending = PendingReplies::default();
        let first_id = CorrelationId::random();
        let second_id = CorrelationId::random();
        let first = pending.register(first_id.clone(), WAIT).unwrap();
        let second = pending.register(second_id.clone(), WAIT).unwrap();

        assert!(pending.resolve(&second_id, "second"));
        assert!(pending.resolve(&first_id, "first"));

        assert_eq!(first.wait().await, Some("first"));
        assert_eq!(second.wait().await, Some("second"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn resolve_each_entry_at_most_once() {
        let pending = PendingReplies::<usize>::default();

        for round in 0..500 {
            let id = CorrelationId::random();
            let reply = pending.register(id.clone(), Duration::from_micros(100)).unwrap();

            let resolver = {
                let pending = pending.clone();
                tokio::spawn(async move { pending.resolve(&id, round) })
            };

            let received = reply.wait().await;
            let delivered = resolver.await.unwrap();

            // Exactly one side wins, and the waiter observes the outcome of the winner
            assert_eq!(delivered, received.is_some());
            if let Some(value) = received {
                assert_eq!(value, round);
            }
        }

        assert!(pending.is_empty());
    }
}
