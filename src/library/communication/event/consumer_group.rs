use super::QueueLocation;
use std::fmt;

/// Unique identifier for a group of consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumerGroupIdentifier {
    /// Calculator workers sharing the request queue
    Calculator,
    /// Gateway instance with the given identifier, each instance forms its own group
    Gateway(String),
    /// Unknown consumer group
    Other(String),
}

impl fmt::Display for ConsumerGroupIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Calculator => write!(f, "calculator"),
            Self::Gateway(instance) => write!(f, "gateway-{}", instance),
            Self::Other(identifier) => write!(f, "{}", identifier),
        }
    }
}

/// Definition of a consumer group
///
/// In a message queue, a group of consumers collaborates to consume messages.
/// Each message is only delivered to one consumer within the same group, identified
/// by a [`ConsumerGroupIdentifier`]. When it is created, they start processing messages
/// from the provided [`QueueLocation`].
#[derive(Debug, Clone)]
pub struct ConsumerGroupDescriptor {
    identifier: ConsumerGroupIdentifier,
    start: QueueLocation,
}

impl ConsumerGroupDescriptor {
    /// Creates a new instance from raw parts
    pub fn new(identifier: ConsumerGroupIdentifier, start: QueueLocation) -> Self {
        Self { identifier, start }
    }

    /// Unique identifier of the group
    pub fn identifier(&self) -> &ConsumerGroupIdentifier {
        &self.identifier
    }

    /// Location from where a consumer group begins to consume messages
    ///
    /// Note that it is not guaranteed that this will be honored (e.g. when the group already exists)!
    pub fn start(&self) -> &QueueLocation {
        &self.start
    }
}

impl Default for ConsumerGroupDescriptor {
    /// Uses [`ConsumerGroupIdentifier::Calculator`] and [`QueueLocation::Head`] as they are most commonly employed
    fn default() -> Self {
        Self {
            identifier: ConsumerGroupIdentifier::Calculator,
            start: QueueLocation::Head,
        }
    }
}

/// Unique identifier of a consumer within a [`ConsumerGroup`](ConsumerGroupDescriptor)
pub type ConsumerIdentifier = String;

#[cfg(test)]
mod does {
    use super::*;

    #[test]
    fn name_groups() {
        assert_eq!(ConsumerGroupIdentifier::Calculator.to_string(), "calculator");
        assert_eq!(
            ConsumerGroupIdentifier::Gateway("a1".into()).to_string(),
            "gateway-a1"
        );
        assert_eq!(
            ConsumerGroupIdentifier::Other("custom".into()).to_string(),
            "custom"
        );
    }
}
