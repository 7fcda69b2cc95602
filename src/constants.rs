//! Constants shared across modules

/// Key of the queue on which calculation requests are published
pub const QUEUE_CALCULATION_REQUESTS: &str = "calculator.requests";

/// Default key of the shared queue on which calculation replies are published
pub const QUEUE_CALCULATION_REPLIES: &str = "calculator.replies";

/// Approximate number of entries retained in a queue
pub const QUEUE_LIMIT: usize = 100_000;

/// Header carrying the end-to-end request identifier
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
