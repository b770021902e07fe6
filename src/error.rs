//! Error types used by the eventvisor runtime and its collaborators.
//!
//! This module defines the error enums of the crate:
//!
//! - [`RuntimeError`]: errors raised while setting up or starting the dispatcher.
//! - [`BusError`]: errors raised by the message bus (subscribe/publish).
//! - [`TopicError`]: a topic string that cannot be decoded; the message is dropped.
//! - [`PayloadError`]: a JSON payload that cannot be decoded.
//! - [`PackageError`]: failures reported by a package-manager collaborator.
//!
//! Every type provides helper methods (`as_label`, `as_message`) for logging.
//! Only [`RuntimeError`] and [`BusError`] ever reach a caller of the dispatcher;
//! steady-state decode errors are logged and absorbed by the run loop.

use thiserror::Error;

/// # Errors produced by the dispatcher runtime.
///
/// These are setup-time failures: once the dispatcher is running, no error
/// leaves the run loop.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Subscribing to one of the required bus channels failed.
    #[error("failed to subscribe to channel {channel:?}: {source}")]
    Subscribe {
        /// Channel the dispatcher tried to subscribe to.
        channel: String,
        /// The underlying bus error.
        #[source]
        source: BusError,
    },

    /// [`Dispatcher::start`](crate::Dispatcher::start) was called more than once.
    #[error("dispatcher already started")]
    AlreadyStarted,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::AlreadyStarted.as_label(), "runtime_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Subscribe { .. } => "runtime_subscribe_failed",
            RuntimeError::AlreadyStarted => "runtime_already_started",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Subscribe { channel, source } => {
                format!("subscribe to {channel:?} failed: {}", source.as_message())
            }
            RuntimeError::AlreadyStarted => "dispatcher already started".to_string(),
        }
    }
}

/// # Errors produced by the message bus.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus was closed; no further subscriptions or publications are accepted.
    #[error("message bus is closed")]
    Closed,

    /// The channel name (first topic segment) is empty.
    #[error("empty channel name in topic {topic:?}")]
    EmptyChannel {
        /// The offending topic.
        topic: String,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Closed => "bus_closed",
            BusError::EmptyChannel { .. } => "bus_empty_channel",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::Closed => "bus closed".to_string(),
            BusError::EmptyChannel { topic } => format!("empty channel: topic={topic:?}"),
        }
    }
}

/// # Errors produced while decoding a topic string.
///
/// All variants are non-fatal for the dispatcher: the message is logged and dropped.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
    /// Second segment is neither `emit` nor `on`.
    #[error("unknown operation {operation:?} in topic {topic:?}")]
    UnknownOperation {
        /// The full topic.
        topic: String,
        /// The unrecognised operation segment (empty when missing).
        operation: String,
    },

    /// An `emit` topic without exactly four segments.
    #[error("invalid emit topic {topic:?}: expected 4 segments, got {segments}")]
    InvalidFormat {
        /// The full topic.
        topic: String,
        /// Number of segments found.
        segments: usize,
    },

    /// An `emit` topic whose source segment is neither `j` nor `g`.
    #[error("unknown source {source_tag:?} in topic {topic:?}")]
    UnknownSource {
        /// The full topic.
        topic: String,
        /// The unrecognised source tag.
        source_tag: String,
    },
}

impl TopicError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventvisor::TopicError;
    ///
    /// let err = TopicError::InvalidFormat { topic: "event:emit".into(), segments: 2 };
    /// assert_eq!(err.as_label(), "topic_invalid_format");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TopicError::UnknownOperation { .. } => "topic_unknown_operation",
            TopicError::InvalidFormat { .. } => "topic_invalid_format",
            TopicError::UnknownSource { .. } => "topic_unknown_source",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TopicError::UnknownOperation { topic, operation } => {
                format!("unknown operation: {operation:?} (topic={topic:?})")
            }
            TopicError::InvalidFormat { topic, segments } => {
                format!("expected 4 segments, got {segments} (topic={topic:?})")
            }
            TopicError::UnknownSource { topic, source_tag } => {
                format!("unknown source: {source_tag:?} (topic={topic:?})")
            }
        }
    }
}

/// # Errors produced while decoding a JSON payload.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The text is not a valid emit payload.
    #[error("invalid emit payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded but carries an empty event name.
    #[error("payload has an empty event name")]
    EmptyName,
}

impl PayloadError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PayloadError::Json(_) => "payload_invalid_json",
            PayloadError::EmptyName => "payload_empty_name",
        }
    }
}

/// # Errors reported by a package-manager collaborator.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackageError {
    /// Querying the package database failed.
    #[error("package query for {package:?} failed: {reason}")]
    Query {
        /// Package being queried.
        package: String,
        /// Underlying failure description.
        reason: String,
    },
}

impl PackageError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PackageError::Query { .. } => "package_query_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_error_keeps_source() {
        let err = RuntimeError::Subscribe {
            channel: "quit".into(),
            source: BusError::Closed,
        };
        assert_eq!(err.as_label(), "runtime_subscribe_failed");
        assert!(err.to_string().contains("message bus is closed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_topic_error_messages() {
        let err = TopicError::UnknownSource {
            topic: "event:emit:_:x".into(),
            source_tag: "x".into(),
        };
        assert_eq!(err.as_label(), "topic_unknown_source");
        assert_eq!(
            err.as_message(),
            "unknown source: \"x\" (topic=\"event:emit:_:x\")"
        );
    }
}
