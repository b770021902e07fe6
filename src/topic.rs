//! # Topic codec.
//!
//! Decodes the colon-delimited topic of an `event` message into an [`Operation`].
//!
//! ```text
//! event:on                    → Operation::On
//! event:emit:<reserved>:j     → Operation::Emit { source: Source::Frontend }
//! event:emit:<reserved>:g     → Operation::Emit { source: Source::Backend }
//! event:bogus                 → TopicError::UnknownOperation
//! event:emit:x                → TopicError::InvalidFormat (3 segments)
//! event:emit:x:z              → TopicError::UnknownSource
//! ```
//!
//! The first segment is not checked: the bus only delivers messages of the
//! channel the dispatcher subscribed to.

use std::fmt;

use crate::error::TopicError;

/// Number of segments an `emit` topic must have.
const EMIT_SEGMENTS: usize = 4;

/// Side of the application boundary an emitted event came from.
///
/// Purely a routing tag: both sides notify the same listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Frontend (`j`).
    Frontend,
    /// Backend (`g`).
    Backend,
}

impl Source {
    /// Parses a source tag (`j` or `g`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "j" => Some(Source::Frontend),
            "g" => Some(Source::Backend),
            _ => None,
        }
    }

    /// Returns the topic tag for this source.
    pub fn tag(self) -> &'static str {
        match self {
            Source::Frontend => "j",
            Source::Backend => "g",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Frontend => "frontend",
            Source::Backend => "backend",
        })
    }
}

/// Decoded operation of an `event` topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Notify listeners; the payload carries name and arguments.
    Emit {
        /// Origin of the event.
        source: Source,
    },
    /// Register a listener; the payload carries name and callback.
    On,
}

impl Operation {
    /// Decodes `topic`.
    ///
    /// # Example
    /// ```
    /// use eventvisor::{Operation, Source};
    ///
    /// assert_eq!(
    ///     Operation::parse("event:emit:from:j").unwrap(),
    ///     Operation::Emit { source: Source::Frontend },
    /// );
    /// assert_eq!(Operation::parse("event:on").unwrap(), Operation::On);
    /// assert!(Operation::parse("event:bogus").is_err());
    /// ```
    pub fn parse(topic: &str) -> Result<Self, TopicError> {
        let segments: Vec<&str> = topic.split(':').collect();
        let operation = segments.get(1).copied().unwrap_or_default();

        match operation {
            "emit" => {
                if segments.len() != EMIT_SEGMENTS {
                    return Err(TopicError::InvalidFormat {
                        topic: topic.to_string(),
                        segments: segments.len(),
                    });
                }
                let tag = segments[EMIT_SEGMENTS - 1];
                Source::from_tag(tag)
                    .map(|source| Operation::Emit { source })
                    .ok_or_else(|| TopicError::UnknownSource {
                        topic: topic.to_string(),
                        source_tag: tag.to_string(),
                    })
            }
            "on" => Ok(Operation::On),
            other => Err(TopicError::UnknownOperation {
                topic: topic.to_string(),
                operation: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_sources() {
        assert_eq!(
            Operation::parse("event:emit:_:g").unwrap(),
            Operation::Emit {
                source: Source::Backend
            }
        );
        assert_eq!(
            Operation::parse("event:emit:from:j").unwrap(),
            Operation::Emit {
                source: Source::Frontend
            }
        );
    }

    #[test]
    fn test_emit_requires_four_segments() {
        for (topic, n) in [("event:emit", 2), ("event:emit:_", 3), ("event:emit:_:g:extra", 5)] {
            assert_eq!(
                Operation::parse(topic).unwrap_err(),
                TopicError::InvalidFormat {
                    topic: topic.to_string(),
                    segments: n,
                },
                "topic {topic}"
            );
        }
    }

    #[test]
    fn test_unknown_source() {
        let err = Operation::parse("event:emit:_:x").unwrap_err();
        assert_eq!(err.as_label(), "topic_unknown_source");
    }

    #[test]
    fn test_on_ignores_segment_count() {
        assert_eq!(Operation::parse("event:on").unwrap(), Operation::On);
        assert_eq!(Operation::parse("event:on:a:b:c").unwrap(), Operation::On);
    }

    #[test]
    fn test_unknown_operation() {
        assert!(matches!(
            Operation::parse("event:bogus"),
            Err(TopicError::UnknownOperation { ref operation, .. }) if operation == "bogus"
        ));
        assert!(matches!(
            Operation::parse("event"),
            Err(TopicError::UnknownOperation { ref operation, .. }) if operation.is_empty()
        ));
    }

    #[test]
    fn test_source_tag_roundtrip() {
        for s in [Source::Frontend, Source::Backend] {
            assert_eq!(Source::from_tag(s.tag()), Some(s));
        }
        assert_eq!(Source::from_tag("js"), None);
    }
}
