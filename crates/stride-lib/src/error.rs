use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signal::CHANNEL_NAMES;

/// Faults raised by the gait pipeline.
///
/// `MissingData` and `MalformedFrame` are recoverable: the offending element is
/// skipped and the fault lands in the [`ProcessingReport`](crate::pipeline::ProcessingReport).
/// The stride variants are fatal for alignment consumers only.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum GaitError {
    #[error("missing {} at sample {index}", channel_label(.channel))]
    MissingData { index: usize, channel: usize },

    #[error("malformed frame on line {line}: {reason}")]
    MalformedFrame { line: u64, reason: String },

    #[error("need at least two gait events to define a stride, found {found}")]
    NoValidStride { found: usize },

    #[error("stride of {points} points is too short for a cubic fit (need 4)")]
    InsufficientStrideLength { points: usize },

    #[error("stride [{start}, {end}) falls outside a series of {len} samples")]
    StrideOutOfBounds { start: i64, end: usize, len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn channel_label(channel: &usize) -> &'static str {
    CHANNEL_NAMES.get(*channel).copied().unwrap_or("unknown channel")
}

impl GaitError {
    /// Whether the pipeline can keep going after this fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GaitError::MissingData { .. } | GaitError::MalformedFrame { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_names_the_channel() {
        let err = GaitError::MissingData {
            index: 7,
            channel: 4,
        };
        assert_eq!(err.to_string(), "missing l_thigh_y at sample 7");
        assert!(err.is_recoverable());
    }

    #[test]
    fn stride_faults_are_fatal() {
        assert!(!GaitError::NoValidStride { found: 1 }.is_recoverable());
        assert!(!GaitError::InsufficientStrideLength { points: 3 }.is_recoverable());
    }
}
