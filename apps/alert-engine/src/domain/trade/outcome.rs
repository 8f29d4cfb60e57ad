//! Venue submission results and their classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::Ticket;

/// Numeric return code reported by the trading terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetCode(pub u32);

impl RetCode {
    /// Order placed.
    pub const PLACED: Self = Self(10008);
    /// Request completed.
    pub const DONE: Self = Self(10009);
    /// Request partially completed.
    pub const DONE_PARTIAL: Self = Self(10010);
    /// Request rejected.
    pub const REJECT: Self = Self(10006);
    /// Request timed out inside the terminal.
    pub const TIMEOUT: Self = Self(10012);
    /// Invalid request.
    pub const INVALID: Self = Self(10013);
    /// Invalid volume.
    pub const INVALID_VOLUME: Self = Self(10014);
    /// Invalid stops.
    pub const INVALID_STOPS: Self = Self(10016);
    /// Not enough money.
    pub const NO_MONEY: Self = Self(10019);
    /// Position already closed.
    pub const POSITION_CLOSED: Self = Self(10036);

    /// Raw code.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the venue answered to one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    /// Terminal return code.
    pub retcode: RetCode,
    /// Ticket of the created order or deal, if any.
    #[serde(default)]
    pub ticket: Option<Ticket>,
    /// Terminal comment (usually a human-readable reason).
    #[serde(default)]
    pub comment: Option<String>,
}

impl SubmitResult {
    /// Result with the given code and ticket, no comment.
    #[must_use]
    pub const fn new(retcode: RetCode, ticket: Option<Ticket>) -> Self {
        Self {
            retcode,
            ticket,
            comment: None,
        }
    }
}

/// Three-way classification of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// The venue accepted the request.
    Success,
    /// The venue refused the request.
    Rejected,
    /// The outcome is not known; the request may or may not have taken effect.
    Unknown,
}

impl SubmissionStatus {
    /// Classify a venue answer. `None` means the venue returned nothing.
    #[must_use]
    pub fn classify(result: Option<&SubmitResult>) -> Self {
        match result.map(|r| r.retcode) {
            None | Some(RetCode::TIMEOUT) => Self::Unknown,
            Some(RetCode::DONE | RetCode::PLACED | RetCode::DONE_PARTIAL) => Self::Success,
            Some(_) => Self::Rejected,
        }
    }

    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(10009 => SubmissionStatus::Success ; "done")]
    #[test_case(10008 => SubmissionStatus::Success ; "placed")]
    #[test_case(10010 => SubmissionStatus::Success ; "partially done")]
    #[test_case(10012 => SubmissionStatus::Unknown ; "terminal timeout")]
    #[test_case(10016 => SubmissionStatus::Rejected ; "invalid stops")]
    #[test_case(10019 => SubmissionStatus::Rejected ; "no money")]
    #[test_case(0 => SubmissionStatus::Rejected ; "zero")]
    fn classifies_return_codes(code: u32) -> SubmissionStatus {
        SubmissionStatus::classify(Some(&SubmitResult::new(RetCode(code), None)))
    }

    #[test]
    fn missing_result_is_unknown() {
        assert_eq!(SubmissionStatus::classify(None), SubmissionStatus::Unknown);
    }

    #[test]
    fn result_decodes_without_optional_fields() {
        let result: SubmitResult = serde_json::from_str(r#"{"retcode":10009}"#).unwrap();
        assert_eq!(result.retcode, RetCode::DONE);
        assert_eq!(result.ticket, None);
    }
}
