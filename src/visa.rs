//! The visa data model
//!
//! A visa is a single assertion about a subject made by an issuing authority:
//! "this user accepted these terms", "this user is a bona fide researcher",
//! and so on. The caller builds one per issuance request; nothing in this
//! crate mutates or stores it.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisaError};

/// Who made the assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertedBy {
    /// The subject asserted it about themselves
    #[serde(rename = "self")]
    SelfAsserted,
    /// A peer of the subject
    Peer,
    /// An automated system
    System,
    /// A signing official of the source organization
    So,
    /// A data access committee
    Dac,
}

impl AssertedBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelfAsserted => "self",
            Self::Peer => "peer",
            Self::System => "system",
            Self::So => "so",
            Self::Dac => "dac",
        }
    }
}

impl fmt::Display for AssertedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An assertion to be issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visa {
    /// URI of the asserting authority
    pub issuer: String,
    /// Opaque identifier of the subject
    pub subject: String,
    /// Kind of assertion, e.g. `AcceptedTermsAndPolicies`
    #[serde(rename = "type")]
    pub kind: String,
    /// Assertion-specific payload, e.g. the URI of the accepted policy
    pub value: String,
    /// URI of the organization the assertion originates from
    pub source: String,
    pub asserted_by: AssertedBy,
    /// Seconds since the Unix epoch
    pub asserted_at: i64,
    /// Seconds since the Unix epoch; must be after `asserted_at`
    pub expires_at: i64,
}

impl Visa {
    /// Check the preconditions for issuing this visa
    pub fn validate(&self) -> Result<()> {
        if self.expires_at <= self.asserted_at {
            return Err(VisaError::InvalidVisa(format!(
                "expires at {} which is not after assertion at {}",
                self.expires_at, self.asserted_at
            )));
        }
        if self.issuer.is_empty() {
            return Err(VisaError::InvalidVisa("issuer is empty".into()));
        }
        if self.subject.is_empty() {
            return Err(VisaError::InvalidVisa("subject is empty".into()));
        }
        Ok(())
    }
}
