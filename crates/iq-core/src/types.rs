//! Core type definitions for inline-query

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Globally unique object identifier, e.g. `PHID-XCMT-6f1c2d...`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Phid(pub String);

impl Phid {
    /// Type tag for inline comment PHIDs
    pub const INLINE_TYPE: &'static str = "XCMT";
    /// Type tag for user PHIDs
    pub const USER_TYPE: &'static str = "USER";
    /// Type tag for transaction PHIDs
    pub const TRANSACTION_TYPE: &'static str = "XACT";

    /// Generate a fresh PHID of the given type
    pub fn generate(type_tag: &str) -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Phid(format!("PHID-{}-{}", type_tag, &simple[..20]))
    }

    /// Create a Phid from a string
    pub fn from_string(s: impl Into<String>) -> Self {
        Phid(s.into())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The type tag embedded in the PHID, if it is well formed
    pub fn type_tag(&self) -> Option<&str> {
        let mut parts = self.0.splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("PHID"), Some(tag), Some(_)) => Some(tag),
            _ => None,
        }
    }
}

impl fmt::Display for Phid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage identifier for an inline comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage identifier for a changeset (one file of a diff)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangesetId(pub u64);

impl fmt::Display for ChangesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user a query runs on behalf of
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    phid: Option<Phid>,
}

impl Viewer {
    /// A logged-out viewer
    pub fn anonymous() -> Self {
        Self { phid: None }
    }

    /// A viewer with an identity
    pub fn user(phid: Phid) -> Self {
        Self { phid: Some(phid) }
    }

    /// The viewer's PHID, if logged in
    pub fn phid(&self) -> Option<&Phid> {
        self.phid.as_ref()
    }

    /// Check if the viewer has no identity
    pub fn is_anonymous(&self) -> bool {
        self.phid.is_none()
    }
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.phid {
            Some(phid) => write!(f, "{}", phid),
            None => write!(f, "<anonymous>"),
        }
    }
}
