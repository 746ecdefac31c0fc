//! Caller roles and per-request parameters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the caller requesting a document
///
/// `None` or an empty string means unauthenticated. The sentinel `"@"`
/// marks a logged-in caller who has not yet accepted the service terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Option<String>);

impl Role {
    /// Sentinel for a logged-in caller with pending service terms
    pub const UNVALIDATED: &'static str = "@";

    /// Unauthenticated caller
    #[inline]
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(None)
    }

    /// Caller with a literal role
    #[inline]
    #[must_use]
    pub fn named(role: impl Into<String>) -> Self {
        Self(Some(role.into()))
    }

    /// Logged-in caller whose service terms are not validated
    #[inline]
    #[must_use]
    pub fn unvalidated() -> Self {
        Self::named(Self::UNVALIDATED)
    }

    /// Role string, if any (may be empty)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// True for a non-empty role
    #[inline]
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.0.as_deref().is_some_and(|r| !r.is_empty())
    }

    /// True for the `"@"` sentinel
    #[inline]
    #[must_use]
    pub fn is_unvalidated(&self) -> bool {
        self.0.as_deref() == Some(Self::UNVALIDATED)
    }
}

impl From<Option<String>> for Role {
    fn from(role: Option<String>) -> Self {
        Self(role)
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::named(role)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(role) if !role.is_empty() => f.write_str(role),
            _ => f.write_str("<anonymous>"),
        }
    }
}

/// Per-request pipeline parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRequest {
    /// Caller role
    pub role: Role,
    /// Whether the caller has accepted the service terms
    pub terms_accepted: bool,
    /// Whether the system is in maintenance mode
    pub maintenance: bool,
}

impl ProcessRequest {
    /// Request for `role` with terms accepted, outside maintenance
    #[inline]
    #[must_use]
    pub fn new(role: impl Into<Role>) -> Self {
        Self {
            role: role.into(),
            terms_accepted: true,
            maintenance: false,
        }
    }

    /// Unauthenticated request
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(Role::anonymous())
    }

    /// With service terms acceptance
    #[inline]
    #[must_use]
    pub fn with_terms_accepted(mut self, accepted: bool) -> Self {
        self.terms_accepted = accepted;
        self
    }

    /// With maintenance mode
    #[inline]
    #[must_use]
    pub fn with_maintenance(mut self, maintenance: bool) -> Self {
        self.maintenance = maintenance;
        self
    }

    /// Role used for filtering
    ///
    /// A logged-in caller is downgraded to `"@"` when the document requires
    /// service terms and they have not been accepted.
    #[must_use]
    pub fn effective_role(&self, terms_required: bool) -> Role {
        if terms_required && !self.terms_accepted && self.role.is_logged_in() {
            Role::unvalidated()
        } else {
            self.role.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_and_empty_are_logged_out() {
        assert!(!Role::anonymous().is_logged_in());
        assert!(!Role::named("").is_logged_in());
        assert!(Role::named("admin").is_logged_in());
        assert!(Role::unvalidated().is_logged_in());
    }

    #[test]
    fn display() {
        assert_eq!(Role::named("admin").to_string(), "admin");
        assert_eq!(Role::anonymous().to_string(), "<anonymous>");
    }

    #[test]
    fn serde_transparent() {
        let role: Role = serde_json::from_str("\"operator\"").unwrap();
        assert_eq!(role, Role::named("operator"));
        let none: Role = serde_json::from_str("null").unwrap();
        assert_eq!(none, Role::anonymous());
    }

    #[test]
    fn effective_role_downgrades_only_when_terms_pending() {
        let pending = ProcessRequest::new("operator").with_terms_accepted(false);
        assert!(pending.effective_role(true).is_unvalidated());
        assert_eq!(pending.effective_role(false), Role::named("operator"));

        let accepted = ProcessRequest::new("operator");
        assert_eq!(accepted.effective_role(true), Role::named("operator"));
    }

    #[test]
    fn anonymous_is_never_downgraded() {
        let request = ProcessRequest::anonymous().with_terms_accepted(false);
        assert_eq!(request.effective_role(true), Role::anonymous());
    }
}
