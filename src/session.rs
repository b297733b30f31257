//! Explicit session state and the parameterized access policy.
//!
//! The session is a plain value carried through call sites, not
//! ambient global state. One policy type replaces the old set of
//! near-duplicate per-role route guards: pages declare which roles may
//! enter, and superusers pass every role check.

use agriplan_types::{Profile, Role};

/// An authenticated user plus the token their requests carry.
#[derive(Debug, Clone)]
pub struct Session {
    pub profile: Profile,
    pub token: String,
}

impl Session {
    pub fn new(profile: Profile, token: impl Into<String>) -> Self {
        Self {
            profile,
            token: token.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }
}

/// Who may enter a page (or run the equivalent CLI command). The check
/// is UX convenience only; the server re-validates every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any authenticated user.
    Authenticated,
    /// Superusers only (reference-data administration).
    Superuser,
    /// Any of the listed roles; superusers always pass.
    Roles(&'static [Role]),
}

impl AccessPolicy {
    pub fn allows(&self, profile: &Profile) -> bool {
        match self {
            AccessPolicy::Authenticated => true,
            AccessPolicy::Superuser => profile.is_superuser,
            AccessPolicy::Roles(roles) => {
                profile.is_superuser || roles.contains(&profile.role)
            }
        }
    }
}

/// Per-page policies, matching the route table of the web frontend.
pub mod pages {
    use super::AccessPolicy;
    use agriplan_types::Role;

    pub const ADMIN: AccessPolicy = AccessPolicy::Superuser;
    pub const PLANS: AccessPolicy = AccessPolicy::Authenticated;
    pub const ENCODING: AccessPolicy = AccessPolicy::Roles(&[Role::LeadExecutiveBody]);
    pub const REVIEWS: AccessPolicy = AccessPolicy::Roles(&[Role::StateMinister]);
    pub const VALIDATIONS: AccessPolicy = AccessPolicy::Roles(&[Role::StrategicStaff]);
    pub const FINAL_APPROVALS: AccessPolicy = AccessPolicy::Roles(&[Role::Executive]);
    pub const MINISTER_VIEW: AccessPolicy = AccessPolicy::Roles(&[Role::MinisterView]);
    pub const ADVISOR_NOTES: AccessPolicy = AccessPolicy::Roles(&[Role::Advisor]);
}
