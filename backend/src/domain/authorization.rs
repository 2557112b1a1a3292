//! Authorization gates evaluated before a protected handler runs.
//!
//! The predicates are pure: they look at the identity resolved for the
//! request and either pass it through or return a [`GuardDenial`]. Inbound
//! adapters turn a denial into a flash message plus a redirect, so the
//! guarded handler never starts.

use super::{IdentitySnapshot, Role};

/// Login entry point used after an authentication failure.
pub const LOGIN_PATH: &str = "/auth/login";
/// Application root used after a role failure.
pub const ROOT_PATH: &str = "/";

/// Why a gate refused the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardDenial {
    /// No session, or the session expired.
    #[error("authentication required")]
    NotAuthenticated,
    /// Authenticated, but the role does not match.
    #[error("insufficient privilege")]
    InsufficientRole { required: Role },
}

impl GuardDenial {
    /// Where the caller is sent.
    pub fn redirect_to(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => LOGIN_PATH,
            Self::InsufficientRole { .. } => ROOT_PATH,
        }
    }

    /// Flash text shown on the next render.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Authentication required",
            Self::InsufficientRole { .. } => "Insufficient privilege",
        }
    }
}

/// Pass iff the request carries a live session.
///
/// # Examples
/// ```
/// use bookshelf::domain::{require_authenticated, GuardDenial};
///
/// assert_eq!(require_authenticated(None), Err(GuardDenial::NotAuthenticated));
/// ```
pub fn require_authenticated(
    identity: Option<&IdentitySnapshot>,
) -> Result<&IdentitySnapshot, GuardDenial> {
    identity.ok_or(GuardDenial::NotAuthenticated)
}

/// Pass iff [`require_authenticated`] passes and the role matches.
pub fn require_role(
    identity: Option<&IdentitySnapshot>,
    required: Role,
) -> Result<&IdentitySnapshot, GuardDenial> {
    let identity = require_authenticated(identity)?;
    if identity.role == required {
        Ok(identity)
    } else {
        Err(GuardDenial::InsufficientRole { required })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, Email, UserId};
    use rstest::{fixture, rstest};

    fn identity(role: Role) -> IdentitySnapshot {
        IdentitySnapshot {
            id: UserId::random(),
            display_name: DisplayName::new("Ana").expect("name"),
            email: Email::new("ana@example.com").expect("email"),
            role,
        }
    }

    #[fixture]
    fn member() -> IdentitySnapshot {
        identity(Role::Member)
    }

    #[fixture]
    fn admin() -> IdentitySnapshot {
        identity(Role::Admin)
    }

    #[rstest]
    fn anonymous_requests_fail_both_gates() {
        assert_eq!(require_authenticated(None), Err(GuardDenial::NotAuthenticated));
        assert_eq!(
            require_role(None, Role::Admin),
            Err(GuardDenial::NotAuthenticated)
        );
    }

    #[rstest]
    fn member_passes_authentication_but_not_admin_gate(member: IdentitySnapshot) {
        assert_eq!(require_authenticated(Some(&member)), Ok(&member));
        let denial = require_role(Some(&member), Role::Admin).expect_err("member is not admin");
        assert_eq!(
            denial,
            GuardDenial::InsufficientRole {
                required: Role::Admin
            }
        );
        assert_eq!(denial.redirect_to(), ROOT_PATH);
        assert_eq!(denial.user_message(), "Insufficient privilege");
    }

    #[rstest]
    fn admin_passes_admin_gate(admin: IdentitySnapshot) {
        assert_eq!(require_role(Some(&admin), Role::Admin), Ok(&admin));
    }

    #[rstest]
    fn authentication_denial_targets_login() {
        let denial = GuardDenial::NotAuthenticated;
        assert_eq!(denial.redirect_to(), LOGIN_PATH);
        assert_eq!(denial.user_message(), "Authentication required");
    }
}
