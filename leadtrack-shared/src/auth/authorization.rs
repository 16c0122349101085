/// Access control gate
///
/// Two checks sit on top of the authenticated [`AuthContext`]:
///
/// 1. **Role**: some operations (cross-executive listings) are reserved for
///    administrators.
/// 2. **Effective executive**: several endpoints accept an explicit
///    executive id (query string, filter body, stats path). The id is only
///    honored when it names the caller, when the caller is an administrator,
///    or when the deployment opts into trusting it.
///
/// # Example
///
/// ```
/// use leadtrack_shared::auth::authorization::{resolve_executive, AccessPolicy};
/// use leadtrack_shared::auth::middleware::AuthContext;
/// use leadtrack_shared::models::executive::ExecutiveRole;
///
/// let auth = AuthContext::new(4, ExecutiveRole::Standard);
/// let policy = AccessPolicy::default();
///
/// assert_eq!(resolve_executive(&auth, None, &policy).unwrap(), 4);
/// assert!(resolve_executive(&auth, Some(9), &policy).is_err());
/// ```

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller asked to act as another executive
    #[error("Not authorized to act as executive {0}")]
    ForeignExecutive(i64),

    /// Operation requires the admin role
    #[error("Administrator role required")]
    AdminRequired,
}

/// Deployment-wide access settings
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    /// Honor any explicit executive id without checking it against the caller
    pub trust_executive_override: bool,
}

/// Resolves which executive an operation runs as
///
/// `requested` is the optional explicit id supplied by the client. `None`
/// always resolves to the caller.
pub fn resolve_executive(
    auth: &AuthContext,
    requested: Option<i64>,
    policy: &AccessPolicy,
) -> Result<i64, AuthzError> {
    match requested {
        None => Ok(auth.executive_id),
        Some(id) if id == auth.executive_id => Ok(id),
        Some(id) if auth.is_admin() || policy.trust_executive_override => {
            tracing::debug!(
                caller = auth.executive_id,
                effective = id,
                "Executive override honored"
            );
            Ok(id)
        }
        Some(id) => {
            tracing::warn!(
                caller = auth.executive_id,
                requested = id,
                "Executive override rejected"
            );
            Err(AuthzError::ForeignExecutive(id))
        }
    }
}

/// Fails unless the caller is an administrator
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

/// Ownership scope for operations administrators may run across executives
///
/// `None` means unrestricted.
pub fn owner_scope(auth: &AuthContext) -> Option<i64> {
    if auth.is_admin() {
        None
    } else {
        Some(auth.executive_id)
    }
}
