//! Role hierarchy checks. A role grants access to everything at or below its
//! rank. Typed checks are total; string tags are parsed first and an unknown tag
//! is reported instead of being ranked as the lowest role.

use crate::auth::types::{Role, UnknownRole, User};
use tracing::warn;

/// True when `role` ranks at least as high as `required`.
#[must_use]
pub const fn role_allows(role: Role, required: Role) -> bool {
    role.rank() >= required.rank()
}

/// True when the user's role ranks at least as high as `required`.
#[must_use]
pub fn can_access(user: &User, required: Role) -> bool {
    role_allows(user.role, required)
}

/// Compare two role tags given as strings.
///
/// # Errors
///
/// Returns `UnknownRole` naming the first tag outside the role set.
pub fn can_access_tag(role: &str, required: &str) -> Result<bool, UnknownRole> {
    let role: Role = role.parse()?;
    let required: Role = required.parse()?;
    Ok(role_allows(role, required))
}

/// Like [`can_access_tag`], but denies when either tag is unknown.
#[must_use]
pub fn permits_or_deny(role: &str, required: &str) -> bool {
    match can_access_tag(role, required) {
        Ok(allowed) => allowed,
        Err(err) => {
            warn!("denying access: {err}");
            false
        }
    }
}
