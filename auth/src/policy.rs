//! Access decisions over already-verified claims.
//!
//! - No IO
//! - No panics
//! - Only claims, a target and a declarative requirement go in

use thiserror::Error;

use crate::jwt::Claims;
use crate::role::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Unauthorized to access this resource")]
    Unauthorized,
}

/// Allow only callers holding exactly `required`.
pub fn require_role(claims: &Claims, required: Role) -> Result<(), PolicyError> {
    if claims.role == required {
        Ok(())
    } else {
        Err(PolicyError::Unauthorized)
    }
}

/// Allow elevated callers, or callers whose subject is `target_subject_id`.
pub fn require_self_or_admin(claims: &Claims, target_subject_id: &str) -> Result<(), PolicyError> {
    if claims.role.is_elevated() || claims.sub == target_subject_id {
        Ok(())
    } else {
        Err(PolicyError::Unauthorized)
    }
}
