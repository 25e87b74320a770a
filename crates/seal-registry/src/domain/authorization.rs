//! Authorization guard.
//!
//! The host substrate authenticates the caller; these checks decide whether
//! that caller is the account an operation requires.

use super::errors::RegistryError;
use super::value_objects::AccountName;

/// Fails with `Unauthorized` unless `caller == required`.
pub fn require_auth(
    caller: &AccountName,
    required: &AccountName,
    action: &'static str,
) -> Result<(), RegistryError> {
    if caller == required {
        return Ok(());
    }
    tracing::warn!(%caller, %required, action, "Rejected unauthorized call");
    Err(RegistryError::unauthorized(caller, action))
}

/// Capability check for seal status updates: the issuer owner, the
/// workflow's transit and the workflow's recipient may all advance status.
pub fn can_update_status(
    actor: &AccountName,
    owner: &AccountName,
    transit: &AccountName,
    recipient: &AccountName,
) -> bool {
    actor == owner || actor == transit || actor == recipient
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> AccountName {
        AccountName::from(name)
    }

    #[test]
    fn test_require_auth_matches_exactly() {
        assert!(require_auth(&acct("alice"), &acct("alice"), "register keys").is_ok());

        let err = require_auth(&acct("bob"), &acct("alice"), "register keys").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Unauthorized { ref caller, action: "register keys" } if caller == &acct("bob")
        ));
    }

    #[test]
    fn test_status_capability() {
        let (owner, transit, recipient) = (acct("alice"), acct("truckco"), acct("carol"));
        assert!(can_update_status(&owner, &owner, &transit, &recipient));
        assert!(can_update_status(&transit, &owner, &transit, &recipient));
        assert!(can_update_status(&recipient, &owner, &transit, &recipient));
        assert!(!can_update_status(&acct("mallory"), &owner, &transit, &recipient));
    }
}
