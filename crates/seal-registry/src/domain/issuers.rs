//! Issuer directory - the authorization root.
//!
//! An issuer binding is permanent: there is no update or delete.

use std::collections::BTreeMap;

use super::authorization::require_auth;
use super::entities::Issuer;
use super::errors::RegistryError;
use super::value_objects::{AccountName, IssuerId};

/// Maps issuer ids to their owning accounts.
#[derive(Debug, Default)]
pub struct IssuerDirectory {
    by_id: BTreeMap<IssuerId, Issuer>,
}

impl IssuerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, issuer_id: IssuerId) -> Option<&Issuer> {
        self.by_id.get(&issuer_id)
    }

    /// Registers `issuer_id` for `owner`.
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller == owner`
    /// - `IssuerExists` if the id is taken
    pub fn register(
        &mut self,
        caller: &AccountName,
        owner: &AccountName,
        issuer_id: IssuerId,
    ) -> Result<&Issuer, RegistryError> {
        require_auth(caller, owner, "register an issuer for another account")?;

        if self.by_id.contains_key(&issuer_id) {
            return Err(RegistryError::IssuerExists(issuer_id));
        }

        let issuer = Issuer {
            id: issuer_id,
            owner: owner.clone(),
        };
        Ok(self.by_id.entry(issuer_id).or_insert(issuer))
    }

    /// Resolves the account that owns `issuer_id`.
    pub fn resolve_owner(&self, issuer_id: IssuerId) -> Result<&AccountName, RegistryError> {
        self.by_id
            .get(&issuer_id)
            .map(|issuer| &issuer.owner)
            .ok_or(RegistryError::IssuerNotFound(issuer_id))
    }

    /// Resolves the owner and requires `caller` to be it.
    pub fn authorize_owner(
        &self,
        caller: &AccountName,
        issuer_id: IssuerId,
        action: &'static str,
    ) -> Result<&AccountName, RegistryError> {
        let owner = self.resolve_owner(issuer_id)?;
        require_auth(caller, owner, action)?;
        Ok(owner)
    }
}
