//! In-memory account directory.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::domain::value_objects::AccountName;
use crate::ports::outbound::AccountDirectory;

/// Set of known accounts, shareable across threads.
#[derive(Debug, Default)]
pub struct InMemoryAccountDirectory {
    accounts: RwLock<HashSet<AccountName>>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts<I, A>(accounts: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AccountName>,
    {
        Self {
            accounts: RwLock::new(accounts.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns false if the account already existed.
    pub fn create(&self, account: impl Into<AccountName>) -> bool {
        self.accounts.write().insert(account.into())
    }

    pub fn remove(&self, account: &AccountName) -> bool {
        self.accounts.write().remove(account)
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

impl AccountDirectory for InMemoryAccountDirectory {
    fn account_exists(&self, account: &AccountName) -> bool {
        self.accounts.read().contains(account)
    }
}
