//! Registry events and notification fan-out.
//!
//! Events are emitted after a successful mutation. Who hears about it is a
//! pure function of the accounts involved; delivery belongs to the
//! [`NotificationPort`](crate::ports::NotificationPort).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{AccountName, IssuerId, SealStatus, SequenceNumber, WorkflowId};

/// A committed change that interested accounts are told about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    WorkflowCreated {
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    },
    WorkflowDeleted {
        issuer_id: IssuerId,
        workflow_id: WorkflowId,
    },
    SealCreated {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        workflow_id: WorkflowId,
        status: SealStatus,
    },
    SealStatusChanged {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        status: SealStatus,
        memo: String,
    },
    SealDeleted {
        issuer_id: IssuerId,
        sequence_number: SequenceNumber,
        memo: String,
    },
}

/// An event addressed to its distinct recipients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub correlation_id: Uuid,
    pub actor: AccountName,
    pub event: RegistryEvent,
    pub recipients: Vec<AccountName>,
}

impl Notification {
    pub fn new(
        actor: &AccountName,
        owner: &AccountName,
        transit: &AccountName,
        recipient: &AccountName,
        event: RegistryEvent,
    ) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            actor: actor.clone(),
            recipients: interested_accounts(actor, owner, transit, recipient),
            event,
        }
    }
}

/// Minimal set of distinct accounts to notify, in first-seen order of
/// `(actor, owner, transit, recipient)`. Each account appears once.
pub fn interested_accounts(
    actor: &AccountName,
    owner: &AccountName,
    transit: &AccountName,
    recipient: &AccountName,
) -> Vec<AccountName> {
    let mut accounts: Vec<AccountName> = Vec::with_capacity(4);
    for account in [actor, owner, transit, recipient] {
        if !accounts.contains(account) {
            accounts.push(account.clone());
        }
    }
    accounts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> AccountName {
        AccountName::from(name)
    }

    #[test]
    fn test_all_distinct_accounts_notified_once() {
        let got = interested_accounts(&acct("bob"), &acct("alice"), &acct("truck"), &acct("carol"));
        assert_eq!(got, vec![acct("bob"), acct("alice"), acct("truck"), acct("carol")]);
    }

    #[test]
    fn test_duplicates_collapse() {
        // Owner acting on a workflow where the owner is also the recipient.
        let got =
            interested_accounts(&acct("alice"), &acct("alice"), &acct("truck"), &acct("alice"));
        assert_eq!(got, vec![acct("alice"), acct("truck")]);

        let all_same =
            interested_accounts(&acct("x"), &acct("x"), &acct("x"), &acct("x"));
        assert_eq!(all_same, vec![acct("x")]);
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = RegistryEvent::SealDeleted {
            issuer_id: 100,
            sequence_number: 4,
            memo: "delivered".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "seal_deleted");
        assert_eq!(json["sequence_number"], 4);
    }

    #[test]
    fn test_notification_builds_recipients() {
        let n = Notification::new(
            &acct("carol"),
            &acct("alice"),
            &acct("truck"),
            &acct("carol"),
            RegistryEvent::WorkflowDeleted {
                issuer_id: 1,
                workflow_id: 2,
            },
        );
        assert_eq!(n.recipients, vec![acct("carol"), acct("alice"), acct("truck")]);
        assert_eq!(n.actor, acct("carol"));
    }
}
