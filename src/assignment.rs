//! Primary / secondary recipients for internal documents
//!
//! A composer picks one primary recipient (chủ trì) and any number of
//! secondary recipients (phối hợp). A recipient is either a whole department
//! or one user within a department.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::department::DepartmentForest;
use crate::entity::user::UserRecord;
use crate::filter::DepartmentScoped;

/// Department or user recipient
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Recipient {
    Department {
        id: i64,
    },
    User {
        #[serde(rename = "departmentId")]
        department_id: i64,
        #[serde(rename = "userId")]
        user_id: i64,
    },
}

impl Recipient {
    pub fn department(id: i64) -> Self {
        Recipient::Department { id }
    }

    pub fn user(department_id: i64, user_id: i64) -> Self {
        Recipient::User {
            department_id,
            user_id,
        }
    }

    /// Department the recipient belongs to
    pub fn department_id(&self) -> i64 {
        match *self {
            Recipient::Department { id } => id,
            Recipient::User { department_id, .. } => department_id,
        }
    }
}

/// Selection state while composing one document.
///
/// The primary recipient is never also a secondary recipient.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSelection {
    primary: Option<Recipient>,
    secondary: BTreeSet<Recipient>,
}

impl AssignmentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `recipient` the primary, evicting it from the secondary set
    pub fn select_primary(&mut self, recipient: Recipient) {
        self.secondary.remove(&recipient);
        self.primary = Some(recipient);
    }

    /// Toggle `recipient` in the secondary set. No-op for the current primary.
    pub fn select_secondary(&mut self, recipient: Recipient) {
        if self.primary == Some(recipient) {
            return;
        }
        if !self.secondary.remove(&recipient) {
            self.secondary.insert(recipient);
        }
    }

    pub fn clear_primary(&mut self) {
        self.primary = None;
    }

    pub fn clear(&mut self) {
        self.primary = None;
        self.secondary.clear();
    }

    pub fn primary(&self) -> Option<Recipient> {
        self.primary
    }

    pub fn secondary(&self) -> impl Iterator<Item = Recipient> + '_ {
        self.secondary.iter().copied()
    }

    pub fn is_primary(&self, recipient: Recipient) -> bool {
        self.primary == Some(recipient)
    }

    pub fn is_secondary(&self, recipient: Recipient) -> bool {
        self.secondary.contains(&recipient)
    }

    /// The secondary checkbox is disabled while the row is primary
    pub fn is_secondary_enabled(&self, recipient: Recipient) -> bool {
        !self.is_primary(recipient)
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_empty()
    }

    /// Body for an `/assign` action. `None` until a primary is chosen.
    pub fn to_request(&self) -> Option<AssignRequest> {
        Some(AssignRequest {
            primary: self.primary?,
            secondary: self.secondary().collect(),
        })
    }
}

/// Body of `POST /{resource}/{id}/assign`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub primary: Recipient,
    #[serde(default)]
    pub secondary: Vec<Recipient>,
}

/// One row of the recipient picker
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecipientOption {
    pub recipient: Recipient,
    pub label: String,
    /// Indentation level
    pub level: usize,
}

/// Build the picker rows: each department, then its members, then its
/// sub-departments. Users whose department cannot be resolved are left out.
pub fn recipient_options(forest: &DepartmentForest, users: &[UserRecord]) -> Vec<RecipientOption> {
    let mut members: HashMap<i64, Vec<&UserRecord>> = HashMap::new();
    for user in users {
        match user.department_ref().resolve(forest) {
            Some(node) => members.entry(node.id).or_default().push(user),
            None => tracing::debug!("User {} has no resolvable department, skipped", user.id),
        }
    }

    let mut rows = Vec::with_capacity(forest.len() + users.len());
    let mut stack: Vec<i64> = forest.roots().map(|n| n.id).collect();
    stack.reverse();
    while let Some(id) = stack.pop() {
        let Some(node) = forest.get(id) else {
            continue;
        };
        rows.push(RecipientOption {
            recipient: Recipient::department(node.id),
            label: node.name.clone(),
            level: node.level,
        });
        if let Some(users) = members.get(&node.id) {
            rows.extend(users.iter().map(|u| RecipientOption {
                recipient: Recipient::user(node.id, u.id),
                label: u.display_name().to_string(),
                level: node.level + 1,
            }));
        }
        stack.extend(node.children.iter().rev().copied());
    }
    rows
}
