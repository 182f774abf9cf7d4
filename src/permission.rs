//! Role classes and department visibility
//!
//! Role tags are grouped into three classes. The class plus the actor's home
//! department decide which departments the actor may see records for. This is
//! display scoping; the backend enforces the authoritative rule.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::department::{DepartmentForest, DepartmentNode};
use crate::entity::user::Actor;

/// Role tag constants (normalized form, without the `ROLE_` prefix)
pub mod role {
    pub const ADMIN: &str = "ADMIN";
    /// Văn thư
    pub const CLERK: &str = "VAN_THU";
    /// Cục trưởng
    pub const DIRECTOR: &str = "CUC_TRUONG";
    /// Phó cục trưởng
    pub const DEPUTY_DIRECTOR: &str = "CUC_PHO";
    /// Chính ủy
    pub const COMMISSAR: &str = "CHINH_UY";
    /// Phó chính ủy
    pub const DEPUTY_COMMISSAR: &str = "PHO_CHINH_UY";

    pub const HEAD_OF_DIVISION: &str = "TRUONG_PHONG";
    pub const DEPUTY_HEAD_OF_DIVISION: &str = "PHO_PHONG";
    pub const HEAD_OF_SECTION: &str = "TRUONG_BAN";
    pub const DEPUTY_HEAD_OF_SECTION: &str = "PHO_BAN";
    pub const HEAD_OF_STATION: &str = "TRAM_TRUONG";
    pub const DEPUTY_HEAD_OF_STATION: &str = "TRAM_PHO";

    pub const STAFF: &str = "NHAN_VIEN";

    /// Roles that see every department
    pub const FULL_ACCESS: [&str; 6] = [
        ADMIN,
        CLERK,
        DIRECTOR,
        DEPUTY_DIRECTOR,
        COMMISSAR,
        DEPUTY_COMMISSAR,
    ];

    /// Roles that see their own department and everything below it
    pub const DEPARTMENT_HEAD: [&str; 6] = [
        HEAD_OF_DIVISION,
        DEPUTY_HEAD_OF_DIVISION,
        HEAD_OF_SECTION,
        DEPUTY_HEAD_OF_SECTION,
        HEAD_OF_STATION,
        DEPUTY_HEAD_OF_STATION,
    ];
}

/// Normalize a role tag: trimmed, upper-case, without `ROLE_` prefix
pub fn normalize_role(tag: &str) -> String {
    let upper = tag.trim().to_uppercase();
    match upper.strip_prefix("ROLE_") {
        Some(rest) => rest.to_string(),
        None => upper,
    }
}

/// Coarse role class, first match wins: full access, then department head
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleClass {
    FullAccess,
    DepartmentHead,
    Staff,
}

/// Which role tags fall into which class
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RolePolicy {
    full_access: HashSet<String>,
    department_head: HashSet<String>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self::new(role::FULL_ACCESS, role::DEPARTMENT_HEAD)
    }
}

impl RolePolicy {
    pub fn new<A, B>(full_access: A, department_head: B) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Self {
            full_access: full_access
                .into_iter()
                .map(|r| normalize_role(r.as_ref()))
                .collect(),
            department_head: department_head
                .into_iter()
                .map(|r| normalize_role(r.as_ref()))
                .collect(),
        }
    }

    pub fn classify<S: AsRef<str>>(&self, roles: &[S]) -> RoleClass {
        let normalized: Vec<String> = roles.iter().map(|r| normalize_role(r.as_ref())).collect();
        if normalized.iter().any(|r| self.full_access.contains(r)) {
            RoleClass::FullAccess
        } else if normalized.iter().any(|r| self.department_head.contains(r)) {
            RoleClass::DepartmentHead
        } else {
            RoleClass::Staff
        }
    }

    /// True if the actor carries `tag` (compared normalized)
    pub fn has_role(actor: &Actor, tag: &str) -> bool {
        let wanted = normalize_role(tag);
        actor.roles.iter().any(|r| normalize_role(r) == wanted)
    }
}

/// Department ids an actor may view records for
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VisibilityScope {
    #[serde(rename = "hasFullAccess")]
    has_full_access: bool,
    #[serde(rename = "roleClass")]
    role_class: RoleClass,
    #[serde(rename = "visibleDepartmentIds")]
    visible: BTreeSet<i64>,
}

impl VisibilityScope {
    /// Compute the scope. Must be recomputed whenever the actor's roles, home
    /// department or the forest change.
    pub fn compute(actor: &Actor, policy: &RolePolicy, forest: &DepartmentForest) -> Self {
        let role_class = policy.classify(&actor.roles);
        let visible: BTreeSet<i64> = match role_class {
            RoleClass::FullAccess => forest.ids().collect(),
            RoleClass::DepartmentHead => std::iter::once(actor.department_id)
                .chain(forest.descendant_ids(actor.department_id))
                .collect(),
            RoleClass::Staff => BTreeSet::from([actor.department_id]),
        };
        tracing::debug!(
            "Computed visibility for user {}: {:?}, {} department(s)",
            actor.id,
            role_class,
            visible.len()
        );
        Self {
            has_full_access: role_class == RoleClass::FullAccess,
            role_class,
            visible,
        }
    }

    pub fn has_full_access(&self) -> bool {
        self.has_full_access
    }

    pub fn role_class(&self) -> RoleClass {
        self.role_class
    }

    pub fn visible_department_ids(&self) -> &BTreeSet<i64> {
        &self.visible
    }

    pub fn can_see(&self, department_id: i64) -> bool {
        self.visible.contains(&department_id)
    }

    /// Departments offered in a department filter dropdown, in tree order
    pub fn selectable_departments<'f>(&self, forest: &'f DepartmentForest) -> Vec<&'f DepartmentNode> {
        forest.iter().filter(|n| self.can_see(n.id)).collect()
    }
}

/// UI affordances. A missing capability hides the action rather than
/// failing when it is clicked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub manage_departments: bool,
    pub manage_users: bool,
    pub approve: bool,
    pub force_update_statuses: bool,
    pub compose_internal: bool,
}

impl Capabilities {
    pub fn for_actor(actor: &Actor, policy: &RolePolicy) -> Self {
        let is_admin = RolePolicy::has_role(actor, role::ADMIN);
        let is_clerk = RolePolicy::has_role(actor, role::CLERK);
        let class = policy.classify(&actor.roles);
        let leads = matches!(class, RoleClass::FullAccess | RoleClass::DepartmentHead);
        Self {
            manage_departments: is_admin,
            manage_users: is_admin,
            approve: (leads && !is_clerk) || is_admin,
            force_update_statuses: is_admin,
            compose_internal: leads,
        }
    }
}
