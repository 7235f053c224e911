// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application roles and the role-driven parts of the visit lifecycle.

use crate::error::DomainError;
use crate::status::VisitStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Roles of the users that drive visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System administrator.
    Admin,
    /// Maintenance manager.
    Manager,
    /// Maintenance supervisor.
    Supervisor,
    /// Call-centre / customer service agent.
    CustomerService,
    /// Sales representative.
    Sales,
    /// Field engineer.
    Engineer,
}

/// Initial visit status by creator role.
///
/// Supervisory roles book directly; everyone else needs an approval step.
const INITIAL_STATUS: [(Role, VisitStatus); 6] = [
    (Role::Admin, VisitStatus::Scheduled),
    (Role::Manager, VisitStatus::Scheduled),
    (Role::Supervisor, VisitStatus::Scheduled),
    (Role::CustomerService, VisitStatus::Pending),
    (Role::Sales, VisitStatus::Pending),
    (Role::Engineer, VisitStatus::Pending),
];

impl Role {
    const ALL: [Self; 6] = [
        Self::Admin,
        Self::Manager,
        Self::Supervisor,
        Self::CustomerService,
        Self::Sales,
        Self::Engineer,
    ];

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Supervisor => "supervisor",
            Self::CustomerService => "customer_service",
            Self::Sales => "sales",
            Self::Engineer => "engineer",
        }
    }

    /// Looks up the status a visit created by this role starts in.
    #[must_use]
    pub fn initial_visit_status(self) -> VisitStatus {
        INITIAL_STATUS
            .iter()
            .find(|(role, _)| *role == self)
            .map_or(VisitStatus::Pending, |(_, status)| *status)
    }

    /// Supervisory roles approve visits and manage assignments.
    #[must_use]
    pub fn is_supervisory(self) -> bool {
        self.initial_visit_status() == VisitStatus::Scheduled
    }

    /// Lists the roles that receive approval requests.
    #[must_use]
    pub fn supervisory_roles() -> Vec<Self> {
        Self::ALL.into_iter().filter(|r| r.is_supervisory()).collect()
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::InvalidRole(s.to_string()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
