// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a numeric identifier newtype for an externally owned entity.
///
/// The surrounding application assigns these identifiers; this crate only
/// carries them around and never generates them.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id! {
    /// Identifier of an application user (any role).
    UserId
}

numeric_id! {
    /// Identifier of a field engineer.
    ///
    /// Engineers are users; the numeric space is shared with [`UserId`].
    EngineerId
}

numeric_id! {
    /// Identifier of a customer.
    CustomerId
}

numeric_id! {
    /// Identifier of a serviced device.
    DeviceId
}

numeric_id! {
    /// Identifier of a customer facility (a site that houses devices).
    FacilityId
}

numeric_id! {
    /// Identifier of the maintenance request a visit originates from.
    RequestId
}

impl From<EngineerId> for UserId {
    fn from(engineer: EngineerId) -> Self {
        Self(engineer.0)
    }
}

impl From<UserId> for EngineerId {
    fn from(user: UserId) -> Self {
        Self(user.0)
    }
}

/// Opaque, generated identifier of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitId(Uuid);

impl VisitId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing identifier (e.g. one read back from storage).
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for VisitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VisitId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
