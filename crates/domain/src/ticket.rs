// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, Month};

/// Largest four-digit suffix.
pub const MAX_TICKET_SUFFIX: u16 = 9_999;

/// Human-readable visit ticket number: `PREFIX-YYYYMMDD-NNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketNumber(String);

impl TicketNumber {
    /// Composes a ticket number from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is empty or not alphanumeric, or if the
    /// suffix exceeds four digits.
    pub fn compose(prefix: &str, date: Date, suffix: u16) -> Result<Self, DomainError> {
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::InvalidTicketNumber(prefix.to_string()));
        }
        if suffix > MAX_TICKET_SUFFIX {
            return Err(DomainError::TicketSuffixOutOfRange(suffix));
        }
        Ok(Self(format!(
            "{prefix}-{:04}{:02}{:02}-{suffix:04}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )))
    }

    /// Returns the ticket as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the date stamp embedded in the ticket.
    #[must_use]
    pub fn date(&self) -> Option<Date> {
        let stamp = self.0.split('-').nth(1)?;
        let year: i32 = stamp.get(0..4)?.parse().ok()?;
        let month: u8 = stamp.get(4..6)?.parse().ok()?;
        let day: u8 = stamp.get(6..8)?.parse().ok()?;
        Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
    }
}

impl FromStr for TicketNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidTicketNumber(s.to_string());
        let mut parts = s.split('-');
        let (Some(prefix), Some(stamp), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let digits = |part: &str, len: usize| {
            part.len() == len && part.chars().all(|c| c.is_ascii_digit())
        };
        if prefix.is_empty() || !digits(stamp, 8) || !digits(suffix, 4) {
            return Err(invalid());
        }
        let ticket = Self(s.to_string());
        ticket.date().ok_or_else(invalid)?;
        Ok(ticket)
    }
}

impl TryFrom<String> for TicketNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TicketNumber> for String {
    fn from(ticket: TicketNumber) -> Self {
        ticket.0
    }
}

impl std::fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
