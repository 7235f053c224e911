// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use fieldvisit_domain::{MAX_TICKET_SUFFIX, TicketNumber};
use std::fmt;
use time::Date;

type SuffixSource = Box<dyn Fn() -> u16 + Send + Sync>;

fn random_suffix() -> u16 {
    rand::random_range(0..=MAX_TICKET_SUFFIX)
}

/// Generates `PREFIX-YYYYMMDD-NNNN` ticket numbers.
///
/// Each attempt draws a fresh random suffix and asks the caller whether the
/// candidate is taken. The loop is bounded; it never waits on anything but the
/// existence check.
pub struct TicketGenerator {
    prefix: String,
    max_attempts: u32,
    suffix: SuffixSource,
}

impl fmt::Debug for TicketGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketGenerator")
            .field("prefix", &self.prefix)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl TicketGenerator {
    /// Creates a generator drawing suffixes from the thread RNG.
    #[must_use]
    pub fn new(prefix: impl Into<String>, max_attempts: u32) -> Self {
        Self::with_suffix_source(prefix, max_attempts, random_suffix)
    }

    /// Creates a generator with a custom suffix source.
    ///
    /// Values above 9999 are rejected when the ticket is composed.
    #[must_use]
    pub fn with_suffix_source(
        prefix: impl Into<String>,
        max_attempts: u32,
        suffix: impl Fn() -> u16 + Send + Sync + 'static,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            max_attempts,
            suffix: Box::new(suffix),
        }
    }

    /// Produces a ticket number that `exists` reports as free.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::IdentifierExhausted` when every attempt collides,
    /// or the error from `exists` if the uniqueness check fails.
    pub fn generate(
        &self,
        date: Date,
        exists: &mut dyn FnMut(&TicketNumber) -> Result<bool, CoreError>,
    ) -> Result<TicketNumber, CoreError> {
        for attempt in 1..=self.max_attempts {
            let candidate = TicketNumber::compose(&self.prefix, date, (self.suffix)())?;
            if !exists(&candidate)? {
                tracing::debug!(ticket = %candidate, attempt, "Generated ticket number");
                return Ok(candidate);
            }
            tracing::debug!(ticket = %candidate, attempt, "Ticket number taken, retrying");
        }

        tracing::warn!(
            prefix = %self.prefix,
            attempts = self.max_attempts,
            "Ticket number space exhausted"
        );
        Err(CoreError::IdentifierExhausted {
            attempts: self.max_attempts,
        })
    }
}
