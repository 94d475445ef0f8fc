use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Monday of one displayed calendar week.
///
/// All board state is scoped to a single week; this newtype guarantees the
/// anchor date is actually a Monday.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WeekStart(NaiveDate);

impl WeekStart {
    /// Returns the week containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        let back = u64::from(date.weekday().num_days_from_monday());
        Self(date - Days::new(back))
    }

    /// The Monday anchoring this week.
    pub fn monday(self) -> NaiveDate {
        self.0
    }

    /// The date `offset` days into the week (0 = Monday, 6 = Sunday).
    pub fn day(self, offset: u64) -> NaiveDate {
        self.0 + Days::new(offset)
    }

    /// Iterates the seven dates of the week in order.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        (0..7).map(move |offset| self.day(offset))
    }

    /// The following week.
    pub fn next(self) -> Self {
        Self(self.0 + Days::new(7))
    }

    /// The preceding week.
    pub fn previous(self) -> Self {
        Self(self.0 - Days::new(7))
    }

    /// Returns `true` when the date falls inside this week.
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.0 && date < self.0 + Days::new(7)
    }
}

impl Display for WeekStart {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}", self.0)
    }
}
