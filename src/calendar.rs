use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A calendar month. `month` is zero-based: 0 is January.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month + 1)
    }
}

impl From<NaiveDate> for CalendarMonth {
    fn from(date: NaiveDate) -> Self {
        date_at_offset(0, date)
    }
}

/// Calendar month `offset` months after the month of `base_date`.
pub fn date_at_offset(offset: i32, base_date: NaiveDate) -> CalendarMonth {
    let months = base_date.month0() as i32 + offset;
    CalendarMonth {
        year: base_date.year() + months.div_euclid(12),
        month: months.rem_euclid(12) as u32,
    }
}

/// Local wall-clock date, read only where a caller omits a base date.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
