use crate::calendar::{date_at_offset, today, CalendarMonth};
use crate::fees::FeeSet;
use crate::loan::{compute_amortization, LoanTerms};
use chrono::NaiveDate;
use log::{debug, trace};
use std::{fmt, ops::Deref};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One month of a repayment schedule.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ScheduleEntry {
    pub down_payment: f64,
    pub interest: f64,
    pub fees_paid: f64,
    /// Outstanding principal after this payment.
    pub remainder: f64,
    pub year: i32,
    /// Zero-based calendar month.
    pub month: u32,
}

impl ScheduleEntry {
    /// Everything paid this month: principal, interest and fees.
    pub fn payment(&self) -> f64 {
        self.down_payment + self.interest + self.fees_paid
    }

    pub fn calendar_month(&self) -> CalendarMonth {
        CalendarMonth {
            year: self.year,
            month: self.month,
        }
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, principal ${:.2}, interest ${:.2}, fees ${:.2}, remainder ${:.2}",
            self.calendar_month(),
            self.down_payment,
            self.interest,
            self.fees_paid,
            self.remainder
        )
    }
}

/// A full repayment schedule, one entry per month.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Schedule(Vec<ScheduleEntry>);

impl Schedule {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.0
    }

    pub fn into_entries(self) -> Vec<ScheduleEntry> {
        self.0
    }

    pub fn total_interest(&self) -> f64 {
        self.0.iter().fold(0., |total, e| total + e.interest)
    }

    pub fn total_fees(&self) -> f64 {
        self.0.iter().fold(0., |total, e| total + e.fees_paid)
    }

    pub fn total_paid(&self) -> f64 {
        self.0.iter().fold(0., |total, e| total + e.payment())
    }

    /// Principal left after the last payment, or `None` for an empty schedule.
    pub fn final_remainder(&self) -> Option<f64> {
        self.0.last().map(|e| e.remainder)
    }
}

impl Deref for Schedule {
    type Target = [ScheduleEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Schedule {
    type Item = ScheduleEntry;
    type IntoIter = std::vec::IntoIter<ScheduleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pmt_number, entry) in self.0.iter().enumerate() {
            writeln!(f, "pmt number {}, {}", pmt_number + 1, entry)?;
        }
        Ok(())
    }
}

/// Month-by-month repayment schedule starting from `base_date`, or from today
/// when none is given.
pub fn generate_schedule(
    terms: &LoanTerms,
    fees: &FeeSet,
    base_date: Option<NaiveDate>,
) -> Schedule {
    schedule_from(terms, fees, base_date.unwrap_or_else(today))
}

// Interest is floored and principal ceiled so the remainder lands on zero in
// the final month; each rule is applied to its own field.
fn schedule_from(terms: &LoanTerms, fees: &FeeSet, base_date: NaiveDate) -> Schedule {
    let pmt_amount = compute_amortization(terms);
    let monthly_rate = terms.monthly_rate();
    let period_fees = fees.period_total();
    let principal_fees = fees.principal_total();
    let pmt_count = terms.payment_count();

    debug!(
        "{}: scheduling {} payments of {} from {}",
        terms, pmt_count, pmt_amount, base_date
    );

    let mut remainder = terms.loan_amount;
    let mut entries = Vec::with_capacity(pmt_count);

    for pmt_number in 1..=pmt_count {
        let interest = (remainder * monthly_rate).floor();
        let down_payment = (pmt_amount - interest).min(remainder).ceil();
        remainder -= down_payment;

        let fees_paid = if pmt_number == 1 {
            period_fees + principal_fees
        } else {
            period_fees
        };
        let CalendarMonth { year, month } = date_at_offset(pmt_number as i32, base_date);

        trace!(
            "pmt # {}, {}-{:02}, interest {}, principal {}, remainder {}",
            pmt_number,
            year,
            month + 1,
            interest,
            down_payment,
            remainder
        );

        entries.push(ScheduleEntry {
            down_payment,
            interest,
            fees_paid,
            remainder,
            year,
            month,
        });
    }
    Schedule(entries)
}
