use log::debug;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: f64 = 12.;

/// Terms of a fixed-rate, monthly-compounded loan.
///
/// `rate` is an annual decimal fraction (0.075, never 7.5) and `period` is the
/// term in years. None of the fields are validated here: a zero rate or period
/// produces a NaN payment rather than an error.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LoanTerms {
    pub loan_amount: f64,
    pub rate: f64,
    pub period: f64,
}

impl LoanTerms {
    pub fn new(loan_amount: f64, rate: f64, period: f64) -> Self {
        Self {
            loan_amount,
            rate,
            period,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.rate / MONTHS_PER_YEAR
    }

    /// Number of monthly payments over the term.
    pub fn payment_count(&self) -> usize {
        // NaN and negative terms saturate to zero payments
        (self.period * MONTHS_PER_YEAR) as usize
    }
}

impl fmt::Display for LoanTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loan ${:.2} at {:.4} for {} years",
            self.loan_amount, self.rate, self.period
        )
    }
}

/// Rounds to `dec_places`, sending halves toward positive infinity.
pub(crate) fn round_half_up(amt: f64, dec_places: i32) -> f64 {
    let factor = 10_f64.powi(dec_places);
    (amt * factor + 0.5).floor() / factor
}

/// Unrounded fixed monthly payment for `loan_amount` over the term.
pub(crate) fn raw_payment(loan_amount: f64, rate: f64, period: f64) -> f64 {
    let monthly_rate = rate / MONTHS_PER_YEAR;
    let total_pmts = period * MONTHS_PER_YEAR;
    let factor = (1. + monthly_rate).powf(total_pmts);

    loan_amount * (monthly_rate * factor) / (factor - 1.)
}

/// Fixed monthly payment that fully repays `terms.loan_amount`, rounded to cents.
pub fn compute_amortization(terms: &LoanTerms) -> f64 {
    let pmt = round_half_up(raw_payment(terms.loan_amount, terms.rate, terms.period), 2);
    debug!("{}: monthly payment {}", terms, pmt);
    pmt
}
