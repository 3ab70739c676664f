//! Fixed-rate loan amortization: monthly payments, fee adjustments,
//! effective rate recovery and month-by-month repayment schedules.

pub mod calendar;
pub mod effective_rate;
pub mod error;
pub mod fees;
pub mod loan;
pub mod schedule;

pub use calendar::{date_at_offset, CalendarMonth};
pub use effective_rate::{solve_effective_rate, EffectiveRateSolver};
pub use error::{AmortizeError, Result};
pub use fees::{compute_amortization_with_fees, FeeSet, RawFee};
pub use loan::{compute_amortization, LoanTerms};
pub use schedule::{generate_schedule, Schedule, ScheduleEntry};
