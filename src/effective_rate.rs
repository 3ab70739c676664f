use crate::error::{AmortizeError, Result};
use crate::loan::{round_half_up, MONTHS_PER_YEAR};
use log::{debug, trace, warn};

/// Monthly growth factor bracket: 0% to 100% per month.
const LOW_GROWTH: f64 = 1.;
const HIGH_GROWTH: f64 = 2.;
const DEFAULT_TOLERANCE: f64 = 1e-5;
const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Bisection solver recovering the effective annual rate implied by a known
/// monthly payment.
///
/// The search runs over the monthly growth factor `1 + monthly_rate` and stops
/// once two successive guesses differ by less than `tolerance`. The default
/// tolerance of `1e-5` leaves roughly `±0.0003` of slack in the annual rate.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EffectiveRateSolver {
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for EffectiveRateSolver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl EffectiveRateSolver {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Effective annual rate, rounded to 4 decimal places, at which
    /// `monthly_payment` repays `loan_amount` over `period` years.
    pub fn solve(&self, loan_amount: f64, monthly_payment: f64, period: f64) -> Result<f64> {
        let total_pmts = period * MONTHS_PER_YEAR;
        let mut low = LOW_GROWTH;
        let mut high = HIGH_GROWTH;
        let mut prev_guess = low;

        for iteration in 1..=self.max_iterations {
            let guess = low + (high - low) / 2.;
            let provisional = present_value(monthly_payment, guess, total_pmts);
            trace!(
                "iteration {}, growth factor {}, provisional principal {}",
                iteration,
                guess,
                provisional
            );

            // a higher rate finances less principal for the same payment
            if provisional < loan_amount {
                high = guess;
            } else {
                low = guess;
            }

            if (guess - prev_guess).abs() < self.tolerance {
                if high - LOW_GROWTH < self.tolerance || HIGH_GROWTH - low < self.tolerance {
                    warn!(
                        "effective rate converged onto the search boundary (growth factor {})",
                        guess
                    );
                }
                let annual_rate = round_half_up(guess.powi(12) - 1., 4);
                debug!(
                    "effective rate {} after {} iterations for ${} paid as ${}/month over {} years",
                    annual_rate, iteration, loan_amount, monthly_payment, period
                );
                return Ok(annual_rate);
            }
            prev_guess = guess;
        }

        Err(AmortizeError::ConvergenceFailure {
            iterations: self.max_iterations,
            last_delta: high - low,
        })
    }
}

/// Principal financed by `total_pmts` payments of `payment` at monthly growth
/// factor `growth`.
fn present_value(payment: f64, growth: f64, total_pmts: f64) -> f64 {
    payment * growth * (1. - growth.powf(total_pmts)) / (1. - growth) / growth.powf(total_pmts + 1.)
}

/// Effective annual rate using the default solver settings.
pub fn solve_effective_rate(loan_amount: f64, monthly_payment: f64, period: f64) -> Result<f64> {
    EffectiveRateSolver::default().solve(loan_amount, monthly_payment, period)
}

#[cfg(test)]
mod tests {
    use super::{solve_effective_rate, EffectiveRateSolver};
    use crate::error::AmortizeError;
    use crate::loan::{compute_amortization, LoanTerms};
    use test_log::test;

    #[test]
    fn test_known_payment() {
        let rate = solve_effective_rate(17000., 518., 5.).unwrap();
        assert!((0.3043..=0.3049).contains(&rate), "got {rate}");
    }

    #[test]
    fn test_recovers_compounded_rate() {
        // the solver reports the annually compounded equivalent of the nominal rate
        for &(amount, rate, period) in &[
            (20000., 0.075, 5.),
            (25000., 0.049, 5.),
            (2100000., 0.0197, 25.),
            (4000000., 0.025, 25.),
            (150000., 0.12, 10.),
        ] {
            let pmt = compute_amortization(&LoanTerms::new(amount, rate, period));
            let solved = solve_effective_rate(amount, pmt, period).unwrap();
            let expected = (1. + rate / 12.).powi(12) - 1.;
            assert!(
                (solved - expected).abs() <= 0.0003,
                "{amount} {rate} {period}: solved {solved}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_iteration_cap() {
        let solver = EffectiveRateSolver::default().with_max_iterations(5);
        match solver.solve(17000., 518., 5.) {
            Err(AmortizeError::ConvergenceFailure {
                iterations,
                last_delta,
            }) => {
                assert_eq!(iterations, 5);
                assert!((last_delta - 1. / 32.).abs() < 1e-12);
            }
            other => panic!("expected convergence failure, got {other:?}"),
        }
    }

    #[test]
    fn test_tighter_tolerance() {
        let solver = EffectiveRateSolver::default().with_tolerance(1e-9);
        let rate = solver.solve(20000., 400.76, 5.).unwrap();
        assert!((rate - 0.0776).abs() <= 0.0001, "got {rate}");
    }

    #[test]
    fn test_rate_beyond_bracket_pins_to_boundary() {
        // a payment this large implies more than 100% a month
        let rate = solve_effective_rate(1000., 5000., 1.).unwrap();
        assert!(rate > 4000., "got {rate}");
    }
}
