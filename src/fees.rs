use crate::error::{AmortizeError, Result};
use crate::loan::{compute_amortization, LoanTerms};
use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fee amount as it arrives from a loosely-typed source.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawFee {
    Number(f64),
    Text(String),
    Missing,
    /// Booleans, objects and arrays from a loose source; never a fee.
    #[cfg(feature = "serde")]
    #[serde(skip_serializing)]
    Other(serde::de::IgnoredAny),
}

impl RawFee {
    /// The fee as a finite number, or `None` if it is missing or not numeric.
    pub fn normalize(&self) -> Option<f64> {
        let amt = match self {
            RawFee::Number(n) => *n,
            RawFee::Text(s) => s.trim().parse::<f64>().ok()?,
            RawFee::Missing => return None,
            #[cfg(feature = "serde")]
            RawFee::Other(_) => return None,
        };
        amt.is_finite().then_some(amt)
    }

    /// Parses a fee supplied on the command line, rejecting anything non-numeric.
    pub fn parse_strict(input: &str) -> Result<f64> {
        RawFee::Text(input.to_string())
            .normalize()
            .ok_or_else(|| AmortizeError::InvalidFee {
                input: input.to_string(),
            })
    }
}

impl From<f64> for RawFee {
    fn from(amt: f64) -> Self {
        RawFee::Number(amt)
    }
}

impl From<&str> for RawFee {
    fn from(s: &str) -> Self {
        RawFee::Text(s.to_string())
    }
}

impl<T: Into<RawFee>> From<Option<T>> for RawFee {
    fn from(fee: Option<T>) -> Self {
        fee.map_or(RawFee::Missing, Into::into)
    }
}

/// One-time fees financed into the principal, and recurring fees added to
/// every payment. Absent entries are skipped when summing.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct FeeSet {
    pub principal_fees: Vec<Option<f64>>,
    pub period_fees: Vec<Option<f64>>,
}

impl FeeSet {
    pub fn new(principal_fees: Vec<f64>, period_fees: Vec<f64>) -> Self {
        Self {
            principal_fees: principal_fees.into_iter().map(Some).collect(),
            period_fees: period_fees.into_iter().map(Some).collect(),
        }
    }

    /// Builds a fee set from loosely-typed entries, dropping the ones that do
    /// not normalize to a finite number.
    pub fn from_raw<P, Q>(principal_fees: P, period_fees: Q) -> Self
    where
        P: IntoIterator<Item = RawFee>,
        Q: IntoIterator<Item = RawFee>,
    {
        Self {
            principal_fees: normalize_all(principal_fees),
            period_fees: normalize_all(period_fees),
        }
    }

    pub fn principal_total(&self) -> f64 {
        sum_fees(&self.principal_fees)
    }

    pub fn period_total(&self) -> f64 {
        sum_fees(&self.period_fees)
    }
}

fn normalize_all<I: IntoIterator<Item = RawFee>>(fees: I) -> Vec<Option<f64>> {
    fees.into_iter()
        .map(|fee| {
            let amt = fee.normalize();
            if amt.is_none() && fee != RawFee::Missing {
                warn!("ignoring non-numeric fee {:?}", fee);
            }
            amt
        })
        .collect()
}

fn sum_fees(fees: &[Option<f64>]) -> f64 {
    fees.iter()
        .flatten()
        .filter(|amt| amt.is_finite())
        .fold(0., |total, amt| total + amt)
}

/// Monthly payment with principal fees amortized over the term and period
/// fees added flat on top.
pub fn compute_amortization_with_fees(terms: &LoanTerms, fees: &FeeSet) -> f64 {
    let financed = LoanTerms {
        loan_amount: terms.loan_amount + fees.principal_total(),
        ..*terms
    };
    let pmt = compute_amortization(&financed) + fees.period_total();
    debug!("{} with fees: monthly payment {}", terms, pmt);
    pmt
}

#[cfg(test)]
mod tests {
    use super::{compute_amortization_with_fees, FeeSet, RawFee};
    use crate::error::AmortizeError;
    use crate::loan::{compute_amortization, LoanTerms};
    use test_log::test;

    #[test]
    fn test_normalize() {
        assert_eq!(RawFee::Number(250.).normalize(), Some(250.));
        assert_eq!(RawFee::from(" 99.5 ").normalize(), Some(99.5));
        assert_eq!(RawFee::from("abc").normalize(), None);
        assert_eq!(RawFee::from("").normalize(), None);
        assert_eq!(RawFee::Number(f64::NAN).normalize(), None);
        assert_eq!(RawFee::Number(f64::INFINITY).normalize(), None);
        assert_eq!(RawFee::from("inf").normalize(), None);
        assert_eq!(RawFee::from(None::<f64>).normalize(), None);
        assert_eq!(RawFee::Missing.normalize(), None);
    }

    #[test]
    fn test_parse_strict() {
        assert_eq!(RawFee::parse_strict("1000"), Ok(1000.));
        assert_eq!(
            RawFee::parse_strict("ten"),
            Err(AmortizeError::InvalidFee {
                input: "ten".to_string()
            })
        );
    }

    #[test]
    fn test_sums_skip_absent_entries() {
        let fees = FeeSet::from_raw(
            vec![RawFee::from(500.), RawFee::from("x"), RawFee::Missing, RawFee::from("250")],
            vec![RawFee::from(Some(15.)), RawFee::from(f64::NAN)],
        );
        assert_eq!(fees.principal_fees, vec![Some(500.), None, None, Some(250.)]);
        assert_eq!(fees.principal_total(), 750.);
        assert_eq!(fees.period_total(), 15.);

        let direct = FeeSet {
            principal_fees: vec![Some(f64::NAN), Some(10.)],
            period_fees: vec![],
        };
        assert_eq!(direct.principal_total(), 10.);
        assert_eq!(direct.period_total(), 0.);
    }

    #[test]
    fn test_empty_sums_are_positive_zero() {
        let fees = FeeSet::default();
        assert!(!fees.principal_total().is_sign_negative());
        assert!(!fees.period_total().is_sign_negative());

        let absent = FeeSet::from_raw(vec![RawFee::Missing], vec![RawFee::from("x")]);
        assert!(!absent.principal_total().is_sign_negative());
        assert!(!absent.period_total().is_sign_negative());
    }

    #[test]
    fn test_principal_fees_are_financed() {
        assert_eq!(
            compute_amortization(&LoanTerms::new(20000., 0.075, 5.)),
            compute_amortization_with_fees(
                &LoanTerms::new(19000., 0.075, 5.),
                &FeeSet::new(vec![1000.], vec![])
            )
        );
        assert_eq!(
            compute_amortization_with_fees(
                &LoanTerms::new(18000., 0.075, 5.),
                &FeeSet::new(vec![1500., 500.], vec![])
            ),
            400.76
        );
    }

    #[test]
    fn test_period_fees_are_added_flat() {
        let terms = LoanTerms::new(20000., 0.075, 5.);
        let pmt = compute_amortization_with_fees(&terms, &FeeSet::new(vec![], vec![25., 5.]));
        assert!((pmt - 430.76).abs() < 1e-9);
    }

    #[test]
    fn test_no_fees_matches_plain_payment() {
        let terms = LoanTerms::new(25000., 0.049, 5.);
        assert_eq!(
            compute_amortization_with_fees(&terms, &FeeSet::default()),
            compute_amortization(&terms)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_loose_fees() {
        let raw: Vec<RawFee> = serde_json::from_str(r#"[100, "50.5", null, "n/a"]"#).unwrap();
        let fees = FeeSet::from_raw(raw, vec![]);
        assert_eq!(fees.principal_total(), 150.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_skips_non_numeric_json() {
        let raw: Vec<RawFee> =
            serde_json::from_str(r#"[true, {"amount": 5}, [1, 2], 20, "7.5"]"#).unwrap();
        assert_eq!(raw.len(), 5);
        let fees = FeeSet::from_raw(vec![], raw);
        assert_eq!(fees.period_fees, vec![None, None, None, Some(20.), Some(7.5)]);
        assert_eq!(fees.period_total(), 27.5);
    }
}
