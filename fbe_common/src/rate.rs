use std::{
    fmt::Display,
    ops::{Add, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------        Rate          ---------------------------------------------------------
/// A freight rate in the platform currency. Rates are strictly positive wherever the engine hands them out;
/// [`Rate::try_from`] is the checked entry point for untrusted values.
#[derive(Debug, Clone, Copy, Default, Type, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Rate(f64);

op!(binary Rate, Add, add);
op!(binary Rate, Sub, sub);
op!(inplace Rate, SubAssign, sub_assign);
op!(unary Rate, Neg, neg);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be used as a freight rate: {0}")]
pub struct RateConversionError(String);

impl From<i64> for Rate {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl TryFrom<f64> for Rate {
    type Error = RateConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            Err(RateConversionError(format!("{value} is not a finite number")))
        } else if value <= 0.0 {
            Err(RateConversionError(format!("{value} is not strictly positive")))
        } else {
            Ok(Self(value))
        }
    }
}

impl Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0.2}", self.0)
    }
}

impl Rate {
    pub fn value(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn checked_conversion() {
        assert!(Rate::try_from(10.0).is_ok());
        assert!(Rate::try_from(0.0).is_err());
        assert!(Rate::try_from(-4.5).is_err());
        assert!(Rate::try_from(f64::NAN).is_err());
        assert!(Rate::try_from(f64::INFINITY).is_err());
    }

    #[test]
    fn display_rounds_to_cents() {
        let rate = Rate::try_from(1234.567).unwrap();
        assert_eq!(rate.to_string(), "1234.57");
    }
}
