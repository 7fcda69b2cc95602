use super::{OperationTag, OperationType};
use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode, Signed, Zero};
use std::num::NonZeroU64;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of significant digits results are rounded to (decimal128)
pub const PRECISION: u64 = 34;

/// Rounding applied when a result exceeds [`PRECISION`]
pub const ROUNDING: RoundingMode = RoundingMode::HalfEven;

/// Reasons why a calculation can not produce a result
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalculationError {
    /// Divisor was exactly zero
    #[error("Division by zero is not allowed")]
    DivisionByZero,
    /// Operation tag is not supported by this calculator
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

/// Arbitrary precision arithmetic engine
///
/// Every result is rounded to [`PRECISION`] significant digits using [`ROUNDING`] as if it
/// had been computed exactly. The engine is stateless and its cost depends on the number
/// of digits of the operands, not on the magnitude of their exponents.
#[derive(Debug, Clone, Copy)]
pub struct Calculator {
    precision: NonZeroU64,
    rounding: RoundingMode,
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            precision: NonZeroU64::new(PRECISION).unwrap_or(NonZeroU64::MIN),
            rounding: ROUNDING,
        }
    }
}

impl Calculator {
    /// Adds both operands
    pub fn sum(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(self.add(a, b))
    }

    /// Subtracts `b` from `a`
    pub fn subtract(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(self.add(a, &-b))
    }

    /// Multiplies both operands
    pub fn multiply(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(a * b)
    }

    /// Divides `a` by `b`, failing if `b` is zero
    pub fn divide(&self, a: &BigDecimal, b: &BigDecimal) -> Result<BigDecimal, CalculationError> {
        if b.is_zero() {
            warn!(%a, "Division by zero attempted");
            return Err(CalculationError::DivisionByZero);
        }

        Ok(self.round(a / b))
    }

    /// Applies an operation to the operands
    pub fn apply(
        &self,
        operation: OperationType,
        a: &BigDecimal,
        b: &BigDecimal,
    ) -> Result<BigDecimal, CalculationError> {
        let result = match operation {
            OperationType::Sum => self.sum(a, b),
            OperationType::Subtract => self.subtract(a, b),
            OperationType::Multiply => self.multiply(a, b),
            OperationType::Divide => self.divide(a, b)?,
        };

        debug!(%a, %b, %result, "{}", operation);

        Ok(result)
    }

    /// Applies an operation received over the wire, rejecting unknown tags
    pub fn evaluate(
        &self,
        operation: &OperationTag,
        a: &BigDecimal,
        b: &BigDecimal,
    ) -> Result<BigDecimal, CalculationError> {
        match operation {
            OperationTag::Known(operation) => self.apply(*operation, a, b),
            OperationTag::Unknown(tag) => Err(CalculationError::UnsupportedOperation(tag.clone())),
        }
    }

    /// Adds two values, rounding to the same result as the exact sum would.
    ///
    /// Aligning the operands costs as many digits as their exponents are apart. An addend
    /// lying entirely below the digits that can influence the rounded result is therefore
    /// replaced by a single digit of the same sign, which rounds identically.
    fn add(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        if a.is_zero() {
            return b.clone();
        }
        if b.is_zero() {
            return a.clone();
        }

        let (large, small) = if a.order_of_magnitude() >= b.order_of_magnitude() {
            (a, b)
        } else {
            (b, a)
        };

        // Below the lowest digit of `large` and the finest unit the sum may be rounded to
        let precision = self.precision.get() as i64;
        let cutoff = (-large.fractional_digit_count())
            .min(large.order_of_magnitude() - precision)
            - 2;

        if small.order_of_magnitude() >= cutoff {
            return large + small;
        }

        let unit = BigDecimal::new(BigInt::from(1), 1 - cutoff);
        if small.is_negative() {
            large - unit
        } else {
            large + unit
        }
    }

    /// Rounds to the configured precision and strips trailing zeros
    fn round(&self, value: BigDecimal) -> BigDecimal {
        let value = if value.digits() > self.precision.get() {
            value.with_precision_round(self.precision, self.rounding)
        } else {
            value
        };

        value.normalized()
    }
}
