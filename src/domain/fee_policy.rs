//! Flash-loan fee policy.

use serde::Serialize;

use crate::error::GatewayError;

/// Denominator of a basis-point rate (1 bp = 1 / 10 000).
pub const BASIS_POINTS_DENOMINATOR: u128 = 10_000;

/// Default flash-loan fee: 9 basis points (0.09%).
pub const DEFAULT_FLASH_FEE_BPS: u32 = 9;

/// Computes the fee owed on a borrowed amount.
///
/// The fee is `floor(amount * bps / 10_000)`. Rounding is always down, so
/// amounts below `10_000 / bps` carry no fee at all; the remainder is left
/// with the borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeePolicy {
    bps: u32,
}

impl FeePolicy {
    /// Creates a policy charging `bps` basis points.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if `bps` exceeds 10 000
    /// (a fee larger than the principal).
    pub fn new(bps: u32) -> Result<Self, GatewayError> {
        if u128::from(bps) > BASIS_POINTS_DENOMINATOR {
            return Err(GatewayError::InvalidRequest(format!(
                "fee rate {bps} bps exceeds {BASIS_POINTS_DENOMINATOR}"
            )));
        }
        Ok(Self { bps })
    }

    /// Returns the fee rate in basis points.
    #[must_use]
    pub const fn bps(&self) -> u32 {
        self.bps
    }

    /// Returns the fee for borrowing `amount`.
    ///
    /// Splits `amount` into whole multiples of the denominator and a
    /// remainder so the product never leaves `u128`.
    #[must_use]
    pub const fn compute_fee(&self, amount: u128) -> u128 {
        let bps = self.bps as u128;
        let whole = amount / BASIS_POINTS_DENOMINATOR;
        let rest = amount % BASIS_POINTS_DENOMINATOR;
        whole * bps + rest * bps / BASIS_POINTS_DENOMINATOR
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            bps: DEFAULT_FLASH_FEE_BPS,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_is_nine_bps() {
        assert_eq!(FeePolicy::default().bps(), 9);
    }

    #[test]
    fn zero_amount_has_zero_fee() {
        assert_eq!(FeePolicy::default().compute_fee(0), 0);
    }

    #[test]
    fn small_amounts_floor_to_zero() {
        let policy = FeePolicy::default();
        assert_eq!(policy.compute_fee(1_000), 0);
        assert_eq!(policy.compute_fee(1_111), 0);
        assert_eq!(policy.compute_fee(1_112), 1);
    }

    #[test]
    fn matches_floor_of_product() {
        let policy = FeePolicy::default();
        for amount in [1_u128, 9_999, 10_000, 123_456, 1_000_000, 1_000_000_000_000_000_000_000] {
            assert_eq!(policy.compute_fee(amount), amount * 9 / 10_000);
        }
    }

    #[test]
    fn does_not_overflow_at_max() {
        let policy = FeePolicy::default();
        let fee = policy.compute_fee(u128::MAX);
        assert!(fee < u128::MAX / 1_000);
        assert!(fee > 0);
    }

    #[test]
    fn monotonic_non_decreasing() {
        let policy = FeePolicy::default();
        let mut previous = 0;
        for amount in (0..50_000_u128).step_by(7) {
            let fee = policy.compute_fee(amount);
            assert!(fee >= previous, "fee decreased at {amount}");
            previous = fee;
        }
    }

    #[test]
    fn rejects_rate_above_denominator() {
        assert!(FeePolicy::new(10_001).is_err());
        assert!(FeePolicy::new(10_000).is_ok());
    }

    #[test]
    fn full_rate_charges_principal() {
        let Ok(policy) = FeePolicy::new(10_000) else {
            panic!("valid rate");
        };
        assert_eq!(policy.compute_fee(u128::MAX), u128::MAX);
    }
}
