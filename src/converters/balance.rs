use primitive_types::U256;

use crate::models::errors::ConfigError;

const NUM_DECIMALS_IN_FLOAT_BALANCE: i32 = 10;
const NUM_DECIMALS_IN_FLOAT_BALANCE_MECT: i32 = 18;

/// Converts raw chain balances into display floats, dividing by the chain
/// denomination and rounding to a fixed precision.
#[derive(Debug, Clone)]
pub struct BalanceConverter {
    divider_for_denomination: f64,
    balance_precision: f64,
    balance_precision_mect: f64,
}

impl BalanceConverter {
    pub fn new(denomination: i32) -> Result<Self, ConfigError> {
        if denomination < 0 {
            return Err(ConfigError::NegativeDenomination { denomination });
        }

        Ok(Self {
            balance_precision: 10f64.powi(NUM_DECIMALS_IN_FLOAT_BALANCE),
            balance_precision_mect: 10f64.powi(NUM_DECIMALS_IN_FLOAT_BALANCE_MECT),
            divider_for_denomination: 10f64.powi(denomination),
        })
    }

    pub fn compute_balance_as_float(&self, balance: U256) -> f64 {
        self.compute(balance, self.balance_precision)
    }

    pub fn compute_mect_balance_as_float(&self, balance: U256) -> f64 {
        self.compute(balance, self.balance_precision_mect)
    }

    fn compute(&self, balance: U256, precision: f64) -> f64 {
        if balance.is_zero() {
            return 0.0;
        }

        let balance_float = u256_to_f64(balance) / self.divider_for_denomination;
        let rounded = (balance_float * precision).round() / precision;

        rounded.max(0.0)
    }
}

fn u256_to_f64(value: U256) -> f64 {
    value
        .0
        .iter()
        .enumerate()
        .fold(0.0, |acc, (i, limb)| acc + (*limb as f64) * 2f64.powi(64 * i as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_denomination_is_rejected() {
        assert!(BalanceConverter::new(-1).is_err());
    }

    #[test]
    fn stake_units_to_float() {
        let converter = BalanceConverter::new(10).unwrap();
        assert_eq!(
            converter.compute_balance_as_float(U256::from(1_000_000_000u64)),
            0.1
        );
        assert_eq!(converter.compute_balance_as_float(U256::zero()), 0.0);
    }

    #[test]
    fn mect_precision_keeps_small_amounts() {
        let converter = BalanceConverter::new(0).unwrap();
        assert_eq!(
            converter.compute_mect_balance_as_float(U256::from(1u64)),
            1.0
        );
    }
}
