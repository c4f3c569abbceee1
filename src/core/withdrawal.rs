// Fixed at the start of a trial, then compounded by every month's inflation factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Withdrawal {
    annual: f64,
}

impl Withdrawal {
    pub fn new(start_value: f64, rate_percent: f64) -> Self {
        Self {
            annual: start_value * rate_percent / 100.0,
        }
    }

    pub fn adjust_for_inflation(&mut self, factor: f64) {
        self.annual *= factor;
    }

    pub fn withdraw_monthly(&self, values: &mut [f64]) {
        withdraw_pro_rata(values, self.annual / 12.0);
    }

    pub fn withdraw_yearly(&self, values: &mut [f64]) {
        withdraw_pro_rata(values, self.annual);
    }
}

pub fn withdraw_pro_rata(values: &mut [f64], amount: f64) {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return;
    }

    for value in values.iter_mut() {
        *value = (*value - (*value / total) * amount).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn nominal_amount_is_rate_of_start_value() {
        let withdrawal = Withdrawal::new(1000.0, 4.0);
        let mut values = vec![1000.0];
        withdrawal.withdraw_yearly(&mut values);
        assert_approx(values[0], 960.0);
    }

    #[test]
    fn inflation_compounds_and_never_resets() {
        let mut withdrawal = Withdrawal::new(1000.0, 4.0);
        for _ in 0..24 {
            withdrawal.adjust_for_inflation(1.01);
        }
        let mut values = vec![10_000.0];
        withdrawal.withdraw_yearly(&mut values);
        assert_approx(values[0], 10_000.0 - 40.0 * 1.01_f64.powi(24));
    }

    #[test]
    fn monthly_withdrawal_takes_a_twelfth_pro_rata() {
        let withdrawal = Withdrawal::new(1000.0, 12.0);
        let mut values = vec![750.0, 250.0];
        withdrawal.withdraw_monthly(&mut values);
        assert_approx(values[0], 750.0 - 7.5);
        assert_approx(values[1], 250.0 - 2.5);
    }

    #[test]
    fn yearly_withdrawal_takes_full_amount_pro_rata() {
        let withdrawal = Withdrawal::new(1000.0, 10.0);
        let mut values = vec![500.0, 500.0];
        withdrawal.withdraw_yearly(&mut values);
        assert_approx(values[0], 450.0);
        assert_approx(values[1], 450.0);
    }

    #[test]
    fn withdrawal_larger_than_portfolio_floors_at_zero() {
        let mut values = vec![10.0, 0.0];
        withdraw_pro_rata(&mut values, 100.0);
        assert_eq!(values, vec![0.0, 0.0]);

        withdraw_pro_rata(&mut values, 100.0);
        assert_eq!(values, vec![0.0, 0.0]);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_withdrawal_never_leaves_negative_holdings(
            a in 0.0f64..10_000.0,
            b in 0.0f64..10_000.0,
            c in 0.0f64..10_000.0,
            amount in 0.0f64..50_000.0
        ) {
            let mut values = vec![a, b, c];
            let before: f64 = values.iter().sum();
            withdraw_pro_rata(&mut values, amount);
            let after: f64 = values.iter().sum();

            for value in &values {
                prop_assert!(*value >= 0.0);
            }
            prop_assert!(after <= before + 1e-9);
        }
    }
}
