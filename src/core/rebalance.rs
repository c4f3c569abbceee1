use super::types::{Allocation, Rebalancing};

// Trading costs per rebalancing event, in percent of each holding.
pub const MONTHLY_REBALANCING_COST: f64 = 0.005;
pub const YEARLY_REBALANCING_COST: f64 = 0.01;
pub const THRESHOLD_REBALANCING_COST: f64 = 0.01;

impl Rebalancing {
    pub fn cost_percent(self) -> f64 {
        match self {
            Rebalancing::None => 0.0,
            Rebalancing::Monthly => MONTHLY_REBALANCING_COST,
            Rebalancing::Yearly => YEARLY_REBALANCING_COST,
            Rebalancing::Threshold => THRESHOLD_REBALANCING_COST,
        }
    }

    // Both steps return whether a fee was paid.
    pub fn apply_monthly(
        self,
        values: &mut [f64],
        portfolio: &[Allocation],
        threshold: f64,
    ) -> bool {
        let due = match self {
            Rebalancing::Monthly => true,
            Rebalancing::Threshold => drift_exceeds(values, portfolio, threshold),
            Rebalancing::None | Rebalancing::Yearly => false,
        };
        if due {
            pay_fees_and_realign(values, portfolio, self.cost_percent());
        }
        due
    }

    pub fn apply_yearly(self, values: &mut [f64], portfolio: &[Allocation]) -> bool {
        if self != Rebalancing::Yearly {
            return false;
        }
        pay_fees_and_realign(values, portfolio, self.cost_percent());
        true
    }
}

// An exhausted portfolio never drifts.
pub fn drift_exceeds(values: &[f64], portfolio: &[Allocation], threshold: f64) -> bool {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return false;
    }

    values
        .iter()
        .zip(portfolio)
        .any(|(value, alloc)| (alloc.weight() - value / total).abs() >= threshold)
}

fn pay_fees_and_realign(values: &mut [f64], portfolio: &[Allocation], cost_percent: f64) {
    let keep = 1.0 - cost_percent / 100.0;
    for value in values.iter_mut() {
        *value *= keep;
    }

    let total: f64 = values.iter().sum();
    for (value, alloc) in values.iter_mut().zip(portfolio) {
        *value = total * alloc.weight();
    }
}
