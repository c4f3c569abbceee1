use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub asset: String,
    pub allocation: f64,
}

impl Allocation {
    pub fn new(asset: impl Into<String>, allocation: f64) -> Self {
        Self {
            asset: asset.into(),
            allocation,
        }
    }

    pub fn weight(&self) -> f64 {
        self.allocation / 100.0
    }
}

// Monthly multiplicative factor, 1.02 = +2%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub year: u32,
    pub month: u32,
    pub value: f64,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rebalancing {
    #[default]
    None,
    Monthly,
    Yearly,
    Threshold,
}

impl Rebalancing {
    pub fn as_str(self) -> &'static str {
        match self {
            Rebalancing::None => "none",
            Rebalancing::Monthly => "monthly",
            Rebalancing::Yearly => "yearly",
            Rebalancing::Threshold => "threshold",
        }
    }
}

impl fmt::Display for Rebalancing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rebalancing '{0}', expected one of none, monthly, yearly, threshold")]
pub struct ParseRebalancingError(pub String);

impl FromStr for Rebalancing {
    type Err = ParseRebalancingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Rebalancing::None),
            "monthly" => Ok(Rebalancing::Monthly),
            "yearly" => Ok(Rebalancing::Yearly),
            "threshold" => Ok(Rebalancing::Threshold),
            other => Err(ParseRebalancingError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationInputs {
    pub portfolio: Vec<Allocation>,
    pub inflation: Vec<DataPoint>,
    pub asset_returns: Vec<Vec<DataPoint>>,
    pub years: u32,
    pub withdrawal_rate: f64,
    pub start_year: u32,
    pub end_year: u32,
    pub monthly_withdrawal: bool,
    pub rebalancing: Rebalancing,
    // Weight fraction, 0.01 = one percentage point of drift.
    pub threshold: f64,
}

// Both ends inclusive.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialWindow {
    pub start_year: u32,
    pub start_month: u32,
    pub end_year: u32,
    pub end_month: u32,
}

impl TrialWindow {
    pub fn new(start_year: u32, start_month: u32, years: u32) -> Self {
        let months = years * 12;
        let offset = start_month - 1 + months - 1;
        Self {
            start_year,
            start_month,
            end_year: start_year + offset / 12,
            end_month: 1 + offset % 12,
        }
    }

    pub fn months(&self) -> u32 {
        (self.end_year - self.start_year) * 12 + self.end_month + 1 - self.start_month
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub successes: u64,
    pub failures: u64,
    pub success_rate: f64,
    pub tv_median: f64,
    pub tv_minimum: f64,
    pub tv_maximum: f64,
    pub tv_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub results: Results,
    pub trials: u64,
    pub rebalance_events: u64,
}
