mod counter;
mod cursor;
mod engine;
mod error;
mod rebalance;
mod results;
pub mod solver;
mod types;
mod withdrawal;

pub use counter::{SIMULATIONS, SimulationCounter, simulations_ran};
pub use cursor::{SeriesCursor, next_month, validate_series};
pub use engine::{START_VALUE, simulate, simulate_with_report, trial_windows};
pub use error::{Result, SimulationError};
pub use rebalance::{
    MONTHLY_REBALANCING_COST, THRESHOLD_REBALANCING_COST, YEARLY_REBALANCING_COST, drift_exceeds,
};
pub use results::percentile;
pub use types::{
    Allocation, DataPoint, ParseRebalancingError, Rebalancing, Results, SimulationInputs,
    SimulationReport, TrialWindow,
};
pub use withdrawal::{Withdrawal, withdraw_pro_rata};
