use serde::Serialize;
use tracing::debug;

use super::engine::simulate;
use super::error::{Result, SimulationError};
use super::types::SimulationInputs;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSearchConfig {
    pub target_success_rate: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for RateSearchConfig {
    fn default() -> Self {
        Self {
            target_success_rate: 100.0,
            search_min: 0.0,
            search_max: 10.0,
            tolerance: 0.01,
            max_iterations: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSearchIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_rate: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSearchResult {
    pub target_success_rate: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_rate: Option<f64>,
    pub achieved_success_rate: Option<f64>,
    pub iterations: Vec<RateSearchIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

// Bisection assumes the success rate never increases with the withdrawal rate.
pub fn solve_withdrawal_rate(
    base_inputs: &SimulationInputs,
    config: RateSearchConfig,
) -> Result<RateSearchResult> {
    validate_config(config)?;

    let mut inputs = base_inputs.clone();
    let mut success_rate_at = |rate: f64| -> Result<f64> {
        inputs.withdrawal_rate = rate;
        Ok(simulate(&inputs)?.success_rate)
    };

    let meets_target = |success_rate: f64| success_rate + 1e-12 >= config.target_success_rate;

    let low_rate = success_rate_at(config.search_min)?;
    let high_rate = success_rate_at(config.search_max)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved_rate = None;
    let mut converged = false;
    let feasible;
    let message;

    if !meets_target(low_rate) {
        feasible = false;
        message = "No withdrawal rate within the search bounds meets the target.".to_string();
    } else if meets_target(high_rate) {
        solved_rate = Some(config.search_max);
        converged = true;
        feasible = true;
        message = "Upper bound still meets the target; increase search max.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let success_rate = success_rate_at(mid)?;
            iterations.push(RateSearchIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_rate: mid,
                success_rate,
            });

            if meets_target(success_rate) {
                lo = mid;
            } else {
                hi = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_rate = Some(lo);
        feasible = true;
        message = if converged {
            "Solved highest sustainable withdrawal rate.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    let achieved_success_rate = match solved_rate {
        Some(rate) => Some(success_rate_at(rate)?),
        None => None,
    };

    debug!(
        solved_rate = ?solved_rate,
        iterations = iterations.len(),
        converged,
        feasible,
        "withdrawal rate search finished"
    );

    Ok(RateSearchResult {
        target_success_rate: config.target_success_rate,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_rate,
        achieved_success_rate,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn validate_config(config: RateSearchConfig) -> Result<()> {
    if !(0.0..=100.0).contains(&config.target_success_rate) {
        return Err(SimulationError::invalid_parameter(
            "target success rate must be between 0 and 100",
        ));
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(SimulationError::invalid_parameter("search bounds must be finite"));
    }
    if config.search_min < 0.0 {
        return Err(SimulationError::invalid_parameter("search min must be >= 0"));
    }
    if config.search_max <= config.search_min {
        return Err(SimulationError::invalid_parameter(
            "search max must be greater than search min",
        ));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(SimulationError::invalid_parameter("tolerance must be > 0"));
    }
    if config.max_iterations == 0 {
        return Err(SimulationError::invalid_parameter("max iterations must be > 0"));
    }
    Ok(())
}
