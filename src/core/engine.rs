use tracing::{debug, trace};

use super::counter::SIMULATIONS;
use super::cursor::{SeriesCursor, next_month, validate_series};
use super::error::{Result, SimulationError};
use super::types::{Rebalancing, Results, SimulationInputs, SimulationReport, TrialWindow};
use super::withdrawal::Withdrawal;

pub const START_VALUE: f64 = 1000.0;

const INFLATION_SERIES: &str = "inflation";

#[derive(Debug, Clone, Copy)]
struct TrialOutcome {
    terminal_value: f64,
    rebalance_events: u64,
}

pub fn simulate(inputs: &SimulationInputs) -> Result<Results> {
    simulate_with_report(inputs).map(|report| report.results)
}

pub fn simulate_with_report(inputs: &SimulationInputs) -> Result<SimulationReport> {
    validate_inputs(inputs)?;

    let windows = trial_windows(inputs.start_year, inputs.end_year, inputs.years);
    let mut terminal_values = Vec::with_capacity(windows.len());
    let mut rebalance_events = 0_u64;

    for window in &windows {
        let outcome = run_trial(inputs, *window, |_| {})?;
        rebalance_events += outcome.rebalance_events;
        terminal_values.push(outcome.terminal_value);
    }

    let trials = terminal_values.len() as u64;
    let results = Results::from_terminal_values(terminal_values);
    let total = SIMULATIONS.record(trials);

    debug!(
        years = inputs.years,
        withdrawal_rate = inputs.withdrawal_rate,
        rebalancing = %inputs.rebalancing,
        trials,
        success_rate = results.success_rate,
        simulations_ran = total,
        "simulation finished"
    );

    Ok(SimulationReport {
        results,
        trials,
        rebalance_events,
    })
}

// One window per start month, January of `start_year` through December of `end_year - years`.
pub fn trial_windows(start_year: u32, end_year: u32, years: u32) -> Vec<TrialWindow> {
    let Some(last_start_year) = end_year.checked_sub(years) else {
        return Vec::new();
    };

    (start_year..=last_start_year)
        .flat_map(|year| (1..=12).map(move |month| TrialWindow::new(year, month, years)))
        .collect()
}

// `inspect` sees the holdings after every step of the month.
fn run_trial(
    inputs: &SimulationInputs,
    window: TrialWindow,
    mut inspect: impl FnMut(&[f64]),
) -> Result<TrialOutcome> {
    trace!(
        start_year = window.start_year,
        start_month = window.start_month,
        end_year = window.end_year,
        end_month = window.end_month,
        "replaying window"
    );

    let portfolio = &inputs.portfolio;
    let mut values: Vec<f64> = portfolio
        .iter()
        .map(|alloc| START_VALUE * alloc.weight())
        .collect();

    // The first applied factor is the one of the month after the start month.
    let (first_year, first_month) = next_month(window.start_year, window.start_month);
    let mut returns = portfolio
        .iter()
        .zip(&inputs.asset_returns)
        .map(|(alloc, series)| SeriesCursor::at(&alloc.asset, series, first_year, first_month))
        .collect::<Result<Vec<_>>>()?;
    let mut inflation =
        SeriesCursor::at(INFLATION_SERIES, &inputs.inflation, first_year, first_month)?;

    let mut withdrawal = Withdrawal::new(START_VALUE, inputs.withdrawal_rate);
    let mut rebalance_events = 0_u64;

    for month in 1..=window.months() {
        for (value, cursor) in values.iter_mut().zip(returns.iter_mut()) {
            *value *= cursor.advance()?;
        }
        inspect(&values);

        if inputs
            .rebalancing
            .apply_monthly(&mut values, portfolio, inputs.threshold)
        {
            rebalance_events += 1;
        }
        inspect(&values);

        withdrawal.adjust_for_inflation(inflation.advance()?);

        if inputs.monthly_withdrawal {
            withdrawal.withdraw_monthly(&mut values);
        }
        inspect(&values);

        // A trial year ends after every twelfth month, whatever the calendar month.
        if month % 12 == 0 {
            if inputs.rebalancing.apply_yearly(&mut values, portfolio) {
                rebalance_events += 1;
            }

            if !inputs.monthly_withdrawal {
                withdrawal.withdraw_yearly(&mut values);
            }
            inspect(&values);
        }
    }

    Ok(TrialOutcome {
        terminal_value: values.iter().sum(),
        rebalance_events,
    })
}

fn validate_inputs(inputs: &SimulationInputs) -> Result<()> {
    if inputs.portfolio.is_empty() {
        return Err(SimulationError::EmptyPortfolio);
    }
    if inputs.asset_returns.len() != inputs.portfolio.len() {
        return Err(SimulationError::SeriesLengthMismatch {
            expected: inputs.portfolio.len(),
            actual: inputs.asset_returns.len(),
        });
    }
    if inputs.years == 0 {
        return Err(SimulationError::InvalidHorizon {
            years: inputs.years,
        });
    }
    let fits = inputs
        .start_year
        .checked_add(inputs.years)
        .is_some_and(|needed| inputs.end_year >= needed);
    if !fits {
        return Err(SimulationError::InvalidRange {
            start_year: inputs.start_year,
            end_year: inputs.end_year,
            years: inputs.years,
        });
    }
    if !inputs.withdrawal_rate.is_finite() || inputs.withdrawal_rate < 0.0 {
        return Err(SimulationError::invalid_parameter(format!(
            "withdrawal rate must be a non-negative number, got {}",
            inputs.withdrawal_rate
        )));
    }
    if inputs.rebalancing == Rebalancing::Threshold
        && (!inputs.threshold.is_finite() || inputs.threshold < 0.0)
    {
        return Err(SimulationError::invalid_parameter(format!(
            "threshold must be a non-negative fraction, got {}",
            inputs.threshold
        )));
    }
    if let Some(alloc) = inputs
        .portfolio
        .iter()
        .find(|a| !a.allocation.is_finite() || a.allocation < 0.0)
    {
        return Err(SimulationError::invalid_parameter(format!(
            "allocation of '{}' must be a non-negative number, got {}",
            alloc.asset, alloc.allocation
        )));
    }
    if inputs.portfolio.iter().map(|a| a.allocation).sum::<f64>() <= 0.0 {
        return Err(SimulationError::ZeroPortfolioValue);
    }

    // Contiguous series that hold both ends of the read range hold everything in between.
    let (first_year, first_month) = next_month(inputs.start_year, 1);
    let series = std::iter::once((INFLATION_SERIES, &inputs.inflation)).chain(
        inputs
            .portfolio
            .iter()
            .map(|alloc| alloc.asset.as_str())
            .zip(&inputs.asset_returns),
    );
    for (name, points) in series {
        validate_series(name, points)?;
        SeriesCursor::at(name, points, first_year, first_month)?;
        SeriesCursor::at(name, points, inputs.end_year, 12)?;
    }

    Ok(())
}
