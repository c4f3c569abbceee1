use super::types::Results;

impl Results {
    pub fn from_terminal_values(mut terminal_values: Vec<f64>) -> Self {
        if terminal_values.is_empty() {
            return Self::default();
        }

        let successes = terminal_values.iter().filter(|&&value| value > 0.0).count() as u64;
        let failures = terminal_values.len() as u64 - successes;

        terminal_values.sort_by(|a, b| a.total_cmp(b));
        let n = terminal_values.len();

        Self {
            successes,
            failures,
            success_rate: 100.0 * (successes as f64 / (successes + failures) as f64),
            tv_median: percentile(&terminal_values, 50.0),
            tv_minimum: terminal_values[0],
            tv_maximum: terminal_values[n - 1],
            tv_average: terminal_values.iter().sum::<f64>() / n as f64,
        }
    }
}

pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        sorted[lower] * (1.0 - w) + sorted[upper] * w
    }
}
