use super::error::{Result, SimulationError};
use super::types::DataPoint;

#[derive(Debug, Clone)]
pub struct SeriesCursor<'a> {
    name: &'a str,
    points: &'a [DataPoint],
    index: usize,
}

impl<'a> SeriesCursor<'a> {
    // Index is derived from the first point, then checked against the stored date.
    pub fn at(name: &'a str, points: &'a [DataPoint], year: u32, month: u32) -> Result<Self> {
        let missing = || SimulationError::insufficient_data(name, year, month);
        let first = points.first().ok_or_else(missing)?;
        let offset = month_ordinal(year, month) - month_ordinal(first.year, first.month);
        let index = usize::try_from(offset).map_err(|_| missing())?;

        match points.get(index) {
            Some(point) if point.year == year && point.month == month => Ok(Self {
                name,
                points,
                index,
            }),
            _ => Err(missing()),
        }
    }

    pub fn advance(&mut self) -> Result<f64> {
        match self.points.get(self.index) {
            Some(point) => {
                self.index += 1;
                Ok(point.value)
            }
            None => {
                let (year, month) = self
                    .points
                    .last()
                    .map(|last| next_month(last.year, last.month))
                    .unwrap_or((0, 0));
                Err(SimulationError::insufficient_data(self.name, year, month))
            }
        }
    }
}

pub fn next_month(year: u32, month: u32) -> (u32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn month_ordinal(year: u32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

pub fn validate_series(name: &str, points: &[DataPoint]) -> Result<()> {
    let gap = |index| SimulationError::NonContiguousSeries {
        series: name.to_string(),
        index,
    };

    for (index, point) in points.iter().enumerate() {
        if !(1..=12).contains(&point.month) {
            return Err(gap(index));
        }
        if !point.value.is_finite() || point.value < 0.0 {
            return Err(SimulationError::invalid_parameter(format!(
                "series '{name}' has an invalid factor {} at {}-{:02}",
                point.value, point.year, point.month
            )));
        }
        if index > 0 {
            let prev = points[index - 1];
            if next_month(prev.year, prev.month) != (point.year, point.month) {
                return Err(gap(index));
            }
        }
    }
    Ok(())
}
