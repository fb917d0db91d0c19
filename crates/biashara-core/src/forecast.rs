//! Revenue trend forecasting
//!
//! Fits an ordinary least-squares line through the income history and labels
//! the direction of the slope.

use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Revenue direction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Forecast {
    /// Fewer than two income observations
    InsufficientData,
    Growing,
    /// Flat or declining
    Stable,
}

impl Forecast {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InsufficientData => "Insufficient data.",
            Self::Growing => "Revenue Trend: Growing",
            Self::Stable => "Revenue Trend: Stable",
        }
    }
}

impl std::fmt::Display for Forecast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Slope of the least-squares line through `points`
///
/// Returns 0.0 when there are fewer than two points or x has no variance.
pub fn linear_slope(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (covariance, variance) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
        let dx = x - mean_x;
        (cov + dx * (y - mean_y), var + dx * dx)
    });

    if variance == 0.0 {
        0.0
    } else {
        covariance / variance
    }
}

/// Forecast from income amounts in chronological (oldest first) order
pub fn forecast(chronological_income: &[f64]) -> Forecast {
    if chronological_income.len() < 2 {
        return Forecast::InsufficientData;
    }

    let points: Vec<(f64, f64)> = chronological_income
        .iter()
        .enumerate()
        .map(|(i, amount)| ((i + 1) as f64, *amount))
        .collect();

    if linear_slope(&points) > 0.0 {
        Forecast::Growing
    } else {
        Forecast::Stable
    }
}

/// Forecast from a newest-first transaction list
///
/// Income amounts are reversed into chronological order before fitting.
pub fn forecast_income(newest_first: &[Transaction]) -> Forecast {
    let chronological: Vec<f64> = newest_first
        .iter()
        .rev()
        .filter(|tx| tx.direction.is_income())
        .map(|tx| tx.amount)
        .collect();

    forecast(&chronological)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Direction};
    use chrono::{TimeZone, Utc};

    fn income(day: u32, amount: f64) -> Transaction {
        Transaction {
            id: None,
            date: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
            amount,
            direction: Direction::Income,
            description: "M-PESA receipt".to_string(),
            category: Category::BusinessInventory,
        }
    }

    #[test]
    fn test_single_observation_is_insufficient() {
        assert_eq!(forecast(&[1000.0]), Forecast::InsufficientData);
        assert_eq!(forecast(&[]), Forecast::InsufficientData);
        assert_eq!(Forecast::InsufficientData.message(), "Insufficient data.");
    }

    #[test]
    fn test_ascending_income_is_growing() {
        let result = forecast(&[1000.0, 2000.0, 3000.0]);
        assert_eq!(result, Forecast::Growing);
        assert_eq!(result.message(), "Revenue Trend: Growing");
    }

    #[test]
    fn test_descending_income_is_stable() {
        let result = forecast(&[3000.0, 2000.0, 1000.0]);
        assert_eq!(result, Forecast::Stable);
        assert_eq!(result.message(), "Revenue Trend: Stable");
    }

    #[test]
    fn test_flat_income_is_stable() {
        assert_eq!(forecast(&[500.0, 500.0, 500.0]), Forecast::Stable);
    }

    #[test]
    fn test_linear_slope() {
        let slope = linear_slope(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]);
        assert!((slope - 2.0).abs() < 1e-9);
        assert_eq!(linear_slope(&[(1.0, 5.0), (1.0, 7.0)]), 0.0);
    }

    #[test]
    fn test_newest_first_history_is_reversed_before_fitting() {
        // Newest first: 3000 (day 3), 2000 (day 2), 1000 (day 1) => growing
        let newest_first = vec![income(3, 3000.0), income(2, 2000.0), income(1, 1000.0)];
        assert_eq!(forecast_income(&newest_first), Forecast::Growing);
    }

    #[test]
    fn test_expenses_are_ignored() {
        let mut expense = income(2, 99_999.0);
        expense.direction = Direction::Expense;
        let newest_first = vec![income(3, 100.0), expense, income(1, 200.0)];
        assert_eq!(forecast_income(&newest_first), Forecast::Stable);
    }
}
