//! Module containing miscellaneous array utility functions.

use crate::imports::*;

/// Hours in one (non-leap) year
pub const HOURS_PER_YEAR: f64 = 8760.0;
/// Seconds in one (non-leap) year
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// Simulation time grid: `lifetime * steps_per_year + 1` points in years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    pub lifetime: usize,
    pub steps_per_year: usize,
}

impl TimeGrid {
    pub fn new(lifetime: usize, steps_per_year: usize) -> anyhow::Result<Self> {
        ensure!(lifetime > 0, "plant lifetime must be positive");
        ensure!(steps_per_year > 0, "time steps per year must be positive");
        Ok(Self {
            lifetime,
            steps_per_year,
        })
    }

    pub fn len(&self) -> usize {
        self.lifetime * self.steps_per_year + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Time of every step in years
    pub fn years(&self) -> Array1<f64> {
        linspace(0.0, self.lifetime as f64, self.len())
    }

    /// Yearly averages of a per-step series
    pub fn annual_average(&self, series: &Array1<f64>) -> anyhow::Result<Array1<f64>> {
        annual_average(series, self.steps_per_year, self.lifetime)
    }
}

/// `n` evenly spaced values from `start` to `stop`, both included
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    Array1::linspace(start, stop, n)
}

/// return max <f64> of arr, NaN if empty
pub fn ndarrmax(arr: &Array1<f64>) -> f64 {
    arr.iter().copied().fold(f64::NAN, f64::max)
}

/// return mean <f64> of arr, NaN if empty
pub fn ndarrmean(arr: &Array1<f64>) -> f64 {
    arr.mean().unwrap_or(f64::NAN)
}

/// return cumsum <f64> of arr
pub fn ndarrcumsum(arr: &Array1<f64>) -> Array1<f64> {
    arr.iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Trapezoidal integral of `y` over `x`
pub fn trapz(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(yw, xw)| 0.5 * (yw[0] + yw[1]) * (xw[1] - xw[0]))
        .sum()
}

/// Collapse a time series sampled `steps_per_year` times per year (plus the closing point)
/// into `years` yearly averages using trapezoidal integration over each year.
pub fn annual_average(
    series: &Array1<f64>,
    steps_per_year: usize,
    years: usize,
) -> anyhow::Result<Array1<f64>> {
    ensure!(steps_per_year > 0, format_dbg!(steps_per_year));
    ensure!(
        series.len() > years * steps_per_year,
        "series of length {} is too short for {} years at {} steps per year",
        series.len(),
        years,
        steps_per_year
    );
    let t = Array1::linspace(0.0, 1.0, steps_per_year + 1).to_vec();
    Ok((0..years)
        .map(|yr| {
            let window = series
                .slice(s![yr * steps_per_year..=(yr + 1) * steps_per_year])
                .to_vec();
            trapz(&window, &t)
        })
        .collect())
}

/// Linear interpolation of `(x_data, y_data)` at `x`. Values outside the data range are
/// clamped to the end values unless `extrapolate` is set.
pub fn interpolate(x: f64, x_data: &[f64], y_data: &[f64], extrapolate: bool) -> anyhow::Result<f64> {
    ensure!(
        x_data.len() == y_data.len(),
        "x and y data lengths differ: {} vs {}",
        x_data.len(),
        y_data.len()
    );
    ensure!(x_data.len() >= 2, "at least two points are needed to interpolate");
    ensure!(
        x_data.windows(2).all(|w| w[0] < w[1]),
        "x data must be strictly increasing"
    );
    let size = x_data.len();
    let i = if x >= x_data[size - 2] {
        size - 2
    } else {
        x_data
            .windows(2)
            .position(|w| x < w[1])
            .unwrap_or(0)
    };
    let (xl, xr) = (x_data[i], x_data[i + 1]);
    let (mut yl, mut yr) = (y_data[i], y_data[i + 1]);
    if !extrapolate {
        if x < xl {
            yr = yl;
        }
        if x > xr {
            yl = yr;
        }
    }
    Ok(yl + (yr - yl) / (xr - xl) * (x - xl))
}

/// Yearly price series: `start` until `escalation_start_year`, then growing by `rate` per year
/// until `end` is reached (or falling, if `rate` is negative).
pub fn escalating_price(
    start: f64,
    end: f64,
    rate: f64,
    escalation_start_year: usize,
    years: usize,
) -> Array1<f64> {
    let mut price = Array1::from_elem(years, start);
    for yr in escalation_start_year.min(years)..years {
        let p = start + rate * (yr + 1 - escalation_start_year) as f64;
        price[yr] = if rate >= 0.0 { p.min(end.max(start)) } else { p.max(end.min(start)) };
    }
    price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_grid() {
        let grid = TimeGrid::new(30, 6).unwrap();
        assert_eq!(grid.len(), 181);
        let years = grid.years();
        assert_eq!(years[0], 0.0);
        assert!(years[180].approx_eq(&30.0, 1e-12));
        assert!(years[6].approx_eq(&1.0, 1e-12));
        assert!(TimeGrid::new(0, 6).is_err());
    }

    #[test]
    fn test_cumsum() {
        assert_eq!(ndarrcumsum(&array![1.0, 2.0, 3.0]), array![1.0, 3.0, 6.0]);
    }

    #[test]
    fn test_annual_average_of_constant_series() {
        let series = Array1::from_elem(2 * 4 + 1, 5.0);
        let annual = annual_average(&series, 4, 2).unwrap();
        assert_eq!(annual.len(), 2);
        assert!(annual.iter().all(|v| v.approx_eq(&5.0, 1e-12)));
    }

    #[test]
    fn test_annual_average_rejects_short_series() {
        assert!(annual_average(&Array1::zeros(4), 4, 1).is_err());
    }

    #[test]
    fn test_interpolate() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 10.0, 30.0];
        assert!(interpolate(0.5, &xs, &ys, false).unwrap().approx_eq(&5.0, 1e-12));
        assert!(interpolate(1.5, &xs, &ys, false).unwrap().approx_eq(&20.0, 1e-12));
        assert!(interpolate(3.0, &xs, &ys, false).unwrap().approx_eq(&30.0, 1e-12));
        assert!(interpolate(3.0, &xs, &ys, true).unwrap().approx_eq(&50.0, 1e-12));
        assert!(interpolate(-1.0, &xs, &ys, false).unwrap().approx_eq(&0.0, 1e-12));
    }

    #[test]
    fn test_escalating_price_caps_at_end_value() {
        let price = escalating_price(0.05, 0.06, 0.004, 2, 6);
        assert!(price[0].approx_eq(&0.05, 1e-12));
        assert!(price[1].approx_eq(&0.05, 1e-12));
        assert!(price[2].approx_eq(&0.054, 1e-12));
        assert!(price[3].approx_eq(&0.058, 1e-12));
        assert!(price[4].approx_eq(&0.06, 1e-12));
        assert!(price[5].approx_eq(&0.06, 1e-12));
    }
}
