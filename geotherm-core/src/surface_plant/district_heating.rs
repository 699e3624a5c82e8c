//! District heating demand and geothermal/peaking-boiler supply split.

use crate::imports::*;

const DAYS_PER_YEAR: usize = 365;
/// Heating degree day base temperature, degC
const HDD_BASE: f64 = 18.0;
/// Half the swing between the warmest and coldest day, degC
const AMBIENT_AMPLITUDE: f64 = 12.0;
/// Day of the year with the lowest ambient temperature
const COLDEST_DAY: f64 = 15.0;
/// Share of the annual demand spread evenly over the year (domestic hot water)
const BASE_LOAD_FRACTION: f64 = 0.2;

/// Daily average heating demand in kW over one year
///
/// # Equations used
/// T_d = T_amb - A cos(2 pi (d - d_cold) / 365)\
/// HDD_d = max(0, 18 - T_d)\
/// Q_d = Q_year (0.2 / 365 + 0.8 HDD_d / sum(HDD)) / 24
///
/// # Arguments
/// - `annual_demand`: kWh/yr
/// - `ambient_temperature`: annual mean, degC
pub fn daily_demand(annual_demand: f64, ambient_temperature: f64) -> Array1<f64> {
    let hdd: Array1<f64> = (0..DAYS_PER_YEAR)
        .map(|d| {
            let phase = 2.0 * std::f64::consts::PI * (d as f64 - COLDEST_DAY) / DAYS_PER_YEAR as f64;
            (HDD_BASE - (ambient_temperature - AMBIENT_AMPLITUDE * phase.cos())).max(0.0)
        })
        .collect();
    let total_hdd = hdd.sum();
    if total_hdd <= 0.0 {
        log::warn!(
            "no heating degree days at a mean ambient temperature of {ambient_temperature:.1} degC"
        );
        return Array1::from_elem(DAYS_PER_YEAR, annual_demand / DAYS_PER_YEAR as f64 / 24.0);
    }
    hdd.mapv(|h| {
        annual_demand
            * (BASE_LOAD_FRACTION / DAYS_PER_YEAR as f64 + (1.0 - BASE_LOAD_FRACTION) * h / total_hdd)
            / 24.0
    })
}

/// Geothermal heat supplied in a year with `capacity` kW available, kWh/yr
pub fn geothermal_supply(daily_demand: &Array1<f64>, capacity: f64) -> f64 {
    daily_demand.iter().map(|q| q.min(capacity) * 24.0).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_demand_sums_to_annual_demand() {
        let daily = daily_demand(1.0e8, 10.0);
        assert_eq!(daily.len(), 365);
        assert!((daily.sum() * 24.0).approx_eq(&1.0e8, 1e-9));
        // coldest in January, warmest in July
        assert!(daily[15] > daily[197]);
    }

    #[test]
    fn test_warm_climate_falls_back_to_flat_demand() {
        let daily = daily_demand(3.65e6 * 24.0, 40.0);
        assert!(daily.iter().all(|q| q.approx_eq(&10_000.0, 1e-9)));
    }

    #[test]
    fn test_supply_is_capped_by_capacity() {
        let daily = daily_demand(1.0e8, 10.0);
        let unlimited = geothermal_supply(&daily, f64::INFINITY);
        assert!(unlimited.approx_eq(&1.0e8, 1e-9));
        let limited = geothermal_supply(&daily, 5_000.0);
        assert!(limited < unlimited);
        assert!(limited <= 5_000.0 * 8760.0);
    }
}
