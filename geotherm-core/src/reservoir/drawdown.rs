//! Analytical reservoir temperature drawdown models.

use super::Geometry;
use crate::imports::*;
use crate::physics::{erf, laplace};

/// Rock and fluid state shared by every drawdown model
#[derive(Debug, Clone)]
pub struct DrawdownInputs<'a> {
    /// Operating (utilization-weighted) time in years
    pub t_op: &'a Array1<f64>,
    pub rock_temperature: f64,
    pub injection_temperature: f64,
    /// Total produced mass flow, kg/s
    pub total_flow: f64,
    pub water_density: f64,
    pub water_heat_capacity: f64,
    pub rock_density: f64,
    pub rock_heat_capacity: f64,
    pub rock_conductivity: f64,
    /// Fraction 0..1
    pub porosity: f64,
    pub geometry: &'a Geometry,
}

impl DrawdownInputs<'_> {
    fn seconds(&self, t_years: f64) -> f64 {
        t_years * utils::SECONDS_PER_YEAR
    }

    /// Temperature for a dimensionless drawdown `twd` in 0..1
    fn temperature(&self, twd: f64) -> f64 {
        self.rock_temperature - (self.rock_temperature - self.injection_temperature) * twd.clamp(0.0, 1.0)
    }
}

/// Linear decline of `rate` per operating year, floored at the injection temperature
pub fn annual_percentage(inputs: &DrawdownInputs, rate: f64) -> Array1<f64> {
    inputs.t_op.mapv(|t| {
        ((1.0 - rate * t) * inputs.rock_temperature).max(inputs.injection_temperature)
    })
}

/// Single fracture with a mass loading `m_per_area` in kg/s/m**2
///
/// # Equations used
/// T = Tinj + (Trock - Tinj) erf(sqrt(kr rho_r cr / t) / (m cw))
pub fn single_fracture(inputs: &DrawdownInputs, m_per_area: f64) -> Array1<f64> {
    let rock = inputs.rock_conductivity * inputs.rock_density * inputs.rock_heat_capacity;
    inputs.t_op.mapv(|t| {
        let t_s = inputs.seconds(t);
        if t_s <= 0.0 || m_per_area <= 0.0 {
            return inputs.rock_temperature;
        }
        let arg = (rock / t_s).sqrt() / (m_per_area * inputs.water_heat_capacity);
        inputs.injection_temperature
            + (inputs.rock_temperature - inputs.injection_temperature) * erf(arg)
    })
}

/// Multiple parallel fractures after Gringarten, inverted from the Laplace domain
///
/// # Equations used
/// td = (rho_w cw)^2 / (4 kr rho_r cr) (q / (H W))^2 t
/// Twd(s) = exp(-sqrt(s) tanh(xe sqrt(s))) / s, xe: dimensionless half fracture separation
pub fn multiple_parallel_fractures(inputs: &DrawdownInputs) -> Array1<f64> {
    let geometry = inputs.geometry;
    let rho_cw = inputs.water_density * inputs.water_heat_capacity;
    let q = inputs.total_flow / inputs.water_density / geometry.fracture_count.max(1.0);
    let flux = q / (geometry.fracture_height * geometry.fracture_width);
    let td_per_s = rho_cw.powi(2)
        / (4.0 * inputs.rock_conductivity * inputs.rock_density * inputs.rock_heat_capacity)
        * flux.powi(2);
    let xe = rho_cw * flux * geometry.fracture_separation / (4.0 * inputs.rock_conductivity);
    let weights = laplace::stehfest_weights(laplace::STEHFEST_TERMS);
    inputs.t_op.mapv(|t| {
        let td = td_per_s * inputs.seconds(t);
        if td <= 0.0 {
            return inputs.rock_temperature;
        }
        let twd = laplace::stehfest_invert(
            |s| (-s.sqrt() * (xe * s.sqrt()).tanh()).exp() / s,
            td,
            &weights,
        );
        inputs.temperature(twd)
    })
}

/// Linear heat sweep of a porous volume: advective cold front with longitudinal dispersion
///
/// # Equations used
/// td = t / t_sweep, t_sweep = V (rho_r cr (1 - phi) + rho_w cw phi) / (rho_w cw Q)
/// Twd(s) = exp(Pe / 2 (1 - sqrt(1 + 4 s / Pe))) / s, Pe = 2 V^(1/3) / fracture separation
pub fn linear_heat_sweep(inputs: &DrawdownInputs) -> Array1<f64> {
    let geometry = inputs.geometry;
    let rho_cw = inputs.water_density * inputs.water_heat_capacity;
    let bulk = inputs.rock_density * inputs.rock_heat_capacity * (1.0 - inputs.porosity)
        + rho_cw * inputs.porosity;
    let q_vol = inputs.total_flow / inputs.water_density;
    let t_sweep = geometry.volume * bulk / (rho_cw * q_vol);
    let peclet = (2.0 * geometry.volume.cbrt() / geometry.fracture_separation).max(1.0);
    let weights = laplace::stehfest_weights(laplace::STEHFEST_TERMS);
    inputs.t_op.mapv(|t| {
        let td = inputs.seconds(t) / t_sweep;
        if td <= 0.0 || !td.is_finite() {
            return inputs.rock_temperature;
        }
        let twd = laplace::stehfest_invert(
            |s| (peclet / 2.0 * (1.0 - (1.0 + 4.0 * s / peclet).sqrt())).exp() / s,
            td,
            &weights,
        );
        inputs.temperature(twd)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> Geometry {
        Geometry {
            fracture_area: 250_000.0,
            fracture_height: 500.0,
            fracture_width: 500.0,
            fracture_count: 10.0,
            fracture_separation: 50.0,
            volume: 1.25e8,
        }
    }

    fn check_declining(history: &Array1<f64>, trock: f64, tinj: f64) {
        assert!(history[0].approx_eq(&trock, 1e-9));
        assert!(history
            .iter()
            .zip(history.iter().skip(1))
            .all(|(a, b)| *b <= *a + 0.25));
        assert!(history.iter().all(|t| *t >= tinj - 1e-6 && *t <= trock + 1e-6));
    }

    #[test]
    fn test_all_models_start_at_rock_temperature_and_decline() {
        let t_op = utils::linspace(0.0, 27.0, 31);
        let geometry = geometry();
        let inputs = DrawdownInputs {
            t_op: &t_op,
            rock_temperature: 165.0,
            injection_temperature: 70.0,
            total_flow: 100.0,
            water_density: 950.0,
            water_heat_capacity: 4250.0,
            rock_density: 2700.0,
            rock_heat_capacity: 1000.0,
            rock_conductivity: 3.0,
            porosity: 0.04,
            geometry: &geometry,
        };
        for history in [
            annual_percentage(&inputs, 0.005),
            single_fracture(&inputs, 1e-4),
            multiple_parallel_fractures(&inputs),
            linear_heat_sweep(&inputs),
        ] {
            assert_eq!(history.len(), 31);
            check_declining(&history, 165.0, 70.0);
        }
        let last = annual_percentage(&inputs, 0.005)[30];
        assert!(last.approx_eq(&(165.0 * (1.0 - 0.005 * 27.0)), 1e-9));
    }
}
