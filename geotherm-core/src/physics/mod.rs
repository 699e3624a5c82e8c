//! Opaque property and transport correlations invoked by the sub-models.

pub mod laplace;
pub mod water;

/// Standard gravity, m/s**2
pub const GRAVITY: f64 = 9.807;
/// Atmospheric pressure, kPa
pub const ATMOSPHERIC_PRESSURE: f64 = 101.325;

/// Error function, Abramowitz & Stegun 7.1.26 (absolute error below 1.5e-7)
pub fn erf(x: f64) -> f64 {
    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}

pub fn erfc(x: f64) -> f64 {
    1.0 - erf(x)
}

/// Darcy friction factor, Swamee-Jain explicit fit of Colebrook (laminar below Re 2300)
///
/// # Arguments
/// * `reynolds` - Reynolds number
/// * `roughness` - absolute pipe roughness, m
/// * `diameter` - inner diameter, m
pub fn friction_factor(reynolds: f64, roughness: f64, diameter: f64) -> f64 {
    if reynolds <= 0.0 {
        return 0.0;
    }
    if reynolds < 2300.0 {
        return 64.0 / reynolds;
    }
    0.25 / (roughness / (3.7 * diameter) + 5.74 / reynolds.powf(0.9))
        .log10()
        .powi(2)
}

/// Frictional pressure drop in kPa of water flowing at `mass_flow` kg/s and `temp_c` through a
/// pipe of `length` m and `diameter` m
pub fn pipe_pressure_drop(mass_flow: f64, temp_c: f64, diameter: f64, length: f64) -> f64 {
    let rho = water::density(temp_c);
    let area = std::f64::consts::PI * diameter * diameter / 4.0;
    let velocity = mass_flow / rho / area;
    let reynolds = rho * velocity * diameter / water::viscosity(temp_c);
    let f = friction_factor(reynolds, 1.0e-4, diameter);
    f * rho * velocity * velocity / (2.0 * diameter) * length / 1000.0
}
