//! Liquid water properties as closed-form curve fits in degC.
//!
//! Fits are valid between the freezing point and 370 degC; inputs outside that window are clamped.

const T_MIN: f64 = 0.01;
const T_MAX: f64 = 370.0;
/// Reference temperature of the heat capacity fit, degC
const CP_T_REF: f64 = 25.0;
const CP_A: f64 = 4180.0;
const CP_B: f64 = 0.0115;
pub const KELVIN_OFFSET: f64 = 273.15;

fn clamp(temp_c: f64) -> f64 {
    temp_c.clamp(T_MIN, T_MAX)
}

/// Returns density of water in kg/m**3
///
/// # Equations used
/// rho = 991 - 0.03 T - 0.003 T^2, T in degC (floored at 100 kg/m**3 near the upper limit)
pub fn density(temp_c: f64) -> f64 {
    let t = clamp(temp_c);
    (991.0 - 0.03 * t - 0.003 * t * t).max(100.0)
}

/// Returns dynamic viscosity of water in Pa.s (Vogel equation)
///
/// # Equations used
/// mu = 2.414e-5 * 10^(247.8 / (T_K - 140))
pub fn viscosity(temp_c: f64) -> f64 {
    let t_k = clamp(temp_c) + KELVIN_OFFSET;
    2.414e-5 * 10f64.powf(247.8 / (t_k - 140.0))
}

/// Returns isobaric heat capacity of water in J/kg/K
///
/// # Equations used
/// cp = 4180 + 0.0115 (T - 25)^2
pub fn heat_capacity(temp_c: f64) -> f64 {
    let t = clamp(temp_c);
    CP_A + CP_B * (t - CP_T_REF).powi(2)
}

/// Returns specific enthalpy of water in kJ/kg relative to liquid at 0 degC,
/// the closed-form integral of [heat_capacity]
pub fn enthalpy(temp_c: f64) -> f64 {
    let t = clamp(temp_c);
    (CP_A * t + CP_B / 3.0 * ((t - CP_T_REF).powi(3) + CP_T_REF.powi(3))) / 1000.0
}

/// Returns specific entropy of water in kJ/kg/K relative to liquid at 0 degC,
/// the closed-form integral of [heat_capacity] / T
pub fn entropy(temp_c: f64) -> f64 {
    let anti = |t_k: f64| {
        let c = CP_T_REF + KELVIN_OFFSET;
        CP_A * t_k.ln() + CP_B * (t_k * t_k / 2.0 - 2.0 * c * t_k + c * c * t_k.ln())
    };
    (anti(clamp(temp_c) + KELVIN_OFFSET) - anti(KELVIN_OFFSET)) / 1000.0
}

/// Returns saturation pressure of water in kPa (Antoine equation, two ranges)
pub fn vapor_pressure(temp_c: f64) -> f64 {
    let t = clamp(temp_c);
    let (a, b, c) = if t < 100.0 {
        (8.07131, 1730.63, 233.426)
    } else {
        (8.14019, 1810.94, 244.485)
    };
    10f64.powf(a - b / (c + t)) * 0.133_322
}

/// Returns specific exergy (availability) of water at `temp_c` in kJ/kg relative to the dead state
/// at `ambient_c`
///
/// # Equations used
/// B = (h - h0) - T0 (s - s0)
pub fn exergy(temp_c: f64, ambient_c: f64) -> f64 {
    let t0_k = clamp(ambient_c) + KELVIN_OFFSET;
    ((enthalpy(temp_c) - enthalpy(ambient_c)) - t0_k * (entropy(temp_c) - entropy(ambient_c)))
        .max(0.0)
}
