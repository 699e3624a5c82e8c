//! Closed-loop (advanced geothermal system) lateral heat exchange.

use crate::imports::*;

/// Closed-loop configuration, selected by `Closed-loop Configuration`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopConfiguration {
    #[default]
    ULoop,
    Coaxial,
}

impl LoopConfiguration {
    pub fn from_code(code: i64) -> anyhow::Result<Self> {
        match code {
            1 => Ok(Self::ULoop),
            2 => Ok(Self::Coaxial),
            _ => bail!("unknown closed-loop configuration {code}"),
        }
    }

    /// Heat transfer reduction relative to a U-loop, from the inner pipe short-circuiting
    pub fn transfer_factor(&self) -> f64 {
        match self {
            Self::ULoop => 1.0,
            Self::Coaxial => 0.8,
        }
    }
}

/// Conduction-limited heat exchange along the laterals of one loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lateral {
    pub configuration: LoopConfiguration,
    /// m
    pub radius: f64,
    /// Total nonvertical length per loop, m
    pub length: f64,
    /// W/m/K
    pub rock_conductivity: f64,
    /// m**2/s
    pub rock_diffusivity: f64,
    /// Multiplier on the conductance, 1 for no wellbore resistance penalty
    pub resistance_factor: f64,
}

impl Lateral {
    /// Outlet temperature after `t_s` seconds of operation
    ///
    /// # Equations used
    /// T_out = T_rock - (T_rock - T_in) exp(-G L / (m cw)),
    /// G = 2 pi kr / ln(sqrt(4 alpha t) / r)
    pub fn outlet_temperature(
        &self,
        rock_temperature: f64,
        inlet_temperature: f64,
        mass_flow: f64,
        heat_capacity: f64,
        t_s: f64,
    ) -> f64 {
        let t_s = t_s.max(86_400.0);
        let penetration = (4.0 * self.rock_diffusivity * t_s).sqrt();
        // log argument floored so very early times keep a finite conductance
        let ln_term = (penetration / self.radius).max(1.5).ln();
        let conductance = 2.0 * std::f64::consts::PI * self.rock_conductivity / ln_term
            * self.resistance_factor
            * self.configuration.transfer_factor();
        let ntu = conductance * self.length / (mass_flow * heat_capacity);
        rock_temperature - (rock_temperature - inlet_temperature) * (-ntu).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lateral(configuration: LoopConfiguration) -> Lateral {
        Lateral {
            configuration,
            radius: 0.1,
            length: 3000.0,
            rock_conductivity: 3.0,
            rock_diffusivity: 3.0 / (2700.0 * 1000.0),
            resistance_factor: 1.0,
        }
    }

    #[test]
    fn test_outlet_declines_with_time() {
        let lateral = lateral(LoopConfiguration::ULoop);
        let year = utils::SECONDS_PER_YEAR;
        let early = lateral.outlet_temperature(200.0, 50.0, 20.0, 4200.0, year);
        let late = lateral.outlet_temperature(200.0, 50.0, 20.0, 4200.0, 30.0 * year);
        assert!(early > late);
        assert!(late > 50.0 && early < 200.0);
    }

    #[test]
    fn test_coaxial_transfers_less_heat() {
        let year = utils::SECONDS_PER_YEAR;
        let u_loop = lateral(LoopConfiguration::ULoop).outlet_temperature(200.0, 50.0, 20.0, 4200.0, year);
        let coaxial =
            lateral(LoopConfiguration::Coaxial).outlet_temperature(200.0, 50.0, 20.0, 4200.0, year);
        assert!(coaxial < u_loop);
        assert!(LoopConfiguration::from_code(3).is_err());
    }
}
