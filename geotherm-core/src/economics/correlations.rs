//! Cost correlations for wells, surface plants and gathering systems, all in MUSD.

use crate::imports::*;
use crate::surface_plant::PowerPlantType;

/// Selected by `Well Drilling Cost Correlation`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrillingCorrelation {
    #[default]
    VerticalSmall,
    DeviatedSmall,
    VerticalLarge,
    DeviatedLarge,
}

impl DrillingCorrelation {
    pub fn from_code(code: i64) -> anyhow::Result<Self> {
        Ok(match code {
            1 => Self::VerticalSmall,
            2 => Self::DeviatedSmall,
            3 => Self::VerticalLarge,
            4 => Self::DeviatedLarge,
            _ => bail!("unknown well drilling cost correlation {code}"),
        })
    }

    /// Returns drilling and completion cost of one well in MUSD
    ///
    /// # Equations used
    /// quadratic fits in the measured depth, USD
    ///
    /// # Arguments
    /// - `depth`: m
    pub fn well_cost(&self, depth: f64) -> f64 {
        let (a, b, c) = match self {
            Self::VerticalSmall => (0.3021, 584.9112, 751_368.0),
            Self::DeviatedSmall => (0.2898, 822.1507, 680_563.0),
            Self::VerticalLarge => (0.2818, 1275.5213, 632_315.0),
            Self::DeviatedLarge => (0.2553, 1716.7157, 500_867.0),
        };
        (a * depth * depth + b * depth + c) * 1e-6
    }
}

/// Stimulation of one injection well, MUSD
pub const STIMULATION_PER_WELL: f64 = 1.25;
/// Gathering pipework per well, MUSD
pub const GATHERING_PER_WELL: f64 = 0.75;
/// Gathering pumps per MW of pumping power, MUSD
pub const GATHERING_PUMPS_PER_MW: f64 = 1.5;
/// Direct-use heat exchangers per MW thermal, MUSD
pub const DIRECT_USE_PER_MW: f64 = 0.25;
/// Absorption chiller per MW of cooling, MUSD
pub const CHILLER_PER_MW: f64 = 0.4;
/// Heat pump per MW of heat, MUSD
pub const HEAT_PUMP_PER_MW: f64 = 0.6;
/// Peaking boiler per MW of peak demand, MUSD
pub const PEAKING_BOILER_PER_MW: f64 = 0.1;

/// Returns power plant cost in MUSD
///
/// # Equations used
/// C = W (2300 + 1700 exp(-W / 20)) USD/kW, flash plants at 80 %
///
/// # Arguments
/// - `capacity`: gross electric capacity, MW
pub fn power_plant_cost(plant: PowerPlantType, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        return 0.0;
    }
    let per_kw = 2300.0 + 1700.0 * (-capacity / 20.0).exp();
    let factor = if plant.is_flash() { 0.8 } else { 1.0 };
    capacity * 1000.0 * per_kw * factor * 1e-6
}

/// Exploration cost in MUSD: a fixed campaign plus 60 % of one well
pub fn exploration_cost(well_cost: f64) -> f64 {
    1.12 * (1.0 + 0.6 * well_cost)
}
