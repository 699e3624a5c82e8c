//! End-use and power plant selectors.

use crate::imports::*;

/// Which product of a combined heat and power plant is credited against the other's levelized
/// cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByProduct {
    /// Electricity is primary (LCOE); heat sales are a credit
    Heat,
    /// Heat is primary (LCOH); electricity sales are a credit
    Electricity,
}

impl ByProduct {
    fn from_digit(digit: i64) -> Self {
        if digit % 2 == 1 {
            Self::Heat
        } else {
            Self::Electricity
        }
    }

    fn digit(&self) -> i64 {
        match self {
            Self::Heat => 1,
            Self::Electricity => 2,
        }
    }
}

/// Selected by the `End-Use Option` code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndUseOption {
    #[default]
    Electricity,
    DirectUseHeat,
    /// Power plant first, heat use on its outlet
    ChpTopping(ByProduct),
    /// Heat use first, power plant on its outlet
    ChpBottoming(ByProduct),
    /// Flow split between power plant and heat use
    ChpParallel(ByProduct),
    AbsorptionChiller,
    HeatPump,
    DistrictHeating,
    /// Seasonal heat storage, only with the SUTRA reservoir
    SutraStorage,
}

/// Codes accepted by `End-Use Option`
pub const END_USE_CODES: [i64; 12] = [1, 2, 31, 32, 41, 42, 51, 52, 5, 6, 7, 9];

impl EndUseOption {
    pub fn from_code(code: i64) -> anyhow::Result<Self> {
        Ok(match code {
            1 => Self::Electricity,
            2 => Self::DirectUseHeat,
            31 | 32 => Self::ChpTopping(ByProduct::from_digit(code % 10)),
            41 | 42 => Self::ChpBottoming(ByProduct::from_digit(code % 10)),
            51 | 52 => Self::ChpParallel(ByProduct::from_digit(code % 10)),
            5 => Self::AbsorptionChiller,
            6 => Self::HeatPump,
            7 => Self::DistrictHeating,
            9 => Self::SutraStorage,
            _ => bail!("unknown end-use option {code}"),
        })
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Electricity => 1,
            Self::DirectUseHeat => 2,
            Self::ChpTopping(by) => 30 + by.digit(),
            Self::ChpBottoming(by) => 40 + by.digit(),
            Self::ChpParallel(by) => 50 + by.digit(),
            Self::AbsorptionChiller => 5,
            Self::HeatPump => 6,
            Self::DistrictHeating => 7,
            Self::SutraStorage => 9,
        }
    }

    pub fn by_product(&self) -> Option<ByProduct> {
        match self {
            Self::ChpTopping(by) | Self::ChpBottoming(by) | Self::ChpParallel(by) => Some(*by),
            _ => None,
        }
    }

    /// True when a power plant is part of the surface plant
    pub fn produces_electricity(&self) -> bool {
        matches!(
            self,
            Self::Electricity | Self::ChpTopping(_) | Self::ChpBottoming(_) | Self::ChpParallel(_)
        )
    }

    /// True when heat (or cooling) is delivered to a user
    pub fn produces_heat(&self) -> bool {
        !matches!(self, Self::Electricity)
    }

    /// True when the levelized cost of electricity is the headline metric
    pub fn electricity_is_primary(&self) -> bool {
        match self {
            Self::Electricity => true,
            _ => self.by_product() == Some(ByProduct::Heat),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Electricity => "Electricity",
            Self::DirectUseHeat => "Direct-Use Heat",
            Self::ChpTopping(_) => "Cogeneration Topping Cycle",
            Self::ChpBottoming(_) => "Cogeneration Bottoming Cycle",
            Self::ChpParallel(_) => "Cogeneration Parallel Cycle",
            Self::AbsorptionChiller => "Absorption Chiller",
            Self::HeatPump => "Heat Pump",
            Self::DistrictHeating => "District Heating",
            Self::SutraStorage => "SUTRA Heat Storage",
        }
    }
}

/// Selected by the `Power Plant Type` code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerPlantType {
    #[default]
    SubcriticalOrc,
    SupercriticalOrc,
    SingleFlash,
    DoubleFlash,
}

impl PowerPlantType {
    pub fn from_code(code: i64) -> anyhow::Result<Self> {
        Ok(match code {
            1 => Self::SubcriticalOrc,
            2 => Self::SupercriticalOrc,
            3 => Self::SingleFlash,
            4 => Self::DoubleFlash,
            _ => bail!("unknown power plant type {code}"),
        })
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::SubcriticalOrc => 1,
            Self::SupercriticalOrc => 2,
            Self::SingleFlash => 3,
            Self::DoubleFlash => 4,
        }
    }

    pub fn is_flash(&self) -> bool {
        matches!(self, Self::SingleFlash | Self::DoubleFlash)
    }

    /// Returns the fraction of the produced fluid's exergy converted to electricity
    ///
    /// # Equations used
    /// linear fits in the production temperature, clamped to [0, 0.7]
    ///
    /// # Arguments
    /// - `temp_c`: temperature entering the plant, degC
    pub fn utilization_efficiency(&self, temp_c: f64) -> f64 {
        let eta = match self {
            Self::SubcriticalOrc => 0.002746 * temp_c - 0.0838,
            Self::SupercriticalOrc => 0.003 * temp_c - 0.07,
            Self::SingleFlash => 0.0021 * temp_c + 0.02,
            Self::DoubleFlash => 0.0024 * temp_c + 0.03,
        };
        eta.clamp(0.0, 0.7)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SubcriticalOrc => "Subcritical ORC",
            Self::SupercriticalOrc => "Supercritical ORC",
            Self::SingleFlash => "Single-Flash",
            Self::DoubleFlash => "Double-Flash",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_use_codes_round_trip() {
        for code in END_USE_CODES {
            assert_eq!(EndUseOption::from_code(code).unwrap().code(), code);
        }
        assert!(EndUseOption::from_code(3).is_err());
    }

    #[test]
    fn test_by_product_parity() {
        let topping_heat_credit = EndUseOption::from_code(31).unwrap();
        assert!(topping_heat_credit.electricity_is_primary());
        let parallel_power_credit = EndUseOption::from_code(52).unwrap();
        assert!(!parallel_power_credit.electricity_is_primary());
        assert!(parallel_power_credit.produces_electricity());
        assert!(!EndUseOption::DistrictHeating.produces_electricity());
    }

    #[test]
    fn test_utilization_efficiency_is_bounded() {
        for plant in [
            PowerPlantType::SubcriticalOrc,
            PowerPlantType::SupercriticalOrc,
            PowerPlantType::SingleFlash,
            PowerPlantType::DoubleFlash,
        ] {
            assert!(plant.utilization_efficiency(20.0) >= 0.0);
            assert!(plant.utilization_efficiency(1000.0) <= 0.7);
        }
        assert!(PowerPlantType::SubcriticalOrc
            .utilization_efficiency(150.0)
            .approx_eq(&(0.002746 * 150.0 - 0.0838), 1e-12));
    }
}
