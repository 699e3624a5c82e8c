//! Physical quantity types, their concrete units and linear conversions between them.
//!
//! Every unit converts to the canonical unit of its [UnitType] as
//! `canonical = value * scale + offset`.

use crate::imports::*;
use thiserror::Error;

const LB: f64 = 0.453_592_37;
const FT: f64 = 0.3048;
const PSI: f64 = 6.894_757_293;
const MMBTU: f64 = 293.071_07;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    None,
    Percent,
    Length,
    Area,
    Volume,
    Mass,
    Density,
    Temperature,
    TemperatureGradient,
    Pressure,
    PressureGradient,
    Time,
    MassFlow,
    Power,
    Energy,
    EnergyFrequency,
    Currency,
    CurrencyFrequency,
    EnergyCost,
    CostPerMass,
    CostPerLength,
    MassPerEnergy,
    EnergyPerMass,
    HeatCapacity,
    ThermalConductivity,
    Impedance,
    ProductivityIndex,
    DrawdownRate,
    MassFlux,
}

macro_rules! unit_table {
    ($($variant:ident: $utype:ident, $sym:literal, $scale:expr, $offset:expr, [$($alias:literal),*];)*) => {
        /// Concrete unit, serialized as its symbol
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub enum Unit {
            $($variant),*
        }

        impl Unit {
            pub const ALL: &'static [Unit] = &[$(Unit::$variant),*];

            pub fn unit_type(&self) -> UnitType {
                match self {
                    $(Unit::$variant => UnitType::$utype),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Unit::$variant => $sym),*
                }
            }

            fn aliases(&self) -> &'static [&'static str] {
                match self {
                    $(Unit::$variant => &[$($alias),*]),*
                }
            }

            /// `(scale, offset)` to the canonical unit of the unit type
            fn scale_offset(&self) -> (f64, f64) {
                match self {
                    $(Unit::$variant => ($scale, $offset)),*
                }
            }
        }
    };
}

unit_table! {
    Dimensionless: None, "", 1.0, 0.0, [];
    Percent: Percent, "%", 1.0, 0.0, ["percent"];
    Tenth: Percent, "tenth", 100.0, 0.0, ["fraction"];
    Meter: Length, "m", 1.0, 0.0, ["meter", "meters"];
    Centimeter: Length, "cm", 0.01, 0.0, ["centimeter", "centimeters"];
    Millimeter: Length, "mm", 0.001, 0.0, ["millimeter", "millimeters"];
    Kilometer: Length, "km", 1000.0, 0.0, ["kilometer", "kilometers"];
    Foot: Length, "ft", FT, 0.0, ["foot", "feet"];
    Inch: Length, "in", 0.0254, 0.0, ["inch", "inches"];
    Mile: Length, "mi", 1609.344, 0.0, ["mile", "miles"];
    SquareMeter: Area, "m**2", 1.0, 0.0, ["m2"];
    SquareKilometer: Area, "km**2", 1.0e6, 0.0, ["km2"];
    SquareFoot: Area, "ft**2", FT * FT, 0.0, ["ft2"];
    CubicMeter: Volume, "m**3", 1.0, 0.0, ["m3"];
    CubicKilometer: Volume, "km**3", 1.0e9, 0.0, ["km3"];
    Liter: Volume, "L", 0.001, 0.0, ["liter", "liters"];
    CubicFoot: Volume, "ft**3", FT * FT * FT, 0.0, ["ft3"];
    Kilogram: Mass, "kg", 1.0, 0.0, ["kilogram", "kilograms"];
    Tonne: Mass, "tonne", 1000.0, 0.0, ["tonnes"];
    Pound: Mass, "lb", LB, 0.0, ["lbs", "pound", "pounds"];
    KgPerCubicMeter: Density, "kg/m**3", 1.0, 0.0, ["kg/m3"];
    GramPerCubicCm: Density, "g/cm**3", 1000.0, 0.0, ["g/cm3"];
    LbPerCubicFoot: Density, "lb/ft**3", LB / (FT * FT * FT), 0.0, ["lb/ft3"];
    Celsius: Temperature, "degC", 1.0, 0.0, ["c", "celsius"];
    Fahrenheit: Temperature, "degF", 5.0 / 9.0, -160.0 / 9.0, ["f", "fahrenheit"];
    Kelvin: Temperature, "degK", 1.0, -273.15, ["k", "kelvin"];
    CelsiusPerKm: TemperatureGradient, "degC/km", 1.0, 0.0, ["c/km"];
    CelsiusPerMeter: TemperatureGradient, "degC/m", 1000.0, 0.0, ["c/m"];
    FahrenheitPer1000Ft: TemperatureGradient, "degF/1000ft", 5.0 / 9.0 / FT, 0.0, [];
    Kilopascal: Pressure, "kPa", 1.0, 0.0, ["kilopascal"];
    Pascal: Pressure, "Pa", 0.001, 0.0, ["pascal"];
    Megapascal: Pressure, "MPa", 1000.0, 0.0, ["megapascal"];
    Bar: Pressure, "bar", 100.0, 0.0, [];
    Psi: Pressure, "psi", PSI, 0.0, [];
    KilopascalPerKm: PressureGradient, "kPa/km", 1.0, 0.0, [];
    PsiPerFoot: PressureGradient, "psi/ft", PSI / FT * 1000.0, 0.0, [];
    Year: Time, "yr", 1.0, 0.0, ["year", "years"];
    Day: Time, "day", 1.0 / 365.0, 0.0, ["days"];
    Hour: Time, "hr", 1.0 / utils::HOURS_PER_YEAR, 0.0, ["hour", "hours"];
    Second: Time, "s", 1.0 / utils::SECONDS_PER_YEAR, 0.0, ["sec", "second", "seconds"];
    KgPerSecond: MassFlow, "kg/s", 1.0, 0.0, ["kg/sec"];
    TonnePerHour: MassFlow, "tonne/hr", 1000.0 / 3600.0, 0.0, [];
    LbPerSecond: MassFlow, "lb/s", LB, 0.0, [];
    Watt: Power, "W", 0.001, 0.0, ["watt", "watts"];
    Kilowatt: Power, "kW", 1.0, 0.0, ["kilowatt", "kilowatts"];
    Megawatt: Power, "MW", 1000.0, 0.0, ["megawatt", "megawatts"];
    Gigawatt: Power, "GW", 1.0e6, 0.0, ["gigawatt", "gigawatts"];
    KilowattHour: Energy, "kWh", 1.0, 0.0, [];
    MegawattHour: Energy, "MWh", 1000.0, 0.0, [];
    GigawattHour: Energy, "GWh", 1.0e6, 0.0, [];
    Joule: Energy, "J", 1.0 / 3.6e6, 0.0, ["joule", "joules"];
    Megajoule: Energy, "MJ", 1.0 / 3.6, 0.0, [];
    Gigajoule: Energy, "GJ", 1000.0 / 3.6, 0.0, [];
    Petajoule: Energy, "PJ", 1.0e9 / 3.6, 0.0, [];
    Mmbtu: Energy, "MMBTU", MMBTU, 0.0, ["mmbtu"];
    KilowattHourPerYear: EnergyFrequency, "kWh/yr", 1.0, 0.0, [];
    MegawattHourPerYear: EnergyFrequency, "MWh/yr", 1000.0, 0.0, [];
    GigawattHourPerYear: EnergyFrequency, "GWh/yr", 1.0e6, 0.0, [];
    Usd: Currency, "USD", 1.0, 0.0, ["$", "dollars"];
    Kusd: Currency, "KUSD", 1000.0, 0.0, [];
    Musd: Currency, "MUSD", 1.0e6, 0.0, ["m$"];
    UsdPerYear: CurrencyFrequency, "USD/yr", 1.0, 0.0, [];
    KusdPerYear: CurrencyFrequency, "KUSD/yr", 1000.0, 0.0, [];
    MusdPerYear: CurrencyFrequency, "MUSD/yr", 1.0e6, 0.0, ["m$/yr"];
    UsdPerKwh: EnergyCost, "USD/kWh", 1.0, 0.0, ["$/kwh"];
    CentsPerKwh: EnergyCost, "cents/kWh", 0.01, 0.0, [];
    UsdPerMwh: EnergyCost, "USD/MWh", 0.001, 0.0, ["$/mwh"];
    UsdPerMmbtu: EnergyCost, "USD/MMBTU", 1.0 / MMBTU, 0.0, ["$/mmbtu"];
    UsdPerKg: CostPerMass, "USD/kg", 1.0, 0.0, [];
    UsdPerTonne: CostPerMass, "USD/tonne", 0.001, 0.0, [];
    UsdPerLb: CostPerMass, "USD/lb", 1.0 / LB, 0.0, [];
    UsdPerMeter: CostPerLength, "USD/m", 1.0, 0.0, [];
    UsdPerFoot: CostPerLength, "USD/ft", 1.0 / FT, 0.0, [];
    KgPerKwh: MassPerEnergy, "kg/kWh", 1.0, 0.0, [];
    LbPerKwh: MassPerEnergy, "lb/kWh", LB, 0.0, [];
    TonnePerKwh: MassPerEnergy, "tonne/kWh", 1000.0, 0.0, [];
    KwhPerKg: EnergyPerMass, "kWh/kg", 1.0, 0.0, [];
    KwhPerTonne: EnergyPerMass, "kWh/tonne", 0.001, 0.0, [];
    KwhPerLb: EnergyPerMass, "kWh/lb", 1.0 / LB, 0.0, [];
    GjPerTonne: EnergyPerMass, "GJ/tonne", 1.0 / 3.6, 0.0, [];
    JPerKgK: HeatCapacity, "J/kg/K", 1.0, 0.0, [];
    KjPerKgK: HeatCapacity, "kJ/kg/K", 1000.0, 0.0, [];
    WPerMK: ThermalConductivity, "W/m/K", 1.0, 0.0, [];
    GpaSecPerCubicMeter: Impedance, "GPa.s/m**3", 1.0, 0.0, ["gpa.s/m3"];
    MpaSecPerCubicMeter: Impedance, "MPa.s/m**3", 0.001, 0.0, ["mpa.s/m3"];
    KgPerSecPerBar: ProductivityIndex, "kg/s/bar", 1.0, 0.0, [];
    KgPerSecPerKpa: ProductivityIndex, "kg/s/kPa", 100.0, 0.0, [];
    PerYear: DrawdownRate, "1/yr", 1.0, 0.0, ["1/year"];
    KgPerSecPerSquareMeter: MassFlux, "kg/s/m**2", 1.0, 0.0, ["kg/s/m2"];
}

impl UnitType {
    /// Unit every other unit of this type converts through
    pub fn canonical(&self) -> Unit {
        match self {
            UnitType::None => Unit::Dimensionless,
            UnitType::Percent => Unit::Percent,
            UnitType::Length => Unit::Meter,
            UnitType::Area => Unit::SquareMeter,
            UnitType::Volume => Unit::CubicMeter,
            UnitType::Mass => Unit::Kilogram,
            UnitType::Density => Unit::KgPerCubicMeter,
            UnitType::Temperature => Unit::Celsius,
            UnitType::TemperatureGradient => Unit::CelsiusPerKm,
            UnitType::Pressure => Unit::Kilopascal,
            UnitType::PressureGradient => Unit::KilopascalPerKm,
            UnitType::Time => Unit::Year,
            UnitType::MassFlow => Unit::KgPerSecond,
            UnitType::Power => Unit::Kilowatt,
            UnitType::Energy => Unit::KilowattHour,
            UnitType::EnergyFrequency => Unit::KilowattHourPerYear,
            UnitType::Currency => Unit::Usd,
            UnitType::CurrencyFrequency => Unit::UsdPerYear,
            UnitType::EnergyCost => Unit::UsdPerKwh,
            UnitType::CostPerMass => Unit::UsdPerKg,
            UnitType::CostPerLength => Unit::UsdPerMeter,
            UnitType::MassPerEnergy => Unit::KgPerKwh,
            UnitType::EnergyPerMass => Unit::KwhPerKg,
            UnitType::HeatCapacity => Unit::JPerKgK,
            UnitType::ThermalConductivity => Unit::WPerMK,
            UnitType::Impedance => Unit::GpaSecPerCubicMeter,
            UnitType::ProductivityIndex => Unit::KgPerSecPerBar,
            UnitType::DrawdownRate => Unit::PerYear,
            UnitType::MassFlux => Unit::KgPerSecPerSquareMeter,
        }
    }

    /// Every unit of this type, in catalogue order
    pub fn units(&self) -> Vec<Unit> {
        Unit::ALL
            .iter()
            .copied()
            .filter(|u| u.unit_type() == *self)
            .collect()
    }
}

impl Unit {
    /// Looks up a unit token: symbols match exactly, spelled aliases ignore case.
    pub fn from_symbol(token: &str) -> Result<Unit, UnitError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(UnitError::UnknownUnit(token.to_string()));
        }
        let lower = token.to_lowercase();
        Unit::ALL
            .iter()
            .find(|u| u.symbol() == token)
            .or_else(|| Unit::ALL.iter().find(|u| u.aliases().contains(&lower.as_str())))
            .copied()
            .ok_or_else(|| UnitError::UnknownUnit(token.to_string()))
    }

    fn to_canonical(&self, value: f64) -> f64 {
        let (scale, offset) = self.scale_offset();
        value * scale + offset
    }

    fn from_canonical(&self, value: f64) -> f64 {
        let (scale, offset) = self.scale_offset();
        (value - offset) / scale
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol().to_string()
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitError;
    fn try_from(symbol: String) -> Result<Self, Self::Error> {
        if symbol.is_empty() {
            return Ok(Unit::Dimensionless);
        }
        Unit::from_symbol(&symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("cannot convert `{from}` ({from_type:?}) to `{to}` ({to_type:?})")]
    UnitMismatch {
        from: Unit,
        from_type: UnitType,
        to: Unit,
        to_type: UnitType,
    },
    #[error("unknown unit `{0}`")]
    UnknownUnit(String),
}

/// Converts `value` from `from` to `to`, which must share a [UnitType].
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64, UnitError> {
    if from.unit_type() != to.unit_type() {
        return Err(UnitError::UnitMismatch {
            from,
            from_type: from.unit_type(),
            to,
            to_type: to.unit_type(),
        });
    }
    if from == to {
        return Ok(value);
    }
    Ok(to.from_canonical(from.to_canonical(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_for_every_unit_pair() {
        let samples = [-40.0, 0.0, 1.0, 3.7, 1234.5];
        for unit_a in Unit::ALL {
            for unit_b in unit_a.unit_type().units() {
                for x in samples {
                    let there = convert(x, *unit_a, unit_b).unwrap();
                    let back = convert(there, unit_b, *unit_a).unwrap();
                    assert!(
                        back.approx_eq(&x, 1e-9),
                        "{x} {unit_a} -> {there} {unit_b} -> {back} {unit_a}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_known_conversions() {
        assert!(convert(212.0, Unit::Fahrenheit, Unit::Celsius)
            .unwrap()
            .approx_eq(&100.0, 1e-9));
        assert!(convert(0.0, Unit::Celsius, Unit::Kelvin)
            .unwrap()
            .approx_eq(&273.15, 1e-9));
        assert!(convert(3.0, Unit::Kilometer, Unit::Meter)
            .unwrap()
            .approx_eq(&3000.0, 1e-12));
        assert!(convert(2.5, Unit::Musd, Unit::Usd)
            .unwrap()
            .approx_eq(&2.5e6, 1e-12));
        assert!(convert(0.9, Unit::Tenth, Unit::Percent)
            .unwrap()
            .approx_eq(&90.0, 1e-12));
        assert!(convert(1.0, Unit::Petajoule, Unit::Megajoule)
            .unwrap()
            .approx_eq(&1.0e9, 1e-9));
        assert!(convert(8.0, Unit::Inch, Unit::Meter)
            .unwrap()
            .approx_eq(&0.2032, 1e-12));
    }

    #[test]
    fn test_mismatched_unit_types_fail() {
        let err = convert(1.0, Unit::Meter, Unit::Celsius).unwrap_err();
        assert!(matches!(err, UnitError::UnitMismatch { .. }));
        assert!(err.to_string().contains("degC"));
    }

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(Unit::from_symbol("km").unwrap(), Unit::Kilometer);
        assert_eq!(Unit::from_symbol("Kilometers").unwrap(), Unit::Kilometer);
        assert_eq!(Unit::from_symbol("C").unwrap(), Unit::Celsius);
        assert_eq!(Unit::from_symbol("MW").unwrap(), Unit::Megawatt);
        assert_eq!(Unit::from_symbol("mw").unwrap_err(), UnitError::UnknownUnit("mw".into()));
        assert!(Unit::from_symbol("furlong").is_err());
    }

    #[test]
    fn test_every_type_has_its_canonical_unit() {
        for unit in Unit::ALL {
            let canonical = unit.unit_type().canonical();
            assert_eq!(canonical.unit_type(), unit.unit_type());
            assert_eq!(canonical.scale_offset(), (1.0, 0.0));
        }
    }

    #[test]
    fn test_unit_serializes_as_symbol() {
        let json = serde_json::to_string(&Unit::CentsPerKwh).unwrap();
        assert_eq!(json, "\"cents/kWh\"");
        let unit: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(unit, Unit::CentsPerKwh);
    }
}
