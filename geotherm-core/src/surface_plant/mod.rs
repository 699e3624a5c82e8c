//! Surface plant sub-model: conversion of produced fluid into electricity, heat or cooling.

use crate::imports::*;
use crate::physics::water;
use crate::reservoir::Reservoir;
use crate::units::convert;
use crate::wellbores::WellBores;

pub mod district_heating;
mod plant_type;

pub use plant_type::{ByProduct, EndUseOption, PowerPlantType, END_USE_CODES};

/// Surface plant variant, derived from the end use and the power plant type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfacePlantKind {
    /// Electricity or combined heat and power
    PowerPlant(PowerPlantType),
    DirectUse,
    AbsorptionChiller,
    HeatPump,
    DistrictHeating,
    SutraStorage,
}

impl Default for SurfacePlantKind {
    fn default() -> Self {
        Self::PowerPlant(PowerPlantType::default())
    }
}

impl SurfacePlantKind {
    pub fn select(end_use: EndUseOption, plant_type: PowerPlantType) -> Self {
        match end_use {
            EndUseOption::DirectUseHeat => Self::DirectUse,
            EndUseOption::AbsorptionChiller => Self::AbsorptionChiller,
            EndUseOption::HeatPump => Self::HeatPump,
            EndUseOption::DistrictHeating => Self::DistrictHeating,
            EndUseOption::SutraStorage => Self::SutraStorage,
            _ => Self::PowerPlant(plant_type),
        }
    }
}

/// Upstream values the surface plant calculation depends on
#[derive(Debug, Clone, Copy)]
pub struct SurfacePlantContext<'a> {
    pub reservoir: &'a Reservoir,
    pub wellbores: &'a WellBores,
}

#[derive(Debug)]
pub struct SurfacePlant {
    pub kind: SurfacePlantKind,
    pub end_use: EndUseOption,
    pub params: ParameterDict,
    pub outputs: OutputParameterDict,
}

/// Instantaneous plant performance, kW per time step
#[derive(Debug, Clone)]
struct StepSeries {
    gross_electricity: Array1<f64>,
    heat_produced: Array1<f64>,
    cooling_produced: Array1<f64>,
    heat_pump_electricity: Array1<f64>,
}

impl StepSeries {
    fn zeros(n: usize) -> Self {
        Self {
            gross_electricity: Array1::zeros(n),
            heat_produced: Array1::zeros(n),
            cooling_produced: Array1::zeros(n),
            heat_pump_electricity: Array1::zeros(n),
        }
    }
}

impl SurfacePlant {
    pub fn new(end_use: EndUseOption, plant_type: PowerPlantType) -> Self {
        let kind = SurfacePlantKind::select(end_use, plant_type);
        let params = ParameterDict::new()
            .with(Parameter::int_allowable("End-Use Option", end_use.code(), &END_USE_CODES))
            .with(Parameter::int("Power Plant Type", plant_type.code(), 1, 4))
            .with(Parameter::int("Plant Lifetime", 30, 1, 100))
            .with(Parameter::int("Time steps per year", 6, 1, 100))
            .with(Parameter::float("Utilization Factor", 0.9, Unit::Tenth, 0.1, 1.0))
            .with(Parameter::float("End-Use Efficiency Factor", 0.9, Unit::Tenth, 0.1, 1.0))
            .with(Parameter::float("Ambient Temperature", 15.0, Unit::Celsius, -50.0, 50.0))
            .with(Parameter::float("CHP Fraction", 0.5, Unit::Tenth, 0.0001, 0.9999))
            .with(Parameter::float(
                "CHP Bottoming Entering Temperature",
                150.0,
                Unit::Celsius,
                0.0,
                400.0,
            ))
            .with(Parameter::float("Heat Pump COP", 3.0, Unit::Dimensionless, 1.1, 20.0))
            .with(Parameter::float("Absorption Chiller COP", 0.7, Unit::Dimensionless, 0.1, 3.0))
            .with(Parameter::float(
                "Absorption Chiller Generator Temperature",
                115.0,
                Unit::Celsius,
                0.0,
                400.0,
            ))
            .with(Parameter::float(
                "Annual District Heating Demand",
                100.0,
                Unit::GigawattHourPerYear,
                0.001,
                1e5,
            ))
            .with(Parameter::float("Peaking Boiler Efficiency", 0.85, Unit::Tenth, 0.1, 1.0));

        let mut outputs = OutputParameterDict::new();
        for name in [
            "Gross Electricity Produced",
            "Net Electricity Produced",
            "Heat Extracted",
            "Heat Produced",
            "Cooling Produced",
            "Heat Pump Electricity Used",
        ] {
            outputs.declare(OutputParameter::new(name, Unit::Kilowatt).preferred(Unit::Megawatt));
        }
        outputs.declare(OutputParameter::new("First Law Efficiency", Unit::Percent));
        for name in [
            "Annual Electricity Production",
            "Annual Heat Production",
            "Annual Heat Extracted",
            "Annual Cooling Production",
            "Annual Pumping Energy",
        ] {
            outputs.declare(
                OutputParameter::new(name, Unit::KilowattHourPerYear)
                    .preferred(Unit::GigawattHourPerYear),
            );
        }
        outputs.declare(OutputParameter::new("Reservoir Heat Content Remaining", Unit::Percent));
        outputs.declare(OutputParameter::new("Effective Utilization Factor", Unit::Tenth));
        outputs.declare(
            OutputParameter::new("Maximum Net Electricity", Unit::Kilowatt).preferred(Unit::Megawatt),
        );
        outputs.declare(
            OutputParameter::new("Maximum Heat Produced", Unit::Kilowatt).preferred(Unit::Megawatt),
        );
        outputs.declare(OutputParameter::new("Reinjection Temperature", Unit::Celsius));
        if kind == SurfacePlantKind::DistrictHeating {
            outputs.declare(
                OutputParameter::new("Daily Heating Demand", Unit::Kilowatt)
                    .preferred(Unit::Megawatt)
                    .tooltip("Average heating demand of each day of the year"),
            );
            for name in [
                "Annual Heating Demand",
                "Annual Geothermal Heat Supplied",
                "Annual Peaking Boiler Heat",
            ] {
                outputs.declare(
                    OutputParameter::new(name, Unit::KilowattHourPerYear)
                        .preferred(Unit::GigawattHourPerYear),
                );
            }
        }

        Self {
            kind,
            end_use,
            params,
            outputs,
        }
    }

    pub fn time_grid(&self) -> anyhow::Result<utils::TimeGrid> {
        utils::TimeGrid::new(
            self.params.usize("Plant Lifetime")?,
            self.params.usize("Time steps per year")?,
        )
    }

    /// Effective utilization factor once district heating limited the supply, else the
    /// parameter
    pub fn utilization_factor(&self) -> anyhow::Result<f64> {
        match self.outputs.scalar_opt("Effective Utilization Factor") {
            Some(uf) => Ok(uf),
            None => self.params.f64("Utilization Factor"),
        }
    }

    /// District heating pre-pass: the daily demand profile, needed before the first reservoir
    /// calculation
    pub fn calculate_district_heating_demand(&mut self) -> anyhow::Result<()> {
        ensure!(
            self.kind == SurfacePlantKind::DistrictHeating,
            "district heating demand requested for a {:?} plant",
            self.kind
        );
        let annual = convert(
            self.params.f64("Annual District Heating Demand")?,
            Unit::GigawattHourPerYear,
            Unit::KilowattHourPerYear,
        )?;
        let daily = district_heating::daily_demand(annual, self.params.f64("Ambient Temperature")?);
        self.outputs.set_series("Daily Heating Demand", daily)?;
        self.outputs.set_scalar("Annual Heating Demand", annual)?;
        Ok(())
    }

    fn step_series(
        &self,
        reservoir: &Reservoir,
        produced: &Array1<f64>,
        flow: &Array1<f64>,
        heat_extracted: &Array1<f64>,
        injection_temperature: f64,
    ) -> anyhow::Result<StepSeries> {
        let n = produced.len();
        let mut steps = StepSeries::zeros(n);
        let ambient = self.params.f64("Ambient Temperature")?;
        let efficiency = self.params.f64("End-Use Efficiency Factor")?;
        let cp = reservoir.outputs.scalar("Water Heat Capacity")?;
        // kW of heat released cooling `flow` from `hot` to `cold`
        let heat = |i: usize, hot: f64, cold: f64| flow[i] * cp * (hot - cold).max(0.0) / 1000.0;

        match self.kind {
            SurfacePlantKind::PowerPlant(plant) => {
                let chp_fraction = self.params.f64("CHP Fraction")?;
                let bottoming = self.params.f64("CHP Bottoming Entering Temperature")?;
                for i in 0..n {
                    let t = produced[i];
                    let exergy = |temp: f64| flow[i] * water::exergy(temp, ambient);
                    let (gross, heat_use) = match self.end_use {
                        EndUseOption::ChpTopping(_) => {
                            let outlet = (ambient + 0.5 * (t - ambient)).max(injection_temperature);
                            (
                                (exergy(t) - exergy(outlet)) * plant.utilization_efficiency(t),
                                efficiency * heat(i, outlet, injection_temperature),
                            )
                        }
                        EndUseOption::ChpBottoming(_) => {
                            let entering = bottoming.min(t);
                            (
                                exergy(entering) * plant.utilization_efficiency(entering),
                                efficiency * heat(i, t, entering),
                            )
                        }
                        EndUseOption::ChpParallel(_) => (
                            (1.0 - chp_fraction) * exergy(t) * plant.utilization_efficiency(t),
                            chp_fraction * efficiency * heat(i, t, injection_temperature),
                        ),
                        _ => (exergy(t) * plant.utilization_efficiency(t), 0.0),
                    };
                    steps.gross_electricity[i] = gross;
                    steps.heat_produced[i] = heat_use;
                }
            }
            SurfacePlantKind::DirectUse | SurfacePlantKind::DistrictHeating => {
                steps.heat_produced = heat_extracted * efficiency;
            }
            SurfacePlantKind::AbsorptionChiller => {
                let generator = self.params.f64("Absorption Chiller Generator Temperature")?;
                if utils::ndarrmean(produced) < generator {
                    log::warn!(
                        "average production temperature is below the absorption chiller generator temperature of {generator:.1} degC"
                    );
                }
                steps.heat_produced = heat_extracted * efficiency;
                steps.cooling_produced = &steps.heat_produced * self.params.f64("Absorption Chiller COP")?;
            }
            SurfacePlantKind::HeatPump => {
                let cop = self.params.f64("Heat Pump COP")?;
                steps.heat_produced = heat_extracted * (efficiency * cop / (cop - 1.0));
                steps.heat_pump_electricity = &steps.heat_produced / cop;
            }
            SurfacePlantKind::SutraStorage => {
                steps.heat_produced = heat_extracted.clone();
            }
        }
        Ok(steps)
    }

    pub fn calculate(&mut self, ctx: &SurfacePlantContext) -> anyhow::Result<()> {
        let grid = self.time_grid()?;
        let reservoir = ctx.reservoir;
        let wellbores = ctx.wellbores;
        let produced = wellbores.outputs.series("Produced Temperature")?;
        ensure!(
            produced.len() == grid.len(),
            "produced temperature has {} points, expected {}",
            produced.len(),
            grid.len()
        );
        let injection_temperature = wellbores.injection_temperature()?;
        let cp = reservoir.outputs.scalar("Water Heat Capacity")?;
        let sutra = match self.kind {
            SurfacePlantKind::SutraStorage => Some(
                reservoir
                    .sutra_history()
                    .context("SUTRA heat storage needs the SUTRA reservoir history")?,
            ),
            _ => None,
        };
        let flow = match sutra {
            Some(history) => history.flow_rate.clone(),
            None => Array1::from_elem(grid.len(), wellbores.outputs.scalar("Total Flow Rate")?),
        };
        let heat_extracted: Array1<f64> = match sutra {
            Some(history) => history.heat_extracted.clone(),
            None => produced
                .iter()
                .zip(flow.iter())
                .map(|(t, m)| m * cp * (t - injection_temperature) / 1000.0)
                .collect(),
        };
        let pumping = wellbores.outputs.series("Pumping Power")?;

        let steps = self.step_series(reservoir, produced, &flow, &heat_extracted, injection_temperature)?;
        let net_electricity = if self.end_use.produces_electricity() {
            &steps.gross_electricity - pumping
        } else {
            Array1::zeros(grid.len())
        };
        if self.end_use.produces_electricity() && net_electricity.iter().all(|p| *p <= 0.0) {
            log::warn!("pumping power exceeds gross electricity in every time step");
        }
        let first_law: Array1<f64> = net_electricity
            .iter()
            .zip(steps.heat_produced.iter())
            .zip(heat_extracted.iter())
            .map(|((el, heat), extracted)| {
                if *extracted > 0.0 {
                    100.0 * (el.max(0.0) + heat) / extracted
                } else {
                    0.0
                }
            })
            .collect();

        // district heating limits the geothermal supply to the demand
        let (utilization, annual_heat) = match self.kind {
            SurfacePlantKind::DistrictHeating => {
                if !self.outputs.get("Daily Heating Demand").map_or(false, |o| o.is_set()) {
                    self.calculate_district_heating_demand()?;
                }
                let daily = self.outputs.series("Daily Heating Demand")?.clone();
                let annual_demand = self.outputs.scalar("Annual Heating Demand")?;
                let capacity = grid.annual_average(&steps.heat_produced)?;
                let supplied: Array1<f64> = capacity
                    .iter()
                    .map(|c| district_heating::geothermal_supply(&daily, *c))
                    .collect();
                let boiler = supplied.mapv(|s| (annual_demand - s).max(0.0));
                let available = capacity.sum() * utils::HOURS_PER_YEAR;
                let utilization = if available > 0.0 {
                    (supplied.sum() / available).clamp(1e-6, 1.0)
                } else {
                    self.params.f64("Utilization Factor")?
                };
                self.outputs
                    .set_series("Annual Geothermal Heat Supplied", supplied.clone())?;
                self.outputs.set_series("Annual Peaking Boiler Heat", boiler)?;
                (utilization, supplied)
            }
            _ => {
                let utilization = self.params.f64("Utilization Factor")?;
                let annual_heat =
                    grid.annual_average(&steps.heat_produced)? * (utils::HOURS_PER_YEAR * utilization);
                (utilization, annual_heat)
            }
        };
        let annual = |series: &Array1<f64>| -> anyhow::Result<Array1<f64>> {
            Ok(grid.annual_average(series)? * (utils::HOURS_PER_YEAR * utilization))
        };
        let annual_extracted = annual(&heat_extracted)?;
        let annual_electricity = annual(&net_electricity)?;
        let annual_cooling = annual(&steps.cooling_produced)?;
        let annual_pumping = annual(pumping)?;

        // kWh to MJ
        let initial_heat = reservoir.outputs.scalar("Initial Reservoir Heat Content")?;
        let remaining = utils::ndarrcumsum(&annual_extracted).mapv(|e| {
            if initial_heat > 0.0 {
                (100.0 * (1.0 - e * 3.6 / initial_heat)).max(0.0)
            } else {
                0.0
            }
        });

        let mut errors: ComboErrors<anyhow::Error> = ComboErrors::new();
        for (name, series) in [
            ("gross electricity", &steps.gross_electricity),
            ("heat produced", &steps.heat_produced),
            ("heat extracted", &heat_extracted),
        ] {
            errors.check(series.iter().all(|v| v.is_finite()), format!("{name} is not finite"));
        }
        errors.check(
            heat_extracted.iter().any(|q| *q > 0.0),
            "no heat is extracted from the reservoir",
        );
        errors.into_result(self.name())?;

        let outputs = &mut self.outputs;
        outputs.set_scalar("Maximum Net Electricity", utils::ndarrmax(&net_electricity).max(0.0))?;
        outputs.set_scalar("Maximum Heat Produced", utils::ndarrmax(&steps.heat_produced))?;
        outputs.set_series("Gross Electricity Produced", steps.gross_electricity)?;
        outputs.set_series("Net Electricity Produced", net_electricity)?;
        outputs.set_series("Heat Extracted", heat_extracted)?;
        outputs.set_series("Heat Produced", steps.heat_produced)?;
        outputs.set_series("Cooling Produced", steps.cooling_produced)?;
        outputs.set_series("Heat Pump Electricity Used", steps.heat_pump_electricity)?;
        outputs.set_series("First Law Efficiency", first_law)?;
        outputs.set_series("Annual Electricity Production", annual_electricity)?;
        outputs.set_series("Annual Heat Production", annual_heat)?;
        outputs.set_series("Annual Heat Extracted", annual_extracted)?;
        outputs.set_series("Annual Cooling Production", annual_cooling)?;
        outputs.set_series("Annual Pumping Energy", annual_pumping)?;
        outputs.set_series("Reservoir Heat Content Remaining", remaining)?;
        outputs.set_scalar("Effective Utilization Factor", utilization)?;
        outputs.set_series(
            "Reinjection Temperature",
            Array1::from_elem(grid.len(), injection_temperature),
        )?;
        Ok(())
    }
}

impl SubModel for SurfacePlant {
    fn name(&self) -> &str {
        "SurfacePlant"
    }

    fn parameters(&self) -> &ParameterDict {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut ParameterDict {
        &mut self.params
    }

    fn output_parameters(&self) -> &OutputParameterDict {
        &self.outputs
    }

    fn output_parameters_mut(&mut self) -> &mut OutputParameterDict {
        &mut self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservoir::{ReservoirContext, ReservoirKind};
    use crate::wellbores::{WellBoresContext, WellBoresKind};

    fn run(end_use: i64, pairs: &[(&str, &str)]) -> anyhow::Result<SurfacePlant> {
        let input = InputParameters::from_pairs(pairs.iter().copied());
        let end_use = EndUseOption::from_code(end_use)?;
        let mut plant = SurfacePlant::new(end_use, PowerPlantType::SubcriticalOrc);
        plant.read_parameters(&input)?;
        if plant.kind == SurfacePlantKind::DistrictHeating {
            plant.calculate_district_heating_demand()?;
        }
        let mut wellbores = WellBores::new(WellBoresKind::Standard);
        wellbores.read_parameters(&input)?;
        let mut reservoir = Reservoir::new(ReservoirKind::Cylindrical);
        reservoir.read_parameters(&input)?;
        let grid = plant.time_grid()?;
        let uf = plant.utilization_factor()?;
        reservoir.calculate(&ReservoirContext {
            time: &grid,
            utilization_factor: uf,
            injection_temperature: wellbores.reservoir_injection_temperature()?,
            total_flow: wellbores.total_flow(),
        })?;
        wellbores.calculate(&WellBoresContext {
            reservoir: &reservoir,
            time: &grid,
            utilization_factor: uf,
        })?;
        plant.calculate(&SurfacePlantContext {
            reservoir: &reservoir,
            wellbores: &wellbores,
        })?;
        Ok(plant)
    }

    #[test]
    fn test_electricity_plant() {
        let plant = run(1, &[]).unwrap();
        assert!(plant.outputs.unset().is_empty(), "{:?}", plant.outputs.unset());
        let net = plant.outputs.series("Net Electricity Produced").unwrap();
        let gross = plant.outputs.series("Gross Electricity Produced").unwrap();
        assert!(net.iter().zip(gross.iter()).all(|(n, g)| n < g));
        assert!(plant.outputs.scalar("Maximum Net Electricity").unwrap() > 0.0);
        let annual = plant.outputs.series("Annual Electricity Production").unwrap();
        assert_eq!(annual.len(), 30);
        assert!(plant.outputs.series("Annual Heat Production").unwrap().iter().all(|h| *h == 0.0));
        let remaining = plant.outputs.series("Reservoir Heat Content Remaining").unwrap();
        assert!(remaining[0] < 100.0 && remaining[29] < remaining[0]);
    }

    #[test]
    fn test_direct_use_produces_no_electricity() {
        let plant = run(2, &[]).unwrap();
        assert!(plant
            .outputs
            .series("Annual Electricity Production")
            .unwrap()
            .iter()
            .all(|e| *e == 0.0));
        let extracted = plant.outputs.series("Heat Extracted").unwrap();
        let produced = plant.outputs.series("Heat Produced").unwrap();
        assert!(produced[0].approx_eq(&(0.9 * extracted[0]), 1e-12));
    }

    #[test]
    fn test_heat_pump_and_chiller() {
        let plant = run(6, &[("Heat Pump COP", "4")]).unwrap();
        let heat = plant.outputs.series("Heat Produced").unwrap();
        let electricity = plant.outputs.series("Heat Pump Electricity Used").unwrap();
        assert!(electricity[3].approx_eq(&(heat[3] / 4.0), 1e-12));

        let plant = run(5, &[]).unwrap();
        let heat = plant.outputs.series("Heat Produced").unwrap();
        let cooling = plant.outputs.series("Cooling Produced").unwrap();
        assert!(cooling[0].approx_eq(&(0.7 * heat[0]), 1e-12));
    }

    #[test]
    fn test_chp_parallel_splits_flow() {
        let all_power = run(1, &[]).unwrap();
        let parallel = run(51, &[("CHP Fraction", "0.25")]).unwrap();
        let gross_all = all_power.outputs.series("Gross Electricity Produced").unwrap()[0];
        let gross_parallel = parallel.outputs.series("Gross Electricity Produced").unwrap()[0];
        assert!(gross_parallel.approx_eq(&(0.75 * gross_all), 1e-9));
        assert!(parallel.outputs.series("Heat Produced").unwrap()[0] > 0.0);
    }

    #[test]
    fn test_district_heating_limits_utilization() {
        let plant = run(7, &[("Annual District Heating Demand", "20")]).unwrap();
        assert!(plant.outputs.unset().is_empty(), "{:?}", plant.outputs.unset());
        let uf = plant.utilization_factor().unwrap();
        assert!(uf > 0.0 && uf < 0.9, "{uf}");
        let supplied = plant.outputs.series("Annual Geothermal Heat Supplied").unwrap();
        let boiler = plant.outputs.series("Annual Peaking Boiler Heat").unwrap();
        let demand = plant.outputs.scalar("Annual Heating Demand").unwrap();
        assert!((supplied[0] + boiler[0]).approx_eq(&demand, 1e-9));
    }
}
