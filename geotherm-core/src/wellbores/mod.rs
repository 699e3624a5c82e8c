//! Wellbores sub-model: production temperature at the wellhead, pressure drops and pumping power.

use crate::imports::*;
use crate::physics::{self, water};
use crate::reservoir::Reservoir;
use crate::units::convert;

pub mod ags;

use ags::{Lateral, LoopConfiguration};

/// Wellbores variant
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellBoresKind {
    /// Production and injection wells around an open reservoir
    #[default]
    Standard,
    /// Closed-loop wells with multilateral sections
    Ags,
    /// Doublet flows and temperatures taken from the SUTRA well history
    Sutra,
}

/// Upstream values the wellbores calculation depends on
#[derive(Debug, Clone, Copy)]
pub struct WellBoresContext<'a> {
    pub reservoir: &'a Reservoir,
    pub time: &'a utils::TimeGrid,
    pub utilization_factor: f64,
}

#[derive(Debug)]
pub struct WellBores {
    pub kind: WellBoresKind,
    pub params: ParameterDict,
    pub outputs: OutputParameterDict,
    /// kg/s, derived at read
    total_flow: f64,
}

/// Ramey's wellbore heat loss for one production well
struct Ramey {
    rock_temperature: f64,
    surface_temperature: f64,
    /// degC/m
    gradient: f64,
    /// m
    depth: f64,
    mass_flow: f64,
    heat_capacity: f64,
    rock_conductivity: f64,
    rock_diffusivity: f64,
    /// m
    radius: f64,
}

impl Ramey {
    /// Temperature drop between the reservoir and the wellhead after `t_s` seconds
    ///
    /// # Equations used
    /// A = m cw f(t) / (2 pi kr), f(t) = -ln(1.1 r / sqrt(4 alpha t)) - 0.29\
    /// dT = -((Ts - Tres) - g (d - A) + (Tres - g A - Ts) exp(-d / A)), Ts: bottom-hole
    fn drop(&self, reservoir_temperature: f64, t_s: f64) -> f64 {
        let t_s = t_s.max(86_400.0);
        let time_function =
            -(1.1 * self.radius / (4.0 * self.rock_diffusivity * t_s).sqrt()).ln() - 0.29;
        let a = self.mass_flow * self.heat_capacity * time_function.max(1e-3)
            / (2.0 * std::f64::consts::PI * self.rock_conductivity);
        let drop = -((self.rock_temperature - reservoir_temperature)
            - self.gradient * (self.depth - a)
            + (reservoir_temperature - self.gradient * a - self.rock_temperature)
                * (-self.depth / a).exp());
        // never cools below the surface
        drop.min(reservoir_temperature - self.surface_temperature).max(0.0)
    }
}

impl WellBores {
    pub fn new(kind: WellBoresKind) -> Self {
        let mut params = ParameterDict::new()
            .with(Parameter::int("Number of Production Wells", 2, 1, 200))
            .with(Parameter::int("Number of Injection Wells", 2, 0, 200))
            .with(Parameter::float("Production Well Diameter", 8.0, Unit::Inch, 1.0, 30.0))
            .with(Parameter::float("Injection Well Diameter", 8.0, Unit::Inch, 1.0, 30.0))
            .with(Parameter::float(
                "Production Flow Rate per Well",
                50.0,
                Unit::KgPerSecond,
                1.0,
                500.0,
            ))
            .with(Parameter::float("Injection Temperature", 70.0, Unit::Celsius, 0.0, 200.0))
            .with(Parameter::boolean("Ramey Production Wellbore Model", true))
            .with(Parameter::float(
                "Production Wellbore Temperature Drop",
                5.0,
                Unit::Celsius,
                -5.0,
                50.0,
            ))
            .with(Parameter::float(
                "Injection Wellbore Temperature Gain",
                0.0,
                Unit::Celsius,
                -5.0,
                50.0,
            ))
            .with(Parameter::float("Production Well Pump Efficiency", 0.75, Unit::Tenth, 0.1, 1.0))
            .with(Parameter::float(
                "Production Wellhead Pressure",
                344.7,
                Unit::Kilopascal,
                0.0,
                1e4,
            ))
            .with(Parameter::boolean("Is AGS", false));
        if kind == WellBoresKind::Ags {
            params.insert(
                Parameter::int_allowable("Closed-loop Configuration", 1, &[1, 2])
                    .tooltip("1: U-loop, 2: coaxial"),
            );
            params.insert(Parameter::int("Number of Multilateral Sections", 3, 0, 100));
            params.insert(Parameter::float(
                "Nonvertical Length per Multilateral Section",
                1000.0,
                Unit::Meter,
                0.0,
                1e5,
            ));
            params.insert(Parameter::float(
                "Wellbore Thermal Resistance",
                1.0,
                Unit::Dimensionless,
                0.1,
                10.0,
            ));
        }

        let outputs = OutputParameterDict::new()
            .with(OutputParameter::new("Produced Temperature", Unit::Celsius))
            .with(OutputParameter::new("Average Production Temperature", Unit::Celsius))
            .with(OutputParameter::new("Production Well Temperature Drop", Unit::Celsius))
            .with(OutputParameter::new("Production Wellbore Pressure Drop", Unit::Kilopascal))
            .with(OutputParameter::new("Injection Wellbore Pressure Drop", Unit::Kilopascal))
            .with(OutputParameter::new("Reservoir Pressure Drop", Unit::Kilopascal))
            .with(OutputParameter::new("Overall Pressure Drop", Unit::Kilopascal))
            .with(OutputParameter::new("Pumping Power", Unit::Kilowatt).preferred(Unit::Megawatt))
            .with(OutputParameter::new("Total Flow Rate", Unit::KgPerSecond))
            .with(OutputParameter::new("Injection Flow Rate per Well", Unit::KgPerSecond));

        Self {
            kind,
            params,
            outputs,
            total_flow: 100.0,
        }
    }

    /// Produced mass flow of all production wells, kg/s
    pub fn total_flow(&self) -> f64 {
        self.total_flow
    }

    pub fn production_wells(&self) -> anyhow::Result<usize> {
        self.params.usize("Number of Production Wells")
    }

    pub fn injection_wells(&self) -> anyhow::Result<usize> {
        self.params.usize("Number of Injection Wells")
    }

    /// Injection temperature at the surface
    pub fn injection_temperature(&self) -> anyhow::Result<f64> {
        self.params.f64("Injection Temperature")
    }

    /// Injection temperature after heating up in the injection wellbore
    pub fn reservoir_injection_temperature(&self) -> anyhow::Result<f64> {
        Ok(self.injection_temperature()? + self.params.f64("Injection Wellbore Temperature Gain")?)
    }

    fn ramey(&self, reservoir: &Reservoir) -> anyhow::Result<Ramey> {
        let rock_temperature = reservoir.outputs.scalar("Bottom-hole Temperature")?;
        let rock = &reservoir.params;
        let conductivity = rock.f64("Reservoir Thermal Conductivity")?;
        Ok(Ramey {
            rock_temperature,
            surface_temperature: rock.f64("Surface Temperature")?,
            gradient: reservoir.outputs.scalar("Average Gradient")? / 1000.0,
            depth: reservoir.depth()?,
            mass_flow: self.params.f64("Production Flow Rate per Well")?,
            heat_capacity: reservoir.outputs.scalar("Water Heat Capacity")?,
            rock_conductivity: conductivity,
            rock_diffusivity: conductivity
                / (rock.f64("Reservoir Density")? * rock.f64("Reservoir Heat Capacity")?),
            radius: convert(self.params.f64("Production Well Diameter")?, Unit::Inch, Unit::Meter)?
                / 2.0,
        })
    }

    /// Wellhead temperatures from the temperature arriving at the bottom of the production wells
    fn wellbore_drop(
        &self,
        ctx: &WellBoresContext,
        bottom: &Array1<f64>,
    ) -> anyhow::Result<Array1<f64>> {
        if !self.params.bool("Ramey Production Wellbore Model")? {
            let drop = self.params.f64("Production Wellbore Temperature Drop")?;
            return Ok(Array1::from_elem(bottom.len(), drop));
        }
        let ramey = self.ramey(ctx.reservoir)?;
        let years = ctx.time.years();
        Ok(bottom
            .iter()
            .zip(years.iter())
            .map(|(t_res, yr)| {
                ramey.drop(*t_res, yr * ctx.utilization_factor * utils::SECONDS_PER_YEAR)
            })
            .collect())
    }

    /// Outlet temperature of the closed loops before the vertical production section
    fn lateral_outlet(&self, ctx: &WellBoresContext) -> anyhow::Result<Array1<f64>> {
        let reservoir = ctx.reservoir;
        let rock = &reservoir.params;
        let conductivity = rock.f64("Reservoir Thermal Conductivity")?;
        let lateral = Lateral {
            configuration: LoopConfiguration::from_code(self.params.int("Closed-loop Configuration")?)?,
            radius: convert(self.params.f64("Production Well Diameter")?, Unit::Inch, Unit::Meter)?
                / 2.0,
            length: self.params.f64("Nonvertical Length per Multilateral Section")?
                * self.params.usize("Number of Multilateral Sections")?.max(1) as f64,
            rock_conductivity: conductivity,
            rock_diffusivity: conductivity
                / (rock.f64("Reservoir Density")? * rock.f64("Reservoir Heat Capacity")?),
            resistance_factor: self.params.f64("Wellbore Thermal Resistance")?,
        };
        let history = reservoir.outputs.series("Reservoir Temperature History")?;
        let inlet = self.reservoir_injection_temperature()?;
        let flow = self.params.f64("Production Flow Rate per Well")?;
        let cw = reservoir.outputs.scalar("Water Heat Capacity")?;
        let years = ctx.time.years();
        Ok(history
            .iter()
            .zip(years.iter())
            .map(|(t_rock, yr)| {
                lateral.outlet_temperature(
                    *t_rock,
                    inlet,
                    flow,
                    cw,
                    yr * ctx.utilization_factor * utils::SECONDS_PER_YEAR,
                )
            })
            .collect())
    }

    pub fn calculate(&mut self, ctx: &WellBoresContext) -> anyhow::Result<()> {
        self.params.verify_required()?;
        let reservoir = ctx.reservoir;
        let depth = reservoir.depth()?;
        let n_prod = self.production_wells()? as f64;
        let n_inj = self.injection_wells()?;
        let injection_temperature = self.injection_temperature()?;
        let prod_diameter =
            convert(self.params.f64("Production Well Diameter")?, Unit::Inch, Unit::Meter)?;
        let inj_diameter =
            convert(self.params.f64("Injection Well Diameter")?, Unit::Inch, Unit::Meter)?;

        // total produced flow per time step
        let (flow, produced, drop) = match self.kind {
            WellBoresKind::Standard => {
                let bottom = reservoir.outputs.series("Reservoir Temperature History")?.clone();
                let drop = self.wellbore_drop(ctx, &bottom)?;
                (Array1::from_elem(bottom.len(), self.total_flow), &bottom - &drop, drop)
            }
            WellBoresKind::Ags => {
                let bottom = self.lateral_outlet(ctx)?;
                let drop = self.wellbore_drop(ctx, &bottom)?;
                (Array1::from_elem(bottom.len(), self.total_flow), &bottom - &drop, drop)
            }
            WellBoresKind::Sutra => {
                let history = reservoir
                    .sutra_history()
                    .context("SUTRA wellbores need the SUTRA reservoir history")?;
                let produced = history.hot_well_temperature.clone();
                let drop = Array1::zeros(produced.len());
                (history.flow_rate.clone(), produced, drop)
            }
        };
        let mean_flow = utils::ndarrmean(&flow);

        let water_loss = reservoir.water_loss_fraction()?;
        let injection_flow = match (self.kind, n_inj) {
            // each loop returns its own flow
            (WellBoresKind::Ags, _) => mean_flow / n_prod,
            (_, 0) => {
                log::warn!("no injection wells, injection pressure drop ignored");
                0.0
            }
            (_, n) => mean_flow * (1.0 + water_loss) / n as f64,
        };

        let impedance = reservoir.params.f64("Reservoir Impedance")?;
        let wellhead_gauge = (self.params.f64("Production Wellhead Pressure")?
            - physics::ATMOSPHERIC_PRESSURE)
            .max(0.0);
        let rho_inj = water::density(injection_temperature);
        let efficiency = self.params.f64("Production Well Pump Efficiency")?;
        let lateral_length = match self.kind {
            WellBoresKind::Ags => {
                self.params.f64("Nonvertical Length per Multilateral Section")?
                    * self.params.usize("Number of Multilateral Sections")?.max(1) as f64
            }
            _ => 0.0,
        };

        let mut prod_friction = Array1::<f64>::zeros(flow.len());
        let mut inj_friction = Array1::<f64>::zeros(flow.len());
        let mut reservoir_drop = Array1::<f64>::zeros(flow.len());
        let mut overall = Array1::<f64>::zeros(flow.len());
        let mut pumping = Array1::<f64>::zeros(flow.len());
        for i in 0..flow.len() {
            let per_well = flow[i] / n_prod;
            let rho_prod = water::density(produced[i]);
            prod_friction[i] = physics::pipe_pressure_drop(per_well, produced[i], prod_diameter, depth);
            inj_friction[i] = match self.kind {
                WellBoresKind::Ags => physics::pipe_pressure_drop(
                    per_well,
                    0.5 * (produced[i] + injection_temperature),
                    prod_diameter,
                    depth + lateral_length,
                ),
                _ if injection_flow > 0.0 => physics::pipe_pressure_drop(
                    injection_flow * flow[i] / mean_flow.max(1e-9),
                    injection_temperature,
                    inj_diameter,
                    depth,
                ),
                _ => 0.0,
            };
            reservoir_drop[i] = match self.kind {
                WellBoresKind::Ags => 0.0,
                // GPa.s/m**3 * m**3/s, in kPa
                _ => impedance * flow[i] / rho_prod * 1e6,
            };
            let buoyancy = (rho_inj - rho_prod) * physics::GRAVITY * depth / 1000.0;
            overall[i] = (reservoir_drop[i] + prod_friction[i] + inj_friction[i] + wellhead_gauge
                - buoyancy)
                .max(0.0);
            // kPa * m**3/s = kW
            pumping[i] = overall[i] * flow[i] / rho_prod / efficiency;
        }

        let mut errors: ComboErrors<anyhow::Error> = ComboErrors::new();
        errors.check(
            produced.iter().all(|t| t.is_finite()),
            "produced temperature is not finite",
        );
        errors.check(
            produced.iter().all(|t| *t > injection_temperature),
            format!(
                "produced temperature falls to or below the injection temperature of {injection_temperature:.1} degC"
            ),
        );
        errors.check(
            pumping.iter().all(|p| p.is_finite()),
            "pumping power is not finite",
        );
        errors.into_result(self.name())?;

        let outputs = &mut self.outputs;
        outputs.set_scalar("Average Production Temperature", utils::ndarrmean(&produced))?;
        outputs.set_series("Produced Temperature", produced)?;
        outputs.set_series("Production Well Temperature Drop", drop)?;
        outputs.set_scalar("Production Wellbore Pressure Drop", utils::ndarrmean(&prod_friction))?;
        outputs.set_scalar("Injection Wellbore Pressure Drop", utils::ndarrmean(&inj_friction))?;
        outputs.set_scalar("Reservoir Pressure Drop", utils::ndarrmean(&reservoir_drop))?;
        outputs.set_series("Overall Pressure Drop", overall)?;
        outputs.set_series("Pumping Power", pumping)?;
        outputs.set_scalar("Total Flow Rate", mean_flow)?;
        outputs.set_scalar("Injection Flow Rate per Well", injection_flow)?;
        Ok(())
    }
}

impl SubModel for WellBores {
    fn name(&self) -> &str {
        "WellBores"
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

    fn read_parameters(&mut self, input: &InputParameters) -> anyhow::Result<()> {
        self.params.read_from(input);
        self.total_flow = self.params.f64("Production Flow Rate per Well")?
            * self.production_wells()? as f64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservoir::{ReservoirContext, ReservoirKind};

    fn run(
        reservoir_kind: ReservoirKind,
        kind: WellBoresKind,
        input: &InputParameters,
    ) -> anyhow::Result<WellBores> {
        let grid = utils::TimeGrid::new(30, 6)?;
        let mut wellbores = WellBores::new(kind);
        wellbores.read_parameters(input)?;
        let mut reservoir = Reservoir::new(reservoir_kind);
        reservoir.read_parameters(input)?;
        reservoir.calculate(&ReservoirContext {
            time: &grid,
            utilization_factor: 0.9,
            injection_temperature: wellbores.reservoir_injection_temperature()?,
            total_flow: wellbores.total_flow(),
        })?;
        wellbores.calculate(&WellBoresContext {
            reservoir: &reservoir,
            time: &grid,
            utilization_factor: 0.9,
        })?;
        Ok(wellbores)
    }

    #[test]
    fn test_total_flow_derived_at_read() {
        let mut wellbores = WellBores::new(WellBoresKind::Standard);
        wellbores
            .read_parameters(&InputParameters::from_pairs([
                ("Number of Production Wells", "3"),
                ("Production Flow Rate per Well", "40"),
            ]))
            .unwrap();
        assert_eq!(wellbores.total_flow(), 120.0);
    }

    #[test]
    fn test_ramey_drop_is_small_and_positive() {
        let wellbores = run(
            ReservoirKind::AnnualPercentage,
            WellBoresKind::Standard,
            &InputParameters::default(),
        )
        .unwrap();
        assert!(wellbores.outputs.unset().is_empty());
        let drop = wellbores.outputs.series("Production Well Temperature Drop").unwrap();
        assert!(drop.iter().all(|d| *d > 0.0 && *d < 20.0), "{drop:?}");
        let produced = wellbores.outputs.series("Produced Temperature").unwrap();
        assert!(produced[0] < 165.0 && produced[0] > 145.0);
        assert!(wellbores.outputs.series("Pumping Power").unwrap().iter().all(|p| *p > 0.0));
    }

    #[test]
    fn test_constant_drop_without_ramey() {
        let input = InputParameters::from_pairs([
            ("Ramey Production Wellbore Model", "false"),
            ("Production Wellbore Temperature Drop", "3"),
        ]);
        let wellbores = run(ReservoirKind::Cylindrical, WellBoresKind::Standard, &input).unwrap();
        let produced = wellbores.outputs.series("Produced Temperature").unwrap();
        assert!(produced.iter().all(|t| t.approx_eq(&162.0, 1e-9)));
    }

    #[test]
    fn test_closed_loop_has_no_reservoir_pressure_drop() {
        let input = InputParameters::from_pairs([("Production Flow Rate per Well", "10")]);
        let wellbores = run(ReservoirKind::Cylindrical, WellBoresKind::Ags, &input).unwrap();
        assert_eq!(wellbores.outputs.scalar("Reservoir Pressure Drop").unwrap(), 0.0);
        let produced = wellbores.outputs.series("Produced Temperature").unwrap();
        assert!(produced.iter().all(|t| *t > 70.0 && *t < 165.0));
    }
}
