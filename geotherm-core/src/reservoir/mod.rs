//! Reservoir sub-model: rock temperature, geometry and production temperature history.

use crate::imports::*;
use crate::parameter::non_physical;
use crate::physics::{self, water};

mod drawdown;
mod profile;
mod simulator;

pub use drawdown::DrawdownInputs;
pub use profile::{read_temperature_profile, SutraHistory};
pub use simulator::{ExternalProcess, ReservoirSimulator, SimulationRequest};

/// Reservoir variant, selected by the `Reservoir Model` code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservoirKind {
    /// Uniform rock temperature, used by closed-loop (AGS) wells
    Cylindrical,
    /// Gringarten parallel fractures
    MultipleParallelFractures,
    LinearHeatSweep,
    /// Single fracture with an m/A drawdown parameter
    SingleFracture,
    /// Linear decline by a fixed percentage per year
    #[default]
    AnnualPercentage,
    UserProvidedProfile,
    /// External simulator, TOUGH2 or compatible
    Tough2,
    /// SUTRA heat storage histories
    Sutra,
}

impl ReservoirKind {
    pub fn from_code(code: i64) -> anyhow::Result<Self> {
        Ok(match code {
            0 => Self::Cylindrical,
            1 => Self::MultipleParallelFractures,
            2 => Self::LinearHeatSweep,
            3 => Self::SingleFracture,
            4 => Self::AnnualPercentage,
            5 => Self::UserProvidedProfile,
            6 => Self::Tough2,
            7 => Self::Sutra,
            _ => bail!("unknown reservoir model code {code}"),
        })
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Cylindrical => 0,
            Self::MultipleParallelFractures => 1,
            Self::LinearHeatSweep => 2,
            Self::SingleFracture => 3,
            Self::AnnualPercentage => 4,
            Self::UserProvidedProfile => 5,
            Self::Tough2 => 6,
            Self::Sutra => 7,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Cylindrical => "Cylindrical reservoir model",
            Self::MultipleParallelFractures => "Multiple parallel fractures model (Gringarten)",
            Self::LinearHeatSweep => "1-D linear heat sweep model",
            Self::SingleFracture => "Single fracture m/A thermal drawdown model",
            Self::AnnualPercentage => "Annual percentage thermal drawdown model",
            Self::UserProvidedProfile => "User-provided reservoir temperature profile",
            Self::Tough2 => "TOUGH2 reservoir simulator",
            Self::Sutra => "SUTRA heat storage model",
        }
    }
}

/// Fracture and volume geometry derived from the volume option and fracture shape
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// m**2
    pub fracture_area: f64,
    /// m
    pub fracture_height: f64,
    /// m
    pub fracture_width: f64,
    pub fracture_count: f64,
    /// m
    pub fracture_separation: f64,
    /// m**3
    pub volume: f64,
}

impl Geometry {
    fn from_params(params: &ParameterDict) -> anyhow::Result<Self> {
        let (area, height, width) = match params.int("Fracture Shape")? {
            // circular, area given
            1 => {
                let area = params.f64("Fracture Area")?;
                let diameter = (4.0 * area / std::f64::consts::PI).sqrt();
                (area, diameter, diameter)
            }
            // circular, diameter given
            2 => {
                let diameter = params.f64("Fracture Height")?;
                (std::f64::consts::PI * diameter * diameter / 4.0, diameter, diameter)
            }
            // square
            3 => {
                let height = params.f64("Fracture Height")?;
                (height * height, height, height)
            }
            _ => {
                let height = params.f64("Fracture Height")?;
                let width = params.f64("Fracture Width")?;
                (height * width, height, width)
            }
        };
        let mut count = params.int("Number of Fractures")? as f64;
        let mut separation = params.f64("Fracture Separation")?;
        let mut volume = params.f64("Reservoir Volume")?;
        match params.int("Reservoir Volume Option")? {
            1 => volume = (count - 1.0).max(1.0) * separation * area,
            2 => separation = volume / ((count - 1.0).max(1.0) * area),
            3 => count = (volume / (separation * area)).round() + 1.0,
            _ => {}
        }
        Ok(Self {
            fracture_area: area,
            fracture_height: height,
            fracture_width: width,
            fracture_count: count,
            fracture_separation: separation,
            volume,
        })
    }
}

/// Upstream values the reservoir calculation depends on
#[derive(Debug, Clone, Copy)]
pub struct ReservoirContext<'a> {
    pub time: &'a utils::TimeGrid,
    /// Fraction of time the plant operates, 0..1
    pub utilization_factor: f64,
    pub injection_temperature: f64,
    /// Total produced mass flow, kg/s
    pub total_flow: f64,
}

#[derive(Debug)]
pub struct Reservoir {
    pub kind: ReservoirKind,
    pub params: ParameterDict,
    pub outputs: OutputParameterDict,
    geometry: Geometry,
    simulator: Box<dyn ReservoirSimulator>,
    sutra: Option<SutraHistory>,
}

/// State computed before any variant-specific drawdown
struct RockState {
    rock_temperature: f64,
    water_density: f64,
    water_heat_capacity: f64,
}

impl Reservoir {
    pub fn new(kind: ReservoirKind) -> Self {
        let mut params = ParameterDict::new()
            .with(Parameter::int("Reservoir Model", kind.code(), 0, 7))
            .with(Parameter::float("Reservoir Depth", 3.0, Unit::Kilometer, 0.1, 15.0).required())
            .with(Parameter::int("Number of Segments", 1, 1, 4))
            .with(Parameter::list("Gradients", "Gradient", vec![50.0], Unit::CelsiusPerKm, 0.0, 500.0))
            .with(Parameter::list("Thicknesses", "Thickness", vec![], Unit::Kilometer, 0.01, 100.0))
            .with(Parameter::float("Maximum Temperature", 400.0, Unit::Celsius, 50.0, 1000.0))
            .with(Parameter::float("Surface Temperature", 15.0, Unit::Celsius, -50.0, 50.0))
            .with(Parameter::float("Reservoir Heat Capacity", 1000.0, Unit::JPerKgK, 100.0, 10000.0))
            .with(Parameter::float("Reservoir Density", 2700.0, Unit::KgPerCubicMeter, 100.0, 10000.0))
            .with(Parameter::float("Reservoir Thermal Conductivity", 3.0, Unit::WPerMK, 0.01, 100.0))
            .with(Parameter::float("Reservoir Porosity", 4.0, Unit::Percent, 0.001, 99.0))
            .with(Parameter::int("Reservoir Volume Option", 3, 1, 4))
            .with(Parameter::float("Reservoir Volume", 1.25e8, Unit::CubicMeter, 10.0, 1e12))
            .with(Parameter::int("Number of Fractures", 10, 1, 150))
            .with(Parameter::float("Fracture Separation", 50.0, Unit::Meter, 1.0, 1e4))
            .with(Parameter::int("Fracture Shape", 1, 1, 4))
            .with(Parameter::float("Fracture Area", 250_000.0, Unit::SquareMeter, 1.0, 1e8))
            .with(Parameter::float("Fracture Height", 500.0, Unit::Meter, 1.0, 1e4))
            .with(Parameter::float("Fracture Width", 500.0, Unit::Meter, 1.0, 1e4))
            .with(Parameter::float("Water Loss Fraction", 0.0, Unit::Tenth, 0.0, 0.99))
            .with(Parameter::float(
                "Reservoir Impedance",
                0.1,
                Unit::GpaSecPerCubicMeter,
                1e-4,
                1e4,
            ));
        match kind {
            ReservoirKind::AnnualPercentage => params.insert(
                Parameter::float("Drawdown Parameter", 0.005, Unit::PerYear, 0.0, 0.2)
                    .tooltip("Fractional decline of the production temperature per year"),
            ),
            ReservoirKind::SingleFracture => params.insert(
                Parameter::float("Drawdown Parameter", 1e-4, Unit::KgPerSecPerSquareMeter, 0.0, 0.2)
                    .tooltip("Mass loading m/A of the fracture"),
            ),
            ReservoirKind::Cylindrical => {
                params.insert(Parameter::float(
                    "Cylindrical Reservoir Input Depth",
                    3.0,
                    Unit::Kilometer,
                    0.1,
                    15.0,
                ));
                params.insert(Parameter::float(
                    "Cylindrical Reservoir Output Depth",
                    3.0,
                    Unit::Kilometer,
                    0.1,
                    15.0,
                ));
                params.insert(Parameter::float(
                    "Cylindrical Reservoir Length",
                    4.0,
                    Unit::Kilometer,
                    0.01,
                    100.0,
                ));
                params.insert(Parameter::float(
                    "Cylindrical Reservoir Radius of Effect",
                    30.0,
                    Unit::Meter,
                    0.1,
                    1e4,
                ));
            }
            ReservoirKind::UserProvidedProfile => {
                params.insert(Parameter::required_string("Reservoir Output File Name"));
                params.insert(Parameter::int("Reservoir Output Time Steps Per Year", 1, 1, 100));
            }
            ReservoirKind::Tough2 => {
                params.insert(Parameter::required_string("TOUGH2 Executable Path"));
                params.insert(Parameter::string("TOUGH2 Model/File Name", "Doublet"));
            }
            ReservoirKind::Sutra => {
                params.insert(Parameter::required_string("SUTRA Output Budget File Name"));
                params.insert(Parameter::required_string("SUTRA Output Well File Name"));
            }
            ReservoirKind::MultipleParallelFractures | ReservoirKind::LinearHeatSweep => {}
        }

        let mut outputs = OutputParameterDict::new()
            .with(OutputParameter::new("Bottom-hole Temperature", Unit::Celsius))
            .with(OutputParameter::new("Average Gradient", Unit::CelsiusPerKm))
            .with(OutputParameter::new("Initial Reservoir Heat Content", Unit::Megajoule).preferred(Unit::Petajoule))
            .with(OutputParameter::new("Reservoir Volume", Unit::CubicMeter))
            .with(OutputParameter::new("Fracture Area", Unit::SquareMeter))
            .with(OutputParameter::new("Fracture Height", Unit::Meter))
            .with(OutputParameter::new("Fracture Width", Unit::Meter))
            .with(OutputParameter::new("Number of Fractures", Unit::Dimensionless))
            .with(OutputParameter::new("Fracture Separation", Unit::Meter))
            .with(OutputParameter::new("Reservoir Temperature History", Unit::Celsius))
            .with(OutputParameter::new("Water Density", Unit::KgPerCubicMeter))
            .with(OutputParameter::new("Water Heat Capacity", Unit::JPerKgK))
            .with(OutputParameter::new("Time Vector", Unit::Year))
            .with(OutputParameter::new("Hydrostatic Pressure", Unit::Kilopascal));
        if kind == ReservoirKind::Sutra {
            outputs.declare(OutputParameter::new("SUTRA Heat Stored", Unit::Kilowatt).preferred(Unit::Megawatt));
            outputs.declare(OutputParameter::new("SUTRA Heat Extracted", Unit::Kilowatt).preferred(Unit::Megawatt));
        }

        Self {
            kind,
            params,
            outputs,
            geometry: Geometry::default(),
            simulator: Box::new(ExternalProcess),
            sutra: None,
        }
    }

    /// Replaces the external simulator used by the TOUGH2 variant
    pub fn with_simulator(mut self, simulator: Box<dyn ReservoirSimulator>) -> Self {
        self.simulator = simulator;
        self
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Reservoir depth in m
    pub fn depth(&self) -> anyhow::Result<f64> {
        Ok(self.params.f64("Reservoir Depth")? * 1000.0)
    }

    /// Fraction 0..1
    pub fn water_loss_fraction(&self) -> anyhow::Result<f64> {
        self.params.f64("Water Loss Fraction")
    }

    pub fn sutra_history(&self) -> Option<&SutraHistory> {
        self.sutra.as_ref()
    }

    /// Rock temperature at depth from the layered gradients, capped at the maximum temperature
    fn rock_temperature(&self) -> anyhow::Result<f64> {
        let depth = self.params.f64("Reservoir Depth")?;
        let surface = self.params.f64("Surface Temperature")?;
        let gradients = self.params.list("Gradients")?;
        let thicknesses = self.params.list("Thicknesses")?;
        ensure!(!gradients.is_empty(), "at least one gradient is needed");
        let segments = self.params.usize("Number of Segments")?;
        if segments > gradients.len() {
            log::warn!(
                "{segments} segments but {} gradients, extending the last gradient",
                gradients.len()
            );
        }
        let mut temperature = surface;
        let mut remaining = depth;
        for segment in 0..segments {
            let gradient = gradients[segment.min(gradients.len() - 1)];
            let thickness = match thicknesses.get(segment) {
                Some(thickness) if segment + 1 < segments => thickness.min(remaining),
                _ => remaining,
            };
            temperature += gradient * thickness;
            remaining -= thickness;
            if remaining <= 0.0 {
                break;
            }
        }
        Ok(temperature.min(self.params.f64("Maximum Temperature")?))
    }

    fn prologue(&mut self, ctx: &ReservoirContext) -> anyhow::Result<RockState> {
        let rock_temperature = self.rock_temperature()?;
        let depth = self.params.f64("Reservoir Depth")?;
        let surface = self.params.f64("Surface Temperature")?;
        let mean_temperature = 0.5 * (rock_temperature + ctx.injection_temperature);
        let state = RockState {
            rock_temperature,
            water_density: water::density(mean_temperature),
            water_heat_capacity: water::heat_capacity(mean_temperature),
        };
        let heat_content = self.geometry.volume
            * self.params.f64("Reservoir Density")?
            * self.params.f64("Reservoir Heat Capacity")?
            * (rock_temperature - ctx.injection_temperature)
            / 1e6;

        let outputs = &mut self.outputs;
        outputs.set_scalar("Bottom-hole Temperature", rock_temperature)?;
        outputs.set_scalar("Average Gradient", (rock_temperature - surface) / depth)?;
        outputs.set_scalar("Initial Reservoir Heat Content", heat_content)?;
        outputs.set_scalar("Reservoir Volume", self.geometry.volume)?;
        outputs.set_scalar("Fracture Area", self.geometry.fracture_area)?;
        outputs.set_scalar("Fracture Height", self.geometry.fracture_height)?;
        outputs.set_scalar("Fracture Width", self.geometry.fracture_width)?;
        outputs.set_scalar("Number of Fractures", self.geometry.fracture_count)?;
        outputs.set_scalar("Fracture Separation", self.geometry.fracture_separation)?;
        outputs.set_scalar("Water Density", state.water_density)?;
        outputs.set_scalar("Water Heat Capacity", state.water_heat_capacity)?;
        outputs.set_scalar(
            "Hydrostatic Pressure",
            // depth in km gives kPa directly
            physics::ATMOSPHERIC_PRESSURE + state.water_density * physics::GRAVITY * depth,
        )?;
        Ok(state)
    }

    /// Variant-specific production temperature history on the time grid
    fn drawdown(&mut self, ctx: &ReservoirContext, state: &RockState) -> anyhow::Result<Array1<f64>> {
        let years = ctx.time.years();
        let t_op = &years * ctx.utilization_factor;
        let inputs = DrawdownInputs {
            t_op: &t_op,
            rock_temperature: state.rock_temperature,
            injection_temperature: ctx.injection_temperature,
            total_flow: ctx.total_flow,
            water_density: state.water_density,
            water_heat_capacity: state.water_heat_capacity,
            rock_density: self.params.f64("Reservoir Density")?,
            rock_heat_capacity: self.params.f64("Reservoir Heat Capacity")?,
            rock_conductivity: self.params.f64("Reservoir Thermal Conductivity")?,
            porosity: self.params.f64("Reservoir Porosity")? / 100.0,
            geometry: &self.geometry,
        };
        Ok(match self.kind {
            ReservoirKind::Cylindrical => Array1::from_elem(t_op.len(), state.rock_temperature),
            ReservoirKind::AnnualPercentage => {
                drawdown::annual_percentage(&inputs, self.params.f64("Drawdown Parameter")?)
            }
            ReservoirKind::SingleFracture => {
                drawdown::single_fracture(&inputs, self.params.f64("Drawdown Parameter")?)
            }
            ReservoirKind::MultipleParallelFractures => {
                drawdown::multiple_parallel_fractures(&inputs)
            }
            ReservoirKind::LinearHeatSweep => drawdown::linear_heat_sweep(&inputs),
            ReservoirKind::UserProvidedProfile => {
                let profile =
                    read_temperature_profile(self.params.str("Reservoir Output File Name")?)?;
                let steps = if self
                    .params
                    .provided_and_valid("Reservoir Output Time Steps Per Year")
                {
                    self.params.usize("Reservoir Output Time Steps Per Year")?
                } else {
                    ctx.time.steps_per_year
                };
                profile::profile_on_grid(&profile, steps, &t_op)?
            }
            ReservoirKind::Tough2 => {
                let request = SimulationRequest {
                    executable: PathBuf::from(self.params.str("TOUGH2 Executable Path")?),
                    model_name: self.params.str("TOUGH2 Model/File Name")?.to_string(),
                    rock_temperature: state.rock_temperature,
                    injection_temperature: ctx.injection_temperature,
                    total_flow: ctx.total_flow,
                    depth: self.depth()?,
                    volume: self.geometry.volume,
                    rock_conductivity: inputs.rock_conductivity,
                    operating_years: t_op.last().copied().unwrap_or_default(),
                };
                let (times, temperatures) = self
                    .simulator
                    .simulate(&request)
                    .with_context(|| format_dbg!(request.executable))?;
                t_op.iter()
                    .map(|t| utils::interpolate(*t, &times, &temperatures, false))
                    .collect::<anyhow::Result<Array1<f64>>>()?
            }
            ReservoirKind::Sutra => {
                let history = SutraHistory::from_files(
                    self.params.str("SUTRA Output Well File Name")?,
                    self.params.str("SUTRA Output Budget File Name")?,
                    &years,
                )?;
                let hot = history.hot_well_temperature.clone();
                self.outputs
                    .set_series("SUTRA Heat Stored", history.heat_stored.clone())?;
                self.outputs
                    .set_series("SUTRA Heat Extracted", history.heat_extracted.clone())?;
                self.sutra = Some(history);
                hot
            }
        })
    }

    pub fn calculate(&mut self, ctx: &ReservoirContext) -> anyhow::Result<()> {
        self.params
            .verify_required()
            .with_context(|| format!("{} ({})", self.name(), self.kind.description()))?;
        let state = self.prologue(ctx)?;
        let history = self.drawdown(ctx, &state)?;

        let mut errors: ComboErrors<anyhow::Error> = ComboErrors::new();
        errors.check(
            history.len() == ctx.time.len(),
            format!(
                "temperature history has {} points, expected {}",
                history.len(),
                ctx.time.len()
            ),
        );
        errors.check(
            history.iter().all(|t| t.is_finite()),
            "temperature history is not finite",
        );
        errors.check(
            state.rock_temperature > ctx.injection_temperature,
            format!(
                "rock temperature {:.1} degC does not exceed injection temperature {:.1} degC",
                state.rock_temperature, ctx.injection_temperature
            ),
        );
        errors.into_result(self.name())?;
        if self.geometry.volume <= 0.0 {
            return Err(non_physical(self.name(), "reservoir volume is not positive"));
        }

        self.outputs
            .set_series("Reservoir Temperature History", history)?;
        self.outputs.set_series("Time Vector", ctx.time.years())?;
        log::debug!(
            "{}",
            format_dbg!(self.outputs.scalar("Bottom-hole Temperature")?)
        );
        Ok(())
    }
}

impl SubModel for Reservoir {
    fn name(&self) -> &str {
        "Reservoir"
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
        self.geometry = Geometry::from_params(&self.params)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeSimulator;

    impl ReservoirSimulator for FakeSimulator {
        fn simulate(&self, request: &SimulationRequest) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
            Ok((
                vec![0.0, 100.0],
                vec![request.rock_temperature, request.rock_temperature - 100.0],
            ))
        }
    }

    fn context(grid: &utils::TimeGrid) -> ReservoirContext {
        ReservoirContext {
            time: grid,
            utilization_factor: 0.9,
            injection_temperature: 70.0,
            total_flow: 100.0,
        }
    }

    fn calculated(kind: ReservoirKind, input: &InputParameters) -> anyhow::Result<Reservoir> {
        let grid = utils::TimeGrid::new(30, 6)?;
        let mut reservoir = Reservoir::new(kind).with_simulator(Box::new(FakeSimulator));
        reservoir.read_parameters(input)?;
        reservoir.calculate(&context(&grid))?;
        Ok(reservoir)
    }

    #[test]
    fn test_default_run_sets_every_output() {
        let reservoir = calculated(ReservoirKind::default(), &InputParameters::default()).unwrap();
        assert!(reservoir.outputs.unset().is_empty(), "{:?}", reservoir.outputs.unset());
        assert!(reservoir
            .outputs
            .scalar("Bottom-hole Temperature")
            .unwrap()
            .approx_eq(&165.0, 1e-9));
        assert_eq!(reservoir.outputs.series("Reservoir Temperature History").unwrap().len(), 181);
    }

    #[test]
    fn test_layered_gradients_and_temperature_cap() {
        let input = InputParameters::from_pairs([
            ("Number of Segments", "2"),
            ("Gradient 1", "40"),
            ("Gradient 2", "60"),
            ("Thickness 1", "1"),
            ("Reservoir Depth", "3"),
        ]);
        let reservoir = calculated(ReservoirKind::AnnualPercentage, &input).unwrap();
        // 15 + 40 * 1 + 60 * 2
        assert!(reservoir
            .outputs
            .scalar("Bottom-hole Temperature")
            .unwrap()
            .approx_eq(&175.0, 1e-9));

        let capped = InputParameters::from_pairs([("Maximum Temperature", "120")]);
        let reservoir = calculated(ReservoirKind::AnnualPercentage, &capped).unwrap();
        assert_eq!(reservoir.outputs.scalar("Bottom-hole Temperature").unwrap(), 120.0);
    }

    #[test]
    fn test_volume_options() {
        let input = InputParameters::from_pairs([
            ("Reservoir Volume Option", "1"),
            ("Number of Fractures", "11"),
            ("Fracture Separation", "40"),
        ]);
        let reservoir = calculated(ReservoirKind::MultipleParallelFractures, &input).unwrap();
        assert!(reservoir.geometry().volume.approx_eq(&(10.0 * 40.0 * 250_000.0), 1e-9));

        let reservoir = calculated(ReservoirKind::MultipleParallelFractures, &InputParameters::default()).unwrap();
        // option 3: 1.25e8 / (50 * 250000) + 1
        assert_eq!(reservoir.geometry().fracture_count, 11.0);
    }

    #[test]
    fn test_every_analytic_variant_calculates() {
        for kind in [
            ReservoirKind::Cylindrical,
            ReservoirKind::MultipleParallelFractures,
            ReservoirKind::LinearHeatSweep,
            ReservoirKind::SingleFracture,
            ReservoirKind::AnnualPercentage,
        ] {
            let reservoir = calculated(kind, &InputParameters::default()).unwrap();
            let history = reservoir.outputs.series("Reservoir Temperature History").unwrap();
            assert!(history[0].approx_eq(&165.0, 1e-9), "{kind:?}");
            assert!(history.iter().all(|t| *t <= 165.0 + 1e-6 && *t >= 70.0 - 1e-6), "{kind:?}");
        }
    }

    #[test]
    fn test_tough2_uses_simulator() {
        let input = InputParameters::from_pairs([("TOUGH2 Executable Path", "/opt/tough2")]);
        let reservoir = calculated(ReservoirKind::Tough2, &input).unwrap();
        let history = reservoir.outputs.series("Reservoir Temperature History").unwrap();
        // 30 yr at 0.9 utilization = 27 operating years, 1 degC per year
        assert!(history[180].approx_eq(&(165.0 - 27.0), 1e-9));
    }

    #[test]
    fn test_tough2_without_executable_is_fatal() {
        let err = calculated(ReservoirKind::Tough2, &InputParameters::default()).unwrap_err();
        assert!(err.chain().any(|cause| cause.to_string().contains("TOUGH2 Executable Path")));
    }

    #[test]
    fn test_user_provided_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.csv");
        std::fs::write(&path, "160\n150\n").unwrap();
        let input = InputParameters::from_pairs([
            ("Reservoir Output File Name", path.to_str().unwrap()),
            ("Reservoir Output Time Steps Per Year", "1"),
        ]);
        let reservoir = calculated(ReservoirKind::UserProvidedProfile, &input).unwrap();
        let history = reservoir.outputs.series("Reservoir Temperature History").unwrap();
        assert_eq!(history[0], 160.0);
        assert_eq!(history[180], 150.0);
    }
}
