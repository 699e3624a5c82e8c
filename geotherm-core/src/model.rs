//! Run orchestrator: selects one variant of each sub-model family from the input deck, reads
//! their parameters and calculates them in dependency order.

use crate::addons::{AddOns, Ccus, SDacGt};
use crate::economics::{EconomicModel, Economics, EconomicsContext, EconomicsKind};
use crate::imports::*;
use crate::outputs::{Outputs, RunResult};
use crate::reservoir::{Reservoir, ReservoirContext, ReservoirKind, ReservoirSimulator};
use crate::surface_plant::{
    EndUseOption, PowerPlantType, SurfacePlant, SurfacePlantContext, SurfacePlantKind, END_USE_CODES,
};
use crate::units::Unit;
use crate::wellbores::{WellBores, WellBoresContext, WellBoresKind};

/// Lifecycle of a [Model]; each stage can only be entered from the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunStage {
    Ingested,
    VariantSelected,
    AddOnsResolved,
    ParametersRead,
    Calculated,
}

/// One sub-model calculation, recorded in the order it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalcStep {
    DistrictHeatingDemand,
    Reservoir,
    WellBores,
    SurfacePlant,
    Economics,
    AddOns,
    Ccus,
    SDacGt,
}

/// Utilization factor one reservoir/wellbores/surface plant pass ran with, and the one the
/// surface plant reported afterwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationPass {
    pub applied: f64,
    pub reported: f64,
}

/// Selector values read from the deck before any sub-model is constructed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    pub reservoir: ReservoirKind,
    pub wellbores: WellBoresKind,
    pub economics: EconomicsKind,
    pub end_use: EndUseOption,
    pub plant_type: PowerPlantType,
    pub economic_model: EconomicModel,
    pub addons: bool,
    pub ccus: bool,
    pub sdacgt: bool,
}

impl Selectors {
    /// Selector parameters, read with the same soft-fail policy as every other parameter
    fn parameters() -> ParameterDict {
        ParameterDict::new()
            .with(Parameter::int(
                "Reservoir Model",
                ReservoirKind::default().code(),
                0,
                7,
            ))
            .with(Parameter::boolean("Is AGS", false))
            .with(Parameter::int_allowable(
                "End-Use Option",
                EndUseOption::default().code(),
                &END_USE_CODES,
            ))
            .with(Parameter::int(
                "Power Plant Type",
                PowerPlantType::default().code(),
                1,
                4,
            ))
            .with(Parameter::int(
                "Economic Model",
                EconomicModel::default().code(),
                1,
                4,
            ))
            .with(Parameter::string("S-DAC-GT", "Off"))
    }

    /// Resolves the variant of every family.  Precedence: SUTRA (reservoir model 7 with end-use
    /// 9) over AGS (`Is AGS`) over the `Reservoir Model` code.
    pub fn from_input(input: &InputParameters) -> anyhow::Result<Self> {
        let mut params = Self::parameters();
        params.read_from(input);
        let mut reservoir = ReservoirKind::from_code(params.int("Reservoir Model")?)?;
        let mut end_use = EndUseOption::from_code(params.int("End-Use Option")?)?;
        let sutra_storage = end_use == EndUseOption::SutraStorage;

        let (wellbores, economics) = if reservoir == ReservoirKind::Sutra && sutra_storage {
            (WellBoresKind::Sutra, EconomicsKind::Sutra)
        } else if params.bool("Is AGS")? {
            if reservoir != ReservoirKind::Cylindrical {
                log::info!("closed-loop wells use the cylindrical reservoir in place of {reservoir:?}");
                reservoir = ReservoirKind::Cylindrical;
            }
            (WellBoresKind::Ags, EconomicsKind::Ags)
        } else {
            (WellBoresKind::Standard, EconomicsKind::Standard)
        };
        if sutra_storage && wellbores != WellBoresKind::Sutra {
            log::warn!("SUTRA storage end use needs `Reservoir Model, 7`; falling back to direct-use heat");
            end_use = EndUseOption::DirectUseHeat;
        }

        Ok(Self {
            reservoir,
            wellbores,
            economics,
            end_use,
            plant_type: PowerPlantType::from_code(params.int("Power Plant Type")?)?,
            economic_model: EconomicModel::from_code(params.int("Economic Model")?)?,
            addons: input.contains("AddOn Nickname 1"),
            ccus: input.contains("Ending CCUS Credit Value"),
            sdacgt: params.str("S-DAC-GT")?.eq_ignore_ascii_case("on"),
        })
    }
}

/// One simulation: the input deck, the four required sub-models, the optional add-ons and the
/// output renderer
#[derive(Debug)]
pub struct Model {
    pub input: InputParameters,
    pub selectors: Selectors,
    pub reservoir: Reservoir,
    pub wellbores: WellBores,
    pub surface_plant: SurfacePlant,
    pub economics: Economics,
    pub addons: Option<AddOns>,
    pub ccus: Option<Ccus>,
    pub sdacgt: Option<SDacGt>,
    pub outputs: Outputs,
    stage: RunStage,
    trace: Vec<CalcStep>,
    utilization_passes: Vec<UtilizationPass>,
}

impl Model {
    /// Selects and constructs every variant for `input`.  A selector that cannot be resolved
    /// falls back to the default variant with a warning.
    pub fn new(input: InputParameters) -> Self {
        log::info!("ingested {} input entries", input.len());
        let selectors = Selectors::from_input(&input).unwrap_or_else(|err| {
            log::warn!("{err:#}; using the default variants");
            Selectors::default()
        });
        Self::with_selectors(input, selectors)
    }

    /// Reads the deck at `path`, or runs on defaults when it does not exist
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self::new(InputParameters::from_path(path)?))
    }

    pub fn with_selectors(input: InputParameters, selectors: Selectors) -> Self {
        log::info!(
            "variants selected: {} reservoir, {:?} wellbores, {} end use",
            selectors.reservoir.description(),
            selectors.wellbores,
            selectors.end_use.description()
        );
        let end_use = selectors.end_use;
        let model = Self {
            reservoir: Reservoir::new(selectors.reservoir),
            wellbores: WellBores::new(selectors.wellbores),
            surface_plant: SurfacePlant::new(end_use, selectors.plant_type),
            economics: Economics::new(selectors.economics, selectors.economic_model, end_use),
            addons: selectors.addons.then(|| AddOns::new(end_use)),
            ccus: selectors.ccus.then(|| Ccus::new(end_use)),
            sdacgt: selectors.sdacgt.then(|| SDacGt::new(end_use)),
            outputs: Outputs::new(),
            input,
            selectors,
            stage: RunStage::AddOnsResolved,
            trace: vec![],
            utilization_passes: vec![],
        };
        log::info!(
            "add-ons resolved: {:?}",
            model.active_modules().iter().skip(4).map(|m| m.name()).collect::<Vec<_>>()
        );
        model
    }

    /// Replaces the external simulator used by the TOUGH2 reservoir
    pub fn with_reservoir_simulator(mut self, simulator: Box<dyn ReservoirSimulator>) -> Self {
        self.reservoir = self.reservoir.with_simulator(simulator);
        self
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Sub-model calculations in the order they ran
    pub fn trace(&self) -> &[CalcStep] {
        &self.trace
    }

    /// One entry per reservoir/wellbores/surface plant pass, in the order they ran
    pub fn utilization_passes(&self) -> &[UtilizationPass] {
        &self.utilization_passes
    }

    /// Every active sub-model and add-on in calculation order
    pub fn active_modules(&self) -> Vec<&dyn SubModel> {
        let mut modules: Vec<&dyn SubModel> = vec![
            &self.reservoir,
            &self.wellbores,
            &self.surface_plant,
            &self.economics,
        ];
        if let Some(addons) = &self.addons {
            modules.push(addons);
        }
        if let Some(ccus) = &self.ccus {
            modules.push(ccus);
        }
        if let Some(sdacgt) = &self.sdacgt {
            modules.push(sdacgt);
        }
        modules
    }

    fn active_modules_mut(&mut self) -> Vec<&mut dyn SubModel> {
        let mut modules: Vec<&mut dyn SubModel> = vec![
            &mut self.reservoir,
            &mut self.wellbores,
            &mut self.surface_plant,
            &mut self.economics,
            &mut self.outputs,
        ];
        if let Some(addons) = &mut self.addons {
            modules.push(addons);
        }
        if let Some(ccus) = &mut self.ccus {
            modules.push(ccus);
        }
        if let Some(sdacgt) = &mut self.sdacgt {
            modules.push(sdacgt);
        }
        modules
    }

    /// Reads the deck into every sub-model, then applies `Units:` overrides to their outputs
    pub fn read_parameters(&mut self) -> anyhow::Result<()> {
        ensure!(
            self.stage == RunStage::AddOnsResolved,
            "parameters can only be read once, before calculating (stage {:?})",
            self.stage
        );
        let input = std::mem::take(&mut self.input);
        for module in self.active_modules_mut() {
            let name = module.name().to_string();
            module
                .read_parameters(&input)
                .with_context(|| format!("reading {name} parameters"))?;
        }
        self.input = input;
        self.apply_unit_overrides();
        self.stage = RunStage::ParametersRead;
        log::info!("parameters read");
        Ok(())
    }

    fn apply_unit_overrides(&mut self) {
        let overrides: Vec<(String, String)> = self
            .input
            .unit_overrides()
            .into_iter()
            .map(|(output, unit)| (output.to_string(), unit.to_string()))
            .collect();
        for (output, token) in overrides {
            let unit = match Unit::from_symbol(&token) {
                Ok(unit) => unit,
                Err(err) => {
                    log::warn!("ignoring units override for `{output}`: {err}");
                    continue;
                }
            };
            let mut applied = false;
            for module in self.active_modules_mut() {
                let outputs = module.output_parameters_mut();
                if outputs.contains(&output) {
                    match outputs.set_preferred_units(&output, unit) {
                        Ok(()) => applied = true,
                        Err(err) => log::warn!("ignoring units override: {err:#}"),
                    }
                }
            }
            if !applied {
                log::warn!("units override names no output `{output}` of this run");
            }
        }
    }

    /// Reservoir, wellbores and surface plant, with the utilization factor the surface plant
    /// currently reports
    fn calculate_subsurface_and_plant(&mut self) -> anyhow::Result<()> {
        let grid = self.surface_plant.time_grid()?;
        let utilization_factor = self.surface_plant.utilization_factor()?;
        self.reservoir
            .calculate(&ReservoirContext {
                time: &grid,
                utilization_factor,
                injection_temperature: self.wellbores.reservoir_injection_temperature()?,
                total_flow: self.wellbores.total_flow(),
            })
            .context("Reservoir calculation failed")?;
        self.trace.push(CalcStep::Reservoir);
        self.wellbores
            .calculate(&WellBoresContext {
                reservoir: &self.reservoir,
                time: &grid,
                utilization_factor,
            })
            .context("WellBores calculation failed")?;
        self.trace.push(CalcStep::WellBores);
        self.surface_plant
            .calculate(&SurfacePlantContext {
                reservoir: &self.reservoir,
                wellbores: &self.wellbores,
            })
            .context("SurfacePlant calculation failed")?;
        self.trace.push(CalcStep::SurfacePlant);
        self.utilization_passes.push(UtilizationPass {
            applied: utilization_factor,
            reported: self.surface_plant.utilization_factor()?,
        });
        Ok(())
    }

    /// Calculates every sub-model in dependency order.  District heating runs a demand pre-pass
    /// and then the reservoir, wellbores and surface plant a second time so that they see the
    /// utilization factor the demand limited the plant to.  Any error aborts the run.
    pub fn calculate(&mut self) -> anyhow::Result<()> {
        ensure!(
            self.stage == RunStage::ParametersRead,
            "calculate needs freshly read parameters (stage {:?})",
            self.stage
        );
        let district_heating = self.surface_plant.kind == SurfacePlantKind::DistrictHeating;
        if district_heating {
            self.surface_plant
                .calculate_district_heating_demand()
                .context("district heating demand failed")?;
            self.trace.push(CalcStep::DistrictHeatingDemand);
        }
        self.calculate_subsurface_and_plant()?;
        if district_heating {
            self.calculate_subsurface_and_plant()?;
        }

        self.economics
            .calculate(&EconomicsContext {
                reservoir: &self.reservoir,
                wellbores: &self.wellbores,
                surface_plant: &self.surface_plant,
            })
            .context("Economics calculation failed")?;
        self.trace.push(CalcStep::Economics);

        if let Some(addons) = &mut self.addons {
            addons
                .calculate(&self.economics, &mut self.surface_plant)
                .context("AddOns calculation failed")?;
            self.trace.push(CalcStep::AddOns);
        }
        if let Some(ccus) = &mut self.ccus {
            ccus.calculate(&self.economics, &mut self.surface_plant)
                .context("CCUS calculation failed")?;
            self.trace.push(CalcStep::Ccus);
        }
        if let Some(sdacgt) = &mut self.sdacgt {
            sdacgt
                .calculate(&self.economics, &mut self.surface_plant)
                .context("S-DAC-GT calculation failed")?;
            self.trace.push(CalcStep::SDacGt);
        }

        self.stage = RunStage::Calculated;
        log::info!("calculated: {:?}", self.trace);
        Ok(())
    }

    /// Reads and calculates in one go, returning the structured result
    pub fn run(input: InputParameters) -> anyhow::Result<RunResult> {
        let mut model = Self::new(input);
        model.read_parameters()?;
        model.calculate()?;
        model.result()
    }

    fn ensure_calculated(&self) -> anyhow::Result<()> {
        ensure!(
            self.stage == RunStage::Calculated,
            "results are only available after calculating (stage {:?})",
            self.stage
        );
        Ok(())
    }

    /// Structured result with every output in its preferred units
    pub fn result(&self) -> anyhow::Result<RunResult> {
        self.ensure_calculated()?;
        self.outputs.result(self)
    }

    /// Fixed-column text report
    pub fn render_text(&self) -> anyhow::Result<String> {
        self.ensure_calculated()?;
        self.outputs.render_text(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors() {
        let selectors = Selectors::from_input(&InputParameters::default()).unwrap();
        assert_eq!(selectors, Selectors::default());
        assert!(!selectors.addons && !selectors.ccus && !selectors.sdacgt);
    }

    #[test]
    fn test_sutra_takes_precedence_over_ags() {
        let selectors = Selectors::from_input(&InputParameters::from_pairs([
            ("Reservoir Model", "7"),
            ("End-Use Option", "9"),
            ("Is AGS", "True"),
        ]))
        .unwrap();
        assert_eq!(selectors.reservoir, ReservoirKind::Sutra);
        assert_eq!(selectors.wellbores, WellBoresKind::Sutra);
        assert_eq!(selectors.economics, EconomicsKind::Sutra);
        assert_eq!(selectors.end_use, EndUseOption::SutraStorage);
    }

    #[test]
    fn test_ags_forces_cylindrical_reservoir() {
        let selectors = Selectors::from_input(&InputParameters::from_pairs([
            ("Reservoir Model", "1"),
            ("Is AGS", "True"),
        ]))
        .unwrap();
        assert_eq!(selectors.reservoir, ReservoirKind::Cylindrical);
        assert_eq!(selectors.wellbores, WellBoresKind::Ags);
    }

    #[test]
    fn test_sutra_end_use_without_sutra_reservoir_falls_back() {
        let selectors =
            Selectors::from_input(&InputParameters::from_pairs([("End-Use Option", "9")])).unwrap();
        assert_eq!(selectors.end_use, EndUseOption::DirectUseHeat);
        assert_eq!(selectors.wellbores, WellBoresKind::Standard);
    }

    #[test]
    fn test_out_of_range_selector_uses_default_variant() {
        let selectors =
            Selectors::from_input(&InputParameters::from_pairs([("Reservoir Model", "12")])).unwrap();
        assert_eq!(selectors.reservoir, ReservoirKind::default());
    }

    #[test]
    fn test_add_on_activation_keys() {
        let selectors = Selectors::from_input(&InputParameters::from_pairs([
            ("Ending CCUS Credit Value", "0.1"),
            ("S-DAC-GT", "On"),
        ]))
        .unwrap();
        assert!(!selectors.addons);
        assert!(selectors.ccus);
        assert!(selectors.sdacgt);
    }

    #[test]
    fn test_stages_are_enforced() {
        let mut model = Model::new(InputParameters::default());
        assert_eq!(model.stage(), RunStage::AddOnsResolved);
        assert!(model.calculate().is_err());
        assert!(model.render_text().is_err());
        model.read_parameters().unwrap();
        assert!(model.read_parameters().is_err());
        model.calculate().unwrap();
        assert_eq!(model.stage(), RunStage::Calculated);
        assert!(model.calculate().is_err());
        assert_eq!(
            model.trace(),
            &[
                CalcStep::Reservoir,
                CalcStep::WellBores,
                CalcStep::SurfacePlant,
                CalcStep::Economics
            ]
        );
        assert_eq!(
            model.utilization_passes(),
            &[UtilizationPass {
                applied: 0.9,
                reported: 0.9
            }]
        );
    }
}
