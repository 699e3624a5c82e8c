//! Rendering of a calculated [Model]: the fixed-column text report and the structured
//! [RunResult] tree.  Every value is reported in its output's preferred units.

use crate::imports::*;
use crate::model::Model;
use itertools::izip;

pub const SUMMARY: &str = "SUMMARY OF RESULTS";

/// Rendered value of one output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Series(Vec<f64>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub value: ResultValue,
    pub unit: String,
}

impl ResultEntry {
    fn number(value: f64, unit: &str) -> Self {
        Self {
            value: ResultValue::Number(value),
            unit: unit.to_string(),
        }
    }

    fn from_output(output: &OutputParameter) -> anyhow::Result<Self> {
        let value = match output.rendered()? {
            OutputValue::Scalar(v) => ResultValue::Number(v),
            OutputValue::Series(values) => ResultValue::Series(values.to_vec()),
            OutputValue::Text(text) => ResultValue::Text(text),
            OutputValue::Unset => bail!("output `{}` was never calculated", output.name),
        };
        Ok(Self {
            value,
            unit: output.preferred_units.symbol().to_string(),
        })
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.value {
            ResultValue::Number(v) => Some(v),
            _ => None,
        }
    }
}

/// `{ section: { output: { value, unit } } }`, starting with [SUMMARY] and followed by one
/// section per active sub-model
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult(pub IndexMap<String, IndexMap<String, ResultEntry>>);

impl SerdeAPI for RunResult {}

impl RunResult {
    pub fn section(&self, section: &str) -> Option<&IndexMap<String, ResultEntry>> {
        self.0.get(section)
    }

    pub fn get(&self, section: &str, name: &str) -> Option<&ResultEntry> {
        self.section(section)?.get(name)
    }

    /// Numeric entry of the summary section
    pub fn summary(&self, name: &str) -> Option<f64> {
        self.get(SUMMARY, name)?.as_number()
    }
}

/// Report options plus the renderer
#[derive(Debug)]
pub struct Outputs {
    pub params: ParameterDict,
    pub outputs: OutputParameterDict,
}

impl Default for Outputs {
    fn default() -> Self {
        Self::new()
    }
}

fn format_number(value: f64) -> String {
    if value != 0.0 && (value.abs() >= 1e7 || value.abs() < 1e-3) {
        format!("{value:.4e}")
    } else {
        format!("{value:.2}")
    }
}

fn row(label: &str, value: &str, unit: &str) -> String {
    format!("{label:>50}: {value:>14} {unit}\n")
}

fn heading(report: &mut String, title: &str) {
    report.push_str(&format!("\n                          ***{title}***\n\n"));
}

fn copy_output(
    section: &mut IndexMap<String, ResultEntry>,
    label: &str,
    output: Option<&OutputParameter>,
) -> anyhow::Result<()> {
    if let Some(output) = output {
        section.insert(label.to_string(), ResultEntry::from_output(output)?);
    }
    Ok(())
}

/// Row of a scalar or text output; series are left to the profile tables
fn output_row(output: &OutputParameter) -> anyhow::Result<Option<String>> {
    let unit = output.preferred_units.symbol();
    Ok(match output.rendered()? {
        OutputValue::Scalar(v) => Some(row(&output.name, &format_number(v), unit)),
        OutputValue::Text(text) => Some(row(&output.name, &text, "")),
        _ => None,
    })
}

fn rows(report: &mut String, outputs: &OutputParameterDict, names: &[&str]) -> anyhow::Result<()> {
    for name in names {
        if let Some(line) = outputs.get(name).map(output_row).transpose()?.flatten() {
            report.push_str(&line);
        }
    }
    Ok(())
}

impl Outputs {
    pub fn new() -> Self {
        Self {
            params: ParameterDict::new()
                .with(Parameter::boolean("Print Output to Console", true))
                .with(
                    Parameter::boolean("Time Series Output", true)
                        .tooltip("Include the yearly profile tables in the text report"),
                ),
            outputs: OutputParameterDict::new(),
        }
    }

    pub fn print_to_console(&self) -> bool {
        self.params.bool("Print Output to Console").unwrap_or(true)
    }

    fn check_complete(model: &Model) -> anyhow::Result<()> {
        let mut errors: ComboErrors<anyhow::Error> = ComboErrors::new();
        for module in model.active_modules() {
            let unset = module.output_parameters().unset();
            errors.check(
                unset.is_empty(),
                format!("{} outputs were never calculated: {}", module.name(), unset.join(", ")),
            );
        }
        errors.into_result("Outputs")
    }

    fn summary(model: &Model) -> anyhow::Result<IndexMap<String, ResultEntry>> {
        let economics = &model.economics.outputs;
        let plant = &model.surface_plant.outputs;
        let mut summary = IndexMap::new();
        copy_output(&mut summary, "Electricity breakeven price", economics.get("LCOE"))?;
        copy_output(&mut summary, "Direct-Use heat breakeven price", economics.get("LCOH"))?;
        copy_output(&mut summary, "Direct-Use cooling breakeven price", economics.get("LCOC"))?;

        let end_use = model.surface_plant.end_use;
        let mean_mw = |name: &str| -> anyhow::Result<f64> {
            Ok(utils::ndarrmean(plant.series(name)?) / 1000.0)
        };
        if end_use.produces_electricity() {
            summary.insert(
                "Average Net Electricity Production".into(),
                ResultEntry::number(mean_mw("Net Electricity Produced")?, "MW"),
            );
        }
        if end_use.produces_heat() {
            summary.insert(
                "Average Direct-Use Heat Production".into(),
                ResultEntry::number(mean_mw("Heat Produced")?, "MW"),
            );
        }
        let wells = &model.wellbores;
        summary.insert(
            "Number of production wells".into(),
            ResultEntry::number(wells.production_wells()? as f64, ""),
        );
        summary.insert(
            "Number of injection wells".into(),
            ResultEntry::number(wells.injection_wells()? as f64, ""),
        );
        summary.insert(
            "Well depth".into(),
            ResultEntry::number(model.reservoir.params.f64("Reservoir Depth")?, "km"),
        );
        copy_output(&mut summary, "Geothermal gradient", model.reservoir.outputs.get("Average Gradient"))?;
        copy_output(&mut summary, "Project NPV", economics.get("Project NPV"))?;
        copy_output(&mut summary, "Project IRR", economics.get("Project IRR"))?;
        Ok(summary)
    }

    /// Structured result: the summary plus every output of every active module.  Fails when an
    /// output is still unset.
    pub fn result(&self, model: &Model) -> anyhow::Result<RunResult> {
        Self::check_complete(model)?;
        let mut result = IndexMap::new();
        result.insert(SUMMARY.to_string(), Self::summary(model)?);
        for module in model.active_modules() {
            let section = module
                .output_parameters()
                .iter()
                .map(|output| Ok((output.name.clone(), ResultEntry::from_output(output)?)))
                .collect::<anyhow::Result<IndexMap<_, _>>>()?;
            result.insert(module.name().to_string(), section);
        }
        Ok(RunResult(result))
    }

    /// Yearly table of the produced temperature, rate and energy of the primary product
    fn profile(&self, model: &Model, report: &mut String) -> anyhow::Result<()> {
        let plant = &model.surface_plant;
        let grid = plant.time_grid()?;
        let electric = plant.end_use.electricity_is_primary();
        let (title, rate_name, energy_name) = if electric {
            ("POWER GENERATION PROFILE", "Net Electricity Produced", "Annual Electricity Production")
        } else {
            ("HEATING PROFILE", "Heat Produced", "Annual Heat Production")
        };
        heading(report, title);
        report.push_str(&format!(
            "{:>6} {:>16} {:>16} {:>18}\n",
            "YEAR", "TEMPERATURE", "POWER", "ENERGY"
        ));
        report.push_str(&format!("{:>6} {:>16} {:>16} {:>18}\n", "", "(degC)", "(MW)", "(GWh/yr)"));
        let temperature = model.wellbores.outputs.series("Produced Temperature")?;
        let rate = plant.outputs.series(rate_name)?;
        let energy = plant.outputs.series(energy_name)?;
        let year_start = (0..grid.lifetime).map(|yr| yr * grid.steps_per_year);
        for (yr, step, annual) in izip!(1..=grid.lifetime, year_start, energy.iter()) {
            report.push_str(&format!(
                "{yr:>6} {:>16.2} {:>16.4} {:>18.4}\n",
                temperature[step],
                rate[step] / 1000.0,
                annual / 1e6
            ));
        }
        Ok(())
    }

    pub fn render_text(&self, model: &Model) -> anyhow::Result<String> {
        Self::check_complete(model)?;
        let mut report = String::from("                          *****************\n");
        report.push_str("                          ***CASE REPORT***\n");
        report.push_str("                          *****************\n");

        heading(&mut report, SUMMARY);
        for (label, entry) in Self::summary(model)? {
            let value = match &entry.value {
                ResultValue::Number(v) => format_number(*v),
                ResultValue::Text(text) => text.clone(),
                ResultValue::Series(values) => format_number(utils::ndarrmean(&Array1::from(values.clone()))),
            };
            report.push_str(&row(&label, &value, &entry.unit));
        }

        let economics = &model.economics;
        heading(&mut report, "ECONOMIC PARAMETERS");
        report.push_str(&row("Economic Model", economics.model.description(), ""));
        report.push_str(&row(
            "Discount Rate",
            &format_number(economics.discount_rate()? * 100.0),
            "%",
        ));
        report.push_str(&row(
            "Project lifetime",
            &model.surface_plant.time_grid()?.lifetime.to_string(),
            "yr",
        ));
        rows(
            &mut report,
            &economics.outputs,
            &[
                "Project NPV",
                "Project IRR",
                "Project VIR",
                "Project MOIC",
                "Project Payback Period",
            ],
        )?;

        heading(&mut report, "ENGINEERING PARAMETERS");
        report.push_str(&row("End-Use Option", model.surface_plant.end_use.description(), ""));
        report.push_str(&row("Wellbores", &format!("{:?}", model.wellbores.kind), ""));
        rows(
            &mut report,
            &model.wellbores.outputs,
            &[
                "Average Production Temperature",
                "Production Well Temperature Drop",
                "Total Flow Rate",
                "Injection Flow Rate per Well",
                "Production Wellbore Pressure Drop",
                "Injection Wellbore Pressure Drop",
                "Reservoir Pressure Drop",
            ],
        )?;
        rows(
            &mut report,
            &model.surface_plant.outputs,
            &[
                "First Law Efficiency",
                "Maximum Net Electricity",
                "Maximum Heat Produced",
                "Effective Utilization Factor",
            ],
        )?;

        heading(&mut report, "RESERVOIR PARAMETERS");
        report.push_str(&row("Reservoir Model", model.reservoir.kind.description(), ""));
        for output in model.reservoir.outputs.iter() {
            if let Some(line) = output_row(output)? {
                report.push_str(&line);
            }
        }

        heading(&mut report, "CAPITAL COSTS (M$)");
        rows(
            &mut report,
            &economics.outputs,
            &[
                "Drilling Cost per Well",
                "Well Drilling and Completion Costs",
                "Stimulation Costs",
                "Surface Plant Costs",
                "Field Gathering System Costs",
                "Exploration Costs",
                "District Heating Network Costs",
                "Total Capital Costs",
            ],
        )?;

        heading(&mut report, "OPERATING AND MAINTENANCE COSTS (M$/yr)");
        rows(
            &mut report,
            &economics.outputs,
            &[
                "Wellfield O&M",
                "Surface Plant O&M",
                "Water O&M",
                "Peaking Boiler Fuel Cost",
                "Average Annual Pumping Cost",
                "Total O&M Costs",
            ],
        )?;

        if self.params.bool("Time Series Output")? {
            self.profile(model, &mut report)?;
        }

        for module in model.active_modules().into_iter().skip(4) {
            heading(&mut report, &format!("{} RESULTS", module.name().to_uppercase()));
            for output in module.output_parameters().iter() {
                if let Some(line) = output_row(output)? {
                    report.push_str(&line);
                }
            }
        }
        Ok(report)
    }
}

impl SubModel for Outputs {
    fn name(&self) -> &str {
        "Outputs"
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

    fn calculated(pairs: &[(&str, &str)]) -> Model {
        let mut model = Model::new(InputParameters::from_pairs(pairs.iter().copied()));
        model.read_parameters().unwrap();
        model.calculate().unwrap();
        model
    }

    #[test]
    fn test_result_tree_has_summary_and_every_module() {
        let model = calculated(&[]);
        let result = model.result().unwrap();
        let sections: Vec<&str> = result.0.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            sections,
            [SUMMARY, "Reservoir", "WellBores", "SurfacePlant", "Economics"]
        );
        let lcoe = result.get(SUMMARY, "Electricity breakeven price").unwrap();
        assert_eq!(lcoe.unit, "cents/kWh");
        assert!(lcoe.as_number().unwrap() > 0.0);
        assert!(result.get(SUMMARY, "Direct-Use heat breakeven price").is_none());
        assert_eq!(result.summary("Number of production wells"), Some(2.0));
    }

    #[test]
    fn test_units_override_changes_reported_unit() {
        let default = calculated(&[]).result().unwrap();
        let overridden = calculated(&[("Units:LCOE", "USD/MWh")]).result().unwrap();
        let lcoe = overridden.get("Economics", "LCOE").unwrap();
        assert_eq!(lcoe.unit, "USD/MWh");
        let cents = default.get("Economics", "LCOE").unwrap().as_number().unwrap();
        assert!(lcoe.as_number().unwrap().approx_eq(&(cents * 10.0), 1e-9));
    }

    #[test]
    fn test_text_report_sections() {
        let report = calculated(&[]).render_text().unwrap();
        for section in [
            SUMMARY,
            "ECONOMIC PARAMETERS",
            "ENGINEERING PARAMETERS",
            "RESERVOIR PARAMETERS",
            "CAPITAL COSTS (M$)",
            "OPERATING AND MAINTENANCE COSTS (M$/yr)",
            "POWER GENERATION PROFILE",
        ] {
            assert!(report.contains(section), "missing {section}");
        }
        assert!(report.contains("Electricity breakeven price"));
    }

    #[test]
    fn test_time_series_output_can_be_disabled() {
        let report = calculated(&[("Time Series Output", "False")])
            .render_text()
            .unwrap();
        assert!(!report.contains("POWER GENERATION PROFILE"));
    }

    #[test]
    fn test_unset_outputs_fail_rendering() {
        let mut model = Model::new(InputParameters::default());
        model.read_parameters().unwrap();
        assert!(model.outputs.result(&model).is_err());
    }

    #[test]
    fn test_result_serializes_to_json() {
        let result = calculated(&[]).result().unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"SUMMARY OF RESULTS\""));
        let parsed = RunResult::from_json(&json).unwrap();
        assert_eq!(
            parsed.summary("Number of injection wells"),
            result.summary("Number of injection wells")
        );
    }
}
