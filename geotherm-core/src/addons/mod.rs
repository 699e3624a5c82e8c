//! Optional economic add-ons calculated after the core economics: user-defined add-ons, CO2
//! capture credits (CCUS) and direct air capture driven by geothermal energy (S-DAC-GT).
//!
//! Every add-on adjusts the surface plant's annual production arrays in place and then
//! recomputes levelized costs from the adjusted arrays with [Economics::levelized_costs].

use crate::economics::{finance, Economics, ProjectMetrics};
use crate::imports::*;
use crate::surface_plant::{EndUseOption, SurfacePlant};

mod ccus;
mod sdacgt;

pub use ccus::Ccus;
pub use sdacgt::SDacGt;

/// Declares `"Adjusted Project <LCOx><suffix>"` for every levelized cost the end use reports
fn declare_adjusted_levelized(outputs: &mut OutputParameterDict, end_use: EndUseOption, suffix: &str) {
    for name in Economics::levelized_outputs(end_use) {
        let preferred = if name == "LCOE" {
            Unit::CentsPerKwh
        } else {
            Unit::UsdPerMmbtu
        };
        outputs.declare(
            OutputParameter::new(&format!("Adjusted Project {name}{suffix}"), Unit::UsdPerKwh)
                .preferred(preferred),
        );
    }
}

fn declare_metrics(outputs: &mut OutputParameterDict, suffix: &str) {
    outputs.declare(OutputParameter::new(&format!("Project NPV{suffix}"), Unit::Musd));
    outputs.declare(OutputParameter::new(&format!("Project IRR{suffix}"), Unit::Percent));
    outputs.declare(OutputParameter::new(
        &format!("Project MOIC{suffix}"),
        Unit::Dimensionless,
    ));
    outputs.declare(OutputParameter::new(
        &format!("Project Payback Period{suffix}"),
        Unit::Year,
    ));
}

/// Recomputes the levelized costs from the surface plant's current production and writes them as
/// `"Adjusted Project <LCOx><suffix>"`
fn write_adjusted_levelized(
    outputs: &mut OutputParameterDict,
    economics: &Economics,
    plant: &SurfacePlant,
    capex: f64,
    opex: &Array1<f64>,
    suffix: &str,
) -> anyhow::Result<()> {
    let production = crate::economics::Production::from_plant(plant)?;
    for (name, cost) in economics.levelized_costs(capex, opex, &production)? {
        ensure!(
            cost.is_finite(),
            "adjusted {name}{suffix} is not finite"
        );
        outputs.set_scalar(&format!("Adjusted Project {name}{suffix}"), cost)?;
    }
    Ok(())
}

/// Value of list entry `i`, with missing entries counting as 0
fn entry(values: &[f64], i: usize) -> f64 {
    values.get(i).copied().unwrap_or_default()
}

/// User-defined add-ons, activated by `AddOn Nickname 1`
#[derive(Debug)]
pub struct AddOns {
    pub params: ParameterDict,
    pub outputs: OutputParameterDict,
}

impl AddOns {
    pub fn new(end_use: EndUseOption) -> Self {
        let params = ParameterDict::new()
            .with(Parameter::str_list("AddOn Nickname", "AddOn Nickname"))
            .with(Parameter::list("AddOn CAPEX", "AddOn CAPEX", vec![], Unit::Musd, 0.0, 1e4))
            .with(Parameter::list(
                "AddOn OPEX",
                "AddOn OPEX",
                vec![],
                Unit::MusdPerYear,
                0.0,
                1e4,
            ))
            .with(Parameter::list(
                "AddOn Electricity Gained",
                "AddOn Electricity Gained",
                vec![],
                Unit::KilowattHourPerYear,
                0.0,
                1e11,
            ))
            .with(Parameter::list(
                "AddOn Heat Gained",
                "AddOn Heat Gained",
                vec![],
                Unit::KilowattHourPerYear,
                0.0,
                1e11,
            ))
            .with(Parameter::list(
                "AddOn Profit Gained",
                "AddOn Profit Gained",
                vec![],
                Unit::MusdPerYear,
                0.0,
                1e4,
            ));

        let mut outputs = OutputParameterDict::new()
            .with(OutputParameter::new("AddOn CAPEX Total", Unit::Musd))
            .with(OutputParameter::new("AddOn OPEX Total", Unit::MusdPerYear))
            .with(
                OutputParameter::new("AddOn Electricity Gained Total", Unit::KilowattHourPerYear)
                    .preferred(Unit::GigawattHourPerYear),
            )
            .with(
                OutputParameter::new("AddOn Heat Gained Total", Unit::KilowattHourPerYear)
                    .preferred(Unit::GigawattHourPerYear),
            )
            .with(OutputParameter::new("AddOn Profit Gained Total", Unit::MusdPerYear))
            .with(OutputParameter::new("Adjusted Project CAPEX", Unit::Musd))
            .with(OutputParameter::new("Adjusted Project OPEX", Unit::MusdPerYear))
            .with(OutputParameter::new("AddOn Cash Flow", Unit::Musd))
            .with(OutputParameter::new("AddOn Cumulative Cash Flow", Unit::Musd));
        declare_metrics(&mut outputs, " with AddOns");
        declare_adjusted_levelized(&mut outputs, end_use, "");

        Self { params, outputs }
    }

    /// Nicknames in input order
    pub fn nicknames(&self) -> anyhow::Result<&[String]> {
        self.params.str_list("AddOn Nickname")
    }

    pub fn calculate(&mut self, economics: &Economics, plant: &mut SurfacePlant) -> anyhow::Result<()> {
        let count = self.nicknames()?.len();
        let total = |name: &str| -> anyhow::Result<f64> {
            let values = self.params.list(name)?;
            if values.len() > count {
                log::warn!(
                    "{} entries of `{name}` have no nickname and are ignored",
                    values.len() - count
                );
            }
            Ok((0..count).map(|i| entry(&values, i)).sum())
        };
        let capex = total("AddOn CAPEX")?;
        let opex = total("AddOn OPEX")?;
        let electricity = total("AddOn Electricity Gained")?;
        let heat = total("AddOn Heat Gained")?;
        let profit = total("AddOn Profit Gained")?;

        *plant.outputs.series_mut("Annual Electricity Production")? += electricity;
        *plant.outputs.series_mut("Annual Heat Production")? += heat;

        let years = plant.time_grid()?.lifetime;
        let sales = (economics.outputs.series("Electricity Price")? * electricity
            + economics.outputs.series("Heat Price")? * heat)
            / 1e6;
        let addon_cash_flow = Economics::project_cash_flow(capex, &(sales + profit - opex));
        let project_cash_flow = economics.outputs.series("Project Cash Flow")? + &addon_cash_flow;

        let adjusted_capex = economics.capex()? + capex;
        let adjusted_opex = economics.opex()? + opex;
        ensure!(
            adjusted_capex >= 0.0,
            "adjusted project capital cost {adjusted_capex:.3} MUSD is negative"
        );

        self.outputs.set_scalar("AddOn CAPEX Total", capex)?;
        self.outputs.set_scalar("AddOn OPEX Total", opex)?;
        self.outputs.set_scalar("AddOn Electricity Gained Total", electricity)?;
        self.outputs.set_scalar("AddOn Heat Gained Total", heat)?;
        self.outputs.set_scalar("AddOn Profit Gained Total", profit)?;
        self.outputs.set_scalar("Adjusted Project CAPEX", adjusted_capex)?;
        self.outputs.set_scalar("Adjusted Project OPEX", adjusted_opex)?;
        self.outputs
            .set_series("AddOn Cumulative Cash Flow", utils::ndarrcumsum(&addon_cash_flow))?;
        self.outputs.set_series("AddOn Cash Flow", addon_cash_flow)?;
        ProjectMetrics::new(economics.discount_rate()?, adjusted_capex, &project_cash_flow)
            .write(&mut self.outputs, " with AddOns")?;
        write_adjusted_levelized(
            &mut self.outputs,
            economics,
            plant,
            adjusted_capex,
            &Array1::from_elem(years, adjusted_opex - profit),
            "",
        )?;
        log::info!("{count} add-on(s) calculated");
        Ok(())
    }
}

impl SubModel for AddOns {
    fn name(&self) -> &str {
        "AddOns"
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

/// Present value of a yearly series at the project discount rate
fn discounted(economics: &Economics, series: &Array1<f64>) -> anyhow::Result<f64> {
    Ok(finance::present_value(economics.discount_rate()?, series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    /// Reads and calculates a model on `pairs`
    pub(super) fn calculated(pairs: &[(&str, &str)]) -> Model {
        let mut model = Model::new(InputParameters::from_pairs(pairs.iter().copied()));
        model.read_parameters().unwrap();
        model.calculate().unwrap();
        model
    }

    #[test]
    fn test_entries_without_nickname_are_ignored() {
        let model = calculated(&[
            ("AddOn Nickname 1", "Heat pump"),
            ("AddOn CAPEX 1", "10"),
            ("AddOn CAPEX 2", "5"),
            ("AddOn OPEX 1", "0.5"),
            ("AddOn OPEX 2", "0.25"),
            ("AddOn OPEX 3", "0.25"),
            ("AddOn Profit Gained 1", "2"),
        ]);
        let addons = model.addons.as_ref().unwrap();
        assert_eq!(addons.nicknames().unwrap().to_vec(), vec!["Heat pump".to_string()]);
        assert_eq!(addons.params.list("AddOn CAPEX").unwrap().len(), 2);
        assert_eq!(addons.outputs.scalar("AddOn CAPEX Total").unwrap(), 10.0);
        assert_eq!(addons.outputs.scalar("AddOn OPEX Total").unwrap(), 0.5);
        assert_eq!(addons.outputs.scalar("AddOn Profit Gained Total").unwrap(), 2.0);
        assert!(addons
            .outputs
            .scalar("Adjusted Project CAPEX")
            .unwrap()
            .approx_eq(&(model.economics.capex().unwrap() + 10.0), 1e-12));

        let cash_flow = addons.outputs.series("AddOn Cash Flow").unwrap();
        assert_eq!(cash_flow[0], -10.0);
        // no electricity or heat gained, so each year nets profit minus opex
        assert!(cash_flow.iter().skip(1).all(|c| c.approx_eq(&1.5, 1e-12)));
    }

    #[test]
    fn test_missing_entries_count_as_zero() {
        assert_eq!(entry(&[1.0, 2.0], 1), 2.0);
        assert_eq!(entry(&[1.0], 3), 0.0);
    }
}
