use super::{declare_adjusted_levelized, declare_metrics, write_adjusted_levelized};
use crate::economics::{Economics, ProjectMetrics};
use crate::imports::*;
use crate::surface_plant::{EndUseOption, SurfacePlant};

const SUFFIX: &str = " with CCUS";

/// Carbon credits for the CO2 a fossil plant would have emitted to deliver the same energy,
/// activated by `Ending CCUS Credit Value`
#[derive(Debug)]
pub struct Ccus {
    pub params: ParameterDict,
    pub outputs: OutputParameterDict,
}

impl Ccus {
    pub fn new(end_use: EndUseOption) -> Self {
        let params = ParameterDict::new()
            .with(Parameter::float("Starting CCUS Credit Value", 0.015, Unit::UsdPerLb, 0.0, 100.0))
            .with(Parameter::float("Ending CCUS Credit Value", 0.1, Unit::UsdPerLb, 0.0, 100.0))
            .with(Parameter::int("CCUS Escalation Start Year", 5, 0, 100))
            .with(Parameter::float(
                "CCUS Escalation Rate Per Year",
                0.0015,
                Unit::UsdPerLb,
                -100.0,
                100.0,
            ))
            .with(Parameter::int("CCUS End Year", 30, 0, 100))
            .with(Parameter::float("Power Production Rate of CO2", 0.85, Unit::LbPerKwh, 0.0, 10.0))
            .with(Parameter::float("Heat Production Rate of CO2", 0.35, Unit::LbPerKwh, 0.0, 10.0))
            .with(
                Parameter::float("CCUS Parasitic Electricity", 0.0, Unit::KwhPerLb, 0.0, 10.0)
                    .tooltip("Electricity used per lb of CO2 handled"),
            );

        let mut outputs = OutputParameterDict::new()
            .with(OutputParameter::new("Annual CO2 Avoided", Unit::Pound).preferred(Unit::Tonne))
            .with(OutputParameter::new("CCUS Price", Unit::UsdPerLb))
            .with(OutputParameter::new("CCUS Revenue", Unit::MusdPerYear))
            .with(OutputParameter::new(&format!("Project Cash Flow{SUFFIX}"), Unit::Musd))
            .with(OutputParameter::new(&format!("Cumulative Cash Flow{SUFFIX}"), Unit::Musd));
        declare_metrics(&mut outputs, SUFFIX);
        declare_adjusted_levelized(&mut outputs, end_use, SUFFIX);

        Self { params, outputs }
    }

    /// Credit value of each year, zero after `CCUS End Year`
    fn credit_price(&self, years: usize) -> anyhow::Result<Array1<f64>> {
        let mut price = utils::escalating_price(
            self.params.f64("Starting CCUS Credit Value")?,
            self.params.f64("Ending CCUS Credit Value")?,
            self.params.f64("CCUS Escalation Rate Per Year")?,
            self.params.usize("CCUS Escalation Start Year")?,
            years,
        );
        let end_year = self.params.usize("CCUS End Year")?.min(years);
        price.slice_mut(s![end_year..]).fill(0.0);
        Ok(price)
    }

    pub fn calculate(&mut self, economics: &Economics, plant: &mut SurfacePlant) -> anyhow::Result<()> {
        let years = plant.time_grid()?.lifetime;
        let avoided = plant.outputs.series("Annual Electricity Production")?
            * self.params.f64("Power Production Rate of CO2")?
            + plant.outputs.series("Annual Heat Production")?
                * self.params.f64("Heat Production Rate of CO2")?;

        let parasitic = &avoided * self.params.f64("CCUS Parasitic Electricity")?;
        let electricity = plant.outputs.series_mut("Annual Electricity Production")?;
        // the load can only draw what the plant produces
        let drawn = parasitic
            .iter()
            .zip(electricity.iter())
            .map(|(p, e)| p.min(e.max(0.0)))
            .collect::<Array1<f64>>();
        if drawn != parasitic {
            log::warn!("CCUS parasitic electricity exceeds the electricity produced; clamping at zero");
        }
        electricity.zip_mut_with(&drawn, |e, d| *e = (*e - d).max(0.0));

        let price = self.credit_price(years)?;
        let revenue = &avoided * &price / 1e6;
        let lost_sales = &drawn * economics.outputs.series("Electricity Price")? / 1e6;
        let net = &revenue - &lost_sales;
        let cash_flow = economics.outputs.series("Project Cash Flow")?
            + &Economics::project_cash_flow(0.0, &net);

        let capex = economics.capex()?;
        let opex = Array1::from_elem(years, economics.opex()?) - &net;
        ProjectMetrics::new(economics.discount_rate()?, capex, &cash_flow)
            .write(&mut self.outputs, SUFFIX)?;
        write_adjusted_levelized(&mut self.outputs, economics, plant, capex, &opex, SUFFIX)?;

        self.outputs.set_series("Annual CO2 Avoided", avoided)?;
        self.outputs.set_series("CCUS Price", price)?;
        self.outputs.set_series("CCUS Revenue", revenue)?;
        self.outputs
            .set_series(&format!("Cumulative Cash Flow{SUFFIX}"), utils::ndarrcumsum(&cash_flow))?;
        self.outputs
            .set_series(&format!("Project Cash Flow{SUFFIX}"), cash_flow)?;
        Ok(())
    }
}

impl SubModel for Ccus {
    fn name(&self) -> &str {
        "CCUS"
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
