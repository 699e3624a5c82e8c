use super::{declare_adjusted_levelized, discounted, write_adjusted_levelized};
use crate::economics::Economics;
use crate::imports::*;
use crate::surface_plant::{EndUseOption, SurfacePlant};

const SUFFIX: &str = " with DAC";

/// Solid-sorbent direct air capture powered by a share of the geothermal output, activated by
/// `S-DAC-GT, On`
#[derive(Debug)]
pub struct SDacGt {
    pub params: ParameterDict,
    pub outputs: OutputParameterDict,
}

impl SDacGt {
    pub fn new(end_use: EndUseOption) -> Self {
        let params = ParameterDict::new()
            .with(Parameter::float(
                "Percent Energy Devoted To Process",
                10.0,
                Unit::Percent,
                0.0,
                100.0,
            ))
            .with(Parameter::float(
                "DAC Thermal Energy Requirement",
                1650.0,
                Unit::KwhPerTonne,
                1.0,
                1e5,
            ))
            .with(Parameter::float(
                "DAC Electrical Energy Requirement",
                366.0,
                Unit::KwhPerTonne,
                0.0,
                1e5,
            ))
            .with(
                Parameter::float("DAC Capital Cost", 750.0, Unit::UsdPerTonne, 0.0, 1e5)
                    .tooltip("Per tonne/yr of capture capacity"),
            )
            .with(Parameter::float("DAC O&M Cost", 85.0, Unit::UsdPerTonne, 0.0, 1e5))
            .with(Parameter::float("CO2 Storage Cost", 10.0, Unit::UsdPerTonne, 0.0, 1e5))
            .with(Parameter::float(
                "Electricity Production Emission Factor",
                0.4,
                Unit::KgPerKwh,
                0.0,
                10.0,
            ))
            .with(Parameter::float(
                "Heat Production Emission Factor",
                0.2,
                Unit::KgPerKwh,
                0.0,
                10.0,
            ));

        let mut outputs = OutputParameterDict::new()
            .with(OutputParameter::new("Annual CO2 Captured", Unit::Tonne))
            .with(OutputParameter::new("Total CO2 Captured", Unit::Tonne))
            .with(OutputParameter::new("Net CO2 Removed", Unit::Tonne))
            .with(OutputParameter::new("Levelized Cost of DAC", Unit::UsdPerTonne))
            .with(
                OutputParameter::new("Geothermal Heat Devoted to DAC", Unit::KilowattHourPerYear)
                    .preferred(Unit::GigawattHourPerYear),
            )
            .with(
                OutputParameter::new(
                    "Geothermal Electricity Devoted to DAC",
                    Unit::KilowattHourPerYear,
                )
                .preferred(Unit::GigawattHourPerYear),
            );
        declare_adjusted_levelized(&mut outputs, end_use, SUFFIX);

        Self { params, outputs }
    }

    /// Diverts `Percent Energy Devoted To Process` of the heat to the capture process, sized by
    /// its thermal requirement, and draws the process electricity from the plant.
    ///
    /// # Equations used
    /// Q_dac = f Q_heat (Q_extracted for power-only plants)\
    /// m_CO2 = Q_dac / q_thermal\
    /// E_dac = m_CO2 e_electric
    pub fn calculate(&mut self, economics: &Economics, plant: &mut SurfacePlant) -> anyhow::Result<()> {
        let years = plant.time_grid()?.lifetime;
        let fraction = self.params.f64("Percent Energy Devoted To Process")? / 100.0;
        let heat_sold = plant.end_use.produces_heat();
        let heat_source = if heat_sold {
            "Annual Heat Production"
        } else {
            "Annual Heat Extracted"
        };
        let heat_devoted = plant.outputs.series(heat_source)? * fraction;
        let captured = &heat_devoted / self.params.f64("DAC Thermal Energy Requirement")?;
        let electricity_devoted =
            &captured * self.params.f64("DAC Electrical Energy Requirement")?;

        if heat_sold {
            *plant.outputs.series_mut("Annual Heat Production")? -= &heat_devoted;
        } else {
            // heat diverted upstream of the power cycle
            *plant.outputs.series_mut("Annual Electricity Production")? *= 1.0 - fraction;
        }
        // power-only or heat-only plants buy what they do not produce
        let purchased = if plant.end_use.produces_electricity() {
            let electricity = plant.outputs.series_mut("Annual Electricity Production")?;
            let shortfall = electricity
                .iter()
                .zip(electricity_devoted.iter())
                .map(|(e, d)| (d - e).max(0.0))
                .collect::<Array1<f64>>();
            electricity.zip_mut_with(&electricity_devoted, |e, d| *e = (*e - d).max(0.0));
            shortfall
        } else {
            electricity_devoted.clone()
        };

        let emissions = (&heat_devoted * self.params.f64("Heat Production Emission Factor")?
            + &electricity_devoted * self.params.f64("Electricity Production Emission Factor")?)
            / 1000.0;

        let heat_price = economics.outputs.series("Heat Price")?;
        let electricity_price = economics.outputs.series("Electricity Price")?;
        let electricity_rate = economics.params.f64("Electricity Rate")?;
        let capacity = utils::ndarrmax(&captured);
        let dac_capex = capacity * self.params.f64("DAC Capital Cost")? * 1e-6;
        let dac_opex = (&captured
            * (self.params.f64("DAC O&M Cost")? + self.params.f64("CO2 Storage Cost")?)
            + &heat_devoted * heat_price
            + (&electricity_devoted - &purchased) * electricity_price
            + &purchased * electricity_rate)
            / 1e6;
        let tonnes = discounted(economics, &captured)?;
        ensure!(tonnes > 0.0, "no CO2 captured with the energy devoted to the process");
        let levelized = (dac_capex + discounted(economics, &dac_opex)?) / tonnes * 1e6;

        let capex = economics.capex()?;
        let opex = Array1::from_elem(years, economics.opex()?);
        write_adjusted_levelized(&mut self.outputs, economics, plant, capex, &opex, SUFFIX)?;

        log::debug!("{}", format_dbg!((capacity, dac_capex, levelized)));
        self.outputs
            .set_scalar("Net CO2 Removed", captured.sum() - emissions.sum())?;
        self.outputs.set_scalar("Total CO2 Captured", captured.sum())?;
        self.outputs.set_series("Annual CO2 Captured", captured)?;
        self.outputs.set_scalar("Levelized Cost of DAC", levelized)?;
        self.outputs
            .set_series("Geothermal Heat Devoted to DAC", heat_devoted)?;
        self.outputs
            .set_series("Geothermal Electricity Devoted to DAC", electricity_devoted)?;
        Ok(())
    }
}

impl SubModel for SDacGt {
    fn name(&self) -> &str {
        "S-DAC-GT"
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
    use crate::addons::tests::calculated;
    use crate::model::Model;

    fn series(model: &Model, name: &str) -> Array1<f64> {
        model.surface_plant.outputs.series(name).unwrap().clone()
    }

    fn devoted(model: &Model, name: &str) -> Array1<f64> {
        model.sdacgt.as_ref().unwrap().outputs.series(name).unwrap().clone()
    }

    #[test]
    fn test_power_only_plant_diverts_extracted_heat() {
        let base = calculated(&[("End-Use Option", "1")]);
        let dac = calculated(&[
            ("End-Use Option", "1"),
            ("S-DAC-GT", "On"),
            ("Percent Energy Devoted To Process", "20"),
        ]);
        let heat = devoted(&dac, "Geothermal Heat Devoted to DAC");
        let extracted = series(&base, "Annual Heat Extracted");
        assert!(heat.approx_eq(&(&extracted * 0.2), 1e-9));

        let electricity_devoted = devoted(&dac, "Geothermal Electricity Devoted to DAC");
        assert!(electricity_devoted.approx_eq(&(&heat / 1650.0 * 366.0), 1e-9));
        let expected = (series(&base, "Annual Electricity Production") * 0.8 - &electricity_devoted)
            .mapv(|e| e.max(0.0));
        assert!(series(&dac, "Annual Electricity Production").approx_eq(&expected, 1e-9));
        assert!(series(&dac, "Annual Heat Production").iter().all(|h| *h == 0.0));
    }

    #[test]
    fn test_heat_sold_plant_diverts_delivered_heat() {
        let base = calculated(&[("End-Use Option", "2")]);
        let dac = calculated(&[
            ("End-Use Option", "2"),
            ("S-DAC-GT", "On"),
            ("Percent Energy Devoted To Process", "20"),
        ]);
        let produced = series(&base, "Annual Heat Production");
        let heat = devoted(&dac, "Geothermal Heat Devoted to DAC");
        assert!(heat.approx_eq(&(&produced * 0.2), 1e-9));
        assert!(series(&dac, "Annual Heat Production").approx_eq(&(&produced * 0.8), 1e-9));
        // a direct-use plant buys all of the process electricity
        assert!(series(&dac, "Annual Electricity Production")
            .approx_eq(&series(&base, "Annual Electricity Production"), 1e-12));

        let sdacgt = dac.sdacgt.as_ref().unwrap();
        let captured = sdacgt.outputs.series("Annual CO2 Captured").unwrap();
        assert!(captured.approx_eq(&(&heat / 1650.0), 1e-9));
        assert!(sdacgt.outputs.scalar("Net CO2 Removed").unwrap() < captured.sum());
        assert!(sdacgt.outputs.scalar("Levelized Cost of DAC").unwrap() > 0.0);
    }

    #[test]
    fn test_no_energy_devoted_is_fatal() {
        let mut model = Model::new(InputParameters::from_pairs([
            ("S-DAC-GT", "On"),
            ("Percent Energy Devoted To Process", "0"),
        ]));
        model.read_parameters().unwrap();
        let err = model.calculate().unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("S-DAC-GT calculation failed"));
        assert!(msg.contains("no CO2 captured"));
    }
}
