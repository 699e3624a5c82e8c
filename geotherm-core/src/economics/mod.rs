//! Economics sub-model: capital and O&M costs, levelized costs and project cash flow.

use crate::imports::*;
use crate::reservoir::Reservoir;
use crate::surface_plant::{EndUseOption, SurfacePlant, SurfacePlantKind};
use crate::units::convert;
use crate::wellbores::WellBores;

pub mod correlations;
pub mod finance;

use correlations::DrillingCorrelation;
pub use finance::ProjectMetrics;

/// Levelized cost method, selected by `Economic Model`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EconomicModel {
    FixedChargeRate,
    #[default]
    StandardLevelized,
    /// Revenue requirement with taxes, depreciation and financing
    Bicycle,
    /// Closed-loop geothermal cost study method, discounted like the standard model
    Clgs,
}

impl EconomicModel {
    pub fn from_code(code: i64) -> anyhow::Result<Self> {
        Ok(match code {
            1 => Self::FixedChargeRate,
            2 => Self::StandardLevelized,
            3 => Self::Bicycle,
            4 => Self::Clgs,
            _ => bail!("unknown economic model {code}"),
        })
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::FixedChargeRate => 1,
            Self::StandardLevelized => 2,
            Self::Bicycle => 3,
            Self::Clgs => 4,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FixedChargeRate => "Fixed Charge Rate Model",
            Self::StandardLevelized => "Standard Levelized Cost Model",
            Self::Bicycle => "BICYCLE Model",
            Self::Clgs => "CLGS Model",
        }
    }
}

/// Economics variant, following the wellbores variant
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EconomicsKind {
    #[default]
    Standard,
    /// Adds nonvertical drilling, no stimulation
    Ags,
    /// No stimulation, plant costed as heat exchangers
    Sutra,
}

/// Upstream values the economics calculation depends on
#[derive(Debug, Clone, Copy)]
pub struct EconomicsContext<'a> {
    pub reservoir: &'a Reservoir,
    pub wellbores: &'a WellBores,
    pub surface_plant: &'a SurfacePlant,
}

/// Names of the capital cost outputs, their override parameter and adjustment factor
const CAPITAL_ITEMS: [(&str, &str, &str); 5] = [
    (
        "Well Drilling and Completion Costs",
        "Well Drilling and Completion Capital Cost",
        "Well Drilling and Completion Capital Cost Adjustment Factor",
    ),
    (
        "Stimulation Costs",
        "Reservoir Stimulation Capital Cost",
        "Reservoir Stimulation Capital Cost Adjustment Factor",
    ),
    (
        "Surface Plant Costs",
        "Surface Plant Capital Cost",
        "Surface Plant Capital Cost Adjustment Factor",
    ),
    (
        "Field Gathering System Costs",
        "Field Gathering System Capital Cost",
        "Field Gathering System Capital Cost Adjustment Factor",
    ),
    (
        "Exploration Costs",
        "Exploration Capital Cost",
        "Exploration Capital Cost Adjustment Factor",
    ),
];

#[derive(Debug)]
pub struct Economics {
    pub kind: EconomicsKind,
    pub model: EconomicModel,
    pub end_use: EndUseOption,
    pub params: ParameterDict,
    pub outputs: OutputParameterDict,
}

/// Yearly production the levelized costs are computed on, kWh/yr
#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub electricity: Array1<f64>,
    /// includes peaking boiler heat for district heating
    pub heat: Array1<f64>,
    pub cooling: Array1<f64>,
}

impl Production {
    pub fn from_plant(plant: &SurfacePlant) -> anyhow::Result<Self> {
        let mut heat = plant.outputs.series("Annual Heat Production")?.clone();
        if plant.kind == SurfacePlantKind::DistrictHeating {
            heat += plant.outputs.series("Annual Peaking Boiler Heat")?;
        }
        Ok(Self {
            electricity: plant.outputs.series("Annual Electricity Production")?.clone(),
            heat,
            cooling: plant.outputs.series("Annual Cooling Production")?.clone(),
        })
    }

    pub fn years(&self) -> usize {
        self.electricity.len()
    }
}

impl Economics {
    pub fn new(kind: EconomicsKind, model: EconomicModel, end_use: EndUseOption) -> Self {
        let mut params = ParameterDict::new()
            .with(Parameter::int("Economic Model", model.code(), 1, 4))
            .with(Parameter::float("Fixed Charge Rate", 0.1, Unit::Tenth, 0.0, 1.0))
            .with(Parameter::float("Discount Rate", 0.07, Unit::Tenth, 0.0, 1.0))
            .with(
                Parameter::float("Inflation Rate During Construction", 0.0, Unit::Tenth, 0.0, 1.0)
                    .tooltip("Capital cost escalation per construction year"),
            )
            .with(Parameter::int("Construction Years", 1, 1, 15))
            .with(Parameter::float(
                "Starting Electricity Sale Price",
                0.055,
                Unit::UsdPerKwh,
                0.0,
                1.0,
            ))
            .with(Parameter::float(
                "Ending Electricity Sale Price",
                0.055,
                Unit::UsdPerKwh,
                0.0,
                1.0,
            ))
            .with(Parameter::float(
                "Electricity Escalation Rate Per Year",
                0.0023,
                Unit::UsdPerKwh,
                -1.0,
                1.0,
            ))
            .with(Parameter::int("Electricity Escalation Start Year", 5, 0, 100))
            .with(Parameter::float("Starting Heat Sale Price", 0.025, Unit::UsdPerKwh, 0.0, 1.0))
            .with(Parameter::float("Ending Heat Sale Price", 0.025, Unit::UsdPerKwh, 0.0, 1.0))
            .with(Parameter::float(
                "Heat Escalation Rate Per Year",
                0.0,
                Unit::UsdPerKwh,
                -1.0,
                1.0,
            ))
            .with(Parameter::int("Heat Escalation Start Year", 5, 0, 100))
            .with(
                Parameter::float("Electricity Rate", 0.07, Unit::UsdPerKwh, 0.0, 1.0)
                    .tooltip("Price paid for electricity bought to run pumps and heat pumps"),
            )
            .with(Parameter::int("Well Drilling Cost Correlation", 1, 1, 4))
            .with(Parameter::float("Water Cost", 0.3, Unit::UsdPerTonne, 0.0, 100.0))
            .with(Parameter::float("Fraction of Investment in Bonds", 0.5, Unit::Tenth, 0.0, 1.0))
            .with(Parameter::float("Inflated Bond Interest Rate", 0.05, Unit::Tenth, 0.0, 1.0))
            .with(Parameter::float("Inflated Equity Interest Rate", 0.1, Unit::Tenth, 0.0, 1.0))
            .with(Parameter::float("Inflation Rate", 0.02, Unit::Tenth, 0.0, 1.0))
            .with(Parameter::float("Combined Income Tax Rate", 0.3, Unit::Tenth, 0.0, 0.99))
            .with(Parameter::float("Gross Revenue Tax Rate", 0.0, Unit::Tenth, 0.0, 0.99))
            .with(Parameter::float("Investment Tax Credit Rate", 0.0, Unit::Tenth, 0.0, 1.0))
            .with(Parameter::float("Property Tax Rate", 0.0, Unit::Tenth, 0.0, 1.0))
            .with(Parameter::float("Peaking Fuel Cost Rate", 5.0, Unit::UsdPerMmbtu, 0.0, 1000.0))
            .with(Parameter::float(
                "District Heating Piping Cost",
                1200.0,
                Unit::UsdPerMeter,
                0.0,
                1e5,
            ))
            .with(Parameter::float(
                "Total Length of District Heating Network",
                10.0,
                Unit::Kilometer,
                0.0,
                1e4,
            ))
            .with(Parameter::float("Total Capital Cost", 0.0, Unit::Musd, 0.0, 1e5))
            .with(Parameter::float("Total O&M Cost", 0.0, Unit::MusdPerYear, 0.0, 1e4));
        for (_, override_name, factor_name) in CAPITAL_ITEMS {
            params.insert(Parameter::float(override_name, 0.0, Unit::Musd, 0.0, 1e5).tooltip(
                "Replaces the correlation when provided; per well for drilling",
            ));
            params.insert(Parameter::float(factor_name, 1.0, Unit::Dimensionless, 0.0, 10.0));
        }
        if kind == EconomicsKind::Ags {
            params.insert(Parameter::float(
                "Nonvertical Drilling Cost per Meter",
                1000.0,
                Unit::UsdPerMeter,
                0.0,
                1e5,
            ));
        }

        let mut outputs = OutputParameterDict::new()
            .with(OutputParameter::new("Drilling Cost per Well", Unit::Musd));
        for (output_name, _, _) in CAPITAL_ITEMS {
            outputs.declare(OutputParameter::new(output_name, Unit::Musd));
        }
        for name in ["District Heating Network Costs", "Total Capital Costs"] {
            outputs.declare(OutputParameter::new(name, Unit::Musd));
        }
        for name in [
            "Wellfield O&M",
            "Surface Plant O&M",
            "Water O&M",
            "Peaking Boiler Fuel Cost",
            "Average Annual Pumping Cost",
            "Total O&M Costs",
        ] {
            outputs.declare(OutputParameter::new(name, Unit::MusdPerYear));
        }
        for name in Self::levelized_outputs(end_use) {
            let (preferred, tooltip) = match name {
                "LCOE" => (Unit::CentsPerKwh, "Levelized cost of electricity"),
                "LCOH" => (Unit::UsdPerMmbtu, "Levelized cost of heat"),
                _ => (Unit::UsdPerMmbtu, "Levelized cost of cooling"),
            };
            outputs.declare(
                OutputParameter::new(name, Unit::UsdPerKwh)
                    .preferred(preferred)
                    .tooltip(tooltip),
            );
        }
        outputs.declare(OutputParameter::new("Electricity Price", Unit::UsdPerKwh));
        outputs.declare(OutputParameter::new("Heat Price", Unit::UsdPerKwh));
        outputs.declare(OutputParameter::new("Annual Revenue", Unit::MusdPerYear));
        outputs.declare(OutputParameter::new("Project Cash Flow", Unit::Musd));
        outputs.declare(OutputParameter::new("Cumulative Cash Flow", Unit::Musd));
        outputs.declare(OutputParameter::new("Project NPV", Unit::Musd));
        outputs.declare(OutputParameter::new("Project IRR", Unit::Percent));
        outputs.declare(OutputParameter::new("Project VIR", Unit::Dimensionless));
        outputs.declare(OutputParameter::new("Project MOIC", Unit::Dimensionless));
        outputs.declare(OutputParameter::new("Project Payback Period", Unit::Year));

        Self {
            kind,
            model,
            end_use,
            params,
            outputs,
        }
    }

    /// Levelized cost outputs declared for `end_use`: `LCOE` when electricity is sold, `LCOH` when
    /// heat is sold and `LCOC` for absorption chillers
    pub fn levelized_outputs(end_use: EndUseOption) -> Vec<&'static str> {
        let mut names = vec![];
        if end_use.produces_electricity() {
            names.push("LCOE");
        }
        if end_use == EndUseOption::AbsorptionChiller {
            names.push("LCOC");
        } else if end_use.produces_heat() {
            names.push("LCOH");
        }
        names
    }

    pub fn discount_rate(&self) -> anyhow::Result<f64> {
        self.params.f64("Discount Rate")
    }

    /// Total capital cost after overrides, MUSD
    pub fn capex(&self) -> anyhow::Result<f64> {
        self.outputs.scalar("Total Capital Costs")
    }

    /// Total O&M cost after overrides, MUSD/yr
    pub fn opex(&self) -> anyhow::Result<f64> {
        self.outputs.scalar("Total O&M Costs")
    }

    /// Levelized cost of one product in USD/kWh, with the selected economic model
    ///
    /// # Arguments
    /// - `capex`: MUSD
    /// - `opex`: net yearly cost, MUSD/yr, by-product credits already subtracted
    /// - `production`: kWh/yr
    pub fn levelized_cost(
        &self,
        capex: f64,
        opex: &Array1<f64>,
        production: &Array1<f64>,
    ) -> anyhow::Result<f64> {
        ensure!(
            opex.len() == production.len() && !production.is_empty(),
            "cost and production series lengths differ: {} vs {}",
            opex.len(),
            production.len()
        );
        let capex = capex
            * (1.0 + self.params.f64("Inflation Rate During Construction")?)
                .powi(self.params.int("Construction Years")? as i32);
        let years = production.len();
        let musd_per_kwh = match self.model {
            EconomicModel::FixedChargeRate => {
                let energy = utils::ndarrmean(production);
                ensure!(energy > 0.0, "no production to levelize costs over");
                (self.params.f64("Fixed Charge Rate")? * capex + utils::ndarrmean(opex)) / energy
            }
            EconomicModel::StandardLevelized | EconomicModel::Clgs => {
                let rate = self.discount_rate()?;
                let energy = finance::present_value(rate, production);
                ensure!(energy > 0.0, "no production to levelize costs over");
                (capex + finance::present_value(rate, opex)) / energy
            }
            EconomicModel::Bicycle => {
                let bonds = self.params.f64("Fraction of Investment in Bonds")?;
                let tax = self.params.f64("Combined Income Tax Rate")?;
                let rate = bonds * self.params.f64("Inflated Bond Interest Rate")? * (1.0 - tax)
                    + (1.0 - bonds) * self.params.f64("Inflated Equity Interest Rate")?;
                let crf = finance::crf(rate, years);
                // straight-line depreciation over the plant life
                let pv_depreciation =
                    finance::present_value(rate, &Array1::from_elem(years, 1.0 / years as f64));
                let lccf = crf
                    * (1.0 - self.params.f64("Investment Tax Credit Rate")? - tax * pv_depreciation)
                    / (1.0 - tax)
                    + self.params.f64("Property Tax Rate")?;
                let inflation = self.params.f64("Inflation Rate")?;
                let inflated_opex: Array1<f64> = opex
                    .iter()
                    .enumerate()
                    .map(|(i, cost)| cost * (1.0 + inflation).powi(i as i32 + 1))
                    .collect();
                let energy = crf * finance::present_value(rate, production);
                ensure!(energy > 0.0, "no production to levelize costs over");
                (lccf * capex + crf * finance::present_value(rate, &inflated_opex))
                    / (1.0 - self.params.f64("Gross Revenue Tax Rate")?)
                    / energy
            }
        };
        Ok(musd_per_kwh * 1e6)
    }

    /// Yearly cash flow with the construction year first, MUSD
    pub fn project_cash_flow(capex: f64, annual_net: &Array1<f64>) -> Array1<f64> {
        std::iter::once(-capex)
            .chain(annual_net.iter().copied())
            .collect()
    }

    /// Sales revenue of each year, MUSD/yr
    pub fn revenue(
        &self,
        electricity: &Array1<f64>,
        heat: &Array1<f64>,
    ) -> anyhow::Result<Array1<f64>> {
        let electricity_price = self.outputs.series("Electricity Price")?;
        let heat_price = self.outputs.series("Heat Price")?;
        Ok((electricity * electricity_price + heat * heat_price) / 1e6)
    }

    /// Capital cost of every item before the total, MUSD
    fn capital_costs(&self, ctx: &EconomicsContext) -> anyhow::Result<IndexMap<&'static str, f64>> {
        let reservoir = ctx.reservoir;
        let wellbores = ctx.wellbores;
        let plant = ctx.surface_plant;
        let depth = reservoir.depth()?;
        let n_prod = wellbores.production_wells()? as f64;
        let n_inj = wellbores.injection_wells()? as f64;

        let correlation =
            DrillingCorrelation::from_code(self.params.int("Well Drilling Cost Correlation")?)?;
        let per_well = correlation.well_cost(depth);
        let mut wells = per_well * (n_prod + n_inj);
        if self.kind == EconomicsKind::Ags {
            let lateral = wellbores.params.f64("Nonvertical Length per Multilateral Section")?
                * wellbores.params.usize("Number of Multilateral Sections")? as f64;
            wells += n_prod * lateral * self.params.f64("Nonvertical Drilling Cost per Meter")? * 1e-6;
        }

        let stimulation = match self.kind {
            EconomicsKind::Standard => correlations::STIMULATION_PER_WELL * n_inj,
            EconomicsKind::Ags | EconomicsKind::Sutra => 0.0,
        };

        let max_heat = plant.outputs.scalar("Maximum Heat Produced")? / 1000.0;
        let max_gross = utils::ndarrmax(plant.outputs.series("Gross Electricity Produced")?) / 1000.0;
        let max_cooling = utils::ndarrmax(plant.outputs.series("Cooling Produced")?) / 1000.0;
        let surface_plant = match plant.kind {
            SurfacePlantKind::PowerPlant(plant_type) => {
                correlations::power_plant_cost(plant_type, max_gross)
                    + correlations::DIRECT_USE_PER_MW * max_heat
            }
            SurfacePlantKind::DirectUse | SurfacePlantKind::SutraStorage => {
                correlations::DIRECT_USE_PER_MW * max_heat
            }
            SurfacePlantKind::AbsorptionChiller => {
                correlations::DIRECT_USE_PER_MW * max_heat + correlations::CHILLER_PER_MW * max_cooling
            }
            SurfacePlantKind::HeatPump => {
                (correlations::DIRECT_USE_PER_MW + correlations::HEAT_PUMP_PER_MW) * max_heat
            }
            SurfacePlantKind::DistrictHeating => {
                let peak_demand = utils::ndarrmax(plant.outputs.series("Daily Heating Demand")?) / 1000.0;
                correlations::DIRECT_USE_PER_MW * max_heat
                    + correlations::PEAKING_BOILER_PER_MW * peak_demand
            }
        };

        let max_pumping = utils::ndarrmax(wellbores.outputs.series("Pumping Power")?) / 1000.0;
        let gathering = correlations::GATHERING_PER_WELL * (n_prod + n_inj)
            + correlations::GATHERING_PUMPS_PER_MW * max_pumping;

        let mut items = IndexMap::new();
        items.insert("Drilling Cost per Well", per_well);
        items.insert("Well Drilling and Completion Costs", wells);
        items.insert("Stimulation Costs", stimulation);
        items.insert("Surface Plant Costs", surface_plant);
        items.insert("Field Gathering System Costs", gathering);
        items.insert("Exploration Costs", correlations::exploration_cost(per_well));

        for (output_name, override_name, factor_name) in CAPITAL_ITEMS {
            let value = match self.params.f64_if_provided(override_name)? {
                // drilling overrides are per well
                Some(cost) if output_name == "Well Drilling and Completion Costs" => {
                    items.insert("Drilling Cost per Well", cost);
                    cost * (n_prod + n_inj)
                }
                Some(cost) => cost,
                None => items[output_name] * self.params.f64(factor_name)?,
            };
            items.insert(output_name, value);
        }

        let network = match plant.kind {
            SurfacePlantKind::DistrictHeating => {
                self.params.f64("District Heating Piping Cost")?
                    * self.params.f64("Total Length of District Heating Network")?
                    * 1000.0
                    * 1e-6
            }
            _ => 0.0,
        };
        items.insert("District Heating Network Costs", network);
        Ok(items)
    }

    /// O&M cost of every item before the total, MUSD/yr
    fn operating_costs(
        &self,
        ctx: &EconomicsContext,
        capital: &IndexMap<&'static str, f64>,
    ) -> anyhow::Result<IndexMap<&'static str, f64>> {
        let plant = ctx.surface_plant;
        let utilization = plant.utilization_factor()?;
        let wellfield = 0.015
            * (capital["Well Drilling and Completion Costs"] + capital["Field Gathering System Costs"]);
        let surface_plant = 0.025 * capital["Surface Plant Costs"] + 0.2;

        let water_lost = ctx.reservoir.water_loss_fraction()?
            * ctx.wellbores.outputs.scalar("Total Flow Rate")?
            * utils::SECONDS_PER_YEAR
            * utilization
            / 1000.0;
        let water = water_lost * self.params.f64("Water Cost")? * 1e-6;

        let peaking_fuel = match plant.kind {
            SurfacePlantKind::DistrictHeating => {
                let boiler_heat = utils::ndarrmean(plant.outputs.series("Annual Peaking Boiler Heat")?);
                let fuel = convert(
                    boiler_heat / plant.params.f64("Peaking Boiler Efficiency")?,
                    Unit::KilowattHour,
                    Unit::Mmbtu,
                )?;
                fuel * self.params.f64("Peaking Fuel Cost Rate")? * 1e-6
            }
            _ => 0.0,
        };

        let pumping = if self.end_use.produces_electricity() {
            0.0
        } else {
            let pumping_energy = utils::ndarrmean(plant.outputs.series("Annual Pumping Energy")?);
            let heat_pump_energy = utils::ndarrmean(plant.outputs.series("Heat Pump Electricity Used")?)
                * utils::HOURS_PER_YEAR
                * utilization;
            (pumping_energy + heat_pump_energy) * self.params.f64("Electricity Rate")? * 1e-6
        };

        let mut items = IndexMap::new();
        items.insert("Wellfield O&M", wellfield);
        items.insert("Surface Plant O&M", surface_plant);
        items.insert("Water O&M", water);
        items.insert("Peaking Boiler Fuel Cost", peaking_fuel);
        items.insert("Average Annual Pumping Cost", pumping);
        Ok(items)
    }

    /// Levelized cost of each delivered product.  When both electricity and heat are sold, each
    /// one's cost is credited with the other's sales.
    pub fn levelized_costs(
        &self,
        capex: f64,
        opex: &Array1<f64>,
        production: &Production,
    ) -> anyhow::Result<IndexMap<&'static str, f64>> {
        let both = self.end_use.by_product().is_some();
        let no_credit = Array1::zeros(production.years());
        let mut costs = IndexMap::new();
        for name in Self::levelized_outputs(self.end_use) {
            let cost = match name {
                "LCOE" => {
                    let credit = if both {
                        &production.heat * self.outputs.series("Heat Price")? / 1e6
                    } else {
                        no_credit.clone()
                    };
                    self.levelized_cost(capex, &(opex - &credit), &production.electricity)?
                }
                "LCOH" => {
                    let credit = if both {
                        &production.electricity * self.outputs.series("Electricity Price")? / 1e6
                    } else {
                        no_credit.clone()
                    };
                    self.levelized_cost(capex, &(opex - &credit), &production.heat)?
                }
                _ => self.levelized_cost(capex, opex, &production.cooling)?,
            };
            costs.insert(name, cost);
        }
        Ok(costs)
    }

    /// Name of the headline levelized cost
    pub fn primary_metric(&self) -> &'static str {
        if self.end_use == EndUseOption::AbsorptionChiller {
            "LCOC"
        } else if self.end_use.electricity_is_primary() {
            "LCOE"
        } else {
            "LCOH"
        }
    }

    pub fn calculate(&mut self, ctx: &EconomicsContext) -> anyhow::Result<()> {
        self.params.verify_required()?;
        let plant = ctx.surface_plant;
        let years = plant.time_grid()?.lifetime;

        let capital = self.capital_costs(ctx)?;
        let capex = match self.params.f64_if_provided("Total Capital Cost")? {
            Some(total) => total,
            None => capital
                .iter()
                .filter(|(name, _)| **name != "Drilling Cost per Well")
                .map(|(_, cost)| cost)
                .sum(),
        };
        let operating = self.operating_costs(ctx, &capital)?;
        let opex = match self.params.f64_if_provided("Total O&M Cost")? {
            Some(total) => total,
            None => operating.values().sum(),
        };

        let electricity_price = utils::escalating_price(
            self.params.f64("Starting Electricity Sale Price")?,
            self.params.f64("Ending Electricity Sale Price")?,
            self.params.f64("Electricity Escalation Rate Per Year")?,
            self.params.usize("Electricity Escalation Start Year")?,
            years,
        );
        let heat_price = utils::escalating_price(
            self.params.f64("Starting Heat Sale Price")?,
            self.params.f64("Ending Heat Sale Price")?,
            self.params.f64("Heat Escalation Rate Per Year")?,
            self.params.usize("Heat Escalation Start Year")?,
            years,
        );
        self.outputs.set_series("Electricity Price", electricity_price)?;
        self.outputs.set_series("Heat Price", heat_price)?;

        let production = Production::from_plant(plant)?;
        let levelized =
            self.levelized_costs(capex, &Array1::from_elem(years, opex), &production)?;

        // cooling is sold at the heat price
        let revenue = self.revenue(&production.electricity, &(&production.heat + &production.cooling))?;
        let cash_flow = Self::project_cash_flow(capex, &(&revenue - opex));
        let metrics = ProjectMetrics::new(self.discount_rate()?, capex, &cash_flow);

        let mut errors: ComboErrors<anyhow::Error> = ComboErrors::new();
        errors.check(
            capex >= 0.0 && capex.is_finite(),
            format!("total capital cost {capex:.3} MUSD is negative"),
        );
        errors.check(opex.is_finite(), "total O&M cost is not finite");
        let primary = self.primary_metric();
        match levelized.get(primary) {
            Some(cost) => errors.check(
                cost.is_finite() && *cost >= 0.0,
                format!("{primary} of {cost:.4} USD/kWh is not physical"),
            ),
            None => errors.check(false, format!("{primary} was not calculated")),
        }
        errors.check(
            cash_flow.iter().all(|cf| cf.is_finite()),
            "project cash flow is not finite",
        );
        errors.into_result(self.name())?;

        for (name, value) in capital.iter().chain(operating.iter()).chain(levelized.iter()) {
            self.outputs.set_scalar(name, *value)?;
        }
        self.outputs.set_scalar("Total Capital Costs", capex)?;
        self.outputs.set_scalar("Total O&M Costs", opex)?;
        self.outputs.set_series("Annual Revenue", revenue)?;
        self.outputs
            .set_series("Cumulative Cash Flow", utils::ndarrcumsum(&cash_flow))?;
        self.outputs.set_series("Project Cash Flow", cash_flow)?;
        metrics.write(&mut self.outputs, "")?;
        log::info!(
            "{} with the {}: {primary} = {:.4} USD/kWh",
            self.name(),
            self.model.description(),
            levelized.get(primary).copied().unwrap_or_default()
        );
        Ok(())
    }
}

impl SubModel for Economics {
    fn name(&self) -> &str {
        "Economics"
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

    fn economics(model: EconomicModel) -> Economics {
        Economics::new(EconomicsKind::Standard, model, EndUseOption::Electricity)
    }

    #[test]
    fn test_levelized_cost_without_discounting() {
        let mut econ = economics(EconomicModel::StandardLevelized);
        econ.read_parameters(&InputParameters::from_pairs([("Discount Rate", "0")]))
            .unwrap();
        let production = Array1::from_elem(10, 1.0e8);
        let cost = econ
            .levelized_cost(10.0, &Array1::zeros(10), &production)
            .unwrap();
        // 10 MUSD over 1e9 kWh
        assert!(cost.approx_eq(&0.01, 1e-12));
    }

    #[test]
    fn test_construction_inflation_compounds() {
        let mut econ = economics(EconomicModel::StandardLevelized);
        econ.read_parameters(&InputParameters::from_pairs([
            ("Discount Rate", "0"),
            ("Inflation Rate During Construction", "0.1"),
            ("Construction Years", "2"),
        ]))
        .unwrap();
        let production = Array1::from_elem(10, 1.0e8);
        let cost = econ
            .levelized_cost(10.0, &Array1::zeros(10), &production)
            .unwrap();
        assert!(cost.approx_eq(&(0.01 * 1.21), 1e-12));
    }

    #[test]
    fn test_fixed_charge_rate_model() {
        let econ = economics(EconomicModel::FixedChargeRate);
        let production = Array1::from_elem(10, 1.0e8);
        let cost = econ
            .levelized_cost(10.0, &Array1::from_elem(10, 1.0), &production)
            .unwrap();
        // (0.1 * 10 + 1) MUSD/yr over 1e8 kWh/yr
        assert!(cost.approx_eq(&0.02, 1e-12));
    }

    #[test]
    fn test_bicycle_without_taxes_matches_capital_recovery() {
        let mut econ = economics(EconomicModel::Bicycle);
        econ.read_parameters(&InputParameters::from_pairs([
            ("Combined Income Tax Rate", "0"),
            ("Fraction of Investment in Bonds", "0"),
            ("Inflated Equity Interest Rate", "0.07"),
        ]))
        .unwrap();
        let production = Array1::from_elem(30, 1.0e8);
        let cost = econ
            .levelized_cost(100.0, &Array1::zeros(30), &production)
            .unwrap();
        assert!(cost.approx_eq(&(finance::crf(0.07, 30) * 100.0 / 1.0e8 * 1e6), 1e-9));
    }

    #[test]
    fn test_no_production_is_an_error() {
        let econ = economics(EconomicModel::StandardLevelized);
        assert!(econ
            .levelized_cost(10.0, &Array1::zeros(5), &Array1::zeros(5))
            .is_err());
    }

    #[test]
    fn test_declared_levelized_outputs_follow_end_use() {
        let direct = Economics::new(
            EconomicsKind::Standard,
            EconomicModel::default(),
            EndUseOption::DirectUseHeat,
        );
        assert!(direct.outputs.contains("LCOH"));
        assert!(!direct.outputs.contains("LCOE"));
        assert_eq!(direct.primary_metric(), "LCOH");
        let chiller = Economics::new(
            EconomicsKind::Standard,
            EconomicModel::default(),
            EndUseOption::AbsorptionChiller,
        );
        assert_eq!(chiller.primary_metric(), "LCOC");
        assert!(!chiller.outputs.contains("LCOH"));
    }

    #[test]
    fn test_cash_flow_starts_with_capital() {
        let cash_flow = Economics::project_cash_flow(50.0, &array![10.0, 12.0]);
        assert_eq!(cash_flow, array![-50.0, 10.0, 12.0]);
    }
}
