use std::path::PathBuf;
use std::sync::Arc;

use geotherm_core::prelude::*;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../resources")
        .join(name)
}

fn calculated(input: InputParameters) -> Model {
    let mut model = Model::new(input);
    model.read_parameters().unwrap();
    model.calculate().unwrap();
    model
}

fn count(model: &Model, step: CalcStep) -> usize {
    model.trace().iter().filter(|s| **s == step).count()
}

#[test]
fn test_default_run_populates_every_output() {
    let model = calculated(InputParameters::default());
    for module in model.active_modules() {
        assert!(
            module.output_parameters().unset().is_empty(),
            "{} has unset outputs",
            module.name()
        );
    }
    assert!(model.addons.is_none() && model.ccus.is_none() && model.sdacgt.is_none());
    let lcoe = model.economics.outputs.scalar("LCOE").unwrap();
    assert!(lcoe.is_finite() && lcoe > 0.0);
}

#[test]
fn test_reservoir_model_selects_variant() {
    let model = calculated(InputParameters::from_pairs([("Reservoir Model", "3")]));
    assert_eq!(model.reservoir.kind, ReservoirKind::SingleFracture);
    assert_eq!(model.wellbores.kind, WellBoresKind::Standard);
}

#[test]
fn test_end_to_end_breakeven_price() {
    let model = calculated(InputParameters::from_pairs([
        ("Reservoir Model", "1"),
        ("Maximum Temperature", "400"),
        ("Number of Production Wells", "2"),
        ("Number of Injection Wells", "2"),
        ("Reservoir Depth", "3"),
    ]));
    let result = model.result().unwrap();
    let summary = result.section("SUMMARY OF RESULTS").unwrap();
    let entry = summary
        .get("Electricity breakeven price")
        .or_else(|| summary.get("Direct-Use heat breakeven price"))
        .unwrap();
    let price = entry.as_number().unwrap();
    assert!(price.is_finite() && price > 0.0);
    assert!(Unit::from_symbol(&entry.unit).is_ok());
    assert!(model.render_text().unwrap().contains("SUMMARY OF RESULTS"));
}

#[test]
fn test_only_addons_activated() {
    let pairs = [
        ("AddOn Nickname 1", "Solar"),
        ("AddOn CAPEX 1", "10"),
        ("AddOn Electricity Gained 1", "2e7"),
    ];
    let model = calculated(InputParameters::from_pairs(pairs));
    assert!(model.addons.is_some());
    assert!(model.ccus.is_none());
    assert!(model.sdacgt.is_none());
    assert_eq!(count(&model, CalcStep::AddOns), 1);
    assert_eq!(model.trace().last(), Some(&CalcStep::AddOns));

    let baseline = calculated(InputParameters::default());
    let with = model
        .surface_plant
        .outputs
        .series("Annual Electricity Production")
        .unwrap();
    let without = baseline
        .surface_plant
        .outputs
        .series("Annual Electricity Production")
        .unwrap();
    assert!((with - without).iter().all(|d| d.approx_eq(&2e7, 1e-9)));

    let addons = model.addons.as_ref().unwrap();
    assert_eq!(addons.outputs.scalar("AddOn CAPEX Total").unwrap(), 10.0);
    let capex = model.economics.outputs.scalar("Total Capital Costs").unwrap();
    assert!(addons
        .outputs
        .scalar("Adjusted Project CAPEX")
        .unwrap()
        .approx_eq(&(capex + 10.0), 1e-12));
}

#[test]
fn test_district_heating_recalculates_subsurface_once() {
    let model = calculated(InputParameters::from_pairs([
        ("End-Use Option", "7"),
        ("Annual District Heating Demand", "50"),
    ]));
    assert_eq!(model.trace().first(), Some(&CalcStep::DistrictHeatingDemand));
    for step in [CalcStep::Reservoir, CalcStep::WellBores, CalcStep::SurfacePlant] {
        assert_eq!(count(&model, step), 2, "{step:?}");
    }
    assert_eq!(count(&model, CalcStep::Economics), 1);

    let plant = &model.surface_plant.outputs;
    let utilization = plant.scalar("Effective Utilization Factor").unwrap();
    assert!(utilization > 0.0 && utilization <= 1.0);
    let supplied = plant.series("Annual Geothermal Heat Supplied").unwrap();
    let boiler = plant.series("Annual Peaking Boiler Heat").unwrap();
    let demand = plant.scalar("Annual Heating Demand").unwrap();
    for (s, b) in supplied.iter().zip(boiler.iter()) {
        assert!((s + b).approx_eq(&demand, 1e-9) || s + b > demand);
    }
    assert!(model.economics.outputs.scalar("LCOH").unwrap() > 0.0);
}

#[test]
fn test_district_heating_second_pass_uses_first_pass_utilization() {
    // the warmest day alone asks for more than the plant can deliver
    let model = calculated(InputParameters::from_pairs([
        ("End-Use Option", "7"),
        ("Annual District Heating Demand", "5000"),
    ]));
    let passes = model.utilization_passes();
    assert_eq!(passes.len(), 2);
    assert!(passes[0].applied.approx_eq(&0.9, 1e-12));
    assert_eq!(passes[1].applied, passes[0].reported);
    assert!(passes[0].reported.approx_eq(&1.0, 1e-9));
    assert!(passes[1].reported.approx_eq(&passes[0].reported, 1e-9));
    assert_eq!(
        model.surface_plant.utilization_factor().unwrap(),
        passes[1].reported
    );
}

#[test]
fn test_district_heating_demand_cap_changes_reservoir_history() {
    let district = calculated(InputParameters::from_pairs([
        ("End-Use Option", "7"),
        ("Annual District Heating Demand", "50"),
    ]));
    let direct_use = calculated(InputParameters::from_pairs([("End-Use Option", "2")]));
    let passes = district.utilization_passes();
    assert_eq!(passes.len(), 2);
    assert_eq!(passes[1].applied, passes[0].reported);
    assert!(passes[1].applied < 0.9);
    assert_eq!(direct_use.utilization_passes().len(), 1);

    let history = |model: &Model| {
        model
            .reservoir
            .outputs
            .series("Reservoir Temperature History")
            .unwrap()
            .clone()
    };
    let capped = history(&district);
    let uncapped = history(&direct_use);
    assert_eq!(capped[0], uncapped[0]);
    // less operating time means less drawdown
    assert!(capped[capped.len() - 1] > uncapped[uncapped.len() - 1]);
}

#[test]
fn test_bad_parameter_value_soft_fails() {
    let model = calculated(InputParameters::from_pairs([
        ("Reservoir Depth", "banana"),
        ("Number of Production Wells", "-4"),
    ]));
    let depth = model.reservoir.params.get("Reservoir Depth").unwrap();
    assert!(depth.provided);
    assert!(!depth.valid);
    assert_eq!(model.reservoir.params.f64("Reservoir Depth").unwrap(), 3.0);
    assert_eq!(model.wellbores.production_wells().unwrap(), 2);
}

#[test]
fn test_missing_external_simulator_is_fatal() {
    let mut model = Model::new(InputParameters::from_pairs([("Reservoir Model", "6")]));
    model.read_parameters().unwrap();
    let err = model.calculate().unwrap_err();
    assert!(format!("{err:#}").contains("TOUGH2 Executable Path"));
    assert_eq!(model.stage(), RunStage::ParametersRead);
}

#[test]
fn test_cache_returns_shared_result() {
    let cache = ResultCache::new();
    let input = InputParameters::from_pairs([("Number of Production Wells", "3")]);
    let first = cache.run(&input).unwrap();
    let second = cache.run(&input).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    let other = cache.run(&InputParameters::default()).unwrap();
    assert_ne!(*first, *other);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_closed_loop_direct_use() {
    let model = calculated(InputParameters::from_pairs([
        ("Is AGS", "True"),
        ("End-Use Option", "2"),
        ("Production Flow Rate per Well", "10"),
        ("Number of Production Wells", "1"),
        ("Number of Injection Wells", "0"),
    ]));
    assert_eq!(model.reservoir.kind, ReservoirKind::Cylindrical);
    assert_eq!(model.wellbores.kind, WellBoresKind::Ags);
    assert_eq!(model.economics.kind, EconomicsKind::Ags);
    assert_eq!(
        model.wellbores.outputs.scalar("Reservoir Pressure Drop").unwrap(),
        0.0
    );
    assert_eq!(model.economics.outputs.scalar("Stimulation Costs").unwrap(), 0.0);
    let lcoh = model.economics.outputs.scalar("LCOH").unwrap();
    assert!(lcoh.is_finite() && lcoh > 0.0);
}

#[test]
fn test_all_addons_from_deck() {
    let mut input = InputParameters::from_path(resource("addons.txt")).unwrap();
    input.insert("S-DAC-GT", "On");
    let model = calculated(input);
    let addon_steps: Vec<CalcStep> = model
        .trace()
        .iter()
        .copied()
        .filter(|s| matches!(s, CalcStep::AddOns | CalcStep::Ccus | CalcStep::SDacGt))
        .collect();
    assert_eq!(addon_steps, [CalcStep::AddOns, CalcStep::Ccus, CalcStep::SDacGt]);
    let addons = model.addons.as_ref().unwrap();
    assert_eq!(addons.nicknames().unwrap().len(), 2);
    assert!(addons
        .outputs
        .scalar("AddOn CAPEX Total")
        .unwrap()
        .approx_eq(&15.0, 1e-12));
    let ccus = model.ccus.as_ref().unwrap();
    assert!(ccus.outputs.series("CCUS Revenue").unwrap().sum() > 0.0);
    let dac = model.sdacgt.as_ref().unwrap();
    assert!(dac.outputs.scalar("Total CO2 Captured").unwrap() > 0.0);
    assert!(dac.outputs.scalar("Levelized Cost of DAC").unwrap() > 0.0);

    let result = model.result().unwrap();
    for section in ["AddOns", "CCUS", "S-DAC-GT"] {
        assert!(result.section(section).is_some(), "{section}");
    }
    assert!(model.render_text().unwrap().contains("CCUS RESULTS"));
}

#[test]
fn test_example_deck() {
    let model = Model::from_path(resource("example1.txt")).unwrap();
    assert_eq!(model.selectors.economic_model, EconomicModel::Bicycle);
    assert_eq!(model.selectors.plant_type, PowerPlantType::SupercriticalOrc);
    let mut model = model;
    model.read_parameters().unwrap();
    model.calculate().unwrap();
    let result = model.result().unwrap();
    let lcoe = result.get("Economics", "LCOE").unwrap();
    assert_eq!(lcoe.unit, "USD/MWh");
    assert!(lcoe.as_number().unwrap() > 0.0);
}

#[test]
fn test_missing_deck_runs_on_defaults() {
    let model = Model::from_path(resource("does-not-exist.txt")).unwrap();
    assert!(model.input.is_empty());
    assert_eq!(model.selectors, Selectors::default());
}
