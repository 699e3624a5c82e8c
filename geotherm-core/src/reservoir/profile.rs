//! Reservoir temperature histories read from files: user-provided profiles and SUTRA outputs.

use crate::imports::*;

/// Loads a user-provided production temperature profile, one temperature (degC) per row.
/// A non-numeric first row is treated as a header.
pub fn read_temperature_profile<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<f64>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Could not open reservoir output file {path:?}"))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    let mut temperatures = vec![];
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let Some(field) = record.iter().last() else {
            continue;
        };
        match field.parse::<f64>() {
            Ok(temperature) => temperatures.push(temperature),
            Err(_) if i == 0 => continue,
            Err(err) => bail!("{path:?} row {}: `{field}`: {err}", i + 1),
        }
    }
    ensure!(!temperatures.is_empty(), "reservoir output file {path:?} is empty");
    Ok(temperatures)
}

/// Maps a profile sampled `steps_per_year` times per operating year onto `t_op`.  Times past the
/// end of the profile hold its last value.
pub fn profile_on_grid(
    profile: &[f64],
    steps_per_year: usize,
    t_op: &Array1<f64>,
) -> anyhow::Result<Array1<f64>> {
    if profile.len() == 1 {
        return Ok(Array1::from_elem(t_op.len(), profile[0]));
    }
    let span = (profile.len() - 1) as f64 / steps_per_year as f64;
    if let Some(last) = t_op.last() {
        if *last > span + 1e-9 {
            log::warn!(
                "reservoir output profile covers {span:.2} yr but {last:.2} operating yr are simulated, holding last value"
            );
        }
    }
    let times: Vec<f64> = (0..profile.len())
        .map(|i| i as f64 / steps_per_year as f64)
        .collect();
    t_op.iter()
        .map(|t| utils::interpolate(*t, &times, profile, false))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SutraWellRow {
    time_years: f64,
    /// Positive while producing from the hot well
    flow_rate_kg_per_s: f64,
    hot_well_temperature_degc: f64,
    cold_well_temperature_degc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SutraBudgetRow {
    time_years: f64,
    heat_stored_kw: f64,
    heat_extracted_kw: f64,
}

/// SUTRA well and energy-budget histories interpolated onto the simulation time grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SutraHistory {
    /// kg/s
    pub flow_rate: Array1<f64>,
    pub hot_well_temperature: Array1<f64>,
    pub cold_well_temperature: Array1<f64>,
    /// kW
    pub heat_stored: Array1<f64>,
    /// kW
    pub heat_extracted: Array1<f64>,
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("Could not open SUTRA file {path:?}"))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);
    let mut rows = vec![];
    for result in rdr.deserialize() {
        rows.push(result.with_context(|| format!("Malformed row in {path:?}"))?);
    }
    ensure!(!rows.is_empty(), "SUTRA file {path:?} is empty");
    Ok(rows)
}

fn on_grid(times: &[f64], values: Vec<f64>, grid: &Array1<f64>) -> anyhow::Result<Array1<f64>> {
    if times.len() == 1 {
        return Ok(Array1::from_elem(grid.len(), values[0]));
    }
    grid.iter()
        .map(|t| utils::interpolate(*t, times, &values, false))
        .collect()
}

impl SutraHistory {
    /// Reads the SUTRA well file (`time_years, flow_rate_kg_per_s, hot_well_temperature_degc,
    /// cold_well_temperature_degc`) and budget file (`time_years, heat_stored_kw,
    /// heat_extracted_kw`)
    pub fn from_files<P: AsRef<Path>>(
        well_file: P,
        budget_file: P,
        years: &Array1<f64>,
    ) -> anyhow::Result<Self> {
        let wells: Vec<SutraWellRow> = read_rows(well_file.as_ref())?;
        let budget: Vec<SutraBudgetRow> = read_rows(budget_file.as_ref())?;
        let well_times: Vec<f64> = wells.iter().map(|r| r.time_years).collect();
        let budget_times: Vec<f64> = budget.iter().map(|r| r.time_years).collect();
        Ok(Self {
            flow_rate: on_grid(
                &well_times,
                wells.iter().map(|r| r.flow_rate_kg_per_s.abs()).collect(),
                years,
            )?,
            hot_well_temperature: on_grid(
                &well_times,
                wells.iter().map(|r| r.hot_well_temperature_degc).collect(),
                years,
            )?,
            cold_well_temperature: on_grid(
                &well_times,
                wells.iter().map(|r| r.cold_well_temperature_degc).collect(),
                years,
            )?,
            heat_stored: on_grid(
                &budget_times,
                budget.iter().map(|r| r.heat_stored_kw).collect(),
                years,
            )?,
            heat_extracted: on_grid(
                &budget_times,
                budget.iter().map(|r| r.heat_extracted_kw).collect(),
                years,
            )?,
        })
    }
}
