//! Coupling to an external reservoir simulator (TOUGH2 or compatible).

use crate::imports::*;
use std::process::Command;

/// Conditions handed to the external simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub executable: PathBuf,
    pub model_name: String,
    pub rock_temperature: f64,
    pub injection_temperature: f64,
    /// kg/s
    pub total_flow: f64,
    /// m
    pub depth: f64,
    /// m**3
    pub volume: f64,
    /// W/m/K
    pub rock_conductivity: f64,
    /// Operating years to simulate
    pub operating_years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SimulatorRow {
    time_years: f64,
    temperature_degc: f64,
}

/// Produces a `(time in operating years, production temperature in degC)` history
pub trait ReservoirSimulator: std::fmt::Debug + Send + Sync {
    fn simulate(&self, request: &SimulationRequest) -> anyhow::Result<(Vec<f64>, Vec<f64>)>;
}

/// Runs `<executable> <input.csv> <output.csv>` in a scratch directory.  The input file holds
/// `name,value` rows of the [SimulationRequest]; the output must hold `time_years,
/// temperature_degc` rows.
#[derive(Debug, Default, Clone)]
pub struct ExternalProcess;

impl ReservoirSimulator for ExternalProcess {
    fn simulate(&self, request: &SimulationRequest) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
        let work_dir = std::env::temp_dir().join(format!(
            "geotherm-{}-{}",
            request.model_name,
            std::process::id()
        ));
        std::fs::create_dir_all(&work_dir)
            .with_context(|| format!("Could not create {work_dir:?}"))?;
        let input_path = work_dir.join(format!("{}.in.csv", request.model_name));
        let output_path = work_dir.join(format!("{}.out.csv", request.model_name));

        let mut wtr = csv::Writer::from_path(&input_path)?;
        wtr.write_record(["name", "value"])?;
        for (name, value) in [
            ("rock_temperature_degc", request.rock_temperature),
            ("injection_temperature_degc", request.injection_temperature),
            ("total_flow_kg_per_s", request.total_flow),
            ("depth_m", request.depth),
            ("volume_m3", request.volume),
            ("rock_conductivity_w_per_m_k", request.rock_conductivity),
            ("operating_years", request.operating_years),
        ] {
            let value = value.to_string();
            wtr.write_record([name, value.as_str()])?;
        }
        wtr.flush()?;

        log::info!("running reservoir simulator {:?}", request.executable);
        let status = Command::new(&request.executable)
            .arg(&input_path)
            .arg(&output_path)
            .current_dir(&work_dir)
            .status()
            .with_context(|| format!("Could not launch {:?}", request.executable))?;
        ensure!(
            status.success(),
            "reservoir simulator {:?} exited with {status}",
            request.executable
        );

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&output_path)
            .with_context(|| format!("Could not open simulator output {output_path:?}"))?;
        let mut times = vec![];
        let mut temperatures = vec![];
        for result in rdr.deserialize() {
            let row: SimulatorRow = result?;
            times.push(row.time_years);
            temperatures.push(row.temperature_degc);
        }
        ensure!(
            times.len() >= 2,
            "simulator output {output_path:?} needs at least two rows"
        );
        Ok((times, temperatures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_external_process_round_trip() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake_tough2.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf 'time_years,temperature_degc\\n0,160\\n40,150\\n' > \"$2\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let request = SimulationRequest {
            executable: script,
            model_name: "DoubletTest".into(),
            rock_temperature: 160.0,
            injection_temperature: 70.0,
            total_flow: 100.0,
            depth: 3000.0,
            volume: 1.25e8,
            rock_conductivity: 3.0,
            operating_years: 27.0,
        };
        let (times, temperatures) = ExternalProcess.simulate(&request).unwrap();
        assert_eq!(times, vec![0.0, 40.0]);
        assert_eq!(temperatures, vec![160.0, 150.0]);
    }

    #[test]
    fn test_missing_executable_fails() {
        let request = SimulationRequest {
            executable: PathBuf::from("/no/such/tough2"),
            model_name: "Missing".into(),
            rock_temperature: 160.0,
            injection_temperature: 70.0,
            total_flow: 100.0,
            depth: 3000.0,
            volume: 1.25e8,
            rock_conductivity: 3.0,
            operating_years: 27.0,
        };
        assert!(ExternalProcess.simulate(&request).is_err());
    }
}
