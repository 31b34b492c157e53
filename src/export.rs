//! Trajectory export for analysis in external tools.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::EcoResult;
use crate::integrator::Trajectory;
use crate::params::SpeciesNames;

/// Output format for a trajectory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    /// Response-shaped JSON list
    Json,
    Csv,
}

impl ExportFormat {
    /// Guess from a file extension, defaulting to JSON
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Export system for saving trajectories
pub struct ExportSystem;

impl ExportSystem {
    /// Write CSV with one row per record.
    ///
    /// Column headers are the species names when given, otherwise
    /// `prey,lower_predator,apex_predator`.
    pub fn write_csv<W: Write>(
        trajectory: &Trajectory,
        names: Option<&SpeciesNames>,
        mut out: W,
    ) -> EcoResult<()> {
        let header = match names {
            Some(n) => n.as_array().map(csv_field).join(","),
            None => "prey,lower_predator,apex_predator".to_string(),
        };
        writeln!(out, "time,{}", header)?;

        for record in trajectory {
            let p = record.populations;
            writeln!(
                out,
                "{},{},{},{}",
                record.time, p.prey, p.lower_predator, p.apex_predator
            )?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn export_csv<P: AsRef<Path>>(
        trajectory: &Trajectory,
        names: Option<&SpeciesNames>,
        path: P,
    ) -> EcoResult<()> {
        let file = BufWriter::new(File::create(path)?);
        Self::write_csv(trajectory, names, file)
    }

    /// Write the trajectory in the endpoint's response shape
    pub fn export_json<P: AsRef<Path>>(trajectory: &Trajectory, path: P) -> EcoResult<()> {
        let mut file = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut file, trajectory)?;
        file.flush()?;
        Ok(())
    }

    pub fn export<P: AsRef<Path>>(
        trajectory: &Trajectory,
        names: Option<&SpeciesNames>,
        format: ExportFormat,
        path: P,
    ) -> EcoResult<()> {
        match format {
            ExportFormat::Json => Self::export_json(trajectory, path),
            ExportFormat::Csv => Self::export_csv(trajectory, names, path),
        }
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> EcoResult<Trajectory> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Quote a header field if it contains CSV metacharacters
fn csv_field(name: &str) -> String {
    if name.contains([',', '"', '\n']) {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::PopulationState;
    use crate::integrator::simulate;
    use crate::params::SimulationState;
    use std::fs;
    use tempfile::tempdir;

    fn default_run() -> Trajectory {
        let config = SimulationState::default().to_config().unwrap();
        simulate(&config, PopulationState::new(50.0, 10.0, 2.0)).unwrap()
    }

    #[test]
    fn test_export_csv() {
        let traj = default_run();
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.csv");

        ExportSystem::export_csv(&traj, None, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("time,prey,lower_predator,apex_predator"));
        assert_eq!(lines.next(), Some("0,50,10,2"));
        assert_eq!(content.lines().count(), traj.len() + 1);
    }

    #[test]
    fn test_csv_uses_names() {
        let traj = default_run();
        let names = SpeciesNames {
            prey: "rabbit".into(),
            lower_predator: "fox, red".into(),
            apex_predator: "wolf".into(),
        };
        let mut buf = Vec::new();
        ExportSystem::write_csv(&traj, Some(&names), &mut buf).unwrap();

        let content = String::from_utf8(buf).unwrap();
        assert!(content.starts_with("time,rabbit,\"fox, red\",wolf\n"));
    }

    #[test]
    fn test_export_json_roundtrip() {
        let traj = default_run();
        let dir = tempdir().unwrap();
        let path = dir.path().join("trajectory.json");

        ExportSystem::export(&traj, None, ExportFormat::Json, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(r#"[{"time":0.0,"populations":[50.0,10.0,2.0]}"#));
        let loaded = ExportSystem::load_json(&path).unwrap();
        assert_eq!(loaded.len(), traj.len());
        for (a, b) in loaded.iter().zip(&traj) {
            assert!((a.time - b.time).abs() < 1e-9);
            assert!((a.populations.prey - b.populations.prey).abs() < 1e-6);
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path("out.CSV"), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path("out.json"), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path("out"), ExportFormat::Json);
    }
}
