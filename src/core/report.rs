use crate::domain::model::{EstimateKind, SimulationReport};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, SimError};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<OutputFormat>> {
        let mut formats = Vec::new();
        for name in names {
            let format: OutputFormat = name.as_ref().parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }
}

impl FromStr for OutputFormat {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Text),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(SimError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: txt, csv, json".to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    run_id: &'a str,
    puzzle: &'a str,
    case: &'a str,
    kind: EstimateKind,
    seed: u64,
    trials: u64,
    monte_carlo: f64,
    std_error: f64,
    analytical: Option<f64>,
    abs_error: Option<f64>,
}

pub fn render_text(report: &SimulationReport) -> String {
    let mut lines = vec![format!("Run {} ({} ms)", report.run_id, report.elapsed_ms)];

    for result in &report.results {
        lines.push(String::new());
        lines.push(format!("*** {} ***", result.title));
        lines.push(format!(
            "    seed {}, {} trials per case, {} ms",
            result.seed, result.trials, result.elapsed_ms
        ));
        for estimate in &result.estimates {
            let analytical = estimate
                .analytical
                .map(|exact| format!("{:.6}", exact))
                .unwrap_or_else(|| "n/a".to_string());
            lines.push(format!(
                "    {:<24} MC: {:>10.6} ± {:.6}   analytical: {}",
                estimate.case, estimate.monte_carlo, estimate.std_error, analytical
            ));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn render_csv(report: &SimulationReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for result in &report.results {
        for estimate in &result.estimates {
            writer.serialize(CsvRow {
                run_id: &report.run_id,
                puzzle: &estimate.puzzle,
                case: &estimate.case,
                kind: estimate.kind,
                seed: result.seed,
                trials: estimate.trials,
                monte_carlo: estimate.monte_carlo,
                std_error: estimate.std_error,
                analytical: estimate.analytical,
                abs_error: estimate.abs_error(),
            })?;
        }
    }

    let bytes = writer.into_inner().map_err(|e| SimError::ProcessingError {
        message: format!("CSV writer flush failed: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| SimError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

pub fn render_json(report: &SimulationReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render(report: &SimulationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Csv => render_csv(report),
        OutputFormat::Json => render_json(report),
    }
}

/// Persists a report in each requested format as `<run_id>.<ext>`.
pub struct ReportWriter<S: Storage> {
    storage: S,
    base_path: String,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S, base_path: impl Into<String>) -> Self {
        Self {
            storage,
            base_path: base_path.into(),
        }
    }

    pub async fn write(
        &self,
        report: &SimulationReport,
        formats: &[OutputFormat],
    ) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(formats.len());
        for &format in formats {
            let file_name = format!("{}.{}", report.run_id, format.extension());
            let content = render(report, format)?;

            tracing::debug!("Writing {} ({} bytes)", file_name, content.len());
            self.storage.write_file(&file_name, content.as_bytes()).await?;

            written.push(format!("{}/{}", self.base_path, file_name));
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Estimate, PuzzleResult};
    use chrono::Utc;

    fn sample_report() -> SimulationReport {
        SimulationReport {
            run_id: "sim_test".to_string(),
            started_at: Utc::now(),
            elapsed_ms: 12,
            results: vec![PuzzleResult {
                puzzle: "elevator".to_string(),
                title: "The Gamow-Stern Elevator Problem".to_string(),
                seed: 31072022,
                trials: 1000,
                elapsed_ms: 3,
                estimates: vec![
                    Estimate {
                        puzzle: "elevator".to_string(),
                        case: "elevators=1".to_string(),
                        kind: EstimateKind::Probability,
                        trials: 1000,
                        monte_carlo: 0.84,
                        std_error: 0.0116,
                        analytical: Some(5.0 / 6.0),
                    },
                    Estimate {
                        puzzle: "elevator".to_string(),
                        case: "elevators=2".to_string(),
                        kind: EstimateKind::Probability,
                        trials: 1000,
                        monte_carlo: 0.71,
                        std_error: 0.0143,
                        analytical: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_parse_formats() {
        let formats = OutputFormat::parse_list(&["csv", "JSON", "text", "csv"]).unwrap();
        assert_eq!(
            formats,
            vec![OutputFormat::Csv, OutputFormat::Json, OutputFormat::Text]
        );
        assert!(OutputFormat::parse_list(&["xlsx"]).is_err());
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sample_report());
        assert!(text.contains("*** The Gamow-Stern Elevator Problem ***"));
        assert!(text.contains("elevators=1"));
        assert!(text.contains("analytical: 0.833333"));
        assert!(text.contains("analytical: n/a"));
        assert!(text.starts_with("Run "));
        assert!(text.ends_with('\n'));
        assert!(text.contains("\n\n*** "));
    }

    #[test]
    fn test_render_csv() {
        let csv = render_csv(&sample_report()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "run_id,puzzle,case,kind,seed,trials,monte_carlo,std_error,analytical,abs_error"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("sim_test,elevator,elevators=1,probability,31072022,1000,0.84,"));
        let second = lines.next().unwrap();
        assert!(second.ends_with(",,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_render_json_round_trips() {
        let report = sample_report();
        let json = render_json(&report).unwrap();
        let parsed: SimulationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.results[0].estimates, report.results[0].estimates);
    }
}
