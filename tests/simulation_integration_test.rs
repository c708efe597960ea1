use anyhow::Result;
use puzzle_sim::core::estimator::ProportionEstimator;
use puzzle_sim::domain::model::EstimateKind;
use puzzle_sim::{
    LocalStorage, OutputFormat, PuzzleKind, PuzzleParams, ReportWriter, RunSettings,
    SimulationEngine,
};
use tempfile::TempDir;

fn settings(trials: u64) -> RunSettings {
    RunSettings {
        trials,
        seed: None,
        concurrency: 3,
        run_id: Some("integration".to_string()),
    }
}

#[tokio::test]
async fn test_all_puzzles_agree_with_analytical_values() -> Result<()> {
    let puzzles = PuzzleParams::default().build_all(&PuzzleKind::ALL)?;
    let engine = SimulationEngine::new(puzzles, settings(20_000));

    let report = engine.run().await?;
    assert_eq!(report.results.len(), 5);

    for estimate in report.estimates() {
        if estimate.kind == EstimateKind::Probability {
            assert!(
                (0.0..=1.0).contains(&estimate.monte_carlo),
                "{:?}",
                estimate
            );
        }
        if let Some(z) = estimate.z_score() {
            assert!(z.abs() < 5.0, "{:?}", estimate);
        }
    }

    let dishwasher = report.result_for("dishwasher").unwrap();
    assert_eq!(dishwasher.seed, PuzzleKind::Dishwasher.default_seed());
    assert_eq!(dishwasher.estimates.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_same_seed_reproduces_report() -> Result<()> {
    let params = PuzzleParams::default();
    let kinds = [PuzzleKind::MaltShop, PuzzleKind::CoinGame];

    let first = SimulationEngine::new(params.build_all(&kinds)?, settings(2_000))
        .run()
        .await?;
    let second = SimulationEngine::new(params.build_all(&kinds)?, settings(2_000))
        .run()
        .await?;

    let a: Vec<_> = first.estimates().cloned().collect();
    let b: Vec<_> = second.estimates().cloned().collect();
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn test_reports_are_written_in_each_format() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_string_lossy().into_owned();

    let puzzles = PuzzleParams::default().build_all(&[PuzzleKind::Elevator])?;
    let report = SimulationEngine::new(puzzles, settings(1_000)).run().await?;

    let writer = ReportWriter::new(LocalStorage::new(output_path.clone()), output_path.clone());
    let formats = OutputFormat::parse_list(&["txt", "csv", "json"])?;
    let written = writer.write(&report, &formats).await?;

    assert_eq!(written.len(), 3);
    for extension in ["txt", "csv", "json"] {
        let path = temp_dir.path().join(format!("integration.{}", extension));
        assert!(path.exists(), "missing {}", path.display());
    }

    let csv = std::fs::read_to_string(temp_dir.path().join("integration.csv"))?;
    let mut reader = csv::Reader::from_reader(csv.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    // one row per elevator count
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| &row[1] == "elevator"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("integration.json"))?)?;
    assert_eq!(json["run_id"], "integration");
    assert_eq!(json["results"][0]["puzzle"], "elevator");
    Ok(())
}

#[test]
fn test_proportion_estimator_is_public() {
    let mut estimator = ProportionEstimator::new();
    estimator.record(true);
    estimator.record(false);
    assert_eq!(estimator.estimate(), 0.5);
}
