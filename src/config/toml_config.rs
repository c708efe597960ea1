use crate::core::report::OutputFormat;
use crate::core::ConfigProvider;
use crate::puzzles::{PuzzleKind, PuzzleParams};
use crate::utils::error::{Result, SimError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub simulation: SimulationSection,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
    #[serde(default)]
    pub puzzles: PuzzlesSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    pub name: String,
    pub description: Option<String>,
    pub trials: Option<u64>,
    pub seed: Option<u64>,
    pub concurrency: Option<usize>,
    pub run_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            output_formats: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PuzzlesSection {
    /// Slugs to run; every puzzle when absent.
    pub enabled: Option<Vec<String>>,
    #[serde(flatten)]
    pub params: PuzzleParams,
    /// Keys under `[puzzles]` that name no puzzle, e.g. a misspelt section.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, toml::Value>,
}

const PUZZLE_SECTIONS: [&str; 6] = [
    "enabled",
    "dishwasher",
    "malt_shop",
    "parking",
    "coin_game",
    "elevator",
];

const DEFAULT_TRIALS: u64 = 100_000;
const DEFAULT_CONCURRENCY: usize = 4;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SimError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables stay verbatim.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn params(&self) -> &PuzzleParams {
        &self.puzzles.params
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn run_id(&self) -> Option<&str> {
        self.simulation.run_id.as_deref()
    }
}

impl ConfigProvider for TomlConfig {
    fn puzzles(&self) -> Result<Vec<PuzzleKind>> {
        match &self.puzzles.enabled {
            Some(names) => PuzzleKind::parse_list(names),
            None => Ok(PuzzleKind::ALL.to_vec()),
        }
    }

    fn trials(&self) -> u64 {
        self.simulation.trials.unwrap_or(DEFAULT_TRIALS)
    }

    fn seed(&self) -> Option<u64> {
        self.simulation.seed
    }

    fn concurrency(&self) -> usize {
        self.simulation.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.output_formats
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("simulation.name", &self.simulation.name)?;
        validate_positive_number("simulation.trials", self.trials(), 1)?;
        validate_positive_number("simulation.concurrency", self.concurrency(), 1)?;
        if let Some(run_id) = self.run_id() {
            validate_path("simulation.run_id", run_id)?;
        }

        if let Some(key) = self.puzzles.unknown.keys().next() {
            return Err(SimError::InvalidConfigValueError {
                field: "puzzles".to_string(),
                value: key.clone(),
                reason: format!("Unknown key; expected one of: {}", PUZZLE_SECTIONS.join(", ")),
            });
        }

        OutputFormat::parse_list(&self.output.output_formats)?;
        validate_path("output.output_path", &self.output.output_path)?;

        // building validates every selected puzzle's parameters
        self.params().build_all(&self.puzzles()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config() {
        let config = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "minimal"
"#,
        )
        .unwrap();

        assert_eq!(config.trials(), DEFAULT_TRIALS);
        assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(config.puzzles().unwrap().len(), 5);
        assert_eq!(config.params().elevator.floors, 7);
        assert!(config.output_formats().is_empty());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "full"
trials = 5000
seed = 42
concurrency = 2

[output]
output_path = "./reports"
output_formats = ["csv", "json"]

[monitoring]
enabled = true

[puzzles]
enabled = ["elevator", "coin-game"]

[puzzles.elevator]
floors = 10
gamow_floor = 3
elevator_counts = [1, 4]

[puzzles.coin_game]
max_rounds = 500
cases = [{ coins = [2, 2, 2], bias = 0.5 }]
"#,
        )
        .unwrap();

        assert_eq!(config.trials(), 5000);
        assert_eq!(config.seed(), Some(42));
        assert_eq!(
            config.puzzles().unwrap(),
            vec![PuzzleKind::Elevator, PuzzleKind::CoinGame]
        );
        assert_eq!(config.params().elevator.floors, 10);
        assert_eq!(config.params().elevator.elevator_counts, vec![1, 4]);
        assert_eq!(config.params().coin_game.max_rounds, 500);
        assert_eq!(config.params().coin_game.cases[0].coins, [2, 2, 2]);
        // untouched sections keep their defaults
        assert_eq!(config.params().dishwasher.clumsy_threshold, 4);
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PUZZLE_SIM_TEST_OUTPUT", "/tmp/puzzle-reports");

        let config = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "env"

[output]
output_path = "${PUZZLE_SIM_TEST_OUTPUT}"
"#,
        )
        .unwrap();
        assert_eq!(config.output_path(), "/tmp/puzzle-reports");

        std::env::remove_var("PUZZLE_SIM_TEST_OUTPUT");
    }

    #[test]
    fn test_invalid_puzzle_params_fail_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "bad"

[puzzles.elevator]
gamow_floor = 9
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_puzzle_and_format_fail_validation() {
        let unknown = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "bad"

[puzzles]
enabled = ["dice"]
"#,
        )
        .unwrap();
        assert!(unknown.validate().is_err());

        let format = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "bad"

[output]
output_formats = ["xlsx"]
"#,
        )
        .unwrap();
        assert!(format.validate().is_err());
    }

    #[test]
    fn test_misspelt_puzzle_section_is_rejected() {
        let config = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "typo"

[puzzles.maltshop]
arrival_window = 60.0
"#,
        )
        .unwrap();

        match config.validate() {
            Err(SimError::InvalidConfigValueError { field, value, .. }) => {
                assert_eq!(field, "puzzles");
                assert_eq!(value, "maltshop");
            }
            other => panic!("expected unknown section error, got {:?}", other),
        }
        // the misspelt section must not leak into the real parameters
        assert_eq!(config.params().malt_shop.arrival_window, 30.0);
    }

    #[test]
    fn test_unknown_puzzle_parameter_is_rejected() {
        let err = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "typo"

[puzzles.elevator]
floor = 10
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::ConfigValidationError { .. }));

        let case = TomlConfig::from_toml_str(
            r#"
[simulation]
name = "typo"

[puzzles.malt_shop]
cases = [{ alice_wait = 5.0, bob_wiat = 7.0 }]
"#,
        );
        assert!(case.is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = TomlConfig::from_toml_str("[simulation\nname = ").unwrap_err();
        assert!(matches!(err, SimError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[simulation]
name = "file-test"
trials = 10
"#,
            )
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.simulation.name, "file-test");
        assert_eq!(config.trials(), 10);
    }
}
