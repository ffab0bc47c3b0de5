//! Configuration structures for the shop floor simulator
//!
//! This module contains the run configuration, the dispatch weight vector, the
//! command line arguments and the validation logic applied before a run starts.
//! Validation never stops at the first problem: every violated field is
//! collected into a single [`ConfigRejection`].

use crate::shop::ShopFloorConfig;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Default values and fixed bounds
pub mod defaults {
    /// Default simulation horizon (24 hours)
    pub const HORIZON_MINUTES: f64 = 1440.0;

    /// Default length of one orchestration slice
    pub const SLICE_MINUTES: f64 = 30.0;

    /// Performance assumed for an (operator, task) pair with no history
    pub const DEFAULT_PERFORMANCE: f64 = 0.35;

    /// Upper bound of any performance value
    pub const MAX_PERFORMANCE: f64 = 1.15;

    /// Number of latest samples averaged for reporting
    pub const PERFORMANCE_WINDOW: usize = 5;

    /// Allowed deviation of the weight sum from 1.0
    pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

    /// Default scenario generator sizes
    pub const OPERATOR_COUNT: usize = 4;
    /// Default number of generated machines
    pub const MACHINE_COUNT: usize = 3;
    /// Default number of generated products
    pub const PRODUCT_COUNT: usize = 2;
    /// Default number of phases per generated product
    pub const PHASES_PER_PRODUCT: usize = 3;
    /// Default quantity ordered per generated product
    pub const UNITS_PER_PRODUCT: u32 = 2;
}

/// Weights of the four dispatch criteria
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchWeights {
    /// Weight of the sub-performance cost score
    pub cost: f64,
    /// Weight of the performance score
    pub performance: f64,
    /// Weight of the workload equity score
    pub equity: f64,
    /// Weight of the makespan impact score
    pub makespan: f64,
}

impl Default for DispatchWeights {
    fn default() -> Self {
        Self { cost: 0.4, performance: 0.2, equity: 0.2, makespan: 0.2 }
    }
}

impl DispatchWeights {
    /// Create a weight vector
    pub fn new(cost: f64, performance: f64, equity: f64, makespan: f64) -> Self {
        Self { cost, performance, equity, makespan }
    }

    /// Sum of all weights
    pub fn sum(&self) -> f64 {
        self.cost + self.performance + self.equity + self.makespan
    }

    /// Collect every violation of the weight vector
    pub fn violations(&self) -> Vec<ConfigValidationError> {
        let mut violations = Vec::new();

        for (field, value) in [
            ("weights.cost", self.cost),
            ("weights.performance", self.performance),
            ("weights.equity", self.equity),
            ("weights.makespan", self.makespan),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                violations.push(ConfigValidationError::InvalidWeight {
                    field: field.to_string(),
                    value,
                });
            }
        }

        let sum = self.sum();
        if !sum.is_finite() || (sum - 1.0).abs() > defaults::WEIGHT_SUM_TOLERANCE {
            violations.push(ConfigValidationError::InvalidWeightSum { sum });
        }

        violations
    }

    /// Validate the weight vector
    pub fn validate(&self) -> Result<(), ConfigRejection> {
        ConfigRejection::from_violations(self.violations())
    }
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shop-floor-simulator",
    version = "0.1.0",
    about = "Shop Floor Simulator - discrete-event simulation of operators, machines and tasks",
    long_about = "Simulates a manufacturing shop floor on a virtual clock: operators with learning and forgetting curves are dispatched to product tasks on machines by a weighted multi-criteria policy.

EXAMPLES:
    # Run a generated scenario with default settings
    shop-floor-simulator

    # Run a scenario described in a file
    shop-floor-simulator --shop-floor shop.json

    # Override the horizon and the dispatch weights
    shop-floor-simulator --horizon 960 --weight-cost 0.5 --weight-makespan 0.1

    # Generate configuration template
    shop-floor-simulator --print-config > my-config.json

    # Validate configuration without running
    shop-floor-simulator --config my-config.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Shop floor description file path (JSON format)
    #[arg(
        long,
        help = "Shop floor description file (JSON format)",
        long_help = "Path to a JSON file listing operators, machines, products and tasks. Takes precedence over a shop_floor section in the configuration file. When neither is given a scenario is generated."
    )]
    pub shop_floor: Option<String>,

    /// Simulation horizon in minutes
    #[arg(long, help = "Simulation horizon in minutes. Default: 1440")]
    pub horizon: Option<f64>,

    /// Orchestration slice length in minutes
    #[arg(long, help = "Slice length in minutes. Default: 30")]
    pub slice: Option<f64>,

    /// Weight of the cost criterion
    #[arg(long, help = "Weight of the sub-performance cost criterion (0.0-1.0)")]
    pub weight_cost: Option<f64>,

    /// Weight of the performance criterion
    #[arg(long, help = "Weight of the performance criterion (0.0-1.0)")]
    pub weight_performance: Option<f64>,

    /// Weight of the equity criterion
    #[arg(long, help = "Weight of the equity criterion (0.0-1.0)")]
    pub weight_equity: Option<f64>,

    /// Weight of the makespan criterion
    #[arg(long, help = "Weight of the makespan criterion (0.0-1.0)")]
    pub weight_makespan: Option<f64>,

    /// Performance assumed before the first execution
    #[arg(long, help = "Performance assumed before any history exists. Default: 0.35")]
    pub default_performance: Option<f64>,

    /// Calendar time of virtual minute zero
    #[arg(long, help = "Calendar time of minute zero (RFC 3339)")]
    pub epoch: Option<DateTime<Utc>>,

    /// Random seed for scenario generation
    #[arg(long, help = "Random seed for reproducible scenario generation")]
    pub seed: Option<u64>,

    /// Number of generated operators
    #[arg(long, help = "Number of operators in a generated scenario")]
    pub operators: Option<usize>,

    /// Number of generated machines
    #[arg(long, help = "Number of machines in a generated scenario")]
    pub machines: Option<usize>,

    /// Number of generated products
    #[arg(long, help = "Number of products in a generated scenario")]
    pub products: Option<usize>,

    /// Number of phases per generated product
    #[arg(long, help = "Number of phases per product in a generated scenario")]
    pub phases: Option<usize>,

    /// Output path for the run report
    #[arg(short, long, help = "Output path for the JSON run report (stdout if omitted)")]
    pub output: Option<String>,

    /// Output path for the persisted event trail
    #[arg(long, help = "Output path for the JSON lines record of assignments, samples, events and logs")]
    pub events_output: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Simulation horizon in minutes
    pub horizon_minutes: Option<f64>,

    /// Orchestration slice length in minutes
    pub slice_minutes: Option<f64>,

    /// Dispatch criteria weights
    pub weights: Option<DispatchWeights>,

    /// Performance assumed before the first execution
    pub default_performance: Option<f64>,

    /// Calendar time of virtual minute zero
    pub epoch: Option<DateTime<Utc>>,

    /// Random seed for scenario generation
    pub seed: Option<u64>,

    /// Number of generated operators
    pub operator_count: Option<usize>,

    /// Number of generated machines
    pub machine_count: Option<usize>,

    /// Number of generated products
    pub product_count: Option<usize>,

    /// Number of phases per generated product
    pub phases_per_product: Option<usize>,

    /// Quantity ordered per generated product
    pub units_per_product: Option<u32>,

    /// Output path for the run report
    pub report_output: Option<String>,

    /// Output path for the persisted event trail
    pub events_output: Option<String>,

    /// Embedded shop floor description
    pub shop_floor: Option<ShopFloorConfig>,
}

/// Configuration for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulation horizon in minutes
    pub horizon_minutes: f64,

    /// Orchestration slice length in minutes
    pub slice_minutes: f64,

    /// Dispatch criteria weights
    pub weights: DispatchWeights,

    /// Performance assumed for an (operator, task) pair with no history
    pub default_performance: f64,

    /// Calendar time of virtual minute zero
    pub epoch: Option<DateTime<Utc>>,

    /// Random seed for scenario generation
    pub seed: Option<u64>,

    /// Number of generated operators
    pub operator_count: usize,

    /// Number of generated machines
    pub machine_count: usize,

    /// Number of generated products
    pub product_count: usize,

    /// Number of phases per generated product
    pub phases_per_product: usize,

    /// Quantity ordered per generated product
    pub units_per_product: u32,

    /// Output path for the run report
    pub report_output: Option<String>,

    /// Output path for the persisted event trail
    pub events_output: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// A single violated configuration field
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    /// Horizon is not a positive number of minutes
    #[error("Horizon must be greater than 0, got {0}")]
    InvalidHorizon(f64),

    /// Slice length is not a positive number of minutes
    #[error("Slice length must be greater than 0, got {0}")]
    InvalidSliceLength(f64),

    /// A weight is outside [0, 1]
    #[error("Invalid weight for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidWeight {
        /// Name of the weight field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Weights do not sum to 1.0
    #[error("Dispatch weights must sum to 1.0 (±0.01), got {sum}")]
    InvalidWeightSum {
        /// The actual sum
        sum: f64,
    },

    /// Default performance outside (0, 1.15]
    #[error("Default performance must be in (0, 1.15], got {0}")]
    InvalidDefaultPerformance(f64),

    /// A generator size is zero
    #[error("{field} must be greater than 0")]
    InvalidCount {
        /// Name of the count field
        field: String,
    },

    /// No operators configured
    #[error("At least one operator is required")]
    EmptyOperators,

    /// No tasks configured
    #[error("At least one task is required")]
    EmptyTasks,

    /// Identifier does not follow the identifier rules
    #[error("Malformed {entity} identifier: '{id}'")]
    MalformedIdentifier {
        /// Entity kind
        entity: &'static str,
        /// Offending identifier
        id: String,
    },

    /// Two entities of the same kind share an identifier
    #[error("Duplicate {entity} identifier: '{id}'")]
    DuplicateId {
        /// Entity kind
        entity: &'static str,
        /// Offending identifier
        id: String,
    },

    /// A reference points to an entity that does not exist
    #[error("{entity} '{id}' references unknown {target} '{reference}'")]
    UnknownReference {
        /// Entity kind holding the reference
        entity: &'static str,
        /// Identifier of the entity holding the reference
        id: String,
        /// Kind of the referenced entity
        target: &'static str,
        /// The unresolved reference
        reference: String,
    },

    /// A numeric parameter is out of range
    #[error("Invalid {field} for {entity} '{id}': {value} (expected {expected})")]
    InvalidParameter {
        /// Entity kind
        entity: &'static str,
        /// Entity identifier
        id: String,
        /// Parameter name
        field: &'static str,
        /// Offending value
        value: f64,
        /// Human-readable expected range
        expected: &'static str,
    },

    /// The required machine cannot process the task's capability
    #[error("Task '{task}' requires machine '{machine}' which is not compatible with capability '{capability}'")]
    IncompatibleMachine {
        /// Task identifier
        task: String,
        /// Machine identifier
        machine: String,
        /// Capability the machine lacks
        capability: String,
    },

    /// Predecessor belongs to a different product
    #[error("Task '{task}' has predecessor '{predecessor}' from another product")]
    CrossProductPredecessor {
        /// Task identifier
        task: String,
        /// Predecessor identifier
        predecessor: String,
    },

    /// A task is the predecessor of more than one task
    #[error("Task '{task}' is the predecessor of several tasks; precedence must form chains")]
    MultipleSuccessors {
        /// Task identifier
        task: String,
    },

    /// Precedence links form a cycle
    #[error("Circular precedence detected involving task '{task}'")]
    CyclicPrecedence {
        /// A task on the cycle
        task: String,
    },
}

/// Structured rejection listing every violated field
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct ConfigRejection {
    /// All detected violations
    pub violations: Vec<ConfigValidationError>,
}

impl fmt::Display for ConfigRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration rejected with {} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

impl ConfigRejection {
    /// `Ok(())` when the list is empty, a rejection otherwise
    pub fn from_violations(violations: Vec<ConfigValidationError>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    /// Whether any violation matches the predicate
    pub fn contains(&self, predicate: impl Fn(&ConfigValidationError) -> bool) -> bool {
        self.violations.iter().any(predicate)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_minutes: defaults::HORIZON_MINUTES,
            slice_minutes: defaults::SLICE_MINUTES,
            weights: DispatchWeights::default(),
            default_performance: defaults::DEFAULT_PERFORMANCE,
            epoch: None,
            seed: None,
            operator_count: defaults::OPERATOR_COUNT,
            machine_count: defaults::MACHINE_COUNT,
            product_count: defaults::PRODUCT_COUNT,
            phases_per_product: defaults::PHASES_PER_PRODUCT,
            units_per_product: defaults::UNITS_PER_PRODUCT,
            report_output: None,
            events_output: None,
        }
    }
}

impl SimulationConfig {
    /// Create configuration from parsed CLI arguments
    ///
    /// Returns the run configuration together with the shop floor embedded in
    /// the configuration file, if any.
    pub fn from_cli_args(args: CliArgs) -> Result<(Self, Option<ShopFloorConfig>), ConfigError> {
        let (mut config, shop_floor) = match &args.config {
            Some(config_path) => Self::from_file(config_path)?,
            None => (Self::default(), None),
        };

        Self::apply_cli_overrides(&mut config, args);

        Ok((config, shop_floor))
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(
        path: P,
    ) -> Result<(Self, Option<ShopFloorConfig>), ConfigError> {
        let config_file: ConfigFile = read_json_file(path)?;
        let shop_floor = config_file.shop_floor.clone();
        Ok((Self::from_config_file(config_file), shop_floor))
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            horizon_minutes: config_file.horizon_minutes.unwrap_or(defaults.horizon_minutes),
            slice_minutes: config_file.slice_minutes.unwrap_or(defaults.slice_minutes),
            weights: config_file.weights.unwrap_or(defaults.weights),
            default_performance: config_file
                .default_performance
                .unwrap_or(defaults.default_performance),
            epoch: config_file.epoch.or(defaults.epoch),
            seed: config_file.seed.or(defaults.seed),
            operator_count: config_file.operator_count.unwrap_or(defaults.operator_count),
            machine_count: config_file.machine_count.unwrap_or(defaults.machine_count),
            product_count: config_file.product_count.unwrap_or(defaults.product_count),
            phases_per_product: config_file
                .phases_per_product
                .unwrap_or(defaults.phases_per_product),
            units_per_product: config_file.units_per_product.unwrap_or(defaults.units_per_product),
            report_output: config_file.report_output.or(defaults.report_output),
            events_output: config_file.events_output.or(defaults.events_output),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.horizon {
            config.horizon_minutes = value;
        }
        if let Some(value) = args.slice {
            config.slice_minutes = value;
        }
        if let Some(value) = args.weight_cost {
            config.weights.cost = value;
        }
        if let Some(value) = args.weight_performance {
            config.weights.performance = value;
        }
        if let Some(value) = args.weight_equity {
            config.weights.equity = value;
        }
        if let Some(value) = args.weight_makespan {
            config.weights.makespan = value;
        }
        if let Some(value) = args.default_performance {
            config.default_performance = value;
        }
        if let Some(value) = args.epoch {
            config.epoch = Some(value);
        }
        if let Some(value) = args.seed {
            config.seed = Some(value);
        }
        if let Some(value) = args.operators {
            config.operator_count = value;
        }
        if let Some(value) = args.machines {
            config.machine_count = value;
        }
        if let Some(value) = args.products {
            config.product_count = value;
        }
        if let Some(value) = args.phases {
            config.phases_per_product = value;
        }
        if let Some(value) = args.output {
            config.report_output = Some(value);
        }
        if let Some(value) = args.events_output {
            config.events_output = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters, collecting every violation
    pub fn validate(&self) -> Result<(), ConfigRejection> {
        let mut violations = Vec::new();

        if !self.horizon_minutes.is_finite() || self.horizon_minutes <= 0.0 {
            violations.push(ConfigValidationError::InvalidHorizon(self.horizon_minutes));
        }

        if !self.slice_minutes.is_finite() || self.slice_minutes <= 0.0 {
            violations.push(ConfigValidationError::InvalidSliceLength(self.slice_minutes));
        }

        violations.extend(self.weights.violations());

        if !(self.default_performance > 0.0
            && self.default_performance <= defaults::MAX_PERFORMANCE)
        {
            violations.push(ConfigValidationError::InvalidDefaultPerformance(
                self.default_performance,
            ));
        }

        for (field, value) in [
            ("operator_count", self.operator_count),
            ("machine_count", self.machine_count),
            ("product_count", self.product_count),
            ("phases_per_product", self.phases_per_product),
            ("units_per_product", self.units_per_product as usize),
        ] {
            if value == 0 {
                violations.push(ConfigValidationError::InvalidCount { field: field.to_string() });
            }
        }

        ConfigRejection::from_violations(violations)
    }
}

/// Read and deserialize a `.json` file
pub(crate) fn read_json_file<T, P>(path: P) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> CliArgs {
        CliArgs::try_parse_from(["test"]).unwrap()
    }

    #[test]
    fn test_simulation_config_default() {
        let config = SimulationConfig::default();

        assert_eq!(config.horizon_minutes, 1440.0);
        assert_eq!(config.slice_minutes, 30.0);
        assert_eq!(config.weights, DispatchWeights::new(0.4, 0.2, 0.2, 0.2));
        assert_eq!(config.default_performance, 0.35);
        assert!(config.seed.is_none());
        assert!(config.epoch.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_weight_sum_tolerance() {
        assert!(DispatchWeights::new(0.4, 0.2, 0.2, 0.205).validate().is_ok());
        assert!(DispatchWeights::new(0.4, 0.2, 0.2, 0.3).validate().is_err());
        assert!(DispatchWeights::new(0.25, 0.25, 0.25, 0.25).validate().is_ok());
    }

    #[test]
    fn test_validation_collects_every_violation() {
        let config = SimulationConfig {
            horizon_minutes: 0.0,
            slice_minutes: -5.0,
            weights: DispatchWeights::new(1.5, 0.2, 0.2, 0.2),
            default_performance: 2.0,
            ..Default::default()
        };

        let rejection = config.validate().unwrap_err();
        assert!(rejection.contains(|v| matches!(v, ConfigValidationError::InvalidHorizon(_))));
        assert!(rejection.contains(|v| matches!(v, ConfigValidationError::InvalidSliceLength(_))));
        assert!(rejection.contains(|v| matches!(v, ConfigValidationError::InvalidWeight { .. })));
        assert!(
            rejection.contains(|v| matches!(v, ConfigValidationError::InvalidWeightSum { .. }))
        );
        assert!(rejection
            .contains(|v| matches!(v, ConfigValidationError::InvalidDefaultPerformance(_))));
        assert_eq!(rejection.violations.len(), 5);

        let message = rejection.to_string();
        assert!(message.contains("5 violation(s)"));
    }

    #[test]
    fn test_cli_parsing_and_overrides() {
        let args = CliArgs::try_parse_from([
            "test",
            "--horizon",
            "480",
            "--weight-cost",
            "0.3",
            "--weight-makespan",
            "0.3",
            "--seed",
            "7",
        ])
        .unwrap();

        let (config, shop_floor) = SimulationConfig::from_cli_args(args).unwrap();
        assert!(shop_floor.is_none());
        assert_eq!(config.horizon_minutes, 480.0);
        assert_eq!(config.weights.cost, 0.3);
        assert_eq!(config.weights.makespan, 0.3);
        assert_eq!(config.seed, Some(7));
        config.validate().unwrap();
    }

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        let (config, _) = SimulationConfig::from_cli_args(bare_args()).unwrap();
        assert_eq!(config.horizon_minutes, defaults::HORIZON_MINUTES);
        assert!(config.report_output.is_none());
    }

    #[test]
    fn test_config_file_loading() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let config_json = r#"{
            "horizon_minutes": 960,
            "weights": { "cost": 0.25, "performance": 0.25, "equity": 0.25, "makespan": 0.25 },
            "seed": 99
        }"#;
        temp_file.write_all(config_json.as_bytes()).unwrap();

        let (config, shop_floor) = SimulationConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.horizon_minutes, 960.0);
        assert_eq!(config.slice_minutes, defaults::SLICE_MINUTES);
        assert_eq!(config.weights.equity, 0.25);
        assert_eq!(config.seed, Some(99));
        assert!(shop_floor.is_none());
    }

    #[test]
    fn test_config_file_errors() {
        use tempfile::Builder;

        let missing = SimulationConfig::from_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));

        let temp_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        let unsupported = SimulationConfig::from_file(temp_file.path());
        assert!(matches!(unsupported, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = SimulationConfig { horizon_minutes: 600.0, ..Default::default() };
        config.save_to_file(&path).unwrap();

        let (reloaded, _) = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(reloaded.horizon_minutes, 600.0);
        assert!(config.print_json().unwrap().contains("\"horizon_minutes\""));
    }
}
