use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::optimizer::{MoveKind, Optimizer, StartOrder};

/// `toml`-deserializable selection of an [`Optimizer`], as it would
/// appear in a pattern's configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OptimizerConfig {
    Trivial,
    AscendingFrequency,
    Greedy,
    DpLeftDeep,
    DpBushy,
    IterativeImprovement {
        #[serde(default)]
        start: IterativeStart,
        #[serde(default)]
        move_kind: IterativeMove,
        #[serde(default = "default_iterations")]
        max_iterations: usize,
    },
    ZStream {
        #[serde(default)]
        seeded_by_greedy: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IterativeStart {
    #[default]
    Greedy,
    Random,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IterativeMove {
    #[default]
    Swap,
    Circle,
}

fn default_iterations() -> usize {
    200
}

impl From<OptimizerConfig> for Optimizer {
    fn from(config: OptimizerConfig) -> Self {
        match config {
            OptimizerConfig::Trivial => Optimizer::Trivial,
            OptimizerConfig::AscendingFrequency => Optimizer::AscendingFrequency,
            OptimizerConfig::Greedy => Optimizer::Greedy,
            OptimizerConfig::DpLeftDeep => Optimizer::DpLeftDeep,
            OptimizerConfig::DpBushy => Optimizer::DpBushy,
            OptimizerConfig::IterativeImprovement {
                start,
                move_kind,
                max_iterations,
            } => Optimizer::IterativeImprovement {
                start: match start {
                    IterativeStart::Greedy => StartOrder::Greedy,
                    IterativeStart::Random => StartOrder::Random { seed: 0 },
                },
                move_kind: match move_kind {
                    IterativeMove::Swap => MoveKind::Swap,
                    IterativeMove::Circle => MoveKind::Circle,
                },
                max_iterations,
            },
            OptimizerConfig::ZStream { seeded_by_greedy } => {
                Optimizer::ZStream { seeded_by_greedy }
            }
        }
    }
}

/// Which kind of statistics to collect for a pattern before planning its
/// tree, as loaded from a `toml` engine configuration file. Selects only
/// the *kind* (§3: "statistics of exactly one kind") — the actual
/// frequency map / selectivity matrix is collected at submission time by
/// sampling the pattern's input, not carried in config.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StatisticsConfig {
    #[default]
    None,
    FrequencyMap,
    SelectivityRates,
}

/// Configuration for one pattern's evaluation, as loaded from a `toml`
/// engine configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    pub name: String,
    #[serde(default)]
    pub optimizer: Option<OptimizerConfig>,
    #[serde(with = "duration_millis", default)]
    pub window: Option<Duration>,
    #[serde(default)]
    pub statistics: StatisticsConfig,
    /// Whether the worker should track per-pattern wall-clock elapsed
    /// time (`PatternWorker::elapsed`). Off by default since it costs a
    /// mutex lock per drained event.
    #[serde(default)]
    pub measure_elapsed: bool,
}

/// `toml`-level configuration for the whole engine: how many patterns run
/// concurrently and how chatty logging is, mirroring the ambient
/// engine-wide config section a deployed pattern set is loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub patterns: Vec<PatternConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => d.as_millis().to_string().serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let millis: Option<u64> = Option::deserialize(d)?;
        Ok(millis.map(Duration::from_millis))
    }
}
