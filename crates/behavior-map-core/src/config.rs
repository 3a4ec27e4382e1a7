//! Configuration management for behavior-map.
//!
//! Every tunable of the pipeline lives in one [`Config`] supplied at
//! construction time; nothing is reconfigured mid-run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::similarity::DistanceMetric;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Seed for the single random source threaded through training and clustering.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_seed() -> u64 {
    42
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{BEHAVIOR_MAP_ENV}.toml (environment-specific)
    /// 3. Environment variables with BEHAVIOR_MAP__ prefix
    pub fn load() -> CoreResult<Self> {
        Self::load_from(Path::new("config"))
    }

    /// [`Config::load`] with the configuration files read from `dir`.
    pub fn load_from(dir: &Path) -> CoreResult<Self> {
        let env = std::env::var("BEHAVIOR_MAP_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::from(dir.join("default.toml")).required(false))
            .add_source(config::File::from(dir.join(format!("{}.toml", env))).required(false))
            .add_source(config::Environment::with_prefix("BEHAVIOR_MAP").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CoreError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Set the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate configuration values.
    ///
    /// Checks only what can be decided without data; limits that depend on
    /// the corpus (cluster count vs. vocabulary) are checked by the pipeline
    /// before training starts.
    pub fn validate(&self) -> CoreResult<()> {
        self.session.validate()?;
        self.training.validate()?;
        self.clustering.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            session: SessionConfig::default(),
            training: TrainingConfig::default(),
            clustering: ClusteringConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Session assembly options.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Regex patterns; events whose activity matches any are removed.
    pub drop_activities: Vec<String>,
    /// Collapse consecutive repeats of the same activity into one step.
    pub remove_repeats: bool,
    /// Sequences shorter than this are dropped after assembly.
    pub min_sequence_length: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            drop_activities: Vec::new(),
            remove_repeats: false,
            min_sequence_length: 1,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.min_sequence_length == 0 {
            return Err(CoreError::ConfigError(
                "session.min_sequence_length must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_drop_activities<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_activities = patterns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_remove_repeats(mut self, remove: bool) -> Self {
        self.remove_repeats = remove;
        self
    }

    #[must_use]
    pub fn with_min_sequence_length(mut self, len: usize) -> Self {
        self.min_sequence_length = len;
        self
    }
}

/// Skip-gram training options.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Length of each activity vector.
    pub vector_dimension: usize,
    /// Maximum index distance counted as context.
    pub window_size: usize,
    /// Full passes over the corpus.
    pub epochs: usize,
    /// Initial SGD step size.
    pub learning_rate: f32,
    /// Step size reached at the end of the last epoch (linear decay).
    pub min_learning_rate: f32,
    /// Activities occurring fewer times than this are not trained or clustered.
    pub min_count: usize,
    /// Negative draws per positive pair.
    pub negative_samples: usize,
    /// Exponent applied to frequencies in the negative-sampling distribution.
    pub ns_exponent: f64,
    /// Down-sampling threshold for frequent activities (0.0 disables).
    pub sample: f64,
    /// Shuffle sequence order each epoch.
    pub shuffle: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vector_dimension: 100,
            window_size: 4,
            epochs: 5,
            learning_rate: 0.025,
            min_learning_rate: 0.0001,
            min_count: 1,
            negative_samples: 5,
            ns_exponent: 0.75,
            sample: 0.0,
            shuffle: true,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.vector_dimension == 0 {
            return Err(CoreError::ConfigError(
                "training.vector_dimension must be greater than 0".into(),
            ));
        }
        if self.epochs == 0 {
            return Err(CoreError::ConfigError(
                "training.epochs must be greater than 0".into(),
            ));
        }
        if self.window_size == 0 {
            return Err(CoreError::ConfigError(
                "training.window_size must be greater than 0".into(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(CoreError::ConfigError(format!(
                "training.learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if !self.min_learning_rate.is_finite()
            || self.min_learning_rate < 0.0
            || self.min_learning_rate > self.learning_rate
        {
            return Err(CoreError::ConfigError(format!(
                "training.min_learning_rate must be in [0, learning_rate], got {}",
                self.min_learning_rate
            )));
        }
        if !self.ns_exponent.is_finite() {
            return Err(CoreError::ConfigError(
                "training.ns_exponent must be finite".into(),
            ));
        }
        if !self.sample.is_finite() || self.sample < 0.0 {
            return Err(CoreError::ConfigError(format!(
                "training.sample must be >= 0, got {}",
                self.sample
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_vector_dimension(mut self, dim: usize) -> Self {
        self.vector_dimension = dim;
        self
    }

    #[must_use]
    pub fn with_window_size(mut self, window: usize) -> Self {
        self.window_size = window;
        self
    }

    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    #[must_use]
    pub fn with_learning_rate(mut self, rate: f32) -> Self {
        self.learning_rate = rate;
        self
    }

    #[must_use]
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    #[must_use]
    pub fn with_negative_samples(mut self, negatives: usize) -> Self {
        self.negative_samples = negatives;
        self
    }

    #[must_use]
    pub fn with_sample(mut self, sample: f64) -> Self {
        self.sample = sample;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

/// Clustering procedure used to group activity vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringMethod {
    /// Partitional clustering into exactly `cluster_count` groups.
    #[default]
    KMeans,
    /// Density-based clustering; the group count is derived from `eps`.
    Dbscan,
}

/// Activity clustering options.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub method: ClusteringMethod,
    pub metric: DistanceMetric,
    /// Target number of clusters (k-means).
    pub cluster_count: usize,
    /// Iteration cap for k-means convergence.
    pub max_iterations: usize,
    /// Independently seeded k-means runs; the lowest-inertia run is kept.
    pub n_init: usize,
    /// Neighborhood radius (DBSCAN).
    pub eps: f32,
    /// Neighbors, including the point itself, needed for a core point (DBSCAN).
    pub min_samples: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            method: ClusteringMethod::KMeans,
            metric: DistanceMetric::Cosine,
            cluster_count: 8,
            max_iterations: 300,
            n_init: 10,
            eps: 0.5,
            min_samples: 3,
        }
    }
}

impl ClusteringConfig {
    pub fn validate(&self) -> CoreResult<()> {
        match self.method {
            ClusteringMethod::KMeans => {
                if self.cluster_count == 0 {
                    return Err(CoreError::ConfigError(
                        "clustering.cluster_count must be greater than 0".into(),
                    ));
                }
                if self.max_iterations == 0 {
                    return Err(CoreError::ConfigError(
                        "clustering.max_iterations must be greater than 0".into(),
                    ));
                }
                if self.n_init == 0 {
                    return Err(CoreError::ConfigError(
                        "clustering.n_init must be greater than 0".into(),
                    ));
                }
            }
            ClusteringMethod::Dbscan => {
                if !self.eps.is_finite() || self.eps <= 0.0 {
                    return Err(CoreError::ConfigError(format!(
                        "clustering.eps must be a positive number, got {}",
                        self.eps
                    )));
                }
                if self.min_samples == 0 {
                    return Err(CoreError::ConfigError(
                        "clustering.min_samples must be greater than 0".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_method(mut self, method: ClusteringMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    #[must_use]
    pub fn with_cluster_count(mut self, k: usize) -> Self {
        self.cluster_count = k;
        self
    }

    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    #[must_use]
    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            include_location: false,
        }
    }
}
