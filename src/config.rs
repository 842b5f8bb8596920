use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::util::ingredients::DEFAULT_TOP_INGREDIENTS;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Empty selects the in-memory catalog.
    pub url: String,
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "logs/catalog-dedup.log".to_string(),
            level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub brand: f64,
    pub name: f64,
    pub category: f64,
    pub ingredients: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            brand: 0.30,
            name: 0.40,
            category: 0.20,
            ingredients: 0.10,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.brand + self.name + self.category + self.ingredients
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub low: f64,
    pub overall: f64,
    pub high: f64,
    pub exact: f64,
    pub brand_name: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 0.50,
            overall: 0.85,
            high: 0.90,
            exact: 1.0,
            brand_name: 0.90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub weights: Weights,
    pub thresholds: Thresholds,
    pub max_candidates: usize,
    pub max_processed: usize,
    pub stats_sample_size: usize,
    pub top_ingredients: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            thresholds: Thresholds::default(),
            max_candidates: 50,
            max_processed: 100,
            stats_sample_size: 50,
            top_ingredients: DEFAULT_TOP_INGREDIENTS,
        }
    }
}

impl DedupConfig {
    pub fn with_overall_threshold(&self, overall: f64) -> Self {
        let mut config = self.clone();
        config.thresholds.overall = overall;
        config
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let w = &self.weights;
        if [w.brand, w.name, w.category, w.ingredients]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(anyhow!("dedup weights must be non-negative numbers"));
        }
        if (w.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(anyhow!("dedup weights must sum to 1, got {:.6}", w.sum()));
        }

        let t = &self.thresholds;
        for (name, value) in [
            ("low", t.low),
            ("overall", t.overall),
            ("high", t.high),
            ("exact", t.exact),
            ("brand_name", t.brand_name),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("dedup threshold {name} must be within [0, 1]"));
            }
        }
        if !(t.low <= t.overall && t.overall <= t.high && t.high <= t.exact) {
            return Err(anyhow!(
                "dedup thresholds must be ordered low <= overall <= high <= exact"
            ));
        }

        if self.top_ingredients == 0 {
            return Err(anyhow!("dedup.top_ingredients must be at least 1"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db: DbConfig,
    pub logging: LoggingConfig,
    pub dedup: DedupConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let explicit_path = std::env::var("CONFIG_FILE").ok();
        let config = if let Some(path) = explicit_path {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(anyhow!("config file {:?} not found", path));
            }
            Self::load_from_file(&path)?
        } else {
            let path = locate_default_config();
            if let Some(path) = path {
                Self::load_from_file(&path)?
            } else {
                AppConfig::default()
            }
        };

        let config = Self::apply_env_overrides(config)?;
        config.dedup.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        Self::from_yaml(&contents).with_context(|| format!("failed to parse config file {:?}", path))
    }

    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    fn apply_env_overrides(mut config: AppConfig) -> anyhow::Result<AppConfig> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.db.url = url;
        }

        if let Some(max_conn) = parse_optional_env("DB_MAX_CONNECTIONS")? {
            config.db.max_connections = max_conn;
        }

        if let Ok(log_file) = std::env::var("LOG_FILE_PATH") {
            config.logging.file = log_file;
        }

        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            config.logging.level = Some(log_level);
        }

        if let Some(threshold) = parse_optional_env("DEDUP_THRESHOLD")? {
            config.dedup.thresholds.overall = threshold;
        }

        if let Some(max_candidates) = parse_optional_env("DEDUP_MAX_CANDIDATES")? {
            config.dedup.max_candidates = max_candidates;
        }

        if let Some(max_processed) = parse_optional_env("DEDUP_MAX_PROCESSED")? {
            config.dedup.max_processed = max_processed;
        }

        Ok(config)
    }
}

fn parse_optional_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => Ok(Some(
            v.parse::<T>()
                .with_context(|| format!("{key} must be a valid value"))?,
        )),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn locate_default_config() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("config/config.yaml"),
        PathBuf::from("../config/config.yaml"),
    ];

    candidates.into_iter().find(|path| path.exists())
}
