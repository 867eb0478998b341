use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Largest community the detector may grow.
pub const DEFAULT_CAPACITY: usize = 25;

pub const DEFAULT_EPOCHS: usize = 3;

/// Distance between the lowest and highest star rating.
pub const RATING_SPAN: f64 = 5.0;

pub const DEFAULT_MOVIE_LIMIT: usize = 1000;

pub const DEFAULT_RATING_LIMIT: usize = 1_000_000;

pub(crate) const READ_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Shuffle chunk used for rating files too large to hold at once.
pub const SHUFFLE_CHUNK_SIZE: usize = 10_000_000;

/// Runtime settings, usually read from a YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub movies_path: PathBuf,
    pub reviews_path: PathBuf,
    pub movie_limit: usize,
    pub rating_limit: usize,
    pub epochs: usize,
    pub capacity: usize,
    pub rating_span: f64,
    pub log_dir: Option<PathBuf>,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        RecommenderConfig {
            movies_path: PathBuf::from("data/movies.csv"),
            reviews_path: PathBuf::from("data/shuffled_user_ratings.csv"),
            movie_limit: DEFAULT_MOVIE_LIMIT,
            rating_limit: DEFAULT_RATING_LIMIT,
            epochs: DEFAULT_EPOCHS,
            capacity: DEFAULT_CAPACITY,
            rating_span: RATING_SPAN,
            log_dir: Some(PathBuf::from("logs")),
        }
    }
}

impl RecommenderConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: RecommenderConfig = serde_yaml::from_str(text)?;
        Ok(config)
    }
}

#[cfg(test)]
mod test_config {
    use std::io::Write;
    use std::path::PathBuf;

    use crate::config::{RecommenderConfig, DEFAULT_CAPACITY};

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = RecommenderConfig::from_yaml_str("epochs: 5\nmovie_limit: 20\n").unwrap();
        assert_eq!(config.epochs, 5);
        assert_eq!(config.movie_limit, 20);
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.movies_path, PathBuf::from("data/movies.csv"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "capacity: 10").unwrap();
        writeln!(file, "log_dir: null").unwrap();
        writeln!(file, "reviews_path: ratings.csv").unwrap();
        let config = RecommenderConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.capacity, 10);
        assert_eq!(config.log_dir, None);
        assert_eq!(config.reviews_path, PathBuf::from("ratings.csv"));
    }

    #[test]
    fn test_bad_file() {
        assert!(RecommenderConfig::from_yaml_file("does/not/exist.yaml").is_err());
        assert!(RecommenderConfig::from_yaml_str("epochs: [1, 2]").is_err());
    }
}
