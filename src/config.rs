use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Default neighbor count when none is configured.
pub const DEFAULT_K: usize = 5;

/// Errors in the job configuration, detected before any record is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The neighbor count k must be at least 1.
    InvalidK,
    /// A required path is empty. The field name is carried for diagnostics.
    MissingPath(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidK => write!(f, "Neighbor count k must be at least 1"),
            ConfigError::MissingPath(field) => write!(f, "Missing required path: {}", field),
        }
    }
}

impl Error for ConfigError {}

/// Configuration for one classification job: the neighbor count and the
/// locations of the training set, test set and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub k: usize,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub output_path: PathBuf,
}

impl JobConfig {
    pub fn new<P: Into<PathBuf>>(train_path: P, test_path: P, output_path: P) -> Self {
        JobConfig {
            k: DEFAULT_K,
            train_path: train_path.into(),
            test_path: test_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Fails fast on an unusable configuration, before any file is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::InvalidK);
        }
        if self.train_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("train_path"));
        }
        if self.test_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("test_path"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("output_path"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_k_is_five() {
        let config = JobConfig::new("train.txt", "test.txt", "out.txt");
        assert_eq!(config.k, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_k_rejected() {
        let config = JobConfig::new("train.txt", "test.txt", "out.txt").with_k(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidK));
    }

    #[test]
    fn test_missing_paths_rejected() {
        let config = JobConfig::new("", "test.txt", "out.txt");
        assert_eq!(config.validate(), Err(ConfigError::MissingPath("train_path")));

        let config = JobConfig::new("train.txt", "", "out.txt");
        assert_eq!(config.validate(), Err(ConfigError::MissingPath("test_path")));

        let config = JobConfig::new("train.txt", "test.txt", "");
        assert_eq!(config.validate(), Err(ConfigError::MissingPath("output_path")));
    }
}
