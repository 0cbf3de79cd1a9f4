use crate::error::{Error, Result};
use crate::utils::expand_path;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File names searched, in order, when no configuration is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = [".flatfoot", ".flatfoot.yml", ".flatfoot.yaml"];

/// A tracker implementation listed in the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackerEntry {
    /// Class name, also the tracker's results directory name.
    #[serde(rename = "class")]
    pub class_name: String,
    /// Path of the module implementing the tracker.
    pub path: PathBuf,
}

impl TrackerEntry {
    /// Directory containing the tracker's module.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Module name, the file name without its extension.
    pub fn module(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

/// A benchmark dataset listed in the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Benchmark {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Configuration {
    pub trackers: Vec<TrackerEntry>,
    pub benchmarks: Vec<Benchmark>,
}

impl Configuration {
    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_yaml(&data)?;
        debug!(
            "Loaded {} trackers and {} benchmarks from {:?}",
            cfg.trackers.len(),
            cfg.benchmarks.len(),
            path.as_ref()
        );
        Ok(cfg)
    }

    /// Parse YAML, expanding `~` in every path.
    pub fn from_yaml(data: &str) -> Result<Self> {
        let mut cfg: Configuration = serde_yaml::from_str(data)?;
        for tracker in &mut cfg.trackers {
            tracker.path = expand_path(&tracker.path);
        }
        for benchmark in &mut cfg.benchmarks {
            benchmark.path = expand_path(&benchmark.path);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load the first default configuration file found in `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        match DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            Some(path) => Self::from_file(path),
            None => Err(Error::ConfigNotFound {
                dir: dir.to_path_buf(),
                candidates: DEFAULT_CONFIG_FILES.join(", "),
            }),
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(tracker) = self.trackers.iter().find(|t| t.class_name.is_empty()) {
            return Err(Error::Config(format!(
                "tracker at {:?} has an empty class name",
                tracker.path
            )));
        }
        if let Some(benchmark) = self.benchmarks.iter().find(|b| b.name.is_empty()) {
            return Err(Error::Config(format!(
                "benchmark at {:?} has an empty name",
                benchmark.path
            )));
        }
        Ok(())
    }

    pub fn tracker(&self, class_name: &str) -> Option<&TrackerEntry> {
        self.trackers.iter().find(|t| t.class_name == class_name)
    }

    pub fn benchmark(&self, name: &str) -> Option<&Benchmark> {
        self.benchmarks.iter().find(|b| b.name == name)
    }
}
