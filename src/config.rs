//! Runtime settings loaded from a TOML file and the environment.

use crate::pipeline::adapters::snapshot::SnapshotSeed;
use crate::pipeline::services::MutationPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Settings file read when `ESTEIRA_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "esteira.toml";

/// Environment variable naming the settings file.
pub const CONFIG_PATH_VAR: &str = "ESTEIRA_CONFIG";

const SNAPSHOT_PATH_VAR: &str = "ESTEIRA_SNAPSHOT_PATH";
const MUTATION_TIMEOUT_VAR: &str = "ESTEIRA_MUTATION_TIMEOUT_MS";
const MUTATION_RETRIES_VAR: &str = "ESTEIRA_MUTATION_RETRIES";
const SEED_DEMO_VAR: &str = "ESTEIRA_SEED_DEMO";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings file {path}: {source}")]
    Read {
        /// Settings file path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The settings file is not valid TOML for [`BoardSettings`].
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Board runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardSettings {
    /// Location of the local case snapshot.
    pub snapshot_path: Utf8PathBuf,
    /// Time allowed for one case store call, in milliseconds.
    pub mutation_timeout_ms: u64,
    /// Retries allowed for idempotent case store calls.
    pub mutation_retries: u32,
    /// Seed a new snapshot with demonstration cases.
    pub seed_demo_cases: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            snapshot_path: Utf8PathBuf::from("data/esteira.json"),
            mutation_timeout_ms: 10_000,
            mutation_retries: MutationPolicy::DEFAULT_RETRIES,
            seed_demo_cases: false,
        }
    }
}

impl BoardSettings {
    /// Parses settings from TOML text. Absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(raw)?)
    }

    /// Reads settings from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the file cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self, SettingsError> {
        let read_error = |source: io::Error| SettingsError::Read {
            path: path.to_owned(),
            source,
        };
        let file_name = path.file_name().ok_or_else(|| {
            read_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "settings path has no file name",
            ))
        })?;
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));

        let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(read_error(err)),
        };
        match dir.read_to_string(file_name) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(%path, "no settings file; using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(read_error(err)),
        }
    }

    /// Loads the settings file named by `ESTEIRA_CONFIG` (or
    /// [`DEFAULT_CONFIG_FILE`]) and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the settings file cannot be read or
    /// parsed.
    pub fn from_environment() -> Result<Self, SettingsError> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .map_or_else(|_| Utf8PathBuf::from(DEFAULT_CONFIG_FILE), Utf8PathBuf::from);
        let mut settings = Self::load(&path)?;
        settings.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Applies `ESTEIRA_*` overrides read through `lookup`.
    ///
    /// Values that do not parse are ignored with a warning.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(SNAPSHOT_PATH_VAR) {
            self.snapshot_path = Utf8PathBuf::from(path);
        }
        if let Some(timeout_ms) = parsed_override(&lookup, MUTATION_TIMEOUT_VAR) {
            self.mutation_timeout_ms = timeout_ms;
        }
        if let Some(retries) = parsed_override(&lookup, MUTATION_RETRIES_VAR) {
            self.mutation_retries = retries;
        }
        if let Some(seed) = parsed_override(&lookup, SEED_DEMO_VAR) {
            self.seed_demo_cases = seed;
        }
    }

    /// Returns the store call policy described by these settings.
    #[must_use]
    pub const fn mutation_policy(&self) -> MutationPolicy {
        MutationPolicy::new(
            Duration::from_millis(self.mutation_timeout_ms),
            self.mutation_retries,
        )
    }

    /// Returns the content a new snapshot file is seeded with.
    #[must_use]
    pub const fn snapshot_seed(&self) -> SnapshotSeed {
        if self.seed_demo_cases {
            SnapshotSeed::Demo
        } else {
            SnapshotSeed::Empty
        }
    }
}

fn parsed_override<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(name)?;
    raw.trim()
        .parse()
        .inspect_err(|err| {
            tracing::warn!(
                variable = name,
                value = %raw,
                %err,
                "ignoring invalid setting override"
            );
        })
        .ok()
}
