//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `ZKINFER_*` environment variables.
use crate::errors::Result;
use crate::scheme::SchemeKind;
use crate::store::ConflictPolicy;
use serde::de::{self, Deserializer, Visitor};
use std::fmt;
use std::path::{Path, PathBuf};
use zkinfer_r1cs::OptimizationLevel;

/// Prefix of the environment variables that override the configuration.
pub const ENV_PREFIX: &str = "ZKINFER";

/// Toolchain settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of the artifact store.
    pub workspace: PathBuf,
    /// Level used by `compile` when none is given. Accepts `"O2"`, `"2"`
    /// or `2`.
    #[serde(deserialize_with = "deserialize_level")]
    pub optimization_level: OptimizationLevel,
    /// Scheme used by `setup` when none is given.
    pub scheme: SchemeKind,
    /// Whether storing an existing artifact replaces it or fails.
    pub conflict_policy: ConflictPolicy,
    /// Fixed-point scale for linear-model weights.
    pub fixed_point_scale: u32,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

fn deserialize_level<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<OptimizationLevel, D::Error> {
    struct LevelVisitor;

    impl<'de> Visitor<'de> for LevelVisitor {
        type Value = OptimizationLevel;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("an optimization level 0-3 or O0-O3")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<OptimizationLevel, E> {
            v.parse().map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<OptimizationLevel, E> {
            let level = u8::try_from(v).map_err(|_| E::custom(format!("no optimization level {}", v)))?;
            OptimizationLevel::try_from(level).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<OptimizationLevel, E> {
            let level = u64::try_from(v).map_err(|_| E::custom(format!("no optimization level {}", v)))?;
            self.visit_u64(level)
        }
    }

    deserializer.deserialize_any(LevelVisitor)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("zkinfer-workspace"),
            optimization_level: OptimizationLevel::default(),
            scheme: SchemeKind::default(),
            conflict_policy: ConflictPolicy::default(),
            fixed_point_scale: 1000,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load the configuration. A missing `path` means defaults and
    /// environment only; a given `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        let builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        let config: Config = builder.build()?.try_deserialize()?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zkinfer.toml");
        fs::write(
            &path,
            "workspace = \"/tmp/artifacts\"\noptimization_level = \"O3\"\nscheme = \"g16\"\nconflict_policy = \"fail\"\n",
        )
        .unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.workspace, PathBuf::from("/tmp/artifacts"));
        assert_eq!(config.optimization_level, OptimizationLevel::O3);
        assert_eq!(config.scheme, SchemeKind::Groth16);
        assert_eq!(config.conflict_policy, ConflictPolicy::Fail);
        assert_eq!(config.fixed_point_scale, 1000);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn numeric_optimization_levels() {
        let config: Config = serde_json::from_str(r#"{"optimization_level": 1}"#).unwrap();
        assert_eq!(config.optimization_level, OptimizationLevel::O1);
        let config: Config = serde_json::from_str(r#"{"optimization_level": "0"}"#).unwrap();
        assert_eq!(config.optimization_level, OptimizationLevel::O0);
        assert!(serde_json::from_str::<Config>(r#"{"optimization_level": 4}"#).is_err());
        assert!(serde_json::from_str::<Config>(r#"{"optimization_level": -1}"#).is_err());
    }

    #[test]
    fn level_from_the_environment() {
        // agrees with the level the file-based tests expect
        std::env::set_var("ZKINFER_OPTIMIZATION_LEVEL", "3");
        let config = Config::load(None).unwrap();
        std::env::remove_var("ZKINFER_OPTIMIZATION_LEVEL");
        assert_eq!(config.optimization_level, OptimizationLevel::O3);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn unknown_scheme_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zkinfer.toml");
        fs::write(&path, "scheme = \"marlin\"\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
