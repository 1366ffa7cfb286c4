//! Pursuit tuning loader.

use std::path::Path;

use survivor_core::PursuitConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`PursuitConfig`] from TOML files.
///
/// Missing keys fall back to the built-in defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<PursuitConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<PursuitConfig> {
        let config: PursuitConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        for (name, value) in [
            ("cell_size", config.cell_size),
            ("enemy_step_distance", config.enemy_step_distance),
            ("npc_step_distance", config.npc_step_distance),
            ("wander_step_distance", config.wander_step_distance),
            ("arrival_epsilon", config.arrival_epsilon),
        ] {
            if !(value.is_finite() && value > 0.0) {
                anyhow::bail!("{name} must be positive, got {value}");
            }
        }
        if config.chase_release_radius < config.chase_trigger_radius {
            anyhow::bail!(
                "chase_release_radius ({}) must not be smaller than chase_trigger_radius ({})",
                config.chase_release_radius,
                config.chase_trigger_radius
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use survivor_core::CornerPolicy;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "repath_interval_ms = 300").unwrap();
        writeln!(file, "corner_policy = \"no_squeeze\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();

        assert_eq!(config.repath_interval_ms, 300);
        assert_eq!(config.corner_policy, CornerPolicy::NoSqueeze);
        assert_eq!(config.chase_trigger_radius, 400.0);
    }

    #[test]
    fn inverted_radii_are_rejected() {
        let err = ConfigLoader::parse("chase_trigger_radius = 500.0\nchase_release_radius = 100.0")
            .unwrap_err();
        assert!(err.to_string().contains("chase_release_radius"));
    }

    #[test]
    fn non_positive_distances_are_rejected() {
        for (key, value) in [
            ("cell_size", "0.0"),
            ("enemy_step_distance", "-1.5"),
            ("npc_step_distance", "0.0"),
            ("wander_step_distance", "-0.5"),
            ("arrival_epsilon", "nan"),
        ] {
            let err = ConfigLoader::parse(&format!("{key} = {value}")).unwrap_err();
            assert!(err.to_string().contains(key), "{key} = {value} accepted");
        }
        assert!(ConfigLoader::parse("enemy_step_distance = 2.5").is_ok());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ConfigLoader::load(Path::new("/nonexistent/pursuit.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pursuit.toml"));
    }
}
