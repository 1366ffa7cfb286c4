//! Content factory for loading levels and tuning from a data directory.

use std::path::{Path, PathBuf};

use survivor_core::PursuitConfig;

use crate::loaders::{ConfigLoader, LevelLoader, LoadResult, LoadedLevel};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── pursuit.toml
/// └── levels/
///     ├── street.ron
///     └── clinic.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data bundled with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load pursuit tuning from `pursuit.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<PursuitConfig> {
        let path = self.data_dir.join("pursuit.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no pursuit.toml, using defaults");
            return Ok(PursuitConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load a level from `levels/{level_name}.ron`.
    pub fn load_level(&self, level_name: &str) -> LoadResult<LoadedLevel> {
        LevelLoader::load(&self.level_path(level_name))
    }

    pub fn level_path(&self, level_name: &str) -> PathBuf {
        self.data_dir
            .join("levels")
            .join(format!("{}.ron", level_name))
    }

    /// Names of all levels in `levels/`, sorted.
    pub fn level_names(&self) -> LoadResult<Vec<String>> {
        let dir = self.data_dir.join("levels");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to list {}: {}", dir.display(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(
            factory.level_path("street"),
            Path::new("/tmp/data/levels/street.ron")
        );
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), PursuitConfig::default());
    }

    #[test]
    fn lists_only_ron_levels() {
        let dir = tempfile::tempdir().unwrap();
        let levels = dir.path().join("levels");
        std::fs::create_dir(&levels).unwrap();
        std::fs::write(levels.join("b.ron"), "").unwrap();
        std::fs::write(levels.join("a.ron"), "").unwrap();
        std::fs::write(levels.join("notes.txt"), "").unwrap();

        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.level_names().unwrap(), vec!["a", "b"]);
    }
}
