//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use quiztime_core::catalog::Catalog;
use quiztime_core::store::{FileStore, KeyValueStore};
use quiztime_grader::QuiztimeConfig;

pub mod init;
pub mod play;
pub mod scores;
pub mod set_key;
pub mod tags;
pub mod validate;

/// Open the file-backed store, preferring an explicit `--data-dir`.
pub(crate) fn open_store(
    data_dir: Option<PathBuf>,
    config: &QuiztimeConfig,
) -> Arc<dyn KeyValueStore> {
    let path = match data_dir {
        Some(dir) => dir.join("store.json"),
        None => config.store_path(),
    };
    tracing::debug!(path = %path.display(), "opening store");
    Arc::new(FileStore::new(path))
}

/// Load the catalog from `--catalog`, the config file, or the built-in set.
pub(crate) fn load_catalog(catalog: Option<&Path>, config: &QuiztimeConfig) -> Result<Catalog> {
    match catalog.or(config.catalog.as_deref()) {
        Some(path) => Catalog::load(path),
        None => Catalog::builtin(),
    }
}
