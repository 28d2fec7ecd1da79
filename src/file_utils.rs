use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app_config::{OutputConfig, StorageBackend};
use crate::catalogs::ContentId;

// @module: File and directory utilities for artifact storage

/// Destination for finished artifacts.
///
/// The backend is selected by configuration; an implementation must persist
/// the complete artifact or nothing at all.
pub trait ArtifactStore: Send + Sync {
    /// Persist a finished artifact under its file name and return where it
    /// ended up
    fn store(&self, file_name: &str, content: &str) -> Result<PathBuf>;
}

/// Artifact store writing into a local directory
pub struct LocalDirStore {
    /// Directory artifacts are written to
    directory: PathBuf,
}

impl LocalDirStore {
    /// Create a store rooted at the given directory
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        LocalDirStore {
            directory: directory.as_ref().to_path_buf(),
        }
    }
}

impl ArtifactStore for LocalDirStore {
    fn store(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        FileManager::write_artifact(&self.directory, file_name, content)
    }
}

/// Build the artifact store the output configuration asks for.
///
/// `directory_override` substitutes the configured directory for backends
/// that have one (a CLI argument, typically).
pub fn store_for(output: &OutputConfig, directory_override: Option<&Path>) -> Box<dyn ArtifactStore> {
    match output.storage {
        StorageBackend::Local => {
            let directory = match directory_override {
                Some(dir) => dir.to_path_buf(),
                None => PathBuf::from(&output.directory),
            };
            Box::new(LocalDirStore::new(directory))
        }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @generates: Artifact file name for a merged subtitle
    // @params: content, main_tag, translation_tag, version (1-based)
    pub fn artifact_file_name(
        content: &ContentId,
        main_tag: &str,
        translation_tag: &str,
        version: usize,
    ) -> String {
        format!(
            "{}_{}_{}_v{}.srt",
            content.file_stem(),
            main_tag,
            translation_tag,
            version
        )
    }

    /// Write an artifact atomically: a finished file either appears under its
    /// final name or not at all, never half-written
    pub fn write_artifact<P: AsRef<Path>>(dir: P, file_name: &str, content: &str) -> Result<PathBuf> {
        let dir = dir.as_ref();
        Self::ensure_dir(dir)?;

        let final_path = dir.join(file_name);
        let temp_path = dir.join(format!("{file_name}.tmp"));

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write artifact: {}", temp_path.display()))?;
        fs::rename(&temp_path, &final_path).with_context(|| {
            format!("Failed to move artifact into place: {}", final_path.display())
        })?;

        Ok(final_path)
    }
}
