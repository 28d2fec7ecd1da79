/*!
 * Tests for file and artifact utilities
 */

use dualsub::app_config::{OutputConfig, StorageBackend};
use dualsub::catalogs::ContentId;
use dualsub::file_utils::{store_for, ArtifactStore, FileManager, LocalDirStore};

use crate::common;

/// Test artifact naming for movie content
#[test]
fn test_artifact_file_name_withMovie_shouldOmitEpisode() {
    let content: ContentId = "tt0111161".parse().unwrap();
    let name = FileManager::artifact_file_name(&content, "en", "es", 1);
    assert_eq!(name, "tt0111161_en_es_v1.srt");
}

/// Test artifact naming for episode content
#[test]
fn test_artifact_file_name_withEpisode_shouldIncludeSeasonEpisode() {
    let content: ContentId = "tt0903747:2:13".parse().unwrap();
    let name = FileManager::artifact_file_name(&content, "en", "ja", 3);
    assert_eq!(name, "tt0903747_S2E13_en_ja_v3.srt");
}

/// Test artifact writing creates the directory and leaves no temp file
#[test]
fn test_write_artifact_withNewDirectory_shouldWriteAtomically() {
    let temp_dir = common::create_temp_dir().unwrap();
    let out_dir = temp_dir.path().join("artifacts");

    let path = FileManager::write_artifact(&out_dir, "tt1_en_es_v1.srt", "1\n00:00:01,000 --> 00:00:02,000\nHi\n").unwrap();

    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(&out_dir));
    assert!(!out_dir.join("tt1_en_es_v1.srt.tmp").exists());

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("1\n"));
}

/// Test overwriting an existing artifact succeeds
#[test]
fn test_write_artifact_withExistingFile_shouldOverwrite() {
    let temp_dir = common::create_temp_dir().unwrap();

    FileManager::write_artifact(temp_dir.path(), "a.srt", "old").unwrap();
    FileManager::write_artifact(temp_dir.path(), "a.srt", "new").unwrap();

    let written = std::fs::read_to_string(temp_dir.path().join("a.srt")).unwrap();
    assert_eq!(written, "new");
}

/// Test the local-directory store persists under its root
#[test]
fn test_local_dir_store_withArtifact_shouldPersistUnderDirectory() {
    let temp_dir = common::create_temp_dir().unwrap();
    let store: Box<dyn ArtifactStore> = Box::new(LocalDirStore::new(temp_dir.path()));

    let path = store
        .store("tt2_en_fr_v1.srt", "1\n00:00:01,000 --> 00:00:02,000\nBonjour\n")
        .unwrap();

    assert!(path.starts_with(temp_dir.path()));
    assert!(FileManager::file_exists(&path));
}

/// Test the configured backend selects the local store, honoring overrides
#[test]
fn test_store_for_withLocalBackend_shouldHonorDirectoryOverride() {
    let temp_dir = common::create_temp_dir().unwrap();
    let output = OutputConfig {
        storage: StorageBackend::Local,
        directory: "unused-default".to_string(),
        base_url: "http://addon.local".to_string(),
    };

    let store = store_for(&output, Some(temp_dir.path()));
    let path = store.store("b.srt", "1\n00:00:01,000 --> 00:00:02,000\nHi\n").unwrap();

    assert!(path.starts_with(temp_dir.path()));
}
