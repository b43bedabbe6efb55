use super::{filter_by_camera, has_extension, FileListingProvider, ListingCache};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use glob::glob;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Files on a local or mounted drive, found through wildcard search patterns.
pub struct LocalFilesystem {
    root_pattern: String,
    video_pattern: String,
    metadata_pattern: String,
    video_ext: String,
    metadata_ext: String,
    cameras: ListingCache,
    videos: ListingCache,
    metadata: ListingCache,
}

impl LocalFilesystem {
    /// Fails with [`Error::StorageConnection`] when the datapull root does
    /// not resolve to a directory.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let datapull_root = config.datapull_root();
        let root_pattern = config.datapull_root_pattern();
        let roots = glob_paths(&root_pattern)?;
        if !roots.iter().any(|p| p.is_dir()) {
            return Err(Error::StorageConnection(format!(
                "datapull folder '{}' not found",
                datapull_root
            )));
        }
        info!("Using local datapull folder {}", datapull_root);

        Ok(Self {
            root_pattern,
            video_pattern: config.video_search_pattern(),
            metadata_pattern: config.metadata_search_pattern(),
            video_ext: config.file_ext.clone(),
            metadata_ext: config.metadata_ext.clone(),
            cameras: ListingCache::default(),
            videos: ListingCache::default(),
            metadata: ListingCache::default(),
        })
    }

    fn list_matching(pattern: &str, ext: &str) -> Result<Vec<String>> {
        let paths: BTreeSet<String> = glob_paths(pattern)?
            .into_iter()
            .filter(|p| p.is_file())
            .map(|p| path_to_string(&p))
            .filter(|p| has_extension(p, ext))
            .collect();
        debug!("{} files match {}", paths.len(), pattern);
        Ok(paths.into_iter().collect())
    }

    fn list_camera_dirs(root_pattern: &str) -> Result<Vec<String>> {
        let pattern = format!("{}/*", root_pattern);
        let camera_ids: BTreeSet<String> = glob_paths(&pattern)?
            .into_iter()
            .filter(|p| p.is_dir())
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .filter(|name| !name.to_ascii_lowercase().ends_with(".ini"))
            .collect();
        Ok(camera_ids.into_iter().collect())
    }
}

impl FileListingProvider for LocalFilesystem {
    fn list_camera_ids(&self) -> Result<Vec<String>> {
        let camera_ids = self
            .cameras
            .get_or_load(|| Self::list_camera_dirs(&self.root_pattern))?;
        Ok(camera_ids.to_vec())
    }

    fn list_video_paths(&self, camera_id: Option<&str>) -> Result<Vec<String>> {
        let all = self
            .videos
            .get_or_load(|| Self::list_matching(&self.video_pattern, &self.video_ext))?;
        Ok(filter_by_camera(&all, camera_id))
    }

    fn list_metadata_paths(&self, camera_id: Option<&str>) -> Result<Vec<String>> {
        let all = self
            .metadata
            .get_or_load(|| Self::list_matching(&self.metadata_pattern, &self.metadata_ext))?;
        Ok(filter_by_camera(&all, camera_id))
    }

    fn file_size(&self, path: &str) -> Result<u64> {
        fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| Error::FileAccess {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    fn fetch_file(&self, path: &str) -> Result<PathBuf> {
        let local = PathBuf::from(path);
        if !local.is_file() {
            return Err(Error::FileAccess {
                path: path.to_string(),
                message: "not a file".to_string(),
            });
        }
        Ok(local)
    }
}

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob(pattern)
        .map_err(|e| Error::Other(format!("Invalid glob pattern '{}': {}", pattern, e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(err) => error!("Error reading {}: {}", err.path().display(), err.error()),
        }
    }
    Ok(paths)
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
