pub mod local;
pub mod s3;

use crate::config::{AppConfig, StorageKind};
use crate::error::{Error, Result};
use crate::timestamp::base_name;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub use local::LocalFilesystem;
pub use s3::RemoteBlobStore;

/// camera id -> capture date folder -> MAC address
pub type MacAddressMap = BTreeMap<String, BTreeMap<String, String>>;

const MAC_ADDRESS_LEN: usize = 12;

/// Source of raw video and metadata paths for one datapull.
///
/// Implementations list their full corpus once and reuse it for the life of
/// the value. Camera filtering goes through [`path_matches_camera`].
pub trait FileListingProvider: Send + Sync {
    /// Sorted, unique camera ids.
    fn list_camera_ids(&self) -> Result<Vec<String>>;

    /// All video paths, or only those of `camera_id`.
    fn list_video_paths(&self, camera_id: Option<&str>) -> Result<Vec<String>>;

    /// All metadata sidecar paths, or only those of `camera_id`.
    fn list_metadata_paths(&self, camera_id: Option<&str>) -> Result<Vec<String>>;

    /// Size in bytes. Fails with [`Error::FileAccess`].
    fn file_size(&self, path: &str) -> Result<u64>;

    /// Local path holding the file's content, downloading it if needed.
    fn fetch_file(&self, path: &str) -> Result<PathBuf>;

    fn list_mac_addresses(&self) -> Result<MacAddressMap> {
        let camera_ids = self.list_camera_ids()?;
        let videos = self.list_video_paths(None)?;
        Ok(mac_addresses_from_paths(&camera_ids, &videos))
    }
}

/// Connects the provider selected by `config.storage`.
pub fn open_provider(config: &AppConfig) -> Result<Box<dyn FileListingProvider>> {
    match config.storage {
        StorageKind::Local => Ok(Box::new(LocalFilesystem::new(config)?)),
        StorageKind::S3 => {
            let s3 = config.s3.as_ref().ok_or_else(|| {
                Error::StorageConnection("storage = \"s3\" requires an [s3] section".to_string())
            })?;
            Ok(Box::new(RemoteBlobStore::connect(
                s3,
                &config.remote_prefix(),
                &config.file_ext,
                &config.metadata_ext,
            )?))
        }
    }
}

/// Full listing memoized on first successful load.
#[derive(Default)]
pub(crate) struct ListingCache {
    paths: Mutex<Option<Arc<Vec<String>>>>,
}

impl ListingCache {
    pub(crate) fn get_or_load<F>(&self, load: F) -> Result<Arc<Vec<String>>>
    where
        F: FnOnce() -> Result<Vec<String>>,
    {
        let mut guard = self
            .paths
            .lock()
            .map_err(|e| Error::Other(format!("Failed to lock listing cache: {}", e)))?;
        if let Some(paths) = guard.as_ref() {
            return Ok(Arc::clone(paths));
        }
        let paths = Arc::new(load()?);
        *guard = Some(Arc::clone(&paths));
        Ok(paths)
    }
}

/// A path belongs to a camera when one of its directory segments is the
/// camera id, or the file name starts with `<camera_id>_`. `CAM1` does not
/// match `CAM10`.
pub fn path_matches_camera(path: &str, camera_id: &str) -> bool {
    if camera_id.is_empty() {
        return false;
    }
    let mut segments = path.rsplit(['/', '\\']);
    let file_name = segments.next().unwrap_or_default();
    segments.any(|s| s == camera_id)
        || file_name
            .strip_prefix(camera_id)
            .is_some_and(|rest| rest.starts_with('_'))
}

pub fn filter_by_camera(paths: &[String], camera_id: Option<&str>) -> Vec<String> {
    match camera_id {
        Some(camera_id) => paths
            .iter()
            .filter(|p| path_matches_camera(p, camera_id))
            .cloned()
            .collect(),
        None => paths.to_vec(),
    }
}

pub fn has_extension(path: &str, ext: &str) -> bool {
    base_name(path)
        .rsplit_once('.')
        .is_some_and(|(_, e)| e.eq_ignore_ascii_case(ext.trim_start_matches('.')))
}

/// Recorder folders are laid out as
/// `<camera>/<date>/<session>/<recorder>_<MAC>/<clip dir>/<file>`; the MAC is
/// the last `_` token of the recorder folder and is only accepted at 12
/// characters.
pub fn mac_addresses_from_paths(camera_ids: &[String], video_paths: &[String]) -> MacAddressMap {
    let mut macs = MacAddressMap::new();
    for camera_id in camera_ids {
        let per_date = macs.entry(camera_id.clone()).or_default();
        for path in video_paths.iter().filter(|p| path_matches_camera(p, camera_id)) {
            let segments: Vec<&str> = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
            if segments.len() < 5 {
                continue;
            }
            let folder = &segments[..segments.len() - 2];
            let recorder = folder[folder.len() - 1];
            let date = folder[folder.len() - 3];
            if let Some(mac) = recorder.rsplit('_').next() {
                if mac.len() == MAC_ADDRESS_LEN {
                    per_date.insert(date.to_string(), mac.to_string());
                }
            }
        }
    }
    macs
}
