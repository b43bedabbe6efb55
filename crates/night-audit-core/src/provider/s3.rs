use super::{filter_by_camera, has_extension, FileListingProvider, ListingCache};
use crate::config::S3Config;
use crate::error::{Error, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info, instrument};

/// S3-compatible blob container holding one datapull under a key prefix
/// (`<year>/<location>/<datapull>/<camera>/...`).
pub struct RemoteBlobStore {
    runtime: Runtime,
    client: S3Client,
    bucket: String,
    prefix: String,
    video_ext: String,
    metadata_ext: String,
    download_dir: PathBuf,
    objects: ListingCache,
}

impl RemoteBlobStore {
    /// Builds the client and probes the bucket. Any failure here is an
    /// [`Error::StorageConnection`]; nothing is listed before it succeeds.
    pub fn connect(
        config: &S3Config,
        prefix: &str,
        video_ext: &str,
        metadata_ext: &str,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::StorageConnection(format!("Failed to start runtime: {}", e)))?;

        let aws_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(aws_config::Region::new(config.region.clone()))
                .load(),
        );

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);
        if let Some(ref endpoint_url) = config.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }
        if config.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }
        let client = S3Client::from_conf(s3_config_builder.build());

        runtime
            .block_on(client.head_bucket().bucket(&config.bucket).send())
            .map_err(|e| {
                Error::StorageConnection(format!(
                    "bucket '{}': {}",
                    config.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!(
            bucket = %config.bucket,
            region = %config.region,
            prefix = %prefix,
            "Connected to blob storage"
        );

        Ok(Self {
            runtime,
            client,
            bucket: config.bucket.clone(),
            prefix: prefix.trim_matches('/').to_string(),
            video_ext: video_ext.to_string(),
            metadata_ext: metadata_ext.to_string(),
            download_dir: PathBuf::from(&config.download_dir),
            objects: ListingCache::default(),
        })
    }

    fn all_keys(&self) -> Result<Arc<Vec<String>>> {
        self.objects.get_or_load(|| self.list_keys())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, prefix = %self.prefix))]
    fn list_keys(&self) -> Result<Vec<String>> {
        let prefix = format!("{}/", self.prefix);
        self.runtime.block_on(async {
            let mut keys = Vec::new();
            let mut continuation: Option<String> = None;
            loop {
                let page = self
                    .client
                    .list_objects_v2()
                    .bucket(&self.bucket)
                    .prefix(&prefix)
                    .set_continuation_token(continuation.take())
                    .send()
                    .await
                    .map_err(|e| Error::Storage(format!("{}", DisplayErrorContext(&e))))?;

                keys.extend(
                    page.contents()
                        .iter()
                        .filter_map(|obj| obj.key().map(str::to_string)),
                );

                match page.next_continuation_token() {
                    Some(token) if page.is_truncated().unwrap_or(false) => {
                        continuation = Some(token.to_string());
                    }
                    _ => break,
                }
            }
            debug!("{} objects listed", keys.len());
            Ok::<_, Error>(keys)
        })
    }
}

/// Keys ending in `ext`, optionally narrowed to one camera.
pub fn keys_with_extension(keys: &[String], ext: &str, camera_id: Option<&str>) -> Vec<String> {
    let keys: Vec<String> = keys.iter().filter(|k| has_extension(k, ext)).cloned().collect();
    filter_by_camera(&keys, camera_id)
}

/// Camera ids are the first key segment after `prefix`, taken from keys
/// ending in `ext`. Keys directly under the prefix have no camera folder.
pub fn camera_ids_from_keys(prefix: &str, keys: &[String], ext: &str) -> Vec<String> {
    let prefix = prefix.trim_matches('/');
    let camera_ids: BTreeSet<String> = keys
        .iter()
        .filter(|k| has_extension(k, ext))
        .filter_map(|k| camera_segment(prefix, k))
        .map(str::to_string)
        .collect();
    camera_ids.into_iter().collect()
}

fn camera_segment<'a>(prefix: &str, key: &'a str) -> Option<&'a str> {
    let rest = key.strip_prefix(prefix)?;
    if !prefix.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let (camera, below) = rest.trim_start_matches('/').split_once('/')?;
    Some(camera).filter(|c| !c.is_empty() && !below.is_empty())
}

impl FileListingProvider for RemoteBlobStore {
    fn list_camera_ids(&self) -> Result<Vec<String>> {
        Ok(camera_ids_from_keys(&self.prefix, &self.all_keys()?, &self.video_ext))
    }

    fn list_video_paths(&self, camera_id: Option<&str>) -> Result<Vec<String>> {
        Ok(keys_with_extension(&self.all_keys()?, &self.video_ext, camera_id))
    }

    fn list_metadata_paths(&self, camera_id: Option<&str>) -> Result<Vec<String>> {
        Ok(keys_with_extension(&self.all_keys()?, &self.metadata_ext, camera_id))
    }

    fn file_size(&self, path: &str) -> Result<u64> {
        let head = self
            .runtime
            .block_on(self.client.head_object().bucket(&self.bucket).key(path).send())
            .map_err(|e| Error::FileAccess {
                path: path.to_string(),
                message: format!("{}", DisplayErrorContext(&e)),
            })?;
        head.content_length()
            .and_then(|len| u64::try_from(len).ok())
            .ok_or_else(|| Error::FileAccess {
                path: path.to_string(),
                message: "no content length reported".to_string(),
            })
    }

    fn fetch_file(&self, path: &str) -> Result<PathBuf> {
        let save_path = self.download_dir.join(path);
        if let Some(parent) = save_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = self.runtime.block_on(async {
            let object = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(path)
                .send()
                .await
                .map_err(|e| Error::FileAccess {
                    path: path.to_string(),
                    message: format!("{}", DisplayErrorContext(&e)),
                })?;
            object
                .body
                .collect()
                .await
                .map(|bytes| bytes.into_bytes())
                .map_err(|e| Error::FileAccess {
                    path: path.to_string(),
                    message: e.to_string(),
                })
        })?;

        fs::write(&save_path, &data)?;
        debug!(
            key = %path,
            size_bytes = data.len(),
            "Downloaded to {}",
            save_path.display()
        );
        Ok(save_path)
    }
}
