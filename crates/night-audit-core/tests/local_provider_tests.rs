use std::fs;
use std::path::Path;
use tempfile::tempdir;

use night_audit_core::config::{FileStructure, StorageKind};
use night_audit_core::{
    AppConfig, AuditEngine, DiagnosticKind, Error, FileListingProvider, LocalFilesystem,
    SilentReporter,
};

fn test_config(base: &Path) -> AppConfig {
    AppConfig {
        project: "Kahuku".to_string(),
        location: "North_Ridge".to_string(),
        datapull: "DP01".to_string(),
        year: "2025".to_string(),
        storage: StorageKind::Local,
        file_structure: FileStructure::Standard,
        video_base_path: base.to_string_lossy().into_owned(),
        file_ext: "mkv".to_string(),
        metadata_ext: "xml".to_string(),
        camera_id: None,
        trim_empty_last_date: true,
        s3: None,
    }
}

fn write_file(path: &Path, size: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![0u8; size]).unwrap();
}

/// Layout:
///   DP01/
///     T01/20250101/s1/rec_00408C0A0B0C/clips/
///       20250101_230000_1.mkv + .xml
///       20250102_020000_2.mkv + .xml
///       20250102_020500_recording.xml   (recorder artifact)
///     T10/20250101/s1/rec_00408C0A0B0D/clips/
///       20250101_210000_1.mkv             (0 bytes, no xml)
///     desktop.ini/                        (not a camera)
fn create_datapull(root: &Path) {
    let t01 = root.join("DP01/T01/20250101/s1/rec_00408C0A0B0C/clips");
    write_file(&t01.join("20250101_230000_1.mkv"), 2048);
    write_file(&t01.join("20250101_230000_1.xml"), 64);
    write_file(&t01.join("20250102_020000_2.mkv"), 2048);
    write_file(&t01.join("20250102_020000_2.xml"), 64);
    write_file(&t01.join("20250102_020500_recording.xml"), 64);

    let t10 = root.join("DP01/T10/20250101/s1/rec_00408C0A0B0D/clips");
    write_file(&t10.join("20250101_210000_1.mkv"), 0);

    fs::create_dir_all(root.join("DP01/desktop.ini")).unwrap();
}

#[test]
fn test_missing_datapull_is_connection_error() {
    let tmp = tempdir().unwrap();
    let result = LocalFilesystem::new(&test_config(tmp.path()));
    assert!(matches!(result, Err(Error::StorageConnection(_))));
}

#[test]
fn test_lists_cameras_and_files() {
    let tmp = tempdir().unwrap();
    create_datapull(tmp.path());
    let provider = LocalFilesystem::new(&test_config(tmp.path())).unwrap();

    assert_eq!(provider.list_camera_ids().unwrap(), vec!["T01", "T10"]);
    assert_eq!(provider.list_video_paths(None).unwrap().len(), 3);
    assert_eq!(provider.list_video_paths(Some("T01")).unwrap().len(), 2);
    // T1 is neither T01 nor T10
    assert!(provider.list_video_paths(Some("T1")).unwrap().is_empty());
    assert_eq!(provider.list_metadata_paths(Some("T01")).unwrap().len(), 3);
    assert!(provider.list_metadata_paths(Some("T10")).unwrap().is_empty());
}

#[test]
fn test_file_size_and_fetch() {
    let tmp = tempdir().unwrap();
    create_datapull(tmp.path());
    let provider = LocalFilesystem::new(&test_config(tmp.path())).unwrap();

    let videos = provider.list_video_paths(Some("T10")).unwrap();
    assert_eq!(provider.file_size(&videos[0]).unwrap(), 0);
    assert_eq!(provider.fetch_file(&videos[0]).unwrap(), Path::new(&videos[0]));

    let missing = tmp.path().join("DP01/T01/nope.mkv");
    let err = provider.file_size(&missing.to_string_lossy()).unwrap_err();
    assert!(matches!(err, Error::FileAccess { .. }));
}

#[test]
fn test_mac_addresses_from_folder_layout() {
    let tmp = tempdir().unwrap();
    create_datapull(tmp.path());
    let provider = LocalFilesystem::new(&test_config(tmp.path())).unwrap();

    let macs = provider.list_mac_addresses().unwrap();
    assert_eq!(macs["T01"]["20250101"], "00408C0A0B0C");
    assert_eq!(macs["T10"]["20250101"], "00408C0A0B0D");
}

#[test]
fn test_full_audit_over_local_tree() {
    let tmp = tempdir().unwrap();
    create_datapull(tmp.path());
    let provider = LocalFilesystem::new(&test_config(tmp.path())).unwrap();

    let report = AuditEngine::new(&provider).run(&SilentReporter).unwrap();

    // Jan 1-2 derived; Jan 2 holds no night start for any camera and is trimmed
    assert_eq!(report.trimmed_date.map(|d| d.to_string()), Some("2025-01-02".to_string()));
    assert_eq!(report.matrix.camera_ids, vec!["T01", "T10"]);
    assert_eq!(report.matrix.video.row(0), &[2]);
    assert_eq!(report.matrix.metadata.row(0), &[2]);
    assert_eq!(report.matrix.video.row(1), &[1]);
    assert_eq!(report.matrix.metadata.row(1), &[0]);

    let kinds: Vec<(&str, DiagnosticKind)> = report
        .diagnostics
        .iter()
        .map(|d| (d.camera_id.as_str(), d.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("T10", DiagnosticKind::CountMismatch),
            ("T10", DiagnosticKind::MissingMetadata),
        ]
    );
    assert_eq!(report.zero_byte_files.len(), 1);
    assert!(report.zero_byte_files[0].path.ends_with("20250101_210000_1.mkv"));
    assert!(report.size_failures.is_empty());
}

#[test]
fn test_bracketed_folder_names_are_literal() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("Kahuku [2025]");
    create_datapull(&base);
    let provider = LocalFilesystem::new(&test_config(&base)).unwrap();

    assert_eq!(provider.list_camera_ids().unwrap(), vec!["T01", "T10"]);
    assert_eq!(provider.list_video_paths(None).unwrap().len(), 3);

    let mut config = test_config(&base);
    config.camera_id = Some("T01".to_string());
    let provider = LocalFilesystem::new(&config).unwrap();
    assert_eq!(provider.list_metadata_paths(None).unwrap().len(), 3);
}

#[test]
fn test_recordings_parent_folder_keeps_sidecars() {
    let tmp = tempdir().unwrap();
    let base = tmp.path().join("recordings");
    create_datapull(&base);
    let provider = LocalFilesystem::new(&test_config(&base)).unwrap();

    let report = AuditEngine::new(&provider).run(&SilentReporter).unwrap();

    // only the artifact inside T01's folder is dropped
    assert_eq!(report.matrix.metadata.row(0), &[2]);
    assert!(report.diagnostics.iter().all(|d| d.camera_id == "T10"));
}

#[test]
fn test_camera_listing_is_memoized() {
    let tmp = tempdir().unwrap();
    create_datapull(tmp.path());
    let provider = LocalFilesystem::new(&test_config(tmp.path())).unwrap();

    assert_eq!(provider.list_camera_ids().unwrap(), vec!["T01", "T10"]);
    fs::create_dir_all(tmp.path().join("DP01/T20")).unwrap();
    assert_eq!(provider.list_camera_ids().unwrap(), vec!["T01", "T10"]);

    let fresh = LocalFilesystem::new(&test_config(tmp.path())).unwrap();
    assert_eq!(fresh.list_camera_ids().unwrap(), vec!["T01", "T10", "T20"]);
}
