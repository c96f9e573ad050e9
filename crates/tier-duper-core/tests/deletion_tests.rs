mod common;

use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

use common::{
    catalog_checksum, group, imported, uploaded, write_file, FakeCatalog, StalledFsRuntime,
};
use tier_duper_core::catalog::RemovalCandidate;
use tier_duper_core::{Error, SafeDeletionExecutor};

fn candidate(id: &str, path: &Path) -> RemovalCandidate {
    RemovalCandidate {
        id: id.to_string(),
        original_path: path.to_string_lossy().into_owned(),
    }
}

#[tokio::test]
async fn test_files_removed_before_catalog_delete() {
    let tmp = tempdir().unwrap();
    let a = write_file(tmp.path(), "upload/a.jpg", b"X");
    let b = write_file(tmp.path(), "nas/a.jpg", b"X");
    let catalog = FakeCatalog::with_groups(vec![group(
        "dup-1",
        vec![uploaded("A", &a, &catalog_checksum(b"X")), imported("B", &b, "lib-1")],
    )]);

    let report = SafeDeletionExecutor::new()
        .remove(&catalog, &[candidate("A", &a)])
        .await
        .unwrap();

    assert!(!a.exists());
    assert!(b.exists(), "imported asset must never be removed");
    assert_eq!(report.files_removed, 1);
    assert_eq!(report.catalog_records_deleted, 1);
    assert_eq!(catalog.delete_calls(), vec![vec!["A".to_string()]]);
    assert_eq!(
        catalog.files_present_at_delete(),
        vec![("A".to_string(), false)],
        "file must already be gone when the catalog delete is issued"
    );
}

#[tokio::test]
async fn test_already_absent_file_is_success() {
    let tmp = tempdir().unwrap();
    let missing = tmp.path().join("upload/already-gone.jpg");
    let catalog = FakeCatalog::default();

    let report = SafeDeletionExecutor::new()
        .remove(&catalog, &[candidate("A", &missing)])
        .await
        .unwrap();

    assert_eq!(report.files_removed, 0);
    assert_eq!(report.files_already_absent, 1);
    assert!(report.file_failures.is_empty());
    assert_eq!(catalog.delete_calls(), vec![vec!["A".to_string()]]);
}

#[tokio::test]
async fn test_file_failure_does_not_block_others_or_catalog() {
    let tmp = tempdir().unwrap();
    let good = write_file(tmp.path(), "upload/good.jpg", b"X");
    // A directory cannot be unlinked with remove_file.
    let not_a_file = tmp.path().join("upload/a-directory");
    std::fs::create_dir_all(&not_a_file).unwrap();
    let catalog = FakeCatalog::default();

    let report = SafeDeletionExecutor::new()
        .remove(
            &catalog,
            &[candidate("BAD", &not_a_file), candidate("GOOD", &good)],
        )
        .await
        .unwrap();

    assert!(!good.exists());
    assert_eq!(report.files_removed, 1);
    assert_eq!(report.file_failures.len(), 1);
    assert_eq!(report.file_failures[0].id, "BAD");
    // every candidate id still goes to the catalog in one request
    assert_eq!(
        catalog.delete_calls(),
        vec![vec!["BAD".to_string(), "GOOD".to_string()]]
    );
}

#[tokio::test]
async fn test_catalog_failure_is_reported_and_files_stay_removed() {
    let tmp = tempdir().unwrap();
    let a = write_file(tmp.path(), "upload/a.jpg", b"X");
    let catalog = FakeCatalog::default();
    catalog.fail_delete();

    let result = SafeDeletionExecutor::new()
        .remove(&catalog, &[candidate("A", &a)])
        .await;

    match result {
        Err(Error::BulkDelete { report, .. }) => {
            assert_eq!(report.files_removed, 1);
            assert_eq!(report.catalog_records_deleted, 0);
        }
        other => panic!("expected a bulk delete failure, got {:?}", other),
    }
    assert!(!a.exists());
    assert_eq!(catalog.delete_calls().len(), 1);
}

#[test]
fn test_unlink_timeout_is_per_file_failure() {
    let tmp = tempdir().unwrap();
    let a = write_file(tmp.path(), "upload/a.jpg", b"X");
    let catalog = FakeCatalog::default();
    let executor = SafeDeletionExecutor::new().with_file_timeout(Duration::from_millis(50));

    let runtime = StalledFsRuntime::new();
    let report = runtime
        .block_on(executor.remove(&catalog, &[candidate("A", &a)]))
        .unwrap();

    assert_eq!(report.files_removed, 0);
    assert_eq!(report.file_failures.len(), 1);
    assert_eq!(report.file_failures[0].id, "A");
    assert!(report.file_failures[0].error.contains("timed out"));
    // the bulk delete still goes out for the timed-out candidate
    assert_eq!(catalog.delete_calls(), vec![vec!["A".to_string()]]);
    assert_eq!(report.catalog_records_deleted, 1);
}

#[tokio::test]
async fn test_no_candidates_means_no_operations() {
    let catalog = FakeCatalog::default();

    let report = SafeDeletionExecutor::new()
        .remove(&catalog, &[])
        .await
        .unwrap();

    assert_eq!(report, Default::default());
    assert!(catalog.delete_calls().is_empty());
}
