//! End-to-end staging behavior driven through a deterministic fake hub.

use std::fs;
use std::path::{Path, PathBuf};

use csvstage::error::CsvstageError;
use csvstage::hub::{DatasetHub, DatasetRef};
use csvstage::stage::pull_dataset;

/// Hub that "downloads" to a fixed local directory.
struct FixedHub {
    root: PathBuf,
}

impl DatasetHub for FixedHub {
    fn dataset_download(&self, _dataset: &DatasetRef) -> Result<PathBuf, CsvstageError> {
        Ok(self.root.clone())
    }
}

fn sample_ref() -> DatasetRef {
    DatasetRef {
        owner: "owner".to_string(),
        dataset: "sorting-logs".to_string(),
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

fn dest_entries(dest: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dest)
        .expect("read dest")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn creates_missing_destination_before_copying() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_file(&source.join("a.csv"), "x\n");

    let dest = temp.path().join("deep/nested/logs");
    assert!(!dest.exists());

    let hub = FixedHub { root: source };
    let report = pull_dataset(&hub, &sample_ref(), &dest).expect("pull");

    assert!(dest.is_dir());
    assert_eq!(report.copied(), 1);
}

#[test]
fn stages_only_exact_csv_suffix() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_file(&source.join("a.csv"), "a\n");
    write_file(&source.join("b.CSV"), "b\n");
    write_file(&source.join("notes.txt"), "n\n");

    let dest = temp.path().join("dest");
    let hub = FixedHub { root: source };
    let report = pull_dataset(&hub, &sample_ref(), &dest).expect("pull");

    assert_eq!(report.copied(), 1);
    assert_eq!(dest_entries(&dest), vec!["a.csv".to_string()]);
}

#[test]
fn flattens_nested_source_directories() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_file(&source.join("top.csv"), "t\n");
    write_file(&source.join("runs/2024/deep.csv"), "d\n");

    let dest = temp.path().join("dest");
    let hub = FixedHub { root: source };
    let report = pull_dataset(&hub, &sample_ref(), &dest).expect("pull");

    assert_eq!(report.copied(), 2);
    assert_eq!(
        dest_entries(&dest),
        vec!["deep.csv".to_string(), "top.csv".to_string()]
    );
    assert!(!dest.join("runs").exists());
}

#[test]
fn zero_matches_is_a_successful_empty_report() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_file(&source.join("notes.txt"), "n\n");

    let dest = temp.path().join("dest");
    let hub = FixedHub { root: source };
    let report = pull_dataset(&hub, &sample_ref(), &dest).expect("pull");

    assert_eq!(report.copied(), 0);
    assert!(dest.is_dir());
    assert!(dest_entries(&dest).is_empty());
    assert!(report.to_string().contains("Copied 0 CSV files"));
}

#[test]
fn second_run_overwrites_and_does_not_duplicate() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_file(&source.join("a.csv"), "first\n");
    write_file(&source.join("b.csv"), "b\n");

    let dest = temp.path().join("dest");
    let hub = FixedHub { root: source.clone() };

    pull_dataset(&hub, &sample_ref(), &dest).expect("first pull");
    write_file(&source.join("a.csv"), "second\n");
    let report = pull_dataset(&hub, &sample_ref(), &dest).expect("second pull");

    assert_eq!(report.copied(), 2);
    assert_eq!(
        dest_entries(&dest),
        vec!["a.csv".to_string(), "b.csv".to_string()]
    );
    assert_eq!(
        fs::read_to_string(dest.join("a.csv")).expect("read"),
        "second\n"
    );
}

#[test]
fn staged_copy_keeps_source_modification_time() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    write_file(&source.join("a.csv"), "x\n");

    let stamp = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_600_000_000);
    let source_file = fs::File::options()
        .write(true)
        .open(source.join("a.csv"))
        .expect("open source");
    source_file.set_modified(stamp).expect("set mtime");
    drop(source_file);

    let dest = temp.path().join("dest");
    let hub = FixedHub { root: source };
    pull_dataset(&hub, &sample_ref(), &dest).expect("pull");

    let copied_mtime = fs::metadata(dest.join("a.csv"))
        .expect("metadata")
        .modified()
        .expect("mtime");
    assert_eq!(copied_mtime, stamp);
}

#[test]
fn hub_failure_propagates_before_destination_exists() {
    struct FailingHub;
    impl DatasetHub for FailingHub {
        fn dataset_download(&self, dataset: &DatasetRef) -> Result<PathBuf, CsvstageError> {
            Err(CsvstageError::FetchFailed {
                slug: dataset.slug(),
                message: "connection refused".to_string(),
            })
        }
    }

    let temp = tempfile::tempdir().expect("tempdir");
    let dest = temp.path().join("dest");

    let err = pull_dataset(&FailingHub, &sample_ref(), &dest).expect_err("should fail");
    match err {
        CsvstageError::FetchFailed { slug, .. } => assert_eq!(slug, "owner/sorting-logs"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dest.exists());
}
