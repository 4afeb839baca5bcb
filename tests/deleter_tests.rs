// Integration tests for the safety gate and deletion engine

use nodesweep::entry::{DeleteProgressCallback, Entry, SizeState};
use nodesweep::{select_all, DeleteOptions, Deleter, ScanOptions, Scanner};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn make_project(root: &Path, name: &str, packages: &[&str]) -> PathBuf {
    let project = root.join(name);
    let node_modules = project.join("node_modules");
    fs::create_dir_all(&node_modules).unwrap();
    fs::write(project.join("package.json"), format!(r#"{{"name": "{}"}}"#, name)).unwrap();
    for package in packages {
        let dir = node_modules.join(package);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.js"), vec![b'x'; 100]).unwrap();
    }
    project
}

async fn scan_selected(root: &Path) -> Vec<Entry> {
    let outcome = Scanner::new()
        .scan(&ScanOptions::new(root), None, false)
        .await
        .unwrap();
    select_all(outcome.entries, true)
}

fn manual_entry(path: &Path) -> Entry {
    Entry {
        path: path.to_path_buf(),
        project_path: path.parent().unwrap().to_path_buf(),
        project_name: "manual".to_string(),
        project_version: None,
        repo_root: path.parent().unwrap().to_path_buf(),
        size: SizeState::Resolved {
            bytes: 1000,
            package_count: 1,
            total_package_count: 1,
            accelerated: false,
        },
        last_modified: None,
        selected: true,
        is_favorite: false,
    }
}

#[tokio::test]
async fn test_dry_run_is_non_destructive() {
    let tmp = tempdir().unwrap();
    make_project(tmp.path(), "appA", &["pkg1", "pkg2"]);
    make_project(tmp.path(), "appB", &["pkg1"]);

    let entries = scan_selected(tmp.path()).await;
    let expected_bytes: u64 = entries.iter().map(|e| e.size_bytes()).sum();

    let options = DeleteOptions {
        dry_run: true,
        ..Default::default()
    };
    let result = Deleter::new().delete_selected(&entries, &options, None).await;

    assert_eq!(result.total_attempted, 2);
    assert_eq!(result.successful, 2);
    assert_eq!(result.failed, 0);
    assert_eq!(result.bytes_freed, expected_bytes);
    for entry in &entries {
        assert!(entry.path.is_dir(), "dry run must not touch the disk");
    }
}

#[tokio::test]
async fn test_real_deletion_removes_directories() {
    let tmp = tempdir().unwrap();
    let project = make_project(tmp.path(), "doomed", &["pkg1", "pkg2"]);

    let entries = scan_selected(tmp.path()).await;
    let expected_bytes: u64 = entries.iter().map(|e| e.size_bytes()).sum();

    let result = Deleter::new()
        .delete_selected(&entries, &DeleteOptions::default(), None)
        .await;

    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(result.bytes_freed, expected_bytes);
    assert!(!project.join("node_modules").exists());
    // The project itself survives
    assert!(project.join("package.json").is_file());
}

#[tokio::test]
async fn test_unselected_entries_are_left_alone() {
    let tmp = tempdir().unwrap();
    make_project(tmp.path(), "keep", &["pkg"]);
    make_project(tmp.path(), "drop", &["pkg"]);

    let outcome = Scanner::new()
        .scan(&ScanOptions::new(tmp.path()), None, false)
        .await
        .unwrap();
    let mut entries = outcome.entries;
    for entry in entries.iter_mut() {
        entry.selected = entry.project_name == "drop";
    }

    let result = Deleter::new()
        .delete_selected(&entries, &DeleteOptions::default(), None)
        .await;

    assert_eq!(result.total_attempted, 1);
    assert!(tmp.path().join("keep/node_modules").is_dir());
    assert!(!tmp.path().join("drop/node_modules").exists());
}

#[tokio::test]
async fn test_vanished_directory_fails_without_aborting_batch() {
    let tmp = tempdir().unwrap();
    make_project(tmp.path(), "gone", &["pkg"]);
    make_project(tmp.path(), "stays", &["pkg"]);

    let entries = scan_selected(tmp.path()).await;

    // Remove one target out-of-band before the batch runs
    let gone = entries
        .iter()
        .find(|e| e.project_name == "gone")
        .unwrap()
        .path
        .clone();
    fs::remove_dir_all(&gone).unwrap();

    let result = Deleter::new()
        .delete_selected(&entries, &DeleteOptions::default(), None)
        .await;

    assert_eq!(result.total_attempted, 2);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 1);

    let failure = result.outcomes.iter().find(|o| !o.succeeded).unwrap();
    assert_eq!(failure.path, gone);
    assert!(failure.error.as_ref().unwrap().contains("does not exist"));
}

#[tokio::test]
async fn test_safety_gate_rejects_foreign_paths() {
    let tmp = tempdir().unwrap();
    let innocent = tmp.path().join("important-data");
    fs::create_dir_all(innocent.join("things")).unwrap();

    let entry = manual_entry(&innocent);
    let result = Deleter::new()
        .delete_selected(&[entry], &DeleteOptions::default(), None)
        .await;

    assert_eq!(result.failed, 1);
    assert!(innocent.is_dir(), "non-node_modules paths must never be removed");
    assert!(result.outcomes[0]
        .error
        .as_ref()
        .unwrap()
        .contains("node_modules"));
}

#[tokio::test]
async fn test_deletion_progress_order() {
    let tmp = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        make_project(tmp.path(), name, &["pkg"]);
    }

    let entries = scan_selected(tmp.path()).await;

    let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: DeleteProgressCallback = Box::new(move |current, total, _name| {
        sink.lock().unwrap().push((current, total));
    });

    Deleter::new()
        .delete_selected(
            &entries,
            &DeleteOptions {
                dry_run: true,
                ..Default::default()
            },
            Some(&callback),
        )
        .await;

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn test_force_removes_read_only_content() {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let project = make_project(tmp.path(), "stubborn", &["pkg"]);
        let file = project.join("node_modules/pkg/index.js");
        fs::set_permissions(&file, fs::Permissions::from_mode(0o444)).unwrap();

        let entries = scan_selected(tmp.path()).await;
        let options = DeleteOptions {
            force: true,
            ..Default::default()
        };
        let result = Deleter::new().delete_selected(&entries, &options, None).await;

        assert_eq!(result.successful, 1);
        assert!(!project.join("node_modules").exists());
    }
}

#[test]
fn test_removal_error_messages_are_actionable() {
    use nodesweep::deleter::classify_removal_error;
    use std::io;

    let path = Path::new("/tmp/app/node_modules");

    let denied = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    assert!(classify_removal_error(&denied, path).contains("elevated privileges"));

    let busy = io::Error::new(io::ErrorKind::Other, "resource busy");
    assert!(classify_removal_error(&busy, path).contains("in use"));

    let not_empty = io::Error::new(io::ErrorKind::Other, "directory not empty");
    let message = classify_removal_error(&not_empty, path);
    assert!(message.contains("force option"));
    // Library messages stay flag-free; the CLI owns flag spellings
    assert!(!message.contains("--"));
}
