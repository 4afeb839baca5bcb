// Integration tests for the pre-deletion safety checks

use nodesweep::safety::{verify, LOCKFILES};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_rejects_path_without_reserved_segment() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("some-directory");
    fs::create_dir_all(&dir).unwrap();

    let err = verify(&dir, false).unwrap_err();
    assert!(err.contains("node_modules"));
}

#[test]
fn test_rejects_missing_directory() {
    let tmp = tempdir().unwrap();
    let err = verify(&tmp.path().join("app/node_modules"), false).unwrap_err();
    assert!(err.contains("does not exist"));
}

#[test]
fn test_rejects_empty_directory_with_no_manifest() {
    let tmp = tempdir().unwrap();
    let node_modules = tmp.path().join("app/node_modules");
    fs::create_dir_all(&node_modules).unwrap();

    assert!(verify(&node_modules, false).is_err());
}

#[test]
fn test_accepts_empty_directory_with_sibling_manifest() {
    let tmp = tempdir().unwrap();
    let project = tmp.path().join("app");
    let node_modules = project.join("node_modules");
    fs::create_dir_all(&node_modules).unwrap();
    fs::write(project.join("package.json"), "{}").unwrap();

    assert!(verify(&node_modules, false).is_ok());
}

#[test]
fn test_accepts_directory_with_packages_and_no_manifest() {
    let tmp = tempdir().unwrap();
    let node_modules = tmp.path().join("app/node_modules");
    fs::create_dir_all(node_modules.join("some-package")).unwrap();

    assert!(verify(&node_modules, false).is_ok());
}

#[test]
fn test_fresh_lockfile_fails_liveness_check() {
    let tmp = tempdir().unwrap();
    let project = tmp.path().join("app");
    let node_modules = project.join("node_modules");
    fs::create_dir_all(node_modules.join("pkg")).unwrap();
    fs::write(project.join("yarn.lock"), "# lock").unwrap();

    // Just written, so well inside the 60-second window
    let err = verify(&node_modules, true).unwrap_err();
    assert!(err.contains("yarn.lock"));

    // Without the liveness option the same tree passes
    assert!(verify(&node_modules, false).is_ok());
}

#[test]
fn test_lockfile_names_are_the_agreed_contract() {
    assert_eq!(
        LOCKFILES,
        &[".package-lock.json", "yarn.lock", "pnpm-lock.yaml"]
    );
}
