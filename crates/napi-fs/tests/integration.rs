use std::path::Path;

use napi_fs::{FileMode, Workspace, ensure_dir, read_file, relocate, write_file};
use tempfile::tempdir;

#[test]
fn test_stage_then_relocate_package_dir() {
    let dir = tempdir().unwrap();
    let scratch = dir.path().join("acme/npm-install");
    let workspace = Workspace::new(&scratch).unwrap();
    workspace
        .write(
            Path::new("node_modules/acme-linux-x64-gnu/acme.linux-x64-gnu.node"),
            b"binary",
        )
        .unwrap();

    let dest = dir.path().join("acme-linux-x64-gnu");
    ensure_dir(&dest).unwrap();
    relocate(scratch.join("node_modules/acme-linux-x64-gnu"), &dest).unwrap_or_else(|_| {
        relocate(
            scratch.join("node_modules/acme-linux-x64-gnu/acme.linux-x64-gnu.node"),
            dest.join("acme.linux-x64-gnu.node"),
        )
        .unwrap()
    });

    workspace.close().unwrap();
    assert!(!scratch.exists());
    assert_eq!(read_file(dest.join("acme.linux-x64-gnu.node")).unwrap(), b"binary");
}

#[test]
fn test_downloaded_binary_replaces_stale_copy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("acme.linux-x64-gnu.node");

    std::fs::write(&path, "stale").unwrap();
    write_file(&path, b"fresh", FileMode::for_binary(&path)).unwrap();

    assert_eq!(read_file(&path).unwrap(), b"fresh");
}
