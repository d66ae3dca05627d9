use std::fs;

use napi_manifest::{
    Error, NativeAddonInfo, PACKAGE_JSON, PackageManifest, extract_native_addon_info,
};

#[test]
fn test_read_from_disk_and_extract() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(PACKAGE_JSON);
    fs::write(
        &path,
        r#"{
            "name": "@acme/core",
            "version": "1.2.3",
            "optionalDependencies": {
                "@acme/core-linux-x64-gnu": "1.2.3",
                "@acme/core-linux-x64-musl": "1.2.3",
                "@acme/core-wasm32-wasi": "1.2.3"
            },
            "napi": {
                "binaryName": "core",
                "targets": [
                    "x86_64-unknown-linux-gnu",
                    "x86_64-unknown-linux-musl",
                    "wasm32-wasip1-threads"
                ]
            }
        }"#,
    )
    .unwrap();

    let manifest = PackageManifest::from_path(&path).unwrap();
    let info = extract_native_addon_info(&manifest, true).unwrap();

    assert_eq!(info.name, "@acme/core");
    assert_eq!(info.resolved_version(), Some("1.2.3"));
    assert_eq!(info.sub_package("linux-x64-musl"), "@acme/core-linux-x64-musl");
    assert_eq!(info.declared_version("@acme/core-linux-x64-musl"), Some("1.2.3"));
    assert_eq!(info.binary_file("wasm32-wasi"), "core.wasm32-wasi.wasm");
}

#[test]
fn test_no_optional_dependencies_means_no_native_version() {
    let manifest = PackageManifest::from_slice(
        br#"{ "name": "acme", "version": "4.0.0", "napi": { "targets": ["aarch64-apple-darwin"] } }"#,
    )
    .unwrap();
    let info = NativeAddonInfo::from_manifest(&manifest, true).unwrap();
    assert_eq!(info.native_version, None);
    assert_eq!(info.resolved_version(), Some("4.0.0"));
    assert_eq!(info.declared_version("acme-darwin-arm64"), None);
}

#[test]
fn test_configuration_error_message() {
    let manifest =
        PackageManifest::from_slice(br#"{ "name": "not-native", "version": "1.0.0" }"#).unwrap();
    let err = extract_native_addon_info(&manifest, false).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert_eq!(
        err.to_string(),
        "No `napi.targets` nor `napi.triples.additional` field found in `not-native`'s `package.json`. Please ensure the package is built with NAPI support."
    );
}

#[test]
fn test_empty_dependency_version_is_undeclared() {
    let manifest = PackageManifest::from_slice(
        br#"{
            "name": "a",
            "version": "0.3.0",
            "optionalDependencies": { "a-linux-x64-gnu": "", "a-darwin-arm64": "0.3.0" },
            "napi": { "targets": ["x86_64-unknown-linux-gnu", "aarch64-apple-darwin"] }
        }"#,
    )
    .unwrap();
    let info = NativeAddonInfo::from_manifest(&manifest, true).unwrap();

    assert_eq!(info.declared_version("a-linux-x64-gnu"), None);
    assert_eq!(info.declared_version("a-darwin-arm64"), Some("0.3.0"));
    assert_eq!(info.native_version.as_deref(), Some("0.3.0"));
}
