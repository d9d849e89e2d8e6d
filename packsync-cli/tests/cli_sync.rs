use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn packsync_cmd(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("packsync"));
    cmd.current_dir(root).env("RUST_LOG", "warn");
    cmd
}

fn write_package_config(root: &Path) {
    write_package_config_for(root, r#""device": "iphone","#);
}

/// `device_line` is spliced in verbatim; pass "" to leave the device unset.
fn write_package_config_for(root: &Path, device_line: &str) {
    fs::write(
        root.join("mlc-package-config.json"),
        format!(
            r#"{{
  {device_line}
  "model_list": [
    {{"model": "HF://mlc-ai/gemma-2b-it-q4f16_1-MLC", "model_id": "gemma-2b", "bundle_weight": true}},
    {{"model": "HF://mlc-ai/phi-2-q4f16_1-MLC", "model_id": "phi-2"}}
  ]
}}"#
        ),
    )
    .expect("package config");
}

/// Compiler stand-in: echoes the work order back as the result manifest and
/// lays down an asset tree for every model it is asked about. A copy of the
/// work order is kept at `<root>/seen-work-order.json`.
#[cfg(unix)]
fn install_fake_compiler(root: &Path, exit_code: i32) {
    let script = format!(
        r#"#!/bin/sh
set -e
work_order="$1"
out="$2"
mkdir -p "$out/bundle/gemma-2b" "$out/bundle/phi-2"
echo weights > "$out/bundle/gemma-2b/params_shard_0.bin"
echo weights > "$out/bundle/phi-2/params_shard_0.bin"
cp "$work_order" "$out/bundle/mlc-app-config.json"
cp "$work_order" seen-work-order.json
if [ {exit_code} -ne 0 ]; then echo "quantization failed" >&2; exit {exit_code}; fi
"#
    );
    fs::write(root.join("fake-compiler.sh"), script).expect("script");
    fs::write(
        root.join("packsync.yaml"),
        "compiler:\n  program: sh\n  args: [fake-compiler.sh, \"{work_order}\", \"{output_dir}\"]\n",
    )
    .expect("config");
}

#[test]
fn init_writes_config_once() {
    let root = TempDir::new().expect("root");

    packsync_cmd(root.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("packsync.yaml"));
    assert!(root.path().join("packsync.yaml").exists());

    packsync_cmd(root.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("already exists"));

    packsync_cmd(root.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn sync_without_package_config_reports_nothing_to_do() {
    let root = TempDir::new().expect("root");
    packsync_cmd(root.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("No new models to compile"));
    assert!(!root.path().join("dist").exists());
}

#[test]
fn dry_run_lists_models_and_writes_nothing() {
    let root = TempDir::new().expect("root");
    write_package_config(root.path());

    packsync_cmd(root.path())
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("gemma-2b"))
        .stdout(contains("phi-2"));

    assert!(!root.path().join("temp_package_config.json").exists());
    assert!(!root.path().join("dist").exists());
}

#[test]
fn plan_json_reports_would_compile() {
    let root = TempDir::new().expect("root");
    write_package_config(root.path());

    let output = packsync_cmd(root.path())
        .args(["plan", "--json"])
        .output()
        .expect("run packsync plan");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["outcome"], "would_compile");
    assert_eq!(json["model_ids"], serde_json::json!(["gemma-2b", "phi-2"]));
}

#[test]
fn status_json_lists_pending_models() {
    let root = TempDir::new().expect("root");
    write_package_config(root.path());

    let output = packsync_cmd(root.path())
        .args(["status", "--json"])
        .output()
        .expect("run packsync status");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["summary"]["pending"], 2);
    assert_eq!(json["models"][0]["model_id"], "gemma-2b");
    assert_eq!(json["models"][0]["signal"], "pending");
}

#[test]
fn malformed_package_config_fails_with_path() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("mlc-package-config.json"), "{").expect("write");

    packsync_cmd(root.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("mlc-package-config.json"));
}

#[test]
#[cfg(unix)]
fn sync_compiles_bundles_and_cleans_up() {
    let root = TempDir::new().expect("root");
    write_package_config(root.path());
    install_fake_compiler(root.path(), 0);

    packsync_cmd(root.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("compiled 2 model(s)"))
        .stdout(contains("(bundled)"));

    let bundle = root.path().join("dist/bundle");
    let app: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(bundle.join("mlc-app-config.json")).expect("app config"),
    )
    .expect("json");
    assert_eq!(app["model_list"][0]["model_id"], "gemma-2b");
    assert_eq!(app["model_list"][1]["model_id"], "phi-2");
    assert!(bundle.join("gemma-2b/params_shard_0.bin").exists());
    assert!(!bundle.join("phi-2").exists(), "unbundled model must not be copied");
    assert!(!root.path().join("temp_package_config.json").exists());
    assert!(!root.path().join("dist_temp").exists());

    packsync_cmd(root.path())
        .arg("sync")
        .assert()
        .success()
        .stdout(contains("No new models to compile"));
}

#[test]
#[cfg(unix)]
fn failing_compiler_leaves_app_config_alone() {
    let root = TempDir::new().expect("root");
    write_package_config(root.path());
    install_fake_compiler(root.path(), 4);

    packsync_cmd(root.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("quantization failed"));

    assert!(!root.path().join("dist/bundle/mlc-app-config.json").exists());
    assert!(!root.path().join("dist/bundle/gemma-2b").exists());
    assert!(!root.path().join("temp_package_config.json").exists());
    assert!(!root.path().join("dist_temp").exists());
}

#[cfg(unix)]
fn seen_device(root: &Path) -> serde_json::Value {
    let order: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(root.join("seen-work-order.json")).expect("work order copy"),
    )
    .expect("json");
    order["device"].clone()
}

#[test]
#[cfg(unix)]
fn device_flag_fills_in_when_package_config_has_none() {
    let root = TempDir::new().expect("root");
    write_package_config_for(root.path(), "");
    install_fake_compiler(root.path(), 0);

    packsync_cmd(root.path())
        .args(["sync", "--device", "android"])
        .assert()
        .success()
        .stdout(contains("for 'android'"));
    assert_eq!(seen_device(root.path()), "android");
}

#[test]
#[cfg(unix)]
fn package_config_device_wins_over_device_flag() {
    let root = TempDir::new().expect("root");
    write_package_config(root.path());
    install_fake_compiler(root.path(), 0);

    packsync_cmd(root.path())
        .args(["sync", "--device", "android"])
        .assert()
        .success()
        .stdout(contains("for 'iphone'"));
    assert_eq!(seen_device(root.path()), "iphone");
}

#[test]
#[cfg(unix)]
fn compiler_flag_replaces_configured_program() {
    let root = TempDir::new().expect("root");
    write_package_config(root.path());
    install_fake_compiler(root.path(), 0);
    fs::write(
        root.path().join("packsync.yaml"),
        "compiler:\n  program: packsync-no-such-compiler\n  args: [fake-compiler.sh, \"{work_order}\", \"{output_dir}\"]\n",
    )
    .expect("config");

    packsync_cmd(root.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("packsync-no-such-compiler"));
    assert!(!root.path().join("dist/bundle/mlc-app-config.json").exists());

    packsync_cmd(root.path())
        .args(["sync", "--compiler", "sh"])
        .assert()
        .success()
        .stdout(contains("compiled 2 model(s)"));
    assert!(root.path().join("dist/bundle/mlc-app-config.json").exists());
}

#[test]
fn overlapping_output_dir_is_refused() {
    let root = TempDir::new().expect("root");
    write_package_config(root.path());
    let bundle = root.path().join("dist/bundle");
    fs::create_dir_all(bundle.join("old")).expect("bundle");
    fs::write(bundle.join("old/params.bin"), "old").expect("weights");
    fs::write(root.path().join("packsync.yaml"), "output_dir: dist\n").expect("config");

    packsync_cmd(root.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("overlaps"));
    assert!(bundle.join("old/params.bin").exists());
}
