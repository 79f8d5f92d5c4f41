//! The `sc4pac-tools` binary.

use predicates::prelude::*;
use sc4pac_tools::test_utils::{ExemplarBuilder, TestPlugins};

use crate::common::{BUILDING, cli, container, exemplar_tgi, lot, plugin_args};

fn fixture(plugins: &TestPlugins) {
    plugins
        .write_package_file("200-residential", "bsc:houses", "house.sc4desc", &container(exemplar_tgi(1, 0x100), &ExemplarBuilder::exemplar()))
        .unwrap();
    plugins
        .write_package_file(
            "200-residential",
            "memo:lots",
            "lots.sc4lot",
            &container(exemplar_tgi(2, 1), &lot(&[(BUILDING, &[0x100, 0xAABB_CCDD])])),
        )
        .unwrap();
}

#[test]
fn test_track_text_report() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);

    let mut cmd = cli(&plugins);
    cmd.arg("track").arg("memo:lots");
    plugin_args(&mut cmd, &plugins, None)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dependencies (sc4pac):"))
        .stdout(predicate::str::contains(" - bsc:houses"))
        .stdout(predicate::str::contains("The following dependencies were not found:"))
        .stdout(predicate::str::contains("0xaabbccdd"));
}

#[test]
fn test_track_json_with_declarations() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);

    let mut cmd = cli(&plugins);
    cmd.args(["track", "memo:lots", "--format", "json", "--declared", "memo:other"]);
    let output = plugin_args(&mut cmd, &plugins, None).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["packages"], serde_json::json!(["bsc:houses"]));
    assert_eq!(json["undeclared"], serde_json::json!(["bsc:houses"]));
    assert_eq!(json["missing"][0]["kind"], "building");
    assert_eq!(json["missing"][0]["instance"], 0xAABB_CCDDu32);
}

#[test]
fn test_relative_plugins_folder() {
    let plugins = TestPlugins::new().unwrap();
    let source = plugins
        .write_file(
            "self.dat",
            &container(exemplar_tgi(2, 0x100), &ExemplarBuilder::exemplar())
                .exemplar(exemplar_tgi(2, 1), &lot(&[(BUILDING, &[0x100])])),
        )
        .unwrap();

    let mut cmd = cli(&plugins);
    cmd.current_dir(plugins.temp_dir.path())
        .args(["track", "--format", "json", "--no-cache", "--plugins", "Plugins"])
        .arg(&source);
    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["scanned"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["dependencies"], serde_json::json!([]));
    assert_eq!(json["missing"], serde_json::json!([]));
}

#[test]
fn test_malformed_package_id_exits_with_error() {
    let plugins = TestPlugins::new().unwrap();

    let mut cmd = cli(&plugins);
    cmd.args(["track", "memo:"]);
    plugin_args(&mut cmd, &plugins, None)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("memo:"));
}

#[test]
fn test_verify_reports_broken_folders() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);

    let mut cmd = cli(&plugins);
    cmd.args(["verify", "200-residential/*"]);
    plugin_args(&mut cmd, &plugins, None)
        .assert()
        .success()
        .stdout(predicate::str::contains("memo.lots.1.0.0.sc4pac"))
        .stdout(predicate::str::contains("bsc.houses.1.0.0.sc4pac").not())
        .stdout(predicate::str::contains("1 of 2 folders have missing dependencies"));
}

#[test]
fn test_index_writes_cache_used_by_track() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);
    let cache = plugins.temp_dir.path().join("cache/index.json");

    let mut cmd = cli(&plugins);
    cmd.arg("index");
    plugin_args(&mut cmd, &plugins, Some(&cache))
        .assert()
        .success()
        .stdout(predicate::str::contains("files:    2"))
        .stdout(predicate::str::contains("records:  2"));
    assert!(cache.exists());

    let mut cmd = cli(&plugins);
    cmd.args(["track", "memo:lots"]);
    plugin_args(&mut cmd, &plugins, Some(&cache)).assert().success().stdout(predicate::str::contains("bsc:houses"));
}

#[test]
fn test_find_by_instance() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);

    let mut cmd = cli(&plugins);
    cmd.args(["find", "--instance", "0x100"]);
    plugin_args(&mut cmd, &plugins, None)
        .assert()
        .success()
        .stdout(predicate::str::contains("0x6534284a-0x00000001-0x00000100"))
        .stdout(predicate::str::contains("house.sc4desc"));

    let mut cmd = cli(&plugins);
    cmd.args(["find", "0x6534284a-0x1-0x999"]);
    plugin_args(&mut cmd, &plugins, None).assert().success().stdout(predicate::str::contains("No matching records"));
}
