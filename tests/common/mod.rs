//! Common test utilities for sc4pac-tools integration and stress tests
//!
//! Fixture plugins are built with [`DbpfBuilder`] and [`ExemplarBuilder`] from
//! the library's `test-utils` feature; this module adds the pieces that only
//! the outer test suites need.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use assert_cmd::Command;
use sc4pac_tools::constants::{EXEMPLAR_TYPE_LOT_CONFIGURATIONS, TYPE_EXEMPLAR};
use sc4pac_tools::core::Tgi;
use sc4pac_tools::test_utils::{DbpfBuilder, ExemplarBuilder, TestPlugins};
use sc4pac_tools::tracker::{DependencyTracker, TrackerOptions};
use std::path::Path;

/// Lot object kinds as stored in lot configuration exemplars.
pub const BUILDING: u32 = 0;
pub const PROP: u32 = 1;
pub const NETWORK: u32 = 7;

/// Type id of S3D models.
pub const TYPE_S3D: u32 = 0x5AD0_E817;

pub fn exemplar_tgi(group: u32, instance: u32) -> Tgi {
    Tgi::new(TYPE_EXEMPLAR, group, instance)
}

/// A lot configuration with one object per `(kind, iids)` pair.
pub fn lot(objects: &[(u32, &[u32])]) -> ExemplarBuilder {
    objects
        .iter()
        .enumerate()
        .fold(ExemplarBuilder::exemplar().exemplar_type(EXEMPLAR_TYPE_LOT_CONFIGURATIONS), |builder, (slot, (kind, iids))| {
            builder.lot_object(slot as u32, *kind, iids)
        })
}

/// A single-record container holding `exemplar`.
pub fn container(tgi: Tgi, exemplar: &ExemplarBuilder) -> DbpfBuilder {
    DbpfBuilder::new().exemplar(tgi, exemplar)
}

/// Tracker over the fixture's plugins folder without a cache.
pub fn tracker(plugins: &TestPlugins) -> DependencyTracker {
    DependencyTracker::new(options(plugins))
}

pub fn options(plugins: &TestPlugins) -> TrackerOptions {
    TrackerOptions {
        max_concurrency: 8,
        ..TrackerOptions::new(&plugins.plugins_dir)
    }
}

/// `sc4pac-tools` isolated from the user's config and cache.
pub fn cli(plugins: &TestPlugins) -> Command {
    let mut cmd = Command::cargo_bin("sc4pac-tools").unwrap();
    cmd.arg("--no-progress")
        .arg("--config")
        .arg(plugins.temp_dir.path().join("no-such-config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// Append the tracker flags every CLI test needs.
pub fn plugin_args<'a>(cmd: &'a mut Command, plugins: &TestPlugins, cache: Option<&Path>) -> &'a mut Command {
    cmd.arg("--plugins").arg(&plugins.plugins_dir);
    match cache {
        Some(cache) => cmd.arg("--cache").arg(cache),
        None => cmd.arg("--no-cache"),
    }
}
