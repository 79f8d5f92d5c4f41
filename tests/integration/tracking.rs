//! Closure semantics of `DependencyTracker::track`.

use sc4pac_tools::constants::{TYPE_COHORT, TYPE_EXEMPLAR};
use sc4pac_tools::core::Tgi;
use sc4pac_tools::index::{FileIndex, PropFamilyPolicy};
use sc4pac_tools::test_utils::{DbpfBuilder, ExemplarBuilder, TestPlugins};
use sc4pac_tools::tracker::{DependencyTracker, MissingKind, TrackerOptions};
use std::sync::Arc;

use crate::common::{BUILDING, NETWORK, PROP, TYPE_S3D, container, exemplar_tgi, lot, options, tracker};

fn source_arg(path: &std::path::Path) -> Vec<String> {
    vec![path.display().to_string()]
}

#[tokio::test]
async fn test_missing_building_is_reported() {
    let plugins = TestPlugins::new().unwrap();
    let source = plugins
        .write_file("my-lots/lot.SC4Lot", &container(exemplar_tgi(0x100, 1), &lot(&[(BUILDING, &[0xAABB_CCDD])])))
        .unwrap();

    let result = tracker(&plugins).track(&source_arg(&source)).await.unwrap();

    assert_eq!(result.scanned, vec![source.clone()]);
    assert!(result.dependencies.is_empty());
    assert!(result.packages.is_empty());
    assert_eq!(result.missing.len(), 1);
    let missing = &result.missing[0];
    assert_eq!(missing.kind, MissingKind::Building);
    assert_eq!(missing.file, source);
    assert_eq!(missing.instance, 0xAABB_CCDD);
    assert_eq!((missing.type_id, missing.group), (None, None));
}

#[tokio::test]
async fn test_tracking_is_idempotent() {
    let plugins = TestPlugins::new().unwrap();
    let building = exemplar_tgi(0x100, 0x5000);
    let model = Tgi::new(TYPE_S3D, 0xBADB_57F1, 0x5001);
    plugins
        .write_package_file(
            "200-residential",
            "memo:tower",
            "tower.sc4desc",
            &DbpfBuilder::new().exemplar(
                building,
                &ExemplarBuilder::exemplar().uint32_array(0x2781_2820, &[model.type_id, model.group, model.instance]),
            ),
        )
        .unwrap();
    plugins.write_package_file("100-props-textures", "memo:models", "m.sc4model", &DbpfBuilder::new().record(model, b"3DMD".to_vec())).unwrap();
    let source = plugins
        .write_file("lot.sc4lot", &container(exemplar_tgi(0x100, 1), &lot(&[(BUILDING, &[0x5000]), (PROP, &[0x0DEA_D000])])))
        .unwrap();

    let shared = tracker(&plugins);
    let first = shared.track(&source_arg(&source)).await.unwrap();
    let second = shared.track(&source_arg(&source)).await.unwrap();
    let fresh = tracker(&plugins).track(&source_arg(&source)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, fresh);
    assert_eq!(first.packages, vec!["memo:models".to_string(), "memo:tower".to_string()]);
    assert_eq!(first.missing.len(), 1);
}

#[tokio::test]
async fn test_shared_family_target_appears_once() {
    let plugins = TestPlugins::new().unwrap();
    let family = 0xF00D_0001;
    let props = plugins
        .write_package_file(
            "100-props-textures",
            "bsc:trees",
            "trees.dat",
            &DbpfBuilder::new()
                .exemplar(exemplar_tgi(0x200, 1), &ExemplarBuilder::exemplar().families(&[family]))
                .exemplar(exemplar_tgi(0x200, 2), &ExemplarBuilder::exemplar().families(&[family])),
        )
        .unwrap();
    let source = plugins
        .write_file(
            "parks.dat",
            &DbpfBuilder::new()
                .exemplar(exemplar_tgi(0x100, 1), &lot(&[(PROP, &[family]), (PROP, &[family])]))
                .exemplar(exemplar_tgi(0x100, 2), &lot(&[(PROP, &[family])])),
        )
        .unwrap();

    let result = tracker(&plugins).track(&source_arg(&source)).await.unwrap();

    assert_eq!(result.dependencies, vec![props]);
    assert_eq!(result.packages, vec!["bsc:trees".to_string()]);
    assert!(result.missing.is_empty());
}

#[tokio::test]
async fn test_parent_cycles_terminate() {
    let plugins = TestPlugins::new().unwrap();
    let cohort_a = Tgi::new(TYPE_COHORT, 0, 0xA);
    let cohort_b = Tgi::new(TYPE_COHORT, 0, 0xB);
    let a = plugins.write_file("a.dat", &container(cohort_a, &ExemplarBuilder::cohort().parent(cohort_b))).unwrap();
    let b = plugins.write_file("b.dat", &container(cohort_b, &ExemplarBuilder::cohort().parent(cohort_a))).unwrap();
    let source = plugins
        .write_file("src.dat", &container(exemplar_tgi(0, 1), &ExemplarBuilder::exemplar().parent(cohort_a)))
        .unwrap();

    let tracker = tracker(&plugins);
    let result = tracker.track(&source_arg(&source)).await.unwrap();
    assert_eq!(result.dependencies, vec![a.clone(), b.clone()]);

    // A file that is reached again through the cycle still isn't its own dependency.
    let result = tracker.track(&source_arg(&a)).await.unwrap();
    assert_eq!(result.dependencies, vec![b]);
}

#[tokio::test]
async fn test_later_root_overrides_game_files() {
    let plugins = TestPlugins::new().unwrap();
    let game = plugins.sibling_dir("SimCity 4").unwrap();
    let building = exemplar_tgi(0x100, 0x6000);
    DbpfBuilder::new().exemplar(building, &ExemplarBuilder::exemplar()).write_to(game.join("SimCity_1.dat")).unwrap();
    let replacement = plugins
        .write_package_file("150-mods", "memo:fix", "fix.dat", &container(building, &ExemplarBuilder::exemplar()))
        .unwrap();
    let source = plugins.write_file("lot.sc4lot", &container(exemplar_tgi(0x100, 1), &lot(&[(BUILDING, &[0x6000])]))).unwrap();

    let options = TrackerOptions {
        game_dir: Some(game),
        ..options(&plugins)
    };
    let tracker = DependencyTracker::new(options);
    let index = tracker.ensure_index().await.unwrap();
    assert_eq!(index.path(index.find(&building).unwrap().file), replacement.as_path());

    let result = tracker.track(&source_arg(&source)).await.unwrap();
    assert_eq!(result.dependencies, vec![replacement]);
    assert_eq!(result.packages, vec!["memo:fix".to_string()]);
}

#[tokio::test]
async fn test_exemptions() {
    let plugins = TestPlugins::new().unwrap();
    let building = ExemplarBuilder::exemplar()
        .uint32_array(0x2781_2820, &[TYPE_S3D, 0xBADB_57F1, 0])
        .uint32_array(0x2781_2821, &[TYPE_S3D, 0xBADB_57F1, 0x7777]);
    let source = plugins
        .write_file(
            "mixed.dat",
            &DbpfBuilder::new()
                .exemplar(exemplar_tgi(0, 1), &lot(&[(NETWORK, &[0x0BAD_0001]), (5, &[0x0BAD_0002]), (6, &[0x0BAD_0003])]))
                .exemplar(exemplar_tgi(0, 2), &building),
        )
        .unwrap();

    let result = tracker(&plugins).track(&source_arg(&source)).await.unwrap();

    assert_eq!(result.missing.len(), 1);
    let missing = &result.missing[0];
    assert_eq!(missing.kind, MissingKind::Model);
    assert_eq!((missing.type_id, missing.group, missing.instance), (Some(TYPE_S3D), Some(0xBADB_57F1), 0x7777));
}

#[tokio::test]
async fn test_inputs_are_never_dependencies() {
    let plugins = TestPlugins::new().unwrap();
    let building = exemplar_tgi(0x100, 0x42);
    let both = plugins
        .write_file(
            "self-contained.dat",
            &DbpfBuilder::new()
                .exemplar(building, &ExemplarBuilder::exemplar())
                .exemplar(exemplar_tgi(0x100, 1), &lot(&[(BUILDING, &[0x42])])),
        )
        .unwrap();

    let result = tracker(&plugins).track(&source_arg(&both)).await.unwrap();
    assert!(result.dependencies.is_empty());
    assert!(result.missing.is_empty());
}

#[tokio::test]
async fn test_compressed_and_corrupt_files() {
    let plugins = TestPlugins::new().unwrap();
    let building = exemplar_tgi(0x100, 0x99);
    let compressed = plugins
        .write_file(
            "compressed.dat",
            &DbpfBuilder::new().compressed_record(building, ExemplarBuilder::exemplar().parent(Tgi::new(TYPE_COHORT, 0, 0x98)).build()),
        )
        .unwrap();
    let cohort_file = plugins.write_file("cohort.dat", &container(Tgi::new(TYPE_COHORT, 0, 0x98), &ExemplarBuilder::cohort())).unwrap();
    let corrupt = plugins.write_raw("corrupt.dat", b"DBPF\x01\x00\x00\x00truncated").unwrap();
    let source = plugins.write_file("lot.sc4lot", &container(exemplar_tgi(0x100, 1), &lot(&[(BUILDING, &[0x99])]))).unwrap();

    let result = tracker(&plugins)
        .track(&[source.display().to_string(), corrupt.display().to_string()])
        .await
        .unwrap();

    assert_eq!(result.dependencies, vec![cohort_file, compressed]);
    assert!(result.missing.is_empty());
}

#[tokio::test]
async fn test_record_outside_its_file_does_not_override() {
    let plugins = TestPlugins::new().unwrap();
    let building = exemplar_tgi(0x100, 0x99);
    let good = plugins.write_file("a-good.dat", &container(building, &ExemplarBuilder::exemplar())).unwrap();
    // Scanned after the good file; its entry for the same TGI claims far more
    // bytes than the file holds.
    plugins.write_file("z-broken.dat", &DbpfBuilder::new().oversized_record(building, 0xFFFF_0000)).unwrap();
    let source = plugins.write_file("lot.sc4lot", &container(exemplar_tgi(0x100, 1), &lot(&[(BUILDING, &[0x99])]))).unwrap();

    let tracker = tracker(&plugins);
    let index = tracker.ensure_index().await.unwrap();
    assert_eq!(index.path(index.find(&building).unwrap().file), good.as_path());

    let result = tracker.track(&source_arg(&source)).await.unwrap();
    assert_eq!(result.dependencies, vec![good]);
    assert!(result.missing.is_empty());
}

#[tokio::test]
async fn test_prebuilt_index_is_shared() {
    let plugins = TestPlugins::new().unwrap();
    let record = Tgi::new(TYPE_EXEMPLAR, 1, 1);
    let dep = plugins.write_file("dep.dat", &container(record, &ExemplarBuilder::exemplar())).unwrap();
    let source = plugins.write_file("src.dat", &container(exemplar_tgi(0, 2), &ExemplarBuilder::exemplar().parent(record))).unwrap();

    let index = Arc::new(FileIndex::build(&options(&plugins).scan_roots(), &PropFamilyPolicy).await.unwrap());
    let first = DependencyTracker::with_index(options(&plugins), Arc::clone(&index));
    let second = DependencyTracker::with_index(options(&plugins), Arc::clone(&index));

    let (arg_a, arg_b) = (source_arg(&source), source_arg(&source));
    let (a, b) = tokio::join!(first.track(&arg_a), second.track(&arg_b));
    assert_eq!(a.unwrap().dependencies, vec![dep.clone()]);
    assert_eq!(b.unwrap().dependencies, vec![dep]);
}
