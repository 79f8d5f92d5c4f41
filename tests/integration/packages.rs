//! Package ids as sources, and package lists in results.

use sc4pac_tools::core::Sc4pacError;
use sc4pac_tools::package::PackageIndex;
use sc4pac_tools::test_utils::{ExemplarBuilder, TestPlugins};

use crate::common::{BUILDING, PROP, container, exemplar_tgi, lot, tracker};

/// `memo:lots` needs a building from `bsc:houses` and a prop that lives
/// outside any package folder.
fn fixture(plugins: &TestPlugins) {
    plugins
        .write_package_file("200-residential", "bsc:houses", "house.sc4desc", &container(exemplar_tgi(1, 0x100), &ExemplarBuilder::exemplar()))
        .unwrap();
    plugins.write_file("loose/prop.dat", &container(exemplar_tgi(1, 0x200), &ExemplarBuilder::exemplar())).unwrap();
    plugins
        .write_package_file(
            "200-residential",
            "memo:lots",
            "lots.sc4lot",
            &container(exemplar_tgi(2, 1), &lot(&[(BUILDING, &[0x100]), (PROP, &[0x200])])),
        )
        .unwrap();
}

#[tokio::test]
async fn test_package_id_source() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);

    let result = tracker(&plugins).track(&["memo:lots".to_string()]).await.unwrap();

    assert_eq!(result.scanned.len(), 1);
    assert_eq!(result.dependencies.len(), 2);
    // Files outside package folders are dependencies but not packages.
    assert_eq!(result.packages, vec!["bsc:houses".to_string()]);
}

#[tokio::test]
async fn test_package_folder_and_id_are_equivalent() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);
    let tracker = tracker(&plugins);

    let by_id = tracker.track(&["memo:lots".to_string()]).await.unwrap();
    let by_folder = tracker.track(&["200-residential/memo.lots.1.0.0.sc4pac".to_string()]).await.unwrap();
    assert_eq!(by_id, by_folder);
}

#[tokio::test]
async fn test_unknown_package_is_skipped() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);

    let result = tracker(&plugins).track(&["memo:lotz".to_string(), "memo:lots".to_string()]).await.unwrap();
    assert_eq!(result.scanned.len(), 1);

    let packages = PackageIndex::build(&plugins.plugins_dir).await.unwrap();
    assert_eq!(packages.suggest("memo:lotz").map(ToString::to_string).as_deref(), Some("memo:lots"));
}

#[tokio::test]
async fn test_malformed_package_id_is_fatal() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);

    let err = tracker(&plugins).track(&["memo:lots".to_string(), "a:b:c".to_string()]).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<Sc4pacError>(), Some(Sc4pacError::InvalidPackageId { id }) if id == "a:b:c"));
}

#[tokio::test]
async fn test_extra_packages() {
    let plugins = TestPlugins::new().unwrap();
    fixture(&plugins);

    let result = tracker(&plugins).track(&["memo:lots".to_string()]).await.unwrap();
    assert_eq!(result.extra_packages(&[], &[]), vec!["bsc:houses".to_string()]);
    assert!(result.extra_packages(&["bsc:houses".to_string()], &[]).is_empty());
    assert!(result.extra_packages(&[], &["bsc:houses".to_string()]).is_empty());
}
