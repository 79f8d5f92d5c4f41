//! Lots that fan out to thousands of dependencies at once.

use sc4pac_tools::test_utils::{ExemplarBuilder, TestPlugins};
use std::time::Instant;

use crate::common::{BUILDING, PROP, container, exemplar_tgi, lot, tracker};

#[tokio::test]
async fn test_wide_lot_collection() {
    const PACKAGES: u32 = 200;
    const LOTS: u32 = 400;
    let plugins = TestPlugins::new().unwrap();

    for p in 0..PACKAGES {
        plugins
            .write_package_file(
                "100-props-textures",
                &format!("stress:pkg-{p:03}"),
                "props.dat",
                &container(exemplar_tgi(0x10, 0x1000 + p), &ExemplarBuilder::exemplar()),
            )
            .unwrap();
    }

    // Every lot references two packages and one missing building; many lots
    // share the same targets.
    for l in 0..LOTS {
        let a = 0x1000 + (l % PACKAGES);
        let b = 0x1000 + ((l * 7) % PACKAGES);
        plugins
            .write_package_file(
                "200-residential",
                "stress:lots",
                &format!("lot-{l:04}.sc4lot"),
                &container(exemplar_tgi(0x20, l), &lot(&[(PROP, &[a, b]), (BUILDING, &[0xDEAD_0000 + l])])),
            )
            .unwrap();
    }

    let tracker = tracker(&plugins);
    let start = Instant::now();
    let result = tracker.track(&["stress:lots".to_string()]).await.unwrap();
    println!("Tracked {LOTS} lots in {:?}", start.elapsed());

    assert_eq!(result.scanned.len(), LOTS as usize);
    assert_eq!(result.dependencies.len(), PACKAGES as usize);
    assert_eq!(result.packages.len(), PACKAGES as usize);
    assert_eq!(result.missing.len(), LOTS as usize);

    let again = tracker.track(&["stress:lots".to_string()]).await.unwrap();
    assert_eq!(again.dependencies, result.dependencies);
    assert_eq!(again.packages, result.packages);
}
