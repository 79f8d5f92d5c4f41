//! Parent chains far deeper than any recursion-based search could follow.

use sc4pac_tools::constants::TYPE_COHORT;
use sc4pac_tools::core::Tgi;
use sc4pac_tools::test_utils::{DbpfBuilder, ExemplarBuilder, TestPlugins};
use std::time::Instant;

use crate::common::{container, exemplar_tgi, tracker};

const DEPTH: u32 = 5_000;

fn cohort(n: u32) -> Tgi {
    Tgi::new(TYPE_COHORT, 0xC0, n)
}

#[tokio::test]
async fn test_deep_parent_chain_in_one_file() {
    let plugins = TestPlugins::new().unwrap();

    // cohort(n) inherits from cohort(n + 1); the last one has no parent.
    let mut chain = DbpfBuilder::new();
    for n in 0..DEPTH {
        let builder = if n + 1 < DEPTH {
            ExemplarBuilder::cohort().parent(cohort(n + 1))
        } else {
            ExemplarBuilder::cohort()
        };
        chain = chain.exemplar(cohort(n), &builder);
    }
    let chain_file = plugins.write_file("chain.dat", &chain).unwrap();
    let source = plugins.write_file("leaf.dat", &container(exemplar_tgi(0, 1), &ExemplarBuilder::exemplar().parent(cohort(0)))).unwrap();

    let tracker = tracker(&plugins);
    tracker.ensure_index().await.unwrap();

    let start = Instant::now();
    let result = tracker.track(&[source.display().to_string()]).await.unwrap();
    println!("Followed {DEPTH} parents in {:?}", start.elapsed());

    assert_eq!(result.dependencies, vec![chain_file]);
    assert!(result.missing.is_empty());
}

#[tokio::test]
async fn test_deep_parent_chain_across_files() {
    const FILES: u32 = 1_000;
    let plugins = TestPlugins::new().unwrap();

    let mut expected = Vec::new();
    for n in 0..FILES {
        let builder = if n + 1 < FILES {
            ExemplarBuilder::cohort().parent(cohort(n + 1))
        } else {
            // The chain ends in a cycle back to the start.
            ExemplarBuilder::cohort().parent(cohort(0))
        };
        expected.push(plugins.write_file(format!("chain/{n:05}.dat"), &container(cohort(n), &builder)).unwrap());
    }
    let source = plugins.write_file("leaf.dat", &container(exemplar_tgi(0, 1), &ExemplarBuilder::exemplar().parent(cohort(0)))).unwrap();

    let start = Instant::now();
    let result = tracker(&plugins).track(&[source.display().to_string()]).await.unwrap();
    println!("Indexed and followed {FILES} files in {:?}", start.elapsed());

    assert_eq!(result.dependencies, expected);
}
