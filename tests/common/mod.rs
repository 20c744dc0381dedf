// tests/common/mod.rs
// Shared fixture loading for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;

use fed_stance_monitor::ingest::providers::fed_rss::FedRssProvider;

pub const PAGE_BASE: &str = "https://www.federalreserve.gov/newsevents/pressreleases/";

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
}

/// Feed + the three statement pages it links to (December 2023 is left out
/// on purpose to exercise a failing page).
pub fn fed_fixture() -> FedRssProvider {
    let pages = ["monetary20240131a.htm", "monetary20240320a.htm", "monetary20240501a.htm"]
        .into_iter()
        .map(|p| (format!("{PAGE_BASE}{p}"), fixture(p)))
        .collect::<HashMap<_, _>>();
    FedRssProvider::from_fixture(fixture("press_monetary.xml"), pages)
}
