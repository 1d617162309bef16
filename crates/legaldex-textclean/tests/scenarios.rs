// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end scenarios seeded directly from the component spec (§8).

use legaldex_textclean::{clean, CleanerConfig};

#[test]
fn sequential_line_artifact_scenario() {
    let input = "1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 L AW O FFI";
    let out = clean(input, &CleanerConfig::default());
    assert_eq!(out, "L AW O FFI");
}

#[test]
fn nested_path_and_fused_timestamp_scenario() {
    let input = "data/data/data/!KOTRLAF.txtWed Apr 30 18:55:26 2025ACTUAL";
    let out = clean(input, &CleanerConfig::default());
    assert_eq!(out, "ACTUAL");
}
