// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`CleanerConfig`] — the toggles recognised by [`crate::clean`] (§4.1).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration toggles for [`crate::clean`]. Every flag is independently
/// switchable; the sub-passes run in a fixed order (§4.1) regardless of
/// which flags are enabled, so that later passes always see the output of
/// earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CleanerConfig {
    /// Strip nested path prefixes and fused filename timestamps.
    pub remove_file_path_artifacts: bool,
    /// Strip SGML tags, named/numeric/hex entities, and loose attribute
    /// fragments.
    pub remove_html_content: bool,
    /// Strip HP LaserJet/PRS font-descriptor tokens and control-character
    /// runs.
    pub remove_printer_artifacts: bool,
    /// Strip lines dominated by a monotonically-increasing digit sequence,
    /// and leading sequences on otherwise-meaningful lines.
    pub remove_sequential_numbers: bool,
    /// Strip Windows drive paths and UNC paths.
    pub remove_drive_path_references: bool,
    /// When `true`, blank lines and paragraph/block delimiters are kept so
    /// downstream summarisation sees a structured document. When `false`,
    /// blank lines produced by the other passes are collapsed away.
    pub preserve_legal_structure: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            remove_file_path_artifacts: true,
            remove_html_content: true,
            remove_printer_artifacts: true,
            remove_sequential_numbers: true,
            remove_drive_path_references: true,
            preserve_legal_structure: false,
        }
    }
}
