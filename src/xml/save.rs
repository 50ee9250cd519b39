// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Plans and applies a batch of edits onto a [`SourceDocument`], producing
//! the updated text, an [`OffsetMap`], and execution diagnostics.

use crate::error::{Error, Result};
use crate::rcstring::RcString;
use crate::xml::replace_span_planner::{ReplaceSpan, ReplaceSpanPlanner};
use crate::xml::source_document::{OffsetMap, Replacement, SourceDocument};

/// Options controlling [`SaveDocument`]'s behavior.
#[derive(Clone, Copy, Debug)]
pub struct SaveOptions {
    /// Allow falling back to expanded replacements when precise spans are
    /// missing or conflicting.
    pub allow_fallback_expansion: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions { allow_fallback_expansion: true }
    }
}

/// Diagnostics describing how a save was executed.
#[derive(Clone, Debug, Default)]
pub struct SaveDiagnostics {
    /// `true` if any fallback replacement was applied.
    pub used_fallback: bool,
    /// The final, ordered replacements that were applied.
    pub applied_replacements: Vec<Replacement>,
}

/// The result of saving a document with span-preserving replacements.
#[derive(Clone, Debug)]
pub struct SaveResult {
    /// The updated source text.
    pub updated_text: RcString,
    /// Maps offsets in the original text to the updated text.
    pub offset_map: OffsetMap,
    /// Execution diagnostics for the save.
    pub diagnostics: SaveDiagnostics,
}

/// Plan and apply `replacements` onto `source`, returning the updated text
/// and diagnostics.
pub fn save_document(
    source: &SourceDocument,
    replacements: Vec<ReplaceSpan>,
    options: &SaveOptions,
) -> Result<SaveResult> {
    let planner = ReplaceSpanPlanner::new();
    let plan_result = planner.plan(replacements)?;

    if !options.allow_fallback_expansion && plan_result.used_fallback {
        return Err(Error::FallbackDisallowed);
    }

    let applied = source.apply_replacements(&plan_result.ordered)?;

    let diagnostics =
        SaveDiagnostics { used_fallback: plan_result.used_fallback, applied_replacements: plan_result.ordered };

    Ok(SaveResult { updated_text: applied.text, offset_map: applied.offset_map, diagnostics })
}

/// Facade grouping the save pipeline's entry point with the document it
/// operates on, mirroring [`crate::xml::document::XMLDocument`]'s
/// "registry + operations" shape.
pub struct SaveDocument;

impl SaveDocument {
    /// Plan and apply `replacements` onto `source`. See [`save_document`].
    pub fn save(
        source: &SourceDocument,
        replacements: Vec<ReplaceSpan>,
        options: &SaveOptions,
    ) -> Result<SaveResult> {
        save_document(source, replacements, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_offset::FileOffsetRange;

    fn primary(start: u64, end: u64, text: &str) -> Replacement {
        Replacement { range: FileOffsetRange::from_offsets(start, end), replacement: RcString::from(text) }
    }

    #[test]
    fn remove_node_round_trip() {
        let source = SourceDocument::new("<svg><rect id='a'/></svg>");
        let replacements = vec![ReplaceSpan { replacement: primary(5, 19, ""), fallback: None }];
        let result = SaveDocument::save(&source, replacements, &SaveOptions::default()).unwrap();
        assert_eq!(result.updated_text.as_str(), "<svg></svg>");
        assert!(!result.diagnostics.used_fallback);
    }

    #[test]
    fn fallback_disallowed_rejects_fallback_plans() {
        let source = SourceDocument::new("abcdef");
        let replacements = vec![ReplaceSpan {
            replacement: primary(0, 5, "x"),
            fallback: None,
        }, ReplaceSpan {
            replacement: primary(3, 8, "y"),
            fallback: Some(primary(0, 8, "merged")),
        }];
        let options = SaveOptions { allow_fallback_expansion: false };
        let result = SaveDocument::save(&source, replacements, &options);
        assert_eq!(result.unwrap_err(), Error::FallbackDisallowed);
    }
}
