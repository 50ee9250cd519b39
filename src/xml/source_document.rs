// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An immutable source buffer that applies ordered, non-overlapping
//! replacements and tracks how offsets in the original text map onto the
//! updated one.

use crate::error::{Error, Result};
use crate::file_offset::{FileOffset, FileOffsetRange, LineOffsets};
use crate::rcstring::RcString;

/// A single `(span, replacement text)` edit to apply to a [`SourceDocument`].
#[derive(Clone, Debug)]
pub struct Replacement {
    /// The original span to replace.
    pub range: FileOffsetRange,
    /// The text to substitute in its place.
    pub replacement: RcString,
}

#[derive(Clone, Copy, Debug)]
struct ReplacementInfo {
    start: usize,
    end: usize,
    replacement_size: usize,
    delta_before: i64,
    delta_after: i64,
}

/// Maps byte offsets in the original source to their position in the
/// updated source produced by [`SourceDocument::apply_replacements`].
#[derive(Clone, Debug)]
pub struct OffsetMap {
    original_size: usize,
    replacements: Vec<ReplacementInfo>,
    line_offsets: LineOffsets,
}

impl OffsetMap {
    fn map_offset(&self, offset: usize) -> usize {
        let mut delta = 0i64;
        for replacement in &self.replacements {
            if offset < replacement.start {
                break;
            }
            if offset < replacement.end {
                let relative = offset - replacement.start;
                let clamped = relative.min(replacement.replacement_size);
                let translated =
                    replacement.start as i64 + replacement.delta_before + clamped as i64;
                return translated.max(0) as usize;
            }
            delta = replacement.delta_after;
        }
        (offset as i64 + delta).max(0) as usize
    }

    /// Translate an offset from the original text into the updated text.
    pub fn translate_offset(&self, offset: &FileOffset) -> FileOffset {
        let resolved = offset.byte_offset.unwrap_or(self.original_size as u64) as usize;
        let mapped = self.map_offset(resolved.min(self.original_size));
        let mut translated = FileOffset::offset(mapped as u64);
        translated.line_info = Some(self.line_offsets.resolve(mapped as u64));
        translated
    }

    /// Translate both endpoints of a range into the updated text.
    pub fn translate_range(&self, range: &FileOffsetRange) -> FileOffsetRange {
        FileOffsetRange {
            start: self.translate_offset(&range.start),
            end: self.translate_offset(&range.end),
        }
    }
}

/// The result of [`SourceDocument::apply_replacements`]: the updated text
/// plus the map from old to new offsets.
#[derive(Clone, Debug)]
pub struct ApplyResult {
    /// The source text after every replacement has been spliced in.
    pub text: RcString,
    /// Maps offsets in the original text to the updated text.
    pub offset_map: OffsetMap,
}

/// An immutable view of an XML source buffer supporting constrained,
/// span-based replacements.
#[derive(Clone, Debug)]
pub struct SourceDocument {
    source: RcString,
}

impl SourceDocument {
    /// Construct a view over `text`. The original buffer is never mutated.
    pub fn new(text: impl Into<RcString>) -> Self {
        SourceDocument { source: text.into() }
    }

    /// The original, unmodified source text.
    pub fn original_text(&self) -> &str {
        self.source.as_str()
    }

    /// Length in bytes of the original source.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns `true` if the original source is empty.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Apply `replacements` (must be ordered by start offset and
    /// non-overlapping) to the original text, producing the updated text
    /// and an [`OffsetMap`].
    pub fn apply_replacements(&self, replacements: &[Replacement]) -> Result<ApplyResult> {
        let source = self.source.as_str();

        let mut resolved = Vec::with_capacity(replacements.len());
        let mut previous_end = 0usize;
        let mut cumulative_delta = 0i64;

        for replacement in replacements {
            let resolved_start = replacement.range.start.resolve_offset(source);
            let resolved_end = replacement.range.end.resolve_offset(source);

            let (start, end) = match (resolved_start.byte_offset, resolved_end.byte_offset) {
                (Some(s), Some(e)) => (s as usize, e as usize),
                _ => return Err(Error::ReplacementMissingOffsets),
            };

            if start > end || end > source.len() {
                return Err(Error::ReplacementOutOfBounds);
            }
            if start < previous_end {
                return Err(Error::ReplacementsNotOrdered);
            }

            let delta = replacement.replacement.len() as i64 - (end - start) as i64;
            resolved.push(ReplacementInfo {
                start,
                end,
                replacement_size: replacement.replacement.len(),
                delta_before: cumulative_delta,
                delta_after: cumulative_delta + delta,
            });

            cumulative_delta += delta;
            previous_end = end;
        }

        let target_size = source.len() as i64 + cumulative_delta;

        let mut buf = Vec::with_capacity(target_size.max(0) as usize);
        let mut cursor = 0usize;
        for (i, info) in resolved.iter().enumerate() {
            buf.extend_from_slice(source[cursor..info.start].as_bytes());
            buf.extend_from_slice(replacements[i].replacement.as_bytes());
            cursor = info.end;
        }
        buf.extend_from_slice(source[cursor..].as_bytes());

        let updated_text = RcString::from_vec(buf);
        if updated_text.len() as i64 != target_size.max(0) {
            return Err(Error::UnexpectedRopeSize);
        }

        let line_offsets = LineOffsets::new(updated_text.as_str());
        let offset_map = OffsetMap { original_size: source.len(), replacements: resolved, line_offsets };

        Ok(ApplyResult { text: updated_text, offset_map })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacement(start: u64, end: u64, text: &str) -> Replacement {
        Replacement { range: FileOffsetRange::from_offsets(start, end), replacement: RcString::from(text) }
    }

    #[test]
    fn single_replacement_updates_text_and_offsets() {
        let doc = SourceDocument::new("alpha beta gamma");
        let result = doc.apply_replacements(&[replacement(6, 10, "BETA")]).unwrap();
        assert_eq!(result.text.as_str(), "alpha BETA gamma");
        assert_eq!(result.offset_map.translate_offset(&FileOffset::offset(12)).byte_offset, Some(12));
        assert_eq!(result.offset_map.translate_offset(&FileOffset::offset(8)).byte_offset, Some(8));
    }

    #[test]
    fn shrinking_replacement_shifts_trailing_offsets() {
        let doc = SourceDocument::new("<svg><rect id='a'/></svg>");
        let result = doc.apply_replacements(&[replacement(5, 19, "")]).unwrap();
        assert_eq!(result.text.as_str(), "<svg></svg>");
        // An offset after the removed range should be translated backward by
        // the size of the deletion: offset 20 (the '/' of the original
        // "</svg>") lands at offset 6 (the '/' of "</svg>" in "<svg></svg>").
        let translated = result.offset_map.translate_offset(&FileOffset::offset(20));
        assert_eq!(translated.byte_offset, Some(6));
    }

    #[test]
    fn end_of_string_endpoint_resolves_to_source_length() {
        let doc = SourceDocument::new("abc");
        let insert_at_end = Replacement {
            range: FileOffsetRange { start: FileOffset::end_of_string(), end: FileOffset::end_of_string() },
            replacement: RcString::from("x"),
        };
        let result = doc.apply_replacements(&[insert_at_end]).unwrap();
        assert_eq!(result.text.as_str(), "abcx");
    }

    #[test]
    fn out_of_bounds_range_is_an_error() {
        let doc = SourceDocument::new("abc");
        let result = doc.apply_replacements(&[replacement(0, 10, "x")]);
        assert_eq!(result.unwrap_err(), Error::ReplacementOutOfBounds);
    }

    #[test]
    fn overlapping_replacements_are_rejected() {
        let doc = SourceDocument::new("abcdef");
        let result = doc.apply_replacements(&[replacement(0, 3, "x"), replacement(2, 4, "y")]);
        assert_eq!(result.unwrap_err(), Error::ReplacementsNotOrdered);
    }
}
