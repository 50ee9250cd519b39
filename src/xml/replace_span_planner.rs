// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Orders span-based replacements, detects conflicts, and promotes fallback
//! replacements when a primary span is missing or overlaps another entry.

use crate::error::{Error, Result};
use crate::file_offset::FileOffsetRange;
use crate::xml::source_document::Replacement;

/// A primary replacement plus an optional, coarser fallback to use if the
/// primary is unresolved or conflicts with another entry.
#[derive(Clone, Debug)]
pub struct ReplaceSpan {
    /// The preferred, precise replacement.
    pub replacement: Replacement,
    /// A fallback replacement (typically covering a wider, already-anchored
    /// span) to use if `replacement` can't be applied as-is.
    pub fallback: Option<Replacement>,
}

/// The outcome of [`ReplaceSpanPlanner::plan`]: a sorted, non-overlapping
/// replacement list, and whether any fallback was required.
#[derive(Clone, Debug, Default)]
pub struct PlanResult {
    /// Replacements in application order (sorted by start, non-overlapping).
    pub ordered: Vec<Replacement>,
    /// `true` if at least one entry's fallback was promoted to resolve a
    /// missing span or an overlap.
    pub used_fallback: bool,
}

fn has_concrete_offsets(range: &FileOffsetRange) -> bool {
    range.start.byte_offset.is_some() && range.end.byte_offset.is_some()
}

fn start_offset(range: &FileOffsetRange) -> u64 {
    range.start.byte_offset.expect("range has concrete offsets")
}

fn end_offset(range: &FileOffsetRange) -> u64 {
    range.end.byte_offset.expect("range has concrete offsets")
}

fn overlaps(lhs: &FileOffsetRange, rhs: &FileOffsetRange) -> bool {
    start_offset(lhs) < end_offset(rhs) && start_offset(rhs) < end_offset(lhs)
}

/// Orders, merges, and falls back on conflicting replacement spans.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplaceSpanPlanner;

impl ReplaceSpanPlanner {
    /// Construct a planner. Stateless; exists to mirror the shape of the
    /// other save-pipeline components.
    pub fn new() -> Self {
        ReplaceSpanPlanner
    }

    /// Produce an ordered, non-overlapping replacement list from `entries`.
    ///
    /// Entries whose primary span is unresolved are promoted to their
    /// fallback (if any). Entries are then stable-sorted by start offset and
    /// walked in order: an entry overlapping the last committed replacement
    /// is resolved by promoting its fallback when that fallback fully covers
    /// both ranges without also overlapping the replacement two-before-last;
    /// otherwise planning fails.
    pub fn plan(&self, mut entries: Vec<ReplaceSpan>) -> Result<PlanResult> {
        let mut result = PlanResult::default();

        for entry in entries.iter_mut() {
            if !has_concrete_offsets(&entry.replacement.range) {
                match entry.fallback.take() {
                    Some(fallback) if has_concrete_offsets(&fallback.range) => {
                        entry.replacement = fallback;
                        result.used_fallback = true;
                    }
                    _ => return Err(Error::PlanMissingResolvedOffsets),
                }
            }
        }

        entries.sort_by_key(|entry| start_offset(&entry.replacement.range));

        for entry in entries {
            if result.ordered.is_empty() {
                result.ordered.push(entry.replacement);
                continue;
            }

            let last = result.ordered.last().unwrap();
            if !overlaps(&last.range, &entry.replacement.range) {
                result.ordered.push(entry.replacement);
                continue;
            }

            let mut resolved = false;
            if let Some(fallback) = entry.fallback.as_ref() {
                if has_concrete_offsets(&fallback.range) {
                    let last_range = &result.ordered.last().unwrap().range;
                    let covers_last = start_offset(&fallback.range) <= start_offset(last_range)
                        && end_offset(&fallback.range) >= end_offset(last_range)
                        && end_offset(&fallback.range) >= end_offset(&entry.replacement.range);

                    let len = result.ordered.len();
                    let clear_of_older = len < 2
                        || end_offset(&result.ordered[len - 2].range) <= start_offset(&fallback.range);

                    if covers_last && clear_of_older {
                        *result.ordered.last_mut().unwrap() = fallback.clone();
                        result.used_fallback = true;
                        resolved = true;
                    }
                }
            }

            if !resolved {
                return Err(Error::PlanOverlapUnresolved);
            }
        }

        Ok(result)
    }
}
