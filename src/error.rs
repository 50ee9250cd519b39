// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error and warning types shared by the XML and SVG layers.

use std::fmt;

use crate::FileOffset;

/// Crate-wide error type.
///
/// Covers syntactic XML errors, abuse-mitigation limit violations, and
/// span-preserving save-pipeline failures. SVG-layer attribute parse
/// failures are not part of this enum: they are non-fatal and collected as
/// [`Warning`]s instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A malformed XML construct: mismatched closing tag, missing
    /// delimiter, unterminated string, invalid QName, embedded NUL in a
    /// disallowed context, or an unknown `<!` construct.
    #[error("{message} at {offset}")]
    Syntax {
        /// Description of the malformed construct.
        message: String,
        /// Resolved location of the error.
        offset: FileOffset,
    },

    /// An entity reference could not be resolved (unknown name, or a `<`
    /// introduced by expansion inside an attribute value).
    #[error("{message} at {offset}")]
    Entity {
        /// Description of the failure.
        message: String,
        /// Resolved location of the error.
        offset: FileOffset,
    },

    /// The total entity-substitution count cap was exceeded.
    #[error("HIT_SUBS_CAP: total entity substitutions exceeded the configured limit at {offset}")]
    EntitySubstitutionsExceeded {
        /// Resolved location of the triggering reference.
        offset: FileOffset,
    },

    /// Parsed document must have an `svg` element.
    #[error("the document does not have an SVG element")]
    NoSvgElement,

    /// Parsed document must have at least one node.
    #[error("the document does not have any nodes")]
    EmptyDocument,

    /// A replacement passed to [`crate::SourceDocument::apply_replacements`]
    /// has no resolved offsets.
    #[error("Replacement is missing offset information")]
    ReplacementMissingOffsets,

    /// A replacement's range falls outside the source buffer.
    #[error("Replacement range is out of bounds")]
    ReplacementOutOfBounds,

    /// Replacements passed to [`crate::SourceDocument::apply_replacements`]
    /// were not ordered and non-overlapping.
    #[error("Replacements must be non-overlapping and ordered")]
    ReplacementsNotOrdered,

    /// Internal invariant failure while assembling the replacement rope.
    #[error("Unexpected rope size while applying replacements")]
    UnexpectedRopeSize,

    /// A [`crate::ReplaceSpanPlanner`] entry had no resolved offsets and no
    /// usable fallback.
    #[error("Replacement is missing resolved offsets")]
    PlanMissingResolvedOffsets,

    /// Two planned replacements overlapped and no compatible fallback could
    /// resolve the conflict.
    #[error("Overlapping replacements with no compatible fallback")]
    PlanOverlapUnresolved,

    /// [`crate::SaveOptions::allow_fallback_expansion`] was `false` but a
    /// fallback replacement was required to produce a valid plan.
    #[error("Fallback replacements are disallowed by SaveOptions")]
    FallbackDisallowed,
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal diagnostic produced while walking the SVG tree: an unknown
/// element, an attribute parse failure, or a dropped non-SVG-namespace
/// element. Parsing continues after a warning is recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// Human-readable description of the condition.
    pub message: String,
    /// Resolved location the warning applies to.
    pub offset: FileOffset,
}

impl Warning {
    /// Construct a new warning and immediately log it via the `log` crate.
    pub fn new(message: impl Into<String>, offset: FileOffset) -> Self {
        let message = message.into();
        log::warn!("{} at {}", message, offset);
        Warning { message, offset }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.offset)
    }
}
