// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The two-level attribute dispatch table: outer on [`ElementType`], inner
//! on attribute name.
//!
//! Fallthrough rules:
//! - Universal attributes (`id`, `class`, `style`) always apply and never
//!   produce presentation-attribute errors.
//! - Presentation attributes are attempted first; a parse failure is a
//!   warning, not fatal, and the raw value is still stored so CSS matchers
//!   can see it.
//! - Attributes in non-SVG, non-`xmlns`, non-`xlink` namespaces are
//!   preserved but unused; a warning is emitted if they appear to belong to
//!   SVG (i.e. the local name is a recognized `AttributeId`).

use svgtypes::AttributeId;

use crate::rcstring::RcString;
use crate::svg::attribute_value::{
    parse_aspect_ratio, parse_color, parse_keyword, parse_length, parse_number, parse_offset,
    parse_orient, parse_path, parse_points, parse_std_deviation, parse_transform, parse_view_box,
    SVGAttributeValue, CONTENT_UNITS, MARKER_UNITS, SPREAD_METHOD,
};
use crate::svg::element_type::ElementType;
use crate::svg::options::SVGParserOptions;
use crate::xml::qualified_name::XMLQualifiedNameRef;

/// How one attribute was classified before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeClass {
    /// `id`, `class`, or `style`: always stored, never produces a warning.
    Universal,
    /// A recognized SVG attribute, dispatched through the typed table.
    Known(AttributeId),
    /// `xlink:href` (and bare `href`): a link, stored as a string.
    Link,
    /// Anything else: an unprefixed user attribute, or an attribute in an
    /// unrelated namespace.
    Unrecognized,
}

/// Classify `qname` ahead of [`parse_known`]. `xlink`/unprefixed names are
/// looked up against [`AttributeId::from_name`]; anything with a different,
/// non-empty prefix (other than `xmlns`, filtered out upstream by the
/// parser) is `Unrecognized`.
pub fn classify(qname: &XMLQualifiedNameRef<'_>) -> AttributeClass {
    if qname.prefix.is_empty() && matches!(qname.local, "id" | "class" | "style") {
        return AttributeClass::Universal;
    }
    if qname.local == "href" && (qname.prefix.is_empty() || qname.prefix == "xlink") {
        return AttributeClass::Link;
    }
    if qname.prefix.is_empty() || qname.prefix == "xlink" {
        if let Some(id) = AttributeId::from_name(qname.local) {
            return AttributeClass::Known(id);
        }
    }
    AttributeClass::Unrecognized
}

/// Dispatch a recognized attribute to its typed setter. Returns `Err` with a
/// human-readable message on a parse failure; this is never fatal for the
/// element, it only demotes the result to a warning while the raw string is
/// retained separately by the caller.
pub fn parse_known(
    element: &ElementType,
    id: AttributeId,
    raw: &str,
) -> Result<SVGAttributeValue, String> {
    use AttributeId::*;
    match id {
        X | Y | Width | Height | Cx | Cy | R | Rx | Ry | X1 | Y1 | X2 | Y2 => parse_length(raw),
        ViewBox => parse_view_box(raw),
        PreserveAspectRatio => parse_aspect_ratio(raw),
        Points => parse_points(raw),
        D => parse_path(raw),
        PathLength => parse_number(raw),
        Transform | GradientTransform | PatternTransform => parse_transform(raw),
        Offset => parse_offset(raw),
        StdDeviation => parse_std_deviation(raw),
        Orient => parse_orient(raw),
        SpreadMethod => parse_keyword(raw, SPREAD_METHOD),
        GradientUnits | PatternUnits | ClipPathUnits | MaskUnits | MaskContentUnits
        | FilterUnits | PrimitiveUnits => parse_keyword(raw, CONTENT_UNITS),
        MarkerUnits => parse_keyword(raw, MARKER_UNITS),
        Fill | Stroke | StopColor | FloodColor | LightingColor | Color => parse_color(raw),
        FillOpacity | StrokeOpacity | Opacity | StopOpacity | FloodOpacity => parse_number(raw),
        StrokeWidth | StrokeDashoffset | StrokeMiterlimit | FontSize => parse_length(raw),
        _ => {
            let _ = element;
            Ok(SVGAttributeValue::String(RcString::from(raw)))
        }
    }
}

/// The outcome of dispatching one attribute: the parsed value (or the raw
/// string, on failure/unrecognized input), plus an optional warning message.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// `Some` unless the attribute was dropped outright (an unrecognized
    /// user attribute with `disable_user_attributes` set).
    pub value: Option<SVGAttributeValue>,
    /// A non-fatal diagnostic to surface via [`crate::error::Warning`].
    pub warning: Option<String>,
}

/// Dispatch one `(name, raw value)` pair for `element`, applying the
/// fallthrough rules from spec 4.L and the `disable_user_attributes` option
/// from 4.K.
pub fn dispatch_attribute(
    element: &ElementType,
    qname: &XMLQualifiedNameRef<'_>,
    raw: &str,
    options: &SVGParserOptions,
) -> DispatchOutcome {
    match classify(qname) {
        AttributeClass::Universal => {
            DispatchOutcome { value: Some(SVGAttributeValue::String(RcString::from(raw))), warning: None }
        }
        AttributeClass::Link => {
            DispatchOutcome { value: Some(SVGAttributeValue::String(RcString::from(raw))), warning: None }
        }
        AttributeClass::Known(id) => match parse_known(element, id, raw) {
            Ok(value) => DispatchOutcome { value: Some(value), warning: None },
            Err(message) => DispatchOutcome {
                value: Some(SVGAttributeValue::String(RcString::from(raw))),
                warning: Some(message),
            },
        },
        AttributeClass::Unrecognized => {
            if !qname.prefix.is_empty() && qname.prefix != "xmlns" {
                // A namespaced attribute outside xlink/xmlns: preserved but
                // unused. Only warn if the local name looks SVG-ish, i.e. it
                // would have resolved under the default namespace.
                let warning = AttributeId::from_name(qname.local)
                    .map(|_| format!("attribute {} is namespaced and will not be interpreted", qname));
                return DispatchOutcome {
                    value: Some(SVGAttributeValue::String(RcString::from(raw))),
                    warning,
                };
            }
            if options.disable_user_attributes {
                DispatchOutcome {
                    value: None,
                    warning: Some(format!("unknown attribute {} dropped (user attributes disabled)", qname)),
                }
            } else {
                DispatchOutcome { value: Some(SVGAttributeValue::String(RcString::from(raw))), warning: None }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qname(local: &str) -> XMLQualifiedNameRef<'static> {
        XMLQualifiedNameRef { prefix: "", local }
    }

    #[test]
    fn universal_attribute_always_stored() {
        let element = ElementType::Known(svgtypes::ElementId::Rect);
        let outcome = dispatch_attribute(&element, &qname("id"), "rect1", &SVGParserOptions::default());
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.value.unwrap().as_str(), Some("rect1"));
    }

    #[test]
    fn length_attribute_parses() {
        let element = ElementType::Known(svgtypes::ElementId::Rect);
        let outcome = dispatch_attribute(&element, &qname("width"), "10", &SVGParserOptions::default());
        assert!(outcome.warning.is_none());
        assert!(matches!(outcome.value, Some(SVGAttributeValue::Length(_))));
    }

    #[test]
    fn parse_failure_is_warning_not_fatal() {
        let element = ElementType::Known(svgtypes::ElementId::Rect);
        let outcome =
            dispatch_attribute(&element, &qname("width"), "not-a-length", &SVGParserOptions::default());
        assert!(outcome.warning.is_some());
        assert_eq!(outcome.value.unwrap().as_str(), Some("not-a-length"));
    }

    #[test]
    fn unknown_user_attribute_dropped_by_default() {
        let element = ElementType::Known(svgtypes::ElementId::Rect);
        let outcome =
            dispatch_attribute(&element, &qname("my-custom-attribute"), "value", &SVGParserOptions::default());
        assert!(outcome.value.is_none());
        assert!(outcome.warning.is_some());
    }

    #[test]
    fn unknown_user_attribute_kept_when_enabled() {
        let element = ElementType::Known(svgtypes::ElementId::Rect);
        let options = SVGParserOptions { disable_user_attributes: false, ..SVGParserOptions::default() };
        let outcome = dispatch_attribute(&element, &qname("my-custom-attribute"), "value", &options);
        assert_eq!(outcome.value.unwrap().as_str(), Some("value"));
        assert!(outcome.warning.is_none());
    }
}
