// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The typed value an attribute setter produces, and the `svgtypes`-backed
//! parsers that build one from a raw attribute string.

use svgtypes::{AspectRatio, Color, FromSpan, Length, Path, Points, StrSpan, Transform, ViewBox};

use crate::rcstring::RcString;

/// A parsed, typed SVG attribute value, as produced by one entry of the
/// [`crate::svg::attributes`] dispatch table.
///
/// Deliberately narrow: it only covers the value shapes the attribute
/// dispatch table actually produces (lengths, numbers, coordinate lists,
/// paths, colors, links, and bare enum-like keywords), not a full
/// presentation-attribute default-value table.
#[derive(Debug, Clone, PartialEq)]
pub enum SVGAttributeValue {
    /// A verbatim string (universal attributes, `href`, unrecognized
    /// presentation values kept for CSS matching).
    String(RcString),
    /// A bare floating-point number (`pathLength`, `stdDeviation`, ...).
    Number(f64),
    /// `<length-percentage> | <number>`.
    Length(Length),
    /// `points` coordinate pairs.
    Points(Points),
    /// `d`.
    Path(Path),
    /// `transform` / `gradientTransform` / `patternTransform`.
    Transform(Transform),
    /// `viewBox`.
    ViewBox(ViewBox),
    /// `preserveAspectRatio`.
    AspectRatio(AspectRatio),
    /// A CSS/SVG color.
    Color(Color),
    /// A matched keyword from a fixed enum (`spreadMethod`, `*Units`, ...).
    Keyword(RcString),
    /// Two numbers (`stdDeviation`'s two-argument form).
    Pair(f64, f64),
}

impl SVGAttributeValue {
    /// Borrow the underlying string, for the `String`/`Keyword` variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SVGAttributeValue::String(s) | SVGAttributeValue::Keyword(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

fn from_span<'a, T: FromSpan<'a>>(value: &'a str) -> Result<T, String> {
    T::from_span(StrSpan::from_str(value)).map_err(|_| format!("invalid value: {:?}", value))
}

/// Parse a `Length`-typed attribute (`x`, `y`, `width`, `height`, `cx`, `cy`,
/// `r`, `rx`, `ry`, `x1`, `y1`, `x2`, `y2`, ...).
pub fn parse_length(value: &str) -> Result<SVGAttributeValue, String> {
    from_span::<Length>(value.trim()).map(SVGAttributeValue::Length)
}

/// Parse a bare number (`pathLength`).
pub fn parse_number(value: &str) -> Result<SVGAttributeValue, String> {
    value.trim().parse::<f64>().map(SVGAttributeValue::Number).map_err(|e| e.to_string())
}

/// Parse `offset` on a gradient `stop`: a number in `[0, 1]` or a percentage,
/// clamped to `[0, 1]`.
pub fn parse_offset(value: &str) -> Result<SVGAttributeValue, String> {
    let trimmed = value.trim();
    let raw = if let Some(pct) = trimmed.strip_suffix('%') {
        pct.trim().parse::<f64>().map_err(|e| e.to_string())? / 100.0
    } else {
        trimmed.parse::<f64>().map_err(|e| e.to_string())?
    };
    Ok(SVGAttributeValue::Number(raw.max(0.0).min(1.0)))
}

/// Parse `viewBox`: four numbers.
pub fn parse_view_box(value: &str) -> Result<SVGAttributeValue, String> {
    from_span::<ViewBox>(value.trim()).map(SVGAttributeValue::ViewBox)
}

/// Parse `preserveAspectRatio`: align + meet/slice.
pub fn parse_aspect_ratio(value: &str) -> Result<SVGAttributeValue, String> {
    from_span::<AspectRatio>(value.trim()).map(SVGAttributeValue::AspectRatio)
}

/// Parse `points` (polygon/polyline): a list of coordinate pairs. A partial
/// parse is non-fatal at the attribute-dispatch boundary, so the underlying
/// `svgtypes` parser's leniency is relied on rather than re-validated here.
pub fn parse_points(value: &str) -> Result<SVGAttributeValue, String> {
    from_span::<Points>(value.trim()).map(SVGAttributeValue::Points)
}

/// Parse `d` (path data).
pub fn parse_path(value: &str) -> Result<SVGAttributeValue, String> {
    from_span::<Path>(value.trim()).map(SVGAttributeValue::Path)
}

/// Parse `transform` / `gradientTransform` / `patternTransform`.
pub fn parse_transform(value: &str) -> Result<SVGAttributeValue, String> {
    from_span::<Transform>(value.trim()).map(SVGAttributeValue::Transform)
}

/// Parse a presentation color attribute (`fill`, `stroke`, `stop-color`, ...).
pub fn parse_color(value: &str) -> Result<SVGAttributeValue, String> {
    from_span::<Color>(value.trim()).map(SVGAttributeValue::Color)
}

/// Parse `stdDeviation` (Gaussian blur): one or two numbers.
pub fn parse_std_deviation(value: &str) -> Result<SVGAttributeValue, String> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.len() {
        1 => parts[0].parse::<f64>().map(SVGAttributeValue::Number).map_err(|e| e.to_string()),
        2 => {
            let x: f64 = parts[0].parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
            let y: f64 = parts[1].parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
            Ok(SVGAttributeValue::Pair(x, y))
        }
        _ => Err(format!("stdDeviation takes one or two numbers, got {:?}", value)),
    }
}

/// Parse `orient` on `<marker>`: `auto | auto-start-reverse | <angle>`, with
/// a bare number defaulting to degrees.
pub fn parse_orient(value: &str) -> Result<SVGAttributeValue, String> {
    let trimmed = value.trim();
    if trimmed == "auto" || trimmed == "auto-start-reverse" {
        return Ok(SVGAttributeValue::Keyword(RcString::from(trimmed)));
    }
    let numeric = trimmed.trim_end_matches("deg").trim_end_matches("grad").trim_end_matches("rad").trim();
    numeric.parse::<f64>().map(SVGAttributeValue::Number).map_err(|_| format!("invalid angle: {:?}", value))
}

/// Validate a keyword attribute (`spreadMethod`, `*Units`, `gradientUnits`,
/// ...) against a fixed allowed set, returning the matched token unchanged.
pub fn parse_keyword(value: &str, allowed: &[&str]) -> Result<SVGAttributeValue, String> {
    let trimmed = value.trim();
    if allowed.contains(&trimmed) {
        Ok(SVGAttributeValue::Keyword(RcString::from(trimmed)))
    } else {
        Err(format!("{:?} is not one of {:?}", trimmed, allowed))
    }
}

/// `spreadMethod`'s fixed keyword set.
pub const SPREAD_METHOD: &[&str] = &["pad", "reflect", "repeat"];
/// The fixed keyword set shared by `gradientUnits`/`patternUnits`/
/// `clipPathUnits`/`maskUnits`/`maskContentUnits`/`filterUnits`/
/// `primitiveUnits`.
pub const CONTENT_UNITS: &[&str] = &["userSpaceOnUse", "objectBoundingBox"];
/// `markerUnits`'s fixed keyword set.
pub const MARKER_UNITS: &[&str] = &["strokeWidth", "userSpaceOnUse"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_percentage_clamped() {
        assert_eq!(parse_offset("150%").unwrap(), SVGAttributeValue::Number(1.0));
        assert_eq!(parse_offset("-5").unwrap(), SVGAttributeValue::Number(0.0));
        assert_eq!(parse_offset("0.5").unwrap(), SVGAttributeValue::Number(0.5));
    }

    #[test]
    fn std_deviation_one_or_two_numbers() {
        assert_eq!(parse_std_deviation("3").unwrap(), SVGAttributeValue::Number(3.0));
        assert_eq!(parse_std_deviation("3 4").unwrap(), SVGAttributeValue::Pair(3.0, 4.0));
        assert!(parse_std_deviation("1 2 3").is_err());
    }

    #[test]
    fn orient_keyword_or_angle() {
        assert_eq!(parse_orient("auto").unwrap(), SVGAttributeValue::Keyword(RcString::from("auto")));
        assert_eq!(parse_orient("45deg").unwrap(), SVGAttributeValue::Number(45.0));
    }

    #[test]
    fn keyword_rejects_unknown_token() {
        assert!(parse_keyword("bounce", SPREAD_METHOD).is_err());
        assert_eq!(
            parse_keyword("reflect", SPREAD_METHOD).unwrap(),
            SVGAttributeValue::Keyword(RcString::from("reflect"))
        );
    }
}
