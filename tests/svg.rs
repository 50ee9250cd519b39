// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate pretty_assertions;

use svgxml::svg::{ElementType, SVGAttributeValue, SVGParser, SVGParserOptions};
use svgxml::xml::{XMLParser, XMLParserOptions};
use svgtypes::ElementId;

fn parse_svg(source: &str, options: &SVGParserOptions) -> (svgxml::svg::SVGElement, Vec<svgxml::error::Warning>) {
    let doc = XMLParser::parse(source, &XMLParserOptions::default()).unwrap();
    SVGParser::parse(&doc, options).unwrap()
}

#[test]
fn presentation_attributes_are_typed() {
    let source = "<svg xmlns='http://www.w3.org/2000/svg'>\
        <rect width='10' height='20' fill='red'/>\
        </svg>";
    let (root, warnings) = parse_svg(source, &SVGParserOptions::default());
    assert!(warnings.is_empty());

    let rect = root.node().first_child().unwrap();
    let rect_element = svgxml::svg::SVGElement::new(rect.clone(), ElementType::resolve(&rect.tag_name().unwrap()));
    assert!(rect_element.isa(ElementId::Rect));

    match rect_element.typed_attribute("width") {
        Some(SVGAttributeValue::Length(_)) => {}
        other => panic!("expected a parsed length, got {:?}", other),
    }
    match rect_element.typed_attribute("fill") {
        Some(SVGAttributeValue::Color(_)) => {}
        other => panic!("expected a parsed color, got {:?}", other),
    }
}

#[test]
fn user_attributes_are_kept_when_disable_user_attributes_is_false() {
    let source = "<svg xmlns='http://www.w3.org/2000/svg'><rect data-custom='keep-me'/></svg>";
    let options = SVGParserOptions { disable_user_attributes: false, ..SVGParserOptions::default() };
    let (root, warnings) = parse_svg(source, &options);
    assert!(warnings.is_empty());

    let rect = root.node().first_child().unwrap();
    assert_eq!(rect.attribute("data-custom").unwrap().as_str(), "keep-me");
}

#[test]
fn unknown_root_elements_resolve_to_unknown_type() {
    let source = "<svg xmlns='http://www.w3.org/2000/svg'><my-custom-tag/></svg>";
    let doc = XMLParser::parse(source, &XMLParserOptions::default()).unwrap();
    let options = SVGParserOptions::default();
    let (root, _) = SVGParser::parse(&doc, &options).unwrap();

    let custom = root.node().first_child().unwrap();
    let resolved = ElementType::resolve(&custom.tag_name().unwrap());
    assert!(resolved.as_known().is_none());
}
