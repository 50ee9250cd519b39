// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate pretty_assertions;

use svgxml::svg::{ElementType, SVGParser, SVGParserOptions};
use svgxml::xml::{XMLParser, XMLParserOptions};

#[test]
fn node_debug_includes_kind_and_tag_name() {
    let doc = XMLParser::parse("<svg><rect/></svg>", &XMLParserOptions::default()).unwrap();
    let rect = doc.root().first_child().unwrap().first_child().unwrap();
    let text = format!("{:?}", rect);
    assert!(text.contains("Element"));
    assert!(text.contains("rect"));
}

#[test]
fn svg_element_debug_includes_resolved_type() {
    let source = "<svg xmlns='http://www.w3.org/2000/svg'><circle/></svg>";
    let doc = XMLParser::parse(source, &XMLParserOptions::default()).unwrap();
    let (root, warnings) = SVGParser::parse(&doc, &SVGParserOptions::default()).unwrap();
    assert!(warnings.is_empty());

    let circle = root.node().first_child().unwrap();
    let circle_type = ElementType::resolve(&circle.tag_name().unwrap());
    assert_eq!(circle_type.as_known(), Some(svgtypes::ElementId::Circle));

    let text = format!("{:?}", root);
    assert!(text.contains("Known"));
}
