// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate pretty_assertions;

use svgxml::xml::components::NodeKind;
use svgxml::xml::{XMLParser, XMLParserOptions};

#[test]
fn elements_value_is_their_first_data_child() {
    let doc = XMLParser::parse("<svg><text>hello</text></svg>", &XMLParserOptions::default()).unwrap();
    let text_el = doc.root().first_child().unwrap().first_child().unwrap();
    assert_eq!(text_el.kind(), NodeKind::Element);
    assert_eq!(text_el.value().as_str(), "hello");
}

#[test]
fn elements_without_a_data_child_have_empty_value() {
    let doc = XMLParser::parse("<svg><rect/></svg>", &XMLParserOptions::default()).unwrap();
    let rect = doc.root().first_child().unwrap().first_child().unwrap();
    assert!(rect.value().is_empty());
}

#[test]
fn cdata_sections_are_preserved_verbatim() {
    let doc = XMLParser::parse(
        "<svg><style><![CDATA[.a { fill: red; }]]></style></svg>",
        &XMLParserOptions::default(),
    )
    .unwrap();
    let style = doc.root().first_child().unwrap().first_child().unwrap();
    let cdata = style.first_child().unwrap();
    assert_eq!(cdata.kind(), NodeKind::CData);
    assert_eq!(cdata.value().as_str(), ".a { fill: red; }");
}

#[test]
fn set_value_overwrites_text_node() {
    let doc = XMLParser::parse("<svg><text>a</text></svg>", &XMLParserOptions::default()).unwrap();
    let data = doc
        .root()
        .first_child()
        .unwrap()
        .first_child()
        .unwrap()
        .first_child()
        .unwrap();
    assert_eq!(data.kind(), NodeKind::Data);
    data.set_value("b");
    assert_eq!(data.value().as_str(), "b");
}
