// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate pretty_assertions;

use svgxml::error::Error;
use svgxml::xml::components::NodeKind;
use svgxml::xml::{XMLParser, XMLParserOptions};

fn parse(source: &str) -> svgxml::xml::XMLDocument {
    XMLParser::parse(source, &XMLParserOptions::default()).unwrap()
}

/// The document's first `Element` child, skipping any leading `DocType`
/// node (parsed by default alongside the rest of the tree).
fn first_element(doc: &svgxml::xml::XMLDocument) -> svgxml::xml::XMLNode {
    doc.root().children().find(|n| n.kind() == NodeKind::Element).unwrap()
}

#[test]
fn parses_nested_elements_and_attributes() {
    let doc = parse("<svg width='100' height='100'><rect x='1' y='2'/></svg>");
    let svg = doc.root().first_child().unwrap();
    assert_eq!(svg.tag_name().unwrap().local.as_str(), "svg");
    assert_eq!(svg.attribute("width").unwrap().as_str(), "100");

    let rect = svg.first_child().unwrap();
    assert_eq!(rect.tag_name().unwrap().local.as_str(), "rect");
    assert_eq!(rect.attribute("x").unwrap().as_str(), "1");
}

#[test]
fn built_in_entities_expand() {
    let doc = parse("<svg><text>a &amp; b &lt; c</text></svg>");
    let text = doc.root().first_child().unwrap().first_child().unwrap().first_child().unwrap();
    assert_eq!(text.kind(), NodeKind::Data);
    assert_eq!(text.value().as_str(), "a & b < c");
}

#[test]
fn custom_entities_require_opt_in() {
    let source = "<!DOCTYPE svg [<!ENTITY foo 'bar'>]><svg><text>&foo;</text></svg>";

    let disabled = XMLParser::parse(source, &XMLParserOptions::default());
    assert!(disabled.is_err());

    let options = XMLParserOptions { parse_custom_entities: true, ..XMLParserOptions::default() };
    let doc = XMLParser::parse(source, &options).unwrap();
    let text = first_element(&doc).first_child().unwrap().first_child().unwrap();
    assert_eq!(text.value().as_str(), "bar");
}

#[test]
fn substitution_cap_is_fatal() {
    let mut decls = String::from("<!DOCTYPE svg [");
    decls.push_str("<!ENTITY a 'x'>");
    decls.push_str("<!ENTITY b '&a;&a;&a;&a;&a;&a;&a;&a;&a;&a;'>");
    decls.push_str("]>");
    let source = format!("{}<svg><text>&b;&b;&b;&b;&b;&b;&b;&b;&b;&b;</text></svg>", decls);

    let options = XMLParserOptions {
        parse_custom_entities: true,
        max_entity_substitutions: 20,
        ..XMLParserOptions::default()
    };
    let result = XMLParser::parse(&source, &options);
    assert!(matches!(result.unwrap_err(), Error::EntitySubstitutionsExceeded { .. }));
}

#[test]
fn node_spans_are_recorded() {
    let doc = parse("<svg><rect/></svg>");
    let svg = doc.root().first_child().unwrap();
    let span = svg.node_location().unwrap();
    assert_eq!(span.start.byte_offset, Some(0));
}

#[test]
fn comments_are_opt_in_by_default() {
    let default_doc = parse("<svg><!-- hi --><rect/></svg>");
    let svg = default_doc.root().first_child().unwrap();
    assert_eq!(svg.first_child().unwrap().kind(), NodeKind::Element);

    let options = XMLParserOptions { parse_comments: true, ..XMLParserOptions::default() };
    let doc = XMLParser::parse("<svg><!-- hi --><rect/></svg>", &options).unwrap();
    let svg = doc.root().first_child().unwrap();
    assert_eq!(svg.first_child().unwrap().kind(), NodeKind::Comment);
}
