// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate pretty_assertions;

use svgxml::xml::{
    save_document, LocalizedEditBuilder, ReplaceSpan, SaveOptions, SourceDocument, XMLParser,
    XMLParserOptions,
};

#[test]
fn removing_a_node_preserves_surrounding_formatting() {
    let source_text = "<svg>\n  <rect id=\"a\"/>\n  <rect id=\"b\"/>\n</svg>";
    let doc = XMLParser::parse(source_text, &XMLParserOptions::default()).unwrap();
    let svg = doc.root().first_child().unwrap();
    let a = svg.first_child().unwrap();

    let node_span = a.node_location().unwrap();
    let source = SourceDocument::new(source_text);
    let replacement = svgxml::xml::Replacement {
        range: node_span,
        replacement: "".into(),
    };
    let result = save_document(
        &source,
        vec![ReplaceSpan { replacement, fallback: None }],
        &SaveOptions::default(),
    )
    .unwrap();

    assert!(result.updated_text.as_str().contains("id=\"b\""));
    assert!(!result.updated_text.as_str().contains("id=\"a\""));
    assert!(!result.diagnostics.used_fallback);
}

#[test]
fn localized_edit_builder_synthesizes_an_append() {
    let source_text = "<svg>\n  <rect id=\"a\"/>\n</svg>";
    let doc = XMLParser::parse(source_text, &XMLParserOptions::default()).unwrap();
    let svg = doc.root().first_child().unwrap();

    // A freshly parsed, fully-named element from an unrelated document
    // stands in for a node synthesized programmatically: the builder only
    // reads its tag name/attributes, so it doesn't need to share a registry
    // with `svg`.
    let fragment = XMLParser::parse("<circle r=\"5\"/>", &XMLParserOptions::default()).unwrap();
    let new_node = fragment.root().first_child().unwrap();

    let builder = LocalizedEditBuilder::new(source_text, "  ");
    let replacement = builder.append_child(&new_node, &svg).unwrap();
    assert!(replacement.replacement.as_str().contains("<circle r=\"5\"/>"));
}
