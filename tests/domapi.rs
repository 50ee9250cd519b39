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
use svgxml::xml::{XMLDocument, XMLQualifiedName};

#[test]
fn create_node_starts_detached() {
    let doc = XMLDocument::new();
    let node = doc.create_node(NodeKind::Element);
    assert!(node.parent().is_none());
    assert!(node.first_child().is_none());
}

#[test]
fn tree_mutation_round_trip() {
    let doc = XMLDocument::new();
    let root = doc.root();
    let a = doc.create_node(NodeKind::Element);
    let b = doc.create_node(NodeKind::Element);
    let c = doc.create_node(NodeKind::Element);

    root.append_child(&a);
    root.append_child(&c);
    root.insert_before(&b, Some(&c));

    let order: Vec<_> = root.children().collect();
    assert_eq!(order, vec![a.clone(), b.clone(), c.clone()]);

    let d = doc.create_node(NodeKind::Element);
    root.replace_child(&b, &d);
    let order: Vec<_> = root.children().collect();
    assert_eq!(order, vec![a, d, c]);
}

#[test]
fn attribute_get_set_remove() {
    let doc = XMLDocument::new();
    let node = doc.create_node(NodeKind::Element);
    assert!(!node.has_attribute("id"));

    node.set_attribute("id", "rect1");
    assert_eq!(node.attribute("id").unwrap().as_str(), "rect1");

    node.set_attribute("id", "rect2");
    assert_eq!(node.attribute("id").unwrap().as_str(), "rect2");

    node.remove_attribute("id");
    assert!(!node.has_attribute("id"));
}

#[test]
fn qualified_name_round_trips_through_parse() {
    let prefixed = XMLQualifiedName::parse("xlink:href");
    assert_eq!(prefixed.prefix.as_str(), "xlink");
    assert_eq!(prefixed.local.as_str(), "href");
    assert_eq!(prefixed.to_string(), "xlink:href");

    let bare = XMLQualifiedName::parse("width");
    assert!(bare.prefix.is_empty());
    assert_eq!(bare.local.as_str(), "width");
}

#[test]
fn namespace_resolution_walks_ancestors() {
    let doc = XMLDocument::new();
    let root = doc.root();
    let svg = doc.create_node(NodeKind::Element);
    root.append_child(&svg);
    svg.set_attribute("xmlns", "http://www.w3.org/2000/svg");
    svg.set_attribute("xmlns:xlink", "http://www.w3.org/1999/xlink");

    let rect = doc.create_node(NodeKind::Element);
    svg.append_child(&rect);

    assert_eq!(rect.namespace_uri("").unwrap().as_str(), "http://www.w3.org/2000/svg");
    assert_eq!(rect.namespace_uri("xlink").unwrap().as_str(), "http://www.w3.org/1999/xlink");
    assert!(rect.namespace_uri("nonexistent").is_none());
}
