// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Synthesizes anchored replacements for DOM nodes that have no recorded
//! source span, by serializing the node locally and anchoring the insertion
//! to a neighbor whose span is known.

use crate::file_offset::{FileOffset, FileOffsetRange};
use crate::rcstring::RcString;
use crate::xml::components::NodeKind;
use crate::xml::node::XMLNode;
use crate::xml::source_document::Replacement;

/// Builds localized, anchored replacements for span-less nodes.
pub struct LocalizedEditBuilder {
    source: String,
    indent_unit: String,
}

impl LocalizedEditBuilder {
    /// Construct a builder bound to `source`, indenting each nested level
    /// of synthesized markup by `indent_unit` (e.g. two spaces).
    pub fn new(source: impl Into<String>, indent_unit: impl Into<String>) -> Self {
        LocalizedEditBuilder { source: source.into(), indent_unit: indent_unit.into() }
    }

    /// Serialize `node` and insert it immediately before `sibling`'s
    /// recorded start. Returns `None` if `sibling` has no known location.
    pub fn insert_before_sibling(&self, node: &XMLNode, sibling: &XMLNode) -> Option<Replacement> {
        let anchor = sibling.node_location()?.start.byte_offset? as usize;
        let indent = self.infer_indentation(anchor);
        let mut serialized = self.serialize_node(node, &indent);

        if self.is_line_break_before(anchor) {
            if let Some(stripped) = serialized.strip_prefix(indent.as_str()) {
                serialized = stripped.to_string();
            }
            serialized.push('\n');
            serialized.push_str(&indent);
        }

        Some(Replacement {
            range: FileOffsetRange { start: FileOffset::offset(anchor as u64), end: FileOffset::offset(anchor as u64) },
            replacement: RcString::from(serialized.as_str()),
        })
    }

    /// Serialize `node` and append it as the last child of `parent`,
    /// anchored just before `parent`'s closing tag (or `/>` for a
    /// self-closing element). Returns `None` if no such anchor can be
    /// located.
    pub fn append_child(&self, node: &XMLNode, parent: &XMLNode) -> Option<Replacement> {
        let anchor = self.closing_tag_start(parent)?.byte_offset? as usize;
        let indent = self.infer_indentation(anchor);
        let mut serialized = self.serialize_node(node, &indent);

        if !serialized.is_empty() && !serialized.ends_with('\n') {
            serialized.push('\n');
        }
        serialized.push_str(&indent);

        Some(Replacement {
            range: FileOffsetRange { start: FileOffset::offset(anchor as u64), end: FileOffset::offset(anchor as u64) },
            replacement: RcString::from(serialized.as_str()),
        })
    }

    /// Replace `node`'s full recorded span with the empty string. Returns
    /// `None` if `node` has no recorded span.
    pub fn remove_node(&self, node: &XMLNode) -> Option<Replacement> {
        let range = node.node_location()?;
        Some(Replacement { range, replacement: RcString::new() })
    }

    fn infer_indentation(&self, anchor: usize) -> String {
        if self.source.is_empty() {
            return String::new();
        }
        let capped = anchor.min(self.source.len() - 1);
        let bytes = self.source.as_bytes();
        let indent_start = bytes[..=capped].iter().rposition(|&b| b == b'\n').map(|p| p + 1).unwrap_or(0);
        let mut indent_end = indent_start;
        while indent_end < anchor && (bytes[indent_end] == b' ' || bytes[indent_end] == b'\t') {
            indent_end += 1;
        }
        self.source[indent_start..indent_end].to_string()
    }

    fn is_line_break_before(&self, anchor: usize) -> bool {
        if self.source.is_empty() {
            return false;
        }
        let bytes = self.source.as_bytes();
        let mut scan = anchor;
        while scan > 0 && (bytes[scan - 1] == b' ' || bytes[scan - 1] == b'\t') {
            scan -= 1;
        }
        scan > 0 && bytes[scan - 1] == b'\n'
    }

    fn closing_tag_start(&self, node: &XMLNode) -> Option<FileOffset> {
        let range = node.node_location()?;
        let start = range.start.byte_offset? as usize;
        let end = range.end.byte_offset? as usize;
        if start >= self.source.len() || end > self.source.len() || start >= end {
            return None;
        }
        let window = &self.source[start..end];
        if let Some(pos) = window.rfind("</") {
            return Some(FileOffset::offset((start + pos) as u64));
        }
        if let Some(pos) = window.rfind("/>") {
            return Some(FileOffset::offset((start + pos) as u64));
        }
        None
    }

    fn serialize_attributes(&self, node: &XMLNode) -> String {
        let mut serialized = String::new();
        for entry in node.attributes() {
            serialized.push(' ');
            serialized.push_str(&entry.name.to_string());
            serialized.push_str("=\"");
            serialized.push_str(entry.value.as_str());
            serialized.push('"');
        }
        serialized
    }

    fn serialize_node(&self, node: &XMLNode, indent: &str) -> String {
        let attrs = self.serialize_attributes(node);
        match node.kind() {
            NodeKind::Document => String::new(),
            NodeKind::Data => format!("{}{}", indent, node.value().as_str()),
            NodeKind::CData => format!("{}<![CDATA[{}]]>", indent, node.value().as_str()),
            NodeKind::Comment => format!("{}<!--{}-->", indent, node.value().as_str()),
            NodeKind::DocType => format!("{}<!DOCTYPE {}>", indent, node.value().as_str()),
            NodeKind::ProcessingInstruction | NodeKind::XMLDeclaration => {
                let target = node.tag_name().map(|n| n.to_string()).unwrap_or_default();
                let value = node.value();
                if value.is_empty() {
                    format!("{}<?{}?>", indent, target)
                } else {
                    format!("{}<?{} {}?>", indent, target, value.as_str())
                }
            }
            NodeKind::Element => {
                let tag = node.tag_name().map(|n| n.to_string()).unwrap_or_default();
                let value = node.value();
                let has_children = node.first_child().is_some();

                let mut buffer = String::with_capacity(indent.len() + tag.len() + attrs.len() + 4);
                buffer.push_str(indent);
                buffer.push('<');
                buffer.push_str(&tag);
                buffer.push_str(&attrs);

                if value.is_empty() && !has_children {
                    buffer.push_str("/>");
                    return buffer;
                }

                buffer.push('>');
                buffer.push_str(value.as_str());

                if has_children {
                    buffer.push('\n');
                    let child_indent = format!("{}{}", indent, self.indent_unit);
                    for child in node.children() {
                        buffer.push_str(&self.serialize_node(&child, &child_indent));
                        buffer.push('\n');
                    }
                    buffer.push_str(indent);
                }

                buffer.push_str("</");
                buffer.push_str(&tag);
                buffer.push('>');
                buffer
            }
        }
    }
}
