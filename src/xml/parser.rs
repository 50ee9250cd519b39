// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A streaming, recursive-descent XML parser: tokenizes a source buffer into
//! an [`XMLDocument`], resolving entities (built-in, numeric, and
//! DOCTYPE-declared) within configurable depth/substitution limits, and
//! recording a source span for every node and attribute.

use crate::error::{Error, Result};
use crate::file_offset::{FileOffset, FileOffsetRange, LineOffsets};
use crate::rcstring::RcString;
use crate::xml::components::{EntityDeclaration, EntityDeclarationsContext, NodeKind};
use crate::xml::document::XMLDocument;
use crate::xml::node::XMLNode;
use crate::xml::qualified_name::{XMLQualifiedName, XMLQualifiedNameRef};

/// Options controlling which constructs [`XMLParser`] emits as nodes and how
/// aggressively it bounds entity expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XMLParserOptions {
    /// Emit `Comment` nodes for `<!-- ... -->`.
    pub parse_comments: bool,
    /// Emit a `DocType` node for `<!DOCTYPE ...>`. The internal subset is
    /// always scanned for entity declarations regardless of this flag, since
    /// later entity references need to resolve against it.
    pub parse_doctype: bool,
    /// Emit `ProcessingInstruction` nodes for `<?target body?>` (the `<?xml
    /// ...?>` declaration itself is always emitted as `XMLDeclaration`,
    /// independent of this option).
    pub parse_processing_instructions: bool,
    /// Allow non-external `<!ENTITY name "value">` declarations to actually
    /// be used when expanding a `&name;` reference. When `false`, such a
    /// reference is a fatal error; external (`SYSTEM`/`PUBLIC`) entities are
    /// always left as a literal reference regardless of this flag, since
    /// they're never fetched either way.
    pub parse_custom_entities: bool,
    /// Pass every `&...;` reference through completely unexpanded.
    pub disable_entity_translation: bool,
    /// Nested entity-expansion depth cap. A reference whose expansion would
    /// exceed this depth is left unexpanded rather than recursed into.
    pub max_entity_depth: u32,
    /// Total entity-substitution cap across the whole parse. Exceeding it
    /// aborts the parse with [`Error::EntitySubstitutionsExceeded`].
    pub max_entity_substitutions: u64,
}

impl Default for XMLParserOptions {
    fn default() -> Self {
        XMLParserOptions {
            parse_comments: false,
            parse_doctype: true,
            parse_processing_instructions: false,
            parse_custom_entities: false,
            disable_entity_translation: false,
            max_entity_depth: 10,
            max_entity_substitutions: 50_000,
        }
    }
}

/// Any single expanded value (one attribute, or one text run) is capped at
/// this many output bytes; further entity references within it are left
/// unexpanded once it's reached. This is what actually bounds a
/// "billion laughs" style document, since the nested-depth cap alone allows
/// a geometric blow-up within a handful of levels.
const MAX_VALUE_EXPANSION_BYTES: usize = 64 * 1024;

const fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

const fn is_name_start_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

const fn is_name_char_byte(b: u8) -> bool {
    is_name_start_byte(b) || b.is_ascii_digit() || b == b'-' || b == b'.'
}

const fn build_table(pred: fn(u8) -> bool) -> [bool; 256] {
    // Function-pointer calls are allowed in `const fn` bodies; each table is
    // still computed once, at compile time.
    let mut table = [false; 256];
    let mut i = 0usize;
    while i < 256 {
        table[i] = pred(i as u8);
        i += 1;
    }
    table
}

static WHITESPACE_TABLE: [bool; 256] = build_table(is_whitespace_byte);
static NAME_START_TABLE: [bool; 256] = build_table(is_name_start_byte);
static NAME_CHAR_TABLE: [bool; 256] = build_table(is_name_char_byte);

fn is_ws(b: u8) -> bool {
    WHITESPACE_TABLE[b as usize]
}
fn is_name_start(b: u8) -> bool {
    NAME_START_TABLE[b as usize]
}
fn is_name_char(b: u8) -> bool {
    NAME_CHAR_TABLE[b as usize]
}

fn builtin_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => None,
    }
}

fn parse_numeric_char_ref(body: &str) -> Option<u32> {
    if let Some(hex) = body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        body.parse::<u32>().ok()
    }
}

fn is_disallowed_codepoint(code: u32) -> bool {
    (0xD800..=0xDFFF).contains(&code) || code > 0x10FFFF || code == 0xFFFE || code == 0xFFFF
}

/// How to locate entity references found while expanding a value, for
/// diagnostics. Top-level values expand against real source offsets;
/// replacement text recursed into from a DOCTYPE declaration has none, so
/// every reference within it is blamed on the outer reference's location.
#[derive(Clone, Copy)]
enum ExpansionBase {
    Tracked(u64),
    Approximate(FileOffset),
}

struct Engine<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line_offsets: LineOffsets,
    options: &'a XMLParserOptions,
    doc: XMLDocument,
    substitutions: u64,
}

impl<'a> Engine<'a> {
    fn new(source: &'a str, options: &'a XMLParserOptions) -> Self {
        Engine {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line_offsets: LineOffsets::new(source),
            options,
            doc: XMLDocument::new(),
            substitutions: 0,
        }
    }

    fn offset_at(&self, pos: u64) -> FileOffset {
        FileOffset::offset(pos).with_line_info(&self.line_offsets)
    }

    fn cur(&self) -> FileOffset {
        self.offset_at(self.pos as u64)
    }

    fn span(&self, start: usize, end: usize) -> FileOffsetRange {
        FileOffsetRange { start: self.offset_at(start as u64), end: self.offset_at(end as u64) }
    }

    fn syntax_err(&self, message: impl Into<String>) -> Error {
        Error::Syntax { message: message.into(), offset: self.cur() }
    }

    fn syntax_err_at(&self, pos: usize, message: impl Into<String>) -> Error {
        Error::Syntax { message: message.into(), offset: self.offset_at(pos as u64) }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn remaining(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn find(&self, needle: &str) -> Option<usize> {
        self.remaining().find(needle).map(|p| self.pos + p)
    }

    fn skip_ws(&mut self) {
        while self.peek_byte().map(is_ws).unwrap_or(false) {
            self.pos += 1;
        }
    }

    fn consume_bom(&mut self) {
        const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
        if self.bytes.starts_with(BOM) {
            self.pos = 3;
        }
    }

    fn run(mut self) -> Result<XMLDocument> {
        self.consume_bom();
        let root = self.doc.root();
        loop {
            self.skip_ws();
            if self.pos >= self.bytes.len() {
                break;
            }
            if self.peek_byte() != Some(b'<') {
                return Err(self.syntax_err("expected '<' to start a node"));
            }
            if let Some(node) = self.parse_node()? {
                root.append_child(&node);
            }
        }
        if root.first_child().is_none() {
            return Err(Error::EmptyDocument);
        }
        Ok(self.doc)
    }

    // -- dispatch ---------------------------------------------------------

    fn parse_node(&mut self) -> Result<Option<XMLNode>> {
        match self.bytes.get(self.pos + 1) {
            Some(b'?') => self.parse_pi_or_decl(),
            Some(b'!') => self.parse_bang_node(),
            _ => self.parse_element().map(Some),
        }
    }

    fn parse_bang_node(&mut self) -> Result<Option<XMLNode>> {
        if self.remaining().starts_with("<!--") {
            self.parse_comment()
        } else if self.remaining().starts_with("<![CDATA[") {
            self.parse_cdata()
        } else if self.remaining().starts_with("<!DOCTYPE") {
            self.parse_doctype()
        } else {
            Err(self.syntax_err("unknown '<!' construct"))
        }
    }

    // -- leaf nodes ---------------------------------------------------------

    fn parse_pi_or_decl(&mut self) -> Result<Option<XMLNode>> {
        let start = self.pos;
        self.pos += 2; // "<?"
        let target = self.parse_name()?;
        let is_decl = !target.has_prefix() && target.local.equals_ignore_case("xml");
        self.skip_ws();
        let body_start = self.pos;
        let body_end = self.find("?>").ok_or_else(|| self.syntax_err_at(start, "unterminated processing instruction"))?;
        let body = &self.source[body_start..body_end];
        self.pos = body_end + 2;
        let end = self.pos;

        if is_decl {
            let node = self.doc.create_node(NodeKind::XMLDeclaration);
            self.parse_pseudo_attributes(&node, body, body_start)?;
            node.set_span(self.span(start, end));
            return Ok(Some(node));
        }

        if !self.options.parse_processing_instructions {
            return Ok(None);
        }
        let node = self.doc.create_node(NodeKind::ProcessingInstruction);
        node.set_name(target);
        node.init_value(body.trim());
        node.set_span(self.span(start, end));
        Ok(Some(node))
    }

    fn parse_pseudo_attributes(&self, node: &XMLNode, body: &str, body_start: usize) -> Result<()> {
        let bytes = body.as_bytes();
        let mut i = 0usize;
        loop {
            while i < bytes.len() && is_ws(bytes[i]) {
                i += 1;
            }
            if i >= bytes.len() {
                return Ok(());
            }
            let name_start = i;
            while i < bytes.len() && bytes[i] != b'=' && !is_ws(bytes[i]) {
                i += 1;
            }
            let name = &body[name_start..i];
            while i < bytes.len() && is_ws(bytes[i]) {
                i += 1;
            }
            if bytes.get(i) != Some(&b'=') {
                return Err(self.syntax_err_at(body_start + name_start, "expected '=' in XML declaration"));
            }
            i += 1;
            while i < bytes.len() && is_ws(bytes[i]) {
                i += 1;
            }
            let quote = *bytes
                .get(i)
                .ok_or_else(|| self.syntax_err_at(body_start + i, "expected a quoted value in XML declaration"))?;
            if quote != b'"' && quote != b'\'' {
                return Err(self.syntax_err_at(body_start + i, "expected a quoted value in XML declaration"));
            }
            i += 1;
            let value_start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(self.syntax_err_at(body_start + value_start, "unterminated value in XML declaration"));
            }
            let value = &body[value_start..i];
            let value_end = i;
            i += 1;

            node.set_attribute_with_span(
                XMLQualifiedName::local(name),
                value,
                Some(self.span(body_start + name_start, body_start + i)),
                Some(self.span(body_start + value_start, body_start + value_end)),
            );
        }
    }

    fn parse_comment(&mut self) -> Result<Option<XMLNode>> {
        let start = self.pos;
        self.pos += 4; // "<!--"
        let body_start = self.pos;
        let body_end =
            self.find("--").ok_or_else(|| self.syntax_err_at(start, "unterminated comment"))?;
        if self.bytes.get(body_end + 2) != Some(&b'>') {
            return Err(self.syntax_err_at(body_end, "'--' is not allowed inside a comment"));
        }
        let body = &self.source[body_start..body_end];
        self.pos = body_end + 3;
        let end = self.pos;

        if !self.options.parse_comments {
            return Ok(None);
        }
        let node = self.doc.create_node(NodeKind::Comment);
        node.init_value(body);
        node.set_span(self.span(start, end));
        Ok(Some(node))
    }

    fn parse_cdata(&mut self) -> Result<Option<XMLNode>> {
        let start = self.pos;
        self.pos += 9; // "<![CDATA["
        let body_start = self.pos;
        let body_end =
            self.find("]]>").ok_or_else(|| self.syntax_err_at(start, "unterminated CDATA section"))?;
        let body = &self.source[body_start..body_end];
        self.pos = body_end + 3;
        let end = self.pos;

        let node = self.doc.create_node(NodeKind::CData);
        node.init_value(body);
        node.set_span(self.span(start, end));
        Ok(Some(node))
    }

    fn parse_doctype(&mut self) -> Result<Option<XMLNode>> {
        let start = self.pos;
        self.pos += 9; // "<!DOCTYPE"
        self.skip_ws();
        let _root_name = self.parse_bare_name()?;
        self.skip_ws();
        while let Some(b) = self.peek_byte() {
            if b == b'[' || b == b'>' {
                break;
            }
            self.pos += 1;
        }
        if self.peek_byte() == Some(b'[') {
            self.pos += 1;
            self.parse_internal_subset()?;
            self.skip_ws();
        }
        if self.peek_byte() != Some(b'>') {
            return Err(self.syntax_err_at(start, "expected '>' to close DOCTYPE declaration"));
        }
        let value_end = self.pos;
        self.pos += 1;
        let end = self.pos;

        if !self.options.parse_doctype {
            return Ok(None);
        }
        let value = self.source[start + 9..value_end].trim();
        let node = self.doc.create_node(NodeKind::DocType);
        node.init_value(value);
        node.set_span(self.span(start, end));
        Ok(Some(node))
    }

    fn parse_internal_subset(&mut self) -> Result<()> {
        loop {
            self.skip_ws();
            match self.peek_byte() {
                None => return Err(self.syntax_err("unterminated DOCTYPE internal subset")),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'%') => {
                    let end = self
                        .find(";")
                        .ok_or_else(|| self.syntax_err("unterminated parameter-entity reference"))?;
                    self.pos = end + 1;
                }
                Some(b'<') if self.remaining().starts_with("<!ENTITY") => self.parse_entity_decl()?,
                Some(b'<') if self.remaining().starts_with("<!--") => {
                    self.parse_comment()?;
                }
                Some(b'<') => {
                    let decl_start = self.pos;
                    let end = self
                        .find(">")
                        .ok_or_else(|| self.syntax_err_at(decl_start, "unterminated markup declaration"))?;
                    self.pos = end + 1;
                }
                Some(_) => return Err(self.syntax_err("unexpected token in DOCTYPE internal subset")),
            }
        }
    }

    fn parse_entity_decl(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 8; // "<!ENTITY"
        self.skip_ws();
        let is_parameter = self.peek_byte() == Some(b'%');
        if is_parameter {
            self.pos += 1;
            self.skip_ws();
        }
        let name = self.parse_bare_name()?;
        self.skip_ws();

        let (replacement_text, is_external) = if self.remaining().starts_with("SYSTEM")
            || self.remaining().starts_with("PUBLIC")
        {
            self.pos += 6; // both keywords are 6 bytes
            self.skip_ws();
            let _first_literal = self.parse_quoted_literal()?;
            self.skip_ws();
            if matches!(self.peek_byte(), Some(b'"') | Some(b'\'')) {
                let _second_literal = self.parse_quoted_literal()?;
            }
            (RcString::new(), true)
        } else {
            let literal = self.parse_quoted_literal()?;
            (RcString::from(literal.as_str()), false)
        };

        self.skip_ws();
        if self.peek_byte() != Some(b'>') {
            return Err(self.syntax_err_at(start, "expected '>' to close entity declaration"));
        }
        self.pos += 1;

        let decl = EntityDeclaration { replacement_text, is_external };
        let registry = self.doc.registry();
        let mut registry = registry.borrow_mut();
        let ctx = registry.ctx_mut::<EntityDeclarationsContext>();
        if is_parameter {
            ctx.parameter.insert(name, decl);
        } else {
            ctx.general.insert(name, decl);
        }
        Ok(())
    }

    fn parse_quoted_literal(&mut self) -> Result<String> {
        let quote = match self.peek_byte() {
            Some(b @ (b'"' | b'\'')) => b,
            _ => return Err(self.syntax_err("expected a quoted literal")),
        };
        self.pos += 1;
        let start = self.pos;
        let end = self.bytes[self.pos..]
            .iter()
            .position(|&b| b == quote)
            .map(|p| self.pos + p)
            .ok_or_else(|| self.syntax_err_at(start, "unterminated quoted literal"))?;
        let text = self.source[start..end].to_string();
        self.pos = end + 1;
        Ok(text)
    }

    // -- elements -----------------------------------------------------------

    fn parse_element(&mut self) -> Result<XMLNode> {
        let start = self.pos;
        self.pos += 1; // '<'
        let name = self.parse_name()?;
        let node = self.doc.create_node(NodeKind::Element);
        node.set_name(name.clone());

        loop {
            self.skip_ws();
            match self.peek_byte() {
                Some(b'/') => {
                    self.pos += 1;
                    if self.peek_byte() != Some(b'>') {
                        return Err(self.syntax_err("expected '>' after '/'"));
                    }
                    self.pos += 1;
                    node.set_span(self.span(start, self.pos));
                    return Ok(node);
                }
                Some(b'>') => {
                    self.pos += 1;
                    self.parse_children(&node, &name, start)?;
                    return Ok(node);
                }
                Some(_) => self.parse_attribute(&node)?,
                None => return Err(self.syntax_err("unexpected end of input inside a start tag")),
            }
        }
    }

    fn parse_attribute(&mut self, node: &XMLNode) -> Result<()> {
        let attr_start = self.pos;
        let name = self.parse_name()?;
        self.skip_ws();
        if self.peek_byte() != Some(b'=') {
            return Err(self.syntax_err("expected '=' after attribute name"));
        }
        self.pos += 1;
        self.skip_ws();
        let quote = match self.peek_byte() {
            Some(b @ (b'"' | b'\'')) => b,
            _ => return Err(self.syntax_err("expected a quoted attribute value")),
        };
        self.pos += 1;
        let value_start = self.pos;

        let mut p = value_start;
        loop {
            match self.bytes.get(p) {
                None => return Err(self.syntax_err_at(value_start, "unterminated attribute value")),
                Some(&b) if b == quote => break,
                Some(&b'<') => return Err(self.syntax_err_at(p, "'<' is not allowed in an attribute value")),
                Some(&0) => {
                    return Err(self.syntax_err_at(p, "embedded NUL byte is not allowed in an attribute value"))
                }
                Some(_) => p += 1,
            }
        }
        let value_end = p;
        let raw = &self.source[value_start..value_end];
        self.pos = value_end + 1;
        let attr_end = self.pos;

        let expanded = self.expand_value(raw, value_start as u64)?;

        node.set_attribute_with_span(
            name,
            expanded,
            Some(self.span(attr_start, attr_end)),
            Some(self.span(value_start, value_end)),
        );
        Ok(())
    }

    fn parse_children(&mut self, element: &XMLNode, name: &XMLQualifiedName, element_start: usize) -> Result<()> {
        loop {
            if self.remaining().starts_with("</") {
                let closing_start = self.pos;
                self.pos += 2;
                let closing_name = self.parse_name()?;
                self.skip_ws();
                if self.peek_byte() != Some(b'>') {
                    return Err(self.syntax_err("expected '>' to close an end tag"));
                }
                self.pos += 1;
                if &closing_name != name {
                    return Err(self.syntax_err_at(
                        closing_start,
                        format!("mismatched closing tag: expected '</{}>', found '</{}>'", name, closing_name),
                    ));
                }
                element.set_span(self.span(element_start, self.pos));
                return Ok(());
            }
            if self.pos >= self.bytes.len() {
                return Err(
                    self.syntax_err_at(element_start, format!("unexpected end of input: unclosed element '<{}>'", name))
                );
            }
            if self.peek_byte() == Some(b'<') {
                if let Some(child) = self.parse_node()? {
                    element.append_child(&child);
                }
                continue;
            }
            self.parse_text(element)?;
        }
    }

    fn parse_text(&mut self, parent: &XMLNode) -> Result<()> {
        let start = self.pos;
        loop {
            match self.peek_byte() {
                None | Some(b'<') => break,
                Some(0) => return Err(self.syntax_err("embedded NUL byte is not allowed in element content")),
                Some(_) => self.pos += 1,
            }
        }
        let end = self.pos;
        if end == start {
            return Ok(());
        }
        let raw = &self.source[start..end];
        let expanded = self.expand_value(raw, start as u64)?;
        let node = self.doc.create_node(NodeKind::Data);
        node.init_value(expanded);
        node.set_span(self.span(start, end));
        parent.append_child(&node);
        Ok(())
    }

    // -- names ----------------------------------------------------------------

    fn parse_bare_name(&mut self) -> Result<String> {
        let start = self.pos;
        if !self.peek_byte().map(is_name_start).unwrap_or(false) {
            return Err(self.syntax_err_at(start, "expected a name"));
        }
        self.pos += 1;
        while self.peek_byte().map(is_name_char).unwrap_or(false) {
            self.pos += 1;
        }
        Ok(self.source[start..self.pos].to_string())
    }

    fn parse_name(&mut self) -> Result<XMLQualifiedName> {
        let first = self.parse_bare_name()?;
        if self.peek_byte() != Some(b':') {
            return Ok(XMLQualifiedName::local(first));
        }
        let colon_pos = self.pos;
        self.pos += 1;
        if !self.peek_byte().map(is_name_start).unwrap_or(false) {
            return Err(self.syntax_err_at(colon_pos, "expected a local name after ':'"));
        }
        let local = self.parse_bare_name()?;
        Ok(XMLQualifiedName::with_prefix(first, local))
    }

    // -- entity expansion -------------------------------------------------

    fn expand_value(&mut self, raw: &str, start_byte: u64) -> Result<RcString> {
        if self.options.disable_entity_translation {
            return Ok(RcString::from(raw));
        }
        let mut output = String::with_capacity(raw.len());
        self.expand_into(raw, 0, &mut output, ExpansionBase::Tracked(start_byte))?;
        Ok(RcString::from(output))
    }

    fn expand_into(&mut self, raw: &str, depth: u32, output: &mut String, base: ExpansionBase) -> Result<()> {
        let bytes = raw.as_bytes();
        let mut i = 0usize;
        while i < bytes.len() {
            if bytes[i] != b'&' {
                let start = i;
                while i < bytes.len() && bytes[i] != b'&' {
                    i += 1;
                }
                output.push_str(&raw[start..i]);
                continue;
            }

            let ref_start = i;
            let semi = raw[i..].find(';').map(|p| i + p);
            let offset = match base {
                ExpansionBase::Tracked(start_byte) => self.offset_at(start_byte + ref_start as u64),
                ExpansionBase::Approximate(offset) => offset,
            };
            let semi = semi.ok_or_else(|| Error::Entity {
                message: "unterminated entity reference".to_string(),
                offset,
            })?;
            let name = &raw[i + 1..semi];
            i = semi + 1;
            self.expand_entity_ref(name, depth, output, offset)?;
        }
        Ok(())
    }

    fn expand_entity_ref(&mut self, name: &str, depth: u32, output: &mut String, offset: FileOffset) -> Result<()> {
        if output.len() >= MAX_VALUE_EXPANSION_BYTES {
            output.push('&');
            output.push_str(name);
            output.push(';');
            return Ok(());
        }

        if let Some(digits) = name.strip_prefix('#') {
            let code = parse_numeric_char_ref(digits).ok_or_else(|| Error::Entity {
                message: format!("malformed numeric character reference '&{};'", name),
                offset,
            })?;
            if is_disallowed_codepoint(code) {
                return Err(Error::Entity {
                    message: format!("numeric character reference '&{};' refers to a disallowed code point", name),
                    offset,
                });
            }
            let ch = char::from_u32(code).ok_or_else(|| Error::Entity {
                message: format!("numeric character reference '&{};' is not a valid Unicode scalar value", name),
                offset,
            })?;
            self.count_substitution(offset)?;
            output.push(ch);
            return Ok(());
        }

        if let Some(ch) = builtin_entity(name) {
            self.count_substitution(offset)?;
            output.push(ch);
            return Ok(());
        }

        let declaration = {
            let registry = self.doc.registry();
            let registry = registry.borrow();
            registry.ctx::<EntityDeclarationsContext>().general.get(name).cloned()
        };

        match declaration {
            Some(decl) if decl.is_external => {
                output.push('&');
                output.push_str(name);
                output.push(';');
                Ok(())
            }
            Some(decl) => {
                if depth + 1 > self.options.max_entity_depth {
                    log::warn!("HIT_DEPTH_CAP: entity '&{};' left unexpanded at {}", name, offset);
                    output.push('&');
                    output.push_str(name);
                    output.push(';');
                    return Ok(());
                }
                if !self.options.parse_custom_entities {
                    return Err(Error::Entity {
                        message: format!(
                            "entity '&{};' is declared but custom-entity expansion is disabled",
                            name
                        ),
                        offset,
                    });
                }
                self.count_substitution(offset)?;
                self.expand_into(
                    decl.replacement_text.as_str(),
                    depth + 1,
                    output,
                    ExpansionBase::Approximate(offset),
                )
            }
            None => Err(Error::Entity { message: format!("unknown entity reference '&{};'", name), offset }),
        }
    }

    fn count_substitution(&mut self, offset: FileOffset) -> Result<()> {
        self.substitutions += 1;
        if self.substitutions > self.options.max_entity_substitutions {
            log::warn!("HIT_SUBS_CAP: entity substitution limit exceeded at {}", offset);
            return Err(Error::EntitySubstitutionsExceeded { offset });
        }
        Ok(())
    }
}

/// Parses XML source text into an [`XMLDocument`].
///
/// Stateless; exists to group the parsing entry point with its
/// attribute-location helper, mirroring the shape of the save pipeline's
/// facade types.
pub struct XMLParser;

impl XMLParser {
    /// Parse `source` according to `options`, returning the resulting
    /// document or the first fatal error encountered.
    pub fn parse(source: &str, options: &XMLParserOptions) -> Result<XMLDocument> {
        Engine::new(source, options).run()
    }

    /// Recover the source span of one attribute by re-tokenizing the start
    /// tag beginning at `element_start`, for attributes whose span wasn't
    /// retained (e.g. set programmatically after parsing).
    pub fn attribute_location(
        source: &str,
        element_start: FileOffset,
        name: XMLQualifiedNameRef<'_>,
    ) -> Option<FileOffsetRange> {
        let start = element_start.byte_offset? as usize;
        let owned = XMLQualifiedName::with_prefix(name.prefix, name.local);
        crate::xml::node::reparse_attribute_span(source, start, &owned)
    }
}
