// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Qualified XML names: `(namespace_prefix, local_name)` pairs.

use std::fmt;

use crate::rcstring::RcString;

/// A qualified name: an optional namespace prefix plus a local name.
///
/// An empty prefix (`""`) means the default namespace (no explicit prefix
/// on the element/attribute itself).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct XMLQualifiedName {
    /// Namespace prefix, or the empty string for the default namespace.
    pub prefix: RcString,
    /// Local (unprefixed) name.
    pub local: RcString,
}

impl XMLQualifiedName {
    /// Construct a qualified name with no prefix.
    pub fn local(local: impl Into<RcString>) -> Self {
        XMLQualifiedName { prefix: RcString::new(), local: local.into() }
    }

    /// Construct a qualified name with an explicit prefix.
    pub fn with_prefix(prefix: impl Into<RcString>, local: impl Into<RcString>) -> Self {
        XMLQualifiedName { prefix: prefix.into(), local: local.into() }
    }

    /// Parse a `prefix:local` or bare `local` string into a qualified name.
    ///
    /// The first `:` splits prefix from local name; a name with no `:` has
    /// an empty prefix.
    pub fn parse(qname: &str) -> Self {
        match qname.find(':') {
            Some(idx) => XMLQualifiedName::with_prefix(&qname[..idx], &qname[idx + 1..]),
            None => XMLQualifiedName::local(qname),
        }
    }

    /// Returns `true` if this name has an explicit prefix.
    pub fn has_prefix(&self) -> bool {
        !self.prefix.is_empty()
    }

    /// Borrow as a [`XMLQualifiedNameRef`].
    pub fn as_ref(&self) -> XMLQualifiedNameRef<'_> {
        XMLQualifiedNameRef { prefix: &self.prefix, local: &self.local }
    }
}

impl fmt::Display for XMLQualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_prefix() {
            write!(f, "{}:{}", self.prefix, self.local)
        } else {
            write!(f, "{}", self.local)
        }
    }
}

/// A borrowed view of a qualified name, used for transient lookups without
/// allocating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XMLQualifiedNameRef<'a> {
    /// Namespace prefix, or the empty string for the default namespace.
    pub prefix: &'a str,
    /// Local (unprefixed) name.
    pub local: &'a str,
}

impl<'a> XMLQualifiedNameRef<'a> {
    /// Construct a borrowed qualified name with no prefix.
    pub fn local(local: &'a str) -> Self {
        XMLQualifiedNameRef { prefix: "", local }
    }

    /// Returns `true` if `self` matches `other`, treating a `"*"` prefix on
    /// `self` as a wildcard matching any namespace.
    pub fn matches(&self, other: &XMLQualifiedName) -> bool {
        self.local == other.local.as_str()
            && (self.prefix == "*" || self.prefix == other.prefix.as_str())
    }
}

impl<'a> fmt::Display for XMLQualifiedNameRef<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{}:{}", self.prefix, self.local)
        }
    }
}
