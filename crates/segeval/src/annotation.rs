// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Segmentation annotations and type filtering.

use crate::geometry::Shape;
use std::collections::{BTreeMap, HashSet};

/// Shape (image surface) plus data (type and attributes) describing one
/// region of a document image.
///
/// The type is an open category label such as `coin`, `label`, `text` or
/// `noise`. Attributes are free-form and depend on the type.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<S = Shape> {
    /// Region outline.
    pub shape: S,
    /// Category label.
    pub kind: String,
    /// Per-type attributes (e.g. `id`, `side`).
    pub attributes: BTreeMap<String, String>,
}

impl<S> Annotation<S> {
    /// Create an annotation without attributes.
    pub fn new(shape: S, kind: impl Into<String>) -> Self {
        Self {
            shape,
            kind: kind.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add or replace an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Set of annotation types allowed through evaluation.
///
/// An empty filter places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter {
    types: HashSet<String>,
}

impl TypeFilter {
    /// Filter allowing the given types, or everything if none are given.
    pub fn new<I, T>(types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the filter accepts every type.
    pub fn is_unrestricted(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns true if annotations of type `kind` pass the filter.
    pub fn accepts(&self, kind: &str) -> bool {
        self.is_unrestricted() || self.types.contains(kind)
    }

    /// Keep the annotations whose type is accepted, preserving order.
    pub fn apply<S>(&self, annotations: Vec<Annotation<S>>) -> Vec<Annotation<S>> {
        if self.is_unrestricted() {
            return annotations;
        }
        annotations
            .into_iter()
            .filter(|annotation| self.accepts(&annotation.kind))
            .collect()
    }
}
