//! Typed property bags for loaded catalog objects.
//!
//! Every object coming out of the asset database is represented as a
//! [`PropertyBag`]: a named collection of typed values. The one nontrivial
//! contract is multi-name fallback lookup — `get_any` scans an ordered
//! list of candidate names and the first present value wins. A value that
//! is present under a candidate name but has the wrong type behaves as
//! absent for the typed accessors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::texture::TextureHandle;

/// Display text that may have been resolved from a localization table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    text: String,
}

impl LocalizedText {
    /// Wrap a plain string as literal text.
    pub fn literal(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered gameplay tag set.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct TagContainer {
    tags: Vec<String>,
}

impl TagContainer {
    pub fn new(tags: Vec<String>) -> Self {
        Self { tags }
    }

    /// First tag starting with `prefix`, if any.
    pub fn first_matching(&self, prefix: &str) -> Option<&str> {
        self.tags
            .iter()
            .map(String::as_str)
            .find(|t| t.starts_with(prefix))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

/// One external stat table: rows of numeric attributes keyed by row name.
///
/// Row keys may be empty or `"None"`; those rows are skipped at cache
/// ingestion time.
#[derive(Debug)]
pub struct StatTable {
    pub id: String,
    pub rows: Vec<(String, PropertyBag)>,
}

impl StatTable {
    pub fn new(id: impl Into<String>, rows: Vec<(String, PropertyBag)>) -> Self {
        Self {
            id: id.into(),
            rows,
        }
    }
}

/// Reference from an object into a stat table row.
#[derive(Debug, Clone)]
pub struct StatRowHandle {
    pub table: Arc<StatTable>,
    pub row_name: String,
}

/// Blueprint-like class reference with a default instance and an optional
/// parent class. Vehicle resolution walks this chain one level up.
#[derive(Debug)]
pub struct BlueprintClass {
    pub name: String,
    pub default_object: Option<Arc<PropertyBag>>,
    pub super_class: Option<Arc<BlueprintClass>>,
}

/// A single typed property value.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    Texture(TextureHandle),
    Text(LocalizedText),
    Object(Arc<PropertyBag>),
    Class(Arc<BlueprintClass>),
    Enum(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    String(String),
    Array(Vec<PropertyBag>),
    Tags(TagContainer),
    RowHandle(StatRowHandle),
}

/// Named collection of typed properties for one catalog object.
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    name: String,
    properties: HashMap<String, PropertyValue>,
}

impl PropertyBag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    /// The object's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.properties.insert(key.into(), value);
    }

    /// Builder-style insert, chainable.
    pub fn with(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.set(key, value);
        self
    }

    /// First value present under any of the candidate names, in order.
    pub fn get_any(&self, names: &[&str]) -> Option<&PropertyValue> {
        names.iter().find_map(|n| self.properties.get(*n))
    }

    fn find_any<'a, T>(
        &'a self,
        names: &[&str],
        extract: impl Fn(&'a PropertyValue) -> Option<T>,
    ) -> Option<T> {
        names
            .iter()
            .filter_map(|n| self.properties.get(*n))
            .find_map(extract)
    }

    pub fn texture_any(&self, names: &[&str]) -> Option<&TextureHandle> {
        self.find_any(names, |v| match v {
            PropertyValue::Texture(t) => Some(t),
            _ => None,
        })
    }

    pub fn text_any(&self, names: &[&str]) -> Option<&LocalizedText> {
        self.find_any(names, |v| match v {
            PropertyValue::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn object_any(&self, names: &[&str]) -> Option<&Arc<PropertyBag>> {
        self.find_any(names, |v| match v {
            PropertyValue::Object(o) => Some(o),
            _ => None,
        })
    }

    pub fn class_any(&self, names: &[&str]) -> Option<&Arc<BlueprintClass>> {
        self.find_any(names, |v| match v {
            PropertyValue::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn enum_any(&self, names: &[&str]) -> Option<&str> {
        self.find_any(names, |v| match v {
            PropertyValue::Enum(e) => Some(e.as_str()),
            _ => None,
        })
    }

    /// Numeric value; integers widen to f64.
    pub fn number_any(&self, names: &[&str]) -> Option<f64> {
        self.find_any(names, |v| match v {
            PropertyValue::Number(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        })
    }

    pub fn array_any(&self, names: &[&str]) -> Option<&[PropertyBag]> {
        self.find_any(names, |v| match v {
            PropertyValue::Array(a) => Some(a.as_slice()),
            _ => None,
        })
    }

    pub fn tags_any(&self, names: &[&str]) -> Option<&TagContainer> {
        self.find_any(names, |v| match v {
            PropertyValue::Tags(t) => Some(t),
            _ => None,
        })
    }

    pub fn row_handle_any(&self, names: &[&str]) -> Option<&StatRowHandle> {
        self.find_any(names, |v| match v {
            PropertyValue::RowHandle(h) => Some(h),
            _ => None,
        })
    }
}
