//! Flatten a [`Settings`] type into an ordered list of leaf property
//! descriptors.
//!
//! The walk is depth-first in declaration order. Every leaf field becomes one
//! [`Property`] carrying the index path from the root. Nested fields (structs,
//! sequences, boxes and options) become [`Anchor`]s: they are never settable
//! themselves, but their names and `env` tags prefix the environment variable
//! names of the leaves below them.

use std::any::TypeId;

use tracing::trace;

use crate::error::AppConfigError;
use crate::naming;
use crate::schema::{AccessError, Field, FieldValue, Kind, Settings, Shape};

/// Tag keys understood by the resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
    Env,
    Arg,
    Short,
}

impl TagKey {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "env" => Some(TagKey::Env),
            "arg" => Some(TagKey::Arg),
            "short" => Some(TagKey::Short),
            _ => None,
        }
    }
}

/// Recognized tags of a field.
///
/// Only the first comma-separated segment of a raw value is kept, so
/// `env = "HOST,required"` yields `HOST`. Empty values and unknown keys are
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    env: Option<String>,
    arg: Option<String>,
    short: Option<String>,
}

impl Tags {
    pub fn parse(raw: &[(&str, &str)]) -> Self {
        let mut tags = Tags::default();
        for (key, value) in raw {
            let Some(key) = TagKey::from_key(key) else {
                continue;
            };
            let value = value.split(',').next().unwrap_or_default();
            if value.is_empty() {
                continue;
            }
            let slot = match key {
                TagKey::Env => &mut tags.env,
                TagKey::Arg => &mut tags.arg,
                TagKey::Short => &mut tags.short,
            };
            *slot = Some(value.to_string());
        }
        tags
    }

    pub fn get(&self, key: TagKey) -> Option<&str> {
        match key {
            TagKey::Env => self.env.as_deref(),
            TagKey::Arg => self.arg.as_deref(),
            TagKey::Short => self.short.as_deref(),
        }
    }
}

/// Index of an [`Anchor`] inside its [`PropertyList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorId(usize);

/// A nested field: the parent of the properties below it.
#[derive(Debug, Clone)]
pub struct Anchor {
    name: &'static str,
    tags: Tags,
    path: Vec<usize>,
    parent: Option<AnchorId>,
}

impl Anchor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }
}

/// A settable leaf field reachable from the configuration root.
#[derive(Debug, Clone)]
pub struct Property {
    path: Vec<usize>,
    name: &'static str,
    tags: Tags,
    kind: Kind,
    parent: Option<AnchorId>,
}

impl Property {
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn parent(&self) -> Option<AnchorId> {
        self.parent
    }
}

/// The flattened schema of one configuration type.
#[derive(Debug, Clone, Default)]
pub struct PropertyList {
    properties: Vec<Property>,
    anchors: Vec<Anchor>,
}

impl PropertyList {
    /// Walk `T` and collect its leaf properties.
    ///
    /// Fails with [`AppConfigError::CyclicSchema`] when a type is reached again
    /// through its own fields.
    pub fn of<T: Settings>() -> Result<Self, AppConfigError> {
        let root = T::composite();
        let mut list = PropertyList::default();
        let mut ancestors = vec![root.type_id];
        list.walk(root.fields, None, &[], &mut ancestors)?;
        trace!(
            type_name = root.type_name,
            properties = list.properties.len(),
            "schema walked"
        );
        Ok(list)
    }

    fn walk(
        &mut self,
        fields: &'static [Field],
        parent: Option<AnchorId>,
        prefix: &[usize],
        ancestors: &mut Vec<TypeId>,
    ) -> Result<(), AppConfigError> {
        for (index, field) in fields.iter().enumerate() {
            let mut path = prefix.to_vec();
            path.push(index);
            let tags = Tags::parse(field.tags);

            match (field.shape)() {
                Shape::Leaf(kind) => self.properties.push(Property {
                    path,
                    name: field.name,
                    tags,
                    kind,
                    parent,
                }),
                Shape::Composite(composite) => {
                    let anchor = self.push_anchor(Anchor {
                        name: field.name,
                        tags,
                        path: path.clone(),
                        parent,
                    });
                    if ancestors.contains(&composite.type_id) {
                        return Err(AppConfigError::CyclicSchema {
                            type_name: composite.type_name,
                            field: self.anchor_qualified_name(anchor),
                        });
                    }
                    ancestors.push(composite.type_id);
                    self.walk(composite.fields, Some(anchor), &path, ancestors)?;
                    ancestors.pop();
                }
            }
        }
        Ok(())
    }

    fn push_anchor(&mut self, anchor: Anchor) -> AnchorId {
        self.anchors.push(anchor);
        AnchorId(self.anchors.len() - 1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    pub fn anchor(&self, id: AnchorId) -> &Anchor {
        &self.anchors[id.0]
    }

    /// Environment variable consulted for `property`.
    ///
    /// An explicit `env` tag is used as-is. Otherwise the field name is
    /// converted with [`naming::env_variable_name`] and prefixed by the
    /// parent's variable name, recursively.
    pub fn env_variable(&self, property: &Property) -> String {
        self.env_name(property.tags(), property.name(), property.parent())
    }

    fn env_name(&self, tags: &Tags, name: &str, parent: Option<AnchorId>) -> String {
        if let Some(explicit) = tags.get(TagKey::Env) {
            return explicit.to_string();
        }
        let own = naming::env_variable_name(name);
        match parent {
            Some(id) => {
                let anchor = self.anchor(id);
                let prefix = self.env_name(&anchor.tags, anchor.name, anchor.parent);
                naming::join(&prefix, &own)
            }
            None => own,
        }
    }

    /// Dotted field names from the root, e.g. `database.url`.
    pub fn qualified_name(&self, property: &Property) -> String {
        match property.parent() {
            Some(id) => format!("{}.{}", self.anchor_qualified_name(id), property.name()),
            None => property.name().to_string(),
        }
    }

    /// Store `value` in `target` at `property`'s path.
    ///
    /// `invalid` builds the source-specific error for a value its field
    /// cannot hold (narrowing overflow).
    pub(crate) fn write<T: Settings>(
        &self,
        target: &mut T,
        property: &Property,
        value: FieldValue,
        invalid: impl FnOnce(String) -> AppConfigError,
    ) -> Result<(), AppConfigError> {
        target
            .set_path(property.path(), value)
            .map_err(|err| match err {
                AccessError::Absent => AppConfigError::Unaddressable {
                    field: self.qualified_name(property),
                },
                AccessError::Assign(err) => invalid(err.to_string()),
                other => AppConfigError::InvalidPath {
                    field: self.qualified_name(property),
                    source: other,
                },
            })
    }

    fn anchor_qualified_name(&self, id: AnchorId) -> String {
        let anchor = self.anchor(id);
        match anchor.parent {
            Some(parent) => format!("{}.{}", self.anchor_qualified_name(parent), anchor.name),
            None => anchor.name.to_string(),
        }
    }
}

impl<'a> IntoIterator for &'a PropertyList {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
