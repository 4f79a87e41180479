//! The element trait and its composition blocks.
//!
//! There is no inheritance at runtime: concrete types embed the shared
//! blocks ([`ElementCore`], [`ModelCore`], [`ExtensibleCore`]) and delegate
//! attribute access to them explicitly. The inheritance *chain* lives only
//! in the schema registry, where it decides attribute order and `is_kind_of`.

use std::any::Any;

use serde_json::Value;

use crate::id::Id;

/// Dynamic value of a meta-attribute.
///
/// `Ref`/`Refs` carry ids for both non-owning references and owned children;
/// the attribute's [`AttrKind`](crate::meta::AttrKind) decides which one it
/// is. Variant attributes hold whichever arm their current value has.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    /// Enum literal in its serialized string form.
    Lit(String),
    Ref(Option<Id>),
    Refs(Vec<Id>),
    /// Custom textual form.
    Custom(String),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            AttrValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) | AttrValue::Lit(s) | AttrValue::Custom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<&Id> {
        match self {
            AttrValue::Ref(Some(id)) => Some(id),
            _ => None,
        }
    }

    pub fn as_ref_ids(&self) -> Option<&[Id]> {
        match self {
            AttrValue::Refs(ids) => Some(ids),
            _ => None,
        }
    }

    /// Plain JSON image, used by mementos. References become `{"$ref": id}`.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::Null | AttrValue::Ref(None) => Value::Null,
            AttrValue::Bool(b) => Value::Bool(*b),
            AttrValue::Num(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AttrValue::Str(s) | AttrValue::Lit(s) | AttrValue::Custom(s) => {
                Value::String(s.clone())
            }
            AttrValue::Ref(Some(id)) => {
                serde_json::json!({ "$ref": id.as_str() })
            }
            AttrValue::Refs(ids) => Value::Array(
                ids.iter()
                    .map(|id| serde_json::json!({ "$ref": id.as_str() }))
                    .collect(),
            ),
        }
    }
}

/// Abstract node of the model or view graph.
///
/// `attr`/`set_attr` expose every schema attribute by name so the generic
/// save/load/diff drivers never need the concrete type. `set_attr` returns
/// false for unknown names and for values of the wrong shape.
pub trait Element: std::fmt::Debug {
    /// Concrete schema type name, e.g. `"NodeView"`.
    fn type_name(&self) -> &'static str;

    fn core(&self) -> &ElementCore;

    fn core_mut(&mut self) -> &mut ElementCore;

    fn attr(&self, name: &str) -> Option<AttrValue>;

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool;

    /// Whether the element may be removed on its own. Parts that only make
    /// sense inside their owner (for example relationship ends) say no.
    fn can_delete(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Element + '_ {
    pub fn id(&self) -> &Id {
        &self.core().id
    }

    pub fn parent(&self) -> Option<&Id> {
        self.core().parent.as_ref()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Identity block shared by every element.
#[derive(Debug, Clone)]
pub struct ElementCore {
    pub id: Id,
    /// Structural owner; `None` for roots.
    pub parent: Option<Id>,
}

impl ElementCore {
    pub fn new() -> Self {
        Self {
            id: Id::generate(),
            parent: None,
        }
    }
}

impl Default for ElementCore {
    fn default() -> Self {
        Self::new()
    }
}

/// Block for named elements that own children.
#[derive(Debug, Clone, Default)]
pub struct ModelCore {
    pub element: ElementCore,
    pub name: String,
    pub owned_elements: Vec<Id>,
}

impl ModelCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "name" => Some(AttrValue::Str(self.name.clone())),
            "ownedElements" => Some(AttrValue::Refs(self.owned_elements.clone())),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("name", AttrValue::Str(s)) => {
                self.name = s;
                true
            }
            ("ownedElements", AttrValue::Refs(ids)) => {
                self.owned_elements = ids;
                true
            }
            _ => false,
        }
    }
}

/// Block adding free-form documentation and tag annotations.
#[derive(Debug, Clone, Default)]
pub struct ExtensibleCore {
    pub model: ModelCore,
    pub documentation: String,
    pub tags: Vec<Id>,
}

impl ExtensibleCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            model: ModelCore::named(name),
            ..Self::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "documentation" => Some(AttrValue::Str(self.documentation.clone())),
            "tags" => Some(AttrValue::Refs(self.tags.clone())),
            _ => self.model.attr(name),
        }
    }

    pub fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("documentation", AttrValue::Str(s)) => {
                self.documentation = s;
                true
            }
            ("tags", AttrValue::Refs(ids)) => {
                self.tags = ids;
                true
            }
            (name, value) => self.model.set_attr(name, value),
        }
    }
}
