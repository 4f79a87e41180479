//! Meta-attribute schemas.
//!
//! Every element type is described by an ordered list of [`AttrSpec`]s held
//! in an explicit [`Registry`], composed over a single-inheritance chain of
//! type names. The registry drives everything generic in this crate:
//! save/load, diff/memento, and whole-tree traversal. It is built once at
//! startup and never mutated afterwards.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::element::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimKind {
    String,
    Number,
    Boolean,
}

/// Storage and serialization class of a meta-attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Prim(PrimKind),
    /// Closed literal set named by [`AttrSpec::target`].
    Enum,
    /// Non-owning reference to another element.
    Ref,
    /// Ordered list of non-owning references.
    RefList,
    /// Privately owned child element.
    Obj,
    /// Ordered list of privately owned child elements.
    ObjList,
    /// Null, a primitive, or a reference; discriminated by the stored value.
    Variant,
    /// Self-describing textual form, e.g. point lists and fonts.
    Custom,
}

/// Declared default, used to omit unchanged values on save.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrDefault {
    Bool(bool),
    Num(f64),
    Str(&'static str),
    Lit(&'static str),
}

/// Static descriptor for one meta-attribute.
#[derive(Debug, Clone)]
pub struct AttrSpec {
    pub name: &'static str,
    pub kind: AttrKind,
    /// Element type, enum name, or custom form this attribute accepts.
    pub target: &'static str,
    pub default: Option<AttrDefault>,
    /// Excluded from persistence.
    pub transient: bool,
    /// For references that double as ownership when the referent is privately
    /// owned: the paired document field the referent is embedded under.
    pub embedded: Option<&'static str>,
}

impl AttrSpec {
    fn new(name: &'static str, kind: AttrKind, target: &'static str) -> Self {
        Self {
            name,
            kind,
            target,
            default: None,
            transient: false,
            embedded: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttrKind::Prim(PrimKind::String), "String")
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, AttrKind::Prim(PrimKind::Number), "Number")
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, AttrKind::Prim(PrimKind::Boolean), "Boolean")
    }

    pub fn enumerated(name: &'static str, enum_name: &'static str) -> Self {
        Self::new(name, AttrKind::Enum, enum_name)
    }

    pub fn reference(name: &'static str, target: &'static str) -> Self {
        Self::new(name, AttrKind::Ref, target)
    }

    pub fn reference_list(name: &'static str, target: &'static str) -> Self {
        Self::new(name, AttrKind::RefList, target)
    }

    pub fn owned(name: &'static str, target: &'static str) -> Self {
        Self::new(name, AttrKind::Obj, target)
    }

    pub fn owned_list(name: &'static str, target: &'static str) -> Self {
        Self::new(name, AttrKind::ObjList, target)
    }

    pub fn variant(name: &'static str) -> Self {
        Self::new(name, AttrKind::Variant, "Variant")
    }

    pub fn custom(name: &'static str, form: &'static str) -> Self {
        Self::new(name, AttrKind::Custom, form)
    }

    pub fn with_default(mut self, default: AttrDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn embedded_under(mut self, field: &'static str) -> Self {
        self.embedded = Some(field);
        self
    }

    /// The declared string default, empty when none was declared.
    pub fn default_str(&self) -> &'static str {
        match self.default {
            Some(AttrDefault::Str(s)) => s,
            _ => "",
        }
    }
}

/// One registered element type: its place in the inheritance chain, its own
/// attribute declarations, and a factory when the type is concrete.
pub struct TypeInfo {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub attrs: Vec<AttrSpec>,
    pub factory: Option<fn() -> Box<dyn Element>>,
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("attrs", &self.attrs.len())
            .field("concrete", &self.factory.is_some())
            .finish()
    }
}

/// Explicit, insertion-ordered schema table.
#[derive(Debug, Default)]
pub struct Registry {
    types: IndexMap<String, TypeInfo>,
    enums: FxHashMap<String, Vec<&'static str>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, info: TypeInfo) {
        self.types.insert(info.name.to_string(), info);
    }

    pub fn register_enum(&mut self, name: &'static str, literals: &[&'static str]) {
        self.enums.insert(name.to_string(), literals.to_vec());
    }

    pub fn type_info(&self, type_name: &str) -> Option<&TypeInfo> {
        self.types.get(type_name)
    }

    pub fn enum_literals(&self, enum_name: &str) -> Option<&[&'static str]> {
        self.enums.get(enum_name).map(Vec::as_slice)
    }

    /// True when `type_name` is `ancestor` or transitively inherits from it.
    pub fn is_kind_of(&self, type_name: &str, ancestor: &str) -> bool {
        let mut current = Some(type_name);
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.types.get(name).and_then(|info| info.parent);
        }
        false
    }

    /// Meta-attributes of `type_name`, ancestor declarations first.
    pub fn attrs(&self, type_name: &str) -> Vec<&AttrSpec> {
        let mut chain = Vec::new();
        let mut current = Some(type_name);
        while let Some(name) = current {
            match self.types.get(name) {
                Some(info) => {
                    chain.push(info);
                    current = info.parent;
                }
                None => break,
            }
        }
        chain
            .iter()
            .rev()
            .flat_map(|info| info.attrs.iter())
            .collect()
    }

    pub fn attr(&self, type_name: &str, attr_name: &str) -> Option<&AttrSpec> {
        let mut current = Some(type_name);
        while let Some(name) = current {
            let info = self.types.get(name)?;
            if let Some(spec) = info.attrs.iter().find(|spec| spec.name == attr_name) {
                return Some(spec);
            }
            current = info.parent;
        }
        None
    }

    /// Instantiates a concrete type. Abstract and unknown types yield `None`.
    pub fn instantiate(&self, type_name: &str) -> Option<Box<dyn Element>> {
        self.types.get(type_name)?.factory.map(|make| make())
    }
}
