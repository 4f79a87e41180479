//! Model-side element types.
//!
//! These are the generic, notation-agnostic entities: named models, the
//! project root, tag annotations, and the relationship family. Concrete
//! notations layer their own types on top through the same registry.

use std::any::Any;

use crate::element::{AttrValue, Element, ElementCore, ExtensibleCore, ModelCore};
use crate::id::Id;
use crate::meta::{AttrSpec, Registry, TypeInfo};

/// Named element owning an ordered list of children.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub core: ModelCore,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            core: ModelCore::named(name),
        }
    }
}

impl Element for Model {
    fn type_name(&self) -> &'static str {
        "Model"
    }

    fn core(&self) -> &ElementCore {
        &self.core.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        self.core.attr(name)
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        self.core.set_attr(name, value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Root model with file-level metadata.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub core: ExtensibleCore,
    pub author: String,
    pub company: String,
    pub version: String,
}

impl Project {
    pub fn new() -> Self {
        Self {
            core: ExtensibleCore::named("Untitled"),
            author: String::new(),
            company: String::new(),
            version: String::new(),
        }
    }
}

impl Element for Project {
    fn type_name(&self) -> &'static str {
        "Project"
    }

    fn core(&self) -> &ElementCore {
        &self.core.model.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.model.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "author" => Some(AttrValue::Str(self.author.clone())),
            "company" => Some(AttrValue::Str(self.company.clone())),
            "version" => Some(AttrValue::Str(self.version.clone())),
            _ => self.core.attr(name),
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("author", AttrValue::Str(s)) => {
                self.author = s;
                true
            }
            ("company", AttrValue::Str(s)) => {
                self.company = s;
                true
            }
            ("version", AttrValue::Str(s)) => {
                self.version = s;
                true
            }
            (name, value) => self.core.set_attr(name, value),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagKind {
    #[default]
    String,
    Boolean,
    Number,
    Reference,
    Hidden,
}

impl TagKind {
    pub fn as_literal(self) -> &'static str {
        match self {
            TagKind::String => "string",
            TagKind::Boolean => "boolean",
            TagKind::Number => "number",
            TagKind::Reference => "reference",
            TagKind::Hidden => "hidden",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            "string" => Some(TagKind::String),
            "boolean" => Some(TagKind::Boolean),
            "number" => Some(TagKind::Number),
            "reference" => Some(TagKind::Reference),
            "hidden" => Some(TagKind::Hidden),
            _ => None,
        }
    }
}

/// Free-form annotation. `value` holds whichever shape `kind` announces:
/// a primitive, a reference, or nothing.
#[derive(Debug, Clone, Default)]
pub struct Tag {
    pub core: ExtensibleCore,
    pub kind: TagKind,
    pub value: AttrValue,
}

impl Tag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Element for Tag {
    fn type_name(&self) -> &'static str {
        "Tag"
    }

    fn core(&self) -> &ElementCore {
        &self.core.model.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.model.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "kind" => Some(AttrValue::Lit(self.kind.as_literal().to_string())),
            "value" => Some(self.value.clone()),
            _ => self.core.attr(name),
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("kind", AttrValue::Lit(s)) => match TagKind::from_literal(&s) {
                Some(kind) => {
                    self.kind = kind;
                    true
                }
                None => false,
            },
            (
                "value",
                value @ (AttrValue::Null
                | AttrValue::Bool(_)
                | AttrValue::Num(_)
                | AttrValue::Str(_)
                | AttrValue::Ref(_)),
            ) => {
                self.value = value;
                true
            }
            (name, value) => self.core.set_attr(name, value),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Relationship with an ordered source and target.
#[derive(Debug, Clone, Default)]
pub struct DirectedRelationship {
    pub core: ExtensibleCore,
    pub source: Option<Id>,
    pub target: Option<Id>,
}

impl DirectedRelationship {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Element for DirectedRelationship {
    fn type_name(&self) -> &'static str {
        "DirectedRelationship"
    }

    fn core(&self) -> &ElementCore {
        &self.core.model.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.model.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "source" => Some(AttrValue::Ref(self.source.clone())),
            "target" => Some(AttrValue::Ref(self.target.clone())),
            _ => self.core.attr(name),
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("source", AttrValue::Ref(id)) => {
                self.source = id;
                true
            }
            ("target", AttrValue::Ref(id)) => {
                self.target = id;
                true
            }
            (name, value) => self.core.set_attr(name, value),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Relationship between two owned [`RelationshipEnd`]s.
#[derive(Debug, Clone, Default)]
pub struct UndirectedRelationship {
    pub core: ExtensibleCore,
    pub end1: Option<Id>,
    pub end2: Option<Id>,
}

impl UndirectedRelationship {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Element for UndirectedRelationship {
    fn type_name(&self) -> &'static str {
        "UndirectedRelationship"
    }

    fn core(&self) -> &ElementCore {
        &self.core.model.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.model.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "end1" => Some(AttrValue::Ref(self.end1.clone())),
            "end2" => Some(AttrValue::Ref(self.end2.clone())),
            _ => self.core.attr(name),
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("end1", AttrValue::Ref(id)) => {
                self.end1 = id;
                true
            }
            ("end2", AttrValue::Ref(id)) => {
                self.end2 = id;
                true
            }
            (name, value) => self.core.set_attr(name, value),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// One side of an undirected relationship. Lives and dies with its owner.
#[derive(Debug, Clone, Default)]
pub struct RelationshipEnd {
    pub core: ExtensibleCore,
    pub reference: Option<Id>,
}

impl RelationshipEnd {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Element for RelationshipEnd {
    fn type_name(&self) -> &'static str {
        "RelationshipEnd"
    }

    fn core(&self) -> &ElementCore {
        &self.core.model.element
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core.model.element
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "reference" => Some(AttrValue::Ref(self.reference.clone())),
            _ => self.core.attr(name),
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("reference", AttrValue::Ref(id)) => {
                self.reference = id;
                true
            }
            (name, value) => self.core.set_attr(name, value),
        }
    }

    fn can_delete(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Registers the model-side schemas and enums.
pub fn register_model_types(registry: &mut Registry) {
    registry.register_enum(
        "TagKind",
        &["string", "boolean", "number", "reference", "hidden"],
    );

    registry.register(TypeInfo {
        name: "Element",
        parent: None,
        attrs: vec![],
        factory: None,
    });
    registry.register(TypeInfo {
        name: "Model",
        parent: Some("Element"),
        attrs: vec![
            AttrSpec::string("name"),
            AttrSpec::owned_list("ownedElements", "Element"),
        ],
        factory: Some(|| Box::new(Model::new())),
    });
    registry.register(TypeInfo {
        name: "ExtensibleModel",
        parent: Some("Model"),
        attrs: vec![
            AttrSpec::string("documentation"),
            AttrSpec::owned_list("tags", "Tag"),
        ],
        factory: None,
    });
    registry.register(TypeInfo {
        name: "Tag",
        parent: Some("ExtensibleModel"),
        attrs: vec![
            AttrSpec::enumerated("kind", "TagKind"),
            AttrSpec::variant("value"),
        ],
        factory: Some(|| Box::new(Tag::new())),
    });
    registry.register(TypeInfo {
        name: "Project",
        parent: Some("ExtensibleModel"),
        attrs: vec![
            AttrSpec::string("author"),
            AttrSpec::string("company"),
            AttrSpec::string("version"),
        ],
        factory: Some(|| Box::new(Project::new())),
    });
    registry.register(TypeInfo {
        name: "Relationship",
        parent: Some("ExtensibleModel"),
        attrs: vec![],
        factory: None,
    });
    registry.register(TypeInfo {
        name: "DirectedRelationship",
        parent: Some("Relationship"),
        attrs: vec![
            AttrSpec::reference("source", "Model"),
            AttrSpec::reference("target", "Model"),
        ],
        factory: Some(|| Box::new(DirectedRelationship::new())),
    });
    registry.register(TypeInfo {
        name: "UndirectedRelationship",
        parent: Some("Relationship"),
        attrs: vec![
            AttrSpec::owned("end1", "RelationshipEnd"),
            AttrSpec::owned("end2", "RelationshipEnd"),
        ],
        factory: Some(|| Box::new(UndirectedRelationship::new())),
    });
    registry.register(TypeInfo {
        name: "RelationshipEnd",
        parent: Some("ExtensibleModel"),
        attrs: vec![AttrSpec::reference("reference", "Model")],
        factory: Some(|| Box::new(RelationshipEnd::new())),
    });
}
