use serde_json::json;

use super::registry;
use crate::*;

#[test]
fn ids_are_unique_and_serialize_as_plain_strings() {
    let a = Id::generate();
    let b = Id::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 32);

    let id = Id::from("n1");
    assert_eq!(serde_json::to_value(&id).unwrap(), json!("n1"));
    assert_eq!(serde_json::from_value::<Id>(json!("n1")).unwrap(), id);
}

#[test]
fn tag_kind_literals_roundtrip() {
    for kind in [
        TagKind::String,
        TagKind::Boolean,
        TagKind::Number,
        TagKind::Reference,
        TagKind::Hidden,
    ] {
        assert_eq!(TagKind::from_literal(kind.as_literal()), Some(kind));
    }
    assert_eq!(TagKind::from_literal("banana"), None);
}

#[test]
fn tag_values_accept_scalars_and_references_only() {
    let mut tag = Tag::new();
    assert!(tag.set_attr("value", AttrValue::Num(4.0)));
    assert!(tag.set_attr("value", AttrValue::Ref(Some(Id::from("n1")))));
    assert!(!tag.set_attr("value", AttrValue::Refs(vec![])));
    assert!(!tag.set_attr("value", AttrValue::Custom("x".into())));
    assert_eq!(tag.value, AttrValue::Ref(Some(Id::from("n1"))));
}

#[test]
fn relationship_ends_report_undeletable() {
    assert!(!RelationshipEnd::new().can_delete());
    assert!(Model::new().can_delete());
}

#[test]
fn projects_start_untitled() {
    let project = Project::new();
    assert_eq!(project.core.model.name, "Untitled");
    assert_eq!(project.author, "");
    assert_eq!(project.attr("name"), Some(AttrValue::Str("Untitled".into())));
}

#[test]
fn the_registry_resolves_kinds_across_the_chain() {
    let registry = registry();
    assert!(registry.is_kind_of("DirectedRelationship", "Element"));
    assert!(registry.is_kind_of("DirectedRelationship", "Relationship"));
    assert!(registry.is_kind_of("Tag", "ExtensibleModel"));
    assert!(registry.is_kind_of("Model", "Model"));
    assert!(!registry.is_kind_of("Model", "Tag"));
    assert!(!registry.is_kind_of("Gizmo", "Element"));
}

#[test]
fn attrs_come_back_ancestors_first_in_declared_order() {
    let registry = registry();
    let names: Vec<&str> = registry.attrs("Project").iter().map(|s| s.name).collect();
    assert_eq!(
        names,
        [
            "name",
            "ownedElements",
            "documentation",
            "tags",
            "author",
            "company",
            "version"
        ]
    );
    assert_eq!(
        registry.attr("Project", "name").map(|s| s.kind),
        Some(AttrKind::Prim(PrimKind::String))
    );
    assert!(registry.attr("Project", "bogus").is_none());
}

#[test]
fn instantiate_covers_concrete_types_only() {
    let registry = registry();
    assert!(registry.instantiate("Relationship").is_none());
    assert!(registry.instantiate("ExtensibleModel").is_none());
    assert!(registry.instantiate("Gizmo").is_none());

    let tag = registry.instantiate("Tag").unwrap();
    assert_eq!(tag.type_name(), "Tag");
    assert!(tag.is::<Tag>());
}

#[test]
fn enum_tables_are_exact() {
    let registry = registry();
    assert_eq!(
        registry.enum_literals("TagKind"),
        Some(["string", "boolean", "number", "reference", "hidden"].as_slice())
    );
    assert!(registry.enum_literals("Nope").is_none());
}

#[test]
fn dynamic_elements_downcast_to_their_concrete_type() {
    let mut repo = Repository::new();
    let id = repo.insert(Box::new(Model::named("m")));
    let el = repo.borrow(&id).unwrap();
    assert!(el.is::<Model>());
    assert_eq!(el.downcast_ref::<Model>().unwrap().core.name, "m");
    assert!(el.downcast_ref::<Project>().is_none());
}
