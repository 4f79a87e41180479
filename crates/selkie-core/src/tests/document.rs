use std::any::Any;

use serde_json::json;

use super::{registry, sample_package};
use crate::*;

#[test]
fn save_writes_header_then_schema_attrs_in_declared_order() {
    let mut repo = Repository::new();
    let root = repo.insert(Box::new(Model::named("root")));
    let child = repo.insert(Box::new(Model::named("kid")));
    repo.attach(&root, "ownedElements", &child).unwrap();

    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = save_element(&repo, &registry, &root, &mut diags).unwrap();
    assert!(diags.is_empty());

    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["_type", "_id", "name", "ownedElements"]);

    let child_doc = &doc["ownedElements"][0];
    let child_keys: Vec<&String> = child_doc.as_object().unwrap().keys().collect();
    assert_eq!(child_keys, ["_type", "_id", "_parent", "name"]);
    assert_eq!(child_doc["_parent"], json!({ "$ref": root.as_str() }));
}

#[test]
fn save_omits_empty_strings_defaults_and_null_refs() {
    let mut repo = Repository::new();
    let mut project = Project::new();
    project.author = "ada".to_string();
    project.version = "1.0".to_string();
    let id = repo.insert(Box::new(project));

    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = save_element(&repo, &registry, &id, &mut diags).unwrap();

    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["_type", "_id", "name", "author", "version"]);
    assert_eq!(doc["name"], json!("Untitled"));
}

#[test]
fn whole_numbers_are_written_as_integers() {
    let mut repo = Repository::new();
    let mut tag = Tag::new();
    tag.kind = TagKind::Number;
    tag.value = AttrValue::Num(3.0);
    let id = repo.insert(Box::new(tag));

    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = save_element(&repo, &registry, &id, &mut diags).unwrap();
    assert_eq!(doc["value"], json!(3));
    assert_eq!(doc["kind"], json!("number"));
}

#[test]
fn roundtrip_preserves_simple_fields_and_structure() {
    let mut repo = Repository::new();
    let mut project = Project::new();
    project.core.model.name = "demo".to_string();
    project.core.documentation = "notes".to_string();
    project.author = "ada".to_string();
    let project = repo.insert(Box::new(project));
    let pkg = repo.insert(Box::new(Model::named("pkg")));
    repo.attach(&project, "ownedElements", &pkg).unwrap();

    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = save_element(&repo, &registry, &project, &mut diags).unwrap();

    let mut fresh = Repository::new();
    let mut reader = Reader::new();
    let loaded = load_element(&mut fresh, &registry, &doc, &mut reader).unwrap();
    resolve_references(&fresh, &registry, &mut reader);
    assert!(reader.diagnostics.is_empty());

    // Document ids are kept verbatim in a fresh repository.
    assert_eq!(loaded, project);
    let loaded_project = fresh.get::<Project>(&loaded).unwrap();
    assert_eq!(loaded_project.core.model.name, "demo");
    assert_eq!(loaded_project.core.documentation, "notes");
    assert_eq!(loaded_project.author, "ada");
    assert_eq!(loaded_project.core.model.owned_elements.len(), 1);
    drop(loaded_project);

    let loaded_pkg = fresh.get::<Model>(&pkg).unwrap();
    assert_eq!(loaded_pkg.core.name, "pkg");
    assert_eq!(loaded_pkg.core.element.parent, Some(loaded));
}

#[test]
fn colliding_ids_are_remapped_through_the_id_map() {
    let mut repo = Repository::new();
    let (pkg, a, _b, rel) = sample_package(&mut repo);

    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = save_element(&repo, &registry, &pkg, &mut diags).unwrap();

    // Loading the same document into the same repository forces fresh ids.
    let mut reader = Reader::new();
    let second_pkg = load_element(&mut repo, &registry, &doc, &mut reader).unwrap();
    resolve_references(&repo, &registry, &mut reader);

    assert_ne!(second_pkg, pkg);
    let second_children = repo.owned_children(&registry, &second_pkg);
    assert_eq!(second_children.len(), 3);
    let second_a = &second_children[0];
    let second_rel = &second_children[2];
    assert_ne!(second_a, &a);
    assert_ne!(second_rel, &rel);

    // The relationship follows the copies, not the originals.
    let rel_el = repo.get::<DirectedRelationship>(second_rel).unwrap();
    assert_eq!(rel_el.source.as_ref(), Some(second_a));
}

#[test]
fn unresolved_references_are_cleared_with_a_warning() {
    let registry = registry();
    let doc = json!({
        "_type": "DirectedRelationship",
        "_id": "r1",
        "source": { "$ref": "ghost" }
    });

    let mut repo = Repository::new();
    let mut reader = Reader::new();
    let rel = load_element(&mut repo, &registry, &doc, &mut reader).unwrap();
    resolve_references(&repo, &registry, &mut reader);

    assert_eq!(repo.get::<DirectedRelationship>(&rel).unwrap().source, None);
    assert!(
        reader
            .diagnostics
            .warnings()
            .iter()
            .any(|w| w.field.as_deref() == Some("source"))
    );
}

#[test]
fn malformed_fields_warn_and_keep_defaults() {
    let registry = registry();
    let doc = json!({
        "_type": "Model",
        "_id": "m1",
        "name": 42,
        "ownedElements": "not-an-array"
    });

    let mut repo = Repository::new();
    let mut reader = Reader::new();
    let id = load_element(&mut repo, &registry, &doc, &mut reader).unwrap();

    assert_eq!(repo.get::<Model>(&id).unwrap().core.name, "");
    assert_eq!(reader.diagnostics.len(), 2);
}

#[test]
fn unknown_types_skip_the_node_but_not_the_rest() {
    let registry = registry();
    let doc = json!({
        "_type": "Model",
        "_id": "m1",
        "ownedElements": [
            { "_type": "Gizmo", "_id": "g1" },
            { "_type": "Model", "_id": "m2", "name": "ok" }
        ]
    });

    let mut repo = Repository::new();
    let mut reader = Reader::new();
    let id = load_element(&mut repo, &registry, &doc, &mut reader).unwrap();

    let children = repo.owned_children(&registry, &id);
    assert_eq!(children.len(), 1);
    assert_eq!(repo.get::<Model>(&children[0]).unwrap().core.name, "ok");
    assert_eq!(reader.diagnostics.len(), 1);
}

#[test]
fn unknown_enum_literals_keep_the_default() {
    let registry = registry();
    let doc = json!({ "_type": "Tag", "_id": "t1", "kind": "banana" });

    let mut repo = Repository::new();
    let mut reader = Reader::new();
    let id = load_element(&mut repo, &registry, &doc, &mut reader).unwrap();

    assert_eq!(repo.get::<Tag>(&id).unwrap().kind, TagKind::String);
    assert_eq!(reader.diagnostics.len(), 1);
}

#[test]
fn saving_a_missing_element_warns_and_returns_none() {
    let repo = Repository::new();
    let registry = registry();
    let mut diags = Diagnostics::new();
    assert!(save_element(&repo, &registry, &Id::from("nope"), &mut diags).is_none());
    assert_eq!(diags.len(), 1);
}

// A reference that doubles as ownership when the referent is privately
// owned, exercised through a test-local type.
#[derive(Debug, Default)]
struct Holder {
    core: ElementCore,
    item: Option<Id>,
}

impl Element for Holder {
    fn type_name(&self) -> &'static str {
        "Holder"
    }

    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ElementCore {
        &mut self.core
    }

    fn attr(&self, name: &str) -> Option<AttrValue> {
        match name {
            "item" => Some(AttrValue::Ref(self.item.clone())),
            _ => None,
        }
    }

    fn set_attr(&mut self, name: &str, value: AttrValue) -> bool {
        match (name, value) {
            ("item", AttrValue::Ref(id)) => {
                self.item = id;
                true
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn holder_registry() -> Registry {
    let mut registry = registry();
    registry.register(TypeInfo {
        name: "Holder",
        parent: Some("Element"),
        attrs: vec![AttrSpec::reference("item", "Model").embedded_under("itemEmbedded")],
        factory: Some(|| {
            let mut holder = Holder::default();
            holder.item = Some(Id::from("prewired"));
            Box::new(holder)
        }),
    });
    registry
}

#[test]
fn embedded_referents_ride_along_and_restore_ownership() {
    let registry = holder_registry();
    let mut repo = Repository::new();
    let holder = repo.insert(Box::new(Holder::default()));
    let item = repo.insert(Box::new(Model::named("private")));
    repo.borrow_mut(&item).unwrap().core_mut().parent = Some(holder.clone());
    repo.borrow_mut(&holder)
        .unwrap()
        .set_attr("item", AttrValue::Ref(Some(item.clone())));

    let mut diags = Diagnostics::new();
    let doc = save_element(&repo, &registry, &holder, &mut diags).unwrap();
    assert_eq!(doc["item"], json!({ "$ref": item.as_str() }));
    assert_eq!(doc["itemEmbedded"]["_type"], json!("Model"));

    let mut fresh = Repository::new();
    let mut reader = Reader::new();
    let loaded = load_element(&mut fresh, &registry, &doc, &mut reader).unwrap();
    resolve_references(&fresh, &registry, &mut reader);

    let loaded_item = fresh.get::<Holder>(&loaded).unwrap().item.clone().unwrap();
    assert_eq!(fresh.get::<Model>(&loaded_item).unwrap().core.name, "private");
    assert_eq!(
        fresh.borrow(&loaded_item).unwrap().parent(),
        Some(&loaded)
    );
}

#[test]
fn absent_embedded_reference_keeps_the_previous_referent_resolvable() {
    let registry = holder_registry();

    // The Holder factory pre-wires item = "prewired"; the document neither
    // overrides nor embeds it, but still points another reference at it.
    // Registering the previous referent in the id map keeps that $ref from
    // being cleared as unresolved.
    let doc = json!({
        "_type": "Model",
        "_id": "root",
        "ownedElements": [
            { "_type": "Holder", "_id": "h1" },
            {
                "_type": "DirectedRelationship",
                "_id": "r1",
                "source": { "$ref": "prewired" }
            }
        ]
    });

    let mut repo = Repository::new();
    let mut reader = Reader::new();
    load_element(&mut repo, &registry, &doc, &mut reader).unwrap();
    resolve_references(&repo, &registry, &mut reader);

    let rel_id = reader
        .loaded()
        .iter()
        .find(|id| repo.type_name(id) == Some("DirectedRelationship"))
        .cloned()
        .unwrap();
    assert_eq!(
        repo.get::<DirectedRelationship>(&rel_id).unwrap().source,
        Some(Id::from("prewired"))
    );
    let holder_id = reader
        .loaded()
        .iter()
        .find(|id| repo.type_name(id) == Some("Holder"))
        .cloned()
        .unwrap();
    assert_eq!(
        repo.get::<Holder>(&holder_id).unwrap().item,
        Some(Id::from("prewired"))
    );
}
