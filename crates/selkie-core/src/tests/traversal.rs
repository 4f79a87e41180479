use super::{registry, sample_package};
use crate::*;

#[test]
fn traverse_visits_each_node_before_its_children() {
    let registry = registry();
    let mut repo = Repository::new();
    let (pkg, a, b, rel) = sample_package(&mut repo);
    let nested = repo.insert(Box::new(Model::named("nested")));
    repo.attach(&a, "ownedElements", &nested).unwrap();

    let mut seen = Vec::new();
    repo.traverse(&registry, &pkg, &mut |id| seen.push(id.clone()));

    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0], pkg);
    let at = |id: &Id| seen.iter().position(|s| s == id).unwrap();
    assert!(at(&a) < at(&nested));
    assert!(at(&nested) < at(&b));
    assert!(at(&b) < at(&rel));
}

#[test]
fn traverse_depth_first_visits_children_before_their_node() {
    let registry = registry();
    let mut repo = Repository::new();
    let (pkg, a, _b, _rel) = sample_package(&mut repo);
    let nested = repo.insert(Box::new(Model::named("nested")));
    repo.attach(&a, "ownedElements", &nested).unwrap();

    let mut seen = Vec::new();
    repo.traverse_depth_first(&registry, &pkg, &mut |id| seen.push(id.clone()));

    assert_eq!(seen.len(), 5);
    assert_eq!(seen.last(), Some(&pkg));
    let at = |id: &Id| seen.iter().position(|s| s == id).unwrap();
    assert!(at(&nested) < at(&a));
}

#[test]
fn traverse_field_stays_on_one_chain() {
    let registry = registry();
    let mut repo = Repository::new();
    let project = repo.insert(Box::new(Project::new()));
    let pkg = repo.insert(Box::new(Model::named("pkg")));
    let tag = repo.insert(Box::new(Tag::new()));
    repo.attach(&project, "ownedElements", &pkg).unwrap();
    repo.attach(&project, "tags", &tag).unwrap();

    let mut whole = Vec::new();
    repo.traverse(&registry, &project, &mut |id| whole.push(id.clone()));
    assert!(whole.contains(&tag));

    let mut chain = Vec::new();
    repo.traverse_field(&project, "ownedElements", &mut |id| chain.push(id.clone()));
    assert_eq!(chain, [project, pkg]);
}

#[test]
fn find_returns_the_first_match_in_visit_order() {
    let registry = registry();
    let mut repo = Repository::new();
    let (pkg, _a, b, _rel) = sample_package(&mut repo);

    let found = repo.find(&registry, &pkg, &|el| {
        el.attr("name") == Some(AttrValue::Str("b".into()))
    });
    assert_eq!(found, Some(b));
    assert_eq!(repo.find(&registry, &pkg, &|el| el.is::<Tag>()), None);
}

#[test]
fn field_finds_pick_the_shallowest_or_deepest_match() {
    let mut repo = Repository::new();
    let outer = repo.insert(Box::new(Model::named("box")));
    let middle = repo.insert(Box::new(Model::named("box")));
    let leaf = repo.insert(Box::new(Model::named("box")));
    repo.attach(&outer, "ownedElements", &middle).unwrap();
    repo.attach(&middle, "ownedElements", &leaf).unwrap();

    let named_box = |el: &dyn Element| el.attr("name") == Some(AttrValue::Str("box".into()));
    assert_eq!(
        repo.find_field(&outer, "ownedElements", &named_box),
        Some(outer.clone())
    );
    assert_eq!(
        repo.find_field_depth_first(&outer, "ownedElements", &named_box),
        Some(leaf)
    );
    assert_eq!(
        repo.find_field(&outer, "ownedElements", &|el| el.is::<Tag>()),
        None
    );
}

#[test]
fn is_ancestor_is_strict_and_transitive() {
    let mut repo = Repository::new();
    let (pkg, a, _b, _rel) = sample_package(&mut repo);
    let nested = repo.insert(Box::new(Model::named("nested")));
    repo.attach(&a, "ownedElements", &nested).unwrap();

    assert!(repo.is_ancestor(&pkg, &nested));
    assert!(repo.is_ancestor(&a, &nested));
    assert!(!repo.is_ancestor(&nested, &pkg));
    assert!(!repo.is_ancestor(&a, &a));
}

#[test]
fn remove_takes_the_subtree_and_leaves_other_references_dangling() {
    let registry = registry();
    let mut repo = Repository::new();
    let (pkg, a, _b, rel) = sample_package(&mut repo);
    let nested = repo.insert(Box::new(Model::named("nested")));
    repo.attach(&a, "ownedElements", &nested).unwrap();
    let before = repo.len();

    let removed = repo.remove(&registry, &a).unwrap();
    assert_eq!(removed, [a.clone(), nested]);
    assert_eq!(repo.len(), before - 2);

    let parent = repo.get::<Model>(&pkg).unwrap();
    assert!(!parent.core.owned_elements.contains(&a));
    drop(parent);

    // Non-owning references are not chased; readers treat them as absent.
    assert_eq!(
        repo.get::<DirectedRelationship>(&rel).unwrap().source,
        Some(a)
    );
}

#[test]
fn remove_refuses_undeletable_parts_but_takes_them_with_their_owner() {
    let registry = registry();
    let mut repo = Repository::new();
    let rel = repo.insert(Box::new(UndirectedRelationship::new()));
    let end = repo.insert(Box::new(RelationshipEnd::new()));
    repo.attach(&rel, "end1", &end).unwrap();

    assert!(matches!(
        repo.remove(&registry, &end),
        Err(Error::Undeletable { .. })
    ));

    let removed = repo.remove(&registry, &rel).unwrap();
    assert_eq!(removed, [rel, end]);
    assert!(repo.is_empty());
}

#[test]
fn attach_and_detach_keep_both_sides_consistent() {
    let mut repo = Repository::new();
    let pkg = repo.insert(Box::new(Model::named("pkg")));
    let child = repo.insert(Box::new(Model::named("kid")));

    repo.attach(&pkg, "ownedElements", &child).unwrap();
    assert_eq!(repo.borrow(&child).unwrap().parent(), Some(&pkg));
    assert!(
        repo.get::<Model>(&pkg)
            .unwrap()
            .core
            .owned_elements
            .contains(&child)
    );

    repo.detach(&pkg, "ownedElements", &child).unwrap();
    assert_eq!(repo.borrow(&child).unwrap().parent(), None);
    assert!(
        repo.get::<Model>(&pkg)
            .unwrap()
            .core
            .owned_elements
            .is_empty()
    );

    assert!(matches!(
        repo.attach(&pkg, "bogus", &child),
        Err(Error::WrongAttribute { .. })
    ));
}

#[test]
fn borrow_conflicts_and_wrong_types_surface_as_errors() {
    let mut repo = Repository::new();
    let pkg = repo.insert(Box::new(Model::named("pkg")));

    let held = repo.borrow(&pkg).unwrap();
    assert!(matches!(
        repo.borrow_mut(&pkg),
        Err(Error::ElementBusy { .. })
    ));
    drop(held);

    assert!(matches!(
        repo.get::<Project>(&pkg),
        Err(Error::WrongType { .. })
    ));
    assert!(matches!(
        repo.borrow(&Id::from("ghost")),
        Err(Error::MissingElement { .. })
    ));
}
