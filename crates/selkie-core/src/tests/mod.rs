mod document;
mod models;
mod traversal;

use crate::*;

fn registry() -> Registry {
    let mut registry = Registry::new();
    register_model_types(&mut registry);
    registry
}

/// `pkg` owning models `a`, `b` and a directed relationship `a -> b`.
fn sample_package(repo: &mut Repository) -> (Id, Id, Id, Id) {
    let pkg = repo.insert(Box::new(Model::named("pkg")));
    let a = repo.insert(Box::new(Model::named("a")));
    let b = repo.insert(Box::new(Model::named("b")));
    let mut rel = DirectedRelationship::new();
    rel.core.model.name = "a-to-b".to_string();
    rel.source = Some(a.clone());
    rel.target = Some(b.clone());
    let rel = repo.insert(Box::new(rel));
    for child in [&a, &b, &rel] {
        repo.attach(&pkg, "ownedElements", child).unwrap();
    }
    (pkg, a, b, rel)
}
