mod diagram;

use selkie_core::{Id, Registry, Repository, register_model_types};

use crate::*;

fn registry() -> Registry {
    let mut registry = Registry::new();
    register_model_types(&mut registry);
    register_view_types(&mut registry);
    registry
}

fn node_at(repo: &mut Repository, left: f64, top: f64, width: f64, height: f64) -> Id {
    let mut node = NodeView::new();
    node.left = left;
    node.top = top;
    node.width = width;
    node.height = height;
    repo.insert(Box::new(node))
}

fn edge_between(repo: &mut Repository, tail: &Id, head: &Id) -> Id {
    let mut edge = EdgeView::new();
    edge.tail = Some(tail.clone());
    edge.head = Some(head.clone());
    repo.insert(Box::new(edge))
}

/// Diagram owning `views`; `attach` also sets each view's parent.
fn diagram_with(repo: &mut Repository, views: &[&Id]) -> Id {
    let diagram = repo.insert(Box::new(Diagram::named("main")));
    for view in views {
        repo.attach(&diagram, "ownedViews", view).unwrap();
    }
    diagram
}
