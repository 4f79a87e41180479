use selkie_core::{Diagnostics, Reader, Repository, load_element, resolve_references, save_element};
use selkie_layout::{LayeredEngine, RankDir, Separations};
use serde_json::json;

use super::{diagram_with, edge_between, node_at, registry};
use crate::geom::{point, rect};
use crate::*;

#[test]
fn frames_draw_in_ascending_z_order() {
    let mut repo = Repository::new();
    let raised = node_at(&mut repo, 0.0, 0.0, 100.0, 60.0);
    let base = node_at(&mut repo, 50.0, 30.0, 100.0, 60.0);
    repo.get_mut::<NodeView>(&raised).unwrap().core.z_index = 5.0;
    let diagram = diagram_with(&mut repo, &[&raised, &base]);

    let mut canvas = RecordingCanvas::new();
    draw_diagram(&repo, &mut canvas, &diagram, false).unwrap();

    let fills: Vec<_> = canvas
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillRect { rect } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(fills, [rect(50.0, 30.0, 100.0, 60.0), rect(0.0, 0.0, 100.0, 60.0)]);
}

#[test]
fn a_failing_view_does_not_stop_the_frame() {
    let mut repo = Repository::new();
    let node = node_at(&mut repo, 0.0, 0.0, 100.0, 60.0);
    let mut dangling = EdgeView::new();
    dangling.tail = Some(node.clone());
    let dangling = repo.insert(Box::new(dangling));
    let diagram = diagram_with(&mut repo, &[&node, &dangling]);

    let mut canvas = RecordingCanvas::new();
    draw_diagram(&repo, &mut canvas, &diagram, false).unwrap();

    let ops = canvas.ops();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0], DrawOp::FillRect { rect: rect(0.0, 0.0, 100.0, 60.0) });
}

#[test]
fn pick_searches_front_to_back() {
    let mut repo = Repository::new();
    let below = node_at(&mut repo, 0.0, 0.0, 100.0, 60.0);
    let above = node_at(&mut repo, 0.0, 0.0, 100.0, 60.0);
    repo.get_mut::<NodeView>(&above).unwrap().core.z_index = 1.0;
    let diagram = diagram_with(&mut repo, &[&above, &below]);

    assert_eq!(pick(&repo, &diagram, point(50.0, 30.0)), Some(above));
    assert_eq!(pick(&repo, &diagram, point(500.0, 500.0)), None);
}

#[test]
fn selection_tracks_flags_and_draws_decorations() {
    let mut repo = Repository::new();
    let node = node_at(&mut repo, 0.0, 0.0, 100.0, 60.0);
    let diagram = diagram_with(&mut repo, &[&node]);

    select_view(&repo, &diagram, &node).unwrap();
    select_view(&repo, &diagram, &node).unwrap();
    assert_eq!(repo.get::<Diagram>(&diagram).unwrap().selected_views.len(), 1);
    assert!(repo.get::<NodeView>(&node).unwrap().core.selected);

    let mut canvas = RecordingCanvas::new();
    draw_diagram(&repo, &mut canvas, &diagram, true).unwrap();

    let ops = canvas.ops();
    assert_eq!(ops.len(), 7);
    assert_eq!(
        ops[2],
        DrawOp::Rect {
            rect: rect(0.0, 0.0, 100.0, 60.0),
            dash: Some(vec![4.0, 4.0]),
        }
    );
    assert_eq!(ops[3], DrawOp::FillRect { rect: rect(-3.0, -3.0, 6.0, 6.0) });
    assert_eq!(ops[4], DrawOp::FillRect { rect: rect(97.0, -3.0, 6.0, 6.0) });
    assert_eq!(ops[5], DrawOp::FillRect { rect: rect(-3.0, 57.0, 6.0, 6.0) });
    assert_eq!(ops[6], DrawOp::FillRect { rect: rect(97.0, 57.0, 6.0, 6.0) });

    deselect_all(&repo, &diagram).unwrap();
    assert!(repo.get::<Diagram>(&diagram).unwrap().selected_views.is_empty());
    assert!(!repo.get::<NodeView>(&node).unwrap().core.selected);
}

#[test]
fn area_selection_takes_visible_selectable_top_level_views() {
    let mut repo = Repository::new();
    let inside = node_at(&mut repo, 10.0, 10.0, 50.0, 50.0);
    let outside = node_at(&mut repo, 400.0, 400.0, 50.0, 50.0);
    let satellite = node_at(&mut repo, 20.0, 20.0, 10.0, 10.0);
    let hidden = node_at(&mut repo, 30.0, 30.0, 10.0, 10.0);
    repo.get_mut::<NodeView>(&satellite).unwrap().core.parent_style = true;
    repo.get_mut::<NodeView>(&hidden).unwrap().core.visible = false;
    let diagram = diagram_with(&mut repo, &[&inside, &outside, &satellite, &hidden]);

    let picked = select_area(&repo, &diagram, rect(0.0, 0.0, 100.0, 100.0)).unwrap();

    assert_eq!(picked, vec![inside.clone()]);
    assert!(repo.get::<NodeView>(&inside).unwrap().core.selected);
    assert!(!repo.get::<NodeView>(&outside).unwrap().core.selected);
    assert_eq!(
        repo.get::<Diagram>(&diagram).unwrap().selected_views,
        vec![inside]
    );
}

#[test]
fn layout_places_nodes_and_routes_edges_via_the_engine() {
    let mut repo = Repository::new();
    let a = node_at(&mut repo, 300.0, 300.0, 100.0, 60.0);
    let b = node_at(&mut repo, 700.0, 40.0, 80.0, 40.0);
    let edge = edge_between(&mut repo, &a, &b);
    let mut stray = EdgeView::new();
    stray.tail = Some(a.clone());
    let stray = repo.insert(Box::new(stray));
    let diagram = diagram_with(&mut repo, &[&a, &b, &edge, &stray]);

    layout_diagram(
        &repo,
        &diagram,
        &LayeredEngine,
        RankDir::TopBottom,
        Separations::default(),
    )
    .unwrap();

    {
        let placed = repo.get::<NodeView>(&a).unwrap();
        assert_eq!((placed.left, placed.top), (0.0, 0.0));
    }
    {
        let placed = repo.get::<NodeView>(&b).unwrap();
        assert_eq!((placed.left, placed.top), (10.0, 110.0));
    }
    {
        let routed = repo.get::<EdgeView>(&edge).unwrap();
        assert_eq!(routed.line_style, LineStyle::Curve);
        assert_eq!(routed.points.points(), [point(50.0, 30.0), point(50.0, 130.0)]);
    }
    {
        let untouched = repo.get::<EdgeView>(&stray).unwrap();
        assert_eq!(untouched.line_style, LineStyle::Rectilinear);
        assert!(untouched.points.is_empty());
    }
}

#[test]
fn views_save_and_load_through_the_generic_document_machinery() {
    let registry = registry();
    let mut repo = Repository::new();
    let a = node_at(&mut repo, 0.0, 0.0, 100.0, 60.0);
    let b = node_at(&mut repo, 0.0, 240.0, 100.0, 60.0);
    let edge = edge_between(&mut repo, &a, &b);
    {
        let mut view = repo.get_mut::<EdgeView>(&edge).unwrap();
        view.points = PointList::from_points(vec![point(55.0, 66.0), point(55.0, 300.0)]);
        view.head_end_style = EndStyle::SolidArrow;
        view.core.font = Font::from_text("Menlo;11;1").unwrap();
        view.core.line_mode = LineMode::Dot;
    }
    let diagram = diagram_with(&mut repo, &[&a, &b, &edge]);

    let mut diags = Diagnostics::new();
    let doc = save_element(&repo, &registry, &diagram, &mut diags).unwrap();
    assert!(diags.is_empty());

    assert_eq!(doc["_type"], json!("Diagram"));
    assert_eq!(doc["name"], json!("main"));
    assert_eq!(doc["ownedViews"].as_array().unwrap().len(), 3);

    let node_doc = &doc["ownedViews"][0];
    assert_eq!(node_doc["_type"], json!("NodeView"));
    assert_eq!(node_doc["_parent"], json!({ "$ref": diagram.as_str() }));
    assert_eq!(node_doc["width"], json!(100));
    assert!(node_doc.get("minWidth").is_none());
    assert!(node_doc.get("text").is_none());

    let edge_doc = &doc["ownedViews"][2];
    assert_eq!(edge_doc["_type"], json!("EdgeView"));
    assert_eq!(edge_doc["points"], json!("55:66;55:300"));
    assert_eq!(edge_doc["font"], json!("Menlo;11;1"));
    assert_eq!(edge_doc["headEndStyle"], json!("solid-arrow"));
    assert_eq!(edge_doc["lineMode"], json!("dot"));
    assert_eq!(edge_doc["tail"], json!({ "$ref": a.as_str() }));
    assert_eq!(edge_doc["head"], json!({ "$ref": b.as_str() }));
    assert!(edge_doc.get("lineColor").is_none());
    assert!(edge_doc.get("selected").is_none());

    let mut fresh = Repository::new();
    let mut reader = Reader::new();
    let loaded = load_element(&mut fresh, &registry, &doc, &mut reader).unwrap();
    resolve_references(&fresh, &registry, &mut reader);
    assert!(reader.diagnostics.is_empty());
    assert_eq!(loaded, diagram);

    let owned = fresh.get::<Diagram>(&loaded).unwrap().owned_views.clone();
    assert_eq!(owned, vec![a.clone(), b.clone(), edge.clone()]);

    let restored = fresh.get::<EdgeView>(&edge).unwrap();
    assert_eq!(restored.points.points(), [point(55.0, 66.0), point(55.0, 300.0)]);
    assert_eq!(restored.head_end_style, EndStyle::SolidArrow);
    assert_eq!(restored.core.font.to_text(), "Menlo;11;1");
    assert_eq!(restored.core.line_mode, LineMode::Dot);
    assert_eq!(restored.tail, Some(a.clone()));
    assert_eq!(restored.head, Some(b));
    assert_eq!(restored.core.element.parent, Some(diagram));

    let restored_node = fresh.get::<NodeView>(&a).unwrap();
    assert_eq!(restored_node.rect(), rect(0.0, 0.0, 100.0, 60.0));
}
