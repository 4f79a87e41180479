//! End-to-end frames through the facade: model-bound views rendered to SVG,
//! engine-driven layout copied back into view geometry.

use selkie::layout::{LayeredEngine, RankDir, Separations};
use selkie::view::geom::point;
use selkie::view::{
    Diagram, EdgeView, EndStyle, LineStyle, NodeView, SvgCanvas, draw_diagram, layout_diagram,
};
use selkie::{Id, Model, Repository};

fn node(repo: &mut Repository, left: f64, top: f64, width: f64, height: f64) -> Id {
    let mut view = NodeView::new();
    view.left = left;
    view.top = top;
    view.width = width;
    view.height = height;
    repo.insert(Box::new(view))
}

#[test]
fn a_model_bound_frame_renders_to_svg() {
    let mut repo = Repository::new();
    let customer = repo.insert(Box::new(Model::named("Customer")));
    let a = node(&mut repo, 0.0, 0.0, 100.0, 60.0);
    repo.get_mut::<NodeView>(&a).unwrap().core.model = Some(customer);
    let b = node(&mut repo, 200.0, 0.0, 100.0, 60.0);
    let mut edge = EdgeView::new();
    edge.tail = Some(a.clone());
    edge.head = Some(b.clone());
    edge.head_end_style = EndStyle::StickArrow;
    let edge = repo.insert(Box::new(edge));

    let diagram = repo.insert(Box::new(Diagram::named("main")));
    for view in [&a, &b, &edge] {
        repo.attach(&diagram, "ownedViews", view).unwrap();
    }

    let mut canvas = SvgCanvas::new();
    draw_diagram(&repo, &mut canvas, &diagram, false).unwrap();
    let svg = canvas.finish(400.0, 300.0);

    assert!(svg.starts_with(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"300\" viewBox=\"0 0 400 300\">\n"
    ));
    assert!(svg.ends_with("</svg>\n"));
    // The update phase pulled the bound model's name into the node text.
    assert!(svg.contains(">Customer</text>"));
    assert!(svg.contains(
        "<rect x=\"0\" y=\"0\" width=\"100\" height=\"60\" fill=\"#ffffff\" stroke=\"none\"/>"
    ));
    // The arrange phase routed the connector between the node boundaries.
    assert!(svg.contains(
        "<polyline points=\"100,30 200,30\" fill=\"none\" stroke=\"#000000\" stroke-width=\"1\"/>"
    ));
}

#[test]
fn an_unroutable_edge_does_not_take_the_frame_down() {
    let mut repo = Repository::new();
    let a = node(&mut repo, 0.0, 0.0, 100.0, 60.0);
    let mut dangling = EdgeView::new();
    dangling.tail = Some(a.clone());
    let dangling = repo.insert(Box::new(dangling));

    let diagram = repo.insert(Box::new(Diagram::named("main")));
    repo.attach(&diagram, "ownedViews", &a).unwrap();
    repo.attach(&diagram, "ownedViews", &dangling).unwrap();

    let mut canvas = SvgCanvas::new();
    draw_diagram(&repo, &mut canvas, &diagram, false).unwrap();
    let svg = canvas.finish(200.0, 100.0);
    assert!(svg.contains("<rect"));
    assert!(!svg.contains("<polyline"));
}

#[test]
fn engine_layout_lands_in_view_geometry() {
    let mut repo = Repository::new();
    let a = node(&mut repo, 300.0, 300.0, 100.0, 60.0);
    let b = node(&mut repo, 700.0, 40.0, 80.0, 40.0);
    let mut edge = EdgeView::new();
    edge.tail = Some(a.clone());
    edge.head = Some(b.clone());
    let edge = repo.insert(Box::new(edge));

    let diagram = repo.insert(Box::new(Diagram::named("main")));
    for view in [&a, &b, &edge] {
        repo.attach(&diagram, "ownedViews", view).unwrap();
    }

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
    let routed = repo.get::<EdgeView>(&edge).unwrap();
    assert_eq!(routed.line_style, LineStyle::Curve);
    assert_eq!(routed.points.points(), [point(50.0, 30.0), point(50.0, 130.0)]);
}
