//! Registry wiring for the view-side types.

use selkie_core::{AttrDefault, AttrSpec, Registry, TypeInfo};

use crate::diagram::Diagram;
use crate::edge::EdgeView;
use crate::node::NodeView;

/// Registers the view-side schemas and enums.
///
/// Call after [`register_model_types`](selkie_core::register_model_types):
/// `View` descends from `Element` and `Diagram` from `ExtensibleModel`.
pub fn register_view_types(registry: &mut Registry) {
    registry.register_enum("Selectability", &["yes", "propagate", "no"]);
    registry.register_enum("LineMode", &["solid", "dot"]);
    registry.register_enum("LineStyle", &["rectilinear", "oblique", "roundrect", "curve"]);
    registry.register_enum("ShapeForm", &["rect", "roundrect", "ellipse", "label"]);
    registry.register_enum(
        "Sizable",
        &["free", "fixed", "horizontal", "vertical", "ratio"],
    );
    registry.register_enum("Movable", &["free", "fixed", "horizontal", "vertical"]);
    registry.register_enum(
        "EndStyle",
        &[
            "flat",
            "stick-arrow",
            "solid-arrow",
            "triangle",
            "filled-triangle",
            "diamond",
            "filled-diamond",
            "arrow-diamond",
            "arrow-filled-diamond",
            "plus",
            "circle",
            "circle-plus",
            "crowfoot-one",
            "crowfoot-many",
            "crowfoot-zero-one",
            "crowfoot-zero-many",
        ],
    );

    registry.register(TypeInfo {
        name: "View",
        parent: Some("Element"),
        attrs: vec![
            AttrSpec::reference("model", "Model").embedded_under("modelEmbedded"),
            AttrSpec::boolean("visible"),
            AttrSpec::boolean("enabled"),
            AttrSpec::boolean("selected").transient(),
            AttrSpec::enumerated("selectable", "Selectability").transient(),
            AttrSpec::string("lineColor").with_default(AttrDefault::Str("#000000")),
            AttrSpec::string("fillColor").with_default(AttrDefault::Str("#ffffff")),
            AttrSpec::string("fontColor").with_default(AttrDefault::Str("#000000")),
            AttrSpec::custom("font", "Font"),
            AttrSpec::boolean("parentStyle"),
            AttrSpec::boolean("showShadow"),
            AttrSpec::boolean("containerChangeable"),
            AttrSpec::boolean("containerExtending"),
            AttrSpec::enumerated("lineMode", "LineMode"),
            AttrSpec::number("zIndex"),
            AttrSpec::owned_list("subViews", "View"),
            AttrSpec::reference("containerView", "View"),
            AttrSpec::reference_list("containedViews", "View"),
        ],
        factory: None,
    });
    registry.register(TypeInfo {
        name: "NodeView",
        parent: Some("View"),
        attrs: vec![
            AttrSpec::number("left"),
            AttrSpec::number("top"),
            AttrSpec::number("width"),
            AttrSpec::number("height"),
            AttrSpec::number("minWidth").transient(),
            AttrSpec::number("minHeight").transient(),
            AttrSpec::boolean("autoResize"),
            AttrSpec::enumerated("shape", "ShapeForm"),
            AttrSpec::string("text"),
            AttrSpec::boolean("wordWrap"),
            AttrSpec::enumerated("sizable", "Sizable").transient(),
            AttrSpec::enumerated("movable", "Movable").transient(),
        ],
        factory: Some(|| Box::new(NodeView::new())),
    });
    registry.register(TypeInfo {
        name: "EdgeView",
        parent: Some("View"),
        attrs: vec![
            AttrSpec::reference("head", "View"),
            AttrSpec::reference("tail", "View"),
            AttrSpec::enumerated("lineStyle", "LineStyle"),
            AttrSpec::enumerated("headEndStyle", "EndStyle"),
            AttrSpec::enumerated("tailEndStyle", "EndStyle"),
            AttrSpec::custom("points", "Points"),
        ],
        factory: Some(|| Box::new(EdgeView::new())),
    });
    registry.register(TypeInfo {
        name: "Diagram",
        parent: Some("ExtensibleModel"),
        attrs: vec![
            AttrSpec::boolean("defaultDiagram"),
            AttrSpec::owned_list("ownedViews", "View"),
            AttrSpec::reference_list("selectedViews", "View").transient(),
        ],
        factory: Some(|| Box::new(Diagram::new())),
    });
}
