//! Field snapshots and diffing.
//!
//! A memento is a plain JSON map of an element's simple fields (primitives,
//! enums, custom forms). Owned objects and references do not participate;
//! structural changes are the repository's business, not the memento's.

use serde_json::Value;

use crate::element::{AttrValue, Element};
use crate::id::Id;
use crate::meta::{AttrKind, AttrSpec, PrimKind, Registry};

pub type Memento = serde_json::Map<String, Value>;

/// One changed field between an element and a memento.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDelta {
    pub element: Id,
    pub field: String,
    pub new_value: Value,
    pub old_value: Value,
}

fn participates(spec: &AttrSpec) -> bool {
    matches!(
        spec.kind,
        AttrKind::Prim(_) | AttrKind::Enum | AttrKind::Custom
    )
}

/// Copies the element's simple fields into `memento`.
pub fn assign_to(registry: &Registry, el: &dyn Element, memento: &mut Memento) {
    for spec in registry.attrs(el.type_name()) {
        if !participates(spec) {
            continue;
        }
        if let Some(value) = el.attr(spec.name) {
            memento.insert(spec.name.to_string(), value.to_json());
        }
    }
}

/// Restores the element's simple fields from `memento`. Fields the memento
/// does not carry are left alone.
pub fn assign_from(registry: &Registry, memento: &Memento, el: &mut dyn Element) {
    for spec in registry.attrs(el.type_name()) {
        if !participates(spec) {
            continue;
        }
        let Some(value) = memento.get(spec.name) else {
            continue;
        };
        if let Some(value) = attr_from_json(spec, value) {
            el.set_attr(spec.name, value);
        }
    }
}

/// Simple fields whose current value differs from the memento's, in schema
/// order. Empty when nothing changed.
pub fn diff(registry: &Registry, el: &dyn Element, memento: &Memento) -> Vec<FieldDelta> {
    let mut deltas = Vec::new();
    for spec in registry.attrs(el.type_name()) {
        if !participates(spec) {
            continue;
        }
        let current = el
            .attr(spec.name)
            .map(|v| v.to_json())
            .unwrap_or(Value::Null);
        let snapshot = memento.get(spec.name).cloned().unwrap_or(Value::Null);
        if current != snapshot {
            deltas.push(FieldDelta {
                element: el.id().clone(),
                field: spec.name.to_string(),
                new_value: current,
                old_value: snapshot,
            });
        }
    }
    deltas
}

fn attr_from_json(spec: &AttrSpec, value: &Value) -> Option<AttrValue> {
    match (spec.kind, value) {
        (AttrKind::Prim(PrimKind::String), Value::String(s)) => Some(AttrValue::Str(s.clone())),
        (AttrKind::Prim(PrimKind::Number), v) => v.as_f64().map(AttrValue::Num),
        (AttrKind::Prim(PrimKind::Boolean), Value::Bool(b)) => Some(AttrValue::Bool(*b)),
        (AttrKind::Enum, Value::String(s)) => Some(AttrValue::Lit(s.clone())),
        (AttrKind::Custom, Value::String(s)) => Some(AttrValue::Custom(s.clone())),
        _ => None,
    }
}
