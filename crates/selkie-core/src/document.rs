//! Generic document save/load.
//!
//! Documents are nested JSON objects. Every node carries `_type`, `_id`, and
//! `_parent` (as a `$ref`), followed by the schema attributes in declared
//! order, ancestors first. Non-owning references serialize as
//! `{"$ref": "<id>"}` and stay unresolved until [`resolve_references`] maps
//! them through the reader's id map.
//!
//! Malformed content is never an error: the offending field or node is
//! skipped, a [`DocWarning`] lands in the diagnostics sink, and the load
//! carries on with whatever remains.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::element::{AttrValue, Element};
use crate::id::Id;
use crate::meta::{AttrKind, AttrSpec, PrimKind, Registry};
use crate::repository::Repository;

/// One structured warning from a save, load, or resolve pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DocWarning {
    pub element: Option<Id>,
    pub field: Option<String>,
    pub message: String,
}

/// Collects [`DocWarning`]s; every warning is also emitted through `tracing`.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<DocWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, element: Option<&Id>, field: Option<&str>, message: impl Into<String>) {
        let warning = DocWarning {
            element: element.cloned(),
            field: field.map(str::to_string),
            message: message.into(),
        };
        tracing::warn!(
            element = ?warning.element,
            field = ?warning.field,
            "{}",
            warning.message
        );
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[DocWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}

/// Accumulates document-id to live-id mappings across one load session,
/// plus the structured warnings it produced.
#[derive(Debug, Default)]
pub struct Reader {
    id_map: FxHashMap<Id, Id>,
    loaded: Vec<Id>,
    pub diagnostics: Diagnostics,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, doc_id: Id, live_id: Id) {
        self.id_map.insert(doc_id, live_id);
    }

    pub fn lookup(&self, doc_id: &Id) -> Option<&Id> {
        self.id_map.get(doc_id)
    }

    /// Elements created by this reader, in load order.
    pub fn loaded(&self) -> &[Id] {
        &self.loaded
    }
}

/// JSON cursor; nested objects are written by swapping the cursor for the
/// scope of a closure and restoring it afterwards.
struct Writer<'d> {
    current: Map<String, Value>,
    diags: &'d mut Diagnostics,
}

impl Writer<'_> {
    fn nested(&mut self, f: impl FnOnce(&mut Self)) -> Value {
        let saved = std::mem::take(&mut self.current);
        f(self);
        Value::Object(std::mem::replace(&mut self.current, saved))
    }

    fn write_value(&mut self, name: &str, value: Value) {
        self.current.insert(name.to_string(), value);
    }

    fn write_string(&mut self, name: &str, value: &str) {
        self.write_value(name, Value::String(value.to_string()));
    }

    fn write_ref(&mut self, name: &str, id: &Id) {
        self.write_value(name, ref_value(id));
    }
}

fn ref_value(id: &Id) -> Value {
    serde_json::json!({ "$ref": id.as_str() })
}

fn ref_id(value: &Value) -> Option<Id> {
    let raw = value.as_object()?.get("$ref")?.as_str()?;
    if raw.is_empty() {
        return None;
    }
    Some(Id::from(raw))
}

/// Whole numbers are written as integers so documents stay stable under the
/// integer quantization the view layer applies to geometry.
fn json_number(n: f64) -> Option<serde_json::Number> {
    if n.is_finite() && n.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(&n) {
        Some(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
    }
}

/// Serializes an element and everything it owns into a document node.
pub fn save_element(
    repo: &Repository,
    registry: &Registry,
    id: &Id,
    diags: &mut Diagnostics,
) -> Option<Value> {
    if !repo.contains(id) {
        diags.warn(Some(id), None, "cannot save: no such element");
        return None;
    }
    let mut writer = Writer {
        current: Map::new(),
        diags,
    };
    save_into(repo, registry, id, &mut writer);
    Some(Value::Object(writer.current))
}

fn save_into(repo: &Repository, registry: &Registry, id: &Id, w: &mut Writer<'_>) {
    let el = match repo.borrow(id) {
        Ok(el) => el,
        Err(err) => {
            w.diags.warn(Some(id), None, format!("element skipped: {err}"));
            return;
        }
    };
    w.write_string("_type", el.type_name());
    w.write_string("_id", el.id().as_str());
    if let Some(parent) = el.parent() {
        w.write_ref("_parent", parent);
    }
    for spec in registry.attrs(el.type_name()) {
        if spec.transient {
            continue;
        }
        let Some(value) = el.attr(spec.name) else {
            w.diags.warn(
                Some(id),
                Some(spec.name),
                "schema attribute not exposed by the element; skipped",
            );
            continue;
        };
        save_attr(repo, registry, &*el, spec, value, w);
    }
}

fn save_attr(
    repo: &Repository,
    registry: &Registry,
    el: &dyn Element,
    spec: &AttrSpec,
    value: AttrValue,
    w: &mut Writer<'_>,
) {
    match (spec.kind, value) {
        (AttrKind::Prim(PrimKind::String), AttrValue::Str(s)) => {
            if !s.is_empty() && s != spec.default_str() {
                w.write_string(spec.name, &s);
            }
        }
        (AttrKind::Prim(PrimKind::Number), AttrValue::Num(n)) => match json_number(n) {
            Some(num) => w.write_value(spec.name, Value::Number(num)),
            None => w.diags.warn(
                Some(el.id()),
                Some(spec.name),
                "non-finite number skipped",
            ),
        },
        (AttrKind::Prim(PrimKind::Boolean), AttrValue::Bool(b)) => {
            w.write_value(spec.name, Value::Bool(b));
        }
        (AttrKind::Enum, AttrValue::Lit(s)) => w.write_string(spec.name, &s),
        (AttrKind::Custom, AttrValue::Custom(s)) => {
            if !s.is_empty() {
                w.write_string(spec.name, &s);
            }
        }
        (AttrKind::Ref, AttrValue::Ref(Some(target))) => {
            w.write_ref(spec.name, &target);
            // A referent this element privately owns rides along under the
            // paired field.
            if let Some(pair) = spec.embedded {
                let owned_here = repo
                    .borrow(&target)
                    .is_ok_and(|t| t.parent() == Some(el.id()));
                if owned_here {
                    let nested = w.nested(|w| save_into(repo, registry, &target, w));
                    w.write_value(pair, nested);
                }
            }
        }
        (AttrKind::Ref, AttrValue::Ref(None)) => {}
        (AttrKind::RefList, AttrValue::Refs(ids)) => {
            if !ids.is_empty() {
                let items = ids.iter().map(ref_value).collect();
                w.write_value(spec.name, Value::Array(items));
            }
        }
        (AttrKind::Obj, AttrValue::Ref(Some(child))) => {
            let nested = w.nested(|w| save_into(repo, registry, &child, w));
            w.write_value(spec.name, nested);
        }
        (AttrKind::Obj, AttrValue::Ref(None)) => {}
        (AttrKind::ObjList, AttrValue::Refs(children)) => {
            if !children.is_empty() {
                let items = children
                    .iter()
                    .map(|child| w.nested(|w| save_into(repo, registry, child, w)))
                    .collect();
                w.write_value(spec.name, Value::Array(items));
            }
        }
        (AttrKind::Variant, value) => match value {
            AttrValue::Null | AttrValue::Ref(None) => {}
            AttrValue::Bool(b) => w.write_value(spec.name, Value::Bool(b)),
            AttrValue::Num(n) => match json_number(n) {
                Some(num) => w.write_value(spec.name, Value::Number(num)),
                None => w.diags.warn(
                    Some(el.id()),
                    Some(spec.name),
                    "non-finite number skipped",
                ),
            },
            AttrValue::Str(s) => w.write_string(spec.name, &s),
            AttrValue::Ref(Some(id)) => w.write_ref(spec.name, &id),
            other => w.diags.warn(
                Some(el.id()),
                Some(spec.name),
                format!("variant holds unsupported shape {other:?}; skipped"),
            ),
        },
        (kind, other) => w.diags.warn(
            Some(el.id()),
            Some(spec.name),
            format!("expected a {kind:?} value, found {other:?}; skipped"),
        ),
    }
}

/// Instantiates one document node (and everything embedded in it) into the
/// repository. Reference attributes keep their document ids until
/// [`resolve_references`] runs.
///
/// Returns the live id, or `None` when the node is beyond repair.
pub fn load_element(
    repo: &mut Repository,
    registry: &Registry,
    value: &Value,
    reader: &mut Reader,
) -> Option<Id> {
    let Some(obj) = value.as_object() else {
        reader
            .diagnostics
            .warn(None, None, "document node is not an object; skipped");
        return None;
    };
    let Some(type_name) = obj.get("_type").and_then(Value::as_str) else {
        reader
            .diagnostics
            .warn(None, None, "document node has no _type; skipped");
        return None;
    };
    let Some(mut el) = registry.instantiate(type_name) else {
        reader.diagnostics.warn(
            None,
            None,
            format!("unknown or abstract type {type_name:?}; node skipped"),
        );
        return None;
    };
    let type_name = el.type_name();

    let live_id = match obj.get("_id").and_then(Value::as_str) {
        Some(doc_id) if !doc_id.is_empty() => {
            let doc_id = Id::from(doc_id);
            // Keep document ids verbatim unless they would collide with a
            // live element (merge loads).
            let live = if repo.contains(&doc_id) {
                Id::generate()
            } else {
                doc_id.clone()
            };
            reader.register(doc_id, live.clone());
            live
        }
        _ => {
            let fresh = Id::generate();
            reader
                .diagnostics
                .warn(Some(&fresh), None, "document node has no _id; fresh id assigned");
            fresh
        }
    };
    el.core_mut().id = live_id;
    if let Some(parent) = obj.get("_parent").and_then(ref_id) {
        // Raw document id; fixed up by the resolve pass.
        el.core_mut().parent = Some(parent);
    }

    let mut owned_children = Vec::new();
    for spec in registry.attrs(type_name) {
        if spec.transient {
            continue;
        }
        load_attr(repo, registry, obj, spec, el.as_mut(), reader, &mut owned_children);
    }

    let id = repo.insert(el);
    for child in owned_children {
        if let Ok(mut child_el) = repo.borrow_mut(&child) {
            child_el.core_mut().parent = Some(id.clone());
        }
    }
    reader.loaded.push(id.clone());
    Some(id)
}

fn load_attr(
    repo: &mut Repository,
    registry: &Registry,
    obj: &Map<String, Value>,
    spec: &AttrSpec,
    el: &mut dyn Element,
    reader: &mut Reader,
    owned_children: &mut Vec<Id>,
) {
    match spec.kind {
        AttrKind::Prim(PrimKind::String) => match obj.get(spec.name) {
            Some(Value::String(s)) => apply(el, spec, AttrValue::Str(s.clone()), reader),
            Some(other) => warn_shape(el, spec, other, reader),
            None => {}
        },
        AttrKind::Prim(PrimKind::Number) => match obj.get(spec.name) {
            Some(value) => match value.as_f64() {
                Some(n) => apply(el, spec, AttrValue::Num(n), reader),
                None => warn_shape(el, spec, value, reader),
            },
            None => {}
        },
        AttrKind::Prim(PrimKind::Boolean) => match obj.get(spec.name) {
            Some(Value::Bool(b)) => apply(el, spec, AttrValue::Bool(*b), reader),
            Some(other) => warn_shape(el, spec, other, reader),
            None => {}
        },
        AttrKind::Enum => match obj.get(spec.name) {
            Some(Value::String(s)) => {
                if let Some(literals) = registry.enum_literals(spec.target) {
                    if !literals.contains(&s.as_str()) {
                        reader.diagnostics.warn(
                            Some(&el.core().id),
                            Some(spec.name),
                            format!("unknown {} literal {s:?}; keeping default", spec.target),
                        );
                        return;
                    }
                }
                apply(el, spec, AttrValue::Lit(s.clone()), reader);
            }
            Some(other) => warn_shape(el, spec, other, reader),
            None => {}
        },
        AttrKind::Custom => match obj.get(spec.name) {
            Some(Value::String(s)) => apply(el, spec, AttrValue::Custom(s.clone()), reader),
            Some(other) => warn_shape(el, spec, other, reader),
            None => {}
        },
        AttrKind::Variant => match obj.get(spec.name) {
            None | Some(Value::Null) => {}
            Some(Value::Bool(b)) => apply(el, spec, AttrValue::Bool(*b), reader),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(n) => apply(el, spec, AttrValue::Num(n), reader),
                None => {}
            },
            Some(Value::String(s)) => apply(el, spec, AttrValue::Str(s.clone()), reader),
            Some(value @ Value::Object(_)) => match ref_id(value) {
                Some(raw) => apply(el, spec, AttrValue::Ref(Some(raw)), reader),
                None => warn_shape(el, spec, value, reader),
            },
            Some(other) => warn_shape(el, spec, other, reader),
        },
        AttrKind::Ref => {
            // An embedded referent is loaded first so the id map can resolve
            // the reference that follows.
            if let Some(pair) = spec.embedded {
                if let Some(sub) = obj.get(pair) {
                    load_element(repo, registry, sub, reader);
                }
            }
            match obj.get(spec.name) {
                Some(value) => match ref_id(value) {
                    Some(raw) => apply(el, spec, AttrValue::Ref(Some(raw)), reader),
                    None => warn_shape(el, spec, value, reader),
                },
                None => {
                    // The document dropped the reference: keep the previous
                    // referent reachable for later $refs to its id.
                    if let Some(AttrValue::Ref(Some(previous))) = el.attr(spec.name) {
                        reader.register(previous.clone(), previous);
                    }
                }
            }
        }
        AttrKind::RefList => match obj.get(spec.name) {
            Some(Value::Array(items)) => {
                let mut ids = Vec::with_capacity(items.len());
                for item in items {
                    match ref_id(item) {
                        Some(raw) => ids.push(raw),
                        None => warn_shape(el, spec, item, reader),
                    }
                }
                apply(el, spec, AttrValue::Refs(ids), reader);
            }
            Some(other) => warn_shape(el, spec, other, reader),
            None => {}
        },
        AttrKind::Obj => {
            if let Some(sub) = obj.get(spec.name) {
                if let Some(child) = load_element(repo, registry, sub, reader) {
                    apply(el, spec, AttrValue::Ref(Some(child.clone())), reader);
                    owned_children.push(child);
                }
            }
        }
        AttrKind::ObjList => match obj.get(spec.name) {
            Some(Value::Array(items)) => {
                // Appends to whatever the element already holds, so merge
                // loads accumulate.
                let mut ids = match el.attr(spec.name) {
                    Some(AttrValue::Refs(ids)) => ids,
                    _ => Vec::new(),
                };
                for item in items {
                    if let Some(child) = load_element(repo, registry, item, reader) {
                        ids.push(child.clone());
                        owned_children.push(child);
                    }
                }
                apply(el, spec, AttrValue::Refs(ids), reader);
            }
            Some(other) => warn_shape(el, spec, other, reader),
            None => {}
        },
    }
}

fn apply(el: &mut dyn Element, spec: &AttrSpec, value: AttrValue, reader: &mut Reader) {
    if !el.set_attr(spec.name, value) {
        let id = el.core().id.clone();
        reader.diagnostics.warn(
            Some(&id),
            Some(spec.name),
            "element rejected the value; keeping default",
        );
    }
}

fn warn_shape(el: &dyn Element, spec: &AttrSpec, found: &Value, reader: &mut Reader) {
    reader.diagnostics.warn(
        Some(el.id()),
        Some(spec.name),
        format!("unexpected value shape for {:?} attribute: {found}", spec.kind),
    );
}

/// Substitutes every reference (and parent back-reference) loaded by `reader`
/// through its id map. Ids that map to nothing and match no live element are
/// cleared with a warning.
pub fn resolve_references(repo: &Repository, registry: &Registry, reader: &mut Reader) {
    let loaded = reader.loaded.clone();
    for id in &loaded {
        let Some(type_name) = repo.type_name(id) else {
            continue;
        };

        let parent = repo.borrow(id).ok().and_then(|el| el.parent().cloned());
        if let Some(raw) = parent {
            match map_ref(repo, reader, &raw) {
                Some(live) => {
                    if live != raw {
                        if let Ok(mut el) = repo.borrow_mut(id) {
                            el.core_mut().parent = Some(live);
                        }
                    }
                }
                None => {
                    reader.diagnostics.warn(
                        Some(id),
                        Some("_parent"),
                        format!("unresolved parent {raw}; cleared"),
                    );
                    if let Ok(mut el) = repo.borrow_mut(id) {
                        el.core_mut().parent = None;
                    }
                }
            }
        }

        for spec in registry.attrs(type_name) {
            match spec.kind {
                AttrKind::Ref | AttrKind::Variant => {
                    let current = repo.borrow(id).ok().and_then(|el| el.attr(spec.name));
                    if let Some(AttrValue::Ref(Some(raw))) = current {
                        match map_ref(repo, reader, &raw) {
                            Some(live) => {
                                if live != raw {
                                    if let Ok(mut el) = repo.borrow_mut(id) {
                                        el.set_attr(spec.name, AttrValue::Ref(Some(live)));
                                    }
                                }
                            }
                            None => {
                                reader.diagnostics.warn(
                                    Some(id),
                                    Some(spec.name),
                                    format!("unresolved reference {raw}; cleared"),
                                );
                                if let Ok(mut el) = repo.borrow_mut(id) {
                                    el.set_attr(spec.name, AttrValue::Ref(None));
                                }
                            }
                        }
                    }
                }
                AttrKind::RefList => {
                    let current = repo.borrow(id).ok().and_then(|el| el.attr(spec.name));
                    if let Some(AttrValue::Refs(raw_ids)) = current {
                        let mut live_ids = Vec::with_capacity(raw_ids.len());
                        for raw in &raw_ids {
                            match map_ref(repo, reader, raw) {
                                Some(live) => live_ids.push(live),
                                None => reader.diagnostics.warn(
                                    Some(id),
                                    Some(spec.name),
                                    format!("unresolved reference {raw}; dropped"),
                                ),
                            }
                        }
                        if live_ids != raw_ids {
                            if let Ok(mut el) = repo.borrow_mut(id) {
                                el.set_attr(spec.name, AttrValue::Refs(live_ids));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn map_ref(repo: &Repository, reader: &Reader, raw: &Id) -> Option<Id> {
    if let Some(live) = reader.lookup(raw) {
        return Some(live.clone());
    }
    if repo.contains(raw) {
        return Some(raw.clone());
    }
    None
}
