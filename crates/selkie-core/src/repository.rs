//! The element store.
//!
//! All element storage lives here, keyed by [`Id`]; elements refer to each
//! other only through ids. Interior mutability is per element, so borrowing
//! one element never locks its neighbors. Single-threaded by design.

use std::cell::{Ref, RefCell, RefMut};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::element::{AttrValue, Element};
use crate::error::{Error, Result};
use crate::id::Id;
use crate::meta::{AttrKind, Registry};

#[derive(Debug, Default)]
pub struct Repository {
    elements: FxHashMap<Id, RefCell<Box<dyn Element>>>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an element under its own id, replacing any previous occupant.
    pub fn insert(&mut self, element: Box<dyn Element>) -> Id {
        let id = element.core().id.clone();
        self.elements.insert(id.clone(), RefCell::new(element));
        id
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn borrow(&self, id: &Id) -> Result<Ref<'_, dyn Element>> {
        let cell = self
            .elements
            .get(id)
            .ok_or_else(|| Error::MissingElement { id: id.clone() })?;
        let guard = cell
            .try_borrow()
            .map_err(|_| Error::ElementBusy { id: id.clone() })?;
        Ok(Ref::map(guard, |boxed| boxed.as_ref()))
    }

    pub fn borrow_mut(&self, id: &Id) -> Result<RefMut<'_, dyn Element>> {
        let cell = self
            .elements
            .get(id)
            .ok_or_else(|| Error::MissingElement { id: id.clone() })?;
        let guard = cell
            .try_borrow_mut()
            .map_err(|_| Error::ElementBusy { id: id.clone() })?;
        Ok(RefMut::map(guard, |boxed| boxed.as_mut()))
    }

    /// Borrows an element downcast to its concrete type.
    pub fn get<T: Element + 'static>(&self, id: &Id) -> Result<Ref<'_, T>> {
        let guard = self.borrow(id)?;
        Ref::filter_map(guard, |el| el.as_any().downcast_ref::<T>()).map_err(|_| {
            Error::WrongType {
                id: id.clone(),
                expected: std::any::type_name::<T>(),
            }
        })
    }

    pub fn get_mut<T: Element + 'static>(&self, id: &Id) -> Result<RefMut<'_, T>> {
        let guard = self.borrow_mut(id)?;
        RefMut::filter_map(guard, |el| el.as_any_mut().downcast_mut::<T>()).map_err(|_| {
            Error::WrongType {
                id: id.clone(),
                expected: std::any::type_name::<T>(),
            }
        })
    }

    pub fn type_name(&self, id: &Id) -> Option<&'static str> {
        self.borrow(id).ok().map(|el| el.type_name())
    }

    /// Puts `child` into `owner`'s reference or ownership field and points the
    /// child's parent back at the owner.
    pub fn attach(&self, owner: &Id, field: &str, child: &Id) -> Result<()> {
        {
            let mut el = self.borrow_mut(owner)?;
            let updated = match el.attr(field) {
                Some(AttrValue::Refs(mut ids)) => {
                    ids.push(child.clone());
                    el.set_attr(field, AttrValue::Refs(ids))
                }
                Some(AttrValue::Ref(_)) => el.set_attr(field, AttrValue::Ref(Some(child.clone()))),
                _ => false,
            };
            if !updated {
                return Err(Error::WrongAttribute {
                    id: owner.clone(),
                    attr: field.to_string(),
                });
            }
        }
        self.borrow_mut(child)?.core_mut().parent = Some(owner.clone());
        Ok(())
    }

    /// Takes `child` out of `owner`'s field and clears the child's parent.
    pub fn detach(&self, owner: &Id, field: &str, child: &Id) -> Result<()> {
        {
            let mut el = self.borrow_mut(owner)?;
            let updated = match el.attr(field) {
                Some(AttrValue::Refs(mut ids)) => {
                    if let Some(at) = ids.iter().position(|id| id == child) {
                        ids.remove(at);
                    }
                    el.set_attr(field, AttrValue::Refs(ids))
                }
                Some(AttrValue::Ref(Some(current))) if current == *child => {
                    el.set_attr(field, AttrValue::Ref(None))
                }
                Some(AttrValue::Ref(_)) => true,
                _ => false,
            };
            if !updated {
                return Err(Error::WrongAttribute {
                    id: owner.clone(),
                    attr: field.to_string(),
                });
            }
        }
        if let Ok(mut el) = self.borrow_mut(child) {
            el.core_mut().parent = None;
        }
        Ok(())
    }

    /// Removes an element and everything it owns, detaching it from its
    /// owner's collection first. Returns the removed ids, subtree root first.
    ///
    /// References to removed elements elsewhere in the graph are left behind;
    /// consumers treat dangling ids as absent.
    pub fn remove(&mut self, registry: &Registry, id: &Id) -> Result<Vec<Id>> {
        if !self.contains(id) {
            return Err(Error::MissingElement { id: id.clone() });
        }
        if !self.borrow(id)?.can_delete() {
            return Err(Error::Undeletable { id: id.clone() });
        }

        let parent = self.borrow(id)?.parent().cloned();
        if let Some(parent) = parent.filter(|p| self.contains(p)) {
            let owning_field = {
                let owner = self.borrow(&parent)?;
                registry
                    .attrs(owner.type_name())
                    .iter()
                    .filter(|spec| matches!(spec.kind, AttrKind::Obj | AttrKind::ObjList))
                    .find(|spec| match owner.attr(spec.name) {
                        Some(AttrValue::Ref(Some(owned))) => owned == *id,
                        Some(AttrValue::Refs(ids)) => ids.contains(id),
                        _ => false,
                    })
                    .map(|spec| spec.name)
            };
            if let Some(field) = owning_field {
                self.detach(&parent, field, id)?;
            }
        }

        let mut doomed = Vec::new();
        self.traverse(registry, id, &mut |visited| doomed.push(visited.clone()));
        for dead in &doomed {
            self.elements.remove(dead);
        }
        Ok(doomed)
    }

    /// Owned children in schema order.
    pub fn owned_children(&self, registry: &Registry, id: &Id) -> Vec<Id> {
        let Ok(el) = self.borrow(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for spec in registry.attrs(el.type_name()) {
            match spec.kind {
                AttrKind::Obj => {
                    if let Some(AttrValue::Ref(Some(child))) = el.attr(spec.name) {
                        out.push(child);
                    }
                }
                AttrKind::ObjList => {
                    if let Some(AttrValue::Refs(children)) = el.attr(spec.name) {
                        out.extend(children);
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Whole-tree traversal, each node before its children.
    pub fn traverse<F: FnMut(&Id)>(&self, registry: &Registry, root: &Id, visit: &mut F) {
        visit(root);
        for child in self.owned_children(registry, root) {
            self.traverse(registry, &child, visit);
        }
    }

    /// Whole-tree traversal, children before their node.
    pub fn traverse_depth_first<F: FnMut(&Id)>(
        &self,
        registry: &Registry,
        root: &Id,
        visit: &mut F,
    ) {
        for child in self.owned_children(registry, root) {
            self.traverse_depth_first(registry, &child, visit);
        }
        visit(root);
    }

    fn field_children(&self, id: &Id, field: &str) -> Vec<Id> {
        match self.borrow(id).ok().and_then(|el| el.attr(field)) {
            Some(AttrValue::Refs(ids)) => ids,
            Some(AttrValue::Ref(Some(id))) => vec![id],
            _ => Vec::new(),
        }
    }

    /// Single-field-chain traversal, each node before its children.
    pub fn traverse_field<F: FnMut(&Id)>(&self, root: &Id, field: &str, visit: &mut F) {
        visit(root);
        for child in self.field_children(root, field) {
            self.traverse_field(&child, field, visit);
        }
    }

    /// Single-field-chain traversal, children before their node.
    pub fn traverse_field_depth_first<F: FnMut(&Id)>(&self, root: &Id, field: &str, visit: &mut F) {
        for child in self.field_children(root, field) {
            self.traverse_field_depth_first(&child, field, visit);
        }
        visit(root);
    }

    /// First element (in node-before-children order) satisfying `pred`.
    pub fn find<P: Fn(&dyn Element) -> bool>(
        &self,
        registry: &Registry,
        root: &Id,
        pred: &P,
    ) -> Option<Id> {
        if self.borrow(root).is_ok_and(|el| pred(&*el)) {
            return Some(root.clone());
        }
        for child in self.owned_children(registry, root) {
            if let Some(found) = self.find(registry, &child, pred) {
                return Some(found);
            }
        }
        None
    }

    /// First element along a field chain satisfying `pred`.
    pub fn find_field<P: Fn(&dyn Element) -> bool>(
        &self,
        root: &Id,
        field: &str,
        pred: &P,
    ) -> Option<Id> {
        if self.borrow(root).is_ok_and(|el| pred(&*el)) {
            return Some(root.clone());
        }
        for child in self.field_children(root, field) {
            if let Some(found) = self.find_field(&child, field, pred) {
                return Some(found);
            }
        }
        None
    }

    /// Like [`find_field`](Self::find_field), but in children-before-node
    /// order, so the deepest match wins.
    pub fn find_field_depth_first<P: Fn(&dyn Element) -> bool>(
        &self,
        root: &Id,
        field: &str,
        pred: &P,
    ) -> Option<Id> {
        for child in self.field_children(root, field) {
            if let Some(found) = self.find_field_depth_first(&child, field, pred) {
                return Some(found);
            }
        }
        if self.borrow(root).is_ok_and(|el| pred(&*el)) {
            return Some(root.clone());
        }
        None
    }

    /// True when `ancestor` appears on `id`'s parent chain (strictly above
    /// it). Corrupt parent cycles terminate the walk instead of looping.
    pub fn is_ancestor(&self, ancestor: &Id, id: &Id) -> bool {
        let mut seen: FxHashSet<Id> = FxHashSet::default();
        let mut current = self.borrow(id).ok().and_then(|el| el.parent().cloned());
        while let Some(step) = current {
            if step == *ancestor {
                return true;
            }
            if !seen.insert(step.clone()) {
                return false;
            }
            current = self.borrow(&step).ok().and_then(|el| el.parent().cloned());
        }
        false
    }
}
