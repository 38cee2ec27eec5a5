//! Class and struct descriptors.
//!
//! Trimmed from vhp's `vm/class.rs` `CompiledClass` — kept: name, parent,
//! interfaces, method table, property defaults (what the interpreter core
//! actually dispatches and instantiates on). Dropped: traits, attributes,
//! abstract/final flags, visibility tracking, static properties — those
//! belong to the compiler front end and reflection layer, out of scope
//! here (§1 non-goals).

use crate::bytecode::CompiledFunction;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct ClassDescriptor {
    pub name: String,
    pub id: u32,
    pub parent: Option<Rc<ClassDescriptor>>,
    pub interfaces: Vec<String>,
    pub methods: HashMap<String, Rc<CompiledFunction>>,
    pub property_defaults: Vec<(String, Value)>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
            parent: None,
            interfaces: Vec::new(),
            methods: HashMap::new(),
            property_defaults: Vec::new(),
        }
    }

    /// Walk self + parent chain, PHP's normal method-resolution order.
    /// Mirrors vhp's `find_method_in_chain` (`vm/methods.rs`) minus the
    /// trait-composition step, which belongs to the compiler front end.
    pub fn resolve_method(&self, name: &str) -> Option<Rc<CompiledFunction>> {
        if let Some(m) = self.methods.get(name) {
            return Some(m.clone());
        }
        self.parent.as_ref().and_then(|p| p.resolve_method(name))
    }

    pub fn is_instance_of(&self, class_name: &str) -> bool {
        if self.name.eq_ignore_ascii_case(class_name) {
            return true;
        }
        if self.interfaces.iter().any(|i| i.eq_ignore_ascii_case(class_name)) {
            return true;
        }
        self.parent.as_ref().map(|p| p.is_instance_of(class_name)).unwrap_or(false)
    }

    /// Property defaults including inherited ones, parent-first so a
    /// subclass's own defaults win on name collision.
    pub fn all_property_defaults(&self) -> Vec<(String, Value)> {
        let mut defaults = self
            .parent
            .as_ref()
            .map(|p| p.all_property_defaults())
            .unwrap_or_default();
        for (name, value) in &self.property_defaults {
            if let Some(slot) = defaults.iter_mut().find(|(n, _)| n == name) {
                slot.1 = value.clone();
            } else {
                defaults.push((name.clone(), value.clone()));
            }
        }
        defaults
    }
}

/// Struct descriptor: flat, closed field list (§3 — "struct's field slice
/// length equals the descriptor's declared arity").
#[derive(Debug)]
pub struct StructDescriptor {
    pub name: String,
    pub id: u32,
    pub field_names: Vec<String>,
}

impl StructDescriptor {
    pub fn new(name: impl Into<String>, id: u32, field_names: Vec<String>) -> Self {
        Self { name: name.into(), id, field_names }
    }

    pub fn arity(&self) -> usize {
        self.field_names.len()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_names.iter().position(|n| n == name)
    }
}
