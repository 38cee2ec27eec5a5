//! Heap box payloads (§3 "Heap box").
//!
//! Every non-scalar `Value` variant is an `Rc`-shaped owning handle to one of
//! these payloads. `Rc::strong_count` stands in for the spec's explicit
//! `strong_ref_count: u32` header field — it is exposed as public API on
//! `std::rc::Rc`, so no hand-rolled unsafe refcounting is needed to satisfy
//! the contract; each payload additionally carries the `gc_marks` half of
//! the header as a plain `Cell<u8>` (single-threaded per request, per §5, so
//! no atomics are required).

use super::{ArrayKey, Value};
use crate::bytecode::CompiledFunction;
use crate::class::{ClassDescriptor, StructDescriptor};
use std::cell::Cell;
use std::rc::Rc;

/// String payload. Immutable after construction (§3 invariant): no
/// interior mutability, no `RefCell`.
#[derive(Debug)]
pub struct StringBox {
    pub bytes: String,
    pub marks: Cell<u8>,
}

impl StringBox {
    pub fn new(s: String) -> Rc<Self> {
        Rc::new(Self { bytes: s, marks: Cell::new(0) })
    }
}

/// Array payload: insertion-ordered `ArrayKey -> Value` mapping with a
/// monotonic `next_index` for positional appends (§3).
#[derive(Debug, Default)]
pub struct ArrayBox {
    pub entries: Vec<(ArrayKey, Value)>,
    pub next_index: i64,
    pub marks: Cell<u8>,
}

impl ArrayBox {
    pub fn new() -> Self {
        Self { entries: Vec::new(), next_index: 0, marks: Cell::new(0) }
    }

    pub fn find(&self, key: &ArrayKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.find(key).map(|i| &self.entries[i].1)
    }

    /// Insert or replace, preserving insertion position on re-assignment
    /// (§3 invariant).
    pub fn set(&mut self, key: ArrayKey, value: Value) {
        if let ArrayKey::Integer(n) = &key {
            if *n >= self.next_index {
                self.next_index = n + 1;
            }
        }
        if let Some(i) = self.find(&key) {
            self.entries[i].1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn push(&mut self, value: Value) -> ArrayKey {
        let key = ArrayKey::Integer(self.next_index);
        self.next_index += 1;
        self.entries.push((key.clone(), value));
        key
    }

    pub fn unset(&mut self, key: &ArrayKey) -> Option<Value> {
        self.find(key).map(|i| self.entries.remove(i).1)
    }

    pub fn deep_clone(&self) -> ArrayBox {
        ArrayBox {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.deep_clone()))
                .collect(),
            next_index: self.next_index,
            marks: Cell::new(0),
        }
    }
}

/// Object payload: class descriptor pointer plus a name -> Value property
/// store (§3). Shape-specialized storage is an optional optimization
/// (§9 design notes) this engine does not implement; a plain map is
/// behaviorally equivalent, which is all the spec requires.
#[derive(Debug)]
pub struct ObjectBox {
    pub class: Rc<ClassDescriptor>,
    pub properties: Vec<(String, Value)>,
    pub marks: Cell<u8>,
}

impl ObjectBox {
    pub fn new(class: Rc<ClassDescriptor>) -> Self {
        let properties = class.all_property_defaults();
        Self { class, properties, marks: Cell::new(0) }
    }

    pub fn get_prop(&self, name: &str) -> Option<&Value> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn set_prop(&mut self, name: &str, value: Value) {
        if let Some(slot) = self.properties.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        } else {
            self.properties.push((name.to_string(), value));
        }
    }

    pub fn unset_prop(&mut self, name: &str) {
        self.properties.retain(|(n, _)| n != name);
    }

    pub fn deep_clone(&self) -> ObjectBox {
        ObjectBox {
            class: self.class.clone(),
            properties: self
                .properties
                .iter()
                .map(|(n, v)| (n.clone(), v.deep_clone()))
                .collect(),
            marks: Cell::new(0),
        }
    }
}

/// Struct payload: descriptor pointer plus a flat field-value slice indexed
/// by declared field position (§3).
#[derive(Debug)]
pub struct StructBox {
    pub descriptor: Rc<StructDescriptor>,
    pub fields: Vec<Value>,
    pub marks: Cell<u8>,
}

impl StructBox {
    pub fn deep_clone(&self) -> StructBox {
        StructBox {
            descriptor: self.descriptor.clone(),
            fields: self.fields.iter().map(Value::deep_clone).collect(),
            marks: Cell::new(0),
        }
    }
}

/// Closure payload: compiled function plus captured-variable bindings and
/// an optional bound `this` (§3).
#[derive(Debug)]
pub struct ClosureBox {
    pub function: Rc<CompiledFunction>,
    pub captures: Vec<Value>,
    pub bound_this: Option<Value>,
    pub marks: Cell<u8>,
}

/// Opaque native resource: type id plus opaque handle (§3).
#[derive(Debug)]
pub struct ResourceBox {
    pub type_id: u32,
    pub handle: usize,
    pub marks: Cell<u8>,
}
