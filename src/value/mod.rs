//! Value & Heap Model (spec §3, §4.1).
//!
//! `Value` is the tagged sum: scalars stored inline, the other five
//! variants are `Rc`-shaped owning handles into the boxes in [`heap`].
//! Coercion and equality rules are ported from vhp's
//! `runtime/value/value_helpers.rs`, generalized onto the new variant set
//! (struct/resource added, Fiber/Generator/EnumCase/Exception dropped as
//! PHP-specific surface outside this engine's scope).

pub mod array_key;
pub mod heap;

pub use array_key::ArrayKey;
pub use heap::{ArrayBox, ClosureBox, ObjectBox, ResourceBox, StringBox, StructBox};

use crate::class::{ClassDescriptor, StructDescriptor};
use std::cell::RefCell;
use std::rc::Rc;

/// Type tag discriminant (§4.5 site histograms key on this).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Null = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Array = 5,
    Object = 6,
    Struct = 7,
    Closure = 8,
    Resource = 9,
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Rc<StringBox>),
    Array(Rc<RefCell<ArrayBox>>),
    Object(Rc<RefCell<ObjectBox>>),
    StructInstance(Rc<RefCell<StructBox>>),
    Closure(Rc<ClosureBox>),
    Resource(Rc<ResourceBox>),
}

impl Value {
    pub fn new_string(s: impl Into<String>) -> Value {
        Value::String(StringBox::new(s.into()))
    }

    pub fn new_array(entries: Vec<(ArrayKey, Value)>) -> Value {
        let mut arr = ArrayBox::new();
        for (k, v) in entries {
            arr.set(k, v);
        }
        Value::Array(Rc::new(RefCell::new(arr)))
    }

    pub fn new_object(class: Rc<ClassDescriptor>) -> Value {
        Value::Object(Rc::new(RefCell::new(ObjectBox::new(class))))
    }

    pub fn new_struct(descriptor: Rc<StructDescriptor>, fields: Vec<Value>) -> Value {
        Value::StructInstance(Rc::new(RefCell::new(heap::StructBox {
            descriptor,
            fields,
            marks: std::cell::Cell::new(0),
        })))
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
            Value::StructInstance(_) => TypeTag::Struct,
            Value::Closure(_) => TypeTag::Closure,
            Value::Resource(_) => TypeTag::Resource,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::StructInstance(_) => "struct",
            Value::Closure(_) => "closure",
            Value::Resource(_) => "resource",
        }
    }

    /// Retain: clone the handle, bumping the heap box's strong ref count
    /// (no-op for scalars). Named to match the spec's retain/release
    /// vocabulary (§4.1 contract) even though it is ordinary `Rc::clone`.
    pub fn retain(&self) -> Value {
        self.clone()
    }

    /// Release: drop the handle. Exists for symmetry with `retain`; taking
    /// `self` by value lets the caller express "I am done with this
    /// reference" explicitly at call sites.
    pub fn release(self) {
        drop(self)
    }

    /// Strong ref count of the underlying heap box, or `None` for scalars.
    pub fn heap_ref_count(&self) -> Option<usize> {
        match self {
            Value::String(r) => Some(Rc::strong_count(r)),
            Value::Array(r) => Some(Rc::strong_count(r)),
            Value::Object(r) => Some(Rc::strong_count(r)),
            Value::StructInstance(r) => Some(Rc::strong_count(r)),
            Value::Closure(r) => Some(Rc::strong_count(r)),
            Value::Resource(r) => Some(Rc::strong_count(r)),
            _ => None,
        }
    }

    /// True if this value is a heap handle shared with another owner
    /// (`cow_check`, §4.1/§4.2).
    pub fn is_shared(&self) -> bool {
        self.heap_ref_count().map(|c| c > 1).unwrap_or(false)
    }

    /// Deep copy, used by `cow_copy` and by array/object `deep_clone`.
    /// Produces a value with disjoint heap identity (§8 round-trip:
    /// `clone(clone(x)) == clone(x)` with disjoint identity).
    pub fn deep_clone(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(n) => Value::Int(*n),
            Value::Float(f) => Value::Float(*f),
            Value::String(s) => Value::String(StringBox::new(s.bytes.clone())),
            Value::Array(a) => Value::Array(Rc::new(RefCell::new(a.borrow().deep_clone()))),
            Value::Object(o) => Value::Object(Rc::new(RefCell::new(o.borrow().deep_clone()))),
            Value::StructInstance(s) => {
                Value::StructInstance(Rc::new(RefCell::new(s.borrow().deep_clone())))
            }
            // Closures are immutable function+captures; PHP clone() of a
            // Closure value is not meaningful, treat as identity copy.
            Value::Closure(c) => Value::Closure(c.clone()),
            Value::Resource(r) => Value::Resource(r.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // ---- Coercions (§4.1) ----

    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.bytes.is_empty() && s.bytes != "0",
            Value::Array(a) => !a.borrow().entries.is_empty(),
            Value::Object(_) | Value::StructInstance(_) | Value::Closure(_) | Value::Resource(_) => true,
        }
    }

    pub fn to_int(&self) -> i64 {
        match self {
            Value::Null => 0,
            Value::Bool(b) => if *b { 1 } else { 0 },
            Value::Int(n) => *n,
            Value::Float(n) => *n as i64,
            Value::String(s) => parse_numeric_prefix(&s.bytes).map(|n| n as i64).unwrap_or(0),
            Value::Array(a) => if a.borrow().entries.is_empty() { 0 } else { 1 },
            Value::Object(_) | Value::StructInstance(_) | Value::Closure(_) | Value::Resource(_) => 1,
        }
    }

    pub fn to_float(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => if *b { 1.0 } else { 0.0 },
            Value::Int(n) => *n as f64,
            Value::Float(n) => *n,
            Value::String(s) => parse_numeric_prefix(&s.bytes).unwrap_or(0.0),
            Value::Array(a) => if a.borrow().entries.is_empty() { 0.0 } else { 1.0 },
            Value::Object(_) | Value::StructInstance(_) | Value::Closure(_) | Value::Resource(_) => 1.0,
        }
    }

    /// Shortest lossless decimal for numbers; `"Array"` for arrays;
    /// `"Object"` for objects unless a `__toString` hook is supplied by the
    /// caller (the VM calls such hooks through the native bridge, §4.1).
    pub fn to_output_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => if *b { "1".to_string() } else { String::new() },
            Value::Int(n) => n.to_string(),
            Value::Float(n) => format_float(*n),
            Value::String(s) => s.bytes.clone(),
            Value::Array(_) => "Array".to_string(),
            Value::Object(_) | Value::StructInstance(_) => "Object".to_string(),
            Value::Closure(_) => "Closure".to_string(),
            Value::Resource(_) => "Resource".to_string(),
        }
    }

    /// Strict equality: same tag and payload-wise equal; heap objects
    /// compare by identity except strings, which compare byte-wise (§4.1).
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a.bytes == b.bytes,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::StructInstance(a), Value::StructInstance(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Resource(a), Value::Resource(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Loose equality: numeric comparison when both sides coerce to
    /// numeric, otherwise string comparison; null equals null and false
    /// (§4.1).
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, Value::Bool(b)) | (Value::Bool(b), Value::Null) => !b,
            (Value::Null, other) | (other, Value::Null) => !other.to_bool(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bool(_), other) | (other, Value::Bool(_)) => self_to_bool_eq(other),
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (Value::String(a), Value::String(b)) => a.bytes == b.bytes,
            (Value::Int(_) | Value::Float(_), Value::String(s))
            | (Value::String(s), Value::Int(_) | Value::Float(_)) => {
                let n = if let Value::Int(_) | Value::Float(_) = self { self.to_float() } else { other.to_float() };
                match parse_numeric_prefix(&s.bytes) {
                    Some(sf) => n == sf,
                    None => false,
                }
            }
            (Value::Array(a), Value::Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                if a.entries.len() != b.entries.len() {
                    return false;
                }
                a.entries
                    .iter()
                    .zip(b.entries.iter())
                    .all(|((k1, v1), (k2, v2))| k1 == k2 && v1.loose_eq(v2))
            }
            (Value::Object(a), Value::Object(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.class.name == b.class.name && a.properties.len() == b.properties.len()
                    && a.properties.iter().zip(b.properties.iter()).all(|((n1, v1), (n2, v2))| n1 == n2 && v1.loose_eq(v2))
            }
            _ => self.to_output_string() == other.to_output_string(),
        }
    }
}

fn self_to_bool_eq(other: &Value) -> bool {
    // When one side is bool, PHP's loose comparison coerces the other side.
    other.to_bool()
}

/// Best-effort numeric parse: non-numeric yields `None` (caller maps to
/// 0/0.0); PHP considers leading-numeric strings like "123abc" numeric for
/// `is_numeric_string`-style checks, but `to_int`/`to_float` only parse a
/// clean numeric literal, matching vhp's `s.parse().unwrap_or(0)` behavior.
fn parse_numeric_prefix(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_eq_null_false() {
        assert!(Value::Null.loose_eq(&Value::Bool(false)));
        assert!(!Value::Null.strict_eq(&Value::Bool(false)));
        assert!(Value::Null.strict_eq(&Value::Null));
    }

    #[test]
    fn to_int_coercions() {
        assert_eq!(Value::Null.to_int(), 0);
        assert_eq!(Value::Bool(true).to_int(), 1);
        assert_eq!(Value::new_string("42").to_int(), 42);
        assert_eq!(Value::new_string("abc").to_int(), 0);
    }

    #[test]
    fn array_to_bool_truthy_iff_nonempty() {
        assert!(!Value::new_array(vec![]).to_bool());
        assert!(Value::new_array(vec![(ArrayKey::Integer(0), Value::Int(1))]).to_bool());
    }

    #[test]
    fn string_is_immutable_after_construction() {
        let s = Value::new_string("abc");
        let s2 = s.clone();
        assert_eq!(s.heap_ref_count(), Some(2));
        drop(s2);
        assert_eq!(s.heap_ref_count(), Some(1));
    }

    #[test]
    fn round_trip_to_string_of_to_int() {
        for n in [-5i64, 0, 1, 42, i64::MAX] {
            let v = Value::Int(n);
            let once = v.to_output_string();
            let back = Value::Int(v.to_int()).to_output_string();
            assert_eq!(once, back);
        }
    }

    #[test]
    fn deep_clone_has_disjoint_identity() {
        let a = Value::new_array(vec![(ArrayKey::Integer(0), Value::Int(1))]);
        let b = a.deep_clone();
        if let (Value::Array(ra), Value::Array(rb)) = (&a, &b) {
            assert!(!Rc::ptr_eq(ra, rb));
        } else {
            panic!("expected arrays");
        }
        assert!(a.loose_eq(&b));
    }
}
