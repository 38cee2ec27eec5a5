//! Array key type — ported from vhp's `runtime/value/array_key.rs`,
//! trimmed to the variants this engine's `Value` actually has.

use super::Value;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub enum ArrayKey {
    Integer(i64),
    String(String),
}

impl PartialEq for ArrayKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArrayKey::Integer(a), ArrayKey::Integer(b)) => a == b,
            (ArrayKey::String(a), ArrayKey::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ArrayKey {}

impl Hash for ArrayKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ArrayKey::Integer(n) => {
                0u8.hash(state);
                n.hash(state);
            }
            ArrayKey::String(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Integer(n) => write!(f, "{}", n),
            ArrayKey::String(s) => write!(f, "{}", s),
        }
    }
}

impl ArrayKey {
    /// Coerce a `Value` into an array key. Integer-looking strings fold into
    /// integer keys, matching PHP's array-key semantics the teacher's
    /// `ArrayKey::from_value` implements.
    pub fn from_value(value: &Value) -> ArrayKey {
        match value {
            Value::Int(n) => ArrayKey::Integer(*n),
            Value::Float(n) => ArrayKey::Integer(*n as i64),
            Value::Bool(b) => ArrayKey::Integer(if *b { 1 } else { 0 }),
            Value::Null => ArrayKey::String(String::new()),
            Value::String(s) => {
                let text = s.bytes.as_str();
                if let Ok(n) = text.parse::<i64>() {
                    if n.to_string() == text {
                        return ArrayKey::Integer(n);
                    }
                }
                ArrayKey::String(text.to_string())
            }
            _ => ArrayKey::String(value.to_output_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ArrayKey::Integer(n) => Value::Int(*n),
            ArrayKey::String(s) => Value::new_string(s.clone()),
        }
    }
}
