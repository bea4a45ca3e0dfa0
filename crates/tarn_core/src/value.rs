//! Runtime value representation.

use crate::heap::ObjectId;
use crate::vm::Vm;
use smallvec::SmallVec;
use std::rc::Rc;

/// Values returned from a native call. Built whole and handed back in one
/// piece, so a raised error never leaves a half-written result behind.
pub type Ret = SmallVec<[Value; 3]>;

/// Native call convention: arguments in, returned values or a raised error
/// message out. The embedding runtime turns the `Err` into an error that
/// unwinds to the script's nearest protected call.
pub type NativeFn = fn(&mut Vm, &[Value]) -> Result<Ret, String>;

/// Tagged dynamic value.
///
/// `Foreign` is a handle into the tracked heap; the payload type is recovered
/// through the cell's capability-table tag, never through the handle itself.
#[derive(Clone, Debug)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Foreign(ObjectId),
    Native(NativeFn),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_foreign_id(&self) -> Option<ObjectId> {
        match self {
            Value::Foreign(id) => Some(*id),
            _ => None,
        }
    }

    /// Script-facing name of the value's shape. Foreign values report the
    /// registered type name when a [`Vm`] is at hand; see [`Vm::shape_name`].
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Foreign(_) => "userdata",
            Value::Native(_) => "function",
        }
    }
}

/// Single-value return.
pub fn ret1(v: Value) -> Ret {
    let mut r = Ret::new();
    r.push(v);
    r
}

/// Empty return for void operations.
pub fn ret0() -> Ret {
    Ret::new()
}
