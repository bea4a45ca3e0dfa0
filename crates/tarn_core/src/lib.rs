//! Tarn runtime surface consumed by native binding modules.
//!
//! A binding module sees the runtime through three primitives: tagged dynamic
//! [`Value`]s, a tracked heap of foreign cells reclaimed by the collector, and
//! the native call convention (`Result` carrying either returned values or a
//! raised error message).

#![allow(clippy::new_without_default)]

mod heap;
mod registry;
mod value;
mod vm;

pub use heap::{ForeignCell, Heap, ObjectId};
pub use registry::{CapabilityTable, FinalizeFn, Op, OperatorTable, Registry};
pub use value::{ret0, ret1, NativeFn, Ret, Value};
pub use vm::Vm;

/// Format the typed argument error raised when a parameter has the wrong
/// shape. `pos` is 1-based, matching how scripts count arguments.
pub fn type_error(pos: usize, expected: &str, got: &str) -> String {
    format!("bad argument #{pos} ({expected} expected, got {got})")
}
