//! Capability tables: per-type operator and method entry points.
//!
//! Tables are installed once during module initialization and never mutated
//! afterwards. Scripts reach methods only through the dispatcher, so method
//! resolution cannot be rewritten at runtime.

use crate::value::NativeFn;
use ahash::RandomState;
use hashbrown::HashMap;
use std::any::Any;

/// Finalizer entry point: consumes the cell payload when the collector
/// reclaims the slot. Must not raise.
pub type FinalizeFn = fn(Box<dyn Any>);

/// Operator symbols a boxed type may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Le,
    Add,
    Sub,
    BAnd,
    BOr,
    BXor,
    BNot,
    ToString,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Add => "+",
            Op::Sub => "-",
            Op::BAnd => "&",
            Op::BOr => "|",
            Op::BXor => "^",
            Op::BNot => "~",
            Op::ToString => "tostring",
        }
    }
}

/// Fixed operator slots. Absent slots raise when dispatched.
#[derive(Default)]
pub struct OperatorTable {
    pub eq: Option<NativeFn>,
    pub lt: Option<NativeFn>,
    pub le: Option<NativeFn>,
    pub add: Option<NativeFn>,
    pub sub: Option<NativeFn>,
    pub band: Option<NativeFn>,
    pub bor: Option<NativeFn>,
    pub bxor: Option<NativeFn>,
    pub bnot: Option<NativeFn>,
    pub to_string: Option<NativeFn>,
}

impl OperatorTable {
    pub fn get(&self, op: Op) -> Option<NativeFn> {
        match op {
            Op::Eq => self.eq,
            Op::Lt => self.lt,
            Op::Le => self.le,
            Op::Add => self.add,
            Op::Sub => self.sub,
            Op::BAnd => self.band,
            Op::BOr => self.bor,
            Op::BXor => self.bxor,
            Op::BNot => self.bnot,
            Op::ToString => self.to_string,
        }
    }
}

/// Immutable per-type dispatch table.
pub struct CapabilityTable {
    /// Process-unique tag string keying the registry and stamped on cells.
    pub tag: &'static str,
    /// Script-facing type name used in argument errors.
    pub name: &'static str,
    pub operators: OperatorTable,
    pub methods: Vec<(&'static str, NativeFn)>,
    /// `None` means the payload is simply dropped at reclamation.
    pub finalizer: Option<FinalizeFn>,
}

impl CapabilityTable {
    pub fn method(&self, name: &str) -> Option<NativeFn> {
        self.methods
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }
}

pub struct Registry {
    tables: HashMap<&'static str, CapabilityTable, RandomState>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            tables: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Install a table. Re-registration under the same tag is a module
    /// initialization bug, not a script-reachable condition.
    pub fn register(&mut self, table: CapabilityTable) {
        let tag = table.tag;
        let prev = self.tables.insert(tag, table);
        assert!(prev.is_none(), "capability table already registered: {tag}");
    }

    pub fn get(&self, tag: &str) -> Option<&CapabilityTable> {
        self.tables.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tables.contains_key(tag)
    }
}
