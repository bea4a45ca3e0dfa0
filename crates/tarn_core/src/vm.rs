//! The runtime handle passed into every native call.

use crate::heap::{ForeignCell, Heap, ObjectId};
use crate::registry::{CapabilityTable, Op, Registry};
use crate::value::{NativeFn, Ret, Value};
use smallvec::SmallVec;
use std::any::Any;

pub struct Vm {
    pub heap: Heap,
    registry: Registry,
}

impl Vm {
    pub fn new() -> Self {
        Self {
            heap: Heap::new(),
            registry: Registry::new(),
        }
    }

    pub fn register_type(&mut self, table: CapabilityTable) {
        self.registry.register(table);
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.registry.contains(tag)
    }

    pub fn capability(&self, tag: &str) -> Option<&CapabilityTable> {
        self.registry.get(tag)
    }

    /// Box a native value into tracked storage under a registered tag.
    pub fn box_foreign<T: Any>(&mut self, tag: &'static str, value: T) -> Value {
        debug_assert!(
            self.registry.contains(tag),
            "boxing under unregistered tag: {tag}"
        );
        let id = self.heap.alloc(ForeignCell {
            tag,
            data: Box::new(value),
        });
        Value::Foreign(id)
    }

    /// Tag of a boxed value, if it is one and the cell is still live.
    pub fn tag_of(&self, v: &Value) -> Option<&'static str> {
        let id = v.as_foreign_id()?;
        self.heap.get(id).map(|c| c.tag)
    }

    /// Borrow the embedded native value when the cell carries the expected
    /// tag. `None` covers non-foreign values, tag mismatches, and reclaimed
    /// cells alike; callers turn that into a typed argument error.
    pub fn foreign<'a, T: Any>(&'a self, v: &Value, tag: &str) -> Option<&'a T> {
        let id = v.as_foreign_id()?;
        let cell = self.heap.get(id)?;
        if cell.tag != tag {
            return None;
        }
        cell.data.downcast_ref::<T>()
    }

    pub fn foreign_mut<'a, T: Any>(&'a mut self, v: &Value, tag: &str) -> Option<&'a mut T> {
        let id = v.as_foreign_id()?;
        let cell = self.heap.get_mut(id)?;
        if cell.tag != tag {
            return None;
        }
        cell.data.downcast_mut::<T>()
    }

    /// Script-facing name for a value's shape; boxed values report their
    /// registered type name.
    pub fn shape_name(&self, v: &Value) -> &'static str {
        if let Some(tag) = self.tag_of(v) {
            if let Some(table) = self.registry.get(tag) {
                return table.name;
            }
        }
        v.shape()
    }

    /// Collector callback: reclaim one cell, running the capability table's
    /// finalizer on the payload exactly once. Never raises.
    pub fn reclaim(&mut self, id: ObjectId) {
        if let Some(cell) = self.heap.take(id) {
            match self.registry.get(cell.tag).and_then(|t| t.finalizer) {
                Some(finalize) => finalize(cell.data),
                None => drop(cell.data),
            }
        }
    }

    /// Shutdown sweep: reclaim every live cell.
    pub fn reclaim_all(&mut self) {
        for id in self.heap.live_ids() {
            self.reclaim(id);
        }
    }

    /// Dispatch a named method on a boxed receiver. The receiver is passed
    /// to the entry point as argument 1, mirroring the script's `obj:m(...)`
    /// call shape.
    pub fn call_method(&mut self, recv: &Value, name: &str, args: &[Value]) -> Result<Ret, String> {
        let tag = self
            .tag_of(recv)
            .ok_or_else(|| format!("attempt to call method '{name}' on a {}", recv.shape()))?;
        let table = self
            .registry
            .get(tag)
            .ok_or_else(|| format!("unregistered type tag: {tag}"))?;
        let entry: NativeFn = table
            .method(name)
            .ok_or_else(|| format!("unknown method '{name}' on {}", table.name))?;
        let mut call_args: SmallVec<[Value; 4]> = SmallVec::new();
        call_args.push(recv.clone());
        call_args.extend(args.iter().cloned());
        entry(self, &call_args)
    }

    /// Dispatch an operator against the first operand's capability table.
    pub fn call_operator(&mut self, op: Op, args: &[Value]) -> Result<Ret, String> {
        let lhs = args
            .first()
            .ok_or_else(|| format!("operator '{}' needs an operand", op.symbol()))?;
        let tag = self
            .tag_of(lhs)
            .ok_or_else(|| format!("operator '{}' on a {}", op.symbol(), lhs.shape()))?;
        let table = self
            .registry
            .get(tag)
            .ok_or_else(|| format!("unregistered type tag: {tag}"))?;
        let entry: NativeFn = table.operators.get(op).ok_or_else(|| {
            format!("type {} has no '{}' operator", table.name, op.symbol())
        })?;
        entry(self, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::OperatorTable;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DROPS: AtomicUsize = AtomicUsize::new(0);

    struct Probe;

    impl Drop for Probe {
        fn drop(&mut self) {
            DROPS.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn probe_table() -> CapabilityTable {
        CapabilityTable {
            tag: "probe.tarn",
            name: "probe",
            operators: OperatorTable::default(),
            methods: Vec::new(),
            finalizer: None,
        }
    }

    #[test]
    fn finalizer_runs_exactly_once_per_cell() {
        let mut vm = Vm::new();
        vm.register_type(probe_table());
        let before = DROPS.load(Ordering::SeqCst);
        let v = vm.box_foreign("probe.tarn", Probe);
        let id = v.as_foreign_id().unwrap();
        vm.reclaim(id);
        vm.reclaim(id);
        vm.reclaim_all();
        assert_eq!(DROPS.load(Ordering::SeqCst) - before, 1);
    }

    #[test]
    fn tag_mismatch_is_not_a_downcast() {
        let mut vm = Vm::new();
        vm.register_type(probe_table());
        vm.register_type(CapabilityTable {
            tag: "other.tarn",
            name: "other",
            operators: OperatorTable::default(),
            methods: Vec::new(),
            finalizer: None,
        });
        let v = vm.box_foreign("probe.tarn", 42u32);
        assert!(vm.foreign::<u32>(&v, "probe.tarn").is_some());
        assert!(vm.foreign::<u32>(&v, "other.tarn").is_none());
        assert!(vm.foreign::<i64>(&v, "probe.tarn").is_none());
    }

    #[test]
    fn reclaimed_cell_is_unreachable() {
        let mut vm = Vm::new();
        vm.register_type(probe_table());
        let v = vm.box_foreign("probe.tarn", String::from("x"));
        vm.reclaim(v.as_foreign_id().unwrap());
        assert!(vm.foreign::<String>(&v, "probe.tarn").is_none());
        assert!(vm.tag_of(&v).is_none());
    }
}
