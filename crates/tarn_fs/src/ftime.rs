//! Boxed file timestamps.
//!
//! Opaque to scripts except through comparison, `time + seconds`, and
//! `time - time` (which yields seconds as a number).

use crate::tag;
use std::time::{Duration, SystemTime};
use tarn_core::{ret1, type_error, CapabilityTable, OperatorTable, Ret, Value, Vm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileTime(SystemTime);

impl FileTime {
    pub fn now() -> Self {
        FileTime(SystemTime::now())
    }

    pub fn from_system(t: SystemTime) -> Self {
        FileTime(t)
    }

    pub fn system(self) -> SystemTime {
        self.0
    }

    /// Shifted timestamp; `None` when the offset is not representable.
    pub fn add_seconds(self, seconds: f64) -> Option<Self> {
        let magnitude = Duration::try_from_secs_f64(seconds.abs()).ok()?;
        let shifted = if seconds >= 0.0 {
            self.0.checked_add(magnitude)?
        } else {
            self.0.checked_sub(magnitude)?
        };
        Some(FileTime(shifted))
    }

    /// Signed difference in seconds.
    pub fn seconds_since(self, other: FileTime) -> f64 {
        match self.0.duration_since(other.0) {
            Ok(d) => d.as_secs_f64(),
            Err(e) => -e.duration().as_secs_f64(),
        }
    }
}

fn ft_eq(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = crate::args::file_time_arg(vm, args, 1)?;
    let right = crate::args::file_time_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left == right)))
}

fn ft_lt(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = crate::args::file_time_arg(vm, args, 1)?;
    let right = crate::args::file_time_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left < right)))
}

fn ft_le(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = crate::args::file_time_arg(vm, args, 1)?;
    let right = crate::args::file_time_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left <= right)))
}

fn ft_add(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let this = crate::args::file_time_arg(vm, args, 1)?;
    let seconds = match args.get(1) {
        Some(Value::Int(i)) => *i as f64,
        Some(Value::Float(f)) => *f,
        Some(v) => return Err(type_error(2, "number or integer", vm.shape_name(v))),
        None => return Err(type_error(2, "number or integer", "no value")),
    };
    let shifted = this
        .add_seconds(seconds)
        .ok_or_else(|| String::from("file time offset out of range"))?;
    Ok(ret1(vm.box_foreign(tag::FILE_TIME, shifted)))
}

fn ft_sub(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = crate::args::file_time_arg(vm, args, 1)?;
    let right = crate::args::file_time_arg(vm, args, 2)?;
    Ok(ret1(Value::Float(left.seconds_since(right))))
}

pub fn table() -> CapabilityTable {
    CapabilityTable {
        tag: tag::FILE_TIME,
        name: "file time",
        operators: OperatorTable {
            eq: Some(ft_eq),
            lt: Some(ft_lt),
            le: Some(ft_le),
            add: Some(ft_add),
            sub: Some(ft_sub),
            ..OperatorTable::default()
        },
        methods: Vec::new(),
        finalizer: None,
    }
}
