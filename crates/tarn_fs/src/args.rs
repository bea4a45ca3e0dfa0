//! Argument resolution protocol.
//!
//! Every native entry point resolves its arguments through these checkers,
//! so a wrong shape always produces the same typed error:
//! `bad argument #N (EXPECTED expected, got GOT)`. Path-like positions
//! accept a boxed path or a plain string interchangeably; resolution
//! clones, so a callee never aliases a boxed argument's storage.

use crate::entry_obj::DirEntryObj;
use crate::ftime::FileTime;
use crate::tag;
use std::path::PathBuf;
use tarn_core::{type_error, Value, Vm};

fn arg<'a>(args: &'a [Value], pos: usize) -> Option<&'a Value> {
    args.get(pos - 1)
}

fn fail(vm: &Vm, args: &[Value], pos: usize, expected: &str) -> String {
    match arg(args, pos) {
        Some(v) => type_error(pos, expected, vm.shape_name(v)),
        None => type_error(pos, expected, "no value"),
    }
}

pub fn check_int(vm: &Vm, args: &[Value], pos: usize) -> Result<i64, String> {
    match arg(args, pos) {
        Some(Value::Int(i)) => Ok(*i),
        Some(Value::Float(f)) if f.fract() == 0.0 => Ok(*f as i64),
        _ => Err(fail(vm, args, pos, "integer")),
    }
}

/// A path-like position: boxed path or string.
pub fn path_arg(vm: &Vm, args: &[Value], pos: usize) -> Result<PathBuf, String> {
    match arg(args, pos) {
        Some(Value::Str(s)) => Ok(PathBuf::from(&**s)),
        Some(v) => vm
            .foreign::<PathBuf>(v, tag::PATH)
            .cloned()
            .ok_or_else(|| fail(vm, args, pos, "path or string")),
        None => Err(fail(vm, args, pos, "path or string")),
    }
}

/// Optional path-like constructor argument; nil and absence both mean
/// "default".
pub fn opt_path_arg(vm: &Vm, args: &[Value], pos: usize) -> Result<Option<PathBuf>, String> {
    match arg(args, pos) {
        None | Some(Value::Nil) => Ok(None),
        Some(Value::Str(s)) => Ok(Some(PathBuf::from(&**s))),
        Some(v) => vm
            .foreign::<PathBuf>(v, tag::PATH)
            .cloned()
            .map(Some)
            .ok_or_else(|| fail(vm, args, pos, "path, string or nil")),
    }
}

/// Optional path-like-or-entry constructor argument.
pub fn opt_path_or_entry_arg(
    vm: &Vm,
    args: &[Value],
    pos: usize,
) -> Result<Option<PathBuf>, String> {
    match arg(args, pos) {
        None | Some(Value::Nil) => Ok(None),
        Some(Value::Str(s)) => Ok(Some(PathBuf::from(&**s))),
        Some(v) => {
            if let Some(p) = vm.foreign::<PathBuf>(v, tag::PATH) {
                return Ok(Some(p.clone()));
            }
            if let Some(e) = vm.foreign::<DirEntryObj>(v, tag::DIRECTORY_ENTRY) {
                return Ok(Some(e.path.clone()));
            }
            Err(fail(vm, args, pos, "directory entry, path, string or nil"))
        }
    }
}

pub fn file_time_arg(vm: &Vm, args: &[Value], pos: usize) -> Result<FileTime, String> {
    match arg(args, pos) {
        Some(v) => vm
            .foreign::<FileTime>(v, tag::FILE_TIME)
            .copied()
            .ok_or_else(|| fail(vm, args, pos, "file time")),
        None => Err(fail(vm, args, pos, "file time")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::open_filesystem;

    #[test]
    fn path_positions_accept_strings_and_boxed_paths() {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        let boxed = vm.box_foreign(tag::PATH, PathBuf::from("/tmp/x"));
        let args = [Value::str("a/b"), boxed];
        assert_eq!(path_arg(&vm, &args, 1).unwrap(), PathBuf::from("a/b"));
        assert_eq!(path_arg(&vm, &args, 2).unwrap(), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn wrong_shapes_name_position_and_expectation() {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        let args = [Value::Int(7)];
        assert_eq!(
            path_arg(&vm, &args, 1).unwrap_err(),
            "bad argument #1 (path or string expected, got integer)"
        );
        assert_eq!(
            path_arg(&vm, &args, 2).unwrap_err(),
            "bad argument #2 (path or string expected, got no value)"
        );
    }

    #[test]
    fn nil_and_absence_both_default_optional_positions() {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        assert!(opt_path_arg(&vm, &[], 1).unwrap().is_none());
        assert!(opt_path_arg(&vm, &[Value::Nil], 1).unwrap().is_none());
        assert!(opt_path_arg(&vm, &[Value::Bool(true)], 1).is_err());
    }
}
