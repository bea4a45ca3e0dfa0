//! Iterator adaptation layer.
//!
//! Each traversal surfaces as a (continuation, state) pair the script's
//! generic loop protocol can drive. The state is a boxed cursor; the
//! continuation receives it as argument 1 and the loop's control value as
//! argument 2. Exhaustion latches: once a continuation has returned nil,
//! every later pull returns nil without touching the host.

use crate::boundary::{fs0, fs1};
use crate::entry_obj::DirEntryObj;
use crate::flags::DirectoryOptions;
use crate::host::RecursiveCursor;
use crate::tag;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tarn_core::{ret0, ret1, type_error, CapabilityTable, OperatorTable, Ret, Value, Vm};

// ---------------------------------------------------------------------------
// Path element traversal
// ---------------------------------------------------------------------------

struct PathElementsState {
    parts: Vec<PathBuf>,
    next: usize,
}

fn elements_recv<'a>(vm: &'a Vm, args: &[Value]) -> Result<&'a PathElementsState, String> {
    match args.first() {
        Some(v) => vm
            .foreign::<PathElementsState>(v, tag::PATH_ELEMENTS)
            .ok_or_else(|| type_error(1, "path element cursor", vm.shape_name(v))),
        None => Err(type_error(1, "path element cursor", "no value")),
    }
}

fn next_path_element(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let state = elements_recv(vm, args)?;
    let index = state.next;
    let part = match state.parts.get(index) {
        Some(p) => p.clone(),
        None => return Ok(ret1(Value::Nil)),
    };
    if let Some(v) = args.first() {
        if let Some(s) = vm.foreign_mut::<PathElementsState>(v, tag::PATH_ELEMENTS) {
            s.next = index + 1;
        }
    }
    Ok(ret1(vm.box_foreign(tag::PATH, part)))
}

/// (continuation, state) over a path's components, root parts included.
pub fn push_path_elements(vm: &mut Vm, p: &Path) -> Result<Ret, String> {
    let parts: Vec<PathBuf> = p.components().map(|c| PathBuf::from(c.as_os_str())).collect();
    let state = vm.box_foreign(tag::PATH_ELEMENTS, PathElementsState { parts, next: 0 });
    let mut out = Ret::new();
    out.push(Value::Native(next_path_element));
    out.push(state);
    Ok(out)
}

pub fn path_elements_table() -> CapabilityTable {
    CapabilityTable {
        tag: tag::PATH_ELEMENTS,
        name: "path element cursor",
        operators: OperatorTable::default(),
        methods: Vec::new(),
        finalizer: None,
    }
}

// ---------------------------------------------------------------------------
// Flat directory traversal
// ---------------------------------------------------------------------------

struct DirCursorState {
    // None is the exhaustion latch; the handle is released on the pull
    // that observes the end, not at collection time.
    read: Option<fs::ReadDir>,
}

fn next_directory_element(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    match args.first() {
        Some(v) => {
            if vm
                .foreign::<DirCursorState>(v, tag::DIRECTORY_ITERATOR)
                .is_none()
            {
                return Err(type_error(1, "directory cursor", vm.shape_name(v)));
            }
        }
        None => return Err(type_error(1, "directory cursor", "no value")),
    }
    let v = args[0].clone();
    let pulled = match vm.foreign_mut::<DirCursorState>(&v, tag::DIRECTORY_ITERATOR) {
        Some(state) => match state.read.as_mut() {
            Some(read) => match read.next() {
                Some(item) => Some(item),
                None => {
                    state.read = None;
                    None
                }
            },
            None => None,
        },
        None => None,
    };
    match pulled {
        Some(item) => {
            let entry = fs0("cannot read directory", item)?;
            Ok(ret1(
                vm.box_foreign(tag::DIRECTORY_ENTRY, DirEntryObj::new(entry.path())),
            ))
        }
        None => Ok(ret1(Value::Nil)),
    }
}

/// (continuation, state) over one directory's entries.
pub fn open_directory(vm: &mut Vm, p: &Path, opts: DirectoryOptions) -> Result<Ret, String> {
    let read = match fs::read_dir(p) {
        Ok(read) => Some(read),
        Err(e)
            if e.kind() == io::ErrorKind::PermissionDenied
                && opts.contains(DirectoryOptions::SKIP_PERMISSION_DENIED) =>
        {
            None
        }
        Err(e) => return fs1("cannot open directory", p, Err(e)),
    };
    let state = vm.box_foreign(tag::DIRECTORY_ITERATOR, DirCursorState { read });
    let mut out = Ret::new();
    out.push(Value::Native(next_directory_element));
    out.push(state);
    Ok(out)
}

pub fn directory_iterator_table() -> CapabilityTable {
    CapabilityTable {
        tag: tag::DIRECTORY_ITERATOR,
        name: "directory cursor",
        operators: OperatorTable::default(),
        methods: Vec::new(),
        finalizer: None,
    }
}

// ---------------------------------------------------------------------------
// Recursive directory traversal
// ---------------------------------------------------------------------------

struct RecCursorState {
    cursor: RecursiveCursor,
}

fn rec_recv<'a>(vm: &'a Vm, args: &[Value]) -> Result<&'a RecCursorState, String> {
    match args.first() {
        Some(v) => vm
            .foreign::<RecCursorState>(v, tag::RECURSIVE_DIRECTORY_ITERATOR)
            .ok_or_else(|| type_error(1, "recursive directory cursor", vm.shape_name(v))),
        None => Err(type_error(1, "recursive directory cursor", "no value")),
    }
}

/// The first pull (nil control value) yields the position the cursor was
/// opened on; every later pull advances first. Returns (state, entry) so
/// the loop's control value is non-nil from then on.
fn next_recursive_directory_element(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    rec_recv(vm, args)?;
    let first_pull = matches!(args.get(1), None | Some(Value::Nil));
    let v = args[0].clone();
    let current = match vm.foreign_mut::<RecCursorState>(&v, tag::RECURSIVE_DIRECTORY_ITERATOR) {
        Some(state) => {
            if state.cursor.at_end() {
                None
            } else {
                if !first_pull {
                    fs0("cannot read directory", state.cursor.advance())?;
                }
                state.cursor.current().map(|c| c.path.clone())
            }
        }
        None => None,
    };
    match current {
        Some(path) => {
            let entry = vm.box_foreign(tag::DIRECTORY_ENTRY, DirEntryObj::new(path));
            let mut out = Ret::new();
            out.push(v);
            out.push(entry);
            Ok(out)
        }
        None => Ok(ret1(Value::Nil)),
    }
}

/// (continuation, state) over a directory tree.
pub fn open_recursive_directory(
    vm: &mut Vm,
    p: &Path,
    opts: DirectoryOptions,
) -> Result<Ret, String> {
    let cursor = fs1("cannot open directory", p, RecursiveCursor::open(p, opts))?;
    let state = vm.box_foreign(tag::RECURSIVE_DIRECTORY_ITERATOR, RecCursorState { cursor });
    let mut out = Ret::new();
    out.push(Value::Native(next_recursive_directory_element));
    out.push(state);
    Ok(out)
}

// Introspection methods answer nothing once the cursor is exhausted; the
// mutating ones become no-ops.

fn rdi_options(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let state = rec_recv(vm, args)?;
    if state.cursor.at_end() {
        return Ok(ret0());
    }
    let opts = state.cursor.options();
    Ok(ret1(vm.box_foreign(tag::DIRECTORY_OPTIONS, opts)))
}

fn rdi_depth(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let state = rec_recv(vm, args)?;
    if state.cursor.at_end() {
        return Ok(ret0());
    }
    Ok(ret1(Value::Int(state.cursor.depth() as i64)))
}

fn rdi_recursion_pending(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let state = rec_recv(vm, args)?;
    if state.cursor.at_end() {
        return Ok(ret0());
    }
    Ok(ret1(Value::Bool(state.cursor.recursion_pending())))
}

fn rdi_pop(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    rec_recv(vm, args)?;
    let v = args[0].clone();
    if let Some(state) = vm.foreign_mut::<RecCursorState>(&v, tag::RECURSIVE_DIRECTORY_ITERATOR) {
        fs0("cannot read directory", state.cursor.pop())?;
    }
    Ok(ret0())
}

fn rdi_disable_recursion_pending(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    rec_recv(vm, args)?;
    let v = args[0].clone();
    if let Some(state) = vm.foreign_mut::<RecCursorState>(&v, tag::RECURSIVE_DIRECTORY_ITERATOR) {
        if !state.cursor.at_end() {
            state.cursor.disable_recursion_pending();
        }
    }
    Ok(ret0())
}

pub fn recursive_directory_iterator_table() -> CapabilityTable {
    CapabilityTable {
        tag: tag::RECURSIVE_DIRECTORY_ITERATOR,
        name: "recursive directory cursor",
        operators: OperatorTable::default(),
        methods: vec![
            ("options", rdi_options as tarn_core::NativeFn),
            ("depth", rdi_depth),
            ("recursion_pending", rdi_recursion_pending),
            ("pop", rdi_pop),
            ("disable_recursion_pending", rdi_disable_recursion_pending),
        ],
        finalizer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::open_filesystem;

    fn vm_with_module() -> Vm {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        vm
    }

    fn pull(vm: &mut Vm, cont: &Value, state: &Value, control: Value) -> Ret {
        match cont {
            Value::Native(f) => f(vm, &[state.clone(), control]).unwrap(),
            _ => panic!("continuation is not callable"),
        }
    }

    #[test]
    fn path_elements_walk_every_component() {
        let mut vm = vm_with_module();
        let pair = push_path_elements(&mut vm, Path::new("/a/b")).unwrap();
        let (cont, state) = (pair[0].clone(), pair[1].clone());
        let mut seen = Vec::new();
        loop {
            let r = pull(&mut vm, &cont, &state, Value::Nil);
            if r[0].is_nil() {
                break;
            }
            seen.push(
                vm.foreign::<PathBuf>(&r[0], tag::PATH)
                    .cloned()
                    .unwrap(),
            );
        }
        assert_eq!(
            seen,
            vec![PathBuf::from("/"), PathBuf::from("a"), PathBuf::from("b")]
        );
    }

    #[test]
    fn directory_cursor_yields_each_entry_once_then_latches() {
        let mut vm = vm_with_module();
        let dir = tempfile::tempdir().unwrap();
        for name in ["one", "two", "three"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let pair = open_directory(&mut vm, dir.path(), DirectoryOptions::NONE).unwrap();
        let (cont, state) = (pair[0].clone(), pair[1].clone());
        let mut names = Vec::new();
        loop {
            let r = pull(&mut vm, &cont, &state, Value::Nil);
            if r[0].is_nil() {
                break;
            }
            let e = vm
                .foreign::<DirEntryObj>(&r[0], tag::DIRECTORY_ENTRY)
                .unwrap();
            names.push(e.path.file_name().unwrap().to_string_lossy().into_owned());
        }
        names.sort();
        assert_eq!(names, ["one", "three", "two"]);
        // Latched: further pulls stay nil.
        let r = pull(&mut vm, &cont, &state, Value::Nil);
        assert!(r[0].is_nil());
    }

    #[test]
    fn recursive_cursor_first_pull_does_not_advance() {
        let mut vm = vm_with_module();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("only"), b"x").unwrap();
        let pair =
            open_recursive_directory(&mut vm, dir.path(), DirectoryOptions::NONE).unwrap();
        let (cont, state) = (pair[0].clone(), pair[1].clone());
        let r = pull(&mut vm, &cont, &state, Value::Nil);
        assert_eq!(r.len(), 2);
        let e = vm
            .foreign::<DirEntryObj>(&r[1], tag::DIRECTORY_ENTRY)
            .unwrap();
        assert_eq!(e.path.file_name().unwrap(), "only");
        // Control value is the state, so the next pull advances and ends.
        let control = r[0].clone();
        let r = pull(&mut vm, &cont, &state, control);
        assert!(r[0].is_nil());
    }

    #[test]
    fn failed_descent_leaves_a_terminal_cursor() {
        let mut vm = vm_with_module();
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let pair =
            open_recursive_directory(&mut vm, dir.path(), DirectoryOptions::NONE).unwrap();
        let (cont, state) = (pair[0].clone(), pair[1].clone());
        let r = pull(&mut vm, &cont, &state, Value::Nil);
        let control = r[0].clone();

        // The pending descent fails once the yielded directory is gone.
        fs::remove_dir(dir.path().join("sub")).unwrap();
        let err = match &cont {
            Value::Native(f) => f(&mut vm, &[state.clone(), control]).unwrap_err(),
            _ => panic!("continuation is not callable"),
        };
        assert!(err.starts_with("filesystem error: cannot read directory"), "{err}");

        // Terminal from then on: pulls stay nil and the method set
        // answers nothing.
        let r = pull(&mut vm, &cont, &state, state.clone());
        assert!(r[0].is_nil());
        assert!(vm.call_method(&state, "depth", &[]).unwrap().is_empty());
        assert!(vm.call_method(&state, "options", &[]).unwrap().is_empty());
        assert!(vm
            .call_method(&state, "recursion_pending", &[])
            .unwrap()
            .is_empty());
        vm.call_method(&state, "pop", &[]).unwrap();
    }

    #[test]
    fn exhausted_recursive_cursor_answers_nothing() {
        let mut vm = vm_with_module();
        let dir = tempfile::tempdir().unwrap();
        let pair =
            open_recursive_directory(&mut vm, dir.path(), DirectoryOptions::NONE).unwrap();
        let state = pair[1].clone();
        assert!(vm.call_method(&state, "depth", &[]).unwrap().is_empty());
        assert!(vm.call_method(&state, "options", &[]).unwrap().is_empty());
        assert!(vm
            .call_method(&state, "recursion_pending", &[])
            .unwrap()
            .is_empty());
        vm.call_method(&state, "pop", &[]).unwrap();
        vm.call_method(&state, "disable_recursion_pending", &[])
            .unwrap();
    }
}
