//! Boxed directory entries.
//!
//! An entry names a path and answers metadata queries against it. Queries
//! go to the host at call time; `refresh` exists to surface access
//! failures eagerly, the way a cursor-yielded entry would have.

use crate::args::path_arg;
use crate::boundary::fs1;
use crate::flags::FileTypeTag;
use crate::ftime::FileTime;
use crate::host;
use crate::tag;
use std::fs;
use std::path::PathBuf;
use tarn_core::{ret0, ret1, type_error, CapabilityTable, OperatorTable, Ret, Value, Vm};

#[derive(Debug, Clone, Default)]
pub struct DirEntryObj {
    pub(crate) path: PathBuf,
}

impl DirEntryObj {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn recv<'a>(vm: &'a Vm, args: &[Value]) -> Result<&'a DirEntryObj, String> {
    match args.first() {
        Some(v) => vm
            .foreign::<DirEntryObj>(v, tag::DIRECTORY_ENTRY)
            .ok_or_else(|| type_error(1, "directory entry", vm.shape_name(v))),
        None => Err(type_error(1, "directory entry", "no value")),
    }
}

fn entry_arg(vm: &Vm, args: &[Value], pos: usize) -> Result<PathBuf, String> {
    match args.get(pos - 1) {
        Some(v) => vm
            .foreign::<DirEntryObj>(v, tag::DIRECTORY_ENTRY)
            .map(|e| e.path.clone())
            .ok_or_else(|| type_error(pos, "directory entry", vm.shape_name(v))),
        None => Err(type_error(pos, "directory entry", "no value")),
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn de_tostring(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let this = recv(vm, args)?;
    Ok(ret1(Value::str(this.path.display().to_string())))
}

fn de_eq(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = entry_arg(vm, args, 1)?;
    let right = entry_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left == right)))
}

fn de_lt(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = entry_arg(vm, args, 1)?;
    let right = entry_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left < right)))
}

fn de_le(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = entry_arg(vm, args, 1)?;
    let right = entry_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left <= right)))
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

fn de_assign(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let target = path_arg(vm, args, 2)?;
    recv(vm, args)?;
    if let Some(v) = args.first() {
        if let Some(e) = vm.foreign_mut::<DirEntryObj>(v, tag::DIRECTORY_ENTRY) {
            e.path = target;
        }
    }
    Ok(ret0())
}

fn de_replace_filename(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let name = path_arg(vm, args, 2)?;
    let base = recv(vm, args)?.path.clone();
    let replaced = match base.parent() {
        Some(parent) => parent.join(name),
        None => name,
    };
    if let Some(v) = args.first() {
        if let Some(e) = vm.foreign_mut::<DirEntryObj>(v, tag::DIRECTORY_ENTRY) {
            e.path = replaced;
        }
    }
    Ok(ret0())
}

fn de_refresh(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    fs1("cannot refresh", &p, host::symlink_status(&p))?;
    Ok(ret0())
}

fn de_path(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    Ok(ret1(vm.box_foreign(tag::PATH, p)))
}

fn de_exists(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    let yes = fs1("cannot check existence", &p, host::exists(&p))?;
    Ok(ret1(Value::Bool(yes)))
}

macro_rules! de_type_predicate {
    ($entry:ident, $verb:literal, $tag:expr) => {
        fn $entry(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
            let p = recv(vm, args)?.path.clone();
            let yes = fs1($verb, &p, host::is_type(&p, $tag))?;
            Ok(ret1(Value::Bool(yes)))
        }
    };
}

de_type_predicate!(de_is_block_file, "cannot query file type", FileTypeTag::BLOCK);
de_type_predicate!(
    de_is_character_file,
    "cannot query file type",
    FileTypeTag::CHARACTER
);
de_type_predicate!(de_is_directory, "cannot query file type", FileTypeTag::DIRECTORY);
de_type_predicate!(de_is_fifo, "cannot query file type", FileTypeTag::FIFO);
de_type_predicate!(de_is_regular_file, "cannot query file type", FileTypeTag::REGULAR);
de_type_predicate!(de_is_socket, "cannot query file type", FileTypeTag::SOCKET);
de_type_predicate!(de_is_symlink, "cannot query file type", FileTypeTag::SYMLINK);

fn de_is_other(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    let yes = fs1("cannot query file type", &p, host::is_other(&p))?;
    Ok(ret1(Value::Bool(yes)))
}

fn de_file_size(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    let size = fs1("cannot get file size", &p, host::file_size(&p))?;
    Ok(ret1(Value::Int(size as i64)))
}

fn de_hard_link_count(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    let count = fs1("cannot get hard link count", &p, host::hard_link_count(&p))?;
    Ok(ret1(Value::Int(count as i64)))
}

fn de_last_write_time(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    let modified = fs1(
        "cannot get last write time",
        &p,
        fs::metadata(&p).and_then(|m| m.modified()),
    )?;
    Ok(ret1(
        vm.box_foreign(tag::FILE_TIME, FileTime::from_system(modified)),
    ))
}

/// Status comes back as two values: permissions, then file type.
pub(crate) fn push_status(vm: &mut Vm, status: (crate::flags::Perms, FileTypeTag)) -> Ret {
    let mut out = Ret::new();
    out.push(vm.box_foreign(tag::PERMS, status.0));
    out.push(vm.box_foreign(tag::FILE_TYPE, status.1));
    out
}

fn de_status(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    let status = fs1("cannot get status", &p, host::status(&p))?;
    Ok(push_status(vm, status))
}

fn de_symlink_status(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = recv(vm, args)?.path.clone();
    let status = fs1("cannot get symlink status", &p, host::symlink_status(&p))?;
    Ok(push_status(vm, status))
}

pub fn table() -> CapabilityTable {
    CapabilityTable {
        tag: tag::DIRECTORY_ENTRY,
        name: "directory entry",
        operators: OperatorTable {
            to_string: Some(de_tostring),
            eq: Some(de_eq),
            lt: Some(de_lt),
            le: Some(de_le),
            ..OperatorTable::default()
        },
        methods: vec![
            ("assign", de_assign as tarn_core::NativeFn),
            ("replace_filename", de_replace_filename),
            ("refresh", de_refresh),
            ("path", de_path),
            ("exists", de_exists),
            ("is_block_file", de_is_block_file),
            ("is_character_file", de_is_character_file),
            ("is_directory", de_is_directory),
            ("is_fifo", de_is_fifo),
            ("is_other", de_is_other),
            ("is_regular_file", de_is_regular_file),
            ("is_socket", de_is_socket),
            ("is_symlink", de_is_symlink),
            ("file_size", de_file_size),
            ("hard_link_count", de_hard_link_count),
            ("last_write_time", de_last_write_time),
            ("status", de_status),
            ("symlink_status", de_symlink_status),
        ],
        finalizer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::open_filesystem;
    use std::io::Write as _;

    fn vm_with_module() -> Vm {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        vm
    }

    #[test]
    fn entry_answers_metadata_queries() {
        let mut vm = vm_with_module();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.bin");
        let mut f = fs::File::create(&file).unwrap();
        f.write_all(&[0u8; 16]).unwrap();
        drop(f);

        let e = vm.box_foreign(tag::DIRECTORY_ENTRY, DirEntryObj::new(file));
        let r = vm.call_method(&e, "is_regular_file", &[]).unwrap();
        assert!(matches!(r[0], Value::Bool(true)));
        let r = vm.call_method(&e, "file_size", &[]).unwrap();
        assert!(matches!(r[0], Value::Int(16)));
    }

    #[test]
    fn replace_filename_keeps_the_directory() {
        let mut vm = vm_with_module();
        let e = vm.box_foreign(
            tag::DIRECTORY_ENTRY,
            DirEntryObj::new(PathBuf::from("/srv/a.txt")),
        );
        vm.call_method(&e, "replace_filename", &[Value::str("b.txt")])
            .unwrap();
        let inner = vm.foreign::<DirEntryObj>(&e, tag::DIRECTORY_ENTRY).unwrap();
        assert_eq!(inner.path, PathBuf::from("/srv/b.txt"));
    }

    #[test]
    fn status_yields_permissions_then_type_and_not_found_does_not_raise() {
        let mut vm = vm_with_module();
        let e = vm.box_foreign(
            tag::DIRECTORY_ENTRY,
            DirEntryObj::new(PathBuf::from("/no/such/entry/here")),
        );
        let r = vm.call_method(&e, "status", &[]).unwrap();
        assert_eq!(r.len(), 2);
        let ft = vm
            .foreign::<FileTypeTag>(&r[1], tag::FILE_TYPE)
            .copied()
            .unwrap();
        assert_eq!(ft, FileTypeTag::NOT_FOUND);
    }
}
