//! Module-level filesystem operations.
//!
//! Every entry point here resolves its arguments through the checkers in
//! `args`, performs the operation through `host`, and funnels failures
//! through the translation boundary. Option arguments are trailing and
//! optional: `copy` defaults to no options, `permissions` defaults to
//! replace.

use crate::args::{
    check_int, opt_path_arg, opt_path_or_entry_arg, path_arg,
};
use crate::boundary::{fs0, fs1, fs2};
use crate::entry_obj::{push_status, DirEntryObj};
use crate::flags::{check_flag, CopyOptions, DirectoryOptions, FileTypeTag, FlagDef, PermOptions, Perms};
use crate::ftime::FileTime;
use crate::host;
use crate::iter::{open_directory, open_recursive_directory};
use crate::tag;
use std::env;
use std::fs;
use std::path::PathBuf;
use tarn_core::{ret0, ret1, NativeFn, Ret, Value, Vm};

fn opt_flag<T: FlagDef>(vm: &Vm, args: &[Value], pos: usize, default: T) -> Result<T, String> {
    if args.len() < pos {
        Ok(default)
    } else {
        check_flag::<T>(vm, args, pos)
    }
}

// ---------------------------------------------------------------------------
// Constructors and traversals
// ---------------------------------------------------------------------------

fn fs_path(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let seed = opt_path_arg(vm, args, 1)?.unwrap_or_default();
    Ok(ret1(vm.box_foreign(tag::PATH, seed)))
}

fn fs_directory_entry(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let seed = opt_path_or_entry_arg(vm, args, 1)?.unwrap_or_default();
    Ok(ret1(
        vm.box_foreign(tag::DIRECTORY_ENTRY, DirEntryObj::new(seed)),
    ))
}

fn fs_directory(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let opts = opt_flag(vm, args, 2, DirectoryOptions::NONE)?;
    open_directory(vm, &p, opts)
}

fn fs_recursive_directory(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let opts = opt_flag(vm, args, 2, DirectoryOptions::NONE)?;
    open_recursive_directory(vm, &p, opts)
}

// ---------------------------------------------------------------------------
// Path transformations
// ---------------------------------------------------------------------------

fn fs_absolute(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let abs = fs1("cannot make absolute path", &p, std::path::absolute(&p))?;
    Ok(ret1(vm.box_foreign(tag::PATH, abs)))
}

fn fs_canonical(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let c = fs1("cannot make canonical path", &p, fs::canonicalize(&p))?;
    Ok(ret1(vm.box_foreign(tag::PATH, c)))
}

fn fs_weakly_canonical(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let c = fs1("cannot make canonical path", &p, host::weakly_canonical(&p))?;
    Ok(ret1(vm.box_foreign(tag::PATH, c)))
}

fn base_or_current(vm: &Vm, args: &[Value]) -> Result<PathBuf, String> {
    if args.len() < 2 {
        fs0("cannot get current path", env::current_dir())
    } else {
        path_arg(vm, args, 2)
    }
}

fn fs_relative(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let base = base_or_current(vm, args)?;
    let rel = fs2("cannot make relative path", &p, &base, host::relative(&p, &base))?;
    Ok(ret1(vm.box_foreign(tag::PATH, rel)))
}

fn fs_proximate(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let base = base_or_current(vm, args)?;
    let prox = fs2("cannot make proximate path", &p, &base, host::proximate(&p, &base))?;
    Ok(ret1(vm.box_foreign(tag::PATH, prox)))
}

// ---------------------------------------------------------------------------
// Copy, link and directory creation
// ---------------------------------------------------------------------------

fn fs_copy(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let from = path_arg(vm, args, 1)?;
    let to = path_arg(vm, args, 2)?;
    let opts = opt_flag(vm, args, 3, CopyOptions::NONE)?;
    fs2("cannot copy", &from, &to, host::copy(&from, &to, opts))?;
    Ok(ret0())
}

fn fs_copy_file(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let from = path_arg(vm, args, 1)?;
    let to = path_arg(vm, args, 2)?;
    let opts = opt_flag(vm, args, 3, CopyOptions::NONE)?;
    let copied = fs2(
        "cannot copy file",
        &from,
        &to,
        host::copy_file(&from, &to, opts),
    )?;
    Ok(ret1(Value::Bool(copied)))
}

fn fs_copy_symlink(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let from = path_arg(vm, args, 1)?;
    let to = path_arg(vm, args, 2)?;
    fs2("cannot copy symlink", &from, &to, host::copy_symlink(&from, &to))?;
    Ok(ret0())
}

fn fs_create_hard_link(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let target = path_arg(vm, args, 1)?;
    let link = path_arg(vm, args, 2)?;
    fs2(
        "cannot create hard link",
        &target,
        &link,
        fs::hard_link(&target, &link),
    )?;
    Ok(ret0())
}

fn fs_create_symlink(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let target = path_arg(vm, args, 1)?;
    let link = path_arg(vm, args, 2)?;
    fs2(
        "cannot create symlink",
        &target,
        &link,
        host::create_symlink(&target, &link),
    )?;
    Ok(ret0())
}

fn fs_create_directory_symlink(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let target = path_arg(vm, args, 1)?;
    let link = path_arg(vm, args, 2)?;
    fs2(
        "cannot create symlink",
        &target,
        &link,
        host::create_directory_symlink(&target, &link),
    )?;
    Ok(ret0())
}

fn fs_create_directory(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let created = if args.len() < 2 {
        fs1("cannot create directory", &p, host::create_directory(&p))?
    } else {
        let attributes = path_arg(vm, args, 2)?;
        fs2(
            "cannot create directory",
            &p,
            &attributes,
            host::create_directory_with_attributes(&p, &attributes),
        )?
    };
    Ok(ret1(Value::Bool(created)))
}

fn fs_create_directories(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let created = fs1("cannot create directories", &p, host::create_directories(&p))?;
    Ok(ret1(Value::Bool(created)))
}

// ---------------------------------------------------------------------------
// Queries and mutation
// ---------------------------------------------------------------------------

fn fs_current_path(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    if args.is_empty() {
        let cwd = fs0("cannot get current path", env::current_dir())?;
        return Ok(ret1(vm.box_foreign(tag::PATH, cwd)));
    }
    let p = path_arg(vm, args, 1)?;
    fs1("cannot set current path", &p, env::set_current_dir(&p))?;
    Ok(ret0())
}

fn fs_exists(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let yes = fs1("cannot check existence", &p, host::exists(&p))?;
    Ok(ret1(Value::Bool(yes)))
}

fn fs_equivalent(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let a = path_arg(vm, args, 1)?;
    let b = path_arg(vm, args, 2)?;
    let same = fs2("cannot check equivalence", &a, &b, host::equivalent(&a, &b))?;
    Ok(ret1(Value::Bool(same)))
}

fn fs_file_size(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let size = fs1("cannot get file size", &p, host::file_size(&p))?;
    Ok(ret1(Value::Int(size as i64)))
}

fn fs_hard_link_count(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let count = fs1("cannot get hard link count", &p, host::hard_link_count(&p))?;
    Ok(ret1(Value::Int(count as i64)))
}

fn fs_last_write_time(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    if args.len() < 2 {
        let modified = fs1(
            "cannot get last write time",
            &p,
            fs::metadata(&p).and_then(|m| m.modified()),
        )?;
        return Ok(ret1(
            vm.box_foreign(tag::FILE_TIME, FileTime::from_system(modified)),
        ));
    }
    let t = crate::args::file_time_arg(vm, args, 2)?;
    fs1(
        "cannot set last write time",
        &p,
        filetime::set_file_mtime(&p, filetime::FileTime::from_system_time(t.system())),
    )?;
    Ok(ret0())
}

fn fs_file_time_now(vm: &mut Vm, _args: &[Value]) -> Result<Ret, String> {
    Ok(ret1(vm.box_foreign(tag::FILE_TIME, FileTime::now())))
}

fn fs_permissions(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let perms = check_flag::<Perms>(vm, args, 2)?;
    let opts = opt_flag(vm, args, 3, PermOptions::REPLACE)?;
    fs1(
        "cannot set permissions",
        &p,
        host::apply_permissions(&p, perms, opts),
    )?;
    Ok(ret0())
}

fn fs_read_symlink(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let target = fs1("cannot read symlink", &p, fs::read_link(&p))?;
    Ok(ret1(vm.box_foreign(tag::PATH, target)))
}

fn fs_remove(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let removed = fs1("cannot remove", &p, host::remove(&p))?;
    Ok(ret1(Value::Bool(removed)))
}

fn fs_remove_all(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let count = fs1("cannot remove all", &p, host::remove_all(&p))?;
    Ok(ret1(Value::Int(count as i64)))
}

fn fs_rename(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let from = path_arg(vm, args, 1)?;
    let to = path_arg(vm, args, 2)?;
    fs2("cannot rename", &from, &to, fs::rename(&from, &to))?;
    Ok(ret0())
}

fn fs_resize_file(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let size = check_int(vm, args, 2)?;
    if size < 0 {
        return Err(String::from("new file size cannot be negative"));
    }
    let p = path_arg(vm, args, 1)?;
    fs1("cannot resize file", &p, host::resize_file(&p, size as u64))?;
    Ok(ret0())
}

/// Returns capacity, free and available bytes, in that order.
fn fs_space(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let (capacity, free, available) = fs1("cannot get free space", &p, host::space(&p))?;
    let mut out = Ret::new();
    out.push(Value::Int(capacity as i64));
    out.push(Value::Int(free as i64));
    out.push(Value::Int(available as i64));
    Ok(out)
}

fn fs_status(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let status = fs1("cannot get status", &p, host::status(&p))?;
    Ok(push_status(vm, status))
}

fn fs_symlink_status(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let status = fs1("cannot get symlink status", &p, host::symlink_status(&p))?;
    Ok(push_status(vm, status))
}

fn fs_temp_directory_path(vm: &mut Vm, _args: &[Value]) -> Result<Ret, String> {
    Ok(ret1(vm.box_foreign(tag::PATH, env::temp_dir())))
}

// ---------------------------------------------------------------------------
// Type predicates
// ---------------------------------------------------------------------------

macro_rules! fs_type_predicate {
    ($entry:ident, $tag:expr) => {
        fn $entry(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
            let p = path_arg(vm, args, 1)?;
            let yes = fs1("cannot query file type", &p, host::is_type(&p, $tag))?;
            Ok(ret1(Value::Bool(yes)))
        }
    };
}

fs_type_predicate!(fs_is_block_file, FileTypeTag::BLOCK);
fs_type_predicate!(fs_is_character_file, FileTypeTag::CHARACTER);
fs_type_predicate!(fs_is_directory, FileTypeTag::DIRECTORY);
fs_type_predicate!(fs_is_fifo, FileTypeTag::FIFO);
fs_type_predicate!(fs_is_regular_file, FileTypeTag::REGULAR);
fs_type_predicate!(fs_is_socket, FileTypeTag::SOCKET);
fs_type_predicate!(fs_is_symlink, FileTypeTag::SYMLINK);

fn fs_is_other(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let yes = fs1("cannot query file type", &p, host::is_other(&p))?;
    Ok(ret1(Value::Bool(yes)))
}

fn fs_is_empty(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let p = path_arg(vm, args, 1)?;
    let empty = fs1("cannot check if file is empty", &p, host::is_empty(&p))?;
    Ok(ret1(Value::Bool(empty)))
}

/// Script-facing function table, in export order.
pub fn functions() -> Vec<(&'static str, NativeFn)> {
    vec![
        ("directory", fs_directory as NativeFn),
        ("recursive_directory", fs_recursive_directory),
        ("directory_entry", fs_directory_entry),
        ("path", fs_path),
        ("absolute", fs_absolute),
        ("canonical", fs_canonical),
        ("weakly_canonical", fs_weakly_canonical),
        ("relative", fs_relative),
        ("proximate", fs_proximate),
        ("copy", fs_copy),
        ("copy_file", fs_copy_file),
        ("copy_symlink", fs_copy_symlink),
        ("create_directory", fs_create_directory),
        ("create_directories", fs_create_directories),
        ("create_hard_link", fs_create_hard_link),
        ("create_symlink", fs_create_symlink),
        ("create_directory_symlink", fs_create_directory_symlink),
        ("current_path", fs_current_path),
        ("exists", fs_exists),
        ("equivalent", fs_equivalent),
        ("file_size", fs_file_size),
        ("hard_link_count", fs_hard_link_count),
        ("last_write_time", fs_last_write_time),
        ("file_time_now", fs_file_time_now),
        ("permissions", fs_permissions),
        ("read_symlink", fs_read_symlink),
        ("remove", fs_remove),
        ("remove_all", fs_remove_all),
        ("rename", fs_rename),
        ("resize_file", fs_resize_file),
        ("space", fs_space),
        ("status", fs_status),
        ("symlink_status", fs_symlink_status),
        ("temp_directory_path", fs_temp_directory_path),
        ("is_block_file", fs_is_block_file),
        ("is_character_file", fs_is_character_file),
        ("is_directory", fs_is_directory),
        ("is_empty", fs_is_empty),
        ("is_fifo", fs_is_fifo),
        ("is_other", fs_is_other),
        ("is_regular_file", fs_is_regular_file),
        ("is_socket", fs_is_socket),
        ("is_symlink", fs_is_symlink),
    ]
}
