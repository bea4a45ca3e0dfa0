//! Boxed path values.
//!
//! A boxed path owns its storage; the in-place mutators edit the receiver
//! and hand it back so calls chain. Comparison accepts a boxed path or a
//! plain string on either side. Decomposition follows the host path
//! conventions: extensions carry no leading dot and a lone trailing
//! separator stays with the root.

use crate::args::{opt_path_arg, path_arg};
use crate::host;
use crate::iter::push_path_elements;
use crate::tag;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tarn_core::{ret0, ret1, type_error, CapabilityTable, OperatorTable, Ret, Value, Vm};

fn recv<'a>(vm: &'a Vm, args: &[Value]) -> Result<&'a PathBuf, String> {
    match args.first() {
        Some(v) => vm
            .foreign::<PathBuf>(v, tag::PATH)
            .ok_or_else(|| type_error(1, "path", vm.shape_name(v))),
        None => Err(type_error(1, "path", "no value")),
    }
}

fn recv_mut<'a>(vm: &'a mut Vm, args: &[Value]) -> Result<&'a mut PathBuf, String> {
    match args.first() {
        Some(v) => {
            if vm.foreign::<PathBuf>(v, tag::PATH).is_none() {
                return Err(type_error(1, "path", vm.shape_name(v)));
            }
            Ok(vm
                .foreign_mut::<PathBuf>(v, tag::PATH)
                .unwrap_or_else(|| unreachable!()))
        }
        None => Err(type_error(1, "path", "no value")),
    }
}

// ---------------------------------------------------------------------------
// Decomposition helpers
// ---------------------------------------------------------------------------

pub(crate) fn root_name(p: &Path) -> PathBuf {
    match p.components().next() {
        Some(Component::Prefix(pre)) => PathBuf::from(pre.as_os_str()),
        _ => PathBuf::new(),
    }
}

pub(crate) fn root_directory(p: &Path) -> PathBuf {
    for c in p.components().take(2) {
        if let Component::RootDir = c {
            return PathBuf::from(c.as_os_str());
        }
    }
    PathBuf::new()
}

pub(crate) fn root_path(p: &Path) -> PathBuf {
    let mut out = root_name(p);
    out.push(root_directory(p));
    out
}

pub(crate) fn relative_part(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in p.components() {
        match c {
            Component::Prefix(_) | Component::RootDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

pub(crate) fn parent_part(p: &Path) -> PathBuf {
    let rel: Vec<Component<'_>> = p
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect();
    let mut out = root_path(p);
    if !rel.is_empty() {
        for c in &rel[..rel.len() - 1] {
            out.push(c.as_os_str());
        }
    }
    out
}

fn filename_part(p: &Path) -> PathBuf {
    p.file_name().map(PathBuf::from).unwrap_or_default()
}

fn stem_part(p: &Path) -> PathBuf {
    p.file_stem().map(PathBuf::from).unwrap_or_default()
}

fn extension_part(p: &Path) -> PathBuf {
    p.extension().map(PathBuf::from).unwrap_or_default()
}

fn remove_filename_in_place(p: &mut PathBuf) {
    if p.file_name().is_some() {
        let parent = p.parent().unwrap_or(Path::new("")).to_path_buf();
        // join("") keeps the trailing separator, so the directory part
        // survives as a directory.
        *p = parent.join("");
    }
}

fn replace_extension_in_place(p: &mut PathBuf, ext: Option<&Path>) {
    match ext {
        None => {
            let _ = p.set_extension("");
        }
        Some(e) => {
            let s = e.as_os_str();
            let trimmed = s
                .to_str()
                .map(|t| t.strip_prefix('.').unwrap_or(t).to_string());
            match trimmed {
                Some(t) => {
                    let _ = p.set_extension(t);
                }
                None => {
                    let _ = p.set_extension(s);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn path_tostring(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let this = recv(vm, args)?;
    Ok(ret1(Value::str(this.display().to_string())))
}

fn path_eq(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = path_arg(vm, args, 1)?;
    let right = path_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left == right)))
}

fn path_lt(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = path_arg(vm, args, 1)?;
    let right = path_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left < right)))
}

fn path_le(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = path_arg(vm, args, 1)?;
    let right = path_arg(vm, args, 2)?;
    Ok(ret1(Value::Bool(left <= right)))
}

// ---------------------------------------------------------------------------
// In-place mutators; each returns the receiver
// ---------------------------------------------------------------------------

fn path_concat(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let suffix = path_arg(vm, args, 2)?;
    let this = recv_mut(vm, args)?;
    let mut joined: OsString = std::mem::take(this).into_os_string();
    joined.push(suffix.as_os_str());
    *this = PathBuf::from(joined);
    Ok(ret1(args[0].clone()))
}

fn path_append(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let tail = path_arg(vm, args, 2)?;
    let this = recv_mut(vm, args)?;
    this.push(tail);
    Ok(ret1(args[0].clone()))
}

fn path_clear(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    recv_mut(vm, args)?.clear();
    Ok(ret0())
}

fn path_make_preferred(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let this = recv_mut(vm, args)?;
    #[cfg(windows)]
    {
        if let Some(s) = this.to_str() {
            *this = PathBuf::from(s.replace('/', "\\"));
        }
    }
    let _ = this;
    Ok(ret1(args[0].clone()))
}

fn path_remove_filename(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let this = recv_mut(vm, args)?;
    remove_filename_in_place(this);
    Ok(ret1(args[0].clone()))
}

fn path_replace_filename(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let name = path_arg(vm, args, 2)?;
    let this = recv_mut(vm, args)?;
    remove_filename_in_place(this);
    this.push(name);
    Ok(ret1(args[0].clone()))
}

fn path_replace_extension(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let ext = opt_path_arg(vm, args, 2)?;
    let this = recv_mut(vm, args)?;
    replace_extension_in_place(this, ext.as_deref());
    Ok(ret1(args[0].clone()))
}

// ---------------------------------------------------------------------------
// Decomposition and predicates
// ---------------------------------------------------------------------------

macro_rules! path_part {
    ($entry:ident, $part:expr) => {
        fn $entry(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
            let part = $part(recv(vm, args)?);
            Ok(ret1(vm.box_foreign(tag::PATH, part)))
        }
    };
}

path_part!(path_root_name, |p: &PathBuf| root_name(p));
path_part!(path_root_directory, |p: &PathBuf| root_directory(p));
path_part!(path_root_path, |p: &PathBuf| root_path(p));
path_part!(path_relative_path, |p: &PathBuf| relative_part(p));
path_part!(path_parent_path, |p: &PathBuf| parent_part(p));
path_part!(path_filename, |p: &PathBuf| filename_part(p));
path_part!(path_stem, |p: &PathBuf| stem_part(p));
path_part!(path_extension, |p: &PathBuf| extension_part(p));
path_part!(path_lexically_normal, |p: &PathBuf| host::lexically_normal(
    p
));

macro_rules! path_predicate {
    ($entry:ident, $test:expr) => {
        fn $entry(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
            let this = recv(vm, args)?;
            Ok(ret1(Value::Bool($test(this))))
        }
    };
}

path_predicate!(path_empty, |p: &PathBuf| p.as_os_str().is_empty());
path_predicate!(path_has_root_path, |p: &PathBuf| !root_path(p)
    .as_os_str()
    .is_empty());
path_predicate!(path_has_root_name, |p: &PathBuf| !root_name(p)
    .as_os_str()
    .is_empty());
path_predicate!(path_has_root_directory, |p: &PathBuf| !root_directory(p)
    .as_os_str()
    .is_empty());
path_predicate!(path_has_relative_path, |p: &PathBuf| !relative_part(p)
    .as_os_str()
    .is_empty());
path_predicate!(path_has_parent_path, |p: &PathBuf| !parent_part(p)
    .as_os_str()
    .is_empty());
path_predicate!(path_has_filename, |p: &PathBuf| p.file_name().is_some());
path_predicate!(path_has_stem, |p: &PathBuf| p.file_stem().is_some());
path_predicate!(path_has_extension, |p: &PathBuf| p.extension().is_some());
path_predicate!(path_is_absolute, |p: &PathBuf| p.is_absolute());
path_predicate!(path_is_relative, |p: &PathBuf| p.is_relative());

fn path_lexically_relative(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let base = path_arg(vm, args, 2)?;
    let rel = host::lexically_relative(recv(vm, args)?, &base);
    Ok(ret1(vm.box_foreign(tag::PATH, rel)))
}

fn path_lexically_proximate(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let base = path_arg(vm, args, 2)?;
    let prox = host::lexically_proximate(recv(vm, args)?, &base);
    Ok(ret1(vm.box_foreign(tag::PATH, prox)))
}

fn path_elements(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let this = recv(vm, args)?.clone();
    push_path_elements(vm, &this)
}

pub fn table() -> CapabilityTable {
    CapabilityTable {
        tag: tag::PATH,
        name: "path",
        operators: OperatorTable {
            to_string: Some(path_tostring),
            eq: Some(path_eq),
            lt: Some(path_lt),
            le: Some(path_le),
            ..OperatorTable::default()
        },
        methods: vec![
            ("concat", path_concat as tarn_core::NativeFn),
            ("append", path_append),
            ("clear", path_clear),
            ("make_preferred", path_make_preferred),
            ("remove_filename", path_remove_filename),
            ("replace_filename", path_replace_filename),
            ("replace_extension", path_replace_extension),
            ("root_name", path_root_name),
            ("root_directory", path_root_directory),
            ("root_path", path_root_path),
            ("relative_path", path_relative_path),
            ("parent_path", path_parent_path),
            ("filename", path_filename),
            ("stem", path_stem),
            ("extension", path_extension),
            ("empty", path_empty),
            ("has_root_path", path_has_root_path),
            ("has_root_name", path_has_root_name),
            ("has_root_directory", path_has_root_directory),
            ("has_relative_path", path_has_relative_path),
            ("has_parent_path", path_has_parent_path),
            ("has_filename", path_has_filename),
            ("has_stem", path_has_stem),
            ("has_extension", path_has_extension),
            ("is_absolute", path_is_absolute),
            ("is_relative", path_is_relative),
            ("lexically_normal", path_lexically_normal),
            ("lexically_relative", path_lexically_relative),
            ("lexically_proximate", path_lexically_proximate),
            ("elements", path_elements),
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

    fn boxed(vm: &mut Vm, p: &str) -> Value {
        vm.box_foreign(tag::PATH, PathBuf::from(p))
    }

    #[test]
    fn append_then_decompose() {
        let mut vm = vm_with_module();
        let p = boxed(&mut vm, "/usr");
        vm.call_method(&p, "append", &[Value::str("lib/tarn.so")])
            .unwrap();
        let name = vm.call_method(&p, "filename", &[]).unwrap();
        let name = vm.foreign::<PathBuf>(&name[0], tag::PATH).unwrap();
        assert_eq!(name, &PathBuf::from("tarn.so"));
        let ext = vm.call_method(&p, "extension", &[]).unwrap();
        let ext = vm.foreign::<PathBuf>(&ext[0], tag::PATH).unwrap();
        assert_eq!(ext, &PathBuf::from("so"));
    }

    #[test]
    fn mutators_return_the_receiver() {
        let mut vm = vm_with_module();
        let p = boxed(&mut vm, "a");
        let r = vm
            .call_method(&p, "concat", &[Value::str("b")])
            .unwrap();
        assert_eq!(r[0].as_foreign_id(), p.as_foreign_id());
        let stored = vm.foreign::<PathBuf>(&p, tag::PATH).unwrap();
        assert_eq!(stored, &PathBuf::from("ab"));
    }

    #[test]
    fn replace_extension_strips_the_leading_dot() {
        let mut vm = vm_with_module();
        let p = boxed(&mut vm, "note.txt");
        vm.call_method(&p, "replace_extension", &[Value::str(".md")])
            .unwrap();
        assert_eq!(
            vm.foreign::<PathBuf>(&p, tag::PATH).unwrap(),
            &PathBuf::from("note.md")
        );
        vm.call_method(&p, "replace_extension", &[Value::Nil])
            .unwrap();
        assert_eq!(
            vm.foreign::<PathBuf>(&p, tag::PATH).unwrap(),
            &PathBuf::from("note")
        );
    }

    #[test]
    fn comparison_admits_strings_on_either_side() {
        let mut vm = vm_with_module();
        let p = boxed(&mut vm, "a/b");
        let eq = path_eq(&mut vm, &[p.clone(), Value::str("a/b")]).unwrap();
        assert!(matches!(eq[0], Value::Bool(true)));
        let lt = path_lt(&mut vm, &[Value::str("a/a"), p]).unwrap();
        assert!(matches!(lt[0], Value::Bool(true)));
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(parent_part(Path::new("/")), PathBuf::from("/"));
        assert_eq!(parent_part(Path::new("/a")), PathBuf::from("/"));
        assert_eq!(parent_part(Path::new("a")), PathBuf::new());
        assert_eq!(parent_part(Path::new("a/b")), PathBuf::from("a"));
    }
}
