//! Host filesystem API shim.
//!
//! Everything here is trusted host surface: the operations the standard
//! library covers are re-exported through thin wrappers, and the ones it
//! does not (lexical path algebra, option-aware copy, the depth-tracked
//! recursive cursor, the space query) are implemented once here so the
//! binding layer above never touches path internals or raw I/O.

use crate::flags::{CopyOptions, DirectoryOptions, FileTypeTag, PermOptions, Perms};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};

fn err(kind: io::ErrorKind, msg: &str) -> io::Error {
    io::Error::new(kind, msg.to_string())
}

// ---------------------------------------------------------------------------
// Lexical path algebra
// ---------------------------------------------------------------------------

/// Normal form: no `.`, no interior `..`, empty collapses to `.`.
/// Idempotent by construction.
pub fn lexically_normal(p: &Path) -> PathBuf {
    if p.as_os_str().is_empty() {
        return PathBuf::new();
    }
    let mut parts: Vec<Component<'_>> = Vec::new();
    for c in p.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(c),
            },
            other => parts.push(other),
        }
    }
    let mut out = PathBuf::new();
    for c in &parts {
        out.push(c.as_os_str());
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

fn root_of<'a>(parts: &'a [Component<'a>]) -> &'a [Component<'a>] {
    let n = parts
        .iter()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .count();
    &parts[..n]
}

/// `p` made relative to `base` by pure component comparison. Empty result
/// means no lexical relative form exists (differing roots, or `base` backs
/// out past the common prefix).
pub fn lexically_relative(p: &Path, base: &Path) -> PathBuf {
    let a: Vec<Component<'_>> = p.components().collect();
    let b: Vec<Component<'_>> = base.components().collect();
    if root_of(&a) != root_of(&b) {
        return PathBuf::new();
    }
    let mut i = 0;
    while i < a.len() && i < b.len() && a[i] == b[i] {
        i += 1;
    }
    if i == a.len() && i == b.len() {
        return PathBuf::from(".");
    }
    let mut n: i64 = 0;
    for c in &b[i..] {
        match c {
            Component::Normal(_) => n += 1,
            Component::ParentDir => n -= 1,
            _ => {}
        }
    }
    if n < 0 {
        return PathBuf::new();
    }
    if n == 0 && i == a.len() {
        return PathBuf::from(".");
    }
    let mut out = PathBuf::new();
    for _ in 0..n {
        out.push("..");
    }
    for c in &a[i..] {
        out.push(c.as_os_str());
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

pub fn lexically_proximate(p: &Path, base: &Path) -> PathBuf {
    let rel = lexically_relative(p, base);
    if rel.as_os_str().is_empty() {
        p.to_path_buf()
    } else {
        rel
    }
}

/// Canonical form of the longest existing prefix, with the non-existing
/// tail appended and normalized. Falls back to the normal form when no
/// prefix exists.
pub fn weakly_canonical(p: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(p) {
        Ok(c) => return Ok(c),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    let mut head = p.to_path_buf();
    let mut tail: Vec<OsString> = Vec::new();
    while !head.as_os_str().is_empty() {
        match fs::canonicalize(&head) {
            Ok(c) => {
                let mut out = c;
                for part in tail.iter().rev() {
                    out.push(part);
                }
                return Ok(lexically_normal(&out));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match head.file_name() {
                    Some(name) => {
                        tail.push(name.to_os_string());
                        head.pop();
                    }
                    None => break,
                }
            }
            Err(e) => return Err(e),
        }
    }
    Ok(lexically_normal(p))
}

pub fn relative(p: &Path, base: &Path) -> io::Result<PathBuf> {
    Ok(lexically_relative(&weakly_canonical(p)?, &weakly_canonical(base)?))
}

pub fn proximate(p: &Path, base: &Path) -> io::Result<PathBuf> {
    Ok(lexically_proximate(&weakly_canonical(p)?, &weakly_canonical(base)?))
}

// ---------------------------------------------------------------------------
// Status, permissions, metadata queries
// ---------------------------------------------------------------------------

pub fn file_type_of(ft: fs::FileType) -> FileTypeTag {
    if ft.is_dir() {
        return FileTypeTag::DIRECTORY;
    }
    if ft.is_file() {
        return FileTypeTag::REGULAR;
    }
    if ft.is_symlink() {
        return FileTypeTag::SYMLINK;
    }
    #[cfg(unix)]
    {
        if ft.is_block_device() {
            return FileTypeTag::BLOCK;
        }
        if ft.is_char_device() {
            return FileTypeTag::CHARACTER;
        }
        if ft.is_fifo() {
            return FileTypeTag::FIFO;
        }
        if ft.is_socket() {
            return FileTypeTag::SOCKET;
        }
    }
    FileTypeTag::UNKNOWN
}

fn perms_of(meta: &fs::Metadata) -> Perms {
    #[cfg(unix)]
    {
        Perms(meta.mode() & 0o7777)
    }
    #[cfg(not(unix))]
    {
        if meta.permissions().readonly() {
            Perms(0o555)
        } else {
            Perms(0o777)
        }
    }
}

/// Followed status. Not-found is a status, not an error.
pub fn status(p: &Path) -> io::Result<(Perms, FileTypeTag)> {
    match fs::metadata(p) {
        Ok(m) => Ok((perms_of(&m), file_type_of(m.file_type()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((Perms::NONE, FileTypeTag::NOT_FOUND)),
        Err(e) => Err(e),
    }
}

/// Unfollowed status of the link itself.
pub fn symlink_status(p: &Path) -> io::Result<(Perms, FileTypeTag)> {
    match fs::symlink_metadata(p) {
        Ok(m) => Ok((perms_of(&m), file_type_of(m.file_type()))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok((Perms::NONE, FileTypeTag::NOT_FOUND)),
        Err(e) => Err(e),
    }
}

pub fn apply_permissions(p: &Path, perms: Perms, opts: PermOptions) -> io::Result<()> {
    if opts.contains(PermOptions::NOFOLLOW)
        && fs::symlink_metadata(p)?.file_type().is_symlink()
    {
        return Err(err(
            io::ErrorKind::Unsupported,
            "cannot change permissions of a symlink",
        ));
    }
    let current = perms_of(&fs::metadata(p)?).0;
    let mode = if opts.contains(PermOptions::ADD) {
        current | perms.0
    } else if opts.contains(PermOptions::REMOVE) {
        current & !perms.0
    } else {
        perms.0
    } & 0o7777;
    #[cfg(unix)]
    {
        fs::set_permissions(p, fs::Permissions::from_mode(mode))
    }
    #[cfg(not(unix))]
    {
        let mut p_attr = fs::metadata(p)?.permissions();
        p_attr.set_readonly(mode & 0o200 == 0);
        fs::set_permissions(p, p_attr)
    }
}

pub fn equivalent(a: &Path, b: &Path) -> io::Result<bool> {
    let ma = fs::metadata(a)?;
    let mb = fs::metadata(b)?;
    same_file(&ma, &mb, a, b)
}

#[cfg(unix)]
fn same_file(a: &fs::Metadata, b: &fs::Metadata, _pa: &Path, _pb: &Path) -> io::Result<bool> {
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_file(_a: &fs::Metadata, _b: &fs::Metadata, pa: &Path, pb: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(pa)? == fs::canonicalize(pb)?)
}

pub fn exists(p: &Path) -> io::Result<bool> {
    match fs::metadata(p) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Followed file-type predicate; not-found is `false`, access failures
/// propagate.
pub fn is_type(p: &Path, want: FileTypeTag) -> io::Result<bool> {
    let meta = if want == FileTypeTag::SYMLINK {
        fs::symlink_metadata(p)
    } else {
        fs::metadata(p)
    };
    match meta {
        Ok(m) => Ok(file_type_of(m.file_type()) == want),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Not a regular file, directory or symlink, but does exist.
pub fn is_other(p: &Path) -> io::Result<bool> {
    match fs::metadata(p) {
        Ok(m) => {
            let ft = m.file_type();
            Ok(!ft.is_file() && !ft.is_dir() && !ft.is_symlink())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn is_empty(p: &Path) -> io::Result<bool> {
    let m = fs::metadata(p)?;
    if m.is_dir() {
        Ok(fs::read_dir(p)?.next().is_none())
    } else {
        Ok(m.len() == 0)
    }
}

pub fn file_size(p: &Path) -> io::Result<u64> {
    let m = fs::metadata(p)?;
    if m.is_dir() {
        return Err(err(io::ErrorKind::InvalidInput, "Is a directory"));
    }
    Ok(m.len())
}

pub fn hard_link_count(p: &Path) -> io::Result<u64> {
    let m = fs::metadata(p)?;
    #[cfg(unix)]
    {
        Ok(m.nlink())
    }
    #[cfg(not(unix))]
    {
        let _ = m;
        Err(err(
            io::ErrorKind::Unsupported,
            "hard link count is not available on this platform",
        ))
    }
}

/// Capacity, free and available bytes, in that order.
#[cfg(unix)]
pub fn space(p: &Path) -> io::Result<(u64, u64, u64)> {
    use std::os::unix::ffi::OsStrExt;
    let c = std::ffi::CString::new(p.as_os_str().as_bytes())
        .map_err(|_| err(io::ErrorKind::InvalidInput, "path contains an interior nul"))?;
    let mut vfs: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c.as_ptr(), &mut vfs) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    let unit = vfs.f_frsize as u64;
    Ok((
        (vfs.f_blocks as u64).saturating_mul(unit),
        (vfs.f_bfree as u64).saturating_mul(unit),
        (vfs.f_bavail as u64).saturating_mul(unit),
    ))
}

#[cfg(not(unix))]
pub fn space(_p: &Path) -> io::Result<(u64, u64, u64)> {
    Err(err(
        io::ErrorKind::Unsupported,
        "space query is not available on this platform",
    ))
}

// ---------------------------------------------------------------------------
// Mutating operations
// ---------------------------------------------------------------------------

/// `true` when the directory was created; `false` when it already existed
/// as a directory.
pub fn create_directory(p: &Path) -> io::Result<bool> {
    match fs::create_dir(p) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if fs::metadata(p).map(|m| m.is_dir()).unwrap_or(false) {
                Ok(false)
            } else {
                Err(e)
            }
        }
        Err(e) => Err(e),
    }
}

/// Create `p` copying the permission attributes of `attributes`.
pub fn create_directory_with_attributes(p: &Path, attributes: &Path) -> io::Result<bool> {
    let attr_perms = fs::metadata(attributes)?.permissions();
    let created = create_directory(p)?;
    if created {
        fs::set_permissions(p, attr_perms)?;
    }
    Ok(created)
}

pub fn create_directories(p: &Path) -> io::Result<bool> {
    let existed = fs::metadata(p).map(|m| m.is_dir()).unwrap_or(false);
    fs::create_dir_all(p)?;
    Ok(!existed)
}

/// `true` when something was removed.
pub fn remove(p: &Path) -> io::Result<bool> {
    let meta = match fs::symlink_metadata(p) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        fs::remove_dir(p)?;
    } else {
        fs::remove_file(p)?;
    }
    Ok(true)
}

/// Recursive removal; returns how many entries were removed (the root
/// included), 0 when nothing existed.
pub fn remove_all(p: &Path) -> io::Result<u64> {
    let meta = match fs::symlink_metadata(p) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    if !meta.is_dir() {
        fs::remove_file(p)?;
        return Ok(1);
    }
    let mut count = 1u64;
    for ent in fs::read_dir(p)? {
        count += remove_all(&ent?.path())?;
    }
    fs::remove_dir(p)?;
    Ok(count)
}

pub fn resize_file(p: &Path, size: u64) -> io::Result<()> {
    fs::OpenOptions::new().write(true).open(p)?.set_len(size)
}

#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(unix)]
pub fn create_directory_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(windows)]
pub fn create_directory_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

pub fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = fs::read_link(from)?;
    #[cfg(windows)]
    {
        if fs::metadata(from).map(|m| m.is_dir()).unwrap_or(false) {
            return create_directory_symlink(&target, to);
        }
    }
    create_symlink(&target, to)
}

/// `copy_file` semantics: `true` when the contents were copied, `false`
/// when an existing destination was deliberately left alone.
pub fn copy_file(from: &Path, to: &Path, opts: CopyOptions) -> io::Result<bool> {
    let from_meta = fs::metadata(from)?;
    if !from_meta.is_file() {
        return Err(err(io::ErrorKind::InvalidInput, "not a regular file"));
    }
    match fs::metadata(to) {
        Ok(to_meta) => {
            if !to_meta.is_file() {
                return Err(err(
                    io::ErrorKind::AlreadyExists,
                    "destination exists and is not a regular file",
                ));
            }
            if same_file(&from_meta, &to_meta, from, to)? {
                return Err(err(io::ErrorKind::AlreadyExists, "File exists"));
            }
            if opts.contains(CopyOptions::SKIP_EXISTING) {
                return Ok(false);
            }
            if opts.contains(CopyOptions::UPDATE_EXISTING) {
                if from_meta.modified()? <= to_meta.modified()? {
                    return Ok(false);
                }
            } else if !opts.contains(CopyOptions::OVERWRITE_EXISTING) {
                return Err(err(io::ErrorKind::AlreadyExists, "File exists"));
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::copy(from, to)?;
    Ok(true)
}

/// Option-aware copy over files, directories and symlinks.
pub fn copy(from: &Path, to: &Path, opts: CopyOptions) -> io::Result<()> {
    let unfollowed = opts.contains(CopyOptions::CREATE_SYMLINKS)
        || opts.contains(CopyOptions::SKIP_SYMLINKS)
        || opts.contains(CopyOptions::COPY_SYMLINKS);
    let meta = if unfollowed {
        fs::symlink_metadata(from)?
    } else {
        fs::metadata(from)?
    };
    let ft = meta.file_type();

    if ft.is_symlink() {
        if opts.contains(CopyOptions::SKIP_SYMLINKS) {
            return Ok(());
        }
        if opts.contains(CopyOptions::COPY_SYMLINKS) {
            return copy_symlink(from, to);
        }
        return Err(err(io::ErrorKind::InvalidInput, "cannot copy a symlink"));
    }

    if meta.is_dir() {
        if opts.contains(CopyOptions::CREATE_SYMLINKS) {
            return Err(err(io::ErrorKind::InvalidInput, "Is a directory"));
        }
        if opts.contains(CopyOptions::RECURSIVE) || opts.0 == 0 {
            match fs::create_dir(to) {
                Ok(()) => {}
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists
                        && fs::metadata(to).map(|m| m.is_dir()).unwrap_or(false) => {}
                Err(e) => return Err(e),
            }
            for ent in fs::read_dir(from)? {
                let ent = ent?;
                if ent.file_type()?.is_dir() && !opts.contains(CopyOptions::RECURSIVE) {
                    continue;
                }
                copy(&ent.path(), &to.join(ent.file_name()), opts)?;
            }
        }
        return Ok(());
    }

    if meta.is_file() {
        if opts.contains(CopyOptions::DIRECTORIES_ONLY) {
            return Ok(());
        }
        if opts.contains(CopyOptions::CREATE_SYMLINKS) {
            return create_symlink(from, to);
        }
        if opts.contains(CopyOptions::CREATE_HARD_LINKS) {
            return fs::hard_link(from, to);
        }
        let dest = if fs::metadata(to).map(|m| m.is_dir()).unwrap_or(false) {
            match from.file_name() {
                Some(name) => to.join(name),
                None => to.to_path_buf(),
            }
        } else {
            to.to_path_buf()
        };
        return copy_file(from, &dest, opts).map(|_| ());
    }

    Err(err(io::ErrorKind::InvalidInput, "cannot copy this file type"))
}

// ---------------------------------------------------------------------------
// Recursive directory cursor
// ---------------------------------------------------------------------------

/// One dereferenceable position in a recursive traversal.
pub struct CursorEntry {
    pub path: PathBuf,
    file_type: fs::FileType,
}

/// Depth-tracked recursive directory cursor. The cursor is positioned on
/// the first entry at construction; each `advance` descends into the
/// previously yielded directory unless recursion was disabled for that
/// step. Exhaustion (empty stack, no current entry) is a latch.
pub struct RecursiveCursor {
    stack: Vec<fs::ReadDir>,
    current: Option<CursorEntry>,
    pending: bool,
    opts: DirectoryOptions,
}

impl RecursiveCursor {
    pub fn open(path: &Path, opts: DirectoryOptions) -> io::Result<Self> {
        let mut cursor = Self {
            stack: Vec::new(),
            current: None,
            pending: true,
            opts,
        };
        match fs::read_dir(path) {
            Ok(rd) => {
                cursor.stack.push(rd);
                cursor.next_in_stack()?;
            }
            Err(e)
                if e.kind() == io::ErrorKind::PermissionDenied
                    && opts.contains(DirectoryOptions::SKIP_PERMISSION_DENIED) => {}
            Err(e) => return Err(e),
        }
        Ok(cursor)
    }

    pub fn at_end(&self) -> bool {
        self.current.is_none() && self.stack.is_empty()
    }

    pub fn current(&self) -> Option<&CursorEntry> {
        self.current.as_ref()
    }

    /// 0 for entries directly under the starting directory.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    pub fn recursion_pending(&self) -> bool {
        self.pending
    }

    pub fn disable_recursion_pending(&mut self) {
        self.pending = false;
    }

    pub fn options(&self) -> DirectoryOptions {
        self.opts
    }

    fn wants_descent(&self, cur: &CursorEntry) -> bool {
        if cur.file_type.is_dir() {
            return true;
        }
        if cur.file_type.is_symlink()
            && self.opts.contains(DirectoryOptions::FOLLOW_DIRECTORY_SYMLINK)
        {
            return fs::metadata(&cur.path).map(|m| m.is_dir()).unwrap_or(false);
        }
        false
    }

    /// Advance one step: descend into the current entry when it is a
    /// directory and recursion is pending, otherwise continue with the next
    /// sibling, popping exhausted levels. A failed step latches the cursor
    /// to the end position before the error propagates.
    pub fn advance(&mut self) -> io::Result<()> {
        let Some(cur) = self.current.take() else {
            return Ok(());
        };
        if self.pending && self.wants_descent(&cur) {
            match fs::read_dir(&cur.path) {
                Ok(rd) => self.stack.push(rd),
                Err(e)
                    if e.kind() == io::ErrorKind::PermissionDenied
                        && self.opts.contains(DirectoryOptions::SKIP_PERMISSION_DENIED) => {}
                Err(e) => {
                    self.stack.clear();
                    return Err(e);
                }
            }
        }
        self.pending = true;
        self.next_in_stack()
    }

    /// Abandon the directory containing the current entry and resume with
    /// the parent's next entry. A no-op once exhausted.
    pub fn pop(&mut self) -> io::Result<()> {
        if self.at_end() {
            return Ok(());
        }
        self.current = None;
        self.stack.pop();
        self.pending = true;
        self.next_in_stack()
    }

    fn next_in_stack(&mut self) -> io::Result<()> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(Ok(ent)) => match ent.file_type() {
                    Ok(file_type) => {
                        self.current = Some(CursorEntry {
                            path: ent.path(),
                            file_type,
                        });
                        return Ok(());
                    }
                    Err(e) => {
                        self.stack.clear();
                        return Err(e);
                    }
                },
                Some(Err(e)) => {
                    self.stack.clear();
                    return Err(e);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_form_is_idempotent_and_collapses_dots() {
        let p = lexically_normal(Path::new("a/./b/../c//d"));
        assert_eq!(p, PathBuf::from("a/c/d"));
        assert_eq!(lexically_normal(&p), p);
        assert_eq!(lexically_normal(Path::new("a/..")), PathBuf::from("."));
        assert_eq!(lexically_normal(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(lexically_normal(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn cursor_pop_resumes_with_the_parents_next_entry() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("inner")).unwrap();
        fs::write(root.join("inner/f1"), b"x").unwrap();
        fs::write(root.join("inner/f2"), b"x").unwrap();
        fs::write(root.join("tail"), b"x").unwrap();

        let mut cursor = RecursiveCursor::open(root, DirectoryOptions::NONE).unwrap();
        let mut names = Vec::new();
        while !cursor.at_end() {
            let path = cursor.current().unwrap().path.clone();
            names.push(path.file_name().unwrap().to_string_lossy().into_owned());
            if cursor.depth() == 1 {
                // First entry inside "inner": abandon the rest of that
                // subtree and resume with the parent's next entry.
                cursor.pop().unwrap();
                assert!(cursor.at_end() || cursor.depth() == 0);
                continue;
            }
            cursor.advance().unwrap();
        }
        // Both of the root's entries, exactly one of inner's two files.
        assert_eq!(names.len(), 3);
        assert!(names.contains(&String::from("inner")));
        assert!(names.contains(&String::from("tail")));
        let pruned = names.iter().filter(|n| *n == "f1" || *n == "f2").count();
        assert_eq!(pruned, 1);
    }

    #[test]
    fn cursor_failed_descent_latches_to_the_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut cursor = RecursiveCursor::open(dir.path(), DirectoryOptions::NONE).unwrap();
        assert!(!cursor.at_end());
        fs::remove_dir(dir.path().join("sub")).unwrap();
        assert!(cursor.advance().is_err());
        assert!(cursor.at_end());
    }

    #[test]
    fn relative_forms() {
        assert_eq!(
            lexically_relative(Path::new("/a/d"), Path::new("/a/b/c")),
            PathBuf::from("../../d")
        );
        assert_eq!(
            lexically_relative(Path::new("/a/b/c"), Path::new("/a")),
            PathBuf::from("b/c")
        );
        assert_eq!(
            lexically_relative(Path::new("a/b"), Path::new("a/b")),
            PathBuf::from(".")
        );
        assert_eq!(
            lexically_relative(Path::new("a/b"), Path::new("/a/b")),
            PathBuf::new()
        );
        assert_eq!(
            lexically_proximate(Path::new("a/b"), Path::new("/a/b")),
            PathBuf::from("a/b")
        );
    }
}
