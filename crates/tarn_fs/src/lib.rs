//! Filesystem bindings for the Tarn scripting runtime.
//!
//! `open_filesystem` registers one capability table per boxed native type
//! and returns the module's function and constant tables. Scripts then
//! construct, compare and mutate path values and directory cursors with the
//! host API's semantics, while the runtime's collector owns every boxed
//! value's lifetime.

#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

mod args;
mod boundary;
mod entry_obj;
mod facade;
mod flags;
mod ftime;
mod host;
mod iter;
mod module;
mod path_obj;

pub use flags::{CopyOptions, DirectoryOptions, FileTypeTag, PermOptions, Perms};
pub use ftime::FileTime;
pub use module::{open_filesystem, ModuleExports};

/// Capability-table tags for every boxed native type. Process-unique.
pub mod tag {
    pub const PATH: &str = "path.fs.tarn";
    pub const PATH_ELEMENTS: &str = "path_elements.fs.tarn";
    pub const DIRECTORY_ITERATOR: &str = "directory_iterator.fs.tarn";
    pub const RECURSIVE_DIRECTORY_ITERATOR: &str = "recursive_directory_iterator.fs.tarn";
    pub const DIRECTORY_ENTRY: &str = "directory_entry.fs.tarn";
    pub const DIRECTORY_OPTIONS: &str = "directory_options.fs.tarn";
    pub const COPY_OPTIONS: &str = "copy_options.fs.tarn";
    pub const PERMS: &str = "perms.fs.tarn";
    pub const PERM_OPTIONS: &str = "perm_options.fs.tarn";
    pub const FILE_TYPE: &str = "file_type.fs.tarn";
    pub const FILE_TIME: &str = "file_time.fs.tarn";
}
