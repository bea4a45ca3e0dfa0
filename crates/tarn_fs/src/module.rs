//! Module initialization.
//!
//! `open_filesystem` installs every capability table exactly once and
//! returns the function and constant tables for the embedder to splice
//! into its global environment. Constants are boxed values, so scripts
//! combine them with the same operators the bound operations accept.

use crate::entry_obj;
use crate::facade;
use crate::flags::{
    enum_table, flag_table, CopyOptions, DirectoryOptions, FileTypeTag, PermOptions, Perms,
};
use crate::ftime;
use crate::iter;
use crate::path_obj;
use crate::tag;
use tarn_core::{NativeFn, Value, Vm};

pub struct ModuleExports {
    pub functions: Vec<(&'static str, NativeFn)>,
    pub constants: Vec<(&'static str, Vec<(&'static str, Value)>)>,
}

impl ModuleExports {
    pub fn function(&self, name: &str) -> Option<NativeFn> {
        self.functions
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
    }

    pub fn constant(&self, table: &str, name: &str) -> Option<&Value> {
        self.constants
            .iter()
            .find(|(t, _)| *t == table)
            .and_then(|(_, entries)| entries.iter().find(|(n, _)| *n == name))
            .map(|(_, v)| v)
    }
}

/// Install the filesystem module into a runtime. Calling this twice on the
/// same runtime is an initialization bug and panics.
pub fn open_filesystem(vm: &mut Vm) -> ModuleExports {
    vm.register_type(path_obj::table());
    vm.register_type(iter::path_elements_table());
    vm.register_type(iter::directory_iterator_table());
    vm.register_type(iter::recursive_directory_iterator_table());
    vm.register_type(entry_obj::table());
    vm.register_type(flag_table::<DirectoryOptions>());
    vm.register_type(flag_table::<CopyOptions>());
    vm.register_type(flag_table::<Perms>());
    vm.register_type(flag_table::<PermOptions>());
    vm.register_type(enum_table::<FileTypeTag>());
    vm.register_type(ftime::table());

    let directory_options = vec![
        ("none", vm.box_foreign(tag::DIRECTORY_OPTIONS, DirectoryOptions::NONE)),
        (
            "follow_directory_symlink",
            vm.box_foreign(
                tag::DIRECTORY_OPTIONS,
                DirectoryOptions::FOLLOW_DIRECTORY_SYMLINK,
            ),
        ),
        (
            "skip_permission_denied",
            vm.box_foreign(
                tag::DIRECTORY_OPTIONS,
                DirectoryOptions::SKIP_PERMISSION_DENIED,
            ),
        ),
    ];

    let copy_options = vec![
        ("none", vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::NONE)),
        ("skip_existing", vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::SKIP_EXISTING)),
        (
            "overwrite_existing",
            vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::OVERWRITE_EXISTING),
        ),
        (
            "update_existing",
            vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::UPDATE_EXISTING),
        ),
        ("recursive", vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::RECURSIVE)),
        ("copy_symlinks", vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::COPY_SYMLINKS)),
        ("skip_symlinks", vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::SKIP_SYMLINKS)),
        (
            "directories_only",
            vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::DIRECTORIES_ONLY),
        ),
        (
            "create_symlinks",
            vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::CREATE_SYMLINKS),
        ),
        (
            "create_hard_links",
            vm.box_foreign(tag::COPY_OPTIONS, CopyOptions::CREATE_HARD_LINKS),
        ),
    ];

    let perms = vec![
        ("none", vm.box_foreign(tag::PERMS, Perms::NONE)),
        ("owner_read", vm.box_foreign(tag::PERMS, Perms::OWNER_READ)),
        ("owner_write", vm.box_foreign(tag::PERMS, Perms::OWNER_WRITE)),
        ("owner_exec", vm.box_foreign(tag::PERMS, Perms::OWNER_EXEC)),
        ("owner_all", vm.box_foreign(tag::PERMS, Perms::OWNER_ALL)),
        ("group_read", vm.box_foreign(tag::PERMS, Perms::GROUP_READ)),
        ("group_write", vm.box_foreign(tag::PERMS, Perms::GROUP_WRITE)),
        ("group_exec", vm.box_foreign(tag::PERMS, Perms::GROUP_EXEC)),
        ("group_all", vm.box_foreign(tag::PERMS, Perms::GROUP_ALL)),
        ("others_read", vm.box_foreign(tag::PERMS, Perms::OTHERS_READ)),
        ("others_write", vm.box_foreign(tag::PERMS, Perms::OTHERS_WRITE)),
        ("others_exec", vm.box_foreign(tag::PERMS, Perms::OTHERS_EXEC)),
        ("others_all", vm.box_foreign(tag::PERMS, Perms::OTHERS_ALL)),
        ("all", vm.box_foreign(tag::PERMS, Perms::ALL)),
        ("set_uid", vm.box_foreign(tag::PERMS, Perms::SET_UID)),
        ("set_gid", vm.box_foreign(tag::PERMS, Perms::SET_GID)),
        ("sticky_bit", vm.box_foreign(tag::PERMS, Perms::STICKY_BIT)),
        ("mask", vm.box_foreign(tag::PERMS, Perms::MASK)),
    ];

    let perm_options = vec![
        ("replace", vm.box_foreign(tag::PERM_OPTIONS, PermOptions::REPLACE)),
        ("add", vm.box_foreign(tag::PERM_OPTIONS, PermOptions::ADD)),
        ("remove", vm.box_foreign(tag::PERM_OPTIONS, PermOptions::REMOVE)),
        ("nofollow", vm.box_foreign(tag::PERM_OPTIONS, PermOptions::NOFOLLOW)),
    ];

    #[allow(unused_mut)]
    let mut file_type = vec![
        ("none", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::NONE)),
        ("not_found", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::NOT_FOUND)),
        ("regular", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::REGULAR)),
        ("directory", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::DIRECTORY)),
        ("symlink", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::SYMLINK)),
        ("block", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::BLOCK)),
        ("character", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::CHARACTER)),
        ("fifo", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::FIFO)),
        ("socket", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::SOCKET)),
        ("unknown", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::UNKNOWN)),
    ];
    #[cfg(windows)]
    file_type.push(("junction", vm.box_foreign(tag::FILE_TYPE, FileTypeTag::JUNCTION)));

    ModuleExports {
        functions: facade::functions(),
        constants: vec![
            ("directory_options", directory_options),
            ("copy_options", copy_options),
            ("perms", perms),
            ("perm_options", perm_options),
            ("file_type", file_type),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_cover_the_whole_surface() {
        let mut vm = Vm::new();
        let exports = open_filesystem(&mut vm);
        assert_eq!(exports.functions.len(), 43);
        for name in ["path", "copy", "space", "recursive_directory", "is_symlink"] {
            assert!(exports.function(name).is_some(), "missing {name}");
        }
        assert!(exports.constant("perms", "owner_read").is_some());
        assert!(exports.constant("file_type", "not_found").is_some());
        assert!(exports.constant("copy_options", "recursive").is_some());
    }

    #[test]
    fn every_boxed_type_is_registered() {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        for t in [
            tag::PATH,
            tag::PATH_ELEMENTS,
            tag::DIRECTORY_ITERATOR,
            tag::RECURSIVE_DIRECTORY_ITERATOR,
            tag::DIRECTORY_ENTRY,
            tag::DIRECTORY_OPTIONS,
            tag::COPY_OPTIONS,
            tag::PERMS,
            tag::PERM_OPTIONS,
            tag::FILE_TYPE,
            tag::FILE_TIME,
        ] {
            assert!(vm.is_registered(t), "unregistered: {t}");
        }
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn double_initialization_is_fatal() {
        let mut vm = Vm::new();
        let _ = open_filesystem(&mut vm);
        let _ = open_filesystem(&mut vm);
    }
}
