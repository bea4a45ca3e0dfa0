//! Boxed enumeration and bit-flag constants.
//!
//! Flag sets get equality plus bitwise combination; plain enumerations get
//! equality only. Combination is a raw bit model: bits outside the declared
//! set are preserved, never validated.

use crate::tag;
use tarn_core::{ret1, CapabilityTable, NativeFn, OperatorTable, Ret, Value, Vm};

/// A boxed flag or enumeration type: a tag, a script-facing name, and a raw
/// bit pattern.
pub trait FlagDef: Copy + Eq + 'static {
    const TAG: &'static str;
    const NAME: &'static str;
    fn bits(self) -> u32;
    fn from_bits(bits: u32) -> Self;
}

macro_rules! flag_newtype {
    ($ty:ident, $tag:expr, $name:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $ty(pub u32);

        impl FlagDef for $ty {
            const TAG: &'static str = $tag;
            const NAME: &'static str = $name;
            fn bits(self) -> u32 {
                self.0
            }
            fn from_bits(bits: u32) -> Self {
                $ty(bits)
            }
        }

        impl $ty {
            pub fn contains(self, other: $ty) -> bool {
                self.0 & other.0 == other.0
            }
        }
    };
}

flag_newtype!(DirectoryOptions, tag::DIRECTORY_OPTIONS, "directory options");
flag_newtype!(CopyOptions, tag::COPY_OPTIONS, "copy options");
flag_newtype!(Perms, tag::PERMS, "permissions");
flag_newtype!(PermOptions, tag::PERM_OPTIONS, "permission options");

impl DirectoryOptions {
    pub const NONE: DirectoryOptions = DirectoryOptions(0);
    pub const FOLLOW_DIRECTORY_SYMLINK: DirectoryOptions = DirectoryOptions(1);
    pub const SKIP_PERMISSION_DENIED: DirectoryOptions = DirectoryOptions(2);
}

impl CopyOptions {
    pub const NONE: CopyOptions = CopyOptions(0);
    pub const SKIP_EXISTING: CopyOptions = CopyOptions(1);
    pub const OVERWRITE_EXISTING: CopyOptions = CopyOptions(2);
    pub const UPDATE_EXISTING: CopyOptions = CopyOptions(4);
    pub const RECURSIVE: CopyOptions = CopyOptions(8);
    pub const COPY_SYMLINKS: CopyOptions = CopyOptions(16);
    pub const SKIP_SYMLINKS: CopyOptions = CopyOptions(32);
    pub const DIRECTORIES_ONLY: CopyOptions = CopyOptions(64);
    pub const CREATE_SYMLINKS: CopyOptions = CopyOptions(128);
    pub const CREATE_HARD_LINKS: CopyOptions = CopyOptions(256);
}

impl Perms {
    pub const NONE: Perms = Perms(0);
    pub const OWNER_READ: Perms = Perms(0o400);
    pub const OWNER_WRITE: Perms = Perms(0o200);
    pub const OWNER_EXEC: Perms = Perms(0o100);
    pub const OWNER_ALL: Perms = Perms(0o700);
    pub const GROUP_READ: Perms = Perms(0o040);
    pub const GROUP_WRITE: Perms = Perms(0o020);
    pub const GROUP_EXEC: Perms = Perms(0o010);
    pub const GROUP_ALL: Perms = Perms(0o070);
    pub const OTHERS_READ: Perms = Perms(0o004);
    pub const OTHERS_WRITE: Perms = Perms(0o002);
    pub const OTHERS_EXEC: Perms = Perms(0o001);
    pub const OTHERS_ALL: Perms = Perms(0o007);
    pub const ALL: Perms = Perms(0o777);
    pub const SET_UID: Perms = Perms(0o4000);
    pub const SET_GID: Perms = Perms(0o2000);
    pub const STICKY_BIT: Perms = Perms(0o1000);
    pub const MASK: Perms = Perms(0o7777);
}

impl PermOptions {
    pub const REPLACE: PermOptions = PermOptions(1);
    pub const ADD: PermOptions = PermOptions(2);
    pub const REMOVE: PermOptions = PermOptions(4);
    pub const NOFOLLOW: PermOptions = PermOptions(8);
}

/// Plain enumeration: file type discriminants. Equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTypeTag(pub i32);

impl FlagDef for FileTypeTag {
    const TAG: &'static str = tag::FILE_TYPE;
    const NAME: &'static str = "file type";
    fn bits(self) -> u32 {
        self.0 as u32
    }
    fn from_bits(bits: u32) -> Self {
        FileTypeTag(bits as i32)
    }
}

impl FileTypeTag {
    pub const NONE: FileTypeTag = FileTypeTag(0);
    pub const NOT_FOUND: FileTypeTag = FileTypeTag(-1);
    pub const REGULAR: FileTypeTag = FileTypeTag(1);
    pub const DIRECTORY: FileTypeTag = FileTypeTag(2);
    pub const SYMLINK: FileTypeTag = FileTypeTag(3);
    pub const BLOCK: FileTypeTag = FileTypeTag(4);
    pub const CHARACTER: FileTypeTag = FileTypeTag(5);
    pub const FIFO: FileTypeTag = FileTypeTag(6);
    pub const SOCKET: FileTypeTag = FileTypeTag(7);
    pub const UNKNOWN: FileTypeTag = FileTypeTag(8);
    #[cfg(windows)]
    pub const JUNCTION: FileTypeTag = FileTypeTag(9);
}

/// Copy a boxed flag value out of an argument position, raising the typed
/// argument error on any other shape.
pub fn check_flag<T: FlagDef>(vm: &Vm, args: &[Value], pos: usize) -> Result<T, String> {
    match args.get(pos - 1) {
        Some(v) => vm
            .foreign::<T>(v, T::TAG)
            .copied()
            .ok_or_else(|| tarn_core::type_error(pos, T::NAME, vm.shape_name(v))),
        None => Err(tarn_core::type_error(pos, T::NAME, "no value")),
    }
}

fn flag_eq<T: FlagDef>(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = check_flag::<T>(vm, args, 1)?;
    let right = check_flag::<T>(vm, args, 2)?;
    Ok(ret1(Value::Bool(left == right)))
}

fn flag_band<T: FlagDef>(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = check_flag::<T>(vm, args, 1)?;
    let right = check_flag::<T>(vm, args, 2)?;
    Ok(ret1(vm.box_foreign(
        T::TAG,
        T::from_bits(left.bits() & right.bits()),
    )))
}

fn flag_bor<T: FlagDef>(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = check_flag::<T>(vm, args, 1)?;
    let right = check_flag::<T>(vm, args, 2)?;
    Ok(ret1(vm.box_foreign(
        T::TAG,
        T::from_bits(left.bits() | right.bits()),
    )))
}

fn flag_bxor<T: FlagDef>(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let left = check_flag::<T>(vm, args, 1)?;
    let right = check_flag::<T>(vm, args, 2)?;
    Ok(ret1(vm.box_foreign(
        T::TAG,
        T::from_bits(left.bits() ^ right.bits()),
    )))
}

fn flag_bnot<T: FlagDef>(vm: &mut Vm, args: &[Value]) -> Result<Ret, String> {
    let operand = check_flag::<T>(vm, args, 1)?;
    Ok(ret1(vm.box_foreign(T::TAG, T::from_bits(!operand.bits()))))
}

/// Capability table for a bit-flag set.
pub fn flag_table<T: FlagDef>() -> CapabilityTable {
    CapabilityTable {
        tag: T::TAG,
        name: T::NAME,
        operators: OperatorTable {
            eq: Some(flag_eq::<T> as NativeFn),
            band: Some(flag_band::<T> as NativeFn),
            bor: Some(flag_bor::<T> as NativeFn),
            bxor: Some(flag_bxor::<T> as NativeFn),
            bnot: Some(flag_bnot::<T> as NativeFn),
            ..OperatorTable::default()
        },
        methods: Vec::new(),
        finalizer: None,
    }
}

/// Capability table for a plain enumeration.
pub fn enum_table<T: FlagDef>() -> CapabilityTable {
    CapabilityTable {
        tag: T::TAG,
        name: T::NAME,
        operators: OperatorTable {
            eq: Some(flag_eq::<T> as NativeFn),
            ..OperatorTable::default()
        },
        methods: Vec::new(),
        finalizer: None,
    }
}
