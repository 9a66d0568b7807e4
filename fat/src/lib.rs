//! FAT12/16/32 volume formatter.
//!
//! Given a block-addressed partition and its capacity, plans a valid
//! on-disk layout and writes the MBR, boot sector(s), FAT copies and
//! root directory that make up an empty FAT filesystem. Everything
//! goes through the [`fatforge_core::BlockDevice`] sector interface
//! and a caller-owned one-sector scratch buffer.

pub mod boot_sector;
pub mod constants;
pub mod fat_init;
pub mod formatter;
pub mod layout;
pub mod mbr;
pub mod root_dir;

pub use formatter::{FatFormatter, FormatStage};
pub use layout::{FatType, Layout};
