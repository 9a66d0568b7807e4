// Boot sector (PBS/BPB) and FSInfo construction.
//
// The packed structs mirror the on-disk layout byte for byte; sizes
// are asserted at compile time so a field edit cannot silently shift
// the wire format.

use crate::constants::*;
use crate::layout::{FatType, Layout};
use fatforge_core::{BlockDevice, FormatError, SectorBuf, SECTOR_SIZE};
use log::{info, warn};
use static_assertions::const_assert_eq;

/// First 36 bytes shared by every FAT boot sector.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct CommonBpb {
    pub jump_boot: [u8; 3],
    pub oem_name: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_entries: u16,
    pub total_sectors_16: u16,
    pub media_descriptor: u8,
    pub sectors_per_fat_16: u16,
    pub sectors_per_track: u16,
    pub num_heads: u16,
    pub hidden_sectors: u32,
    pub total_sectors_32: u32,
}

/// Boot sector for FAT12 and FAT16 volumes.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct Fat16BootSector {
    pub bpb: CommonBpb,
    pub drive_number: u8,
    pub reserved: u8,
    pub ext_boot_signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],
    pub boot_code: [u8; 448],
    pub boot_signature: u16,
}

/// Boot sector for FAT32 volumes.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct Fat32BootSector {
    pub bpb: CommonBpb,
    pub sectors_per_fat_32: u32,
    pub ext_flags: u16,
    pub fs_version: u16,
    pub root_cluster: u32,
    pub fs_info: u16,
    pub backup_boot_sector: u16,
    pub reserved: [u8; 12],
    pub drive_number: u8,
    pub reserved1: u8,
    pub ext_boot_signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],
    pub boot_code: [u8; 420],
    pub boot_signature: u16,
}

/// FAT32 FSInfo sector.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct FsInfoSector {
    pub lead_signature: u32,
    pub reserved1: [u8; 480],
    pub struct_signature: u32,
    pub free_count: u32,
    pub next_free: u32,
    pub reserved2: [u8; 12],
    pub trail_signature: u32,
}

const_assert_eq!(core::mem::size_of::<CommonBpb>(), 36);
const_assert_eq!(core::mem::size_of::<Fat16BootSector>(), SECTOR_SIZE);
const_assert_eq!(core::mem::size_of::<Fat32BootSector>(), SECTOR_SIZE);
const_assert_eq!(core::mem::size_of::<FsInfoSector>(), SECTOR_SIZE);

const OEM_NAME: [u8; 8] = *b"FATFORGE";

impl CommonBpb {
    fn for_layout(layout: &Layout, media_descriptor: u8) -> Self {
        let (total_16, total_32) = if layout.total_sectors < 65536 && layout.fat_type != FatType::Fat32 {
            (layout.total_sectors as u16, 0)
        } else {
            (0, layout.total_sectors)
        };
        Self {
            jump_boot: match layout.fat_type {
                FatType::Fat32 => [0xEB, 0x58, 0x90],
                _ => [0xEB, 0x3C, 0x90],
            },
            oem_name: OEM_NAME,
            bytes_per_sector: SECTOR_SIZE as u16,
            sectors_per_cluster: layout.sectors_per_cluster,
            reserved_sectors: layout.reserved_sectors,
            num_fats: layout.num_fats,
            root_entries: layout.root_entries,
            total_sectors_16: total_16,
            media_descriptor,
            sectors_per_fat_16: match layout.fat_type {
                FatType::Fat32 => 0,
                _ => layout.fat_size as u16,
            },
            sectors_per_track: 63,
            num_heads: 255,
            hidden_sectors: layout.relative_sectors,
            total_sectors_32: total_32,
        }
    }
}

impl Fat16BootSector {
    pub fn for_layout(
        layout: &Layout,
        volume_label: [u8; 11],
        volume_id: u32,
        media_descriptor: u8,
    ) -> Self {
        Self {
            bpb: CommonBpb::for_layout(layout, media_descriptor),
            drive_number: 0x80,
            reserved: 0,
            ext_boot_signature: 0x29,
            volume_id,
            volume_label,
            fs_type: match layout.fat_type {
                FatType::Fat12 => *b"FAT12   ",
                _ => *b"FAT16   ",
            },
            boot_code: [0; 448],
            boot_signature: 0xAA55,
        }
    }

    pub fn as_bytes(&self) -> &SectorBuf {
        unsafe { &*(self as *const Self as *const SectorBuf) }
    }
}

impl Fat32BootSector {
    pub fn for_layout(
        layout: &Layout,
        volume_label: [u8; 11],
        volume_id: u32,
        media_descriptor: u8,
    ) -> Self {
        Self {
            bpb: CommonBpb::for_layout(layout, media_descriptor),
            sectors_per_fat_32: layout.fat_size,
            ext_flags: 0,
            fs_version: 0,
            root_cluster: FAT32_ROOT_CLUSTER,
            fs_info: FAT32_FS_INFO_SECTOR,
            backup_boot_sector: FAT32_BACKUP_BOOT_SECTOR,
            reserved: [0; 12],
            drive_number: 0x80,
            reserved1: 0,
            ext_boot_signature: 0x29,
            volume_id,
            volume_label,
            fs_type: *b"FAT32   ",
            boot_code: [0; 420],
            boot_signature: 0xAA55,
        }
    }

    pub fn as_bytes(&self) -> &SectorBuf {
        unsafe { &*(self as *const Self as *const SectorBuf) }
    }
}

impl FsInfoSector {
    pub fn new(free_count: u32, next_free: u32) -> Self {
        Self {
            lead_signature: 0x4161_5252,   // "RRaA"
            reserved1: [0; 480],
            struct_signature: 0x6141_7272, // "rrAa"
            free_count,
            next_free,
            reserved2: [0; 12],
            trail_signature: 0xAA55_0000,
        }
    }

    pub fn as_bytes(&self) -> &SectorBuf {
        unsafe { &*(self as *const Self as *const SectorBuf) }
    }
}

/// Uppercase, truncate to 11 bytes and space-pad. `None` yields the
/// conventional "NO NAME" placeholder.
pub fn format_volume_label(label: Option<&str>) -> [u8; 11] {
    let mut result = *b"NO NAME    ";
    if let Some(label) = label {
        if label.len() > 11 {
            warn!("volume label '{}' truncated to 11 characters", label);
        }
        result = [0x20u8; 11];
        let upper = label.to_uppercase();
        let bytes = upper.as_bytes();
        let len = bytes.len().min(11);
        result[..len].copy_from_slice(&bytes[..len]);
    }
    result
}

/// Random non-zero volume serial number.
pub fn generate_volume_serial() -> u32 {
    let serial: u32 = rand::random();
    if serial == 0 {
        0x2023_0615
    } else {
        serial
    }
}

/// Write the boot sector at the partition start, plus FSInfo and the
/// backup copies for FAT32.
pub fn write_boot_sectors(
    dev: &mut dyn BlockDevice,
    layout: &Layout,
    volume_label: [u8; 11],
    volume_id: u32,
    media_descriptor: u8,
    scratch: &mut SectorBuf,
) -> Result<(), FormatError> {
    let start = layout.relative_sectors as u64;
    match layout.fat_type {
        FatType::Fat32 => {
            let pbs = Fat32BootSector::for_layout(layout, volume_label, volume_id, media_descriptor);
            // Free count excludes the cluster already claimed by the
            // root directory; the next-free hint starts right after it.
            let fsinfo = FsInfoSector::new(layout.cluster_count - 1, FAT32_ROOT_CLUSTER + 1);

            *scratch = *pbs.as_bytes();
            write_at(dev, start, scratch)?;
            *scratch = *fsinfo.as_bytes();
            write_at(dev, start + FAT32_FS_INFO_SECTOR as u64, scratch)?;
            *scratch = *pbs.as_bytes();
            write_at(dev, start + FAT32_BACKUP_BOOT_SECTOR as u64, scratch)?;
            *scratch = *fsinfo.as_bytes();
            write_at(dev, start + FAT32_BACKUP_BOOT_SECTOR as u64 + 1, scratch)?;
            info!("wrote FAT32 boot sector, FSInfo and backups");
        }
        _ => {
            let pbs = Fat16BootSector::for_layout(layout, volume_label, volume_id, media_descriptor);
            *scratch = *pbs.as_bytes();
            write_at(dev, start, scratch)?;
            info!("wrote {} boot sector", layout.fat_type.label());
        }
    }
    Ok(())
}

fn write_at(dev: &mut dyn BlockDevice, lba: u64, buf: &SectorBuf) -> Result<(), FormatError> {
    dev.write_sector(lba, buf)
        .map_err(|e| FormatError::sector_write(lba, e))
}
