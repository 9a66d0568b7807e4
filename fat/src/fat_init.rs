// FAT table initialization: reserved entries in the first sector of
// each copy, zeros everywhere else, written sector by sector through
// the caller's scratch buffer.

use crate::constants::*;
use crate::layout::{FatType, Layout};
use fatforge_core::{BlockDevice, FormatError, SectorBuf};
use log::info;

/// Fill `sector` with the first sector of a freshly initialized FAT.
///
/// Entry 0 replicates the media descriptor in its low byte with all
/// remaining bits set; entry 1 is an end-of-chain marker. FAT32
/// additionally marks cluster 2 end-of-chain, since the empty root
/// directory occupies exactly that cluster.
pub fn first_fat_sector(fat_type: FatType, media_descriptor: u8, sector: &mut SectorBuf) {
    sector.fill(0);
    match fat_type {
        FatType::Fat12 => {
            // Entries 0 and 1 packed into three bytes: 0xF00|media
            // then 0xFFF.
            sector[0] = media_descriptor;
            sector[1] = 0xF0 | (FAT12_EOC >> 8) as u8;
            sector[2] = (FAT12_EOC >> 4) as u8;
        }
        FatType::Fat16 => {
            sector[0..2].copy_from_slice(&(0xFF00 | media_descriptor as u16).to_le_bytes());
            sector[2..4].copy_from_slice(&FAT16_EOC.to_le_bytes());
        }
        FatType::Fat32 => {
            sector[0..4].copy_from_slice(&(0x0FFF_FF00 | media_descriptor as u32).to_le_bytes());
            sector[4..8].copy_from_slice(&FAT32_EOC.to_le_bytes());
            let root = FAT32_ROOT_CLUSTER as usize * 4;
            sector[root..root + 4].copy_from_slice(&FAT32_EOC.to_le_bytes());
        }
    }
}

/// Write every FAT copy in order. Each copy gets identical content, a
/// hard requirement: drivers cross-check or fail over between copies.
/// A failed write aborts mid-table; the caller treats the whole format
/// as failed.
pub fn write_fat_tables(
    dev: &mut dyn BlockDevice,
    layout: &Layout,
    media_descriptor: u8,
    scratch: &mut SectorBuf,
) -> Result<(), FormatError> {
    for copy in 0..layout.num_fats {
        let base = layout.fat_start as u64 + copy as u64 * layout.fat_size as u64;
        for s in 0..layout.fat_size {
            if s == 0 {
                first_fat_sector(layout.fat_type, media_descriptor, scratch);
            } else {
                scratch.fill(0);
            }
            let lba = base + s as u64;
            dev.write_sector(lba, scratch)
                .map_err(|e| FormatError::sector_write(lba, e))?;
        }
    }
    info!(
        "initialized {} FAT copies of {} sectors each",
        layout.num_fats, layout.fat_size
    );
    Ok(())
}
