// Master boot record construction. One partition entry, CHS encoded
// for legacy BIOSes; the LBA fields are the authoritative ones.

use crate::constants::{BOOT_SIGNATURE, BOOT_SIGNATURE_OFFSET};
use fatforge_core::{BlockDevice, FormatError, PartitionSpec, SectorBuf};
use log::info;

pub const PARTITION_TABLE_OFFSET: usize = 446;
pub const DISK_SIGNATURE_OFFSET: usize = 440;

const HEADS: u32 = 255;
const SECTORS_PER_TRACK: u32 = 63;
const MAX_CYLINDER: u32 = 1023;

/// Project an LBA onto the fixed 255/63 CHS geometry. Cylinders above
/// the 10-bit field maximum clamp to (1023, 254, 63); readers fall
/// back to the LBA fields for such volumes.
pub fn lba_to_chs(lba: u32) -> (u16, u8, u8) {
    let sectors_per_cylinder = HEADS * SECTORS_PER_TRACK;
    let cylinder = lba / sectors_per_cylinder;
    if cylinder > MAX_CYLINDER {
        return (MAX_CYLINDER as u16, (HEADS - 1) as u8, SECTORS_PER_TRACK as u8);
    }
    let rem = lba % sectors_per_cylinder;
    let head = rem / SECTORS_PER_TRACK;
    let sector = rem % SECTORS_PER_TRACK + 1; // sectors are 1-based
    (cylinder as u16, head as u8, sector as u8)
}

/// Pack a CHS triple into the three bytes of an MBR partition entry:
/// head, then sector with the cylinder's top two bits, then the
/// cylinder's low byte.
pub fn pack_chs(cylinder: u16, head: u8, sector: u8) -> [u8; 3] {
    [
        head,
        (((cylinder >> 2) as u8) & 0xC0) | (sector & 0x3F),
        (cylinder & 0xFF) as u8,
    ]
}

/// Fill `sector` with a complete MBR for the given partition.
pub fn build_mbr(partition: &PartitionSpec, disk_signature: u32, sector: &mut SectorBuf) {
    debug_assert!(
        (1..=4).contains(&partition.index),
        "partition slot is validated during planning"
    );
    sector.fill(0);

    // Minimal stub; the volume is data-only and never boots.
    sector[0] = 0xEB;
    sector[1] = 0x3C;
    sector[2] = 0x90;

    // Windows refuses to mount MBR disks with a zero signature.
    let disk_signature = if disk_signature == 0 {
        0x1234_5678
    } else {
        disk_signature
    };
    sector[DISK_SIGNATURE_OFFSET..DISK_SIGNATURE_OFFSET + 4]
        .copy_from_slice(&disk_signature.to_le_bytes());

    let entry = PARTITION_TABLE_OFFSET + 16 * (partition.index as usize - 1);
    sector[entry] = 0x80;

    let (c, h, s) = lba_to_chs(partition.start_lba);
    sector[entry + 1..entry + 4].copy_from_slice(&pack_chs(c, h, s));
    sector[entry + 4] = partition.partition_type;
    let end_lba = partition.start_lba + partition.sector_count - 1;
    let (c, h, s) = lba_to_chs(end_lba);
    sector[entry + 5..entry + 8].copy_from_slice(&pack_chs(c, h, s));

    sector[entry + 8..entry + 12].copy_from_slice(&partition.start_lba.to_le_bytes());
    sector[entry + 12..entry + 16].copy_from_slice(&partition.sector_count.to_le_bytes());

    sector[BOOT_SIGNATURE_OFFSET..].copy_from_slice(&BOOT_SIGNATURE);
}

/// Build and write the MBR at absolute sector 0.
pub fn write_mbr(
    dev: &mut dyn BlockDevice,
    partition: &PartitionSpec,
    scratch: &mut SectorBuf,
) -> Result<(), FormatError> {
    build_mbr(partition, rand::random(), scratch);
    dev.write_sector(0, scratch)
        .map_err(|e| FormatError::sector_write(0, e))?;
    info!(
        "wrote MBR: type 0x{:02X}, start LBA {}, {} sectors",
        partition.partition_type, partition.start_lba, partition.sector_count
    );
    Ok(())
}
