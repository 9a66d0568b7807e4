// Root directory initialization: one volume-label entry, zeros for
// the rest of the region.

use crate::constants::ATTR_VOLUME_ID;
use crate::layout::{FatType, Layout};
use fatforge_core::{BlockDevice, FormatError, SectorBuf};
use log::info;

/// 32-byte directory entry carrying the volume label: 11-byte name,
/// attribute byte, everything else zero.
fn label_entry_sector(volume_label: [u8; 11], sector: &mut SectorBuf) {
    sector.fill(0);
    sector[0..11].copy_from_slice(&volume_label);
    sector[11] = ATTR_VOLUME_ID;
}

/// Write the root directory region. FAT12/16 use the fixed region
/// after the FATs; FAT32's root is one data cluster, already marked
/// end-of-chain by the FAT initializer.
pub fn write_root_directory(
    dev: &mut dyn BlockDevice,
    layout: &Layout,
    volume_label: [u8; 11],
    scratch: &mut SectorBuf,
) -> Result<(), FormatError> {
    let (start, sectors) = match layout.fat_type {
        FatType::Fat32 => (layout.data_start, layout.sectors_per_cluster as u32),
        _ => (layout.root_dir_start, layout.root_dir_sectors()),
    };
    for s in 0..sectors {
        if s == 0 {
            label_entry_sector(volume_label, scratch);
        } else {
            scratch.fill(0);
        }
        let lba = start as u64 + s as u64;
        dev.write_sector(lba, scratch)
            .map_err(|e| FormatError::sector_write(lba, e))?;
    }
    info!("initialized root directory ({} sectors)", sectors);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatforge_core::test_utils::MemBlockDevice;
    use fatforge_core::PartitionSpec;

    #[test]
    fn fat16_root_region_has_label_then_zeros() {
        let layout = Layout::plan(&PartitionSpec::superfloppy(64 * 2048)).unwrap();
        let mut dev = MemBlockDevice::new(layout.total_sectors);
        let mut scratch = [0u8; 512];
        write_root_directory(&mut dev, &layout, *b"MYVOLUME   ", &mut scratch).unwrap();

        let first = dev.sector(layout.root_dir_start as u64);
        assert_eq!(&first[0..11], b"MYVOLUME   ");
        assert_eq!(first[11], ATTR_VOLUME_ID);
        assert!(first[12..].iter().all(|&b| b == 0));

        // remaining 31 sectors of the 512-entry region are blank
        for s in 1..layout.root_dir_sectors() {
            let sector = dev.sector((layout.root_dir_start + s) as u64);
            assert!(sector.iter().all(|&b| b == 0));
        }
    }
}
