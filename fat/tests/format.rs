// Image-level checks: format an in-memory or file-backed device and
// verify the resulting bytes the way a FAT driver would read them.

use fatforge_core::test_utils::MemBlockDevice;
use fatforge_core::{BlockDevice, FormatOptions, NullProgress, PartitionSpec, StdBlockDevice};
use fatforge_fat::constants::*;
use fatforge_fat::{FatFormatter, FatType, Layout};

fn options_with_label(label: &str) -> FormatOptions {
    let _ = env_logger::builder().is_test(true).try_init();
    FormatOptions {
        label: Some(label.to_string()),
        volume_id: Some(0x1234_5678),
        media_descriptor: None,
    }
}

/// Minimal consistency checks a conformant reader performs on mount.
fn verify_volume(image: &[u8], layout: &Layout) {
    let pbs_off = layout.relative_sectors as usize * 512;
    let pbs = &image[pbs_off..pbs_off + 512];

    assert_eq!(&pbs[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2], &BOOT_SIGNATURE);
    assert_eq!(
        u16::from_le_bytes([pbs[BPB_BYTES_PER_SEC], pbs[BPB_BYTES_PER_SEC + 1]]),
        512
    );
    assert_eq!(pbs[BPB_SEC_PER_CLUS], layout.sectors_per_cluster);
    assert_eq!(
        u16::from_le_bytes([pbs[BPB_RSVD_SEC_CNT], pbs[BPB_RSVD_SEC_CNT + 1]]),
        layout.reserved_sectors
    );
    assert_eq!(pbs[BPB_NUM_FATS], layout.num_fats);
    assert_eq!(
        u32::from_le_bytes(pbs[BPB_HIDD_SEC..BPB_HIDD_SEC + 4].try_into().unwrap()),
        layout.relative_sectors
    );

    // both FAT copies identical, reserved entries present, rest zero
    let fat_bytes = layout.fat_size as usize * 512;
    let fat0 = layout.fat_start as usize * 512;
    let fat1 = fat0 + fat_bytes;
    assert_eq!(&image[fat0..fat0 + fat_bytes], &image[fat1..fat1 + fat_bytes]);

    let reserved_len = match layout.fat_type {
        FatType::Fat12 => 3,
        FatType::Fat16 => 4,
        FatType::Fat32 => 12,
    };
    assert!(image[fat0 + reserved_len..fat0 + fat_bytes]
        .iter()
        .all(|&b| b == 0));
}

#[test]
fn fat16_64mib_volume_parses_with_label_only() {
    let sector_count = 64 * 2048;
    let mut dev = MemBlockDevice::new(sector_count);
    let partition = PartitionSpec::superfloppy(sector_count);
    let mut scratch = [0u8; 512];
    let layout = FatFormatter::format(
        &mut dev,
        &partition,
        &options_with_label("TESTVOL"),
        &mut scratch,
        &mut NullProgress,
    )
    .unwrap();

    assert_eq!(layout.fat_type, FatType::Fat16);
    assert_eq!(layout.sectors_per_cluster, 32);
    verify_volume(dev.data(), &layout);

    let fat0 = layout.fat_start as usize * 512;
    assert_eq!(&dev.data()[fat0..fat0 + 4], &[0xF8, 0xFF, 0xFF, 0xFF]);

    // root region: label entry in slot 0, all 511 other slots free
    let root = layout.root_dir_start as usize * 512;
    assert_eq!(&dev.data()[root..root + 11], b"TESTVOL    ");
    assert_eq!(dev.data()[root + 11], ATTR_VOLUME_ID);
    let root_len = layout.root_dir_sectors() as usize * 512;
    assert!(dev.data()[root + 32..root + root_len].iter().all(|&b| b == 0));

    // every cluster is free: no non-zero FAT entry past the reserved two
    let entries_used = dev.data()[fat0 + 4..fat0 + layout.fat_size as usize * 512]
        .iter()
        .filter(|&&b| b != 0)
        .count();
    assert_eq!(entries_used, 0);
}

#[test]
fn fat32_volume_reserves_exactly_the_root_cluster() {
    // Hand-built small FAT32 layout: the auto planner only picks FAT32
    // for volumes too large to allocate in a test, but the writers
    // accept any layout.
    let layout = Layout {
        capacity_mb: 40,
        total_sectors: 81920,
        relative_sectors: 0,
        fat_type: FatType::Fat32,
        sectors_per_cluster: 1,
        reserved_sectors: 32,
        num_fats: 2,
        fat_start: 32,
        fat_size: 640,
        root_entries: 0,
        root_dir_start: 32 + 2 * 640,
        data_start: 32 + 2 * 640,
        cluster_count: 81920 - 32 - 2 * 640,
    };
    let mut dev = MemBlockDevice::new(layout.total_sectors);
    let mut scratch = [0u8; 512];
    let label = *b"BIGVOL     ";

    fatforge_fat::boot_sector::write_boot_sectors(&mut dev, &layout, label, 42, MEDIA_FIXED, &mut scratch)
        .unwrap();
    fatforge_fat::fat_init::write_fat_tables(&mut dev, &layout, MEDIA_FIXED, &mut scratch).unwrap();
    fatforge_fat::root_dir::write_root_directory(&mut dev, &layout, label, &mut scratch).unwrap();

    verify_volume(dev.data(), &layout);

    // FAT entry 2 is the end-of-chain marker for the root directory
    let fat0 = layout.fat_start as usize * 512;
    assert_eq!(
        &dev.data()[fat0 + 8..fat0 + 12],
        &0x0FFF_FFFFu32.to_le_bytes()
    );

    // backup boot sector matches the primary
    assert_eq!(dev.sector(0), dev.sector(FAT32_BACKUP_BOOT_SECTOR as u64));
    // FSInfo free count excludes the root cluster
    let fsinfo = dev.sector(FAT32_FS_INFO_SECTOR as u64);
    assert_eq!(
        u32::from_le_bytes(fsinfo[488..492].try_into().unwrap()),
        layout.cluster_count - 1
    );
    assert_eq!(fsinfo, dev.sector(FAT32_BACKUP_BOOT_SECTOR as u64 + 1));

    // root cluster holds the label entry and nothing else
    let root = layout.data_start as usize * 512;
    assert_eq!(&dev.data()[root..root + 11], b"BIGVOL     ");
    assert_eq!(dev.data()[root + 11], ATTR_VOLUME_ID);
    let cluster_len = layout.sectors_per_cluster as usize * 512;
    assert!(dev.data()[root + 32..root + cluster_len].iter().all(|&b| b == 0));
}

#[test]
fn partitioned_format_writes_mbr_and_shifted_volume() {
    let sector_count = 64 * 2048;
    let start_lba = 2048u32;
    let mut dev = MemBlockDevice::new(sector_count + start_lba);
    let partition = PartitionSpec::primary(PARTITION_TYPE_FAT16, start_lba, sector_count);
    let mut scratch = [0u8; 512];
    let layout = FatFormatter::format(
        &mut dev,
        &partition,
        &options_with_label("PARTED"),
        &mut scratch,
        &mut NullProgress,
    )
    .unwrap();

    // MBR at absolute sector 0
    let mbr = dev.sector(0);
    assert_eq!(&mbr[510..512], &BOOT_SIGNATURE);
    let e = 446;
    assert_eq!(mbr[e + 4], PARTITION_TYPE_FAT16);
    assert_eq!(
        u32::from_le_bytes(mbr[e + 8..e + 12].try_into().unwrap()),
        start_lba
    );
    assert_eq!(
        u32::from_le_bytes(mbr[e + 12..e + 16].try_into().unwrap()),
        sector_count
    );
    assert_ne!(&mbr[440..444], &[0u8; 4]);

    // boot sector sits at the partition start and records the offset
    verify_volume(dev.data(), &layout);
    assert_eq!(layout.relative_sectors, start_lba);
}

#[test]
fn file_backed_device_round_trips() {
    let sector_count = 16 * 2048; // 16 MiB
    let file = tempfile::tempfile().unwrap();
    let mut dev = StdBlockDevice::new(file);
    let partition = PartitionSpec::superfloppy(sector_count);
    let mut scratch = [0u8; 512];
    let layout = FatFormatter::format(
        &mut dev,
        &partition,
        &options_with_label("ONDISK"),
        &mut scratch,
        &mut NullProgress,
    )
    .unwrap();

    let mut sector = [0u8; 512];
    dev.read_sector(0, &mut sector).unwrap();
    assert_eq!(&sector[BOOT_SIGNATURE_OFFSET..], &BOOT_SIGNATURE);
    assert_eq!(sector[BPB_SEC_PER_CLUS], layout.sectors_per_cluster);

    dev.read_sector(layout.root_dir_start as u64, &mut sector)
        .unwrap();
    assert_eq!(&sector[0..11], b"ONDISK     ");
    assert_eq!(sector[11], ATTR_VOLUME_ID);
}
