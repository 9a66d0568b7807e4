// Format orchestration. Steps run strictly in order; the first failed
// write aborts the run and leaves the media indeterminate - there is
// no rollback, re-running the formatter is the only recovery.

use crate::boot_sector::{self, format_volume_label, generate_volume_serial};
use crate::constants::MEDIA_FIXED;
use crate::layout::Layout;
use crate::{fat_init, mbr, root_dir};
use fatforge_core::{BlockDevice, FormatError, FormatOptions, PartitionSpec, ProgressSink, SectorBuf};
use log::info;

/// The steps a format run moves through, in order. Failure in any step
/// is terminal; a fresh call starts over from the beginning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStage {
    PlanningGeometry,
    WritingMbr,
    WritingBootSector,
    InitializingFatTables,
    InitializingRootDirectory,
}

impl FormatStage {
    fn describe(&self) -> &'static str {
        match self {
            FormatStage::PlanningGeometry => "planning volume geometry",
            FormatStage::WritingMbr => "writing master boot record",
            FormatStage::WritingBootSector => "writing boot sector",
            FormatStage::InitializingFatTables => "initializing FAT tables",
            FormatStage::InitializingRootDirectory => "initializing root directory",
        }
    }
}

pub struct FatFormatter;

impl FatFormatter {
    /// Format the described partition as an empty FAT12/16/32 volume.
    ///
    /// `scratch` is the caller-owned sector buffer every step writes
    /// through; its content is unspecified on return. Returns the
    /// planned [`Layout`] so callers can report what was built.
    pub fn format(
        dev: &mut dyn BlockDevice,
        partition: &PartitionSpec,
        options: &FormatOptions,
        scratch: &mut SectorBuf,
        progress: &mut dyn ProgressSink,
    ) -> Result<Layout, FormatError> {
        progress.status(FormatStage::PlanningGeometry.describe());
        let layout = Layout::plan(partition)?;
        info!(
            "{}: {} MB, {} sectors, {} sectors/cluster, {} sectors/FAT, {} clusters",
            layout.fat_type.label(),
            layout.capacity_mb,
            layout.total_sectors,
            layout.sectors_per_cluster,
            layout.fat_size,
            layout.cluster_count
        );

        let media_descriptor = options.media_descriptor.unwrap_or(MEDIA_FIXED);
        let volume_id = options.volume_id.unwrap_or_else(generate_volume_serial);
        let volume_label = format_volume_label(options.label.as_deref());

        if partition.index != 0 {
            progress.status(FormatStage::WritingMbr.describe());
            mbr::write_mbr(dev, partition, scratch)?;
        }

        progress.status(FormatStage::WritingBootSector.describe());
        boot_sector::write_boot_sectors(
            dev,
            &layout,
            volume_label,
            volume_id,
            media_descriptor,
            scratch,
        )?;

        progress.status(FormatStage::InitializingFatTables.describe());
        fat_init::write_fat_tables(dev, &layout, media_descriptor, scratch)?;

        progress.status(FormatStage::InitializingRootDirectory.describe());
        root_dir::write_root_directory(dev, &layout, volume_label, scratch)?;

        info!("format complete: {} volume ready", layout.fat_type.label());
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use fatforge_core::test_utils::{FailingBlockDevice, MemBlockDevice};
    use fatforge_core::{BufferedProgress, NullProgress};

    fn format_mem(
        sector_count: u32,
        options: &FormatOptions,
    ) -> (MemBlockDevice, Layout) {
        let mut dev = MemBlockDevice::new(sector_count);
        let partition = PartitionSpec::superfloppy(sector_count);
        let mut scratch = [0u8; 512];
        let layout = FatFormatter::format(
            &mut dev,
            &partition,
            options,
            &mut scratch,
            &mut NullProgress,
        )
        .unwrap();
        (dev, layout)
    }

    #[test]
    fn progress_reports_every_stage_for_partitioned_format() {
        let sector_count = 64 * 2048;
        let mut dev = MemBlockDevice::new(sector_count + 2048);
        let partition = PartitionSpec::primary(PARTITION_TYPE_FAT16, 2048, sector_count);
        let mut scratch = [0u8; 512];
        let mut progress = BufferedProgress::default();
        FatFormatter::format(&mut dev, &partition, &FormatOptions::default(), &mut scratch, &mut progress)
            .unwrap();
        assert_eq!(
            progress.lines,
            vec![
                "planning volume geometry",
                "writing master boot record",
                "writing boot sector",
                "initializing FAT tables",
                "initializing root directory",
            ]
        );
    }

    #[test]
    fn superfloppy_format_skips_the_mbr() {
        let (dev, layout) = format_mem(64 * 2048, &FormatOptions::default());
        // sector 0 is the boot sector itself, not an MBR
        assert_eq!(layout.relative_sectors, 0);
        let bs = dev.sector(0);
        assert_eq!(&bs[0x36..0x3E], b"FAT16   ");
    }

    #[test]
    fn too_small_volume_fails_without_touching_the_device() {
        let mut dev = FailingBlockDevice::new(16, 0);
        let partition = PartitionSpec::superfloppy(16);
        let mut scratch = [0u8; 512];
        let err = FatFormatter::format(
            &mut dev,
            &partition,
            &FormatOptions::default(),
            &mut scratch,
            &mut NullProgress,
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::InvalidCapacity(_)));
        assert_eq!(dev.writes_issued(), 0);
    }

    #[test]
    fn out_of_range_partition_slot_fails_before_any_write() {
        let mut partition = PartitionSpec::primary(PARTITION_TYPE_FAT16, 2048, 64 * 2048);
        partition.index = 5;
        let mut dev = FailingBlockDevice::new(16, 0);
        let mut scratch = [0u8; 512];
        let err = FatFormatter::format(
            &mut dev,
            &partition,
            &FormatOptions::default(),
            &mut scratch,
            &mut NullProgress,
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::InvalidCapacity(_)));
        assert_eq!(dev.writes_issued(), 0);
    }

    #[test]
    fn write_failure_in_second_fat_copy_aborts_without_rollback() {
        let sector_count = 64 * 2048;
        let layout = Layout::plan(&PartitionSpec::superfloppy(sector_count)).unwrap();
        // boot sector + full first FAT copy + a few sectors into the second
        let fail_after = 1 + layout.fat_size as u64 + 3;
        let mut dev = FailingBlockDevice::new(sector_count, fail_after);
        let partition = PartitionSpec::superfloppy(sector_count);
        let mut scratch = [0u8; 512];

        let err = FatFormatter::format(
            &mut dev,
            &partition,
            &FormatOptions::default(),
            &mut scratch,
            &mut NullProgress,
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::SectorWrite { .. }));

        // boot sector and first FAT copy stay in place
        let bs = dev.inner.sector(0);
        assert_eq!(&bs[BOOT_SIGNATURE_OFFSET..], &BOOT_SIGNATURE);
        let fat0 = dev.inner.sector(layout.fat_start as u64);
        assert_eq!(&fat0[0..2], &0xFFF8u16.to_le_bytes());
        // the run stopped before the root directory stage
        let root = dev.inner.sector(layout.root_dir_start as u64);
        assert!(root.iter().all(|&b| b == 0));
    }

    #[test]
    fn label_and_serial_flow_into_the_image() {
        let options = FormatOptions {
            label: Some("archive".to_string()),
            volume_id: Some(0x0BADF00D),
            media_descriptor: None,
        };
        let (dev, layout) = format_mem(64 * 2048, &options);
        let bs = dev.sector(0);
        assert_eq!(&bs[0x2B..0x36], b"ARCHIVE    ");
        assert_eq!(&bs[0x27..0x2B], &0x0BADF00Du32.to_le_bytes());
        let root = dev.sector(layout.root_dir_start as u64);
        assert_eq!(&root[0..11], b"ARCHIVE    ");
        assert_eq!(root[11], ATTR_VOLUME_ID);
    }
}
