use serde::{Deserialize, Serialize};

/// Caller-tunable knobs for a format run. Everything here has a
/// sensible default; `Default` formats an unlabeled fixed-disk volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Volume label. Uppercased, truncated to 11 characters and
    /// space-padded; `None` leaves the default placeholder.
    pub label: Option<String>,
    /// Volume serial number. `None` generates a random one.
    pub volume_id: Option<u32>,
    /// BPB media descriptor. `None` selects 0xF8 (fixed disk);
    /// removable media conventionally uses 0xF0.
    pub media_descriptor: Option<u8>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            label: None,
            volume_id: None,
            media_descriptor: None,
        }
    }
}

/// Where the volume lives on the media.
///
/// `index` is the 1-based MBR partition slot; 0 means superfloppy
/// layout (the filesystem starts at sector 0 and no MBR is written).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionSpec {
    pub index: u8,
    /// MBR partition type byte. Ignored for superfloppy layouts.
    pub partition_type: u8,
    /// First sector of the partition, absolute LBA.
    pub start_lba: u32,
    /// Partition length in sectors.
    pub sector_count: u32,
}

impl PartitionSpec {
    /// Whole-media volume without a partition table.
    pub fn superfloppy(sector_count: u32) -> Self {
        Self {
            index: 0,
            partition_type: 0,
            start_lba: 0,
            sector_count,
        }
    }

    /// Single primary partition in MBR slot 1.
    pub fn primary(partition_type: u8, start_lba: u32, sector_count: u32) -> Self {
        Self {
            index: 1,
            partition_type,
            start_lba,
            sector_count,
        }
    }
}
