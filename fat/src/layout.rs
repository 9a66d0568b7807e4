// Volume geometry planning: cluster sizing, FAT type selection, FAT sizing.
// Pure computation - nothing here touches the block device.

use crate::constants::*;
use fatforge_core::{FormatError, PartitionSpec};
use log::debug;

/// 512-byte sectors per megabyte.
const SECTORS_PER_MB: u32 = 2048;

/// Volumes at or below this sector count are laid out as FAT12; the
/// boundary comes from the FAT specification's small-volume table.
const FAT12_SMALL_VOLUME_SECTORS: u32 = 8400;

/// Smallest volume that can hold reserved sector + two one-sector FATs
/// + fixed root directory + one cluster.
const MIN_TOTAL_SECTORS: u32 = 36;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatType {
    Fat12,
    Fat16,
    Fat32,
}

impl FatType {
    pub fn label(&self) -> &'static str {
        match self {
            FatType::Fat12 => "FAT12",
            FatType::Fat16 => "FAT16",
            FatType::Fat32 => "FAT32",
        }
    }

    fn min_clusters(&self) -> u32 {
        match self {
            FatType::Fat12 => 1,
            FatType::Fat16 => FAT16_MIN_CLUSTERS,
            FatType::Fat32 => FAT32_MIN_CLUSTERS,
        }
    }

    fn max_clusters(&self) -> u32 {
        match self {
            FatType::Fat12 => FAT12_MAX_CLUSTERS,
            FatType::Fat16 => FAT16_MAX_CLUSTERS,
            FatType::Fat32 => FAT32_MAX_CLUSTERS,
        }
    }
}

/// Computed on-disk geometry for one format run. Built once by
/// [`Layout::plan`] and treated as immutable afterwards; every writer
/// step consumes it read-only.
///
/// All `*_start` fields are absolute LBAs (they include
/// `relative_sectors`).
#[derive(Debug, Clone)]
pub struct Layout {
    pub capacity_mb: u32,
    pub total_sectors: u32,
    pub relative_sectors: u32,
    pub fat_type: FatType,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    /// First sector of the first FAT copy.
    pub fat_start: u32,
    /// Sectors per FAT copy.
    pub fat_size: u32,
    /// Fixed root directory slots; 0 for FAT32.
    pub root_entries: u16,
    /// First sector of the fixed root region (FAT12/16). Equals
    /// `data_start` for FAT32, whose root lives in cluster 2.
    pub root_dir_start: u32,
    /// First sector of the data region (cluster 2).
    pub data_start: u32,
    pub cluster_count: u32,
}

enum Fit {
    Fits(Layout),
    /// Too few clusters for the type's band at this cluster size.
    Under,
    /// Too many clusters for the type's band at this cluster size.
    Over,
}

impl Layout {
    /// Derive the full layout from a partition descriptor, escalating
    /// FAT12 -> FAT16 -> FAT32 until the cluster count lands inside a
    /// valid band. At most one pass per FAT type.
    pub fn plan(partition: &PartitionSpec) -> Result<Self, FormatError> {
        if partition.index > 4 {
            return Err(FormatError::InvalidCapacity(format!(
                "partition slot {} does not exist; MBR has slots 1-4",
                partition.index
            )));
        }
        let total = partition.sector_count;
        partition
            .start_lba
            .checked_add(total)
            .ok_or_else(|| {
                FormatError::InvalidCapacity(
                    "partition extends beyond the 32-bit LBA range".to_string(),
                )
            })?;
        if total < MIN_TOTAL_SECTORS {
            return Err(FormatError::InvalidCapacity(format!(
                "{} sectors cannot hold even a minimal FAT12 volume",
                total
            )));
        }
        let capacity_mb = (total + SECTORS_PER_MB - 1) / SECTORS_PER_MB;

        if total <= FAT12_SMALL_VOLUME_SECTORS {
            for spc in [1u8, 2, 4, 8] {
                match Self::lay_out(partition, capacity_mb, FatType::Fat12, spc) {
                    Fit::Fits(layout) => return Ok(layout),
                    Fit::Under => {
                        return Err(FormatError::InvalidCapacity(format!(
                            "{} sectors cannot hold even a minimal FAT12 volume",
                            total
                        )))
                    }
                    Fit::Over => continue,
                }
            }
            // more than 4084 clusters even with 4 KiB clusters
        }

        if let Some(layout) =
            Self::plan_type(partition, capacity_mb, FatType::Fat16, fat16_cluster_sectors(capacity_mb))?
        {
            return Ok(layout);
        }
        if let Some(layout) =
            Self::plan_type(partition, capacity_mb, FatType::Fat32, fat32_cluster_sectors(capacity_mb))?
        {
            return Ok(layout);
        }

        Err(FormatError::GeometryOverflow(format!(
            "{} sectors produce more clusters than FAT32 can address",
            total
        )))
    }

    /// Try one FAT type, shrinking the cluster size while the count
    /// falls short of the band. Returns `None` when the count overflows
    /// the band, so the caller escalates to the next type.
    fn plan_type(
        partition: &PartitionSpec,
        capacity_mb: u32,
        fat_type: FatType,
        mut sectors_per_cluster: u8,
    ) -> Result<Option<Layout>, FormatError> {
        loop {
            match Self::lay_out(partition, capacity_mb, fat_type, sectors_per_cluster) {
                Fit::Fits(layout) => return Ok(Some(layout)),
                Fit::Over => return Ok(None),
                Fit::Under if sectors_per_cluster > 1 => sectors_per_cluster /= 2,
                Fit::Under => {
                    return Err(FormatError::InvalidCapacity(format!(
                        "{} sectors are too few for a {} volume",
                        partition.sector_count,
                        fat_type.label()
                    )))
                }
            }
        }
    }

    fn lay_out(
        partition: &PartitionSpec,
        capacity_mb: u32,
        fat_type: FatType,
        sectors_per_cluster: u8,
    ) -> Fit {
        let total = partition.sector_count;
        let spc = sectors_per_cluster as u32;
        let reserved: u16 = match fat_type {
            FatType::Fat32 => 32,
            _ => 1,
        };
        let root_entries: u16 = match fat_type {
            FatType::Fat32 => 0,
            _ => FAT16_ROOT_ENTRIES,
        };
        let root_dir_sectors = (root_entries as u32 * ROOT_ENTRY_SIZE + 511) / 512;

        // First pass: estimate the cluster count without the FAT span,
        // then size the FATs from it. The estimate can only be high, so
        // the FATs always cover the final count.
        let fixed_overhead = reserved as u32 + root_dir_sectors;
        if total <= fixed_overhead {
            return Fit::Under;
        }
        let estimated_clusters = (total - fixed_overhead) / spc;
        let fat_size = fat_sectors(fat_type, estimated_clusters);

        // Second pass with the real FAT span.
        let overhead = fixed_overhead + NUM_FATS as u32 * fat_size;
        if total <= overhead {
            return Fit::Under;
        }
        let cluster_count = (total - overhead) / spc;
        if cluster_count < fat_type.min_clusters() {
            return Fit::Under;
        }
        if cluster_count > fat_type.max_clusters() {
            return Fit::Over;
        }

        let fat_start = partition.start_lba + reserved as u32;
        let root_dir_start = fat_start + NUM_FATS as u32 * fat_size;
        let data_start = root_dir_start + root_dir_sectors;

        debug!(
            "{} fit: spc={} fat_size={} clusters={}",
            fat_type.label(),
            sectors_per_cluster,
            fat_size,
            cluster_count
        );

        Fit::Fits(Layout {
            capacity_mb,
            total_sectors: total,
            relative_sectors: partition.start_lba,
            fat_type,
            sectors_per_cluster,
            reserved_sectors: reserved,
            num_fats: NUM_FATS,
            fat_start,
            fat_size,
            root_entries,
            root_dir_start,
            data_start,
            cluster_count,
        })
    }

    /// Sectors occupied by the fixed root directory region (0 for FAT32).
    pub fn root_dir_sectors(&self) -> u32 {
        (self.root_entries as u32 * ROOT_ENTRY_SIZE + 511) / 512
    }

    /// Sectors left over after all regions; always smaller than one
    /// cluster by construction.
    pub fn slack_sectors(&self) -> u32 {
        self.total_sectors
            - (self.reserved_sectors as u32
                + self.num_fats as u32 * self.fat_size
                + self.root_dir_sectors()
                + self.cluster_count * self.sectors_per_cluster as u32)
    }
}

/// Recommended FAT16 cluster sizes keyed by capacity. Oriented at the
/// SD card layouts the original formatter targets, not at fdisk's.
fn fat16_cluster_sectors(capacity_mb: u32) -> u8 {
    if capacity_mb <= 16 {
        2 // 1 KiB
    } else if capacity_mb <= 32 {
        4 // 2 KiB
    } else if capacity_mb <= 512 {
        32 // 16 KiB
    } else if capacity_mb <= 1024 {
        64 // 32 KiB
    } else {
        128 // 64 KiB, tops out just below 4 GiB
    }
}

/// Recommended FAT32 cluster sizes keyed by capacity.
fn fat32_cluster_sectors(capacity_mb: u32) -> u8 {
    if capacity_mb <= 512 {
        1 // 512 B, needed to reach 65525 clusters at all
    } else if capacity_mb <= 8192 {
        8 // 4 KiB
    } else if capacity_mb <= 16384 {
        32 // 16 KiB
    } else {
        64 // 32 KiB
    }
}

/// Whole sectors needed by one FAT copy covering `clusters` data
/// clusters plus the two reserved entries. FAT12 entries are 12 bits.
fn fat_sectors(fat_type: FatType, clusters: u32) -> u32 {
    let entries = clusters as u64 + 2;
    let fat_bytes = match fat_type {
        FatType::Fat12 => (entries * 3 + 1) / 2,
        FatType::Fat16 => entries * 2,
        FatType::Fat32 => entries * 4,
    };
    ((fat_bytes + 511) / 512) as u32
}
