// FAT on-disk constants shared by the planner and the writers

// Boot sector offsets
pub const BS_JMP_BOOT: usize = 0x00;
pub const BPB_BYTES_PER_SEC: usize = 0x0B;
pub const BPB_SEC_PER_CLUS: usize = 0x0D;
pub const BPB_RSVD_SEC_CNT: usize = 0x0E;
pub const BPB_NUM_FATS: usize = 0x10;
pub const BPB_ROOT_ENT_CNT: usize = 0x11;
pub const BPB_TOT_SEC16: usize = 0x13;
pub const BPB_MEDIA: usize = 0x15;
pub const BPB_FAT_SZ16: usize = 0x16;
pub const BPB_HIDD_SEC: usize = 0x1C;
pub const BPB_TOT_SEC32: usize = 0x20;
pub const BPB_FAT_SZ32: usize = 0x24;
pub const BPB_ROOT_CLUS: usize = 0x2C;

// Boot sector signature
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

// Cluster count bands per FAT type
pub const FAT12_MAX_CLUSTERS: u32 = 4084;
pub const FAT16_MIN_CLUSTERS: u32 = 4085;
pub const FAT16_MAX_CLUSTERS: u32 = 65524;
pub const FAT32_MIN_CLUSTERS: u32 = 65525;
pub const FAT32_MAX_CLUSTERS: u32 = 0x0FFF_FFF5;

// End of chain markers written to the reserved FAT entries
pub const FAT12_EOC: u16 = 0xFFF;
pub const FAT16_EOC: u16 = 0xFFFF;
pub const FAT32_EOC: u32 = 0x0FFF_FFFF; // FAT32 entries use only the low 28 bits

// Standard values
pub const NUM_FATS: u8 = 2;
pub const FAT16_ROOT_ENTRIES: u16 = 512;
pub const ROOT_ENTRY_SIZE: u32 = 32;
pub const FAT32_ROOT_CLUSTER: u32 = 2;
pub const FAT32_FS_INFO_SECTOR: u16 = 1;
pub const FAT32_BACKUP_BOOT_SECTOR: u16 = 6;

// Media descriptors
pub const MEDIA_FIXED: u8 = 0xF8;
pub const MEDIA_REMOVABLE: u8 = 0xF0;

// Directory entry attribute for the volume label slot
pub const ATTR_VOLUME_ID: u8 = 0x08;

// Partition type codes for MBR
pub const PARTITION_TYPE_FAT12: u8 = 0x01;
pub const PARTITION_TYPE_FAT16: u8 = 0x06;
pub const PARTITION_TYPE_FAT32: u8 = 0x0B;
pub const PARTITION_TYPE_FAT32_LBA: u8 = 0x0C;
