use std::io::{self, Read, Seek, SeekFrom, Write};

/// All layout arithmetic in this crate assumes 512-byte sectors.
pub const SECTOR_SIZE: usize = 512;

/// One sector's worth of bytes. Callers allocate one of these as the
/// scratch buffer for a whole format run; every step may overwrite it
/// freely, so no step can rely on content left by a previous step.
pub type SectorBuf = [u8; SECTOR_SIZE];

/// Sector-addressed block device. LBAs are absolute (relative to the
/// start of the media, not the partition).
///
/// Writes are blocking: a successful return means the device accepted
/// the sector. Timeout policy belongs to the implementation.
pub trait BlockDevice {
    fn write_sector(&mut self, lba: u64, buf: &SectorBuf) -> io::Result<()>;

    /// Currently only used by verification paths and tests; the
    /// formatter itself never reads.
    fn read_sector(&mut self, lba: u64, buf: &mut SectorBuf) -> io::Result<()>;
}

/// Adapter exposing anything `Read + Write + Seek` (a file, a cursor
/// over a disk image) as a [`BlockDevice`].
pub struct StdBlockDevice<T> {
    inner: T,
}

impl<T: Read + Write + Seek> StdBlockDevice<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write + Seek> BlockDevice for StdBlockDevice<T> {
    fn write_sector(&mut self, lba: u64, buf: &SectorBuf) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(lba * SECTOR_SIZE as u64))?;
        self.inner.write_all(buf)
    }

    fn read_sector(&mut self, lba: u64, buf: &mut SectorBuf) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(lba * SECTOR_SIZE as u64))?;
        self.inner.read_exact(buf)
    }
}
