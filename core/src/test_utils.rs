//! Mock block devices for tests - never touch real hardware.

use crate::device::{BlockDevice, SectorBuf, SECTOR_SIZE};
use std::io;

/// In-memory block device backed by a flat byte vector.
pub struct MemBlockDevice {
    data: Vec<u8>,
}

impl MemBlockDevice {
    pub fn new(sector_count: u32) -> Self {
        Self {
            data: vec![0u8; sector_count as usize * SECTOR_SIZE],
        }
    }

    pub fn sector_count(&self) -> u64 {
        (self.data.len() / SECTOR_SIZE) as u64
    }

    /// The whole image, for byte-level assertions.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow one sector of the image.
    pub fn sector(&self, lba: u64) -> &[u8] {
        let off = lba as usize * SECTOR_SIZE;
        &self.data[off..off + SECTOR_SIZE]
    }

    fn check_bounds(&self, lba: u64) -> io::Result<usize> {
        if lba >= self.sector_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("LBA {} beyond device end", lba),
            ));
        }
        Ok(lba as usize * SECTOR_SIZE)
    }
}

impl BlockDevice for MemBlockDevice {
    fn write_sector(&mut self, lba: u64, buf: &SectorBuf) -> io::Result<()> {
        let off = self.check_bounds(lba)?;
        self.data[off..off + SECTOR_SIZE].copy_from_slice(buf);
        Ok(())
    }

    fn read_sector(&mut self, lba: u64, buf: &mut SectorBuf) -> io::Result<()> {
        let off = self.check_bounds(lba)?;
        buf.copy_from_slice(&self.data[off..off + SECTOR_SIZE]);
        Ok(())
    }
}

/// Wraps a [`MemBlockDevice`] and injects a write failure once a given
/// number of writes have succeeded. Reads always pass through, so
/// tests can inspect what made it to the media before the fault.
pub struct FailingBlockDevice {
    pub inner: MemBlockDevice,
    fail_after: u64,
    writes: u64,
}

impl FailingBlockDevice {
    pub fn new(sector_count: u32, fail_after: u64) -> Self {
        Self {
            inner: MemBlockDevice::new(sector_count),
            fail_after,
            writes: 0,
        }
    }

    pub fn writes_issued(&self) -> u64 {
        self.writes
    }
}

impl BlockDevice for FailingBlockDevice {
    fn write_sector(&mut self, lba: u64, buf: &SectorBuf) -> io::Result<()> {
        if self.writes >= self.fail_after {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("injected write failure at LBA {}", lba),
            ));
        }
        self.writes += 1;
        self.inner.write_sector(lba, buf)
    }

    fn read_sector(&mut self, lba: u64, buf: &mut SectorBuf) -> io::Result<()> {
        self.inner.read_sector(lba, buf)
    }
}
