use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    #[error("Geometry overflow: {0}")]
    GeometryOverflow(String),

    #[error("Sector write failed at LBA {lba}: {source}")]
    SectorWrite {
        lba: u64,
        #[source]
        source: std::io::Error,
    },
}

impl FormatError {
    /// Wrap a device write failure with the LBA it happened at.
    pub fn sector_write(lba: u64, source: std::io::Error) -> Self {
        FormatError::SectorWrite { lba, source }
    }
}
