pub mod device;
pub mod error;
pub mod options;
pub mod progress;
pub mod test_utils;

pub use device::{BlockDevice, SectorBuf, StdBlockDevice, SECTOR_SIZE};
pub use error::FormatError;
pub use options::{FormatOptions, PartitionSpec};
pub use progress::{BufferedProgress, LogProgress, NullProgress, ProgressSink};
