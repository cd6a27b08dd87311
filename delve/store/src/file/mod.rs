//! On-disk file primitives shared by the collection store and the legacy
//! archive reader: the fixed header and CRC-framed regions.

mod error;
mod header;
mod region;

pub use error::{StoreFileError, StoreFileResult};
pub use header::{CONTENT_ARCHIVE, CURRENT_FORMAT_VERSION, FileHeader, HEADER_SIZE, MAGIC};
pub use region::{MAX_REGION_BYTES, read_region, write_region};
