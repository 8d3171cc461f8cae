///! Bit-granular reads over an async byte source. RTMP headers pack fields
///! at bit boundaries (2-bit fmt + 6-bit csid), so the socket edge reads
///! through this instead of a plain byte buffer.
pub mod errors;
pub mod reader;

pub use self::reader::BitStreamReader;
