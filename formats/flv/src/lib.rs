pub mod errors;
pub mod header;
pub mod tag;
pub mod writer;

pub use tag::FlvTagType;
pub use writer::{FlvFileWriter, FlvWriter};
