pub mod writer;

/// Number of bytes a tag header occupies, also the fixed part of the
/// previous-tag-size chain.
pub const TAG_HEADER_SIZE: u32 = 11;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlvTagType {
    Audio = 8,
    Video = 9,
    Script = 18,
}

impl From<FlvTagType> for u8 {
    fn from(value: FlvTagType) -> Self {
        value as u8
    }
}

#[derive(Debug, Clone)]
pub struct FlvTagHeader {
    pub tag_type: FlvTagType,
    pub data_size: u32,
    pub timestamp: u32,
}
