//! Encodes FLV file headers and tags.
//!
//! This crate only writes the FLV container; it has no opinion on where the
//! bytes end up (a file, a socket, an in-memory buffer).

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{BufMut, Bytes, BytesMut};

mod errors;

pub use errors::FlvMuxError;

/// The tag type byte stored in an FLV tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlvTagType {
    Audio = 0x08,
    Video = 0x09,
    ScriptData = 0x12,
}

/// Writes `"FLV"` + version + flags + header size, i.e. the 9 bytes that
/// open every FLV file, followed by the 4-byte zero `PreviousTagSize0`.
pub fn encode_header(has_audio: bool, has_video: bool) -> Bytes {
    let mut flags = 0u8;
    if has_audio {
        flags |= 0b0000_0100;
    }
    if has_video {
        flags |= 0b0000_0001;
    }

    let mut buf = BytesMut::with_capacity(13);
    buf.put_slice(b"FLV");
    buf.put_u8(1); // version
    buf.put_u8(flags);
    buf.put_u32(9); // header size
    buf.put_u32(0); // PreviousTagSize0
    buf.freeze()
}

/// Encodes one FLV tag (header + body) for `tag_type` at `timestamp`
/// (milliseconds, may exceed 24 bits) carrying `body`. Does not include the
/// trailing `PreviousTagSize` of the tag that follows it; call
/// [`encode_previous_tag_size`] for that.
pub fn encode_tag(tag_type: FlvTagType, timestamp: u32, body: &[u8]) -> Result<BytesMut, FlvMuxError> {
    if body.len() > 0x00FF_FFFF {
        return Err(FlvMuxError::BodyTooLarge(body.len()));
    }

    let mut buf = BytesMut::with_capacity(11 + body.len());
    let mut header = Vec::with_capacity(11);
    header.write_u8(tag_type as u8)?;
    header.write_u24::<BigEndian>(body.len() as u32)?;
    header.write_u24::<BigEndian>(timestamp & 0x00FF_FFFF)?;
    header.write_u8(((timestamp >> 24) & 0xFF) as u8)?;
    header.write_u24::<BigEndian>(0)?; // stream id, always 0

    buf.put_slice(&header);
    buf.put_slice(body);
    Ok(buf)
}

/// Encodes the 4-byte `PreviousTagSize` trailer for a tag whose encoded
/// (header + body) length was `tag_len`.
pub fn encode_previous_tag_size(tag_len: u32) -> [u8; 4] {
    tag_len.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sets_audio_and_video_flags() {
        let header = encode_header(true, true);
        assert_eq!(&header[..3], b"FLV");
        assert_eq!(header[4], 0b0000_0101);
    }

    #[test]
    fn header_with_video_only() {
        let header = encode_header(false, true);
        assert_eq!(header[4], 0b0000_0001);
    }

    #[test]
    fn tag_encodes_extended_timestamp_byte() {
        let tag = encode_tag(FlvTagType::Video, 0x0100_0001, &[0xAB]).unwrap();
        // byte index 7 is the timestamp-extended byte
        assert_eq!(tag[7], 0x01);
    }

    #[test]
    fn tag_rejects_oversized_body() {
        let oversized = vec![0u8; 0x0100_0000];
        let err = encode_tag(FlvTagType::Audio, 0, &oversized).unwrap_err();
        assert!(matches!(err, FlvMuxError::BodyTooLarge(_)));
    }

    #[test]
    fn previous_tag_size_is_tag_length() {
        let tag = encode_tag(FlvTagType::Audio, 0, &[1, 2, 3]).unwrap();
        let size = encode_previous_tag_size(tag.len() as u32);
        assert_eq!(u32::from_be_bytes(size) as usize, tag.len());
    }
}
