//! Small helpers for working with [`bytes`] and [`std::io::Cursor`].

use std::io::Cursor;

use bytes::{Bytes, BytesMut};

/// Extension trait for [`Cursor`] that lets callers recover the bytes that
/// were never consumed by a parser without having to track positions by hand.
pub trait BytesCursorExt {
    /// Returns everything from the current cursor position to the end of the
    /// underlying buffer, advancing the cursor to the end.
    fn extract_remaining(&mut self) -> Bytes;
}

impl BytesCursorExt for Cursor<Bytes> {
    fn extract_remaining(&mut self) -> Bytes {
        let pos = self.position().min(self.get_ref().len() as u64) as usize;
        let remaining = self.get_ref().slice(pos..);
        self.set_position(self.get_ref().len() as u64);
        remaining
    }
}

impl BytesCursorExt for Cursor<BytesMut> {
    fn extract_remaining(&mut self) -> Bytes {
        let pos = self.position().min(self.get_ref().len() as u64) as usize;
        let remaining = self.get_ref()[pos..].to_vec();
        self.set_position(self.get_ref().len() as u64);
        Bytes::from(remaining)
    }
}

impl BytesCursorExt for Cursor<&[u8]> {
    fn extract_remaining(&mut self) -> Bytes {
        let pos = self.position().min(self.get_ref().len() as u64) as usize;
        let remaining = self.get_ref()[pos..].to_vec();
        self.set_position(self.get_ref().len() as u64);
        Bytes::from(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_remaining_slices_from_position() {
        let mut cursor = Cursor::new(Bytes::from_static(b"hello world"));
        cursor.set_position(6);
        assert_eq!(cursor.extract_remaining(), Bytes::from_static(b"world"));
    }

    #[test]
    fn extract_remaining_at_end_is_empty() {
        let mut cursor = Cursor::new(Bytes::from_static(b"abc"));
        cursor.set_position(3);
        assert_eq!(cursor.extract_remaining(), Bytes::new());
    }
}
