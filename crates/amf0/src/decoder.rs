use std::borrow::Cow;
use std::io::Cursor;
use std::str;

use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;

use super::define::{Amf0Marker, Amf0Value};
use super::errors::Amf0ReadError;

/// Decodes a sequence of AMF0 values from a borrowed byte slice.
///
/// Strings and object keys are borrowed from the input where the encoding
/// allows it (plain utf8, no escaping needed), so decoding a large payload
/// of mostly strings does not allocate much.
pub struct Amf0Decoder<'a> {
    reader: Cursor<&'a [u8]>,
}

impl<'a> Amf0Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { reader: Cursor::new(data) }
    }

    /// Returns true if there is more data to decode.
    pub fn has_remaining(&self) -> bool {
        self.reader.position() < self.reader.get_ref().len() as u64
    }

    fn peek_marker(&mut self) -> Result<Amf0Marker, Amf0ReadError> {
        let pos = self.reader.position();
        let byte = self.reader.read_u8()?;
        self.reader.set_position(pos);
        Amf0Marker::from_u8(byte).ok_or(Amf0ReadError::UnknownMarker(byte))
    }

    /// Decodes the next value, requiring it to carry `expected`'s marker.
    pub fn decode_with_type(&mut self, expected: Amf0Marker) -> Result<Amf0Value<'a>, Amf0ReadError> {
        let got = self.peek_marker()?;
        if got != expected {
            return Err(Amf0ReadError::WrongType { expected, got });
        }
        self.decode()
    }

    /// Decodes the next value, whatever its marker.
    pub fn decode(&mut self) -> Result<Amf0Value<'a>, Amf0ReadError> {
        let marker_byte = self.reader.read_u8()?;
        let marker = Amf0Marker::from_u8(marker_byte).ok_or(Amf0ReadError::UnknownMarker(marker_byte))?;

        match marker {
            Amf0Marker::Number => Ok(Amf0Value::Number(self.reader.read_f64::<BigEndian>()?)),
            Amf0Marker::Boolean => Ok(Amf0Value::Boolean(self.reader.read_u8()? != 0)),
            Amf0Marker::String => Ok(Amf0Value::String(self.read_short_string()?)),
            Amf0Marker::LongString => Ok(Amf0Value::LongString(self.read_long_string()?)),
            Amf0Marker::Null | Amf0Marker::Undefined => {
                if marker == Amf0Marker::Null {
                    Ok(Amf0Value::Null)
                } else {
                    Ok(Amf0Value::Undefined)
                }
            }
            Amf0Marker::Object => Ok(Amf0Value::Object(Cow::Owned(self.read_properties()?))),
            Amf0Marker::EcmaArray => {
                let _count = self.reader.read_u32::<BigEndian>()?;
                Ok(Amf0Value::EcmaArray(Cow::Owned(self.read_properties()?)))
            }
            Amf0Marker::StrictArray => {
                let count = self.reader.read_u32::<BigEndian>()?;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(self.decode()?);
                }
                Ok(Amf0Value::StrictArray(Cow::Owned(values)))
            }
            other => Err(Amf0ReadError::Unsupported(other)),
        }
    }

    /// Decodes values until the buffer is exhausted.
    pub fn decode_all(&mut self) -> Result<Vec<Amf0Value<'a>>, Amf0ReadError> {
        let mut values = Vec::new();
        while self.has_remaining() {
            values.push(self.decode()?);
        }
        Ok(values)
    }

    fn read_short_string(&mut self) -> Result<Cow<'a, str>, Amf0ReadError> {
        let len = self.reader.read_u16::<BigEndian>()? as usize;
        self.read_str_bytes(len)
    }

    fn read_long_string(&mut self) -> Result<Cow<'a, str>, Amf0ReadError> {
        let len = self.reader.read_u32::<BigEndian>()? as usize;
        self.read_str_bytes(len)
    }

    fn read_str_bytes(&mut self, len: usize) -> Result<Cow<'a, str>, Amf0ReadError> {
        let pos = self.reader.position() as usize;
        let end = pos + len;
        let buf = self.reader.get_ref();
        if end > buf.len() {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        let slice = &buf[pos..end];
        self.reader.set_position(end as u64);
        Ok(Cow::Borrowed(str::from_utf8(slice)?))
    }

    /// Reads `(key, value)` pairs up until the empty-key + `ObjectEnd` marker.
    fn read_properties(&mut self) -> Result<Vec<(Cow<'a, str>, Amf0Value<'a>)>, Amf0ReadError> {
        let mut entries = Vec::new();
        loop {
            let key = self.read_short_string()?;
            if key.is_empty() {
                let marker_byte = self.reader.read_u8()?;
                if Amf0Marker::from_u8(marker_byte) != Some(Amf0Marker::ObjectEnd) {
                    return Err(Amf0ReadError::UnknownMarker(marker_byte));
                }
                break;
            }
            let value = self.decode()?;
            entries.push((key, value));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_number() {
        let mut bytes = vec![Amf0Marker::Number as u8];
        bytes.extend_from_slice(&42.5f64.to_be_bytes());
        let mut decoder = Amf0Decoder::new(&bytes);
        assert_eq!(decoder.decode().unwrap(), Amf0Value::Number(42.5));
    }

    #[test]
    fn decodes_short_string() {
        let mut bytes = vec![Amf0Marker::String as u8, 0x00, 0x05];
        bytes.extend_from_slice(b"hello");
        let mut decoder = Amf0Decoder::new(&bytes);
        assert_eq!(decoder.decode().unwrap(), Amf0Value::String(Cow::Borrowed("hello")));
    }

    #[test]
    fn decodes_object_preserving_order() {
        let mut bytes = vec![Amf0Marker::Object as u8];
        for (key, val) in [("b", 1.0), ("a", 2.0)] {
            bytes.extend_from_slice(&(key.len() as u16).to_be_bytes());
            bytes.extend_from_slice(key.as_bytes());
            bytes.push(Amf0Marker::Number as u8);
            bytes.extend_from_slice(&val.to_be_bytes());
        }
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.push(Amf0Marker::ObjectEnd as u8);

        let mut decoder = Amf0Decoder::new(&bytes);
        let value = decoder.decode().unwrap();
        match value {
            Amf0Value::Object(entries) => {
                assert_eq!(entries[0].0, "b");
                assert_eq!(entries[1].0, "a");
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn decode_with_type_rejects_mismatch() {
        let bytes = vec![Amf0Marker::Null as u8];
        let mut decoder = Amf0Decoder::new(&bytes);
        let err = decoder.decode_with_type(Amf0Marker::Number).unwrap_err();
        assert!(matches!(err, Amf0ReadError::WrongType { .. }));
    }

    #[test]
    fn decode_all_stops_at_end_of_buffer() {
        let mut bytes = vec![Amf0Marker::Null as u8];
        bytes.push(Amf0Marker::Boolean as u8);
        bytes.push(1);
        let mut decoder = Amf0Decoder::new(&bytes);
        let values = decoder.decode_all().unwrap();
        assert_eq!(values, vec![Amf0Value::Null, Amf0Value::Boolean(true)]);
    }
}
