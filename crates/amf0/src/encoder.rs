use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use super::define::Amf0Value;
use super::errors::Amf0WriteError;

/// Encodes [`Amf0Value`]s to AMF0 wire bytes.
pub struct Amf0Encoder;

impl Amf0Encoder {
    /// Encodes a single value.
    pub fn encode(writer: &mut impl io::Write, value: &Amf0Value) -> Result<(), Amf0WriteError> {
        match value {
            Amf0Value::Number(n) => Self::write_number(writer, *n),
            Amf0Value::Boolean(b) => Self::write_bool(writer, *b),
            Amf0Value::String(s) => Self::write_string(writer, s),
            Amf0Value::LongString(s) => Self::write_long_string(writer, s),
            Amf0Value::Null => Self::write_null(writer),
            Amf0Value::Undefined => Self::write_undefined(writer),
            Amf0Value::Object(entries) => Self::write_object(writer, entries),
            Amf0Value::EcmaArray(entries) => Self::write_ecma_array(writer, entries),
            Amf0Value::StrictArray(values) => Self::write_strict_array(writer, values),
        }
    }

    /// Encodes every value in `values` back to back, in order.
    pub fn encode_all(writer: &mut impl io::Write, values: &[Amf0Value]) -> Result<(), Amf0WriteError> {
        for value in values {
            Self::encode(writer, value)?;
        }
        Ok(())
    }

    pub fn write_number(writer: &mut impl io::Write, value: f64) -> Result<(), Amf0WriteError> {
        writer.write_u8(super::define::Amf0Marker::Number as u8)?;
        writer.write_f64::<BigEndian>(value)?;
        Ok(())
    }

    pub fn write_bool(writer: &mut impl io::Write, value: bool) -> Result<(), Amf0WriteError> {
        writer.write_u8(super::define::Amf0Marker::Boolean as u8)?;
        writer.write_u8(value as u8)?;
        Ok(())
    }

    pub fn write_string(writer: &mut impl io::Write, value: &str) -> Result<(), Amf0WriteError> {
        if value.len() > u16::MAX as usize {
            return Self::write_long_string(writer, value);
        }
        writer.write_u8(super::define::Amf0Marker::String as u8)?;
        Self::write_short_string_body(writer, value)
    }

    pub fn write_long_string(writer: &mut impl io::Write, value: &str) -> Result<(), Amf0WriteError> {
        if value.len() > u32::MAX as usize {
            return Err(Amf0WriteError::StringTooLong(value.len()));
        }
        writer.write_u8(super::define::Amf0Marker::LongString as u8)?;
        writer.write_u32::<BigEndian>(value.len() as u32)?;
        writer.write_all(value.as_bytes())?;
        Ok(())
    }

    pub fn write_null(writer: &mut impl io::Write) -> Result<(), Amf0WriteError> {
        writer.write_u8(super::define::Amf0Marker::Null as u8)?;
        Ok(())
    }

    pub fn write_undefined(writer: &mut impl io::Write) -> Result<(), Amf0WriteError> {
        writer.write_u8(super::define::Amf0Marker::Undefined as u8)?;
        Ok(())
    }

    pub fn write_object(writer: &mut impl io::Write, entries: &[(std::borrow::Cow<str>, Amf0Value)]) -> Result<(), Amf0WriteError> {
        writer.write_u8(super::define::Amf0Marker::Object as u8)?;
        Self::write_properties(writer, entries)
    }

    pub fn write_ecma_array(
        writer: &mut impl io::Write,
        entries: &[(std::borrow::Cow<str>, Amf0Value)],
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(super::define::Amf0Marker::EcmaArray as u8)?;
        writer.write_u32::<BigEndian>(entries.len() as u32)?;
        Self::write_properties(writer, entries)
    }

    pub fn write_strict_array(writer: &mut impl io::Write, values: &[Amf0Value]) -> Result<(), Amf0WriteError> {
        writer.write_u8(super::define::Amf0Marker::StrictArray as u8)?;
        writer.write_u32::<BigEndian>(values.len() as u32)?;
        for value in values {
            Self::encode(writer, value)?;
        }
        Ok(())
    }

    fn write_properties(writer: &mut impl io::Write, entries: &[(std::borrow::Cow<str>, Amf0Value)]) -> Result<(), Amf0WriteError> {
        for (key, value) in entries {
            Self::write_short_string_body(writer, key)?;
            Self::encode(writer, value)?;
        }
        writer.write_u16::<BigEndian>(0)?;
        writer.write_u8(super::define::Amf0Marker::ObjectEnd as u8)?;
        Ok(())
    }

    fn write_short_string_body(writer: &mut impl io::Write, value: &str) -> Result<(), Amf0WriteError> {
        if value.len() > u16::MAX as usize {
            return Err(Amf0WriteError::StringTooLong(value.len()));
        }
        writer.write_u16::<BigEndian>(value.len() as u16)?;
        writer.write_all(value.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::decoder::Amf0Decoder;

    #[test]
    fn round_trips_number() {
        let mut buf = Vec::new();
        Amf0Encoder::write_number(&mut buf, 3.25).unwrap();
        let mut decoder = Amf0Decoder::new(&buf);
        assert_eq!(decoder.decode().unwrap(), Amf0Value::Number(3.25));
    }

    #[test]
    fn round_trips_object_order() {
        let entries = vec![
            (Cow::Borrowed("level"), Amf0Value::string("status")),
            (Cow::Borrowed("code"), Amf0Value::string("NetStream.Publish.Start")),
        ];
        let mut buf = Vec::new();
        Amf0Encoder::write_object(&mut buf, &entries).unwrap();

        let mut decoder = Amf0Decoder::new(&buf);
        let decoded = decoder.decode().unwrap();
        match decoded {
            Amf0Value::Object(decoded_entries) => {
                assert_eq!(decoded_entries[0].0, "level");
                assert_eq!(decoded_entries[1].0, "code");
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn encode_all_concatenates_values() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_all(&mut buf, &[Amf0Value::string("connect"), Amf0Value::Number(1.0), Amf0Value::Null]).unwrap();

        let mut decoder = Amf0Decoder::new(&buf);
        let values = decoder.decode_all().unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], Amf0Value::Number(1.0));
    }
}
