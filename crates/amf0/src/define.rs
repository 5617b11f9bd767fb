use std::borrow::Cow;

use num_derive::FromPrimitive;

/// The one-byte type marker that precedes every AMF0-encoded value.
///
/// See the Action Message Format spec, section 2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum Amf0Marker {
    Number = 0x00,
    Boolean = 0x01,
    String = 0x02,
    Object = 0x03,
    MovieClip = 0x04,
    Null = 0x05,
    Undefined = 0x06,
    Reference = 0x07,
    EcmaArray = 0x08,
    ObjectEnd = 0x09,
    StrictArray = 0x0a,
    Date = 0x0b,
    LongString = 0x0c,
    Unsupported = 0x0d,
    RecordSet = 0x0e,
    XmlDocument = 0x0f,
    TypedObject = 0x10,
    AvmPlusObject = 0x11,
}

/// An AMF0-decoded value.
///
/// `Object` and `String` borrow from the input buffer when possible; call
/// [`Amf0Value::into_owned`] to lift the borrow into a `'static` value (e.g.
/// to stash a value past the lifetime of the source buffer).
#[derive(Debug, Clone, PartialEq)]
pub enum Amf0Value<'a> {
    Number(f64),
    Boolean(bool),
    String(Cow<'a, str>),
    /// An object's properties in encounter order. AMF0 objects are not sets:
    /// callers that need key order preserved (for instance, command replies
    /// whose wire bytes are diffed against a reference client) must not
    /// re-sort or de-duplicate this list.
    Object(Cow<'a, [(Cow<'a, str>, Amf0Value<'a>)]>),
    Null,
    Undefined,
    EcmaArray(Cow<'a, [(Cow<'a, str>, Amf0Value<'a>)]>),
    StrictArray(Cow<'a, [Amf0Value<'a>]>),
    LongString(Cow<'a, str>),
}

impl<'a> Amf0Value<'a> {
    /// Convenience constructor for [`Amf0Value::String`].
    pub fn string(value: impl Into<Cow<'a, str>>) -> Self {
        Self::String(value.into())
    }

    /// Convenience constructor for [`Amf0Value::Object`] from an owned list
    /// of key/value pairs.
    pub fn object(entries: impl Into<Vec<(Cow<'a, str>, Amf0Value<'a>)>>) -> Self {
        Self::Object(Cow::Owned(entries.into()))
    }

    /// Returns the marker this value would be encoded with.
    pub fn marker(&self) -> Amf0Marker {
        match self {
            Self::Number(_) => Amf0Marker::Number,
            Self::Boolean(_) => Amf0Marker::Boolean,
            Self::String(_) => Amf0Marker::String,
            Self::Object(_) => Amf0Marker::Object,
            Self::Null => Amf0Marker::Null,
            Self::Undefined => Amf0Marker::Undefined,
            Self::EcmaArray(_) => Amf0Marker::EcmaArray,
            Self::StrictArray(_) => Amf0Marker::StrictArray,
            Self::LongString(_) => Amf0Marker::LongString,
        }
    }

    /// Lifts all borrowed data into owned data, producing a `'static` value.
    pub fn into_owned(self) -> Amf0Value<'static> {
        match self {
            Self::Number(n) => Amf0Value::Number(n),
            Self::Boolean(b) => Amf0Value::Boolean(b),
            Self::String(s) => Amf0Value::String(Cow::Owned(s.into_owned())),
            Self::LongString(s) => Amf0Value::LongString(Cow::Owned(s.into_owned())),
            Self::Null => Amf0Value::Null,
            Self::Undefined => Amf0Value::Undefined,
            Self::Object(entries) => Amf0Value::Object(Cow::Owned(
                entries
                    .into_owned()
                    .into_iter()
                    .map(|(k, v)| (Cow::Owned(k.into_owned()), v.into_owned()))
                    .collect(),
            )),
            Self::EcmaArray(entries) => Amf0Value::EcmaArray(Cow::Owned(
                entries
                    .into_owned()
                    .into_iter()
                    .map(|(k, v)| (Cow::Owned(k.into_owned()), v.into_owned()))
                    .collect(),
            )),
            Self::StrictArray(values) => {
                Amf0Value::StrictArray(Cow::Owned(values.into_owned().into_iter().map(Amf0Value::into_owned).collect()))
            }
        }
    }

    /// Returns the inner `f64` if this is a [`Amf0Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the inner string if this is a [`Amf0Value::String`] or
    /// [`Amf0Value::LongString`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::LongString(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a property by key if this is an [`Amf0Value::Object`] or
    /// [`Amf0Value::EcmaArray`].
    pub fn get(&self, key: &str) -> Option<&Amf0Value<'a>> {
        match self {
            Self::Object(entries) | Self::EcmaArray(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}
