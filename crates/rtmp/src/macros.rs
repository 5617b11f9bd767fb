/// Generates a `From<$source> for $for_type` impl that wraps the source
/// error in `$for_type::$variant`.
///
/// ```ignore
/// from_error!(ChunkDecodeError, Self::Io, std::io::Error);
/// ```
macro_rules! from_error {
    ($for_type:ty, $variant:path, $source:ty) => {
        impl From<$source> for $for_type {
            fn from(value: $source) -> Self {
                $variant(value)
            }
        }
    };
}

pub(crate) use from_error;
