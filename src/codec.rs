//! Field codecs
//!
//! Stateless decode units for every field type found in a frame. Byte codecs
//! read little-endian integers and IEEE-754 single-precision floats; token
//! codecs parse decimal numbers and bracketed 9-element vectors such as
//! `[12,15,15,2010,580,120,8,2,1]`.
//!
//! Encoding is a firmware concern, so only the decode direction exists here.

use crate::protocol::FrameSource;
use std::fmt;

/// Element count of particulate and gas vectors
pub const VECTOR_ARITY: usize = 9;

/// How one field slot is stored on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 32-bit integer
    I32,
    /// Single-precision float
    F32,
    /// Nine unsigned 16-bit counters
    CountVector,
    /// Nine single-precision floats
    FloatVector,
    /// Alignment bytes; radio layouts only
    Pad(usize),
}

impl Codec {
    /// Width in bytes inside a radio frame
    pub const fn byte_width(&self) -> usize {
        match self {
            Codec::U8 => 1,
            Codec::U16 => 2,
            Codec::U32 | Codec::I32 | Codec::F32 => 4,
            Codec::CountVector => 2 * VECTOR_ARITY,
            Codec::FloatVector => 4 * VECTOR_ARITY,
            Codec::Pad(n) => *n,
        }
    }

    /// Width in tokens inside a serial line
    pub const fn token_width(&self) -> usize {
        match self {
            Codec::Pad(_) => 0,
            _ => 1,
        }
    }

    /// Width in the unit of the given frame source
    pub const fn width(&self, source: FrameSource) -> usize {
        match source {
            FrameSource::RadioBinary => self.byte_width(),
            FrameSource::SerialAscii => self.token_width(),
        }
    }

    /// Whether this codec yields a value at all
    pub fn is_padding(&self) -> bool {
        matches!(self, Codec::Pad(_))
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::U8 => write!(f, "u8"),
            Codec::U16 => write!(f, "u16"),
            Codec::U32 => write!(f, "u32"),
            Codec::I32 => write!(f, "i32"),
            Codec::F32 => write!(f, "f32"),
            Codec::CountVector => write!(f, "[u16; {VECTOR_ARITY}]"),
            Codec::FloatVector => write!(f, "[f32; {VECTOR_ARITY}]"),
            Codec::Pad(n) => write!(f, "pad({n})"),
        }
    }
}

/// A decoded value before it is assigned to a reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    Unsigned(u32),
    Signed(i32),
    Float(f32),
    Counts([u16; VECTOR_ARITY]),
    Floats([f32; VECTOR_ARITY]),
    Skipped,
}

/// Why a codec rejected its input
///
/// The decoder attaches the variant alias and field name to turn this into a
/// [`DecodeError`](crate::error::DecodeError).
#[derive(Debug, Clone, PartialEq)]
pub enum CodecFault {
    /// The text or bytes do not hold a value of the codec's type
    Conversion(String),
    /// A bracketed list has the wrong element count
    Arity { expected: usize, actual: usize },
}

fn le<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecFault> {
    bytes
        .try_into()
        .map_err(|_| CodecFault::Conversion(format!("need {N} bytes, got {}", bytes.len())))
}

/// Decode one slot from exactly `codec.byte_width()` bytes
pub fn decode_bytes(codec: Codec, bytes: &[u8]) -> Result<RawValue, CodecFault> {
    let value = match codec {
        Codec::U8 => RawValue::Unsigned(u32::from(u8::from_le_bytes(le::<1>(bytes)?))),
        Codec::U16 => RawValue::Unsigned(u32::from(u16::from_le_bytes(le::<2>(bytes)?))),
        Codec::U32 => RawValue::Unsigned(u32::from_le_bytes(le::<4>(bytes)?)),
        Codec::I32 => RawValue::Signed(i32::from_le_bytes(le::<4>(bytes)?)),
        Codec::F32 => RawValue::Float(f32::from_le_bytes(le::<4>(bytes)?)),
        Codec::CountVector => {
            let bytes = le::<{ 2 * VECTOR_ARITY }>(bytes)?;
            let mut counts = [0u16; VECTOR_ARITY];
            for (count, chunk) in counts.iter_mut().zip(bytes.chunks_exact(2)) {
                *count = u16::from_le_bytes([chunk[0], chunk[1]]);
            }
            RawValue::Counts(counts)
        }
        Codec::FloatVector => {
            let bytes = le::<{ 4 * VECTOR_ARITY }>(bytes)?;
            let mut values = [0f32; VECTOR_ARITY];
            for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
                *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            }
            RawValue::Floats(values)
        }
        Codec::Pad(_) => RawValue::Skipped,
    };
    Ok(value)
}

/// Decode one slot from a single serial token
pub fn decode_token(codec: Codec, token: &str) -> Result<RawValue, CodecFault> {
    let value = match codec {
        Codec::U8 => RawValue::Unsigned(u32::from(parse_number::<u8>(token)?)),
        Codec::U16 => RawValue::Unsigned(u32::from(parse_number::<u16>(token)?)),
        Codec::U32 => RawValue::Unsigned(parse_number::<u32>(token)?),
        Codec::I32 => RawValue::Signed(parse_number::<i32>(token)?),
        Codec::F32 => RawValue::Float(parse_number::<f32>(token)?),
        Codec::CountVector => RawValue::Counts(parse_vector::<u16>(token)?),
        Codec::FloatVector => RawValue::Floats(parse_vector::<f32>(token)?),
        Codec::Pad(_) => RawValue::Skipped,
    };
    Ok(value)
}

fn parse_number<T>(token: &str) -> Result<T, CodecFault>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    token
        .parse::<T>()
        .map_err(|e| CodecFault::Conversion(e.to_string()))
}

/// Parse `[v0,v1,...,v8]` into a fixed-size array
///
/// Surrounding brackets are stripped leniently; the element count is not.
pub fn parse_vector<T>(token: &str) -> Result<[T; VECTOR_ARITY], CodecFault>
where
    T: std::str::FromStr + Copy + Default,
    T::Err: fmt::Display,
{
    let inner = token.trim_matches(|c| c == '[' || c == ']');
    let actual = inner.split(',').count();
    if actual != VECTOR_ARITY {
        return Err(CodecFault::Arity {
            expected: VECTOR_ARITY,
            actual,
        });
    }

    let mut out = [T::default(); VECTOR_ARITY];
    for (slot, element) in out.iter_mut().zip(inner.split(',')) {
        *slot = element
            .parse::<T>()
            .map_err(|e| CodecFault::Conversion(format!("element {element:?}: {e}")))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_widths() {
        assert_eq!(Codec::U8.byte_width(), 1);
        assert_eq!(Codec::U16.byte_width(), 2);
        assert_eq!(Codec::I32.byte_width(), 4);
        assert_eq!(Codec::CountVector.byte_width(), 18);
        assert_eq!(Codec::FloatVector.byte_width(), 36);
        assert_eq!(Codec::Pad(2).byte_width(), 2);
        assert_eq!(Codec::Pad(2).token_width(), 0);
        assert_eq!(Codec::FloatVector.width(FrameSource::SerialAscii), 1);
    }

    #[test]
    fn test_decode_bytes_little_endian() {
        assert_eq!(
            decode_bytes(Codec::U16, &[0x34, 0x12]),
            Ok(RawValue::Unsigned(0x1234))
        );
        assert_eq!(
            decode_bytes(Codec::U32, &[0x78, 0x56, 0x34, 0x12]),
            Ok(RawValue::Unsigned(0x1234_5678))
        );
        assert_eq!(
            decode_bytes(Codec::I32, &(-42i32).to_le_bytes()),
            Ok(RawValue::Signed(-42))
        );
        match decode_bytes(Codec::F32, &22.5f32.to_le_bytes()) {
            Ok(RawValue::Float(v)) => assert_relative_eq!(v, 22.5),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_count_vector() {
        let bytes: Vec<u8> = (1u16..=9).flat_map(|v| (v * 100).to_le_bytes()).collect();
        assert_eq!(
            decode_bytes(Codec::CountVector, &bytes),
            Ok(RawValue::Counts([100, 200, 300, 400, 500, 600, 700, 800, 900]))
        );
    }

    #[test]
    fn test_decode_bytes_wrong_width() {
        assert!(matches!(
            decode_bytes(Codec::U32, &[1, 2, 3]),
            Err(CodecFault::Conversion(_))
        ));
    }

    #[test]
    fn test_decode_token_numbers() {
        assert_eq!(decode_token(Codec::U8, "7"), Ok(RawValue::Unsigned(7)));
        assert_eq!(decode_token(Codec::I32, "-3"), Ok(RawValue::Signed(-3)));
        assert_eq!(decode_token(Codec::F32, "1.5"), Ok(RawValue::Float(1.5)));
        assert!(decode_token(Codec::U8, "256").is_err());
        assert!(decode_token(Codec::U16, "70000").is_err());
        assert!(decode_token(Codec::U32, "-1").is_err());
        assert!(decode_token(Codec::F32, "abc").is_err());
        assert!(decode_token(Codec::U16, "").is_err());
    }

    #[test]
    fn test_parse_vector() {
        let counts: [u16; 9] = parse_vector("[1,2,3,4,5,6,7,8,9]").unwrap();
        assert_eq!(counts, [1, 2, 3, 4, 5, 6, 7, 8, 9]);

        let floats: [f32; 9] = parse_vector("[0.5,0,0,0,0,0,0,0,1.25]").unwrap();
        assert_relative_eq!(floats[0], 0.5);
        assert_relative_eq!(floats[8], 1.25);
    }

    #[test]
    fn test_parse_vector_arity() {
        assert_eq!(
            parse_vector::<u16>("[1,2,3,4,5,6,7,8]"),
            Err(CodecFault::Arity {
                expected: 9,
                actual: 8
            })
        );
        assert_eq!(
            parse_vector::<u16>("[1,2,3,4,5,6,7,8,9,10]"),
            Err(CodecFault::Arity {
                expected: 9,
                actual: 10
            })
        );
        assert!(matches!(
            parse_vector::<u16>("[]"),
            Err(CodecFault::Arity { actual: 1, .. })
        ));
    }

    #[test]
    fn test_parse_vector_bad_element() {
        assert!(matches!(
            parse_vector::<u16>("[1,2,3,4,x,6,7,8,9]"),
            Err(CodecFault::Conversion(_))
        ));
        // Embedded spaces are not part of the format
        assert!(parse_vector::<u16>("[1, 2,3,4,5,6,7,8,9]").is_err());
    }
}
