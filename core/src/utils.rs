use std::fmt;
use num_enum::TryFromPrimitive;

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

pub fn fmt_bytes(b: &[u8]) -> String {
    if !b.is_empty() && b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}

/// Prefix of `data` up to `n` bytes, for logging payload heads.
pub fn head(data: &[u8], n: usize) -> &[u8] {
    &data[..data.len().min(n)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PixelFormat;

    #[test]
    fn enum_name_known_and_unknown() {
        assert_eq!(enum_name_or_hex::<PixelFormat>(b'M'), "Compressed");
        assert_eq!(enum_name_or_hex::<PixelFormat>(0x7f), "0x7f");
    }

    #[test]
    fn fmt_bytes_binary_is_hex() {
        assert_eq!(fmt_bytes(&[0xFF, 0xD8]), "0xffd8");
        assert_eq!(fmt_bytes(b"MY"), "b\"MY\"");
        assert_eq!(fmt_bytes(&[]), "0x");
    }

    #[test]
    fn head_clamps() {
        assert_eq!(head(&[1, 2, 3], 2), &[1, 2]);
        assert_eq!(head(&[1], 4), &[1]);
    }
}
