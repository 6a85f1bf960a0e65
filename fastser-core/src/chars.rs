//! Character unit codec used by string fields.
//!
//! Strings are stored as a sequence of UTF-16 code units, each packed into
//! one to three bytes with a UTF-8 shaped layout:
//!
//! ```text
//! unit <= 0x7F    0xxxxxxx
//! unit <= 0x7FF   110xxxxx 10xxxxxx
//! otherwise       1110xxxx 10xxxxxx 10xxxxxx
//! ```
//!
//! This is not UTF-8. Surrogates are written one unit at a time and the
//! decoder keys off the lead byte only (`< 0x80`, `< 0xE0`, anything else),
//! so stray continuation bytes decode as two-byte units. Existing streams
//! depend on these exact byte boundaries.

/// Largest encoded unit in bytes.
pub const MAX_UNIT_LEN: usize = 3;

/// Encodes one code unit, returning the bytes and how many of them are used.
#[inline]
#[must_use]
pub fn encode_unit(unit: u16) -> ([u8; MAX_UNIT_LEN], usize) {
    if unit <= 0x7F {
        ([unit as u8, 0, 0], 1)
    } else if unit <= 0x7FF {
        ([0xC0 | (unit >> 6) as u8, 0x80 | (unit & 0x3F) as u8, 0], 2)
    } else {
        (
            [
                0xE0 | ((unit >> 12) & 0xF) as u8,
                0x80 | ((unit >> 6) & 0x3F) as u8,
                0x80 | (unit & 0x3F) as u8,
            ],
            3,
        )
    }
}

/// Returns the encoded width of a unit from its lead byte.
#[inline(always)]
#[must_use]
pub const fn unit_len(lead: u8) -> usize {
    if lead < 0x80 {
        1
    } else if lead < 0xE0 {
        2
    } else {
        3
    }
}

/// Decodes one code unit from its lead byte and continuation bytes.
///
/// `rest` must hold `unit_len(lead) - 1` bytes.
#[inline]
#[must_use]
pub fn decode_unit(lead: u8, rest: &[u8]) -> u16 {
    match unit_len(lead) {
        1 => u16::from(lead),
        2 => (u16::from(lead & 0x1F) << 6) | u16::from(rest[0] & 0x3F),
        _ => {
            (u16::from(lead & 0x0F) << 12)
                | (u16::from(rest[0] & 0x3F) << 6)
                | u16::from(rest[1] & 0x3F)
        }
    }
}

/// Total encoded payload size of a unit sequence in bytes.
#[must_use]
pub fn encoded_len(units: &[u16]) -> usize {
    units.iter().map(|&u| encode_unit(u).1).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(unit: u16) -> u16 {
        let (bytes, len) = encode_unit(unit);
        assert_eq!(unit_len(bytes[0]), len);
        decode_unit(bytes[0], &bytes[1..len])
    }

    #[test]
    fn test_encode_boundaries() {
        assert_eq!(encode_unit(0x00), ([0x00, 0, 0], 1));
        assert_eq!(encode_unit(0x7F), ([0x7F, 0, 0], 1));
        assert_eq!(encode_unit(0x80), ([0xC2, 0x80, 0], 2));
        assert_eq!(encode_unit(0x7FF), ([0xDF, 0xBF, 0], 2));
        assert_eq!(encode_unit(0x800), ([0xE0, 0xA0, 0x80], 3));
        assert_eq!(encode_unit(0xFFFF), ([0xEF, 0xBF, 0xBF], 3));
    }

    #[test]
    fn test_surrogates_use_three_bytes() {
        assert_eq!(encode_unit(0xD83D), ([0xED, 0xA0, 0xBD], 3));
        assert_eq!(round_trip(0xD83D), 0xD83D);
        assert_eq!(round_trip(0xDE00), 0xDE00);
    }

    #[test]
    fn test_every_unit_round_trips() {
        for unit in 0..=u16::MAX {
            assert_eq!(round_trip(unit), unit, "unit {unit:#x}");
        }
    }

    #[test]
    fn test_stray_continuation_lead_is_two_bytes() {
        assert_eq!(unit_len(0x80), 2);
        assert_eq!(unit_len(0xBF), 2);
        assert_eq!(decode_unit(0x85, &[0x81]), (0x05 << 6) | 0x01);
    }

    #[test]
    fn test_encoded_len() {
        let units: Vec<u16> = "aé€".encode_utf16().collect();
        assert_eq!(encoded_len(&units), 1 + 2 + 3);
    }
}
