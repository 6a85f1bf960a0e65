//! Stream label type.
//!
//! A [`Label`] is the only addressing primitive of the wire format: an
//! absolute byte offset into the logical stream, serialized as a
//! little-endian `u32`.

use crate::error::{Error, Result};
use std::fmt;

/// Absolute 32-bit byte offset within a logical stream.
///
/// # Wire Format
/// ```text
/// +0: offset  (u32, 4 bytes, little-endian)
/// ```
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    /// Encoded length of a label in bytes.
    pub const ENCODED_LENGTH: usize = 4;

    /// Sentinel denoting an unset label.
    pub const INVALID: Self = Self(u32::MAX);

    /// Label of the first byte of a stream.
    pub const ZERO: Self = Self(0);

    /// Creates a label from a raw offset.
    #[inline(always)]
    #[must_use]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Returns the raw byte offset.
    #[inline(always)]
    #[must_use]
    pub const fn offset(self) -> u32 {
        self.0
    }

    /// Returns true unless this is [`Label::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Returns the label `delta` bytes further on, or `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, delta: u32) -> Option<Self> {
        match self.0.checked_add(delta) {
            Some(offset) => Some(Self(offset)),
            None => None,
        }
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::INVALID
    }
}

impl TryFrom<u64> for Label {
    type Error = Error;

    fn try_from(length: u64) -> Result<Self> {
        u32::try_from(length)
            .map(Self)
            .map_err(|_| Error::address_space(length))
    }
}

impl From<u32> for Label {
    fn from(offset: u32) -> Self {
        Self(offset)
    }
}

impl From<Label> for u32 {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl From<Label> for u64 {
    fn from(label: Label) -> Self {
        u64::from(label.0)
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Label({:#x})", self.0)
        } else {
            f.write_str("Label(INVALID)")
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_new_and_offset() {
        let label = Label::new(0x1234);
        assert_eq!(label.offset(), 0x1234);
        assert!(label.is_valid());
        assert_eq!(u64::from(label), 0x1234);
    }

    #[test]
    fn test_label_invalid_is_default() {
        assert_eq!(Label::default(), Label::INVALID);
        assert!(!Label::INVALID.is_valid());
        assert!(Label::ZERO.is_valid());
    }

    #[test]
    fn test_label_try_from_u64() {
        assert_eq!(Label::try_from(42u64).unwrap(), Label::new(42));
        assert_eq!(
            Label::try_from(u64::from(u32::MAX)).unwrap().offset(),
            u32::MAX
        );

        let err = Label::try_from(1u64 << 32).unwrap_err();
        assert!(matches!(err, Error::AddressSpaceExceeded { length } if length == 1 << 32));
    }

    #[test]
    fn test_label_checked_add() {
        assert_eq!(Label::new(8).checked_add(4), Some(Label::new(12)));
        assert_eq!(Label::new(u32::MAX - 1).checked_add(2), None);
    }

    #[test]
    fn test_label_ordering() {
        assert!(Label::new(1) < Label::new(2));
        assert!(Label::ZERO < Label::INVALID);
    }

    #[test]
    fn test_label_formatting() {
        assert_eq!(Label::new(255).to_string(), "0xff");
        assert_eq!(format!("{:?}", Label::new(16)), "Label(0x10)");
        assert_eq!(format!("{:?}", Label::INVALID), "Label(INVALID)");
    }
}
