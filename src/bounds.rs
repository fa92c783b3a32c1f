//! Unsigned-integer range predicates with field-path error messages.
use crate::error::BoundsError;

/// Validate that `value` fits in a u16, returning a [`BoundsError`] naming
/// `field` otherwise.
pub fn check_u16(value: i64, field: impl Into<String>) -> Result<u16, BoundsError> {
    check_un(value, field, 16).map(|v| v as u16)
}

/// Validate that `value` fits in a u32, returning a [`BoundsError`] naming
/// `field` otherwise.
pub fn check_u32(value: i64, field: impl Into<String>) -> Result<u32, BoundsError> {
    check_un(value, field, 32).map(|v| v as u32)
}

fn check_un(value: i64, field: impl Into<String>, num_bits: u32) -> Result<i64, BoundsError> {
    let max = (1u64 << num_bits) - 1;
    if value < 0 || value as u64 > max {
        Err(BoundsError {
            field: field.into(),
            value,
            max,
        })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_in_bounds() {
        assert_eq!(check_u16(0, "x").unwrap(), 0);
        assert_eq!(check_u16(65535, "x").unwrap(), 65535);
    }

    #[test]
    fn u16_out_of_bounds() {
        assert!(check_u16(65536, "width").is_err());
        assert!(check_u16(-1, "width").is_err());
    }

    #[test]
    fn u32_in_bounds() {
        assert_eq!(check_u32(4096, "unknown2").unwrap(), 4096);
        assert_eq!(check_u32(u32::MAX as i64, "unknown2").unwrap(), u32::MAX);
    }

    #[test]
    fn u32_out_of_bounds() {
        assert!(check_u32(u32::MAX as i64 + 1, "unknown2").is_err());
    }
}
