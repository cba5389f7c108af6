//! The ACPI byte checksum.
//!
//! Every ACPI structure carries a checksum byte chosen so that all of its bytes,
//! the checksum included, add up to zero modulo 256.

/// Returns the sum of `bytes` modulo 256.
#[must_use]
pub fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &byte| acc.wrapping_add(byte))
}

/// Returns the checksum byte that makes `bytes` sum to zero.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    0u8.wrapping_sub(sum(bytes))
}

/// Returns `true` if `bytes` sum to zero.
#[must_use]
pub fn is_valid(bytes: &[u8]) -> bool {
    sum(bytes) == 0
}

#[cfg(test)]
mod tests {
    use super::{checksum, is_valid, sum};

    #[test]
    fn sum_wraps() {
        assert_eq!(sum(&[]), 0);
        assert_eq!(sum(&[0xFF, 0x02]), 0x01);
        assert_eq!(sum(&[0x80; 4]), 0x00);
    }

    #[test]
    fn checksum_completes_the_sum() {
        let mut bytes = *b"XSDT\x24\x00\x00\x00\x01\x00BOCHS ";
        assert!(!is_valid(&bytes));

        bytes[9] = checksum(&bytes);
        assert!(is_valid(&bytes));
    }

    #[test]
    fn checksum_of_valid_table_is_zero() {
        let bytes = [0x10, 0x20, 0xD0];

        assert!(is_valid(&bytes));
        assert_eq!(checksum(&bytes), 0);
    }
}
