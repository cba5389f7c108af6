//! Integer conversions for firmware supplied addresses and lengths.

/// Converts a [`u64`] physical address to a [`usize`], if it is addressable.
#[cfg(target_pointer_width = "64")]
#[must_use]
#[allow(clippy::unnecessary_wraps)]
pub const fn u64_to_usize(val: u64) -> Option<usize> {
    Some(val as usize)
}

/// Converts a [`u64`] physical address to a [`usize`], if it is addressable.
#[cfg(not(target_pointer_width = "64"))]
#[must_use]
pub fn u64_to_usize(val: u64) -> Option<usize> {
    usize::try_from(val).ok()
}

/// Converts a [`u32`] to a [`usize`] without truncating.
#[cfg(any(target_pointer_width = "64", target_pointer_width = "32"))]
#[must_use]
pub const fn u32_to_usize(val: u32) -> usize {
    val as usize
}
