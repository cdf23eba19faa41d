//! Byte pattern search.
//!
//! Thin wrappers over `memchr::memmem`, which picks a SIMD implementation
//! for the current target.

/// Find a multi-byte pattern in a slice, searching from the end.
#[inline]
pub fn find_pattern_reverse(needle: &[u8], haystack: &[u8]) -> Option<usize> {
    memchr::memmem::rfind(haystack, needle)
}

/// Count the non-overlapping occurrences of a pattern.
pub fn count_pattern(needle: &[u8], haystack: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    memchr::memmem::find_iter(haystack, needle).count()
}
