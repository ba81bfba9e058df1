//! Bounds checks for walking a chain of headers
//!
//! Pure arithmetic on the cursor/remaining pair used by
//! [`BlockWalker`](crate::BlockWalker). Nothing here touches buffer memory.

use crate::format::constants::HEADER_SIZE;
use crate::walker::WalkError;

/// Ensure a full header fits in the bytes left after `offset`
pub const fn check_header_space(offset: usize, remaining: usize) -> Result<(), WalkError> {
    if remaining < HEADER_SIZE {
        return Err(WalkError::HeaderTruncated {
            offset,
            remaining,
            needed: HEADER_SIZE,
        });
    }
    Ok(())
}

/// Ensure a jump of `next` bytes from the header at `offset` stays in bounds
///
/// `remaining` counts from the start of the current header. Returns the bytes
/// left after the jump.
pub const fn check_next_offset(offset: usize, remaining: usize, next: usize) -> Result<usize, WalkError> {
    if remaining < next {
        return Err(WalkError::NextOffsetOverrun {
            offset,
            remaining,
            next,
        });
    }
    Ok(remaining - next)
}
