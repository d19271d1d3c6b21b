//! Ephemeral id allocation for deals and products synthesized in memory.

use std::sync::atomic::{AtomicI64, Ordering};

/// First id of the ephemeral deal range.
pub const DEAL_ID_FLOOR: i64 = 1_000_000;

/// First id of the ephemeral product range; also the exclusive upper bound
/// of the deal range.
pub const PRODUCT_ID_FLOOR: i64 = 2_000_000;

/// Allocates ids for deals and products that exist only for the lifetime of
/// a process. The ranges sit far above anything storage issues, so an
/// ephemeral id can never collide with a persisted row.
#[derive(Debug)]
pub struct IdAllocator {
    next_deal: AtomicI64,
    next_product: AtomicI64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_deal: AtomicI64::new(DEAL_ID_FLOOR),
            next_product: AtomicI64::new(PRODUCT_ID_FLOOR),
        }
    }

    pub fn next_deal_id(&self) -> i64 {
        self.next_deal.fetch_add(1, Ordering::Relaxed)
    }

    pub fn next_product_id(&self) -> i64 {
        self.next_product.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true if the id falls in the ephemeral deal range.
#[cfg(test)]
pub fn is_ephemeral_deal_id(id: i64) -> bool {
    (DEAL_ID_FLOOR..PRODUCT_ID_FLOOR).contains(&id)
}

/// Returns true if the id falls in the ephemeral product range.
#[cfg(test)]
pub fn is_ephemeral_product_id(id: i64) -> bool {
    id >= PRODUCT_ID_FLOOR
}
