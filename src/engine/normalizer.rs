//! Maps raw exchange fills into the canonical sequence the netting engine
//! consumes: malformed fills dropped, remainder stably sorted by time.

use crate::domain::Fill;
use tracing::{debug, warn};

/// Normalize one symbol's fills for netting.
///
/// Fills with a non-positive (or non-finite) quantity or price are dropped
/// with a warning rather than aborting the whole reconstruction. The sort is
/// stable: fills with equal timestamps retain source order, which decides
/// which side of a netting boundary they fall on.
pub fn normalize_fills(fills: Vec<Fill>) -> Vec<Fill> {
    let total = fills.len();
    let mut kept: Vec<Fill> = fills
        .into_iter()
        .filter(|fill| {
            let valid = fill.quantity > 0.0
                && fill.price > 0.0
                && fill.quantity.is_finite()
                && fill.price.is_finite();
            if !valid {
                warn!(
                    "dropping malformed fill id={} symbol={} qty={} price={}",
                    fill.id, fill.symbol, fill.quantity, fill.price
                );
            }
            valid
        })
        .collect();

    if kept.len() < total {
        debug!("normalizer dropped {} of {} fills", total - kept.len(), total);
    }

    kept.sort_by_key(|fill| fill.timestamp);
    kept
}
