//! Fill type representing a single executed trade leg.

use crate::domain::{Side, Symbol, TimeMs};
use serde::{Deserialize, Serialize};

/// A single executed trade leg for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    /// Exchange trade id.
    pub id: String,
    /// Instrument the fill executed on.
    pub symbol: Symbol,
    /// Order this fill belongs to.
    pub order_id: String,
    /// Trade side (Buy or Sell).
    pub side: Side,
    /// Executed quantity (> 0 after normalization).
    pub quantity: f64,
    /// Execution price (> 0 after normalization).
    pub price: f64,
    /// Commission paid for this fill.
    pub fee: f64,
    /// Execution time in milliseconds since Unix epoch.
    pub timestamp: TimeMs,
    /// Whether the fill was the maker side.
    pub is_maker: bool,
}

impl Fill {
    /// Signed quantity: +quantity for Buy, -quantity for Sell.
    pub fn directed_qty(&self) -> f64 {
        self.side.sign() * self.quantity
    }

    /// Notional value of the fill (quantity * price).
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(side: Side, quantity: f64, price: f64) -> Fill {
        Fill {
            id: "1".to_string(),
            symbol: Symbol::new("BTCUSDT"),
            order_id: "10".to_string(),
            side,
            quantity,
            price,
            fee: 0.0,
            timestamp: TimeMs::new(1000),
            is_maker: false,
        }
    }

    #[test]
    fn test_directed_qty() {
        assert_eq!(fill(Side::Buy, 2.0, 100.0).directed_qty(), 2.0);
        assert_eq!(fill(Side::Sell, 2.0, 100.0).directed_qty(), -2.0);
    }

    #[test]
    fn test_notional() {
        assert_eq!(fill(Side::Buy, 2.0, 100.0).notional(), 200.0);
    }

    #[test]
    fn test_fill_serialization_round_trip() {
        let f = fill(Side::Sell, 1.5, 42000.0);
        let json = serde_json::to_string(&f).unwrap();
        let back: Fill = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }

    #[test]
    fn test_fill_wire_field_names() {
        let json = serde_json::to_value(fill(Side::Buy, 1.0, 100.0)).unwrap();
        assert!(json.get("orderId").is_some());
        assert!(json.get("isMaker").is_some());
    }
}
