//! Account snapshot returned by the exchange; used for live display only,
//! never by reconstruction.

use serde::{Deserialize, Serialize};

/// Wallet and margin balances for the whole account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub total_wallet_balance: f64,
    pub total_unrealized_pnl: f64,
    pub total_margin_balance: f64,
    pub max_withdraw_amount: f64,
}
