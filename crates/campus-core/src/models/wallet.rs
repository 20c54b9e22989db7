use serde::{Deserialize, Serialize};

use super::Id;
use crate::utils::format_money;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub balance: f64,
    pub currency: Option<String>,
}

impl Wallet {
    pub fn balance_display(&self) -> String {
        format_money(self.balance, self.currency.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: Id,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TopUpRequest {
    pub amount: f64,
}
