//! Transaction history: the record type and the query engine over it
//!
//! The engine is pure. A view is derived from the full ledger by
//! filtering, sorting and paginating; nothing mutates a [`Transaction`]
//! once it has been handed to the engine. The only state lives in
//! [`SessionRegistry`], which remembers each open view's choices.

mod export;
mod mock;
mod query;
mod selection;
mod session;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use export::{export_csv, export_file_name};
pub use mock::demo_ledger;
pub use query::{
    page_index, query, FilterCriteria, FilterRequest, PageRequest, QueryRequest, SortDirection, SortKey,
    SortSpec, TransactionView, DEFAULT_PAGE_SIZE,
};
pub use selection::{update_selection, SelectionAction, SelectionSet};
pub use session::{QuerySession, SessionRegistry, SessionView};

/// Direction of a payment relative to the connected wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Sent,
    Received,
    Recurring,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sent => "sent",
            TransactionType::Received => "received",
            TransactionType::Recurring => "recurring",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sent" => Some(TransactionType::Sent),
            "received" => Some(TransactionType::Received),
            "recurring" => Some(TransactionType::Recurring),
            _ => None,
        }
    }
}

/// Settlement state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Pending,
    Processing,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "confirmed" => Some(TransactionStatus::Confirmed),
            "pending" => Some(TransactionStatus::Pending),
            "processing" => Some(TransactionStatus::Processing),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// A single payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    pub date: DateTime<Utc>,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// USDC amount, never negative
    pub amount: Decimal,

    /// Counterparty wallet address
    pub address: String,

    pub status: TransactionStatus,

    /// On-chain reference, display and copy only
    pub hash: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    /// Recurring payments only, e.g. "Monthly"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_payment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_fee: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl Transaction {
    /// Amount as the shortest decimal string (`750.00` -> `750`, `10.50` -> `10.5`)
    pub fn amount_string(&self) -> String {
        self.amount.normalize().to_string()
    }
}
