//! Demo ledger served until a real data source is connected

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{Transaction, TransactionStatus, TransactionType};

struct Seed {
    id: &'static str,
    date: &'static str,
    kind: TransactionType,
    /// Cents
    amount: i64,
    address: &'static str,
    status: TransactionStatus,
    hash: &'static str,
    memo: &'static str,
    recurring: Option<(&'static str, &'static str)>,
    /// Ten-thousandths of a USDC
    network_fee: i64,
    block_number: u64,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "tx_001",
        date: "2025-10-18T14:30:00Z",
        kind: TransactionType::Sent,
        amount: 125050,
        address: "0x742d35Cc6634C0532925a3b8D4C2C4e1234567890",
        status: TransactionStatus::Confirmed,
        hash: "0x1a2b3c4d5e6f7890abcdef1234567890abcdef1234567890abcdef1234567890",
        memo: "Payment for freelance web development services - Project Alpha",
        recurring: None,
        network_fee: 21,
        block_number: 18542891,
    },
    Seed {
        id: "tx_002",
        date: "2025-10-18T12:15:00Z",
        kind: TransactionType::Received,
        amount: 75000,
        address: "0x8ba1f109551bD432803012645Hac189B3c9c3456",
        status: TransactionStatus::Confirmed,
        hash: "0x2b3c4d5e6f7890abcdef1234567890abcdef1234567890abcdef1234567890ab",
        memo: "Monthly salary payment",
        recurring: None,
        network_fee: 18,
        block_number: 18542856,
    },
    Seed {
        id: "tx_003",
        date: "2025-10-18T10:45:00Z",
        kind: TransactionType::Recurring,
        amount: 50000,
        address: "0x456789abcdef1234567890abcdef1234567890abcd",
        status: TransactionStatus::Pending,
        hash: "0x3c4d5e6f7890abcdef1234567890abcdef1234567890abcdef1234567890abcd",
        memo: "Monthly subscription payment to SaaS provider",
        recurring: Some(("Monthly", "2025-11-18")),
        network_fee: 19,
        block_number: 18542823,
    },
    Seed {
        id: "tx_004",
        date: "2025-10-17T16:20:00Z",
        kind: TransactionType::Sent,
        amount: 210075,
        address: "0x789abcdef1234567890abcdef1234567890abcdef12",
        status: TransactionStatus::Confirmed,
        hash: "0x4d5e6f7890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
        memo: "Equipment purchase for office setup",
        recurring: None,
        network_fee: 25,
        block_number: 18541992,
    },
    Seed {
        id: "tx_005",
        date: "2025-10-17T14:10:00Z",
        kind: TransactionType::Received,
        amount: 32525,
        address: "0xabcdef1234567890abcdef1234567890abcdef1234",
        status: TransactionStatus::Failed,
        hash: "0x5e6f7890abcdef1234567890abcdef1234567890abcdef1234567890abcdef12",
        memo: "Refund for cancelled service",
        recurring: None,
        network_fee: 15,
        block_number: 18541945,
    },
    Seed {
        id: "tx_006",
        date: "2025-10-16T11:30:00Z",
        kind: TransactionType::Recurring,
        amount: 15000,
        address: "0xdef1234567890abcdef1234567890abcdef1234567",
        status: TransactionStatus::Confirmed,
        hash: "0x6f7890abcdef1234567890abcdef1234567890abcdef1234567890abcdef1234",
        memo: "Weekly team lunch budget",
        recurring: Some(("Weekly", "2025-10-23")),
        network_fee: 12,
        block_number: 18540876,
    },
    Seed {
        id: "tx_007",
        date: "2025-10-15T09:45:00Z",
        kind: TransactionType::Sent,
        amount: 87500,
        address: "0x1234567890abcdef1234567890abcdef1234567890",
        status: TransactionStatus::Confirmed,
        hash: "0x7890abcdef1234567890abcdef1234567890abcdef1234567890abcdef123456",
        memo: "Marketing campaign payment",
        recurring: None,
        network_fee: 22,
        block_number: 18539654,
    },
    Seed {
        id: "tx_008",
        date: "2025-10-14T15:20:00Z",
        kind: TransactionType::Received,
        amount: 180050,
        address: "0x567890abcdef1234567890abcdef1234567890abcd",
        status: TransactionStatus::Processing,
        hash: "0x890abcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567",
        memo: "Client payment for consulting services",
        recurring: None,
        network_fee: 28,
        block_number: 18538432,
    },
];

/// The eight sample transactions shown on the dashboard
pub fn demo_ledger() -> Vec<Transaction> {
    SEEDS
        .iter()
        .filter_map(|seed| {
            let date = match DateTime::parse_from_rfc3339(seed.date) {
                Ok(date) => date.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(id = seed.id, "Skipping demo transaction with bad date: {}", e);
                    return None;
                }
            };
            Some(Transaction {
                id: seed.id.to_string(),
                date,
                kind: seed.kind,
                amount: Decimal::new(seed.amount, 2),
                address: seed.address.to_string(),
                status: seed.status,
                hash: seed.hash.to_string(),
                memo: Some(seed.memo.to_string()),
                frequency: seed.recurring.map(|(frequency, _)| frequency.to_string()),
                next_payment: seed.recurring.map(|(_, next)| next.to_string()),
                network_fee: Some(Decimal::new(seed.network_fee, 4)),
                block_number: Some(seed.block_number),
            })
        })
        .collect()
}
