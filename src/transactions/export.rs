//! Bulk export of selected rows
//!
//! Output is `date,type,amount,address,status,hash` per line, joined with
//! `\n`, no header. Fields are written as-is: a comma inside an address
//! would shift columns. Existing consumers expect this exact format, so
//! it is kept.

use chrono::{NaiveDate, SecondsFormat};

use super::{SelectionSet, Transaction};

/// One CSV line per selected transaction, in ledger order
pub fn export_csv(transactions: &[Transaction], selection: &SelectionSet) -> String {
    transactions
        .iter()
        .filter(|tx| selection.contains(&tx.id))
        .map(csv_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn csv_line(tx: &Transaction) -> String {
    format!(
        "{},{},{},{},{},{}",
        tx.date.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        tx.kind.as_str(),
        tx.amount_string(),
        tx.address,
        tx.status.as_str(),
        tx.hash
    )
}

/// Download name for an export made on `day`
pub fn export_file_name(day: NaiveDate) -> String {
    format!("transactions_{}.csv", day.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::{TransactionStatus, TransactionType};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn row() -> Transaction {
        Transaction {
            id: "tx_1".to_string(),
            date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            kind: TransactionType::Sent,
            amount: Decimal::from_str_exact("10.50").unwrap(),
            address: "0xabc".to_string(),
            status: TransactionStatus::Confirmed,
            hash: "0xdef".to_string(),
            memo: Some("ignored, not exported".to_string()),
            frequency: None,
            next_payment: None,
            network_fee: None,
            block_number: None,
        }
    }

    #[test]
    fn test_single_row() {
        let selection: SelectionSet = ["tx_1"].into_iter().collect();
        assert_eq!(
            export_csv(&[row()], &selection),
            "2025-01-01T00:00:00Z,sent,10.5,0xabc,confirmed,0xdef"
        );
    }

    #[test]
    fn test_only_selected_rows_in_ledger_order() {
        let mut second = row();
        second.id = "tx_2".to_string();
        second.kind = TransactionType::Received;
        second.amount = Decimal::new(750, 0);
        let mut third = row();
        third.id = "tx_3".to_string();

        let selection: SelectionSet = ["tx_2", "tx_1"].into_iter().collect();
        let csv = export_csv(&[row(), second, third], &selection);

        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(",sent,10.5,"));
        assert!(lines[1].contains(",received,750,"));
    }

    #[test]
    fn test_commas_are_not_escaped() {
        let mut odd = row();
        odd.address = "0xa,bc".to_string();
        let selection: SelectionSet = ["tx_1"].into_iter().collect();

        let csv = export_csv(&[odd], &selection);
        assert_eq!(csv.split(',').count(), 7);
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(export_csv(&[row()], &SelectionSet::new()), "");
    }

    #[test]
    fn test_file_name() {
        let day = NaiveDate::from_ymd_opt(2025, 10, 18).unwrap();
        assert_eq!(export_file_name(day), "transactions_2025-10-18.csv");
    }
}
