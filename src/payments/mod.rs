//! Payment requests
//!
//! Validates what the send and schedule forms submit. Sends are checked
//! against the wallet balance; schedules also preview the first few
//! execution dates. Nothing is executed or stored here.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of upcoming payments shown next to the form
pub const PREVIEW_COUNT: u32 = 3;

/// Balance of the demo wallet, 2547.89 USDC
pub const DEMO_BALANCE: Decimal = Decimal::from_parts(254_789, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

/// Send form fields as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendRequest {
    pub recipient_address: String,
    pub amount: String,
    pub memo: String,
}

/// Schedule form fields as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleRequest {
    pub recipient_address: String,
    pub amount: String,
    pub memo: String,
    pub frequency: Frequency,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`, optional
    pub end_date: String,
}

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Wallet address is required")]
    AddressRequired,

    #[error("Invalid wallet address format")]
    InvalidAddress,

    #[error("Amount is required")]
    AmountRequired,

    #[error("Amount must be greater than 0")]
    AmountNotPositive,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Start date is required")]
    StartDateRequired,

    #[error("Start date cannot be in the past")]
    StartDateInPast,

    #[error("End date must be after start date")]
    EndDateNotAfterStart,

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl PaymentError {
    /// Form field the error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            PaymentError::AddressRequired | PaymentError::InvalidAddress => "recipientAddress",
            PaymentError::AmountRequired
            | PaymentError::AmountNotPositive
            | PaymentError::InsufficientBalance => "amount",
            PaymentError::StartDateRequired | PaymentError::StartDateInPast => "startDate",
            PaymentError::EndDateNotAfterStart => "endDate",
            PaymentError::InvalidDate(field) if field == "endDate" => "endDate",
            PaymentError::InvalidDate(_) => "startDate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingPayment {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// A validated one-off payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPlan {
    pub recipient_address: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub remaining_balance: Decimal,
}

/// A validated schedule with its preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePlan {
    pub recipient_address: String,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub upcoming: Vec<UpcomingPayment>,
}

/// `0x` followed by exactly 40 hex digits
pub fn is_wallet_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Check a one-off payment against the wallet balance
///
/// Sending the whole balance is allowed.
pub fn validate_send(
    request: &SendRequest,
    balance: Decimal,
) -> Result<SendPlan, Vec<PaymentError>> {
    let mut errors = Vec::new();
    let address = check_address(&request.recipient_address, &mut errors);
    let amount = check_amount(&request.amount, &mut errors);

    match amount {
        Some(amount) if amount > balance => {
            errors.push(PaymentError::InsufficientBalance);
            Err(errors)
        }
        Some(amount) if errors.is_empty() => Ok(SendPlan {
            recipient_address: address.to_string(),
            amount,
            memo: non_blank(&request.memo),
            remaining_balance: balance - amount,
        }),
        _ => Err(errors),
    }
}

fn check_address<'a>(raw: &'a str, errors: &mut Vec<PaymentError>) -> &'a str {
    let address = raw.trim();
    if address.is_empty() {
        errors.push(PaymentError::AddressRequired);
    } else if !is_wallet_address(address) {
        errors.push(PaymentError::InvalidAddress);
    }
    address
}

fn check_amount(raw: &str, errors: &mut Vec<PaymentError>) -> Option<Decimal> {
    match raw.trim() {
        "" => {
            errors.push(PaymentError::AmountRequired);
            None
        }
        raw => match raw.parse::<Decimal>() {
            Ok(amount) if amount > Decimal::ZERO => Some(amount),
            _ => {
                errors.push(PaymentError::AmountNotPositive);
                None
            }
        },
    }
}

fn non_blank(raw: &str) -> Option<String> {
    Some(raw.trim().to_string()).filter(|text| !text.is_empty())
}

/// Check every field, collecting all failures rather than stopping at the first
pub fn validate(request: &ScheduleRequest, today: NaiveDate) -> Result<SchedulePlan, Vec<PaymentError>> {
    let mut errors = Vec::new();
    let address = check_address(&request.recipient_address, &mut errors);
    let amount = check_amount(&request.amount, &mut errors);

    let start_date = match request.start_date.trim() {
        "" => {
            errors.push(PaymentError::StartDateRequired);
            None
        }
        raw => match parse_day(raw, "startDate") {
            Ok(day) if day < today => {
                errors.push(PaymentError::StartDateInPast);
                None
            }
            Ok(day) => Some(day),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };

    let end_date = match request.end_date.trim() {
        "" => None,
        raw => match parse_day(raw, "endDate") {
            Ok(day) => Some(day),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end <= start {
            errors.push(PaymentError::EndDateNotAfterStart);
        }
    }

    match (amount, start_date) {
        (Some(amount), Some(start_date)) if errors.is_empty() => {
            let upcoming = upcoming_payments(start_date, request.frequency, amount, PREVIEW_COUNT)
                .into_iter()
                .filter(|payment| end_date.map_or(true, |end| payment.date <= end))
                .collect();

            Ok(SchedulePlan {
                recipient_address: address.to_string(),
                amount,
                memo: non_blank(&request.memo),
                frequency: request.frequency,
                start_date,
                end_date,
                upcoming,
            })
        }
        _ => Err(errors),
    }
}

fn parse_day(raw: &str, field: &str) -> Result<NaiveDate, PaymentError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| PaymentError::InvalidDate(field.to_string()))
}

/// The first `count` execution dates starting at `start`
///
/// Monthly dates keep the start day where the month has it and fall back
/// to the month's last day otherwise (Jan 31 -> Feb 28).
pub fn upcoming_payments(
    start: NaiveDate,
    frequency: Frequency,
    amount: Decimal,
    count: u32,
) -> Vec<UpcomingPayment> {
    (0..count)
        .map_while(|i| {
            let date = match frequency {
                Frequency::Daily => start.checked_add_days(Days::new(u64::from(i))),
                Frequency::Weekly => start.checked_add_days(Days::new(u64::from(i) * 7)),
                Frequency::Monthly => start.checked_add_months(Months::new(i)),
            }?;
            Some(UpcomingPayment { date, amount })
        })
        .collect()
}
