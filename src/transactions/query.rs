//! Filter, sort and paginate
//!
//! Three composable stages, each a pure function:
//! `filter` -> `sort` -> `paginate`. `query` runs the whole pipeline for
//! callers that want a ready-made view.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Transaction, TransactionStatus, TransactionType};

/// Page size used by the transaction table
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Filter fields exactly as the filter form submits them
///
/// Every field is read as text and every field may be blank. Numbers are
/// taken as their decimal text; `null` and other shapes read as blank.
/// `"all"` is the form's "no restriction" value for type and status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRequest {
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date_from: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date_to: String,
    #[serde(deserialize_with = "lenient_text")]
    pub amount_min: String,
    #[serde(deserialize_with = "lenient_text")]
    pub amount_max: String,
    #[serde(deserialize_with = "lenient_text")]
    pub search: String,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => {
            tracing::debug!(value = %other, "Ignoring non-text filter value");
            String::new()
        }
    })
}

/// Page numbers as clients send them: numbers, numeric strings or null
///
/// Null and unreadable values mean the first page. Zero and negative
/// numbers are kept so they can select an empty page.
fn lenient_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let page = match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|n| n as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(page.unwrap_or_else(default_page))
}

fn lenient_page_size<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let size = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(size.filter(|size| *size > 0))
}

/// 1-based page index; anything below 1 maps to 0, which is always empty
pub fn page_index(page: i64) -> usize {
    usize::try_from(page).unwrap_or(0)
}

/// Typed filter predicates. `None` means the predicate is inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub kind: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    /// Inclusive lower bound
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub date_to: Option<DateTime<Utc>>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    /// Case-insensitive substring; empty disables the predicate
    pub search: String,
}

impl FilterCriteria {
    /// Convert raw form input, dropping any field that does not parse
    pub fn from_request(request: &FilterRequest) -> Self {
        Self {
            kind: parse_choice(&request.kind, "type", TransactionType::parse),
            status: parse_choice(&request.status, "status", TransactionStatus::parse),
            date_from: parse_bound(&request.date_from, "dateFrom", parse_instant),
            date_to: parse_bound(&request.date_to, "dateTo", parse_instant),
            amount_min: parse_bound(&request.amount_min, "amountMin", parse_amount),
            amount_max: parse_bound(&request.amount_max, "amountMax", parse_amount),
            search: request.search.clone(),
        }
    }

    /// Does `tx` satisfy every active predicate?
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.kind.is_some_and(|kind| tx.kind != kind) {
            return false;
        }
        if self.status.is_some_and(|status| tx.status != status) {
            return false;
        }
        if self.date_from.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| tx.date > to) {
            return false;
        }
        if self.amount_min.is_some_and(|min| tx.amount < min) {
            return false;
        }
        if self.amount_max.is_some_and(|max| tx.amount > max) {
            return false;
        }
        if !self.search.is_empty() && !matches_search(tx, &self.search.to_lowercase()) {
            return false;
        }
        true
    }
}

fn matches_search(tx: &Transaction, needle: &str) -> bool {
    tx.address.to_lowercase().contains(needle)
        || tx.hash.to_lowercase().contains(needle)
        || tx
            .memo
            .as_ref()
            .is_some_and(|memo| memo.to_lowercase().contains(needle))
        || tx.amount_string().contains(needle)
}

fn parse_choice<T>(raw: &str, field: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return None;
    }
    let parsed = parse(raw);
    if parsed.is_none() {
        tracing::debug!(field, value = raw, "Ignoring unknown filter value");
    }
    parsed
}

fn parse_bound<T>(raw: &str, field: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = parse(raw);
    if parsed.is_none() {
        tracing::debug!(field, value = raw, "Ignoring malformed filter bound");
    }
    parsed
}

/// Accepts an RFC 3339 instant, a `YYYY-MM-DDTHH:MM[:SS]` local-less
/// timestamp (taken as UTC), or a bare `YYYY-MM-DD` (midnight UTC)
pub(crate) fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Column the table is sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Amount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// One active sort key; defaults to newest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Column-header click: ascending, unless `key` is already ascending
    pub fn toggled(self, key: SortKey) -> Self {
        if self.key == key && self.direction == SortDirection::Asc {
            Self::new(key, SortDirection::Desc)
        } else {
            Self::new(key, SortDirection::Asc)
        }
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let ordering = match self.key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Amount => a.amount.cmp(&b.amount),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Keep only transactions matching every active predicate
pub fn filter(transactions: &[Transaction], criteria: &FilterCriteria) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| criteria.matches(tx))
        .cloned()
        .collect()
}

/// Stable sort; equal keys keep their input order in either direction
pub fn sort(mut transactions: Vec<Transaction>, spec: SortSpec) -> Vec<Transaction> {
    transactions.sort_by(|a, b| spec.compare(a, b));
    transactions
}

/// One page of a sorted list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Transaction>,
    pub total_pages: usize,
}

/// Slice out 1-based `page`. Pages outside `1..=total_pages` are empty.
pub fn paginate(sorted: &[Transaction], page: usize, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let total_pages = sorted.len().div_ceil(page_size).max(1);

    let items = match page.checked_sub(1).and_then(|p| p.checked_mul(page_size)) {
        Some(start) if start < sorted.len() => {
            let end = (start + page_size).min(sorted.len());
            sorted[start..end].to_vec()
        }
        _ => Vec::new(),
    };

    Page { items, total_pages }
}

/// Everything a transaction list view submits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub filters: FilterRequest,

    #[serde(default)]
    pub sort: SortSpec,

    #[serde(default = "default_page", deserialize_with = "lenient_page")]
    pub page: i64,

    #[serde(default, deserialize_with = "lenient_page_size")]
    pub page_size: Option<usize>,
}

fn default_page() -> i64 {
    1
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            filters: FilterRequest::default(),
            sort: SortSpec::default(),
            page: default_page(),
            page_size: None,
        }
    }
}

/// Page change for a server-side session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page", deserialize_with = "lenient_page")]
    pub page: i64,
}

/// Derived view handed to the table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub transactions: Vec<Transaction>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

impl TransactionView {
    /// Ids on the current page, in display order
    pub fn ids(&self) -> Vec<String> {
        self.transactions.iter().map(|tx| tx.id.clone()).collect()
    }
}

/// filter -> sort -> paginate
pub fn query(
    transactions: &[Transaction],
    criteria: &FilterCriteria,
    sort_spec: SortSpec,
    page: usize,
    page_size: usize,
) -> TransactionView {
    let sorted = sort(filter(transactions, criteria), sort_spec);
    let page_size = page_size.max(1);
    let Page { items, total_pages } = paginate(&sorted, page, page_size);

    TransactionView {
        transactions: items,
        page,
        page_size,
        total_pages,
        total_count: sorted.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::fixtures::tx;
    use chrono::TimeZone;

    fn sample() -> Vec<Transaction> {
        let mut a = tx("1", TransactionType::Sent, "100", 1);
        a.memo = Some("Office Rent".to_string());
        let mut b = tx("2", TransactionType::Received, "50", 2);
        b.status = TransactionStatus::Pending;
        let c = tx("3", TransactionType::Recurring, "1250.50", 3);
        let d = tx("4", TransactionType::Sent, "50", 4);
        vec![a, b, c, d]
    }

    fn ids(list: &[Transaction]) -> Vec<&str> {
        list.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_filter_by_type() {
        let list = vec![
            tx("1", TransactionType::Sent, "100", 1),
            {
                let mut t = tx("2", TransactionType::Received, "50", 2);
                t.status = TransactionStatus::Pending;
                t
            },
        ];
        let criteria = FilterCriteria {
            kind: Some(TransactionType::Sent),
            ..Default::default()
        };

        let filtered = filter(&list, &criteria);
        assert_eq!(filtered, vec![list[0].clone()]);
    }

    #[test]
    fn test_empty_criteria_keeps_everything() {
        let list = sample();
        let filtered = filter(&list, &FilterCriteria::default());
        assert_eq!(filtered, list);
    }

    #[test]
    fn test_filtered_records_satisfy_every_predicate() {
        let list = sample();
        let criteria = FilterCriteria {
            kind: Some(TransactionType::Sent),
            amount_min: Some(Decimal::new(50, 0)),
            amount_max: Some(Decimal::new(100, 0)),
            date_from: Some(Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };

        let filtered = filter(&list, &criteria);
        assert_eq!(ids(&filtered), vec!["1", "4"]);
        for t in &filtered {
            assert!(list.contains(t));
            assert!(criteria.matches(t));
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let list = sample();
        let criteria = FilterCriteria {
            date_from: Some(list[1].date),
            date_to: Some(list[2].date),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&list, &criteria)), vec!["2", "3"]);

        let criteria = FilterCriteria {
            amount_min: Some(Decimal::from_str_exact("1250.5").unwrap()),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&list, &criteria)), vec!["3"]);
    }

    #[test]
    fn test_search_fields() {
        let list = sample();
        let by = |needle: &str| {
            let criteria = FilterCriteria {
                search: needle.to_string(),
                ..Default::default()
            };
            ids(&filter(&list, &criteria)).into_iter().map(String::from).collect::<Vec<_>>()
        };

        assert_eq!(by("RENT"), vec!["1"]);
        assert_eq!(by("0XHASH3"), vec!["3"]);
        assert_eq!(by("0xaddr2"), vec!["2"]);
        assert_eq!(by("1250.5"), vec!["3"]);
        assert!(by("1250.50").is_empty());
        assert_eq!(by("").len(), 4);
    }

    #[test]
    fn test_from_request_ignores_malformed_fields() {
        let request = FilterRequest {
            kind: "all".into(),
            status: "pending".into(),
            date_from: "yesterday".into(),
            date_to: "2025-10-02".into(),
            amount_min: "abc".into(),
            amount_max: " 75.5 ".into(),
            search: String::new(),
        };

        let criteria = FilterCriteria::from_request(&request);
        assert_eq!(criteria.kind, None);
        assert_eq!(criteria.status, Some(TransactionStatus::Pending));
        assert_eq!(criteria.date_from, None);
        assert_eq!(
            criteria.date_to,
            Some(Utc.with_ymd_and_hms(2025, 10, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(criteria.amount_min, None);
        assert_eq!(criteria.amount_max, Some(Decimal::from_str_exact("75.5").unwrap()));

        assert_eq!(filter(&sample(), &criteria), Vec::<Transaction>::new());
    }

    #[test]
    fn test_default_request_is_empty_criteria() {
        assert_eq!(FilterCriteria::from_request(&FilterRequest::default()), FilterCriteria::default());
    }

    #[test]
    fn test_parse_instant_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_instant("2025-01-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_instant("2025-01-01T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_instant("2025-01-01T00:00"), Some(expected));
        assert_eq!(parse_instant("2025-01-01"), Some(expected));
        assert_eq!(parse_instant("01/01/2025"), None);
    }

    #[test]
    fn test_sort_by_amount_is_stable_both_ways() {
        let list = sample();

        let asc = sort(list.clone(), SortSpec::new(SortKey::Amount, SortDirection::Asc));
        assert_eq!(ids(&asc), vec!["2", "4", "1", "3"]);

        let desc = sort(list, SortSpec::new(SortKey::Amount, SortDirection::Desc));
        assert_eq!(ids(&desc), vec!["3", "1", "2", "4"]);
    }

    #[test]
    fn test_sort_by_date() {
        let list = sample();
        let desc = sort(list.clone(), SortSpec::default());
        assert_eq!(ids(&desc), vec!["4", "3", "2", "1"]);

        let asc = sort(list, SortSpec::new(SortKey::Date, SortDirection::Asc));
        assert_eq!(ids(&asc), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_sort_toggle() {
        let spec = SortSpec::default();
        assert_eq!(spec.toggled(SortKey::Date), SortSpec::new(SortKey::Date, SortDirection::Asc));
        assert_eq!(
            spec.toggled(SortKey::Date).toggled(SortKey::Date),
            SortSpec::new(SortKey::Date, SortDirection::Desc)
        );
        assert_eq!(
            spec.toggled(SortKey::Amount),
            SortSpec::new(SortKey::Amount, SortDirection::Asc)
        );
    }

    #[test]
    fn test_pages_reconstruct_the_list() {
        let list: Vec<Transaction> = (1..=23)
            .map(|i| tx(&i.to_string(), TransactionType::Sent, "1", (i % 28) + 1))
            .collect();

        let first = paginate(&list, 1, 10);
        assert_eq!(first.total_pages, 3);

        let mut rebuilt = Vec::new();
        for page in 1..=first.total_pages {
            rebuilt.extend(paginate(&list, page, 10).items);
        }
        assert_eq!(rebuilt, list);
        assert_eq!(paginate(&list, 3, 10).items.len(), 3);
    }

    #[test]
    fn test_empty_list_has_one_empty_page() {
        let page = paginate(&[], 1, 10);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_out_of_range_pages_are_empty() {
        let list = sample();
        assert!(paginate(&list, 0, 2).items.is_empty());
        assert!(paginate(&list, 3, 2).items.is_empty());
        assert!(paginate(&list, usize::MAX, 2).items.is_empty());
        assert_eq!(paginate(&list, 1, 0).items.len(), 1);
    }

    #[test]
    fn test_query_pipeline() {
        let list = sample();
        let criteria = FilterCriteria {
            kind: Some(TransactionType::Sent),
            ..Default::default()
        };

        let view = query(&list, &criteria, SortSpec::default(), 1, 1);
        assert_eq!(view.total_count, 2);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.ids(), vec!["4".to_string()]);

        let view = query(&list, &criteria, SortSpec::default(), 2, 1);
        assert_eq!(view.ids(), vec!["1".to_string()]);
    }

    #[test]
    fn test_query_request_defaults() {
        let request: QueryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.sort, SortSpec::default());
        assert!(request.page_size.is_none());

        let request: QueryRequest = serde_json::from_str(
            r#"{"filters": {"type": "sent", "amountMin": "10"}, "sort": {"key": "amount", "direction": "asc"}, "page": 2, "pageSize": 5}"#,
        )
        .unwrap();
        assert_eq!(request.filters.kind, "sent");
        assert_eq!(request.filters.amount_min, "10");
        assert_eq!(request.sort.key, SortKey::Amount);
        assert_eq!(request.page_size, Some(5));
    }

    #[test]
    fn test_filter_request_reads_numbers_and_nulls() {
        let request: FilterRequest = serde_json::from_str(
            r#"{"amountMin": 10, "amountMax": 99.5, "status": null, "search": true, "type": "sent"}"#,
        )
        .unwrap();
        assert_eq!(request.amount_min, "10");
        assert_eq!(request.amount_max, "99.5");
        assert_eq!(request.status, "");
        assert_eq!(request.search, "");

        let criteria = FilterCriteria::from_request(&request);
        assert_eq!(criteria.amount_min, Some(Decimal::from(10)));
        assert_eq!(criteria.amount_max, Decimal::from_str("99.5").ok());
        assert!(criteria.status.is_none());
        assert_eq!(criteria.kind, Some(TransactionType::Sent));
    }

    #[test]
    fn test_query_request_lenient_paging() {
        let read = |json: &str| serde_json::from_str::<QueryRequest>(json).unwrap();

        assert_eq!(read(r#"{"page": -1}"#).page, -1);
        assert_eq!(read(r#"{"page": "3"}"#).page, 3);
        assert_eq!(read(r#"{"page": null}"#).page, 1);
        assert_eq!(read(r#"{"page": "next"}"#).page, 1);
        assert_eq!(read(r#"{"page": 2.7}"#).page, 2);

        assert_eq!(read(r#"{"pageSize": "5"}"#).page_size, Some(5));
        assert_eq!(read(r#"{"pageSize": 0}"#).page_size, None);
        assert_eq!(read(r#"{"pageSize": -4}"#).page_size, None);
        assert_eq!(read(r#"{"pageSize": null}"#).page_size, None);

        let page: PageRequest = serde_json::from_str(r#"{"page": "-2"}"#).unwrap();
        assert_eq!(page.page, -2);
    }

    #[test]
    fn test_non_positive_page_is_empty() {
        let list = sample();
        assert_eq!(page_index(-1), 0);
        assert_eq!(page_index(0), 0);
        assert_eq!(page_index(4), 4);

        let view = query(&list, &FilterCriteria::default(), SortSpec::default(), page_index(-1), 10);
        assert!(view.transactions.is_empty());
        assert_eq!(view.total_count, 4);
        assert_eq!(view.total_pages, 1);
    }
}
