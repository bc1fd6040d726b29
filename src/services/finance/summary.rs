//! 财务汇总
//!
//! 日期按机构本地时区解释，区间包含首尾两天。每日序列对没有流水的日期补零。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveTime};
use std::collections::BTreeMap;

use super::FinanceService;
use crate::models::finance::{
    DailyTotal, FinanceRangeQuery, FinanceSummary, MethodTotal, PaymentMethod,
    PaymentTransaction, TransactionFilter, TransactionKind,
};
use crate::models::{ApiResponse, ErrorCode, TenantScope};
use crate::services::common::{request_settings, storage_error, tenant_scope};
use crate::storage::Storage;
use crate::utils::local_time::local_to_utc;
use crate::utils::validate::parse_date;
use crate::{try_respond, try_validate};

pub const MAX_RANGE_DAYS: i64 = 366;

/// 机构本地的日期区间及对应的 UTC 时间戳 `[from_ts, to_ts)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub from_ts: i64,
    pub to_ts: i64,
}

pub(crate) fn day_start_ts(offset: FixedOffset, date: NaiveDate) -> Result<i64, String> {
    local_to_utc(offset, date, NaiveTime::MIN)
        .map(|dt| dt.timestamp())
        .ok_or_else(|| format!("Date {date} is out of range"))
}

/// 解析查询区间，默认从本月一日到今天
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
    offset: FixedOffset,
) -> Result<DateRange, String> {
    let parse = |field: &str, value: Option<&str>| -> Result<Option<NaiveDate>, String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => parse_date(field, v).map(Some),
            None => Ok(None),
        }
    };
    let to = parse("to", to)?.unwrap_or(today);
    let from = parse("from", from)?.unwrap_or_else(|| to.with_day(1).unwrap_or(to));

    if to < from {
        return Err("to must not be before from".to_string());
    }
    if (to - from).num_days() + 1 > MAX_RANGE_DAYS {
        return Err(format!("Range must not exceed {MAX_RANGE_DAYS} days"));
    }

    Ok(DateRange {
        from,
        to,
        from_ts: day_start_ts(offset, from)?,
        to_ts: day_start_ts(offset, to + Duration::days(1))?,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Default, Clone, Copy)]
struct Totals {
    income: f64,
    expense: f64,
    refund: f64,
}

impl Totals {
    fn add(&mut self, kind: TransactionKind, amount: f64) {
        match kind {
            TransactionKind::Income => self.income += amount,
            TransactionKind::Expense => self.expense += amount,
            TransactionKind::Refund => self.refund += amount,
        }
    }

    fn net(&self) -> f64 {
        self.income - self.expense - self.refund
    }
}

/// 汇总流水；`net = income - expense - refund`
pub fn summarize(
    transactions: &[PaymentTransaction],
    range: &DateRange,
    offset: FixedOffset,
    currency: &str,
) -> FinanceSummary {
    let mut total = Totals::default();
    let mut by_method: BTreeMap<usize, Totals> = BTreeMap::new();
    let mut daily: BTreeMap<NaiveDate, Totals> = BTreeMap::new();

    let mut day = range.from;
    while day <= range.to {
        daily.insert(day, Totals::default());
        day += Duration::days(1);
    }

    for tx in transactions {
        total.add(tx.kind, tx.amount);
        let method_index = PaymentMethod::ALL
            .iter()
            .position(|m| *m == tx.method)
            .unwrap_or_default();
        by_method.entry(method_index).or_default().add(tx.kind, tx.amount);

        let local_day = tx.occurred_at.with_timezone(&offset).date_naive();
        if let Some(totals) = daily.get_mut(&local_day) {
            totals.add(tx.kind, tx.amount);
        }
    }

    FinanceSummary {
        from: range.from.format("%Y-%m-%d").to_string(),
        to: range.to.format("%Y-%m-%d").to_string(),
        currency: currency.to_string(),
        total_income: round2(total.income),
        total_expense: round2(total.expense),
        total_refund: round2(total.refund),
        net: round2(total.net()),
        transaction_count: transactions.len() as i64,
        by_method: by_method
            .into_iter()
            .map(|(index, totals)| MethodTotal {
                method: PaymentMethod::ALL[index],
                income: round2(totals.income),
                expense: round2(totals.expense),
                refund: round2(totals.refund),
            })
            .collect(),
        daily: daily
            .into_iter()
            .map(|(date, totals)| DailyTotal {
                date: date.format("%Y-%m-%d").to_string(),
                income: round2(totals.income),
                expense: round2(totals.expense),
                refund: round2(totals.refund),
                net: round2(totals.net()),
            })
            .collect(),
    }
}

/// 按区间读取全部流水，汇总与导出共用
pub(crate) async fn load_range(
    storage: &dyn Storage,
    scope: &TenantScope,
    range: &DateRange,
    branch_id: Option<i64>,
) -> crate::errors::Result<Vec<PaymentTransaction>> {
    let filter = TransactionFilter {
        from_ts: Some(range.from_ts),
        to_ts: Some(range.to_ts),
        branch_id,
        ..Default::default()
    };
    storage.list_all_transactions(scope, filter).await
}

pub async fn get_summary(
    service: &FinanceService,
    query: FinanceRangeQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);
    let offset = settings.offset();

    let range = try_validate!(
        resolve_range(
            query.from.as_deref(),
            query.to.as_deref(),
            settings.today(),
            offset
        ),
        ErrorCode::ValidationFailed
    );

    match load_range(storage.as_ref(), &scope, &range, query.branch_id).await {
        Ok(transactions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            summarize(&transactions, &range, offset, &settings.currency),
            "Finance summary retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to build finance summary", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn tx(
        kind: TransactionKind,
        method: PaymentMethod,
        amount: f64,
        at: chrono::DateTime<Utc>,
    ) -> PaymentTransaction {
        PaymentTransaction {
            id: 0,
            company_id: 1,
            branch_id: None,
            student_id: None,
            subscription_id: None,
            amount,
            kind,
            method,
            category: None,
            description: None,
            occurred_at: at,
            created_by: None,
            created_at: at,
        }
    }

    #[test]
    fn test_default_range_is_month_to_date() {
        let range = resolve_range(None, None, date("2025-03-10"), utc()).unwrap();
        assert_eq!(range.from, date("2025-03-01"));
        assert_eq!(range.to, date("2025-03-10"));
        assert_eq!(range.to_ts - range.from_ts, 10 * 86_400);
    }

    #[test]
    fn test_range_validation() {
        let today = date("2025-03-10");
        assert!(resolve_range(Some("2025-03-05"), Some("2025-03-01"), today, utc()).is_err());
        assert!(resolve_range(Some("2024-01-01"), Some("2025-03-01"), today, utc()).is_err());
        assert!(resolve_range(Some("03/01/2025"), None, today, utc()).is_err());
        assert!(resolve_range(Some("2024-03-10"), Some("2025-03-10"), today, utc()).is_ok());
    }

    #[test]
    fn test_range_uses_local_midnight() {
        let plus3 = FixedOffset::east_opt(3 * 3600).unwrap();
        let range =
            resolve_range(Some("2025-03-01"), Some("2025-03-01"), date("2025-03-10"), plus3)
                .unwrap();
        assert_eq!(
            range.from_ts,
            Utc.with_ymd_and_hms(2025, 2, 28, 21, 0, 0).unwrap().timestamp()
        );
    }

    #[test]
    fn test_summary_totals_and_daily_series() {
        let range =
            resolve_range(Some("2025-03-01"), Some("2025-03-03"), date("2025-03-10"), utc())
                .unwrap();
        let day = |d: u32, h: u32| Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap();
        let transactions = vec![
            tx(TransactionKind::Income, PaymentMethod::Cash, 100.0, day(1, 10)),
            tx(TransactionKind::Income, PaymentMethod::Card, 50.5, day(3, 9)),
            tx(TransactionKind::Expense, PaymentMethod::Cash, 30.0, day(3, 12)),
            tx(TransactionKind::Refund, PaymentMethod::Card, 20.0, day(3, 15)),
        ];

        let summary = summarize(&transactions, &range, utc(), "USD");
        assert_eq!(summary.total_income, 150.5);
        assert_eq!(summary.total_expense, 30.0);
        assert_eq!(summary.total_refund, 20.0);
        assert_eq!(summary.net, 100.5);
        assert_eq!(summary.transaction_count, 4);

        assert_eq!(summary.daily.len(), 3);
        assert_eq!(summary.daily[1].date, "2025-03-02");
        assert_eq!(summary.daily[1].net, 0.0);
        assert_eq!(summary.daily[2].net, 0.5);

        let methods: Vec<_> = summary.by_method.iter().map(|m| m.method).collect();
        assert_eq!(methods, vec![PaymentMethod::Cash, PaymentMethod::Card]);
        assert_eq!(summary.by_method[1].refund, 20.0);
    }

    #[test]
    fn test_empty_range() {
        let range =
            resolve_range(Some("2025-03-01"), Some("2025-03-01"), date("2025-03-10"), utc())
                .unwrap();
        let summary = summarize(&[], &range, utc(), "EUR");
        assert_eq!(summary.net, 0.0);
        assert!(summary.by_method.is_empty());
        assert_eq!(summary.daily.len(), 1);
        assert_eq!(summary.currency, "EUR");
    }
}
