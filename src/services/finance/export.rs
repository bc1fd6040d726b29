//! 财务流水导出为 xlsx

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::FixedOffset;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::{error, info};

use super::FinanceService;
use super::summary::{load_range, resolve_range, summarize};
use crate::models::finance::{FinanceRangeQuery, FinanceSummary, PaymentTransaction};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{request_settings, storage_error, tenant_scope};
use crate::{try_respond, try_validate};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub async fn export_transactions(
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
    let transactions = match load_range(storage.as_ref(), &scope, &range, query.branch_id).await {
        Ok(transactions) => transactions,
        Err(e) => return Ok(storage_error("Failed to export transactions", e)),
    };
    let summary = summarize(&transactions, &range, offset, &settings.currency);

    match build_workbook(&transactions, &summary, offset) {
        Ok(buffer) => {
            let filename = format!("finance_{}_{}.xlsx", summary.from, summary.to);
            info!(
                "Exported {} transaction(s) of company {}",
                transactions.len(),
                scope.company_id
            );
            Ok(HttpResponse::Ok()
                .content_type(XLSX_CONTENT_TYPE)
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{filename}\""),
                ))
                .body(buffer))
        }
        Err(e) => {
            error!("Failed to build finance workbook: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ExportFailed,
                    "Failed to generate export file",
                )),
            )
        }
    }
}

/// 生成包含流水明细与汇总两个工作表的 xlsx
pub fn build_workbook(
    transactions: &[PaymentTransaction],
    summary: &FinanceSummary,
    offset: FixedOffset,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let title = Format::new().set_bold().set_font_size(14);
    let money = Format::new().set_num_format("#,##0.00");

    let sheet = workbook.add_worksheet().set_name("Transactions")?;
    write_transactions(sheet, &header, &money, transactions, offset)?;

    let sheet = workbook.add_worksheet().set_name("Summary")?;
    write_summary(sheet, &header, &title, &money, summary)?;

    workbook.save_to_buffer()
}

fn write_transactions(
    sheet: &mut Worksheet,
    header: &Format,
    money: &Format,
    transactions: &[PaymentTransaction],
    offset: FixedOffset,
) -> Result<(), XlsxError> {
    let columns = [
        "ID",
        "Date",
        "Kind",
        "Method",
        "Amount",
        "Category",
        "Description",
        "Student ID",
        "Subscription ID",
    ];
    for (col, name) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, header)?;
    }

    for (index, tx) in transactions.iter().enumerate() {
        let row = index as u32 + 1;
        let local = tx.occurred_at.with_timezone(&offset);
        sheet.write_number(row, 0, tx.id as f64)?;
        sheet.write_string(row, 1, local.format("%Y-%m-%d %H:%M").to_string())?;
        sheet.write_string(row, 2, tx.kind.as_str())?;
        sheet.write_string(row, 3, tx.method.as_str())?;
        sheet.write_number_with_format(row, 4, tx.amount, money)?;
        sheet.write_string(row, 5, tx.category.as_deref().unwrap_or_default())?;
        sheet.write_string(row, 6, tx.description.as_deref().unwrap_or_default())?;
        if let Some(student_id) = tx.student_id {
            sheet.write_number(row, 7, student_id as f64)?;
        }
        if let Some(subscription_id) = tx.subscription_id {
            sheet.write_number(row, 8, subscription_id as f64)?;
        }
    }

    sheet.set_column_width(1, 18)?;
    sheet.set_column_width(6, 36)?;
    Ok(())
}

fn write_summary(
    sheet: &mut Worksheet,
    header: &Format,
    title: &Format,
    money: &Format,
    summary: &FinanceSummary,
) -> Result<(), XlsxError> {
    sheet.write_string_with_format(0, 0, "Finance summary", title)?;
    sheet.write_string(1, 0, format!("{} to {}", summary.from, summary.to))?;
    sheet.write_string(1, 1, summary.currency.as_str())?;

    let totals = [
        ("Income", summary.total_income),
        ("Expense", summary.total_expense),
        ("Refund", summary.total_refund),
        ("Net", summary.net),
    ];
    for (i, (label, value)) in totals.iter().enumerate() {
        let row = 3 + i as u32;
        sheet.write_string_with_format(row, 0, *label, header)?;
        sheet.write_number_with_format(row, 1, *value, money)?;
    }
    sheet.write_string_with_format(7, 0, "Transactions", header)?;
    sheet.write_number(7, 1, summary.transaction_count as f64)?;

    // 按支付方式
    let mut row = 9u32;
    for (col, name) in ["Method", "Income", "Expense", "Refund"].iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *name, header)?;
    }
    for method in &summary.by_method {
        row += 1;
        sheet.write_string(row, 0, method.method.as_str())?;
        sheet.write_number_with_format(row, 1, method.income, money)?;
        sheet.write_number_with_format(row, 2, method.expense, money)?;
        sheet.write_number_with_format(row, 3, method.refund, money)?;
    }

    // 每日
    row += 2;
    for (col, name) in ["Date", "Income", "Expense", "Refund", "Net"].iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *name, header)?;
    }
    for day in &summary.daily {
        row += 1;
        sheet.write_string(row, 0, day.date.as_str())?;
        sheet.write_number_with_format(row, 1, day.income, money)?;
        sheet.write_number_with_format(row, 2, day.expense, money)?;
        sheet.write_number_with_format(row, 3, day.refund, money)?;
        sheet.write_number_with_format(row, 4, day.net, money)?;
    }

    sheet.set_column_width(0, 16)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finance::{PaymentMethod, TransactionKind};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_workbook_is_xlsx() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let range = resolve_range(Some("2025-03-01"), None, today, offset).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap();
        let transactions = vec![PaymentTransaction {
            id: 1,
            company_id: 1,
            branch_id: None,
            student_id: Some(3),
            subscription_id: None,
            amount: 120.0,
            kind: TransactionKind::Income,
            method: PaymentMethod::Card,
            category: Some("subscription".into()),
            description: None,
            occurred_at: at,
            created_by: None,
            created_at: at,
        }];
        let summary = summarize(&transactions, &range, offset, "USD");

        let buffer = build_workbook(&transactions, &summary, offset).unwrap();
        // xlsx 是 zip 包
        assert_eq!(&buffer[..2], b"PK");
    }
}
