use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Datelike, Duration, FixedOffset, Months, NaiveDate};

use super::DashboardService;
use crate::models::dashboard::DashboardWindow;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{request_settings, storage_error, tenant_scope};
use crate::try_respond;
use crate::utils::local_time::local_day_bounds;

const EXPIRING_WITHIN_DAYS: i64 = 7;
const LOW_BALANCE_THRESHOLD: i32 = 2;

/// 以机构本地日期计算今天与本月的时间窗口
fn build_window(today: NaiveDate, offset: FixedOffset) -> Option<DashboardWindow> {
    let (day_start, day_end) = local_day_bounds(offset, today)?;
    let first = today.with_day(1)?;
    let next_month = first.checked_add_months(Months::new(1))?;
    let (month_start, _) = local_day_bounds(offset, first)?;
    let (month_end, _) = local_day_bounds(offset, next_month)?;

    Some(DashboardWindow {
        day_start: day_start.timestamp(),
        day_end: day_end.timestamp(),
        month_start: month_start.timestamp(),
        month_end: month_end.timestamp(),
        today: today.format("%Y-%m-%d").to_string(),
        expiring_until: (today + Duration::days(EXPIRING_WITHIN_DAYS))
            .format("%Y-%m-%d")
            .to_string(),
        low_balance_threshold: LOW_BALANCE_THRESHOLD,
    })
}

pub async fn get_stats(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings = try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);

    let Some(window) = build_window(settings.today(), settings.offset()) else {
        return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            "Failed to compute the dashboard period",
        )));
    };

    match storage.dashboard_stats(&scope, &window).await {
        Ok(mut stats) => {
            stats.currency = settings.currency;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                stats,
                "Dashboard statistics retrieved successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to load dashboard statistics", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_in_local_time() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
        let window = build_window(today, offset).unwrap();

        // 2024-12-15 00:00 +03:00
        assert_eq!(window.day_start, 1_734_210_000);
        assert_eq!(window.day_end - window.day_start, 86_400);
        // 2024-12-01 00:00 +03:00 至 2025-01-01 00:00 +03:00
        assert_eq!(window.month_start, 1_733_000_400);
        assert_eq!(window.month_end, 1_735_678_800);
        assert_eq!(window.today, "2024-12-15");
        assert_eq!(window.expiring_until, "2024-12-22");
        assert_eq!(window.low_balance_threshold, 2);
    }
}
