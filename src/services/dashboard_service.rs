use sqlx::FromRow;

use crate::{
    dto::dashboard::DashboardSummary,
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::auth_service::find_profile,
    state::AppState,
};

#[derive(FromRow)]
struct Totals {
    product_count: i64,
    units_in_stock: i64,
    invoice_count: i64,
    sales_total: i64,
}

pub async fn summary(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardSummary>> {
    let profile = find_profile(state, user.user_id).await?;

    let totals = sqlx::query_as::<_, Totals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM products) AS product_count,
            (SELECT COALESCE(SUM(current_inventory_count), 0)::BIGINT
               FROM products WHERE NOT unlimited_stock) AS units_in_stock,
            (SELECT COUNT(*) FROM invoices) AS invoice_count,
            (SELECT COALESCE(SUM(total_amount), 0)::BIGINT FROM invoices) AS sales_total
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let data = DashboardSummary {
        display_name: profile.full_name(),
        role: profile.role,
        product_count: totals.product_count,
        units_in_stock: totals.units_in_stock,
        invoice_count: totals.invoice_count,
        sales_total: totals.sales_total,
    };
    Ok(ApiResponse::success("Dashboard", data, Some(Meta::empty())))
}
