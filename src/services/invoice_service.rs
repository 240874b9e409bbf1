use sea_orm::{EntityTrait, QueryOrder};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    domain::receipt::{Receipt, ReceiptLine},
    dto::sales::{InvoiceList, InvoiceReceipt},
    entity::{Invoices, invoices::Column as InvoiceCol},
    error::{AppError, AppResult},
    models::Invoice,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct SaleWithProductRow {
    sale_id: Uuid,
    product_id: Uuid,
    qty: i32,
    display_name: Option<String>,
    price: Option<i64>,
}

/// Every invoice, newest first. Volumes are small so there is no paging.
pub async fn list_invoices(state: &AppState) -> AppResult<ApiResponse<InvoiceList>> {
    let items: Vec<Invoice> = Invoices::find()
        .order_by_desc(InvoiceCol::CreatedAt)
        .order_by_desc(InvoiceCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Invoice::from)
        .collect();

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Invoices", InvoiceList { items }, Some(meta)))
}

/// Loads an invoice's line items with product name and price and rebuilds
/// the totals from them. The stored `total_amount` is not consulted.
pub async fn get_receipt(state: &AppState, id: Uuid) -> AppResult<ApiResponse<InvoiceReceipt>> {
    let invoice = Invoices::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Invoice::from)
        .ok_or(AppError::NotFound)?;

    let rows = sqlx::query_as::<_, SaleWithProductRow>(
        r#"
        SELECT s.id AS sale_id, s.product_id, s.qty,
               p.display_name, p.price
        FROM sales s
        LEFT JOIN products p ON p.id = s.product_id
        WHERE s.invoice_id = $1
        ORDER BY s.created_at, s.id
        "#,
    )
    .bind(invoice.id)
    .fetch_all(&state.pool)
    .await?;

    let lines = rows
        .into_iter()
        .map(|row| {
            ReceiptLine::new(
                row.sale_id,
                row.product_id,
                row.display_name,
                row.price.unwrap_or(0),
                row.qty,
            )
        })
        .collect();
    let receipt = Receipt::from_lines(lines);

    if receipt.grand_total != invoice.total_amount {
        tracing::warn!(
            invoice_id = %invoice.id,
            stored = invoice.total_amount,
            recomputed = receipt.grand_total,
            "receipt total differs from stored invoice total"
        );
    }

    Ok(ApiResponse::success(
        "Receipt",
        InvoiceReceipt { invoice, receipt },
        Some(Meta::empty()),
    ))
}
