use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    domain::{
        cart::{Cart, Stock},
        sale,
    },
    dto::sales::{RecordSaleRequest, RecordedSale},
    entity::{
        Products,
        invoices::ActiveModel as InvoiceActive,
        products::Column as ProdCol,
        sales::ActiveModel as SaleActive,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Invoice, Product, SaleLineItem},
    response::{ApiResponse, Meta},
    services::inventory_service::{JournalDraft, apply_journal_entries},
    state::AppState,
};

/// Records a sale as one unit of work: invoice header, line items, and the
/// `sale` journal entries that take the units out of stock. Any failure
/// rolls the whole sale back.
pub async fn record_sale(
    state: &AppState,
    user: &AuthUser,
    payload: RecordSaleRequest,
) -> AppResult<ApiResponse<RecordedSale>> {
    let RecordSaleRequest { customer, lines } = payload;
    if lines.is_empty() {
        return Err(sale::SaleError::EmptyCart.into());
    }
    if !customer.has_name() {
        return Err(sale::SaleError::MissingCustomerName.into());
    }

    let txn = state.orm.begin().await?;

    let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let products: Vec<Product> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .order_by_asc(ProdCol::DisplayName)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let mut cart = Cart::from_products(&products);
    for line in &lines {
        cart.try_add(line.product_id, line.quantity)?;
    }
    sale::validate(&cart, &customer)?;

    let cart_lines = cart.lines();
    let total_amount = cart.total_price();
    let invoice_id = Uuid::new_v4();

    let invoice = InvoiceActive {
        id: Set(invoice_id),
        customer_name: Set(customer.customer_name()),
        customer_address: Set(customer.full_address()),
        customer_email: Set(customer.email()),
        total_amount: Set(total_amount),
        created_by: Set(user.user_id),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(cart_lines.len());
    let mut drafts = Vec::with_capacity(cart_lines.len());
    for line in &cart_lines {
        let item = SaleActive {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice.id),
            product_id: Set(line.product_id),
            qty: Set(line.quantity),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(SaleLineItem::from(item));

        // Unlimited lines (donations) carry no stock to deduct.
        if let Stock::Limited(_) = line.stock {
            drafts.push(JournalDraft::sale(line.product_id, line.quantity, invoice.id));
        }
    }

    apply_journal_entries(&txn, user.user_id, &drafts).await?;
    txn.commit().await?;

    tracing::info!(
        invoice_id = %invoice.id,
        user_id = %user.user_id,
        lines = items.len(),
        total_amount,
        "sale recorded"
    );

    Ok(ApiResponse::success(
        "Sale recorded",
        RecordedSale {
            invoice: Invoice::from(invoice),
            items,
        },
        Some(Meta::empty()),
    ))
}
