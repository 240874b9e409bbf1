use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use uuid::Uuid;

use crate::{
    domain::inventory::plan_adjustments,
    dto::inventory::{AdjustmentResult, ApplyCountsRequest, JournalList, ProductList},
    entity::{
        Journal, Products,
        journal::{ActiveModel as JournalActive, Column as JournalCol},
        products::Column as ProdCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{JournalCause, JournalEntry, Product},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// A journal row waiting to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalDraft {
    pub product_id: Uuid,
    pub delta: i32,
    pub cause: JournalCause,
    pub invoice_id: Option<Uuid>,
}

impl JournalDraft {
    pub fn adjustment(product_id: Uuid, delta: i32) -> Self {
        Self {
            product_id,
            delta,
            cause: JournalCause::Adjustment,
            invoice_id: None,
        }
    }

    pub fn sale(product_id: Uuid, quantity: i32, invoice_id: Uuid) -> Self {
        Self {
            product_id,
            delta: -quantity,
            cause: JournalCause::Sale,
            invoice_id: Some(invoice_id),
        }
    }
}

pub async fn list_products<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<Product>> {
    let items = Products::find()
        .order_by_asc(ProdCol::DisplayName)
        .all(conn)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    Ok(items)
}

pub async fn product_listing(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let items = list_products(&state.orm).await?;
    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

/// Appends journal rows and moves each product's count by the same delta.
///
/// Taking a transaction keeps the ledger and the counts in lockstep: the sum
/// of a product's journal deltas always equals its current count.
pub async fn apply_journal_entries(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    drafts: &[JournalDraft],
) -> AppResult<Vec<JournalEntry>> {
    let mut entries = Vec::with_capacity(drafts.len());

    for draft in drafts {
        if draft.delta == 0 {
            continue;
        }

        let updated = Products::update_many()
            .col_expr(
                ProdCol::CurrentInventoryCount,
                Expr::col(ProdCol::CurrentInventoryCount).add(draft.delta),
            )
            .filter(ProdCol::Id.eq(draft.product_id))
            .exec(txn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        let row = JournalActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(draft.product_id),
            delta: Set(draft.delta),
            cause: Set(draft.cause.as_str().to_string()),
            invoice_id: Set(draft.invoice_id),
            user_id: Set(user_id),
            created_at: NotSet,
        }
        .insert(txn)
        .await?;

        tracing::debug!(
            product_id = %draft.product_id,
            delta = draft.delta,
            cause = draft.cause.as_str(),
            "journal entry applied"
        );
        entries.push(JournalEntry::try_from(row)?);
    }

    Ok(entries)
}

pub async fn apply_physical_counts(
    state: &AppState,
    user: &AuthUser,
    payload: ApplyCountsRequest,
) -> AppResult<ApiResponse<AdjustmentResult>> {
    ensure_admin(user)?;
    if payload.counts.is_empty() {
        return Err(AppError::BadRequest("no counts to apply".into()));
    }

    let mut seen = HashSet::new();
    for count in &payload.counts {
        if !seen.insert(count.product_id) {
            return Err(AppError::BadRequest(format!(
                "product {} counted more than once",
                count.product_id
            )));
        }
    }

    let txn = state.orm.begin().await?;

    let ids: Vec<Uuid> = seen.into_iter().collect();
    let current: HashMap<Uuid, i32> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p.current_inventory_count))
        .collect();

    let planned = plan_adjustments(
        payload.counts.iter().map(|c| (c.product_id, c.counted)),
        |id| current.get(&id).copied(),
    )?;
    let drafts: Vec<JournalDraft> = planned
        .iter()
        .map(|a| JournalDraft::adjustment(a.product_id, a.delta))
        .collect();

    let entries = apply_journal_entries(&txn, user.user_id, &drafts).await?;
    txn.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        submitted = payload.counts.len(),
        applied = entries.len(),
        "inventory counts applied"
    );

    let products = list_products(&state.orm).await?;
    Ok(ApiResponse::success(
        "Inventory updated",
        AdjustmentResult { entries, products },
        Some(Meta::empty()),
    ))
}

pub async fn product_journal(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<JournalList>> {
    ensure_admin(user)?;
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let items = Journal::find()
        .filter(JournalCol::ProductId.eq(product_id))
        .order_by_desc(JournalCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(JournalEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Journal", JournalList { items }, Some(meta)))
}
