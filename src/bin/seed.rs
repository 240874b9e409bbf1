use cookie_counter::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::{
        auth_service::hash_password,
        inventory_service::{JournalDraft, apply_journal_entries},
    },
    state::AppState,
};
use sea_orm::TransactionTrait;
use uuid::Uuid;

/// Default catalogue: name, price in cents, opening stock.
const PRODUCTS: [(&str, i64, i32); 7] = [
    ("Adventurefuls", 600, 24),
    ("Lemon-Ups", 600, 24),
    ("Samoas", 600, 36),
    ("Tagalongs", 600, 36),
    ("Thin Mints", 600, 48),
    ("Trefoils", 600, 24),
    ("Toffee-tastic", 700, 12),
];

const DONATION: (&str, i64) = ("Donation", 600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let state = AppState::new(pool, config);
    run_migrations(&state.orm).await?;

    let admin_id = ensure_user(
        &state.pool,
        "admin@example.com",
        "admin123",
        ("Avery", "Admin"),
        "ADMIN",
    )
    .await?;
    let staff_id = ensure_user(
        &state.pool,
        "staff@example.com",
        "staff123",
        ("Sam", "Seller"),
        "STANDARD",
    )
    .await?;
    seed_products(&state, admin_id).await?;

    tracing::info!(%admin_id, %staff_id, "seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    (first_name, last_name): (&str, &str),
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    tracing::info!(email, role, "ensured user");
    Ok(user_id)
}

/// New products start at zero and get their opening stock through the
/// journal, so the ledger balances from the first row.
async fn seed_products(state: &AppState, admin_id: Uuid) -> anyhow::Result<()> {
    let mut drafts = Vec::new();

    for (name, price, stock) in PRODUCTS {
        if let Some(id) = insert_product(&state.pool, name, price, false).await? {
            drafts.push(JournalDraft::adjustment(id, stock));
        }
    }
    insert_product(&state.pool, DONATION.0, DONATION.1, true).await?;

    let txn = state.orm.begin().await?;
    let entries = apply_journal_entries(&txn, admin_id, &drafts).await?;
    txn.commit().await?;

    tracing::info!(opening_entries = entries.len(), "seeded products");
    Ok(())
}

async fn insert_product(
    pool: &sqlx::PgPool,
    name: &str,
    price: i64,
    unlimited_stock: bool,
) -> anyhow::Result<Option<Uuid>> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO products (id, display_name, price, current_inventory_count, unlimited_stock)
        VALUES ($1, $2, $3, 0, $4)
        ON CONFLICT (display_name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(price)
    .bind(unlimited_stock)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id,)| id))
}
