use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    invoices::Model as InvoiceModel, journal::Model as JournalModel,
    products::Model as ProductModel, sales::Model as SaleModel, users::Model as UserModel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Standard,
}

impl Role {
    /// Anything other than `ADMIN` is a standard account.
    pub fn from_db(value: &str) -> Self {
        if value.eq_ignore_ascii_case("ADMIN") {
            Role::Admin
        } else {
            Role::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Standard => "STANDARD",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Standard => "Application User",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<UserModel> for UserProfile {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            role: Role::from_db(&model.role),
        }
    }
}

/// Prices are integer cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub display_name: String,
    pub price: i64,
    pub current_inventory_count: i32,
    pub unlimited_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            display_name: model.display_name,
            price: model.price,
            current_inventory_count: model.current_inventory_count,
            unlimited_stock: model.unlimited_stock,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JournalCause {
    Sale,
    Adjustment,
}

impl JournalCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalCause::Sale => "sale",
            JournalCause::Adjustment => "adjustment",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(JournalCause::Sale),
            "adjustment" => Some(JournalCause::Adjustment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct JournalEntry {
    pub id: Uuid,
    pub product_id: Uuid,
    pub delta: i32,
    pub cause: JournalCause,
    pub invoice_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<JournalModel> for JournalEntry {
    type Error = anyhow::Error;

    fn try_from(model: JournalModel) -> Result<Self, Self::Error> {
        let cause = JournalCause::from_db(&model.cause)
            .ok_or_else(|| anyhow::anyhow!("unknown journal cause {}", model.cause))?;
        Ok(Self {
            id: model.id,
            product_id: model.product_id,
            delta: model.delta,
            cause,
            invoice_id: model.invoice_id,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Invoice {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_email: String,
    pub total_amount: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<InvoiceModel> for Invoice {
    fn from(model: InvoiceModel) -> Self {
        Self {
            id: model.id,
            customer_name: model.customer_name,
            customer_address: model.customer_address,
            customer_email: model.customer_email,
            total_amount: model.total_amount,
            created_by: model.created_by,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SaleLineItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<SaleModel> for SaleLineItem {
    fn from(model: SaleModel) -> Self {
        Self {
            id: model.id,
            invoice_id: model.invoice_id,
            product_id: model.product_id,
            quantity: model.qty,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
