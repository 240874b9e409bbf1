use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{JournalEntry, Product};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PhysicalCount {
    pub product_id: Uuid,
    pub counted: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplyCountsRequest {
    pub counts: Vec<PhysicalCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustmentResult {
    pub entries: Vec<JournalEntry>,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JournalList {
    #[schema(value_type = Vec<JournalEntry>)]
    pub items: Vec<JournalEntry>,
}
