use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Role;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub display_name: String,
    pub role: Role,
    pub product_count: i64,
    pub units_in_stock: i64,
    pub invoice_count: i64,
    pub sales_total: i64,
}
