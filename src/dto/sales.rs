use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{receipt::Receipt, sale::CustomerDetails},
    models::{Invoice, SaleLineItem},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct SaleLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordSaleRequest {
    pub customer: CustomerDetails,
    pub lines: Vec<SaleLineRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordedSale {
    pub invoice: Invoice,
    pub items: Vec<SaleLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct InvoiceList {
    #[schema(value_type = Vec<Invoice>)]
    pub items: Vec<Invoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceReceipt {
    pub invoice: Invoice,
    pub receipt: Receipt,
}
