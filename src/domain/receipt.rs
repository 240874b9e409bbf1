//! Receipt totals, always recomputed from the loaded line items.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReceiptLine {
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub display_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
}

impl ReceiptLine {
    pub fn new(
        sale_id: Uuid,
        product_id: Uuid,
        display_name: Option<String>,
        unit_price: i64,
        quantity: i32,
    ) -> Self {
        Self {
            sale_id,
            product_id,
            display_name: display_name.unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
            unit_price,
            quantity,
            line_total: unit_price * i64::from(quantity),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Receipt {
    pub lines: Vec<ReceiptLine>,
    pub total_items: i64,
    pub grand_total: i64,
}

impl Receipt {
    pub fn from_lines(lines: Vec<ReceiptLine>) -> Self {
        let total_items = lines.iter().map(|l| i64::from(l.quantity)).sum();
        let grand_total = lines.iter().map(|l| l.line_total).sum();
        Self {
            lines,
            total_items,
            grand_total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_come_from_lines() {
        let receipt = Receipt::from_lines(vec![
            ReceiptLine::new(Uuid::new_v4(), Uuid::new_v4(), Some("Samoas".into()), 300, 2),
            ReceiptLine::new(Uuid::new_v4(), Uuid::new_v4(), Some("Tagalongs".into()), 400, 1),
        ]);

        assert_eq!(receipt.lines[0].line_total, 600);
        assert_eq!(receipt.total_items, 3);
        assert_eq!(receipt.grand_total, 1000);
    }

    #[test]
    fn missing_product_gets_placeholder_name() {
        let line = ReceiptLine::new(Uuid::new_v4(), Uuid::new_v4(), None, 500, 1);
        assert_eq!(line.display_name, UNKNOWN_PRODUCT);
    }

    #[test]
    fn empty_receipt_is_zero() {
        let receipt = Receipt::from_lines(Vec::new());
        assert!(receipt.is_empty());
        assert_eq!(receipt.grand_total, 0);
    }
}
