//! Cart math for a new sale.
//!
//! Quantities live in `[0, stock]` for stock-bounded products and in
//! `[0, ∞)` for products flagged with unlimited stock. Stepping past a bound
//! is a no-op; `try_add` is the strict variant used when the server rebuilds
//! a cart from a submitted sale.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stock {
    Limited(i32),
    Unlimited,
}

impl Stock {
    pub fn allows(self, quantity: i32) -> bool {
        match self {
            Stock::Limited(available) => quantity <= available,
            Stock::Unlimited => true,
        }
    }

    pub fn is_out(self) -> bool {
        matches!(self, Stock::Limited(available) if available <= 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProduct {
    pub id: Uuid,
    pub display_name: String,
    pub price: i64,
    pub stock: Stock,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        let stock = if product.unlimited_stock {
            Stock::Unlimited
        } else {
            Stock::Limited(product.current_inventory_count)
        };
        Self {
            id: product.id,
            display_name: product.display_name.clone(),
            price: product.price,
            stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub display_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub stock: Stock,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("product {0} is not available for sale")]
    UnknownProduct(Uuid),

    #[error("quantity for product {0} must be greater than 0")]
    InvalidQuantity(Uuid),

    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: i32,
        available: i32,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    products: Vec<CartProduct>,
    quantities: HashMap<Uuid, i32>,
}

impl Cart {
    /// Every product starts at zero. Listing order is preserved.
    pub fn new(products: impl IntoIterator<Item = CartProduct>) -> Self {
        let products: Vec<CartProduct> = products.into_iter().collect();
        let quantities = products.iter().map(|p| (p.id, 0)).collect();
        Self {
            products,
            quantities,
        }
    }

    pub fn from_products(products: &[Product]) -> Self {
        Self::new(products.iter().map(CartProduct::from))
    }

    pub fn products(&self) -> &[CartProduct] {
        &self.products
    }

    pub fn product(&self, id: Uuid) -> Option<&CartProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn quantity(&self, id: Uuid) -> i32 {
        self.quantities.get(&id).copied().unwrap_or(0)
    }

    pub fn can_increment(&self, id: Uuid) -> bool {
        self.product(id)
            .is_some_and(|p| p.stock.allows(self.quantity(id).saturating_add(1)))
    }

    pub fn can_decrement(&self, id: Uuid) -> bool {
        self.product(id).is_some() && self.quantity(id) > 0
    }

    /// Adds one unit unless that would exceed stock. Returns the resulting quantity.
    pub fn increment(&mut self, id: Uuid) -> i32 {
        if self.can_increment(id) {
            *self.quantities.entry(id).or_insert(0) += 1;
        }
        self.quantity(id)
    }

    /// Removes one unit, flooring at zero. Returns the resulting quantity.
    pub fn decrement(&mut self, id: Uuid) -> i32 {
        if self.can_decrement(id) {
            *self.quantities.entry(id).or_insert(0) -= 1;
        }
        self.quantity(id)
    }

    /// Strict add: rejects unknown products, non-positive quantities and
    /// anything that would push the line past available stock.
    pub fn try_add(&mut self, id: Uuid, quantity: i32) -> Result<i32, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(id));
        }
        let product = self.product(id).ok_or(CartError::UnknownProduct(id))?;
        let requested = self.quantity(id).saturating_add(quantity);
        if let Stock::Limited(available) = product.stock {
            if requested > available {
                return Err(CartError::InsufficientStock {
                    name: product.display_name.clone(),
                    requested,
                    available,
                });
            }
        }
        self.quantities.insert(id, requested);
        Ok(requested)
    }

    pub fn clear(&mut self) {
        for qty in self.quantities.values_mut() {
            *qty = 0;
        }
    }

    /// Lines with a positive quantity, in listing order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.products
            .iter()
            .filter_map(|p| {
                let quantity = self.quantity(p.id);
                (quantity > 0).then(|| CartLine {
                    product_id: p.id,
                    display_name: p.display_name.clone(),
                    unit_price: p.price,
                    quantity,
                    stock: p.stock,
                })
            })
            .collect()
    }

    pub fn total_items(&self) -> i64 {
        self.quantities.values().map(|q| i64::from(*q)).sum()
    }

    pub fn line_count(&self) -> usize {
        self.quantities.values().filter(|q| **q > 0).count()
    }

    pub fn total_price(&self) -> i64 {
        self.lines().iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }
}
