use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::cart::Cart;

/// Customer details as typed into the new-sale form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomerDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub email: String,
}

impl CustomerDetails {
    pub fn has_name(&self) -> bool {
        !self.first_name.trim().is_empty() || !self.last_name.trim().is_empty()
    }

    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Non-empty address parts joined with ", ".
    pub fn full_address(&self) -> String {
        [
            &self.address_line1,
            &self.address_line2,
            &self.city,
            &self.state,
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }

    pub fn email(&self) -> String {
        self.email.trim().to_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaleError {
    #[error("a sale needs at least one item")]
    EmptyCart,

    #[error("a sale needs a customer first or last name")]
    MissingCustomerName,
}

pub fn validate(cart: &Cart, customer: &CustomerDetails) -> Result<(), SaleError> {
    if cart.total_items() <= 0 {
        return Err(SaleError::EmptyCart);
    }
    if !customer.has_name() {
        return Err(SaleError::MissingCustomerName);
    }
    Ok(())
}

pub fn can_submit(cart: &Cart, customer: &CustomerDetails) -> bool {
    validate(cart, customer).is_ok()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::cart::{CartProduct, Stock};

    fn one_product_cart() -> (Cart, Uuid) {
        let id = Uuid::new_v4();
        let cart = Cart::new([CartProduct {
            id,
            display_name: "Trefoils".into(),
            price: 600,
            stock: Stock::Limited(3),
        }]);
        (cart, id)
    }

    #[test]
    fn submission_requires_items_and_a_name() {
        let (mut cart, id) = one_product_cart();
        let mut customer = CustomerDetails::default();

        assert_eq!(validate(&cart, &customer), Err(SaleError::EmptyCart));
        cart.increment(id);
        assert_eq!(
            validate(&cart, &customer),
            Err(SaleError::MissingCustomerName)
        );

        customer.last_name = "  ".into();
        assert!(!can_submit(&cart, &customer));

        customer.last_name = "Nguyen".into();
        assert!(can_submit(&cart, &customer));
    }

    #[test]
    fn name_and_address_are_normalised() {
        let customer = CustomerDetails {
            first_name: " Ada ".into(),
            last_name: String::new(),
            address_line1: "1 Main St".into(),
            address_line2: "   ".into(),
            city: "Springfield".into(),
            state: " IL".into(),
            email: " ada@example.com ".into(),
        };

        assert_eq!(customer.customer_name(), "Ada");
        assert_eq!(customer.full_address(), "1 Main St, Springfield, IL");
        assert_eq!(customer.email(), "ada@example.com");
    }
}
