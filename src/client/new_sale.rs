use uuid::Uuid;

use super::{Backend, ClientError, ClientResult, session::View};
use crate::{
    domain::{
        cart::Cart,
        sale::{self, CustomerDetails, SaleError},
    },
    dto::sales::{RecordSaleRequest, RecordedSale, SaleLineRequest},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Editing,
    Confirming,
    Submitting,
}

/// Cart plus customer form for a single sale.
#[derive(Debug, Clone, Default)]
pub struct NewSaleWorkflow {
    cart: Cart,
    customer: CustomerDetails,
    phase: Phase,
    loading: bool,
    error: Option<String>,
    last_sale: Option<RecordedSale>,
}

impl NewSaleWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    pub fn customer_mut(&mut self) -> &mut CustomerDetails {
        &mut self.customer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_sale(&self) -> Option<&RecordedSale> {
        self.last_sale.as_ref()
    }

    /// Replaces the cart with a fresh one over the current product listing.
    pub async fn load<B: Backend>(&mut self, backend: &B, token: &str) -> ClientResult<()> {
        self.loading = true;
        let result = backend.list_products(token).await;
        self.loading = false;

        match result {
            Ok(products) => {
                self.cart = Cart::from_products(&products);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn increment(&mut self, product_id: Uuid) -> i32 {
        self.cart.increment(product_id)
    }

    pub fn decrement(&mut self, product_id: Uuid) -> i32 {
        self.cart.decrement(product_id)
    }

    pub fn clear(&mut self) {
        self.cart.clear();
        self.customer = CustomerDetails::default();
        self.phase = Phase::Editing;
        self.error = None;
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Editing && sale::can_submit(&self.cart, &self.customer)
    }

    /// Opens the confirmation step when the form is complete.
    pub fn request_confirmation(&mut self) -> Result<(), SaleError> {
        sale::validate(&self.cart, &self.customer)?;
        self.phase = Phase::Confirming;
        Ok(())
    }

    pub fn cancel(&mut self) {
        if self.phase == Phase::Confirming {
            self.phase = Phase::Editing;
        }
    }

    /// Submits the confirmed sale. Success clears the form and sends the user
    /// to the dashboard; failure leaves cart and customer untouched.
    pub async fn confirm<B: Backend>(&mut self, backend: &B, token: &str) -> ClientResult<View> {
        if self.phase != Phase::Confirming {
            return Err(ClientError::Invalid("sale has not been confirmed".into()));
        }
        if let Err(e) = sale::validate(&self.cart, &self.customer) {
            self.phase = Phase::Editing;
            return Err(ClientError::Invalid(e.to_string()));
        }

        let request = RecordSaleRequest {
            customer: self.customer.clone(),
            lines: self
                .cart
                .lines()
                .into_iter()
                .map(|line| SaleLineRequest {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        };

        self.phase = Phase::Submitting;
        let result = backend.record_sale(token, request).await;

        match result {
            Ok(recorded) => {
                tracing::debug!(invoice_id = %recorded.invoice.id, "sale submitted");
                self.clear();
                self.last_sale = Some(recorded);
                Ok(View::Dashboard)
            }
            Err(e) => {
                self.phase = Phase::Editing;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
