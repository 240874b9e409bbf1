use uuid::Uuid;

use super::{Backend, ClientResult};
use crate::{dto::sales::InvoiceReceipt, models::Invoice};

/// Identifies one detail request. A result whose ticket no longer matches
/// the current selection is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    invoice_id: Uuid,
    generation: u64,
}

impl DetailTicket {
    pub fn invoice_id(&self) -> Uuid {
        self.invoice_id
    }
}

#[derive(Debug, Clone)]
pub enum Detail {
    Loading,
    Loaded(InvoiceReceipt),
    Failed(String),
}

#[derive(Debug, Clone)]
struct Selection {
    ticket: DetailTicket,
    detail: Detail,
}

/// Invoice list with a lazily loaded receipt panel.
#[derive(Debug, Clone, Default)]
pub struct SalesHistory {
    invoices: Vec<Invoice>,
    loading: bool,
    error: Option<String>,
    selection: Option<Selection>,
    generation: u64,
}

impl SalesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first.
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selection.as_ref().map(|s| s.ticket.invoice_id)
    }

    pub fn detail(&self) -> Option<&Detail> {
        self.selection.as_ref().map(|s| &s.detail)
    }

    pub async fn load_invoices<B: Backend>(
        &mut self,
        backend: &B,
        token: &str,
    ) -> ClientResult<()> {
        self.loading = true;
        let result = backend.list_invoices(token).await;
        self.loading = false;

        match result {
            Ok(mut invoices) => {
                invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                self.invoices = invoices;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Marks `invoice_id` as selected and returns the ticket its receipt
    /// request must present.
    pub fn select(&mut self, invoice_id: Uuid) -> DetailTicket {
        self.generation += 1;
        let ticket = DetailTicket {
            invoice_id,
            generation: self.generation,
        };
        self.selection = Some(Selection {
            ticket,
            detail: Detail::Loading,
        });
        ticket
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.selection = None;
    }

    /// Stores a receipt result. Returns `false` when the ticket is stale.
    pub fn apply_detail(
        &mut self,
        ticket: DetailTicket,
        result: ClientResult<InvoiceReceipt>,
    ) -> bool {
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        if selection.ticket != ticket {
            tracing::debug!(invoice_id = %ticket.invoice_id, "discarding stale receipt");
            return false;
        }
        selection.detail = match result {
            Ok(receipt) => Detail::Loaded(receipt),
            Err(e) => Detail::Failed(e.to_string()),
        };
        true
    }

    pub async fn fetch_detail<B: Backend>(
        backend: &B,
        token: &str,
        ticket: DetailTicket,
    ) -> ClientResult<InvoiceReceipt> {
        backend.invoice_receipt(token, ticket.invoice_id).await
    }

    /// Select, fetch and apply in one go.
    pub async fn open<B: Backend>(&mut self, backend: &B, token: &str, invoice_id: Uuid) -> bool {
        let ticket = self.select(invoice_id);
        let result = Self::fetch_detail(backend, token, ticket).await;
        self.apply_detail(ticket, result)
    }
}
