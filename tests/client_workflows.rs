use std::{
    collections::HashMap,
    sync::Mutex,
};

use chrono::{Duration, Utc};
use cookie_counter::{
    client::{
        Backend, ClientError, ClientResult,
        history::{Detail, SalesHistory},
        inventory::InventoryEditor,
        new_sale::{NewSaleWorkflow, Phase},
        session::{
            Gate, MemorySessionStore, SessionContext, SessionState, SessionStore, StoredSession,
            View,
        },
    },
    domain::{
        inventory::{Adjustment, StageError},
        receipt::{Receipt, ReceiptLine},
    },
    dto::{
        auth::{SessionInfo, SignInResponse},
        inventory::{AdjustmentResult, ApplyCountsRequest},
        sales::{InvoiceReceipt, RecordSaleRequest, RecordedSale},
    },
    models::{Invoice, JournalCause, JournalEntry, Product, Role, UserProfile},
};
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@example.com";
const STAFF_EMAIL: &str = "staff@example.com";

fn profile(email: &str, role: Role) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        first_name: "Test".into(),
        last_name: "User".into(),
        email: email.into(),
        role,
    }
}

fn product(name: &str, price: i64, count: i32, unlimited_stock: bool) -> Product {
    Product {
        id: Uuid::new_v4(),
        display_name: name.into(),
        price,
        current_inventory_count: count,
        unlimited_stock,
        created_at: Utc::now(),
    }
}

fn invoice(name: &str, minutes_ago: i64) -> Invoice {
    Invoice {
        id: Uuid::new_v4(),
        customer_name: name.into(),
        customer_address: String::new(),
        customer_email: String::new(),
        total_amount: 0,
        created_by: Uuid::nil(),
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

fn api_error(status: u16, message: &str) -> ClientError {
    ClientError::Api {
        status,
        message: message.into(),
    }
}

#[derive(Default)]
struct FakeState {
    users: HashMap<String, UserProfile>,
    sessions: HashMap<String, UserProfile>,
    products: Vec<Product>,
    invoices: Vec<Invoice>,
    receipts: HashMap<Uuid, InvoiceReceipt>,
    fail_writes: bool,
    session_checks: usize,
    signed_out: Vec<String>,
    recorded: Vec<RecordSaleRequest>,
}

#[derive(Default)]
struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    fn new() -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.lock().unwrap();
            state
                .users
                .insert(ADMIN_EMAIL.into(), profile(ADMIN_EMAIL, Role::Admin));
            state
                .users
                .insert(STAFF_EMAIL.into(), profile(STAFF_EMAIL, Role::Standard));
            state.products = vec![
                product("Chocolate Chip", 600, 10, false),
                product("Donation", 500, 0, true),
                product("Sugar", 700, 2, false),
            ];
        }
        fake
    }

    fn product_id(&self, name: &str) -> Uuid {
        let state = self.state.lock().unwrap();
        state
            .products
            .iter()
            .find(|p| p.display_name == name)
            .map(|p| p.id)
            .unwrap()
    }

    fn open_session(&self, token: &str, email: &str) {
        let mut state = self.state.lock().unwrap();
        let profile = state.users[email].clone();
        state.sessions.insert(token.into(), profile);
    }

    fn set_fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }
}

impl Backend for FakeBackend {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<SignInResponse> {
        let mut state = self.state.lock().unwrap();
        let expected = if email == ADMIN_EMAIL { "admin123" } else { "staff123" };
        let profile = match state.users.get(email) {
            Some(profile) if password == expected => profile.clone(),
            _ => return Err(api_error(401, "Invalid login credentials")),
        };
        let token = format!("token-{}", state.sessions.len() + 1);
        state.sessions.insert(token.clone(), profile.clone());
        Ok(SignInResponse {
            access_token: token,
            token_type: "Bearer".into(),
            expires_at: Utc::now() + Duration::hours(1),
            profile,
        })
    }

    async fn sign_out(&self, token: &str) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        state.sessions.remove(token);
        state.signed_out.push(token.into());
        Ok(())
    }

    async fn current_session(&self, token: &str) -> ClientResult<SessionInfo> {
        let mut state = self.state.lock().unwrap();
        state.session_checks += 1;
        let profile = state
            .sessions
            .get(token)
            .cloned()
            .ok_or_else(|| api_error(401, "Session expired or signed out"))?;
        Ok(SessionInfo {
            session_id: Uuid::new_v4(),
            expires_at: Utc::now() + Duration::hours(1),
            profile,
        })
    }

    async fn list_products(&self, _token: &str) -> ClientResult<Vec<Product>> {
        Ok(self.state.lock().unwrap().products.clone())
    }

    async fn apply_counts(
        &self,
        _token: &str,
        request: ApplyCountsRequest,
    ) -> ClientResult<AdjustmentResult> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(api_error(500, "Internal Server Error"));
        }
        let mut entries = Vec::new();
        for count in request.counts {
            let product = state
                .products
                .iter_mut()
                .find(|p| p.id == count.product_id)
                .ok_or_else(|| api_error(404, "Not Found"))?;
            entries.push(JournalEntry {
                id: Uuid::new_v4(),
                product_id: product.id,
                delta: count.counted - product.current_inventory_count,
                cause: JournalCause::Adjustment,
                invoice_id: None,
                user_id: Uuid::nil(),
                created_at: Utc::now(),
            });
            product.current_inventory_count = count.counted;
        }
        Ok(AdjustmentResult {
            entries,
            products: state.products.clone(),
        })
    }

    async fn record_sale(
        &self,
        _token: &str,
        request: RecordSaleRequest,
    ) -> ClientResult<RecordedSale> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(api_error(400, "Bad Request insufficient stock"));
        }
        let invoice = Invoice {
            customer_name: request.customer.customer_name(),
            ..invoice("", 0)
        };
        state.recorded.push(request);
        state.invoices.push(invoice.clone());
        Ok(RecordedSale {
            invoice,
            items: Vec::new(),
        })
    }

    async fn list_invoices(&self, _token: &str) -> ClientResult<Vec<Invoice>> {
        Ok(self.state.lock().unwrap().invoices.clone())
    }

    async fn invoice_receipt(&self, _token: &str, invoice_id: Uuid) -> ClientResult<InvoiceReceipt> {
        self.state
            .lock()
            .unwrap()
            .receipts
            .get(&invoice_id)
            .cloned()
            .ok_or_else(|| api_error(404, "Not Found"))
    }
}

#[tokio::test]
async fn gate_follows_session_lifecycle() {
    let mut ctx = SessionContext::new(FakeBackend::new(), MemorySessionStore::new());

    assert_eq!(ctx.gate(View::Inventory), Gate::ShowLoader);
    assert_eq!(ctx.gate(View::Entry), Gate::Render);

    ctx.restore().await;
    assert_eq!(ctx.state(), &SessionState::Unauthenticated { error: None });
    assert_eq!(ctx.gate(View::Inventory), Gate::Redirect(View::Entry));

    assert_eq!(ctx.sign_in(ADMIN_EMAIL, "wrong").await, None);
    assert_eq!(ctx.error(), Some("Invalid login credentials"));
    assert_eq!(ctx.gate(View::Dashboard), Gate::Redirect(View::Entry));

    assert_eq!(
        ctx.sign_in(ADMIN_EMAIL, "admin123").await,
        Some(View::Dashboard)
    );
    assert!(ctx.is_admin());
    assert_eq!(ctx.profile().map(|p| p.role.label()), Some("Administrator"));
    assert_eq!(ctx.gate(View::Inventory), Gate::Render);
    assert_eq!(ctx.gate(View::Entry), Gate::Redirect(View::Dashboard));
    assert!(ctx.store().snapshot().is_some());

    let token = ctx.access_token().unwrap().to_string();
    assert_eq!(ctx.sign_out().await, View::Entry);
    assert_eq!(ctx.gate(View::Profile), Gate::Redirect(View::Entry));
    assert!(ctx.store().snapshot().is_none());
    assert!(matches!(ctx.access_token(), Err(ClientError::NotSignedIn)));
    assert_eq!(ctx.backend().state.lock().unwrap().signed_out, vec![token]);
}

#[tokio::test]
async fn restore_validates_the_persisted_token() {
    let backend = FakeBackend::new();
    backend.open_session("kept", STAFF_EMAIL);
    let store = MemorySessionStore::with_session(StoredSession {
        access_token: "kept".into(),
        expires_at: Utc::now() + Duration::hours(1),
    });
    let mut ctx = SessionContext::new(backend, store);
    ctx.restore().await;
    assert!(matches!(ctx.state(), SessionState::Authenticated(_)));
    assert!(!ctx.is_admin());
    assert_eq!(
        ctx.profile().map(|p| p.role.label()),
        Some("Application User")
    );

    // Revoked server-side: the stale token is dropped.
    let store = MemorySessionStore::with_session(StoredSession {
        access_token: "revoked".into(),
        expires_at: Utc::now() + Duration::hours(1),
    });
    let mut ctx = SessionContext::new(FakeBackend::new(), store);
    ctx.restore().await;
    assert_eq!(ctx.gate(View::Dashboard), Gate::Redirect(View::Entry));
    assert!(ctx.store().load().await.unwrap().is_none());

    // Expired locally: the server is never asked.
    let store = MemorySessionStore::with_session(StoredSession {
        access_token: "old".into(),
        expires_at: Utc::now() - Duration::minutes(1),
    });
    let mut ctx = SessionContext::new(FakeBackend::new(), store);
    ctx.restore().await;
    assert_eq!(ctx.backend().state.lock().unwrap().session_checks, 0);
    assert!(ctx.session().is_none());
}

#[tokio::test]
async fn inventory_save_keeps_edits_until_confirmed() {
    let backend = FakeBackend::new();
    backend.open_session("t", ADMIN_EMAIL);
    let chip = backend.product_id("Chocolate Chip");
    let sugar = backend.product_id("Sugar");
    let donation = backend.product_id("Donation");
    let admin = profile(ADMIN_EMAIL, Role::Admin);

    let mut editor = InventoryEditor::new(Some(&admin));
    editor.load(&backend, "t").await.unwrap();
    assert_eq!(editor.products().len(), 3);
    assert!(!editor.can_save());

    editor.stage(chip, "7").unwrap();
    editor.stage(sugar, "2").unwrap();
    editor.stage(donation, "0").unwrap();
    assert_eq!(
        editor.stage(sugar, "lots"),
        Err(StageError::NotANumber("lots".into()))
    );
    assert_eq!(editor.stage(sugar, "-1"), Err(StageError::Negative));
    assert_eq!(
        editor.planned(),
        vec![Adjustment {
            product_id: chip,
            delta: -3
        }]
    );
    assert!(editor.can_save());

    backend.set_fail_writes(true);
    assert!(editor.save(&backend, "t").await.is_err());
    assert_eq!(editor.pending(chip), Some(7));
    assert!(editor.error().is_some());

    backend.set_fail_writes(false);
    let entries = editor.save(&backend, "t").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].delta, -3);
    assert!(!editor.has_pending());
    assert!(editor.error().is_none());
    let chip_count = editor
        .products()
        .iter()
        .find(|p| p.id == chip)
        .map(|p| p.current_inventory_count);
    assert_eq!(chip_count, Some(7));

    // Blank input withdraws an edit.
    editor.stage(sugar, "5").unwrap();
    editor.stage(sugar, "  ").unwrap();
    assert!(editor.planned().is_empty());
}

#[tokio::test]
async fn inventory_is_read_only_for_standard_users() {
    let backend = FakeBackend::new();
    let chip = backend.product_id("Chocolate Chip");
    let staff = profile(STAFF_EMAIL, Role::Standard);

    let mut editor = InventoryEditor::new(Some(&staff));
    editor.load(&backend, "t").await.unwrap();
    editor.stage(chip, "3").unwrap();

    assert_eq!(editor.pending(chip), None);
    assert!(!editor.can_save());
    assert!(editor.save(&backend, "t").await.unwrap().is_empty());
}

#[tokio::test]
async fn new_sale_clamps_and_confirms() {
    let backend = FakeBackend::new();
    let chip = backend.product_id("Chocolate Chip");
    let sugar = backend.product_id("Sugar");
    let donation = backend.product_id("Donation");

    let mut sale = NewSaleWorkflow::new();
    sale.load(&backend, "t").await.unwrap();

    assert_eq!(sale.decrement(chip), 0);
    sale.increment(sugar);
    sale.increment(sugar);
    assert_eq!(sale.increment(sugar), 2);
    for _ in 0..5 {
        sale.increment(donation);
    }
    assert_eq!(sale.cart().quantity(donation), 5);
    sale.increment(chip);
    assert_eq!(sale.cart().total_items(), 8);
    assert_eq!(sale.cart().total_price(), 600 + 2 * 700 + 5 * 500);

    assert!(!sale.can_submit());
    assert!(sale.request_confirmation().is_err());
    sale.customer_mut().last_name = " Smith ".into();
    assert!(sale.can_submit());

    sale.request_confirmation().unwrap();
    assert_eq!(sale.phase(), Phase::Confirming);
    sale.cancel();
    assert_eq!(sale.phase(), Phase::Editing);

    sale.request_confirmation().unwrap();
    backend.set_fail_writes(true);
    assert!(sale.confirm(&backend, "t").await.is_err());
    assert_eq!(sale.phase(), Phase::Editing);
    assert_eq!(sale.cart().total_items(), 8);
    assert_eq!(sale.customer().last_name, " Smith ");

    backend.set_fail_writes(false);
    sale.request_confirmation().unwrap();
    assert_eq!(sale.confirm(&backend, "t").await.unwrap(), View::Dashboard);
    assert!(sale.cart().is_empty());
    assert!(!sale.customer().has_name());
    assert_eq!(
        sale.last_sale().map(|s| s.invoice.customer_name.as_str()),
        Some("Smith")
    );

    let state = backend.state.lock().unwrap();
    let lines = &state.recorded[0].lines;
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.quantity > 0));
}

#[tokio::test]
async fn confirm_requires_the_confirmation_step() {
    let backend = FakeBackend::new();
    let chip = backend.product_id("Chocolate Chip");

    let mut sale = NewSaleWorkflow::new();
    sale.load(&backend, "t").await.unwrap();
    sale.increment(chip);
    sale.customer_mut().first_name = "Jo".into();

    assert!(matches!(
        sale.confirm(&backend, "t").await,
        Err(ClientError::Invalid(_))
    ));
    assert!(backend.state.lock().unwrap().recorded.is_empty());
}

#[tokio::test]
async fn history_is_newest_first_and_drops_stale_detail() {
    let backend = FakeBackend::new();
    let older = invoice("Older", 30);
    let newest = invoice("Newest", 1);
    let middle = invoice("Middle", 10);
    {
        let mut state = backend.state.lock().unwrap();
        state.invoices = vec![older.clone(), newest.clone(), middle.clone()];
        for inv in [&older, &newest, &middle] {
            let line = ReceiptLine::new(Uuid::new_v4(), Uuid::new_v4(), None, 300, 2);
            state.receipts.insert(
                inv.id,
                InvoiceReceipt {
                    invoice: inv.clone(),
                    receipt: Receipt::from_lines(vec![line]),
                },
            );
        }
    }

    let mut history = SalesHistory::new();
    history.load_invoices(&backend, "t").await.unwrap();
    let names: Vec<&str> = history
        .invoices()
        .iter()
        .map(|i| i.customer_name.as_str())
        .collect();
    assert_eq!(names, vec!["Newest", "Middle", "Older"]);

    let first = history.select(older.id);
    let second = history.select(newest.id);
    let late = SalesHistory::fetch_detail(&backend, "t", first).await;
    assert!(!history.apply_detail(first, late));
    assert!(matches!(history.detail(), Some(Detail::Loading)));

    let fresh = SalesHistory::fetch_detail(&backend, "t", second).await;
    assert!(history.apply_detail(second, fresh));
    match history.detail() {
        Some(Detail::Loaded(detail)) => {
            assert_eq!(detail.invoice.id, newest.id);
            assert_eq!(detail.receipt.grand_total, 600);
            assert_eq!(detail.receipt.lines[0].display_name, "Unknown Product");
        }
        other => panic!("unexpected detail: {other:?}"),
    }

    let ticket = history.select(middle.id);
    history.close();
    let result = SalesHistory::fetch_detail(&backend, "t", ticket).await;
    assert!(!history.apply_detail(ticket, result));
    assert!(history.selected().is_none());

    assert!(history.open(&backend, "t", Uuid::new_v4()).await);
    assert!(matches!(history.detail(), Some(Detail::Failed(_))));
}
