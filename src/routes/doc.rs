use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        inventory::Adjustment,
        receipt::{Receipt, ReceiptLine},
        sale::CustomerDetails,
    },
    dto::{
        auth::{AuthenticatedEcho, SessionInfo, SignInRequest, SignInResponse},
        dashboard::DashboardSummary,
        inventory::{AdjustmentResult, ApplyCountsRequest, JournalList, PhysicalCount, ProductList},
        sales::{InvoiceList, InvoiceReceipt, RecordSaleRequest, RecordedSale, SaleLineRequest},
    },
    models::{Invoice, JournalCause, JournalEntry, Product, Role, SaleLineItem, UserProfile},
    response::{ApiResponse, Meta},
    routes::{auth, dashboard, health, inventory, invoices, products, profile, sales},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::protected_test,
        auth::sign_in,
        auth::sign_out,
        auth::session,
        profile::get_profile,
        dashboard::dashboard,
        products::list_products,
        inventory::list_inventory,
        inventory::apply_counts,
        inventory::product_journal,
        sales::record_sale,
        invoices::list_invoices,
        invoices::get_receipt
    ),
    components(
        schemas(
            Role,
            UserProfile,
            Product,
            JournalCause,
            JournalEntry,
            Invoice,
            SaleLineItem,
            Adjustment,
            CustomerDetails,
            Receipt,
            ReceiptLine,
            SignInRequest,
            SignInResponse,
            SessionInfo,
            AuthenticatedEcho,
            DashboardSummary,
            PhysicalCount,
            ApplyCountsRequest,
            AdjustmentResult,
            ProductList,
            JournalList,
            SaleLineRequest,
            RecordSaleRequest,
            RecordedSale,
            InvoiceList,
            InvoiceReceipt,
            health::HealthData,
            Meta,
            ApiResponse<ProductList>,
            ApiResponse<RecordedSale>,
            ApiResponse<InvoiceList>,
            ApiResponse<InvoiceReceipt>,
            ApiResponse<AdjustmentResult>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and token checks"),
        (name = "Auth", description = "Sign-in, sign-out and session endpoints"),
        (name = "Profile", description = "Read-only profile"),
        (name = "Dashboard", description = "Dashboard summary"),
        (name = "Products", description = "Product catalogue"),
        (name = "Inventory", description = "Stock levels and physical counts"),
        (name = "Sales", description = "Recording sales"),
        (name = "Invoices", description = "Sales history and receipts"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
