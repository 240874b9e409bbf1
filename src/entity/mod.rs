pub mod invoices;
pub mod journal;
pub mod products;
pub mod sales;
pub mod sessions;
pub mod users;

pub use invoices::Entity as Invoices;
pub use journal::Entity as Journal;
pub use products::Entity as Products;
pub use sales::Entity as Sales;
pub use sessions::Entity as Sessions;
pub use users::Entity as Users;
