//! Pure business rules shared by the server and the client view-models.
//! Nothing in here touches the network or the database.

pub mod cart;
pub mod inventory;
pub mod receipt;
pub mod sale;
