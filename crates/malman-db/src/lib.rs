pub mod connection;
pub use connection::Connection;

pub mod results;
pub mod schema;

// Models
pub mod members;
pub mod banks;
pub mod categories;
pub mod transactions;
pub mod attachments;
pub mod fees;
pub mod cash;
pub mod stock;

pub use malman_data::QueryError;
