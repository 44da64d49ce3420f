pub mod attachments;
pub mod balance;
pub mod cash;
pub mod changes;
pub mod datetime;
pub mod errors;
pub mod fees;
pub mod filing;
pub mod forms;
pub mod inventory;
pub mod ledger;
pub mod listing;
pub mod permissions;
pub mod registry;
pub mod reimbursements;

pub use errors::{AccountingError, FieldError, FormErrors};
