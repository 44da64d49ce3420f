mod attachments;
pub use attachments::*;

mod balance;
pub use balance::*;

mod bar;
pub use bar::*;

mod cash;
pub use cash::*;

mod fees;
pub use fees::*;

mod registry;
pub use registry::*;

mod reimbursements;
pub use reimbursements::*;

mod reports;
pub use reports::*;

mod stock;
pub use stock::*;

mod transactions;
pub use transactions::*;
