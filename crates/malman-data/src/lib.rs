// Operations
mod operations;
pub use operations::*;

mod errors;
pub use errors::*;

mod pagination;
pub use pagination::*;

// Models
mod members;
pub use members::*;

mod banks;
pub use banks::*;

mod categories;
pub use categories::*;

mod transactions;
pub use transactions::*;

mod attachments;
pub use attachments::*;

mod fees;
pub use fees::*;

mod cash;
pub use cash::*;

mod stock;
pub use stock::*;
