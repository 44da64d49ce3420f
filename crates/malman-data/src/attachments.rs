use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AttachmentFilter {
    pub id: Option<u32>,
    pub transaction_id: Option<u32>,
    pub filename: Option<String>,
}

/// A file attached to a transaction
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u32,
    pub transaction_id: u32,
    pub filename: String,
}
