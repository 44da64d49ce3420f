use std::path::{Path, PathBuf};

use malman_data::{Attachment, Delete, Insert, Member, Retrieve, Role, Transaction};

use crate::{permissions, AccountingError, FormErrors};

/// File types that may be attached to a transaction
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "rtf", "odf", "ods", "gnumeric", "abw", "doc", "docx", "xls", "xlsx", "jpg", "jpe",
    "jpeg", "png", "gif", "svg", "bmp", "pdf",
];

/// Reduce an uploaded file name to something safe to store:
/// only the final path component, with ascii letters, digits,
/// dots, dashes and underscores left.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// A file offered as attachment, checked before anything is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    source: PathBuf,
    filename: String,
}

impl Upload {
    /// Accept `source` if it is an existing file with a
    /// whitelisted extension.
    pub fn check(source: &Path) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::default();
        let filename = secure_filename(&source.to_string_lossy());
        if !AttachmentStore::is_allowed(&filename) {
            errors.push("attachment", "This filetype is not whitelisted");
        } else if !source.is_file() {
            errors.push("attachment", format!("{} is not a file", source.display()));
        }
        errors.into_result()?;
        Ok(Self {
            source: source.to_path_buf(),
            filename,
        })
    }

    /// The name the file is stored under, unless it clashes
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// Directory holding attachment files
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dest: PathBuf,
}

impl AttachmentStore {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Check the extension against the whitelist. Lower or
    /// upper case is accepted.
    pub fn is_allowed(filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext == *allowed || ext == allowed.to_uppercase()),
            _ => false,
        }
    }

    /// First free name in the store: `name.ext`, `name_1.ext`, ...
    async fn free_name(&self, filename: &str) -> Result<String, AccountingError> {
        let (stem, ext) = filename.rsplit_once('.').unwrap_or((filename, ""));
        let mut candidate = filename.to_string();
        let mut n = 0;
        while tokio::fs::try_exists(self.dest.join(&candidate))
            .await
            .map_err(anyhow::Error::from)?
        {
            n += 1;
            candidate = format!("{}_{}.{}", stem, n, ext);
        }
        Ok(candidate)
    }

    /// Copy a checked upload into the store and attach it to a
    /// transaction.
    pub async fn attach<DB>(
        &self,
        db: &DB,
        member: &Member,
        transaction_id: u32,
        upload: &Upload,
    ) -> Result<Attachment, AccountingError>
    where
        DB: Retrieve<Transaction, Key = u32> + Insert<Attachment> + Send + Sync,
    {
        permissions::require(member, Role::Member)?;
        let tx: Transaction = db.retrieve(transaction_id).await?;

        tokio::fs::create_dir_all(&self.dest)
            .await
            .map_err(anyhow::Error::from)?;
        let filename = self.free_name(upload.filename()).await?;
        tokio::fs::copy(&upload.source, self.dest.join(&filename))
            .await
            .map_err(anyhow::Error::from)?;

        let attachment = db
            .insert(Attachment {
                transaction_id: tx.id,
                filename,
                ..Default::default()
            })
            .await?;
        tracing::info!(transaction = tx.id, filename = %attachment.filename, "attachment added");
        Ok(attachment)
    }

    /// Unlink an attachment from its transaction. The stored file
    /// stays where it is.
    pub async fn remove<DB>(
        &self,
        db: &DB,
        treasurer: &Member,
        transaction_id: u32,
        attachment_id: u32,
    ) -> Result<Attachment, AccountingError>
    where
        DB: Retrieve<Attachment, Key = u32> + Delete<Attachment> + Send + Sync,
    {
        permissions::require(treasurer, Role::Finances)?;
        let attachment: Attachment = db.retrieve(attachment_id).await?;
        if attachment.transaction_id != transaction_id {
            return Err(AccountingError::NotFound(format!(
                "attachment {} of transaction {}",
                attachment_id, transaction_id
            )));
        }
        db.delete(attachment.clone()).await?;
        tracing::info!(transaction = transaction_id, filename = %attachment.filename,
            "attachment removed");
        Ok(attachment)
    }

    /// Location of a stored attachment
    pub async fn path(&self, filename: &str) -> Result<PathBuf, AccountingError> {
        let path = self.dest.join(secure_filename(filename));
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(anyhow::Error::from)?;
        if !exists || filename.is_empty() {
            return Err(AccountingError::NotFound(format!("attachment {}", filename)));
        }
        Ok(path)
    }
}
