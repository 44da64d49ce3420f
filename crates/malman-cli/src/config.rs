use std::path::PathBuf;

use anyhow::{anyhow, Result};

use malman_accounting::attachments::AttachmentStore;
use malman_data::{Member, Retrieve};
use malman_db::Connection;

/// Runtime settings shared by all commands
#[derive(Debug, Clone)]
pub struct Config {
    pub user: Option<u32>,
    pub attachments_dir: PathBuf,
    pub items_per_page: usize,
    pub change_message: String,
}

/// What a command runs against
pub struct Context {
    pub db: Connection,
    pub config: Config,
}

impl Context {
    pub fn new(db: Connection, config: Config) -> Self {
        Self { db, config }
    }

    /// The member on whose behalf the command runs
    pub async fn actor(&self) -> Result<Member> {
        let id = self
            .config
            .user
            .ok_or_else(|| anyhow!("no acting member, pass --user or set MALMAN_USER"))?;
        let member: Member = self.db.retrieve(id).await?;
        tracing::debug!(member = %member.name, "acting member");
        Ok(member)
    }

    pub fn attachments(&self) -> AttachmentStore {
        AttachmentStore::new(&self.config.attachments_dir)
    }
}
