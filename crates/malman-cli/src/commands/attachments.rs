use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use inquire::Confirm;

use malman_accounting::{attachments::Upload, permissions, AccountingError};
use malman_data::{Attachment, Retrieve, Role};

use crate::config::Context;

#[derive(Subcommand, Debug)]
pub enum Attachments {
    /// Attach a file to a transaction
    #[clap(name = "add")]
    Add(AddAttachment),
    /// Unlink an attachment from its transaction
    #[clap(name = "remove")]
    Remove(RemoveAttachment),
    /// Print where an attachment is stored
    #[clap(name = "path")]
    Path(AttachmentPath),
}

impl Attachments {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Attachments::Add(cmd) => cmd.run(ctx).await,
            Attachments::Remove(cmd) => cmd.run(ctx).await,
            Attachments::Path(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddAttachment {
    #[clap(short, long)]
    pub transaction: u32,
    pub file: PathBuf,
}

impl AddAttachment {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let upload = Upload::check(&self.file).map_err(AccountingError::from)?;
        let attachment = ctx
            .attachments()
            .attach(&ctx.db, &actor, self.transaction, &upload)
            .await?;
        println!("{} was attached with id {}", attachment.filename, attachment.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RemoveAttachment {
    #[clap(short, long)]
    pub transaction: u32,
    #[clap(short, long)]
    pub attachment: u32,
}

impl RemoveAttachment {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Finances)?;

        let attachment: Attachment = ctx.db.retrieve(self.attachment).await?;
        let message = format!("Remove {} from the transaction?", attachment.filename);
        let confirm = Confirm::new(&message).with_default(false);
        if !confirm.prompt()? {
            println!("removing the attachment was canceled");
            return Ok(());
        }
        ctx.attachments()
            .remove(&ctx.db, &actor, self.transaction, self.attachment)
            .await?;
        println!("the attachment was removed");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AttachmentPath {
    pub filename: String,
}

impl AttachmentPath {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let path = ctx.attachments().path(&self.filename).await?;
        println!("{}", path.display());
        Ok(())
    }
}
