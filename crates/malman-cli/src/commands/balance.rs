use anyhow::Result;
use clap::Args;

use malman_accounting::{balance::load_balances, permissions};
use malman_data::Role;

use crate::config::Context;
use crate::formatting::PrintFormatted;

#[derive(Args, Debug)]
pub struct Balance {
    /// Print as JSON
    #[clap(long)]
    pub json: bool,
}

impl Balance {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let balances = load_balances(&ctx.db).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&balances)?);
        } else {
            balances.print_formatted();
        }
        Ok(())
    }
}
