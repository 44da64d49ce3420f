use anyhow::Result;
use clap::{Args, Subcommand};
use inquire::Confirm;
use rust_decimal::Decimal;

use malman_accounting::{
    datetime,
    inventory::{
        add_stock_category, add_stock_item, bar_log, edit_stock_item, load_stock_levels,
        log_consumption, log_stockup, remove_bar_log_entry, StockItemForm,
    },
    permissions,
};
use malman_data::{
    BarLogEntry, BarLogFilter, Query, Retrieve, Role, StockCategory, StockCategoryFilter,
    StockItem,
};

use crate::config::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Stock {
    /// Show stock levels and what to buy
    #[clap(name = "list")]
    List(ListStock),
    /// Add an item for sale
    #[clap(name = "add")]
    Add(AddStockItem),
    /// Change an item for sale
    #[clap(name = "edit")]
    Edit(EditStockItem),
    /// List stock categories
    #[clap(name = "categories")]
    Categories(ListStockCategories),
    #[clap(name = "add-category")]
    AddCategory(AddStockCategory),
    /// Log bought stock
    #[clap(name = "up")]
    Up(StockUp),
    /// Log what was taken from the bar
    #[clap(name = "consume")]
    Consume(Consume),
    /// Show the bar log
    #[clap(name = "log")]
    Log(ShowBarLog),
    /// Remove an entry from the bar log
    #[clap(name = "remove-entry")]
    RemoveEntry(RemoveBarLogEntry),
}

impl Stock {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Stock::List(cmd) => cmd.run(ctx).await,
            Stock::Add(cmd) => cmd.run(ctx).await,
            Stock::Edit(cmd) => cmd.run(ctx).await,
            Stock::Categories(cmd) => cmd.run(ctx).await,
            Stock::AddCategory(cmd) => cmd.run(ctx).await,
            Stock::Up(cmd) => cmd.run(ctx).await,
            Stock::Consume(cmd) => cmd.run(ctx).await,
            Stock::Log(cmd) => cmd.run(ctx).await,
            Stock::RemoveEntry(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListStock {}

impl ListStock {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let levels = load_stock_levels(&ctx.db).await?;
        levels.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddStockItem {
    #[clap(short, long)]
    pub name: String,
    #[clap(short, long, allow_negative_numbers = true)]
    pub price: Decimal,
    #[clap(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub stock_max: i64,
    #[clap(short, long)]
    pub category: u32,
    #[clap(short, long)]
    pub josto: bool,
}

impl AddStockItem {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let form = StockItemForm {
            name: self.name,
            price: self.price,
            stock_max: self.stock_max,
            category_id: self.category,
            josto: self.josto,
        };
        let item = add_stock_item(&ctx.db, &actor, form).await?;
        println!("{} was added with id {}", item.name, item.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct EditStockItem {
    #[clap(short, long)]
    pub id: u32,
    #[clap(short, long)]
    pub name: Option<String>,
    #[clap(short, long, allow_negative_numbers = true)]
    pub price: Option<Decimal>,
    #[clap(short, long, allow_negative_numbers = true)]
    pub stock_max: Option<i64>,
    #[clap(short, long)]
    pub category: Option<u32>,
    #[clap(short, long)]
    pub josto: Option<bool>,
}

impl EditStockItem {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let item: StockItem = ctx.db.retrieve(self.id).await?;

        let mut form = StockItemForm::from_item(&item);
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(stock_max) = self.stock_max {
            form.stock_max = stock_max;
        }
        if let Some(category) = self.category {
            form.category_id = category;
        }
        if let Some(josto) = self.josto {
            form.josto = josto;
        }
        let item = edit_stock_item(&ctx.db, &actor, item.id, form).await?;
        println!();
        item.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ListStockCategories {}

impl ListStockCategories {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let categories: Vec<StockCategory> =
            ctx.db.query(&StockCategoryFilter::default()).await?;
        categories.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddStockCategory {
    pub name: String,
}

impl AddStockCategory {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let category = add_stock_category(&ctx.db, &actor, &self.name).await?;
        println!("{} was added with id {}", category.name, category.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct StockUp {
    #[clap(short, long)]
    pub item: u32,
    #[clap(short, long)]
    pub amount: u32,
}

impl StockUp {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let entry = log_stockup(&ctx.db, &actor, self.item, self.amount, datetime::now()).await?;
        println!("{} added to the stock (€{:.2})", entry.amount, entry.total_price);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct Consume {
    #[clap(short, long)]
    pub item: u32,
    #[clap(short, long, default_value_t = 1)]
    pub amount: u32,
}

impl Consume {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        let entry =
            log_consumption(&ctx.db, &actor, self.item, self.amount, datetime::now()).await?;
        println!("{} taken for €{:.2}", -entry.amount, entry.total_price);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ShowBarLog {
    #[clap(short, long)]
    pub item: Option<u32>,
    #[clap(short, long)]
    pub member: Option<u32>,
    #[clap(short, long, default_value_t = 1)]
    pub page: usize,
}

impl ShowBarLog {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Member)?;

        let filter = BarLogFilter {
            item_id: self.item,
            member_id: self.member,
            ..Default::default()
        };
        let page = bar_log(&ctx.db, &filter, self.page, ctx.config.items_per_page).await?;
        page.print_formatted();
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct RemoveBarLogEntry {
    #[clap(short, long)]
    pub id: u32,
}

impl RemoveBarLogEntry {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let actor = ctx.actor().await?;
        permissions::require(&actor, Role::Finances)?;

        let entry: BarLogEntry = ctx.db.retrieve(self.id).await?;
        let message = format!(
            "Remove the {} of {} on {}?",
            entry.kind, entry.amount, entry.datetime
        );
        let confirm = Confirm::new(&message).with_default(false);
        if !confirm.prompt()? {
            println!("removing the entry was canceled");
            return Ok(());
        }
        remove_bar_log_entry(&ctx.db, &actor, entry.id).await?;
        println!("the entry was removed");
        Ok(())
    }
}
