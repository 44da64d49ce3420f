use malman_accounting::{
    balance::Balances,
    changes::Shown,
    inventory::StockLevel,
    ledger::{Dagboek, Kasboek},
};
use malman_data::{
    Bank, BarLogEntry, CashTransaction, Category, Member, MembershipFee, Page, StockCategory,
    StockItem, Transaction,
};

pub trait PrintFormatted {
    fn print_formatted(&self);
}

fn revenue_or_expense(is_revenue: bool) -> &'static str {
    if is_revenue {
        "revenue"
    } else {
        "expense"
    }
}

fn roles(member: &Member) -> String {
    member
        .roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl PrintFormatted for Member {
    fn print_formatted(&self) {
        println!("Name:\t\t\t{}", self.name);
        println!("Email:\t\t\t{}", self.email);
        println!("Active:\t\t\t{}", self.active_member);
        println!("Member since:\t\t{}", self.member_since.shown());
        println!("Dues:\t\t\t{}", self.membership_dues);
        println!("Roles:\t\t\t{}", roles(self));
    }
}

impl PrintFormatted for Vec<Member> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<24}\t{:<30}\t{:<12}\t{:>8}\t{:<6}\t{}",
            "ID", "Name", "Email", "Since", "Dues", "Active", "Roles"
        );
        println!("{:-<120}", "-");
        for member in self {
            let active = if member.active_member { "*" } else { "" };
            println!(
                "{:>4}\t{:<24}\t{:<30}\t{:<12}\t{:>8.2}\t{:<6}\t{}",
                member.id,
                member.name,
                member.email,
                member.member_since.shown(),
                member.membership_dues,
                active,
                roles(member),
            );
        }
    }
}

impl PrintFormatted for Vec<Bank> {
    fn print_formatted(&self) {
        println!("{:>4}\t{}", "ID", "Name");
        println!("{:-<40}", "-");
        for bank in self {
            println!("{:>4}\t{}", bank.id, bank.name);
        }
    }
}

impl PrintFormatted for Vec<Category> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<30}\t{:<30}\t{:<8}\t{}",
            "ID", "Name", "Legal category", "Type", "Purpose"
        );
        println!("{:-<100}", "-");
        for category in self {
            println!(
                "{:>4}\t{:<30}\t{:<30}\t{:<8}\t{}",
                category.id,
                category.name,
                category.legal_category,
                revenue_or_expense(category.is_revenue),
                category.purpose,
            );
        }
    }
}

impl PrintFormatted for Transaction {
    fn print_formatted(&self) {
        println!("Date:\t\t\t{}", self.date.shown());
        println!("Facturation date:\t{}", self.facturation_date.shown());
        println!("Type:\t\t\t{}", revenue_or_expense(self.is_revenue));
        println!("Amount:\t\t\t{}", self.amount);
        println!("Description:\t\t{}", self.description);
        println!("To/from:\t\t{}", self.to_from);
        println!("Category:\t\t{}", self.category_id.shown());
        println!("Bank:\t\t\t{}", self.bank_id.shown());
        println!("Statement:\t\t{}", self.bank_statement_number.shown());
        println!("Filed:\t\t\t{}", self.date_filed.shown());
        if let Some(advance_date) = self.advance_date {
            println!("Advanced on:\t\t{}", advance_date);
        }
        if let Some(comments) = &self.reimbursement_comments {
            println!("Comments:\t\t{}", comments);
        }
    }
}

fn print_transactions(transactions: &[Transaction]) {
    println!(
        "{:>4}\t{:<12}\t{:>10}\t{:<24}\t{:>5}\t{}",
        "ID", "Date", "Amount", "To/from", "Stmt", "Description"
    );
    println!("{:-<120}", "-");
    for tx in transactions {
        println!(
            "{:>4}\t{:<12}\t{:>10.2}\t{:<24}\t{:>5}\t{}",
            tx.id,
            tx.date.or(tx.advance_date).shown(),
            tx.amount,
            tx.to_from,
            tx.bank_statement_number.shown(),
            tx.description,
        );
    }
}

fn print_page_footer<T>(page: &Page<T>) {
    println!("{:-<120}", "-");
    println!("page {} of {} ({} items)", page.page, page.pages(), page.total);
}

impl PrintFormatted for Vec<Transaction> {
    fn print_formatted(&self) {
        print_transactions(self);
    }
}

impl PrintFormatted for Page<Transaction> {
    fn print_formatted(&self) {
        print_transactions(&self.items);
        print_page_footer(self);
    }
}

impl PrintFormatted for Page<MembershipFee> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:>6}\t{:>11}\t{:<12}", "ID", "Member", "Transaction", "Until");
        println!("{:-<120}", "-");
        for fee in &self.items {
            println!(
                "{:>4}\t{:>6}\t{:>11}\t{:<12}",
                fee.id, fee.member_id, fee.transaction_id, fee.until
            );
        }
        print_page_footer(self);
    }
}

impl PrintFormatted for Page<CashTransaction> {
    fn print_formatted(&self) {
        println!("{:>4}\t{:<12}\t{:>10}\t{}", "ID", "Date", "Amount", "Description");
        println!("{:-<120}", "-");
        for entry in &self.items {
            println!(
                "{:>4}\t{:<12}\t{:>10.2}\t{}",
                entry.id, entry.date, entry.amount, entry.description
            );
        }
        print_page_footer(self);
    }
}

impl PrintFormatted for StockItem {
    fn print_formatted(&self) {
        println!("Name:\t\t\t{}", self.name);
        println!("Price:\t\t\t{:.2}", self.price);
        println!("Stock maximum:\t\t{}", self.stock_max);
        println!("Category:\t\t{}", self.category_id);
        println!("Josto:\t\t\t{}", self.josto);
    }
}

impl PrintFormatted for Vec<StockLevel> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<24}\t{:>8}\t{:>6}\t{:>6}\t{:>8}\t{}",
            "ID", "Name", "Price", "Stock", "Max", "Stockup", "Josto"
        );
        println!("{:-<90}", "-");
        for level in self {
            let josto = if level.item.josto { "*" } else { "" };
            println!(
                "{:>4}\t{:<24}\t{:>8.2}\t{:>6}\t{:>6}\t{:>8}\t{}",
                level.item.id,
                level.item.name,
                level.item.price,
                level.stock,
                level.item.stock_max,
                level.stockup(),
                josto,
            );
        }
    }
}

impl PrintFormatted for Vec<StockCategory> {
    fn print_formatted(&self) {
        println!("{:>4}\t{}", "ID", "Name");
        println!("{:-<40}", "-");
        for category in self {
            println!("{:>4}\t{}", category.id, category.name);
        }
    }
}

impl PrintFormatted for Page<BarLogEntry> {
    fn print_formatted(&self) {
        println!(
            "{:>4}\t{:<20}\t{:>5}\t{:>6}\t{:>10}\t{:>6}\t{}",
            "ID", "When", "Item", "Amount", "Price", "Member", "Kind"
        );
        println!("{:-<120}", "-");
        for entry in &self.items {
            println!(
                "{:>4}\t{:<20}\t{:>5}\t{:>6}\t{:>10.2}\t{:>6}\t{}",
                entry.id,
                entry.datetime.format("%Y-%m-%d %H:%M"),
                entry.item_id,
                entry.amount,
                entry.total_price,
                entry.member_id,
                entry.kind,
            );
        }
        print_page_footer(self);
    }
}

impl PrintFormatted for Balances {
    fn print_formatted(&self) {
        for balance in &self.banks {
            println!("{:<24}\t{:>12.2}", balance.bank.name, balance.balance);
        }
        println!("{:<24}\t{:>12.2}", "Cash", self.cash);
        println!("{:-<40}", "-");
        println!("{:<24}\t{:>12.2}", "Total", self.total());
    }
}

impl PrintFormatted for Dagboek {
    fn print_formatted(&self) {
        let years: Vec<String> = self.years.iter().map(|y| y.to_string()).collect();
        println!(
            "Dagboek {} {} (years: {})",
            self.kind,
            self.year.shown(),
            years.join(", ")
        );

        let mut header = format!("{:>4}\t{:<12}\t{:<30}\t{:>10}", "ID", "Date", "Description", "Amount");
        for bank in &self.banks {
            header.push_str(&format!("\t{:>4}\t{:>10}", "Nr", bank.name));
        }
        for category in &self.categories {
            header.push_str(&format!("\t{:>12}", category));
        }
        println!("{}", header);
        println!("{:-<160}", "-");

        for row in &self.rows {
            let mut line = format!(
                "{:>4}\t{:<12}\t{:<30}\t{:>10.2}",
                row.id, row.facturation_date, row.description, row.amount
            );
            for bank in &self.banks {
                line.push_str(&format!(
                    "\t{:>4}\t{:>10}",
                    row.number(bank).map(|n| n.to_string()).unwrap_or_default(),
                    row.bank_amount(bank).map(|a| format!("{:.2}", a)).unwrap_or_default(),
                ));
            }
            for category in &self.categories {
                line.push_str(&format!(
                    "\t{:>12}",
                    row.category_amount(category)
                        .map(|a| format!("{:.2}", a))
                        .unwrap_or_default(),
                ));
            }
            println!("{}", line);
        }
    }
}

impl PrintFormatted for Kasboek {
    fn print_formatted(&self) {
        let years: Vec<String> = self.years.iter().map(|y| y.to_string()).collect();
        println!(
            "Kasboek {} {} (years: {})",
            self.bank.name,
            self.year.shown(),
            years.join(", ")
        );
        print_transactions(&self.transactions);
        println!("{:-<120}", "-");
        println!("Total:\t{:.2}", self.total());
    }
}
