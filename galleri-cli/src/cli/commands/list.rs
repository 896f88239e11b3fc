//! List command handler

use anyhow::{Context, Result};
use colored::*;

use crate::cli::ListArgs;
use crate::model::ActiveStatus;
use crate::services::listing;
use crate::store::CustomerStore;

pub async fn handle_list(store: &dyn CustomerStore, args: ListArgs) -> Result<()> {
    let records = store
        .list_customers()
        .await
        .context("Failed to fetch customers")?;

    let mut visible = listing::filter(&records, &args.search);
    listing::sort(&mut visible, args.sort_by, args.order);
    let page = listing::paginate(&visible, args.page, args.per_page);

    if page.total_items == 0 {
        if args.search.trim().is_empty() {
            println!("{}", "No customers yet.".dimmed());
        } else {
            println!("{}", "No customers matched the search.".dimmed());
        }
        return Ok(());
    }

    for record in page.items {
        let c = &record.customer;
        let status = match c.status {
            ActiveStatus::Fully => c.status.as_code().green(),
            ActiveStatus::Partially => c.status.as_code().yellow(),
            ActiveStatus::Inactive => c.status.as_code().dimmed(),
        };

        let mut line = format!(
            "{:<8} {} [{}]",
            c.customer_no,
            c.company_name.bold(),
            status
        );
        if let Some(city) = &c.city {
            line.push_str(&format!("  {}", city));
        }
        if let Some(phone) = &c.phone {
            line.push_str(&format!("  {}", phone.dimmed()));
        }
        if c.visit_booked {
            line.push_str(&format!("  {}", "visit booked".cyan()));
        }
        if !record.contacts.is_empty() || !record.sales.is_empty() {
            line.push_str(&format!(
                "  {}",
                format!(
                    "({} contacts, {} sales)",
                    record.contacts.len(),
                    record.sales.len()
                )
                .dimmed()
            ));
        }
        println!("{}", line);
        println!("         {}", format!("id: {}", c.id).dimmed());
    }

    println!();
    println!(
        "Showing {}-{} of {} customers (page {} of {})",
        page.start, page.end, page.total_items, page.page, page.total_pages
    );

    Ok(())
}
