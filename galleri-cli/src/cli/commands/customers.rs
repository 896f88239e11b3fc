//! Create, update, and delete command handlers

use anyhow::{Result, bail};
use colored::*;
use dialoguer::Confirm;

use crate::cli::CustomerArgs;
use crate::model::CustomerDraft;
use crate::store::{CustomerStore, StoreError};

impl CustomerArgs {
    fn to_draft(&self) -> CustomerDraft {
        CustomerDraft {
            customer_no: self.customer_no.trim().to_string(),
            status: self.status,
            company_name: self.company.trim().to_string(),
            address: self.address.clone(),
            postal_code: self.postal_code.clone(),
            city: self.city.clone(),
            phone: self.phone.clone(),
            visit_booked: self.visit_booked,
            notes: self.notes.clone(),
        }
    }
}

fn validate(draft: &CustomerDraft) -> Result<()> {
    if draft.customer_no.is_empty() {
        bail!("Customer number must not be empty");
    }
    if draft.company_name.is_empty() {
        bail!("Company name must not be empty");
    }
    Ok(())
}

pub async fn handle_create(store: &dyn CustomerStore, args: CustomerArgs) -> Result<()> {
    let draft = args.to_draft();
    validate(&draft)?;

    match store.insert_customer(&draft).await {
        Ok(id) => {
            println!(
                "{} customer {} ({})",
                "Created".green(),
                draft.customer_no.bold(),
                id
            );
            Ok(())
        }
        Err(StoreError::UniqueViolation) => {
            bail!("Customer number {} already exists", draft.customer_no)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn handle_update(store: &dyn CustomerStore, id: &str, args: CustomerArgs) -> Result<()> {
    let draft = args.to_draft();
    validate(&draft)?;

    match store.update_customer(id, &draft).await {
        Ok(()) => {
            println!("{} customer {}", "Updated".green(), draft.customer_no.bold());
            Ok(())
        }
        Err(StoreError::NotFound(_)) => bail!("No customer with id {}", id),
        Err(StoreError::UniqueViolation) => {
            bail!("Customer number {} already exists", draft.customer_no)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn handle_delete(store: &dyn CustomerStore, id: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete customer {} and all its contacts and sales?",
                id
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    match store.delete_customer(id).await {
        Ok(()) => {
            println!("{} customer {}", "Deleted".red(), id);
            Ok(())
        }
        Err(StoreError::NotFound(_)) => bail!("No customer with id {}", id),
        Err(e) => Err(e.into()),
    }
}
