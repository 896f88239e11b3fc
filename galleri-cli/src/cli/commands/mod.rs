//! Command handlers

mod customers;
mod import;
mod list;

pub use customers::{handle_create, handle_delete, handle_update};
pub use import::handle_import;
pub use list::handle_list;
