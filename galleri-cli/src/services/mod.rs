//! Client-side services over the fetched customer collection

pub mod listing;
