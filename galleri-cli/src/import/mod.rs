//! Spreadsheet import pipeline
//!
//! reader (workbook -> raw rows) -> mapper (raw row -> drafts) ->
//! batch (drafts -> active store, failure tolerant). The mapper and date
//! normalizer are pure; only the batch step touches the store.

pub mod batch;
pub mod columns;
pub mod date;
pub mod mapper;
pub mod reader;
