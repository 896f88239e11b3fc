//! Filtering, sorting, and pagination over the in-memory customer listing
//!
//! The whole collection is fetched up front; everything here is a pure
//! function over that collection.

use crate::model::CustomerRecord;

/// Allowed page sizes; anything else falls back to the default
pub const PAGE_SIZES: &[usize] = &[12, 24, 48, 96];
pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    Company,
    CustomerNo,
    City,
    Status,
    VisitBooked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Case-insensitive substring match against company name, customer number,
/// city, and phone. An empty term matches everything.
pub fn filter<'a>(records: &'a [CustomerRecord], term: &str) -> Vec<&'a CustomerRecord> {
    let term = term.trim().to_lowercase();
    records
        .iter()
        .filter(|record| {
            if term.is_empty() {
                return true;
            }
            let c = &record.customer;
            let mut haystacks = vec![c.company_name.as_str(), c.customer_no.as_str()];
            if let Some(city) = &c.city {
                haystacks.push(city);
            }
            if let Some(phone) = &c.phone {
                haystacks.push(phone);
            }
            haystacks.iter().any(|h| h.to_lowercase().contains(&term))
        })
        .collect()
}

/// Sort in place. Status sorts by activity rank rather than lexically;
/// the visit flag ranks false before true; everything else compares as
/// case-insensitive strings with missing values as empty.
pub fn sort(records: &mut [&CustomerRecord], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match field {
            SortField::Status => status_rank(a).cmp(&status_rank(b)),
            SortField::VisitBooked => a
                .customer
                .visit_booked
                .cmp(&b.customer.visit_booked),
            _ => sort_text(a, field).cmp(&sort_text(b, field)),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn status_rank(record: &CustomerRecord) -> u8 {
    record.customer.status.rank()
}

fn sort_text(record: &CustomerRecord, field: SortField) -> String {
    let c = &record.customer;
    match field {
        SortField::Company => c.company_name.to_lowercase(),
        SortField::CustomerNo => c.customer_no.to_lowercase(),
        SortField::City => c.city.as_deref().unwrap_or("").to_lowercase(),
        SortField::Status | SortField::VisitBooked => String::new(),
    }
}

/// One page of the listing
#[derive(Debug)]
pub struct Page<'a> {
    pub items: &'a [&'a CustomerRecord],
    /// Clamped 1-based page number
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based index of the first item shown (0 when empty)
    pub start: usize,
    /// 1-based index of the last item shown
    pub end: usize,
}

/// Slice out one page. The requested page is clamped to the valid range and
/// unknown page sizes fall back to the default.
pub fn paginate<'a>(records: &'a [&'a CustomerRecord], page: usize, per_page: usize) -> Page<'a> {
    let per_page = if PAGE_SIZES.contains(&per_page) {
        per_page
    } else {
        DEFAULT_PAGE_SIZE
    };

    let total_items = records.len();
    let total_pages = std::cmp::max(1, total_items.div_ceil(per_page));
    let page = page.clamp(1, total_pages);

    let start_index = (page - 1) * per_page;
    let end_index = std::cmp::min(start_index + per_page, total_items);

    Page {
        items: &records[start_index.min(total_items)..end_index],
        page,
        total_pages,
        total_items,
        start: if total_items == 0 { 0 } else { start_index + 1 },
        end: end_index,
    }
}
