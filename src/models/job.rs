use crate::db::collection::{Filter, Sort, SortOrder};
use serde::Deserialize;
use utoipa::IntoParams;

pub const TITLE: &str = "title";
pub const CATEGORY: &str = "category";
pub const DEADLINE: &str = "deadline";
pub const BUYER_EMAIL: &str = "buyer.email";
pub const BID_COUNT: &str = "bid_count";

/// Query string of the filtered job listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobListQuery {
    /// Exact category to match
    pub filter: Option<String>,
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    /// Deadline order: `asc` or `dsc`; anything else keeps natural order
    pub sort: Option<String>,
}

impl JobListQuery {
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            filter = filter.contains_ignore_case(TITLE, search);
        }
        if let Some(category) = self.filter.as_deref().filter(|s| !s.is_empty()) {
            filter = filter.eq(CATEGORY, category);
        }
        filter
    }

    pub fn sort(&self) -> Option<Sort> {
        match self.sort.as_deref() {
            Some("asc") => Some(Sort::new(DEADLINE, SortOrder::Ascending)),
            Some("dsc") | Some("desc") => Some(Sort::new(DEADLINE, SortOrder::Descending)),
            _ => None,
        }
    }
}
