//! Card records and catalog search.
//!
//! [`CatalogQueryBuilder`] is the only place that decides how a search
//! request becomes SQL. It performs no I/O; the resulting [`CatalogQuery`] is
//! handed to a [`CatalogRepository`](crate::database::ports::CatalogRepository)
//! for execution.

/// The card record and its JSON shape
pub mod card;
/// Filters, sort mode and page window
pub mod criteria;
/// SQL generation
pub mod query;

pub use card::{Card, CardFields};
pub use criteria::{
    CatalogCriteria, DEFAULT_PAGE_SIZE, MONSTER_CATEGORY,
    NON_MONSTER_CATEGORIES, PageDefaults, PageRequest, SortMode,
};
pub use query::{CARD_COLUMNS, CatalogQuery, CatalogQueryBuilder, SqlParam};
