use std::fmt::{self, Write as _};

use super::criteria::{
    CatalogCriteria, MONSTER_CATEGORY, NON_MONSTER_CATEGORIES, PageRequest,
    SortMode,
};

/// Columns selected for every catalog read, in `cards` table order.
pub const CARD_COLUMNS: &str = "id, name, card_type, frame_type, \
    description, race, archetype, reference_url, set_name, set_code, \
    set_rarity, set_price, cardmarket_price, tcgplayer_price, ebay_price, \
    amazon_price, coolstuffinc_price, image_url, attack, defense, level, \
    attribute";

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// Bound as `TEXT`.
    Text(String),
    /// Bound as `BIGINT`; used for the LIMIT/OFFSET window.
    BigInt(i64),
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Text(value) => write!(f, "{value:?}"),
            SqlParam::BigInt(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::BigInt(value)
    }
}

/// A finished catalog statement: SQL text with `$n` placeholders and the
/// values for them, where `params()[i]` binds to `$(i + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    sql: String,
    params: Vec<SqlParam>,
    page: PageRequest,
}

impl CatalogQuery {
    /// The window the LIMIT/OFFSET parameters were derived from.
    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Statement text with `$n` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind values in placeholder order.
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }
}

/// Builds the single bounded statement behind `GET /cartes`.
///
/// Clause order is fixed: name, category, rarity predicates (AND-joined),
/// then at most one ORDER BY, then the LIMIT/OFFSET window. Placeholders are
/// numbered as they are pushed so parameter order always matches.
#[derive(Debug)]
pub struct CatalogQueryBuilder {
    sql: String,
    params: Vec<SqlParam>,
    has_where: bool,
}

impl CatalogQueryBuilder {
    /// Translate criteria, sort mode and page into a [`CatalogQuery`].
    pub fn build(
        criteria: &CatalogCriteria,
        sort: SortMode,
        page: PageRequest,
    ) -> CatalogQuery {
        let mut builder = Self::new();
        builder.apply_filters(criteria);
        builder.apply_sort(sort);
        builder.apply_window(page);
        builder.finish(page)
    }

    fn new() -> Self {
        Self {
            sql: format!("SELECT {CARD_COLUMNS} FROM cards"),
            params: Vec::new(),
            has_where: false,
        }
    }

    fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    fn push_bind(&mut self, value: impl Into<SqlParam>) -> &mut Self {
        self.params.push(value.into());
        // Writing into a String cannot fail.
        let _ = write!(self.sql, "${}", self.params.len());
        self
    }

    fn push_predicate(&mut self) -> &mut Self {
        let joiner = if self.has_where { " AND " } else { " WHERE " };
        self.has_where = true;
        self.push(joiner)
    }

    fn apply_filters(&mut self, criteria: &CatalogCriteria) {
        if let Some(name) = criteria.name.as_deref() {
            self.push_predicate()
                .push("name ILIKE ")
                .push_bind(format!("%{name}%"));
        }

        if let Some(category) = criteria.category.as_deref() {
            if category == MONSTER_CATEGORY {
                let excluded = NON_MONSTER_CATEGORIES
                    .iter()
                    .map(|c| format!("'{c}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.push_predicate()
                    .push("card_type NOT IN (")
                    .push(&excluded)
                    .push(")");
            } else {
                self.push_predicate()
                    .push("card_type = ")
                    .push_bind(category);
            }
        }

        if let Some(rarity) = criteria.rarity.as_deref() {
            self.push_predicate()
                .push("set_rarity = ")
                .push_bind(rarity);
        }
    }

    fn apply_sort(&mut self, sort: SortMode) {
        let order_by = match sort {
            SortMode::Unsorted => return,
            SortMode::Alphabetical => " ORDER BY name ASC",
            SortMode::PriceAscending => " ORDER BY set_price ASC",
            SortMode::PriceDescending => " ORDER BY set_price DESC",
        };
        self.push(order_by);
    }

    fn apply_window(&mut self, page: PageRequest) {
        self.push(" LIMIT ")
            .push_bind(i64::from(page.size()))
            .push(" OFFSET ")
            .push_bind(page.offset());
    }

    fn finish(self, page: PageRequest) -> CatalogQuery {
        CatalogQuery {
            sql: self.sql,
            params: self.params,
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(
        criteria: CatalogCriteria,
        sort: SortMode,
        page: PageRequest,
    ) -> CatalogQuery {
        CatalogQueryBuilder::build(&criteria, sort, page)
    }

    fn build_all(sort: SortMode) -> CatalogQuery {
        build(CatalogCriteria::default(), sort, PageRequest::default())
    }

    #[test]
    fn unconstrained_query_only_windows() {
        let query = build_all(SortMode::Unsorted);
        assert_eq!(
            query.sql(),
            format!("SELECT {CARD_COLUMNS} FROM cards LIMIT $1 OFFSET $2")
        );
        assert_eq!(
            query.params(),
            &[SqlParam::BigInt(27), SqlParam::BigInt(0)]
        );
    }

    #[test]
    fn name_and_category_example() {
        let criteria =
            CatalogCriteria::new(Some("Dragon"), Some("Spell Card"), None);
        let page = PageRequest::new(2, 10);
        let query = build(criteria, SortMode::Unsorted, page);

        assert!(query.sql().ends_with(
            "FROM cards WHERE name ILIKE $1 AND card_type = $2 \
             LIMIT $3 OFFSET $4"
        ));
        assert_eq!(
            query.params(),
            &[
                SqlParam::from("%Dragon%"),
                SqlParam::from("Spell Card"),
                SqlParam::BigInt(10),
                SqlParam::BigInt(10),
            ]
        );
    }

    #[test]
    fn monster_category_excludes_named_categories() {
        let criteria =
            CatalogCriteria::new(None, Some(MONSTER_CATEGORY), Some("Rare"));
        let query = build(criteria, SortMode::Unsorted, PageRequest::default());

        assert!(query.sql().contains(
            " WHERE card_type NOT IN ('Spell Card', 'Trap Card') \
             AND set_rarity = $1 LIMIT $2"
        ));
        assert_eq!(query.params()[0], SqlParam::from("Rare"));
        assert_eq!(query.params().len(), 3);
    }

    #[test]
    fn sort_clauses() {
        let alpha = build_all(SortMode::Alphabetical);
        assert!(alpha.sql().contains(" ORDER BY name ASC LIMIT"));

        let desc = build_all(SortMode::PriceDescending);
        assert!(desc.sql().contains(" ORDER BY set_price DESC LIMIT"));

        let asc = build_all(SortMode::PriceAscending);
        assert!(asc.sql().contains(" ORDER BY set_price ASC LIMIT"));

        let none = build_all(SortMode::Unsorted);
        assert!(!none.sql().contains("ORDER BY"));
    }

    #[test]
    fn filter_values_never_reach_sql_text() {
        let hostile = "'; DROP TABLE cards; --";
        let criteria =
            CatalogCriteria::new(Some(hostile), Some(hostile), Some(hostile));
        let query = build(criteria, SortMode::Unsorted, PageRequest::default());
        assert!(!query.sql().contains("DROP"));
        assert_eq!(query.params().len(), 5);
    }
}
