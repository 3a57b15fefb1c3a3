/// Category token that selects every card that is neither a spell nor a trap.
pub const MONSTER_CATEGORY: &str = "Monster Card";

/// The two named categories; monsters are their complement.
pub const NON_MONSTER_CATEGORIES: [&str; 2] = ["Spell Card", "Trap Card"];

/// Page size applied when the request does not carry a usable one.
pub const DEFAULT_PAGE_SIZE: u32 = 27;

/// Optional filters for a catalog search.
///
/// A `None` field places no constraint on that column. Empty strings are
/// normalised to `None` on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogCriteria {
    /// Case-insensitive substring of the card name.
    pub name: Option<String>,
    /// Exact `card_type`, or [`MONSTER_CATEGORY`] for the complement set.
    pub category: Option<String>,
    /// Exact `set_rarity`.
    pub rarity: Option<String>,
}

impl CatalogCriteria {
    /// Build criteria from raw query-string values.
    pub fn new(
        name: Option<&str>,
        category: Option<&str>,
        rarity: Option<&str>,
    ) -> Self {
        Self {
            name: present(name),
            category: present(category),
            rarity: present(rarity),
        }
    }
}

fn present(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Result ordering. Exactly one mode applies to a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// No ORDER BY; rows come back in whatever order the store yields.
    #[default]
    Unsorted,
    /// `ORDER BY name ASC`.
    Alphabetical,
    /// `ORDER BY set_price ASC`.
    PriceAscending,
    /// `ORDER BY set_price DESC`.
    PriceDescending,
}

impl SortMode {
    /// Resolve the two request flags into a single mode.
    ///
    /// `sortAlphabetical=ASC` wins over any price flag. A price flag of
    /// `DESC` sorts descending; any other non-empty value sorts ascending.
    pub fn from_flags(alphabetical: Option<&str>, price: Option<&str>) -> Self {
        let alphabetical = alphabetical
            .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("ASC"));
        if alphabetical {
            return SortMode::Alphabetical;
        }

        match price.map(str::trim) {
            Some(flag) if flag.eq_ignore_ascii_case("DESC") => {
                SortMode::PriceDescending
            }
            Some(flag) if !flag.is_empty() => SortMode::PriceAscending,
            _ => SortMode::Unsorted,
        }
    }
}

/// Deployment-wide pagination bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    /// Size used when `limit` is missing or unusable.
    pub page_size: u32,
    /// Upper clamp for any requested size.
    pub max_page_size: u32,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 1000,
        }
    }
}

/// A 1-based page number and a page size, both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page from already-valid numbers; zeros are lifted to the
    /// defaults.
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: if size == 0 { DEFAULT_PAGE_SIZE } else { size },
        }
    }

    /// Coerce raw query-string values into a page. Never fails.
    ///
    /// Missing, non-numeric, zero and negative values fall back to page 1
    /// and the configured page size. Sizes above the configured maximum are
    /// clamped.
    pub fn coerce(
        page: Option<&str>,
        limit: Option<&str>,
        defaults: PageDefaults,
    ) -> Self {
        let number = page.and_then(parse_positive).unwrap_or(1);
        let size = limit
            .and_then(parse_positive)
            .unwrap_or(defaults.page_size)
            .min(defaults.max_page_size.max(1));

        Self {
            number,
            size: size.max(1),
        }
    }

    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Rows per page.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Zero-based row offset of the first row on this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.number) - 1).saturating_mul(i64::from(self.size))
    }
}

/// Leading-integer parse in the style of query-string coercion: surrounding
/// whitespace is ignored and trailing garbage after the digits is dropped
/// (`"3abc"` is 3, `"2.5"` is 2). Anything that is not a positive integer is
/// `None`.
fn parse_positive(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.starts_with('-') {
        return None;
    }

    let digits_end = unsigned
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return None;
    }

    match digits.parse::<u32>() {
        Ok(0) => None,
        Ok(value) => Some(value),
        // Too many digits for u32 still means a very large positive number.
        Err(_) => Some(u32::MAX),
    }
}
