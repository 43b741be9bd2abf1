//! Filter predicate builder for listing queries.
//!
//! Present filter fields become store-side equality clauses; the optional
//! search term becomes a client-side substring predicate applied after each
//! fetched batch, because the store only supports equality and range
//! matching. The canonical scope string ties cursors to the exact
//! filter/sort combination that issued them.

use serde_json::Value;

use crate::domain::ports::{Clause, Sort, SortDirection};

/// Sort keys accepted by the business listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Aggregate rating score, the default ordering.
    #[default]
    Rating,
    Name,
    CreatedAt,
}

impl SortField {
    /// Document field the sort applies to.
    pub fn document_field(self) -> &'static str {
        match self {
            Self::Rating => "ratingScore",
            Self::Name => "name",
            Self::CreatedAt => "createdAt",
        }
    }

    /// Parse the wire form used in query strings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "rating" => Some(Self::Rating),
            "name" => Some(Self::Name),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

/// Case-insensitive substring predicate over the searchable text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    const FIELDS: [&'static str; 3] = ["name", "description", "category"];

    /// Normalise a raw term; blank terms become no predicate at all.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    /// Normalised term text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True when any searchable field contains the term.
    pub fn matches(&self, doc: &Value) -> bool {
        Self::FIELDS.iter().any(|field| {
            doc.get(field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&self.0))
        })
    }
}

/// Optional filters and ordering for the business listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessFilter {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub search_term: Option<String>,
    pub sort_by: SortField,
    pub sort_direction: SortDirection,
}

/// Optional filters for the post feed, always ordered by creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub sort_direction: SortDirection,
}

/// Ordered query produced by the builder: equality clauses first, then the
/// sort, then the post-fetch search predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub clauses: Vec<Clause>,
    pub sort: Sort,
    pub search: Option<SearchTerm>,
}

impl BuiltQuery {
    /// Canonical rendering of the filter/sort combination.
    ///
    /// Cursors embed this string; presenting a cursor under a different
    /// scope is rejected instead of yielding undefined pages.
    pub fn scope(&self) -> String {
        let mut parts: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let value = clause
                    .value
                    .as_str()
                    .map_or_else(|| clause.value.to_string(), str::to_owned);
                format!("{}={value}", clause.field)
            })
            .collect();
        parts.push(format!(
            "sort={}:{}",
            self.sort.field,
            self.sort.direction.as_str()
        ));
        if let Some(term) = &self.search {
            parts.push(format!("q={}", term.as_str()));
        }
        parts.join("&")
    }
}

fn equality_clauses(
    category: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
) -> Vec<Clause> {
    let mut clauses = Vec::new();
    if let Some(category) = category {
        clauses.push(Clause::eq("category", category));
    }
    if let Some(city) = city {
        clauses.push(Clause::eq("city", city));
    }
    if let Some(state) = state {
        clauses.push(Clause::eq("state", state));
    }
    clauses
}

impl BusinessFilter {
    /// Turn the filter set into an ordered clause list.
    ///
    /// Absent fields contribute nothing — no clause, not a wildcard.
    pub fn build(&self) -> BuiltQuery {
        BuiltQuery {
            clauses: equality_clauses(
                self.category.as_deref(),
                self.city.as_deref(),
                self.state.as_deref(),
            ),
            sort: Sort {
                field: self.sort_by.document_field(),
                direction: self.sort_direction,
            },
            search: self.search_term.as_deref().and_then(SearchTerm::new),
        }
    }
}

impl PostFilter {
    /// Turn the filter set into an ordered clause list.
    pub fn build(&self) -> BuiltQuery {
        BuiltQuery {
            clauses: equality_clauses(
                self.category.as_deref(),
                self.city.as_deref(),
                self.state.as_deref(),
            ),
            sort: Sort {
                field: "createdAt",
                direction: self.sort_direction,
            },
            search: None,
        }
    }
}
