//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use pagination::{DEFAULT_PAGE_SIZE, PageRequest};

use crate::domain::filter::SortField;
use crate::domain::{Error, ports::SortDirection};

/// Validation error codes surfaced in the `details.code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidPageSize,
    InvalidSortField,
    InvalidSortDirection,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidPageSize => "invalid_page_size",
            ErrorCode::InvalidSortField => "invalid_sort_field",
            ErrorCode::InvalidSortDirection => "invalid_sort_direction",
        }
    }
}

fn field_error(field: &str, message: String, code: ErrorCode, value: Option<&str>) -> Error {
    let mut details = json!({ "field": field, "code": code.as_str() });
    if let (Some(value), Some(fields)) = (value, details.as_object_mut()) {
        fields.insert("value".to_owned(), json!(value));
    }
    Error::invalid_request(message).with_details(details)
}

/// Build a page request from query parameters, applying the default size.
pub(crate) fn parse_page_request(
    page_size: Option<usize>,
    cursor: Option<String>,
) -> Result<PageRequest, Error> {
    let size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    PageRequest::new(size, cursor).map_err(|_| {
        field_error(
            "pageSize",
            "pageSize must be a positive integer".to_owned(),
            ErrorCode::InvalidPageSize,
            None,
        )
    })
}

/// Parse the `sortBy` query value into a sort field.
pub(crate) fn parse_sort_field(value: Option<&str>) -> Result<SortField, Error> {
    match value {
        None => Ok(SortField::default()),
        Some(raw) => SortField::parse(raw).ok_or_else(|| {
            field_error(
                "sortBy",
                "sortBy must be one of rating, name, createdAt".to_owned(),
                ErrorCode::InvalidSortField,
                Some(raw),
            )
        }),
    }
}

/// Parse the `sortDirection` query value.
pub(crate) fn parse_sort_direction(value: Option<&str>) -> Result<SortDirection, Error> {
    match value {
        None => Ok(SortDirection::default()),
        Some("asc") => Ok(SortDirection::Asc),
        Some("desc") => Ok(SortDirection::Desc),
        Some(raw) => Err(field_error(
            "sortDirection",
            "sortDirection must be asc or desc".to_owned(),
            ErrorCode::InvalidSortDirection,
            Some(raw),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn page_request_defaults_to_ten() {
        let request = parse_page_request(None, None).expect("valid");
        assert_eq!(request.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn zero_page_size_is_a_client_error() {
        let err = parse_page_request(Some(0), None).expect_err("rejected");
        assert_eq!(
            err.details().and_then(|d| d.get("code")),
            Some(&serde_json::json!("invalid_page_size"))
        );
    }

    #[rstest]
    #[case(None, SortField::Rating)]
    #[case(Some("rating"), SortField::Rating)]
    #[case(Some("name"), SortField::Name)]
    #[case(Some("createdAt"), SortField::CreatedAt)]
    fn sort_fields_parse(#[case] raw: Option<&str>, #[case] expected: SortField) {
        assert_eq!(parse_sort_field(raw).expect("valid"), expected);
    }

    #[test]
    fn unknown_sort_field_is_rejected_with_the_offending_value() {
        let err = parse_sort_field(Some("popularity")).expect_err("rejected");
        assert_eq!(
            err.details().and_then(|d| d.get("value")),
            Some(&serde_json::json!("popularity"))
        );
    }

    #[rstest]
    #[case(None, SortDirection::Desc)]
    #[case(Some("asc"), SortDirection::Asc)]
    #[case(Some("desc"), SortDirection::Desc)]
    fn sort_directions_parse(#[case] raw: Option<&str>, #[case] expected: SortDirection) {
        assert_eq!(parse_sort_direction(raw).expect("valid"), expected);
    }
}
