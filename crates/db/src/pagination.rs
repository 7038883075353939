//! Page requests and sorted page results for the list endpoints.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Error, PartialEq)]
pub enum PageableError {
    #[error("unknown sort property '{0}'")]
    UnknownProperty(String),
    #[error("empty sort expression")]
    EmptySort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Raw paging parameters as they arrive on the query string:
/// `?page=0&size=20&sort=jobTitle,desc&sort=id`
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct Pageable {
    pub page: Option<u32>,
    pub size: Option<u32>,
    #[serde(default)]
    pub sort: Vec<String>,
}

/// A validated page request; every column in `orders` comes from an entity's whitelist.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub orders: Vec<SortOrder>,
}

impl Pageable {
    /// Resolve the request against `sortable`, a list of (json property, column) pairs.
    pub fn resolve(
        &self,
        sortable: &[(&str, &'static str)],
        default_size: u32,
        max_size: u32,
    ) -> Result<PageRequest, PageableError> {
        let size = match self.size {
            Some(size) if size > 0 => size.min(max_size),
            _ => default_size,
        };

        let mut orders = Vec::new();
        for expression in &self.sort {
            let mut parts: Vec<&str> = expression
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();

            let direction = match parts.last().and_then(|p| p.parse::<SortDirection>().ok()) {
                Some(direction) => {
                    parts.pop();
                    direction
                }
                None => SortDirection::Asc,
            };
            if parts.is_empty() {
                return Err(PageableError::EmptySort);
            }

            for property in parts {
                let column = sortable
                    .iter()
                    .find(|(name, _)| *name == property)
                    .map(|(_, column)| *column)
                    .ok_or_else(|| PageableError::UnknownProperty(property.to_string()))?;
                orders.push(SortOrder { column, direction });
            }
        }

        Ok(PageRequest {
            page: self.page.unwrap_or(0),
            size,
            orders,
        })
    }
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// ORDER BY body; `id` always closes the list so pages are stable.
    pub fn order_by_clause(&self) -> String {
        let mut terms: Vec<String> = self
            .orders
            .iter()
            .map(|order| format!("{} {}", order.column, order.direction))
            .collect();
        if !self.orders.iter().any(|order| order.column == "id") {
            terms.push("id ASC".to_string());
        }
        terms.join(", ")
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub page: u32,
    pub size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: &[(&str, &str)] = &[("id", "id"), ("jobTitle", "job_title")];

    fn pageable(sort: &[&str]) -> Pageable {
        Pageable {
            page: None,
            size: None,
            sort: sort.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_defaults_sort_by_id() {
        let request = pageable(&[]).resolve(SORTABLE, 20, 100).unwrap();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 20);
        assert_eq!(request.order_by_clause(), "id ASC");
    }

    #[test]
    fn test_sort_with_direction() {
        let request = pageable(&["jobTitle,desc"]).resolve(SORTABLE, 20, 100).unwrap();
        assert_eq!(request.order_by_clause(), "job_title DESC, id ASC");

        let request = pageable(&["id,desc"]).resolve(SORTABLE, 20, 100).unwrap();
        assert_eq!(request.order_by_clause(), "id DESC");
    }

    #[test]
    fn test_sort_defaults_to_ascending() {
        let request = pageable(&["jobTitle"]).resolve(SORTABLE, 20, 100).unwrap();
        assert_eq!(
            request.orders,
            vec![SortOrder {
                column: "job_title",
                direction: SortDirection::Asc
            }]
        );
    }

    #[test]
    fn test_unknown_property_rejected() {
        let err = pageable(&["salary; DROP TABLE job"])
            .resolve(SORTABLE, 20, 100)
            .unwrap_err();
        assert_eq!(
            err,
            PageableError::UnknownProperty("salary; DROP TABLE job".to_string())
        );
    }

    #[test]
    fn test_direction_only_rejected() {
        assert_eq!(
            pageable(&["desc"]).resolve(SORTABLE, 20, 100).unwrap_err(),
            PageableError::EmptySort
        );
    }

    #[test]
    fn test_size_is_capped() {
        let mut p = pageable(&[]);
        p.size = Some(5000);
        p.page = Some(3);
        let request = p.resolve(SORTABLE, 20, 100).unwrap();
        assert_eq!(request.size, 100);
        assert_eq!(request.offset(), 300);

        p.size = Some(0);
        assert_eq!(p.resolve(SORTABLE, 20, 100).unwrap().size, 20);
    }
}
