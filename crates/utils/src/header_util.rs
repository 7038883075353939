//! Response headers the web client reads to show toasts and drive pagination.
//!
//! Alerts are `X-{app}-alert: {app}.{entity}.{action}` with the affected key in
//! `X-{app}-params`; failures use `X-{app}-error` instead.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityAction {
    Created,
    Updated,
    Deleted,
}

impl EntityAction {
    fn as_str(self) -> &'static str {
        match self {
            EntityAction::Created => "created",
            EntityAction::Updated => "updated",
            EntityAction::Deleted => "deleted",
        }
    }
}

fn insert(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::try_from(name),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => warn!(name, value, "Skipping header that is not valid HTTP"),
    }
}

pub fn alert(app_name: &str, message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, &format!("X-{app_name}-alert"), message);
    insert(&mut headers, &format!("X-{app_name}-params"), param);
    headers
}

pub fn entity_alert(app_name: &str, action: EntityAction, entity_name: &str, key: &str) -> HeaderMap {
    alert(
        app_name,
        &format!("{app_name}.{entity_name}.{}", action.as_str()),
        key,
    )
}

pub fn failure_alert(app_name: &str, entity_name: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(
        &mut headers,
        &format!("X-{app_name}-error"),
        &format!("error.{error_key}"),
    );
    insert(&mut headers, &format!("X-{app_name}-params"), entity_name);
    headers
}

/// `X-Total-Count` plus an RFC 5988 `Link` header for a page of `size` items.
pub fn pagination(base_path: &str, total_elements: i64, page: u32, size: u32) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, TOTAL_COUNT_HEADER, &total_elements.to_string());

    let total_pages = if size == 0 {
        0
    } else {
        u32::try_from((total_elements.max(0) as u64).div_ceil(u64::from(size))).unwrap_or(u32::MAX)
    };
    let last_page = total_pages.saturating_sub(1);
    let link = |target: u32, rel: &str| {
        format!("<{base_path}?page={target}&size={size}>; rel=\"{rel}\"")
    };

    let mut links = Vec::new();
    if let Some(next) = page.checked_add(1).filter(|next| *next < total_pages) {
        links.push(link(next, "next"));
    }
    // Past the end, prev points back at the last real page.
    if page > 0 {
        links.push(link((page - 1).min(last_page), "prev"));
    }
    links.push(link(last_page, "last"));
    links.push(link(0, "first"));
    insert(&mut headers, "Link", &links.join(","));

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_alert() {
        let headers = entity_alert("hrApp", EntityAction::Created, "job", "7");
        assert_eq!(headers["x-hrapp-alert"], "hrApp.job.created");
        assert_eq!(headers["x-hrapp-params"], "7");
    }

    #[test]
    fn test_failure_alert() {
        let headers = failure_alert("hrApp", "region", "idexists");
        assert_eq!(headers["x-hrapp-error"], "error.idexists");
        assert_eq!(headers["x-hrapp-params"], "region");
    }

    #[test]
    fn test_pagination_middle_page() {
        let headers = pagination("/api/jobs", 45, 1, 20);
        assert_eq!(headers[TOTAL_COUNT_HEADER], "45");
        let link = headers["link"].to_str().unwrap();
        assert_eq!(
            link,
            "</api/jobs?page=2&size=20>; rel=\"next\",\
             </api/jobs?page=0&size=20>; rel=\"prev\",\
             </api/jobs?page=2&size=20>; rel=\"last\",\
             </api/jobs?page=0&size=20>; rel=\"first\""
        );
    }

    #[test]
    fn test_pagination_past_the_end() {
        let headers = pagination("/api/jobs", 45, 9, 20);
        let link = headers["link"].to_str().unwrap();
        assert!(!link.contains("rel=\"next\""));
        assert!(link.contains("</api/jobs?page=2&size=20>; rel=\"prev\""));
        assert!(link.contains("</api/jobs?page=2&size=20>; rel=\"last\""));
    }

    #[test]
    fn test_pagination_max_page() {
        let headers = pagination("/api/jobs", 45, u32::MAX, 20);
        assert_eq!(headers[TOTAL_COUNT_HEADER], "45");
        let link = headers["link"].to_str().unwrap();
        assert!(!link.contains("rel=\"next\""));
        assert!(link.contains("</api/jobs?page=2&size=20>; rel=\"prev\""));
        assert!(link.contains("</api/jobs?page=0&size=20>; rel=\"first\""));
    }

    #[test]
    fn test_pagination_empty() {
        let headers = pagination("/api/regions", 0, 0, 20);
        assert_eq!(headers[TOTAL_COUNT_HEADER], "0");
        let link = headers["link"].to_str().unwrap();
        assert!(!link.contains("rel=\"next\""));
        assert!(!link.contains("rel=\"prev\""));
        assert!(link.contains("</api/regions?page=0&size=20>; rel=\"last\""));
    }
}
