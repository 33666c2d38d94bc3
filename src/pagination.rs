use crate::models::{PaginatedStatusResponse, StatusEntry};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Validated `page`/`limit` pair. Any missing, non-numeric or
/// non-positive input falls back to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    let value: i64 = raw?.parse().ok()?;
    u64::try_from(value).ok().filter(|v| *v >= 1)
}

/// Sorts `entries` by url and slices out the requested page.
/// Out-of-range pages yield an empty `data`.
pub fn paginate(mut entries: Vec<StatusEntry>, request: PageRequest) -> PaginatedStatusResponse {
    entries.sort_by(|a, b| a.url.cmp(&b.url));

    let total = entries.len();
    let limit = usize::try_from(request.limit).unwrap_or(usize::MAX).max(1);
    let total_pages = total.div_ceil(limit);

    let skip = usize::try_from(request.page.saturating_sub(1)).unwrap_or(usize::MAX);
    let start = skip.saturating_mul(limit).min(total);
    let end = start.saturating_add(limit).min(total);

    entries.truncate(end);
    let data = entries.split_off(start);

    PaginatedStatusResponse {
        total_pages,
        current_page: request.page,
        data,
    }
}
