use chrono::NaiveDateTime;
use engine_logging::engine_warn;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::DirectoryEntry;

/// Format of the `title` attribute on a listing's date cell.
pub const LISTING_DATE_FORMAT: &str = "%b %d %Y %I:%M:%S %p";

const ROW_SELECTOR: &str = "#flisttable tr";
const LINK_SELECTOR: &str = "a";
const DATE_CELL_SELECTOR: &str = ".tdright";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("invalid listing base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("invalid selector {css}: {message}")]
    Selector { css: &'static str, message: String },
}

/// Parsed listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Entries in page order.
    pub entries: Vec<DirectoryEntry>,
    /// Rows that had a link and a date cell but an unusable date or href.
    pub malformed_rows: usize,
}

/// Extract `(name, absolute url, modified_at)` rows from a directory listing.
///
/// Rows without both a link and a date cell are ignored. A row whose date
/// does not parse, or whose href cannot be resolved, is skipped and counted
/// in [`ListingPage::malformed_rows`]; the rest of the page is kept.
pub fn parse_listing(html: &str, base_url: &str) -> Result<ListingPage, ListingError> {
    let base = Url::parse(base_url).map_err(|err| ListingError::InvalidBaseUrl {
        url: base_url.to_string(),
        message: err.to_string(),
    })?;
    let selectors = ListingSelectors::new()?;
    let document = Html::parse_document(html);

    let mut page = ListingPage::default();
    for row in document.select(&selectors.row) {
        let Some((link, date_cell)) = selectors.row_parts(row) else {
            continue;
        };
        match parse_row(link, date_cell, &base) {
            Ok(entry) => page.entries.push(entry),
            Err(reason) => {
                engine_warn!("Skipping listing row on {}: {}", base_url, reason);
                page.malformed_rows += 1;
            }
        }
    }
    Ok(page)
}

struct ListingSelectors {
    row: Selector,
    link: Selector,
    date_cell: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self, ListingError> {
        Ok(Self {
            row: selector(ROW_SELECTOR)?,
            link: selector(LINK_SELECTOR)?,
            date_cell: selector(DATE_CELL_SELECTOR)?,
        })
    }

    fn row_parts<'a>(&self, row: ElementRef<'a>) -> Option<(ElementRef<'a>, ElementRef<'a>)> {
        let link = row.select(&self.link).next()?;
        let date_cell = row.select(&self.date_cell).next()?;
        Some((link, date_cell))
    }
}

fn selector(css: &'static str) -> Result<Selector, ListingError> {
    Selector::parse(css).map_err(|err| ListingError::Selector {
        css,
        message: err.to_string(),
    })
}

fn parse_row(
    link: ElementRef<'_>,
    date_cell: ElementRef<'_>,
    base: &Url,
) -> Result<DirectoryEntry, String> {
    let name = link.text().collect::<String>().trim().to_string();
    let href = link
        .value()
        .attr("href")
        .map(str::trim)
        .ok_or_else(|| format!("link {name:?} has no href"))?;
    let url = base
        .join(href)
        .map_err(|err| format!("href {href:?} does not resolve: {err}"))?;

    let raw_date = date_cell
        .value()
        .attr("title")
        .ok_or_else(|| format!("entry {name:?} has no date title"))?;
    let modified_at = parse_listing_date(raw_date)
        .map_err(|err| format!("entry {name:?} has malformed date {raw_date:?}: {err}"))?;

    Ok(DirectoryEntry {
        name,
        url: url.into(),
        modified_at,
    })
}

pub fn parse_listing_date(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), LISTING_DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_selector_is_an_error_not_a_panic() {
        let err = selector("td[").unwrap_err();
        assert!(matches!(err, ListingError::Selector { css: "td[", .. }));
        assert!(err.to_string().starts_with("invalid selector td["));
    }

    #[test]
    fn listing_selectors_parse() {
        assert!(ListingSelectors::new().is_ok());
    }
}
