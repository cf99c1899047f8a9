//! Update catalog client.
//!
//! Wraps the public update catalog's two endpoints: the search page, which
//! is scraped for result rows, and the download dialog, which resolves an
//! update id to a file URL. The catalog serves HTML only, so both responses
//! are parsed with the same patterns its own scripts use.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use tracing::info;
use tracing::warn;

use crate::HarvestError;
use crate::Result;

/// Search endpoint, queried with `?q=<terms>`.
const SEARCH_URL: &str = "https://www.catalog.update.microsoft.com/Search.aspx";

/// Download dialog endpoint, POSTed an `updateIDs` form field.
const DOWNLOAD_DIALOG_URL: &str = "https://www.catalog.update.microsoft.com/DownloadDialog.aspx";

/// Default timeout for HTTP requests (30 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts when the catalog serves its transient error page.
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Marker the catalog serves while temporarily unhappy.
const TRANSIENT_ERROR_MARKER: &str = "The website has encountered a problem";

/// Marker for an empty result set.
const NO_RESULTS_MARKER: &str = "We did not find any results";

/// Marker confirming the result list fits one page.
const SINGLE_PAGE_MARKER: &str = "(page 1 of 1)";

static DETAIL_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a [^>]*?onclick='goToDetails\("([a-f0-9\-]+)"\);'>\s*(.*?)\s*</a>"#).unwrap()
});

static DOWNLOAD_BUTTON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<input id="([a-f0-9\-]+)" class="flatBlueButtonDownload\b[^"]*" type="button" value='Download' />"#,
    )
    .unwrap()
});

static DOWNLOAD_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"downloadInformation\[\d+\]\.files\[\d+\]\.url = '([^']+)';").unwrap());

static EXCLUDED_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bserver\b|\bDynamic Cumulative Update\b").unwrap());

/// One row scraped from a catalog search result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogHit {
    /// Update id used by the download dialog.
    pub uid: String,
    /// Human-readable update title.
    pub title: String,
}

/// Capability seam over the catalog, so callers can be tested without
/// network access.
pub trait CatalogLookup {
    /// Resolves a (version, KB) pair to the single qualifying update.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::UpdateNotFound`] when the catalog has no
    /// qualifying result, [`HarvestError::AmbiguousResult`] when it has
    /// several, and [`HarvestError::CatalogFormat`] when the response does
    /// not look like a catalog page.
    fn resolve(&self, version: &str, kb: &str) -> Result<CatalogHit>;

    /// Resolves an update id to its single download URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the dialog does not
    /// carry exactly one file URL.
    fn download_url(&self, update_uid: &str) -> Result<String>;
}

/// Blocking HTTP client for the update catalog.
pub struct CatalogClient {
    client: Client,
    max_retries: u32,
}

impl CatalogClient {
    /// Creates a client with the default timeout and retry limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Fetches the search page for the given terms, retrying while the
    /// catalog serves its transient error page.
    fn fetch_search_page(&self, terms: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let body = self
                .client
                .get(SEARCH_URL)
                .query(&[("q", terms)])
                .send()?
                .error_for_status()?
                .text()?;

            if !body.contains(TRANSIENT_ERROR_MARKER) {
                return Ok(body);
            }
            if attempt >= self.max_retries {
                return Err(HarvestError::catalog_format(format!(
                    "catalog still reporting a problem after {attempt} attempts"
                )));
            }
            warn!("Catalog search attempt {attempt} hit a transient server error, retrying");
            std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt)));
        }
    }
}

impl CatalogLookup for CatalogClient {
    fn resolve(&self, version: &str, kb: &str) -> Result<CatalogHit> {
        let terms = format!("{kb} {version} x64");
        info!("Searching catalog for '{terms}'");

        let body = self.fetch_search_page(&terms)?;
        let hit = select_update(&body, version, kb)?;
        info!("Selected '{}'", hit.title);
        Ok(hit)
    }

    fn download_url(&self, update_uid: &str) -> Result<String> {
        let payload =
            serde_json::json!([{ "uidInfo": update_uid, "updateID": update_uid }]).to_string();
        let body = self
            .client
            .post(DOWNLOAD_DIALOG_URL)
            .form(&[("updateIDs", payload.as_str())])
            .send()?
            .error_for_status()?
            .text()?;

        let urls = parse_download_urls(&body);
        match urls.as_slice() {
            [url] => Ok(url.clone()),
            other => Err(HarvestError::catalog_format(format!(
                "expected one download URL for {update_uid}, found {}",
                other.len()
            ))),
        }
    }
}

/// Picks the single qualifying update out of a search page body.
///
/// Excluded editions are filtered before counting, so a page whose every
/// row is a server or dynamic update reads as no result at all.
fn select_update(body: &str, version: &str, kb: &str) -> Result<CatalogHit> {
    if body.contains(NO_RESULTS_MARKER) {
        return Err(HarvestError::UpdateNotFound {
            version: version.to_string(),
            kb: kb.to_string(),
        });
    }

    let hits = parse_search_results(body)?;
    let mut qualifying: Vec<CatalogHit> = hits
        .into_iter()
        .filter(|hit| !is_excluded_title(&hit.title))
        .collect();

    match qualifying.len() {
        0 => Err(HarvestError::UpdateNotFound {
            version: version.to_string(),
            kb: kb.to_string(),
        }),
        1 => {
            let hit = qualifying.remove(0);
            if title_matches(&hit.title, version, kb)? {
                Ok(hit)
            } else {
                Err(HarvestError::catalog_format(format!(
                    "unexpected update title: {}",
                    hit.title
                )))
            }
        }
        count => Err(HarvestError::AmbiguousResult {
            version: version.to_string(),
            kb: kb.to_string(),
            count,
        }),
    }
}

/// Scrapes the result rows from a search page.
///
/// The detail links and the download buttons each carry the update ids;
/// the two sets must agree pairwise or the page layout has changed under
/// us.
fn parse_search_results(html: &str) -> Result<Vec<CatalogHit>> {
    if !html.contains(SINGLE_PAGE_MARKER) {
        return Err(HarvestError::catalog_format(
            "results span more than one page",
        ));
    }

    let hits: Vec<CatalogHit> = DETAIL_LINK_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let uid = caps.get(1)?.as_str().to_string();
            let title = caps.get(2)?.as_str().to_string();
            Some(CatalogHit { uid, title })
        })
        .collect();

    let button_uids: Vec<&str> = DOWNLOAD_BUTTON_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    let link_uids: Vec<&str> = hits.iter().map(|hit| hit.uid.as_str()).collect();
    if link_uids != button_uids {
        return Err(HarvestError::catalog_format(
            "detail links and download buttons disagree",
        ));
    }

    Ok(hits)
}

/// Extracts every file URL from a download dialog page.
fn parse_download_urls(html: &str) -> Vec<String> {
    DOWNLOAD_URL_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Returns `true` for titles the deployment never wants: server editions
/// and dynamic cumulative updates.
fn is_excluded_title(title: &str) -> bool {
    EXCLUDED_TITLE_RE.is_match(title)
}

/// Checks a title against the cumulative update shape for the given
/// version and KB.
fn title_matches(title: &str, version: &str, kb: &str) -> Result<bool> {
    let pattern = format!(
        r"^(\d{{4}}-\d{{2}} )?Cumulative Update (Preview )?for Windows 10 Version {} for x64-based Systems \({}\)$",
        regex::escape(version),
        regex::escape(kb)
    );
    let re = Regex::new(&pattern)
        .map_err(|err| HarvestError::catalog_format(format!("title pattern: {err}")))?;
    Ok(re.is_match(title))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn result_row(uid: &str, title: &str) -> String {
        format!(
            "<a id=\"{uid}_link\" href=\"#\" onclick='goToDetails(\"{uid}\");'>\n  {title}\n</a>\n\
             <input id=\"{uid}\" class=\"flatBlueButtonDownload focus-only\" type=\"button\" value='Download' />"
        )
    }

    fn search_page(rows: &[String]) -> String {
        format!(
            "<html><span>(page 1 of 1)</span>{}</html>",
            rows.join("\n")
        )
    }

    #[test]
    fn test_parse_search_results() {
        let page = search_page(&[
            result_row("abc-123", "2020-10 Cumulative Update for Windows 10"),
            result_row("def-456", "2020-10 Cumulative Update for Windows Server"),
        ]);
        let hits = parse_search_results(&page).unwrap();
        assert_eq!(
            hits,
            vec![
                CatalogHit {
                    uid: "abc-123".to_string(),
                    title: "2020-10 Cumulative Update for Windows 10".to_string(),
                },
                CatalogHit {
                    uid: "def-456".to_string(),
                    title: "2020-10 Cumulative Update for Windows Server".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_multiple_pages() {
        let page = format!(
            "<html><span>(page 1 of 3)</span>{}</html>",
            result_row("abc-123", "Some Update")
        );
        let err = parse_search_results(&page).unwrap_err();
        assert!(matches!(err, HarvestError::CatalogFormat { .. }));
    }

    #[test]
    fn test_parse_rejects_mismatched_buttons() {
        // A download button with no matching detail link.
        let page = search_page(&[
            result_row("abc-123", "Some Update"),
            "<input id=\"fff-999\" class=\"flatBlueButtonDownload\" type=\"button\" value='Download' />"
                .to_string(),
        ]);
        let err = parse_search_results(&page).unwrap_err();
        assert!(matches!(err, HarvestError::CatalogFormat { .. }));
    }

    #[test]
    fn test_select_single_qualifying_update() {
        let page = search_page(&[
            result_row(
                "aaa-111",
                "2020-10 Cumulative Update for Windows Server 2019 (KB4581482)",
            ),
            result_row(
                "bbb-222",
                "2020-10 Cumulative Update for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
            ),
        ]);
        let hit = select_update(&page, "1809", "KB4581482").unwrap();
        assert_eq!(hit.uid, "bbb-222");
    }

    #[test]
    fn test_select_no_results_page() {
        let body = "<html>We did not find any results for your search.</html>";
        let err = select_update(body, "1809", "KB4581482").unwrap_err();
        assert!(matches!(err, HarvestError::UpdateNotFound { .. }));
    }

    #[test]
    fn test_select_everything_filtered_out() {
        let page = search_page(&[result_row(
            "aaa-111",
            "2020-10 Dynamic Cumulative Update for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
        )]);
        let err = select_update(&page, "1809", "KB4581482").unwrap_err();
        assert!(matches!(err, HarvestError::UpdateNotFound { .. }));
    }

    #[test]
    fn test_select_ambiguous_results() {
        let page = search_page(&[
            result_row(
                "aaa-111",
                "Cumulative Update for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
            ),
            result_row(
                "bbb-222",
                "Cumulative Update Preview for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
            ),
        ]);
        let err = select_update(&page, "1809", "KB4581482").unwrap_err();
        assert!(matches!(err, HarvestError::AmbiguousResult { count: 2, .. }));
    }

    #[test]
    fn test_select_rejects_unexpected_title() {
        let page = search_page(&[result_row(
            "aaa-111",
            "Servicing Stack Update for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
        )]);
        let err = select_update(&page, "1809", "KB4581482").unwrap_err();
        assert!(matches!(err, HarvestError::CatalogFormat { .. }));
    }

    #[test]
    fn test_parse_download_urls() {
        let page = "<script>\n\
                    downloadInformation[0].files[0].url = 'https://dl.example.com/a.msu';\n\
                    downloadInformation[0].files[1].url = 'https://dl.example.com/b.msu';\n\
                    </script>";
        assert_eq!(
            parse_download_urls(page),
            vec![
                "https://dl.example.com/a.msu".to_string(),
                "https://dl.example.com/b.msu".to_string(),
            ]
        );
        assert!(parse_download_urls("<html>nothing here</html>").is_empty());
    }

    #[test]
    fn test_excluded_titles() {
        assert!(is_excluded_title(
            "2020-10 Cumulative Update for Windows Server 2019"
        ));
        assert!(is_excluded_title(
            "2020-10 Dynamic Cumulative Update for Windows 10"
        ));
        assert!(is_excluded_title("cumulative update for windows SERVER"));
        assert!(!is_excluded_title(
            "2020-10 Cumulative Update for Windows 10 Version 1809"
        ));
        // 'server' must stand alone as a word.
        assert!(!is_excluded_title("Update for Observers"));
    }

    #[test]
    fn test_title_matches_cumulative_shapes() {
        let version = "1809";
        let kb = "KB4581482";

        for title in [
            "2020-10 Cumulative Update for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
            "2020-10 Cumulative Update Preview for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
            "Cumulative Update for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
        ] {
            assert!(title_matches(title, version, kb).unwrap(), "{title}");
        }

        for title in [
            "Cumulative Update for Windows 10 Version 1903 for x64-based Systems (KB4581482)",
            "Cumulative Update for Windows 10 Version 1809 for x86-based Systems (KB4581482)",
            "Prefix Cumulative Update for Windows 10 Version 1809 for x64-based Systems (KB4581482)",
            "Cumulative Update for Windows 10 Version 1809 for x64-based Systems (KB4581482) extra",
        ] {
            assert!(!title_matches(title, version, kb).unwrap(), "{title}");
        }
    }
}
