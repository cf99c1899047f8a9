//! Recursive cabinet extraction and payload harvesting for Windows Update
//! packages.
//!
//! `cabwalk-core` walks the cabinet frontier of an update package (`.msu`
//! and the `.cab` files nested inside it), harvests payload files by
//! extension into a flat content store, and drives a batch crawl over a
//! JSON ledger of updates resolved through the public update catalog.
//!
//! # Examples
//!
//! ```no_run
//! use cabwalk_core::FrontierWalker;
//! use cabwalk_core::HarvestConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HarvestConfig::default();
//! let walker = FrontierWalker::with_expand_tool(config);
//! let report = walker.process_archive("updates/windows10-kb.msu".as_ref())?;
//! println!("Stored {} files", report.files_stored);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod crawl;
pub mod download;
pub mod error;
pub mod expand;
pub mod fetch;
pub mod ledger;
pub mod report;
pub mod staging;
pub mod store;
pub mod test_utils;
pub mod walker;

// Re-export main API types
pub use catalog::CatalogClient;
pub use catalog::CatalogHit;
pub use catalog::CatalogLookup;
pub use config::FetchConfig;
pub use config::HarvestConfig;
pub use crawl::CrawlRunner;
pub use crawl::DEFAULT_STALE_AFTER_DAYS;
pub use download::DownloadTool;
pub use download::Downloader;
pub use error::HarvestError;
pub use error::Result;
pub use expand::ExpandTool;
pub use expand::Expander;
pub use fetch::Fetched;
pub use fetch::PackageSource;
pub use fetch::UpdateFetcher;
pub use ledger::UpdateEntry;
pub use ledger::UpdateLedger;
pub use report::CrawlSummary;
pub use report::HarvestReport;
pub use store::ContentStore;
pub use store::Deposit;
pub use walker::FrontierWalker;
