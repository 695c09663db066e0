//! Content indexing for mdsite.
//!
//! This crate provides:
//! - [`load_page_entry`]: metadata, URL and label for one content file
//! - [`OrderTable`]: page weights from the `order.yml` manifest
//! - [`build_index`]: a sorted [`PageIndex`] over the whole content tree
//! - [`Site`]: the shared handle that builds the index lazily and swaps in
//!   rebuilt snapshots
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use mdsite_site::{Site, SiteContext};
//!
//! let site = Site::new(SiteContext::new("site", "config"));
//!
//! for page in site.index()?.pages() {
//!     println!("{} {}", page.url, page.label);
//! }
//! # Ok(())
//! # }
//! ```

mod index;
mod order;
mod page;
mod site;

pub use index::{INDEX_TITLE, IndexError, PageIndex, build_index};
pub use order::{ORDER_FILENAME, OrderError, OrderInfo, OrderTable};
pub use page::{DEFAULT_WEIGHT, PageEntry, PageError, generate_label, load_page_entry};
pub use site::{Site, SiteContext};
