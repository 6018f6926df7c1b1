//! wbgapi_rs
//!
//! A Rust client for the World Bank API: economies, sources and their concepts,
//! series, topics and time periods, plus an **economy coder** that turns free-text
//! country names into ISO3 codes. Pairs with the `wbgapi` CLI.
//!
//! ### Features
//! - Paged retrieval of any metadata endpoint with response-shape sniffing
//! - Per-language / per-database caches that load once and are safe to share
//! - Country-name coding driven by a hand-edited YAML override catalog
//! - Comparison reports (original name vs. WBG name vs. code), as text or CSV
//!
//! ### Example
//! ```no_run
//! use wbgapi_rs::Session;
//! use wbgapi_rs::coder::{CoderOutput, format_table};
//!
//! let wb = Session::default();
//! if let CoderOutput::Many(codes) = wb.coder(vec!["Swaziland", "Toronto"], false, None)? {
//!     println!("{}", format_table(&wb.coder_report(&codes)?));
//! }
//! # Ok::<(), wbgapi_rs::Error>(())
//! ```

pub mod api;
pub mod cache;
pub mod coder;
pub mod economy;
pub mod error;
pub mod models;
pub mod series;
pub mod session;
pub mod source;
pub mod storage;
pub mod time;
pub mod topic;

pub use api::{Client, Fetch};
pub use coder::{CoderInput, CoderMap, CoderOutput};
pub use error::{Error, Result};
pub use models::CanonicalEntity;
pub use session::{CatalogSource, Session};
