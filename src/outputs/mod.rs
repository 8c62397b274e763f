//! Everything the pipeline writes or prints.
//!
//! # Submodules
//!
//! - [`table`]: CSV file written by the scrape stage
//! - [`summary`]: console text for the analyze stage
//! - [`charts`]: PNG charts for the analyze stage
//!
//! # Output Structure
//!
//! ```text
//! data_dir/
//! ├── scraped_data.csv
//! ├── score_distribution.png
//! └── keyword_frequency.png
//! ```
//!
//! All three files are replaced on each run.

pub mod charts;
pub mod summary;
pub mod table;
