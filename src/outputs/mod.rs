//! Output generation for scraped station rows.
//!
//! # Submodules
//!
//! - [`tabular`]: Writes one region's rows to a CSV file
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── AL_gas.csv
//! ├── AK_gas.csv
//! ├── ...
//! └── WY_gas.csv
//! ```

pub mod tabular;
