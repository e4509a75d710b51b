#![doc = include_str!("../README.md")]
pub mod currency;
pub mod document;
pub mod inventory;
pub mod mapping;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod sales;
pub mod table;

pub use currency::Currency;
pub use document::{OutputDocument, RunMeta};
pub use inventory::Inventory;
pub use mapping::CanonicalMap;
pub use metrics::BrandMetric;
pub use normalize::normalize_name;
pub use pipeline::{run, Inputs, Run};
pub use sales::Sales;
pub use table::{SkippedSource, SourceError};
