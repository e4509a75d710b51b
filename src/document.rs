use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{currency::Currency, metrics::BrandMetric};

/// Title shown by the dashboard.
pub const TITLE: &str = "Brand PPI + Sell\u{2011}Through + Revenue CRM";

/// Geography reported when none is given.
pub const DEFAULT_GEOGRAPHY: &str = "NY Adult\u{2011}Use";

/// Caller-supplied details describing a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMeta {
    pub notes: String,
    pub geography: String,
    pub currency: Currency,
}

impl Default for RunMeta {
    fn default() -> Self {
        Self {
            notes: String::new(),
            geography: DEFAULT_GEOGRAPHY.to_string(),
            currency: Currency::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub title: String,
    pub as_of: NaiveDate,
    pub currency: Currency,
    pub geography: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_units: f64,
}

/// The dashboard data file: run details, totals, and one entry per brand,
/// best-selling first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub meta: Meta,
    pub kpis: Kpis,
    pub brands: Vec<BrandMetric>,
}

impl OutputDocument {
    /// Builds the document for `metrics`, dated `as_of`.
    ///
    /// Each brand's revenue share is its fraction of the total revenue of all
    /// brands, or zero if that total is not positive. Brands are listed by
    /// revenue, highest first; brands with equal revenue keep the order of
    /// `metrics`.
    #[must_use]
    pub fn assemble(
        metrics: BTreeMap<String, BrandMetric>,
        meta: RunMeta,
        as_of: NaiveDate,
    ) -> Self {
        let total_revenue: f64 = metrics.values().map(|b| b.revenue).sum();
        let total_units: f64 = metrics.values().map(|b| b.units).sum();
        let mut brands: Vec<_> = metrics
            .into_values()
            .map(|mut brand| {
                brand.revenue_share = if total_revenue > 0.0 {
                    brand.revenue / total_revenue
                } else {
                    0.0
                };
                brand
            })
            .collect();
        brands.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        Self {
            meta: Meta {
                title: TITLE.to_string(),
                as_of,
                currency: meta.currency,
                geography: meta.geography,
                notes: meta.notes,
            },
            kpis: Kpis {
                total_revenue,
                total_units,
            },
            brands,
        }
    }

    /// Writes the document to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns any errors from creating or writing the file.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("writing {}", path.display()))?;
        writeln!(writer)?;
        writer
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
