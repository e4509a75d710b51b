use chrono::NaiveDate;
use tracing::{info, warn};

use std::path::{Path, PathBuf};

use crate::{
    document::{OutputDocument, RunMeta},
    inventory::Inventory,
    mapping::CanonicalMap,
    metrics,
    sales::Sales,
    table::{SkippedSource, SourceError, REPORT_METADATA_ROWS},
};

/// The input files and details for one run.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub inventory: PathBuf,
    pub sales: Vec<PathBuf>,
    pub vendor_map: Option<PathBuf>,
    /// Metadata rows above the header in the inventory and sales reports.
    pub skip_rows: usize,
    pub meta: RunMeta,
}

impl Inputs {
    #[must_use]
    pub fn new(inventory: impl Into<PathBuf>, sales: Vec<PathBuf>) -> Self {
        Self {
            inventory: inventory.into(),
            sales,
            vendor_map: None,
            skip_rows: REPORT_METADATA_ROWS,
            meta: RunMeta::default(),
        }
    }
}

/// The result of a run: the document, and any sources left out of it.
#[derive(Debug)]
pub struct Run {
    pub document: OutputDocument,
    pub skipped: Vec<SkippedSource>,
}

/// Reads every input and builds the document, dated `as_of`.
///
/// A mapping, inventory or sales file that cannot be used is recorded in
/// [`Run::skipped`] and contributes nothing; the run always produces a
/// document from whatever could be read.
#[must_use]
pub fn run(inputs: &Inputs, as_of: NaiveDate) -> Run {
    let mut skipped = Vec::new();
    let map = match &inputs.vendor_map {
        Some(path) => soft(CanonicalMap::read_csv(path), path, &mut skipped),
        None => CanonicalMap::default(),
    };
    let inventory = soft(
        Inventory::read_csv(&inputs.inventory, inputs.skip_rows, &map),
        &inputs.inventory,
        &mut skipped,
    );
    let (sales, sales_skipped) = Sales::read_all(&inputs.sales, inputs.skip_rows, &map);
    skipped.extend(sales_skipped);
    let metrics = metrics::compute(&inventory, &sales);
    info!(
        mapped_vendors = map.len(),
        inventory_brands = inventory.len(),
        sales_brands = sales.len(),
        brands = metrics.len(),
        skipped = skipped.len(),
        "computed brand metrics"
    );
    Run {
        document: OutputDocument::assemble(metrics, inputs.meta.clone(), as_of),
        skipped,
    }
}

fn soft<T: Default>(
    result: Result<T, SourceError>,
    path: &Path,
    skipped: &mut Vec<SkippedSource>,
) -> T {
    result.unwrap_or_else(|reason| {
        let source = SkippedSource {
            path: path.to_path_buf(),
            reason,
        };
        warn!("{source}");
        skipped.push(source);
        T::default()
    })
}
