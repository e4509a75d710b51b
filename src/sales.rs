use tracing::{debug, warn};

use std::{
    collections::BTreeMap,
    io::Read,
    ops::AddAssign,
    path::{Path, PathBuf},
};

use crate::{
    mapping::CanonicalMap,
    table::{Field, SkippedSource, SourceError, Table},
};

const BRAND: usize = 0;
const CATEGORY: usize = 1;
const QUANTITY: usize = 2;
const REVENUE: usize = 3;

/// Columns of the detailed sales breakdown report.
pub const FIELDS: [Field; 4] = [
    Field::required("brand", &["brand name", "brand"]),
    Field::optional("category", &["category"]),
    Field::required("quantity", &["quantity sold", "units sold", "quantity"]),
    Field::required("revenue", &["net sales", "revenue"]),
];

/// Sales totals for one brand.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BrandSales {
    pub revenue: f64,
    pub units: f64,
    pub categories: BTreeMap<String, f64>,
}

impl BrandSales {
    /// Returns the total revenue recorded against a category.
    #[must_use]
    pub fn category_revenue(&self) -> f64 {
        self.categories.values().sum()
    }
}

impl AddAssign for BrandSales {
    fn add_assign(&mut self, rhs: Self) {
        self.revenue += rhs.revenue;
        self.units += rhs.units;
        for (category, revenue) in rhs.categories {
            *self.categories.entry(category).or_default() += revenue;
        }
    }
}

/// Sales totals per canonical brand, across any number of reports.
///
/// To read one report, use [`Sales::read_csv`]. To read several and merge
/// them, use [`Sales::read_all`], or add reports together with `+=`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sales {
    brands: BTreeMap<String, BrandSales>,
}

impl Sales {
    /// Reads the sales report at `path`, skipping `skip_rows` metadata rows,
    /// and totals it by brand.
    ///
    /// Brand names are resolved through `map`. Rows with a blank brand, or a
    /// quantity or revenue that is not a number, are skipped. Revenue on rows
    /// with a category is also totalled per category.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, or if the
    /// brand, quantity or revenue column cannot be found.
    pub fn read_csv(
        path: impl AsRef<Path>,
        skip_rows: usize,
        map: &CanonicalMap,
    ) -> Result<Self, SourceError> {
        Self::from_table(&Table::from_path(path, skip_rows)?, map)
    }

    /// Reads a sales report from `rdr`, as [`Self::read_csv`] does.
    ///
    /// # Errors
    ///
    /// As for [`Self::read_csv`].
    pub fn from_reader(
        rdr: impl Read,
        skip_rows: usize,
        map: &CanonicalMap,
    ) -> Result<Self, SourceError> {
        Self::from_table(&Table::from_reader(rdr, skip_rows)?, map)
    }

    /// Reads every report in `paths` and merges the totals.
    ///
    /// A report that cannot be read contributes nothing, and is returned in
    /// the list of skipped sources; the remaining reports are still read.
    pub fn read_all<P: AsRef<Path>>(
        paths: &[P],
        skip_rows: usize,
        map: &CanonicalMap,
    ) -> (Self, Vec<SkippedSource>) {
        let mut sales = Self::default();
        let mut skipped = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match Self::read_csv(path, skip_rows, map) {
                Ok(report) => sales += report,
                Err(reason) => {
                    let source = SkippedSource {
                        path: PathBuf::from(path),
                        reason,
                    };
                    warn!("{source}");
                    skipped.push(source);
                }
            }
        }
        (sales, skipped)
    }

    fn from_table(table: &Table, map: &CanonicalMap) -> Result<Self, SourceError> {
        let columns = table.resolve(&FIELDS)?;
        let mut sales = Self::default();
        let mut skipped = 0;
        for row in table.rows() {
            let brand = row.text(columns.get(BRAND));
            let units = row.number(columns.get(QUANTITY));
            let revenue = row.number(columns.get(REVENUE));
            let (Some(brand), Some(units), Some(revenue)) = (brand, units, revenue) else {
                skipped += 1;
                continue;
            };
            let category = row.text(columns.get(CATEGORY));
            sales.add(&map.resolve(brand), category, units, revenue);
        }
        debug!(
            rows = table.len(),
            skipped,
            brands = sales.brands.len(),
            "read sales report"
        );
        Ok(sales)
    }

    /// Records a sale of `units` for `revenue` against `brand`, and against
    /// `category` if there is one.
    pub fn add(&mut self, brand: &str, category: Option<&str>, units: f64, revenue: f64) {
        let totals = self.brands.entry(brand.to_string()).or_default();
        totals.revenue += revenue;
        totals.units += units;
        if let Some(category) = category {
            *totals.categories.entry(category.to_string()).or_default() += revenue;
        }
    }

    /// Returns the totals for `brand`, if it has any sales.
    #[must_use]
    pub fn get(&self, brand: &str) -> Option<&BrandSales> {
        self.brands.get(brand)
    }

    /// Iterates over brands and their totals, in brand name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BrandSales)> {
        self.brands.iter().map(|(brand, sales)| (brand.as_str(), sales))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.brands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }
}

impl AddAssign for Sales {
    fn add_assign(&mut self, rhs: Self) {
        for (brand, sales) in rhs.brands {
            *self.brands.entry(brand).or_default() += sales;
        }
    }
}
