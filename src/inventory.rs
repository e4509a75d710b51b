use tracing::debug;

use std::{
    collections::BTreeMap,
    io::Read,
    ops::AddAssign,
    path::Path,
};

use crate::{
    mapping::CanonicalMap,
    table::{Field, SourceError, Table},
};

const VENDOR: usize = 0;
const QUANTITY: usize = 1;
const COST: usize = 2;

/// Columns of the inventory receive costing report.
pub const FIELDS: [Field; 3] = [
    Field::required("vendor", &["vendor name", "vendor"]),
    Field::required("quantity", &["quantity", "qty", "quantity received"]),
    Field::required("cost", &["inventory cost", "cost", "inventory cost ($)"]),
];

/// Received stock for one brand.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Received {
    pub cost: f64,
    pub quantity: f64,
}

impl Received {
    /// Returns the average cost of one unit, or `None` if no units were
    /// received.
    #[must_use]
    pub fn avg_unit_cost(&self) -> Option<f64> {
        (self.quantity > 0.0).then(|| self.cost / self.quantity)
    }
}

impl AddAssign for Received {
    fn add_assign(&mut self, rhs: Self) {
        self.cost += rhs.cost;
        self.quantity += rhs.quantity;
    }
}

/// Total received cost and quantity per canonical brand.
///
/// To read an inventory report, use [`Inventory::read_csv`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Inventory {
    brands: BTreeMap<String, Received>,
}

impl Inventory {
    /// Reads the inventory report at `path`, skipping `skip_rows` metadata
    /// rows, and totals it by brand.
    ///
    /// Vendor names are resolved to brands through `map`. Rows with a blank
    /// vendor, or a quantity or cost that is not a number, are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, or if the
    /// vendor, quantity or cost column cannot be found.
    pub fn read_csv(
        path: impl AsRef<Path>,
        skip_rows: usize,
        map: &CanonicalMap,
    ) -> Result<Self, SourceError> {
        Self::from_table(&Table::from_path(path, skip_rows)?, map)
    }

    /// Reads an inventory report from `rdr`, as [`Self::read_csv`] does.
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

    fn from_table(table: &Table, map: &CanonicalMap) -> Result<Self, SourceError> {
        let columns = table.resolve(&FIELDS)?;
        let mut inventory = Self::default();
        let mut skipped = 0;
        for row in table.rows() {
            let vendor = row.text(columns.get(VENDOR));
            let quantity = row.number(columns.get(QUANTITY));
            let cost = row.number(columns.get(COST));
            let (Some(vendor), Some(quantity), Some(cost)) = (vendor, quantity, cost) else {
                skipped += 1;
                continue;
            };
            inventory.add(&map.resolve(vendor), Received { cost, quantity });
        }
        debug!(
            rows = table.len(),
            skipped,
            brands = inventory.brands.len(),
            "read inventory report"
        );
        Ok(inventory)
    }

    /// Adds received stock to the totals for `brand`.
    pub fn add(&mut self, brand: &str, received: Received) {
        *self.brands.entry(brand.to_string()).or_default() += received;
    }

    /// Returns the totals for `brand`, if any stock was received.
    #[must_use]
    pub fn get(&self, brand: &str) -> Option<&Received> {
        self.brands.get(brand)
    }

    /// Iterates over brands and their totals, in brand name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Received)> {
        self.brands.iter().map(|(brand, received)| (brand.as_str(), received))
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
