use tracing::debug;

use std::{collections::HashMap, io::Read, path::Path};

use crate::{
    normalize::normalize_name,
    table::{SourceError, Table},
};

/// Maps vendor names to the canonical brand names used in reports.
///
/// Keys are normalized with [`normalize_name`], so any spelling of a vendor
/// that normalizes to the same key resolves to the same brand.
///
/// To create an empty map, use [`CanonicalMap::default`].
///
/// To load a mapping table, use [`CanonicalMap::read_csv`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CanonicalMap(HashMap<String, String>);

impl CanonicalMap {
    /// Reads a vendor-to-brand mapping table from the CSV file at `path`.
    ///
    /// The vendor column is the first whose label contains `vendor`, and the
    /// brand column the first whose label contains `brand`, ignoring case.
    /// The header is the first row of the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, or if either
    /// column cannot be found.
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Self::from_table(&Table::from_path(path, 0)?)
    }

    /// Reads a mapping table from `rdr`, as [`Self::read_csv`] does.
    ///
    /// # Errors
    ///
    /// As for [`Self::read_csv`].
    pub fn from_reader(rdr: impl Read) -> Result<Self, SourceError> {
        Self::from_table(&Table::from_reader(rdr, 0)?)
    }

    fn from_table(table: &Table) -> Result<Self, SourceError> {
        let vendor_col = table.find_column_containing("vendor");
        let brand_col = table.find_column_containing("brand");
        let missing: Vec<_> = [("vendor", vendor_col), ("brand", brand_col)]
            .into_iter()
            .filter(|(_, col)| col.is_none())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(SourceError::SchemaMismatch { missing });
        }
        let mut map = Self::default();
        for row in table.rows() {
            if let (Some(vendor), Some(brand)) = (row.text(vendor_col), row.text(brand_col)) {
                map.insert(vendor, brand);
            }
        }
        debug!(entries = map.len(), rows = table.len(), "loaded vendor mapping");
        Ok(map)
    }

    /// Maps `vendor` to `brand`, replacing any brand previously mapped from a
    /// vendor with the same normalized name.
    pub fn insert(&mut self, vendor: &str, brand: &str) {
        self.0.insert(normalize_name(vendor), brand.trim().to_string());
    }

    /// Returns the canonical brand name for `name`, if it is mapped.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&normalize_name(name)).map(String::as_str)
    }

    /// Returns the canonical brand name for `name`, or `name` itself if it is
    /// not mapped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use brand_ppi::CanonicalMap;
    /// let mut map = CanonicalMap::default();
    /// map.insert("acmefarm", "Acme Industries");
    /// assert_eq!(map.resolve("Acme Farm LLC"), "Acme Industries");
    /// assert_eq!(map.resolve("Blue Sky"), "Blue Sky");
    /// ```
    #[must_use]
    pub fn resolve(&self, name: &str) -> String {
        self.get(name).unwrap_or(name).to_string()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
