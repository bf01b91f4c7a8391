use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::Result;

use super::loader::load_file;
use super::model::EarthquakeCatalog;

// ---------------------------------------------------------------------------
// CatalogRepository – load-once access to one source file
// ---------------------------------------------------------------------------

/// Owns the path of one catalog source and loads it on first access.
///
/// The parsed catalog is shared read-only for the rest of the process; later
/// calls never touch the file again. A failed load leaves the repository
/// empty so the error surfaces to whoever asked.
#[derive(Debug)]
pub struct CatalogRepository {
    source: PathBuf,
    catalog: OnceLock<Arc<EarthquakeCatalog>>,
}

impl CatalogRepository {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        CatalogRepository {
            source: source.into(),
            catalog: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.get().is_some()
    }

    /// Return the catalog, reading the source on the first call only.
    pub fn catalog(&self) -> Result<Arc<EarthquakeCatalog>> {
        if let Some(catalog) = self.catalog.get() {
            return Ok(Arc::clone(catalog));
        }

        let loaded = Arc::new(load_file(&self.source)?);
        log::info!(
            "Loaded {} events from {} ({} continents)",
            loaded.len(),
            self.source.display(),
            loaded.continents.len()
        );
        if let Some((lo, hi)) = loaded.magnitude_range() {
            log::info!("Magnitude range {lo:.1} – {hi:.1}");
        }
        if let Some((first, last)) = loaded.date_range() {
            log::info!("Date range {} – {}", first.date(), last.date());
        }

        Ok(Arc::clone(self.catalog.get_or_init(|| loaded)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_once_and_reuses_the_catalog() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "magnitude,latitude,longitude,continent,date,place,alert").unwrap();
        writeln!(file, "5.0,1,2,Asia,2020-01-01,x,").unwrap();
        file.flush().unwrap();

        let repo = CatalogRepository::new(file.path());
        assert!(!repo.is_loaded());

        let first = repo.catalog().unwrap();
        assert!(repo.is_loaded());
        assert_eq!(first.len(), 1);

        // Changing the file afterwards must not be observed.
        writeln!(file, "6.0,1,2,Asia,2020-01-02,y,").unwrap();
        file.flush().unwrap();

        let second = repo.catalog().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn missing_source_propagates_and_stays_unloaded() {
        let repo = CatalogRepository::new("/no/such/catalog.csv");
        assert!(repo.catalog().is_err());
        assert!(!repo.is_loaded());
        assert_eq!(repo.source(), Path::new("/no/such/catalog.csv"));
    }
}
