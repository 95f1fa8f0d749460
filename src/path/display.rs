use super::Path;
use crate::catalog::Catalog;
use std::fmt;

/// Renders a path with status names, e.g. `New › Outcome = Interested › Status B`.
pub struct DisplayPath<'a> {
    pub path: &'a Path,
    pub catalog: &'a Catalog,
}

impl<'a> DisplayPath<'a> {
    pub fn new(path: &'a Path, catalog: &'a Catalog) -> Self {
        Self { path, catalog }
    }

    fn status_name(&self, id: &'a str) -> &'a str {
        self.catalog.status(id).map_or(id, |s| s.name.as_str())
    }
}

impl fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.path.steps() {
            if let Some(via) = &step.via {
                write!(f, " › {} = {} › ", via.field, via.option)?;
            }
            write!(f, "{}", self.status_name(&step.status_id))?;
        }
        Ok(())
    }
}
