use super::graph::InstalledGraph;
use crate::Result;

/// A view of the distributions installed in a Python environment.
///
/// How the environment is inspected differs between pip versions and
/// layouts, so each way of reading it is a separate implementation that the
/// flattener can be handed interchangeably.
pub trait InstalledSource {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Read every installed distribution together with its direct
    /// requirements.
    fn list_installed(&self) -> Result<InstalledGraph>;
}

impl<S: InstalledSource + ?Sized> InstalledSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn list_installed(&self) -> Result<InstalledGraph> {
        (**self).list_installed()
    }
}
