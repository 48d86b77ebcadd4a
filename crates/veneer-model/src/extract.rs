use crate::set::ClassSet;
use miette::Result;
use veneer_common::SourceUnit;

/// A header front-end: turns one source unit into class declarations.
///
/// The accumulator is passed in and handed back so a run can thread one
/// [`ClassSet`] through every header it processes. Member-level failures are
/// recorded on the set; an `Err` means the unit could not be processed at all.
pub trait Extractor {
    fn extract(&self, unit: &SourceUnit, classes: ClassSet) -> Result<ClassSet>;

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}
