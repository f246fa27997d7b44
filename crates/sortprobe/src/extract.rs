//! Value Extractor: reads a column's cell texts from the live page.

use crate::driver::TableDriver;
use crate::locator::Locator;
use crate::result::SortProbeResult;

/// Cell texts of one column, one per visible row, in current DOM order.
///
/// Always captured fresh; never reuse one across an awaited mutation.
pub type ValueSequence = Vec<String>;

/// Read the trimmed text of every cell matching `locator`
///
/// An empty table yields an empty sequence. Driver faults propagate
/// unchanged.
pub async fn extract<D>(driver: &D, locator: &Locator) -> SortProbeResult<ValueSequence>
where
    D: TableDriver + ?Sized,
{
    let texts = driver.texts(locator).await?;
    let values: ValueSequence = texts.into_iter().map(|t| t.trim().to_string()).collect();
    tracing::trace!(locator = %locator, rows = values.len(), "extracted column values");
    Ok(values)
}
