//! Scripted in-memory table for testing without a browser.
//!
//! [`MockTable`] behaves like a click-to-sort HTML table: each column has a
//! header control and a set of cells, clicking a header toggles that column
//! between ascending and descending, and every column is reordered together
//! because rows move as a unit.
//!
//! Re-rendering is asynchronous. A click schedules the new row order, which
//! only becomes visible once the configured render delay has elapsed, so the
//! change awaiter has something real to poll for. Defects can be injected to
//! exercise every failure path of the verifier.

use crate::driver::{Screenshot, TableDriver};
use crate::locator::Locator;
use crate::order::{parse_numeric, SortMode};
use crate::result::{SortProbeError, SortProbeResult};
use crate::verify::SortDirection;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// PNG file signature, returned as the default mock snapshot
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// A sort defect the mock table can exhibit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDefect {
    /// Sorts correctly
    #[default]
    None,
    /// Accepts clicks but never re-renders
    Unresponsive,
    /// Sorts numeric columns as text
    TextOrder,
    /// First click sorts descending, second ascending
    InvertedDirections,
}

/// One column of the mock table
#[derive(Debug, Clone)]
pub struct MockColumn {
    /// Column name
    pub name: String,
    /// Header control locator
    pub header: Locator,
    /// Cell locator
    pub cells: Locator,
    /// How the table itself orders this column
    pub mode: SortMode,
    /// Cell texts in row order
    pub values: Vec<String>,
}

impl MockColumn {
    /// Create a column addressed by CSS selectors
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        header_css: impl Into<String>,
        cells_css: impl Into<String>,
        mode: SortMode,
    ) -> Self {
        Self::from_locators(
            name,
            Locator::css(header_css),
            Locator::css(cells_css),
            mode,
        )
    }

    /// Create a column from explicit locators
    #[must_use]
    pub fn from_locators(
        name: impl Into<String>,
        header: Locator,
        cells: Locator,
        mode: SortMode,
    ) -> Self {
        Self {
            name: name.into(),
            header,
            cells,
            mode,
            values: Vec::new(),
        }
    }

    /// Set the cell texts
    #[must_use]
    pub fn with_cells<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = cells.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug)]
struct PendingRender {
    ready_at: Instant,
    columns: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct TableState {
    columns: Vec<MockColumn>,
    pending: Option<PendingRender>,
    sorted_by: Option<(usize, SortDirection)>,
    read_fault: Option<String>,
    screenshot_fault: Option<String>,
    call_history: Vec<String>,
}

impl TableState {
    fn settle(&mut self) {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| Instant::now() >= p.ready_at);
        if ready {
            if let Some(pending) = self.pending.take() {
                for (column, values) in self.columns.iter_mut().zip(pending.columns) {
                    column.values = values;
                }
            }
        }
    }

    /// Latest scheduled values of every column, including an unrendered sort
    fn latest(&self) -> Vec<Vec<String>> {
        self.pending.as_ref().map_or_else(
            || self.columns.iter().map(|c| c.values.clone()).collect(),
            |p| p.columns.clone(),
        )
    }

    fn header_index(&self, locator: &Locator) -> Option<usize> {
        self.columns.iter().position(|c| &c.header == locator)
    }

    fn matches_any(&self, locator: &Locator) -> bool {
        self.columns
            .iter()
            .any(|c| &c.header == locator || &c.cells == locator)
    }
}

/// Scripted click-to-sort table implementing [`TableDriver`]
#[derive(Debug, Default)]
pub struct MockTable {
    state: Mutex<TableState>,
    render_delay: Duration,
    defect: SortDefect,
    screenshot: Option<Vec<u8>>,
}

impl MockTable {
    /// Create an empty table that re-renders immediately
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column
    #[must_use]
    pub fn with_column(self, column: MockColumn) -> Self {
        self.lock().columns.push(column);
        self
    }

    /// Delay between a click and the re-rendered rows becoming visible
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Inject a sort defect
    #[must_use]
    pub const fn with_defect(mut self, defect: SortDefect) -> Self {
        self.defect = defect;
        self
    }

    /// Bytes returned by [`TableDriver::screenshot`]
    #[must_use]
    pub fn with_screenshot(mut self, data: Vec<u8>) -> Self {
        self.screenshot = Some(data);
        self
    }

    /// Make every subsequent cell read fail with `message`
    pub fn fail_reads(&self, message: impl Into<String>) {
        self.lock().read_fault = Some(message.into());
    }

    /// Make every subsequent screenshot fail with `message`
    pub fn fail_screenshots(&self, message: impl Into<String>) {
        self.lock().screenshot_fault = Some(message.into());
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.lock()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Number of header clicks received
    #[must_use]
    pub fn click_count(&self) -> usize {
        self.lock()
            .call_history
            .iter()
            .filter(|c| c.starts_with("click:"))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn order_rows(
        &self,
        values: &[String],
        mode: SortMode,
        direction: SortDirection,
    ) -> Vec<usize> {
        let mode = match (self.defect, mode) {
            (SortDefect::TextOrder, _) => SortMode::Lexicographic,
            (_, mode) => mode,
        };
        let direction = match self.defect {
            SortDefect::InvertedDirections => direction.toggled(),
            _ => direction,
        };

        let mut rows: Vec<usize> = (0..values.len()).collect();
        rows.sort_by(|&a, &b| {
            let ord = match mode {
                SortMode::Lexicographic => values[a].cmp(&values[b]),
                SortMode::Numeric => {
                    let ka = parse_numeric(&values[a]).ok();
                    let kb = parse_numeric(&values[b]).ok();
                    ka.partial_cmp(&kb).unwrap_or(Ordering::Equal)
                }
            };
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        rows
    }
}

#[async_trait]
impl TableDriver for MockTable {
    async fn texts(&self, locator: &Locator) -> SortProbeResult<Vec<String>> {
        let mut state = self.lock();
        if let Some(message) = &state.read_fault {
            return Err(SortProbeError::collaborator(message.clone()));
        }
        state.settle();
        Ok(state
            .columns
            .iter()
            .find(|c| &c.cells == locator)
            .map(|c| c.values.clone())
            .unwrap_or_default())
    }

    async fn click(&self, locator: &Locator) -> SortProbeResult<()> {
        let mut state = self.lock();
        state.call_history.push(format!("click:{locator}"));
        let index = state.header_index(locator).ok_or_else(|| {
            SortProbeError::collaborator(format!("no element matches {locator}"))
        })?;

        if self.defect == SortDefect::Unresponsive {
            return Ok(());
        }

        let direction = match state.sorted_by {
            Some((i, SortDirection::Ascending)) if i == index => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        state.sorted_by = Some((index, direction));

        let latest = state.latest();
        let rows = self.order_rows(&latest[index], state.columns[index].mode, direction);
        let sorted_len = rows.len();
        let columns = latest
            .into_iter()
            .map(|values| {
                if values.len() == sorted_len {
                    rows.iter().map(|&r| values[r].clone()).collect()
                } else {
                    values
                }
            })
            .collect();

        state.pending = Some(PendingRender {
            ready_at: Instant::now() + self.render_delay,
            columns,
        });
        state.settle();
        Ok(())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> SortProbeResult<()> {
        let mut state = self.lock();
        state.call_history.push(format!("scroll:{locator}"));
        if state.matches_any(locator) {
            Ok(())
        } else {
            Err(SortProbeError::collaborator(format!(
                "no element matches {locator}"
            )))
        }
    }

    async fn screenshot(&self) -> SortProbeResult<Screenshot> {
        let mut state = self.lock();
        state.call_history.push("screenshot".to_string());
        if let Some(message) = &state.screenshot_fault {
            return Err(SortProbeError::collaborator(message.clone()));
        }
        let data = self
            .screenshot
            .clone()
            .unwrap_or_else(|| PNG_SIGNATURE.to_vec());
        Ok(Screenshot::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> MockTable {
        MockTable::new()
            .with_column(
                MockColumn::new("Last Name", "th.last", "td.last", SortMode::Lexicographic)
                    .with_cells(["Smith", "Bach", "Conway"]),
            )
            .with_column(
                MockColumn::new("Due", "th.dues", "td.dues", SortMode::Numeric)
                    .with_cells(["$50.00", "$51.00", "$100.00"]),
            )
    }

    #[tokio::test]
    async fn test_click_sorts_rows_as_a_unit() {
        let table = people();
        table.click(&Locator::css("th.last")).await.unwrap();
        assert_eq!(
            table.texts(&Locator::css("td.last")).await.unwrap(),
            vec!["Bach", "Conway", "Smith"]
        );
        assert_eq!(
            table.texts(&Locator::css("td.dues")).await.unwrap(),
            vec!["$51.00", "$100.00", "$50.00"]
        );
    }

    #[tokio::test]
    async fn test_second_click_toggles_descending() {
        let table = people();
        let header = Locator::css("th.dues");
        table.click(&header).await.unwrap();
        table.click(&header).await.unwrap();
        assert_eq!(
            table.texts(&Locator::css("td.dues")).await.unwrap(),
            vec!["$100.00", "$51.00", "$50.00"]
        );
        assert_eq!(table.click_count(), 2);
    }

    #[tokio::test]
    async fn test_switching_columns_restarts_ascending() {
        let table = people();
        table.click(&Locator::css("th.dues")).await.unwrap();
        table.click(&Locator::css("th.last")).await.unwrap();
        assert_eq!(
            table.texts(&Locator::css("td.last")).await.unwrap(),
            vec!["Bach", "Conway", "Smith"]
        );
    }

    #[tokio::test]
    async fn test_render_delay_hides_new_order() {
        let table = people().with_render_delay(Duration::from_millis(80));
        let cells = Locator::css("td.last");
        table.click(&Locator::css("th.last")).await.unwrap();
        assert_eq!(
            table.texts(&cells).await.unwrap(),
            vec!["Smith", "Bach", "Conway"]
        );
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(
            table.texts(&cells).await.unwrap(),
            vec!["Bach", "Conway", "Smith"]
        );
    }

    #[tokio::test]
    async fn test_text_order_defect() {
        let table = people().with_defect(SortDefect::TextOrder);
        table.click(&Locator::css("th.dues")).await.unwrap();
        assert_eq!(
            table.texts(&Locator::css("td.dues")).await.unwrap(),
            vec!["$100.00", "$50.00", "$51.00"]
        );
    }

    #[tokio::test]
    async fn test_unresponsive_defect() {
        let table = people().with_defect(SortDefect::Unresponsive);
        table.click(&Locator::css("th.last")).await.unwrap();
        assert_eq!(
            table.texts(&Locator::css("td.last")).await.unwrap(),
            vec!["Smith", "Bach", "Conway"]
        );
    }

    #[tokio::test]
    async fn test_unknown_header_is_collaborator_fault() {
        let table = people();
        let err = table.click(&Locator::css("th.nope")).await.unwrap_err();
        assert!(matches!(err, SortProbeError::Collaborator { .. }));
        assert!(table.was_called("click:css=th.nope"));
    }

    #[tokio::test]
    async fn test_screenshot_default_and_fault() {
        let table = people();
        assert_eq!(table.screenshot().await.unwrap().data, PNG_SIGNATURE.to_vec());
        table.fail_screenshots("gpu lost");
        assert!(table.screenshot().await.is_err());
    }
}
