//! Windowing: which rows of a long list must be materialized.
//!
//! Only rows intersecting the viewport, plus an overscan margin on both
//! sides, are rendered. Every other row contributes only its height to the
//! scrollable extent.
//!
//! Two height modes are supported:
//! - fixed: every row has the same height, positions are computed directly
//! - variable: a cumulative offset table gives O(1) position lookups and
//!   O(log n) row lookups by offset

use std::ops::Range;

/// Default number of extra rows rendered on each side of the viewport.
pub const DEFAULT_OVERSCAN: usize = 3;

/// Row heights of the list being windowed.
#[derive(Debug, Clone, PartialEq)]
enum Heights {
    /// All rows share one height.
    Fixed { height: u32, count: usize },
    /// Cumulative offsets: `offsets[i]` is the top of row `i`,
    /// `offsets[n]` is the total height.
    Variable { offsets: Vec<u64> },
}

impl Heights {
    fn fixed(height: u32, count: usize) -> Self {
        Heights::Fixed {
            height: height.max(1),
            count,
        }
    }

    fn variable(heights: &[u32]) -> Self {
        let mut offsets = Vec::with_capacity(heights.len() + 1);
        offsets.push(0);
        let mut total: u64 = 0;
        for &h in heights {
            total += h as u64;
            offsets.push(total);
        }
        Heights::Variable { offsets }
    }

    fn count(&self) -> usize {
        match self {
            Heights::Fixed { count, .. } => *count,
            Heights::Variable { offsets } => offsets.len() - 1,
        }
    }

    fn total(&self) -> u64 {
        match self {
            Heights::Fixed { height, count } => *height as u64 * *count as u64,
            Heights::Variable { offsets } => offsets.last().copied().unwrap_or(0),
        }
    }

    fn offset_of(&self, index: usize) -> u64 {
        match self {
            Heights::Fixed { height, count } => *height as u64 * index.min(*count) as u64,
            Heights::Variable { offsets } => offsets
                .get(index)
                .copied()
                .unwrap_or_else(|| offsets.last().copied().unwrap_or(0)),
        }
    }

    fn height_of(&self, index: usize) -> u32 {
        match self {
            Heights::Fixed { height, count } if index < *count => *height,
            Heights::Variable { offsets } if index + 1 < offsets.len() => {
                (offsets[index + 1] - offsets[index]) as u32
            }
            _ => 0,
        }
    }

    /// Rows whose vertical extent intersects `[top, top + viewport)`.
    fn visible(&self, top: u64, viewport: u32) -> Range<usize> {
        let n = self.count();
        let bottom = top + viewport as u64;
        match self {
            Heights::Fixed { height, .. } => {
                let h = *height as u64;
                let start = ((top / h) as usize).min(n);
                let end = (bottom.div_ceil(h) as usize).min(n);
                start..end.max(start)
            }
            Heights::Variable { offsets } => {
                // First row whose bottom edge lies below the top of the viewport.
                let start = offsets[1..].partition_point(|&b| b <= top);
                // Accumulate rows until the viewport is covered.
                let mut end = start;
                while end < n && offsets[end] < bottom {
                    end += 1;
                }
                start..end
            }
        }
    }
}

/// Rows to materialize for the current scroll position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Rows intersecting the viewport.
    pub visible: Range<usize>,
    /// Rows to instantiate: `visible` widened by the overscan, clamped.
    pub rendered: Range<usize>,
    /// Vertical position of the first rendered row.
    pub rendered_top: u64,
    /// Height of the whole scrollable area.
    pub total_height: u64,
}

/// Result of a window computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowState {
    /// The list has no rows; render an explicit empty state.
    Empty,
    /// Rows to render.
    Rows(Window),
}

impl WindowState {
    pub fn is_empty(&self) -> bool {
        matches!(self, WindowState::Empty)
    }

    /// Rendered index range (empty for the empty state).
    pub fn rendered(&self) -> Range<usize> {
        match self {
            WindowState::Empty => 0..0,
            WindowState::Rows(window) => window.rendered.clone(),
        }
    }

    /// Visible index range (empty for the empty state).
    pub fn visible(&self) -> Range<usize> {
        match self {
            WindowState::Empty => 0..0,
            WindowState::Rows(window) => window.visible.clone(),
        }
    }
}

/// Windowing state for a virtualized list.
///
/// Every setter recomputes the window synchronously, so a resize or a
/// height change is reflected before the caller renders again.
///
/// # Example
///
/// ```
/// use datagrid_lib::window::Windower;
///
/// let mut windower = Windower::fixed(20, 1_000).with_overscan(2);
/// windower.set_viewport(100);
/// windower.scroll_to(410);
///
/// let window = windower.window();
/// assert_eq!(window.visible(), 20..26);
/// assert_eq!(window.rendered(), 18..28);
/// ```
#[derive(Debug, Clone)]
pub struct Windower {
    heights: Heights,
    viewport: u32,
    offset: u64,
    overscan: usize,
    window: WindowState,
}

impl Windower {
    /// Windowing over `count` rows of the same height.
    pub fn fixed(height: u32, count: usize) -> Self {
        Self::from_heights(Heights::fixed(height, count))
    }

    /// Windowing over rows with individual heights.
    pub fn variable(heights: &[u32]) -> Self {
        Self::from_heights(Heights::variable(heights))
    }

    fn from_heights(heights: Heights) -> Self {
        let mut windower = Self {
            heights,
            viewport: 0,
            offset: 0,
            overscan: DEFAULT_OVERSCAN,
            window: WindowState::Empty,
        };
        windower.recompute();
        windower
    }

    /// Set the overscan (builder pattern).
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.set_overscan(overscan);
        self
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    pub fn set_overscan(&mut self, overscan: usize) {
        self.overscan = overscan;
        self.recompute();
    }

    /// Set the viewport height.
    pub fn set_viewport(&mut self, height: u32) {
        self.viewport = height;
        self.recompute();
    }

    /// Switch to fixed heights (or change the row count / row height).
    pub fn set_fixed(&mut self, height: u32, count: usize) {
        self.heights = Heights::fixed(height, count);
        self.recompute();
    }

    /// Switch to variable heights and rebuild the offset table.
    pub fn set_heights(&mut self, heights: &[u32]) {
        self.heights = Heights::variable(heights);
        self.recompute();
    }

    /// Scroll to an absolute offset (clamped).
    pub fn scroll_to(&mut self, offset: u64) {
        self.offset = offset;
        self.recompute();
    }

    /// Scroll by a relative amount (clamped).
    pub fn scroll_by(&mut self, delta: i64) {
        self.offset = self.offset.saturating_add_signed(delta);
        self.recompute();
    }

    /// Scroll the minimum amount that makes the row fully visible.
    pub fn scroll_into_view(&mut self, index: usize) {
        if index >= self.heights.count() {
            return;
        }
        let top = self.heights.offset_of(index);
        let bottom = top + self.heights.height_of(index) as u64;
        let viewport = self.viewport as u64;

        if top < self.offset {
            self.offset = top;
        } else if bottom > self.offset + viewport {
            self.offset = bottom.saturating_sub(viewport);
        }
        self.recompute();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn viewport(&self) -> u32 {
        self.viewport
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn count(&self) -> usize {
        self.heights.count()
    }

    /// Sum of all row heights.
    pub fn total_height(&self) -> u64 {
        self.heights.total()
    }

    /// Largest valid scroll offset.
    pub fn max_offset(&self) -> u64 {
        self.total_height().saturating_sub(self.viewport as u64)
    }

    /// Top of the row at `index`. O(1).
    pub fn offset_of(&self, index: usize) -> u64 {
        self.heights.offset_of(index)
    }

    /// Height of the row at `index`, 0 if out of range.
    pub fn height_of(&self, index: usize) -> u32 {
        self.heights.height_of(index)
    }

    /// Row at a vertical position, if any. O(log n) in variable mode.
    pub fn index_at(&self, y: u64) -> Option<usize> {
        let range = self.heights.visible(y, 1);
        (!range.is_empty()).then_some(range.start)
    }

    /// Rows a viewport can show at most in fixed mode:
    /// `ceil(viewport / height) + 1`. Renderers may size row pools with it.
    pub fn capacity(&self) -> usize {
        match &self.heights {
            Heights::Fixed { height, .. } => self.viewport.div_ceil(*height) as usize + 1,
            Heights::Variable { .. } => self.window.visible().len(),
        }
    }

    fn recompute(&mut self) {
        self.offset = self.offset.min(self.max_offset());

        let n = self.heights.count();
        if n == 0 {
            self.window = WindowState::Empty;
            return;
        }

        let visible = self.heights.visible(self.offset, self.viewport);
        let start = visible.start.saturating_sub(self.overscan);
        let end = (visible.end + self.overscan).min(n);

        self.window = WindowState::Rows(Window {
            rendered_top: self.heights.offset_of(start),
            total_height: self.heights.total(),
            rendered: start..end,
            visible,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_explicit() {
        let windower = Windower::fixed(10, 0);
        assert!(windower.window().is_empty());
    }

    #[test]
    fn test_variable_offsets() {
        let windower = Windower::variable(&[10, 20, 30]);
        assert_eq!(windower.total_height(), 60);
        assert_eq!(windower.offset_of(2), 30);
        assert_eq!(windower.height_of(1), 20);
        assert_eq!(windower.index_at(29), Some(1));
        assert_eq!(windower.index_at(30), Some(2));
        assert_eq!(windower.index_at(60), None);
    }

    #[test]
    fn test_zero_item_height_is_clamped() {
        let windower = Windower::fixed(0, 5);
        assert_eq!(windower.total_height(), 5);
    }
}
