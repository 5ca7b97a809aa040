/// Pages shown on each side of the current one.
const WINDOW_RADIUS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Previous(u32),
    Page { number: u32, current: bool },
    Ellipsis,
    Next(u32),
}

impl PageControl {
    /// Page a click on this control navigates to.
    pub fn target(&self) -> Option<u32> {
        match self {
            PageControl::Previous(page) | PageControl::Next(page) => Some(*page),
            PageControl::Page { number, .. } => Some(*number),
            PageControl::Ellipsis => None,
        }
    }
}

/// The page-number strip for one result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationWindow {
    pub current: u32,
    pub total: u32,
    /// First page of the contiguous window around `current`.
    pub start: u32,
    /// Last page of the contiguous window around `current`.
    pub end: u32,
    pub controls: Vec<PageControl>,
}

impl PaginationWindow {
    pub fn window_pages(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.controls.first(), Some(PageControl::Previous(_)))
    }

    pub fn has_next(&self) -> bool {
        matches!(self.controls.last(), Some(PageControl::Next(_)))
    }

    pub fn has_leading_ellipsis(&self) -> bool {
        self.start > 2
    }

    pub fn has_trailing_ellipsis(&self) -> bool {
        self.end + 1 < self.total
    }
}

/// Builds the control strip, or `None` when there is at most one page.
pub fn pagination_window(current: u32, total: u32) -> Option<PaginationWindow> {
    if total <= 1 {
        return None;
    }
    let current = current.clamp(1, total);
    let start = current.saturating_sub(WINDOW_RADIUS).max(1);
    let end = current.saturating_add(WINDOW_RADIUS).min(total);

    let mut controls = Vec::new();
    if current > 1 {
        controls.push(PageControl::Previous(current - 1));
    }
    if start > 1 {
        controls.push(PageControl::Page {
            number: 1,
            current: false,
        });
        if start > 2 {
            controls.push(PageControl::Ellipsis);
        }
    }
    controls.extend((start..=end).map(|number| PageControl::Page {
        number,
        current: number == current,
    }));
    if end < total {
        if end < total - 1 {
            controls.push(PageControl::Ellipsis);
        }
        controls.push(PageControl::Page {
            number: total,
            current: false,
        });
    }
    if current < total {
        controls.push(PageControl::Next(current + 1));
    }

    Some(PaginationWindow {
        current,
        total,
        start,
        end,
        controls,
    })
}
