/// The marker at the end of the rendered list. Whatever decides that it has
/// come into view (a page budget, a "more" command) implements this.
pub trait Sentinel {
    /// Blocks until the sentinel is visible again; `false` once it never will be.
    fn wait_visible(&mut self) -> bool;
}

/// Becomes visible a fixed number of times.
#[derive(Debug, Clone)]
pub struct PageBudget {
    remaining: usize,
}

impl PageBudget {
    pub fn new(pages: usize) -> Self {
        Self { remaining: pages }
    }
}

impl Sentinel for PageBudget {
    fn wait_visible(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
