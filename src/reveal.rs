use crate::Result;
use crate::controller::PageController;
use crate::dom::{PageDom, Rect};

/// Share of `rect` inside a viewport whose bottom edge is pulled up by
/// `bottom_margin`. A zero-height element counts as fully visible when it
/// sits inside that viewport.
pub fn intersection_ratio(rect: Rect, viewport_height: f64, bottom_margin: f64) -> f64 {
    let root_bottom = (viewport_height - bottom_margin).max(0.0);
    if rect.height <= 0.0 {
        return if rect.top >= 0.0 && rect.top <= root_bottom { 1.0 } else { 0.0 };
    }
    let visible = rect.bottom().min(root_bottom) - rect.top.max(0.0);
    (visible.max(0.0) / rect.height).min(1.0)
}

#[derive(Debug, Clone)]
struct RevealEntry<N> {
    node: N,
    revealed: bool,
}

/// Every fade-in marker on the page with its one-shot reveal flag.
#[derive(Debug, Clone)]
pub(crate) struct RevealRegistry<N> {
    entries: Vec<RevealEntry<N>>,
}

impl<N: PartialEq> RevealRegistry<N> {
    pub(crate) fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub(crate) fn observe(&mut self, node: N) {
        if !self.entries.iter().any(|entry| entry.node == node) {
            self.entries.push(RevealEntry { node, revealed: false });
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn pending(&self) -> impl Iterator<Item = (usize, &N)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.revealed)
            .map(|(idx, entry)| (idx, &entry.node))
    }

    fn mark(&mut self, idx: usize) {
        self.entries[idx].revealed = true;
    }

    fn is_revealed(&self, node: &N) -> bool {
        self.entries.iter().any(|entry| entry.revealed && entry.node == *node)
    }
}

impl<D: PageDom> PageController<D> {
    pub(crate) fn register_reveal_targets(&mut self) {
        for node in self.dom.elements_with_any_class(&self.config.reveal_markers) {
            self.reveal.observe(node);
        }
    }

    /// Reveals markers that crossed the visibility threshold and stops
    /// watching them. Returns how many were revealed.
    pub fn reveal_visible(&mut self) -> Result<usize> {
        let viewport_height = self.dom.viewport_height();
        let mut newly_visible = Vec::new();
        for (idx, node) in self.reveal.pending() {
            let rect = match self.dom.bounding_rect(node) {
                Ok(rect) => rect,
                Err(err) => {
                    self.trace.debug(format!("[reveal] skipped unmeasurable marker: {err}"));
                    continue;
                }
            };
            let ratio =
                intersection_ratio(rect, viewport_height, self.config.reveal_bottom_margin_px);
            if ratio >= self.config.reveal_threshold {
                newly_visible.push((idx, node.clone()));
            }
        }
        for (idx, node) in &newly_visible {
            self.dom.add_class(node, &self.config.reveal_class)?;
            self.reveal.mark(*idx);
        }
        if !newly_visible.is_empty() {
            self.trace.debug(format!(
                "[reveal] revealed={} remaining={}",
                newly_visible.len(),
                self.reveal.pending().count()
            ));
        }
        Ok(newly_visible.len())
    }

    pub fn is_revealed(&self, node: &D::Node) -> bool {
        self.reveal.is_revealed(node)
    }

    pub fn reveal_target_count(&self) -> usize {
        self.reveal.len()
    }
}
