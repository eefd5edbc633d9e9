use crate::Result;
use crate::controller::PageController;
use crate::dom::PageDom;

const SCROLLED: &str = "scrolled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPosition {
    Shown,
    Hidden,
}

impl HeaderPosition {
    pub fn transform(self) -> &'static str {
        match self {
            Self::Shown => "translateY(0)",
            Self::Hidden => "translateY(-100%)",
        }
    }
}

/// A compact header never hides; a full-size one hides while scrolling down
/// past `hide_after`.
pub fn header_position(
    compact: bool,
    scroll_y: f64,
    last_scroll_y: f64,
    hide_after: f64,
) -> HeaderPosition {
    if !compact && scroll_y > last_scroll_y && scroll_y > hide_after {
        HeaderPosition::Hidden
    } else {
        HeaderPosition::Shown
    }
}

/// Pixel height written to `--header-h`; zero falls back to `fallback`.
pub fn rounded_header_height(measured: f64, fallback: f64) -> i64 {
    let height = if measured.is_finite() && measured > 0.0 { measured } else { fallback };
    height.round() as i64
}

impl<D: PageDom> PageController<D> {
    pub(crate) fn apply_header_scroll(&mut self) -> Result<()> {
        let Some(header) = self.elements.header.clone() else {
            return Ok(());
        };
        let scroll_y = self.dom.scroll_y();
        let compact = scroll_y > self.config.compact_threshold_px;
        self.dom.set_class(&header, SCROLLED, compact)?;

        let position = header_position(
            compact,
            scroll_y,
            self.last_scroll_y,
            self.config.hide_after_px,
        );
        self.dom.set_style(&header, "transform", position.transform())?;
        self.swap_logos(compact)
    }

    /// Writes `--header-h`. Measurement failures are logged, never raised.
    pub fn sync_header_height(&mut self) {
        let Some(header) = self.elements.header.clone() else {
            return;
        };
        let result = self.dom.bounding_rect(&header).and_then(|rect| {
            let height = rounded_header_height(rect.height, self.config.fallback_header_height_px);
            self.dom.set_root_property("--header-h", &format!("{height}px"))?;
            Ok(height)
        });
        match result {
            Ok(height) => self.trace.debug(format!("[header] --header-h={height}px")),
            Err(err) => self.trace.warn(format!("[header] failed to set --header-h: {err}")),
        }
    }

    fn swap_logos(&mut self, compact: bool) -> Result<()> {
        let full = self.elements.logo_full.clone();
        let small = self.elements.logo_small.clone();
        let inline = self.elements.logo_inline.clone();
        if compact {
            if let Some(full) = &full {
                self.dom.set_style(full, "display", "none")?;
            }
            if let Some(small) = &small {
                self.dom.set_style(small, "display", "inline-block")?;
                if let Some(inline) = &inline {
                    if self.dom.natural_width(small) == 0.0 {
                        self.dom.set_style(inline, "display", "inline-flex")?;
                    }
                }
            }
        } else {
            if let Some(full) = &full {
                self.dom.set_style(full, "display", "inline-block")?;
            }
            if let Some(small) = &small {
                self.dom.set_style(small, "display", "none")?;
            }
            if let Some(inline) = &inline {
                self.dom.set_style(inline, "display", "none")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::fixture::landing_page;
    use crate::{Error, PageHarness, TraceLevel, TraceSink};

    #[test]
    fn compact_header_is_never_hidden() {
        assert_eq!(header_position(true, 900.0, 100.0, 150.0), HeaderPosition::Shown);
        assert_eq!(header_position(false, 140.0, 100.0, 150.0), HeaderPosition::Shown);
        assert_eq!(header_position(false, 160.0, 100.0, 150.0), HeaderPosition::Hidden);
        assert_eq!(header_position(false, 160.0, 200.0, 150.0), HeaderPosition::Shown);
    }

    #[test]
    fn header_height_rounds_and_falls_back() {
        assert_eq!(rounded_header_height(71.6, 64.0), 72);
        assert_eq!(rounded_header_height(0.0, 64.0), 64);
        assert_eq!(rounded_header_height(f64::NAN, 64.0), 64);
    }

    #[test]
    fn scrolling_past_compact_threshold_swaps_logos() -> crate::Result<()> {
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        harness.scroll_to(81.0)?;
        harness.assert_class("header", "scrolled", true)?;
        harness.assert_style("header", "transform", "translateY(0)")?;
        harness.assert_style("logo-full", "display", "none")?;
        harness.assert_style("logo-small", "display", "inline-block")?;
        assert_eq!(harness.style("logo-inline", "display")?, None);

        harness.scroll_to(40.0)?;
        harness.assert_class("header", "scrolled", false)?;
        harness.assert_style("logo-full", "display", "inline-block")?;
        harness.assert_style("logo-small", "display", "none")?;
        harness.assert_style("logo-inline", "display", "none")?;
        Ok(())
    }

    #[test]
    fn broken_small_logo_shows_inline_placeholder() -> crate::Result<()> {
        let mut document = landing_page(1024.0);
        let small = document
            .by_id("logo-small")
            .ok_or_else(|| Error::ElementNotFound("logo-small".into()))?;
        document.set_natural_width(small, 0.0);
        let mut harness = PageHarness::new(document)?;
        harness.scroll_to(200.0)?;
        harness.assert_style("logo-inline", "display", "inline-flex")?;
        Ok(())
    }

    #[test]
    fn header_height_variable_follows_resize_and_transitions() -> crate::Result<()> {
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        assert_eq!(harness.document().root_property("--header-h"), Some("96px"));

        let header = harness.node("header")?;
        harness.document_mut().set_layout(header, 0.0, 63.4);
        harness.transition_end("logo-full")?;
        assert_eq!(harness.document().root_property("--header-h"), Some("63px"));

        harness.document_mut().set_layout(header, 0.0, 0.0);
        harness.resize(1280.0)?;
        assert_eq!(harness.document().root_property("--header-h"), Some("64px"));
        Ok(())
    }

    #[test]
    fn unmeasurable_header_is_logged_not_raised() -> crate::Result<()> {
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        harness.enable_trace(true);
        let header = harness.node("header")?;
        harness.document_mut().detach(header);
        harness.resize(900.0)?;
        let logs = harness.take_trace_logs();
        assert!(
            logs.iter()
                .any(|line| line.starts_with("[warn] [header] failed to set --header-h"))
        );
        Ok(())
    }

    #[derive(Default, Clone)]
    struct ConsoleLines(Rc<RefCell<Vec<(TraceLevel, String)>>>);

    impl TraceSink for ConsoleLines {
        fn emit(&mut self, level: TraceLevel, line: &str) {
            self.0.borrow_mut().push((level, line.to_string()));
        }
    }

    #[test]
    fn header_warning_reaches_sink_without_debug() -> crate::Result<()> {
        let console = ConsoleLines::default();
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        harness.controller_mut().set_trace_sink(console.clone());
        harness.scroll_to(200.0)?;
        assert!(console.0.borrow().is_empty());

        let header = harness.node("header")?;
        harness.document_mut().detach(header);
        harness.resize(900.0)?;
        let lines = console.0.borrow();
        assert!(lines.iter().all(|(level, _)| *level == TraceLevel::Warn), "{lines:?}");
        assert!(
            lines
                .iter()
                .any(|(_, line)| line.starts_with("[header] failed to set --header-h"))
        );
        assert!(harness.take_trace_logs().is_empty());
        Ok(())
    }
}
