use crate::Result;
use crate::controller::PageController;
use crate::dom::PageDom;

const SHOW: &str = "show";

/// Id targeted by an in-page link, or `None` for external links and the bare `#`.
pub(crate) fn anchor_target_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Smooth in-page anchors and the back-to-top control.
impl<D: PageDom> PageController<D> {
    /// Returns whether the default navigation should be prevented.
    pub(crate) fn handle_anchor_click(&mut self, now_ms: i64, target: &D::Node) -> Result<bool> {
        let Some(anchor) = self.dom.closest_with_tag(target, "a") else {
            return Ok(false);
        };
        let Some(href) = self.dom.attr(&anchor, "href") else {
            return Ok(false);
        };
        let Some(id) = anchor_target_id(&href) else {
            return Ok(false);
        };
        let Some(destination) = self.dom.element_by_id(id) else {
            self.trace.debug(format!("[scroll] no target for {href}"));
            return Ok(false);
        };

        self.scroll_to_section(&destination)?;
        self.trace.debug(format!("[scroll] smooth scroll to {href}"));

        if self.drawer_is_open() {
            self.schedule_drawer_close(now_ms, self.config.anchor_close_delay_ms);
        }
        self.collapse_legacy_nav()?;
        Ok(true)
    }

    pub(crate) fn handle_back_to_top_click(&mut self, target: &D::Node) -> Result<()> {
        let on_control = self
            .elements
            .back_to_top
            .as_ref()
            .is_some_and(|control| self.dom.contains(control, target));
        if on_control {
            self.dom.scroll_to(0.0)?;
        }
        Ok(())
    }

    pub(crate) fn update_back_to_top(&mut self) -> Result<()> {
        let Some(control) = self.elements.back_to_top.clone() else {
            return Ok(());
        };
        let visible = self.dom.scroll_y() > self.config.back_to_top_threshold_px;
        self.dom.set_class(&control, SHOW, visible)
    }

    fn scroll_to_section(&mut self, destination: &D::Node) -> Result<()> {
        if !self.config.anchor_offset_header {
            return self.dom.scroll_into_view(destination);
        }
        let header_height = match self.elements.header.as_ref() {
            Some(header) => self.dom.bounding_rect(header)?.height,
            None => 0.0,
        };
        let rect = self.dom.bounding_rect(destination)?;
        let top = (rect.top + self.dom.scroll_y() - header_height).max(0.0);
        self.dom.scroll_to(top)
    }
}

#[cfg(test)]
mod tests {
    use super::anchor_target_id;
    use crate::fixture::landing_page;
    use crate::{ControllerConfig, PageDom, PageHarness, Result};

    #[test]
    fn anchor_target_id_skips_bare_hash_and_external_links() {
        assert_eq!(anchor_target_id("#contact"), Some("contact"));
        assert_eq!(anchor_target_id("#"), None);
        assert_eq!(anchor_target_id("/about"), None);
        assert_eq!(anchor_target_id("https://example.com/#x"), None);
    }

    #[test]
    fn nav_link_scrolls_target_to_viewport_top() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        let outcome = harness.click("link-contact")?;
        assert!(outcome.default_prevented);
        assert_eq!(harness.document().scroll_y(), 3000.0);
        Ok(())
    }

    #[test]
    fn missing_target_and_bare_hash_are_left_alone() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        assert!(!harness.click("link-missing")?.default_prevented);
        assert!(!harness.click("link-top")?.default_prevented);
        assert_eq!(harness.document().scroll_y(), 0.0);
        Ok(())
    }

    #[test]
    fn anchor_click_collapses_open_legacy_nav() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        harness.click("mobile-menu")?;
        harness.assert_class("nav-menu", "show", true)?;
        harness.click("link-services")?;
        harness.assert_class("nav-menu", "show", false)?;
        harness.assert_class("mobile-menu", "active", false)?;
        harness.assert_attr("mobile-menu", "aria-expanded", "false")?;
        Ok(())
    }

    #[test]
    fn drawer_link_closes_drawer_once() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(375.0))?;
        harness.click("mobile-menu")?;
        let drawer_link = harness.first_link_in("drawer-list")?;
        let outcome = harness.click_node(drawer_link)?;
        assert!(outcome.default_prevented);
        assert_eq!(harness.controller().pending_tasks().len(), 1);

        harness.advance_time(249)?;
        harness.assert_class("mobile-drawer", "closing", false)?;
        harness.advance_time(1)?;
        harness.assert_class("mobile-drawer", "closing", true)?;
        harness.advance_time(300)?;
        harness.assert_class("mobile-drawer", "open", false)?;
        assert!(harness.controller().pending_tasks().is_empty());
        Ok(())
    }

    #[test]
    fn nav_link_closes_open_drawer_after_anchor_delay() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(375.0))?;
        harness.click("mobile-menu")?;
        assert!(harness.controller().drawer_is_open());

        assert!(harness.click("link-about")?.default_prevented);
        let pending = harness.controller().pending_tasks();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].due_at, 260);

        harness.advance_time(259)?;
        harness.assert_class("mobile-drawer", "closing", false)?;
        harness.advance_time(1)?;
        harness.assert_class("mobile-drawer", "closing", true)?;
        harness.assert_attr("mobile-drawer", "aria-hidden", "true")?;
        harness.advance_time(300)?;
        harness.assert_class("mobile-drawer", "open", false)?;
        harness.assert_class("mobile-drawer", "closing", false)?;
        assert!(harness.controller().pending_tasks().is_empty());
        Ok(())
    }

    #[test]
    fn header_offset_variant_accounts_for_header_height() -> Result<()> {
        let config = ControllerConfig {
            anchor_offset_header: true,
            ..ControllerConfig::default()
        };
        let mut harness = PageHarness::with_config(landing_page(1024.0), config)?;
        harness.click("link-contact")?;
        assert_eq!(harness.document().scroll_y(), 3000.0 - 96.0);
        Ok(())
    }

    #[test]
    fn back_to_top_tracks_threshold_and_scrolls_home() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        harness.scroll_to(300.0)?;
        harness.assert_class("backToTop", "show", false)?;
        harness.scroll_to(301.0)?;
        harness.assert_class("backToTop", "show", true)?;
        harness.scroll_to(120.0)?;
        harness.assert_class("backToTop", "show", false)?;

        harness.scroll_to(1_500.0)?;
        harness.click("backToTop")?;
        assert_eq!(harness.document().scroll_y(), 0.0);
        Ok(())
    }
}
