use crate::Result;
use crate::controller::PageController;
use crate::dom::PageDom;
use crate::scheduler::TaskKey;

const OPEN: &str = "open";
const CLOSING: &str = "closing";
const SHOW: &str = "show";
const ACTIVE: &str = "active";

/// Mobile drawer and the legacy inline nav toggle.
impl<D: PageDom> PageController<D> {
    /// Menu trigger activation: the drawer below the mobile breakpoint, the
    /// debounced legacy nav toggle above it.
    pub fn activate_menu(&mut self, now_ms: i64) -> Result<()> {
        if self.dom.matches_max_width(self.config.mobile_breakpoint_px) {
            if self.drawer_is_open() {
                self.close_drawer(now_ms)
            } else {
                self.open_drawer()
            }
        } else {
            self.toggle_legacy_nav(now_ms)
        }
    }

    /// Open and not already animating out.
    pub fn drawer_is_open(&self) -> bool {
        self.elements
            .drawer
            .as_ref()
            .is_some_and(|drawer| {
                self.dom.has_class(drawer, OPEN) && !self.dom.has_class(drawer, CLOSING)
            })
    }

    pub fn open_drawer(&mut self) -> Result<()> {
        let Some(drawer) = self.elements.drawer.clone() else {
            return Ok(());
        };
        self.scheduler.cancel(TaskKey::DrawerClose);
        self.scheduler.cancel(TaskKey::DrawerCloseFinish);
        self.dom.remove_class(&drawer, CLOSING)?;
        self.dom.add_class(&drawer, OPEN)?;
        self.dom.set_attr(&drawer, "aria-hidden", "false")?;
        if let Some(toggle) = self.elements.menu_toggle.clone() {
            self.dom.set_attr(&toggle, "aria-expanded", "true")?;
        }
        self.trace.debug("[drawer] open".into());
        Ok(())
    }

    /// Starts the exit animation; `open` and `closing` are dropped once the
    /// animation delay elapses.
    pub fn close_drawer(&mut self, now_ms: i64) -> Result<()> {
        let Some(drawer) = self.elements.drawer.clone() else {
            return Ok(());
        };
        self.scheduler.cancel(TaskKey::DrawerClose);
        self.dom.add_class(&drawer, CLOSING)?;
        self.dom.set_attr(&drawer, "aria-hidden", "true")?;
        if let Some(toggle) = self.elements.menu_toggle.clone() {
            self.dom.set_attr(&toggle, "aria-expanded", "false")?;
        }
        let due_at = now_ms.saturating_add(self.config.drawer_close_animation_ms);
        let superseded = self.scheduler.schedule(TaskKey::DrawerCloseFinish, due_at);
        self.trace.debug(format!(
            "[drawer] closing finish_at={due_at} superseded={superseded}"
        ));
        Ok(())
    }

    /// Copies the primary nav list into the drawer's list.
    pub fn refresh_drawer_content(&mut self) -> Result<()> {
        let (Some(nav), Some(drawer)) = (
            self.elements.nav_menu.as_ref(),
            self.elements.drawer.as_ref(),
        ) else {
            return Ok(());
        };
        let source = self.dom.first_descendant_with_tag(nav, "ul");
        let dest = self.dom.first_descendant_with_tag(drawer, "ul");
        let (Some(source), Some(dest)) = (source, dest) else {
            return Ok(());
        };
        self.dom.copy_children(&source, &dest)
    }

    pub(crate) fn finish_drawer_close(&mut self) -> Result<()> {
        let Some(drawer) = self.elements.drawer.clone() else {
            return Ok(());
        };
        self.dom.remove_class(&drawer, OPEN)?;
        self.dom.remove_class(&drawer, CLOSING)?;
        self.trace.debug("[drawer] closed".into());
        Ok(())
    }

    pub(crate) fn schedule_drawer_close(&mut self, now_ms: i64, delay_ms: i64) {
        let due_at = now_ms.saturating_add(delay_ms);
        let superseded = self.scheduler.schedule(TaskKey::DrawerClose, due_at);
        self.trace.debug(format!(
            "[drawer] close scheduled at={due_at} superseded={superseded}"
        ));
    }

    pub(crate) fn ensure_aria_expanded(&mut self) -> Result<()> {
        let Some(toggle) = self.elements.menu_toggle.clone() else {
            return Ok(());
        };
        if self.dom.attr(&toggle, "aria-expanded").is_none() {
            self.dom.set_attr(&toggle, "aria-expanded", "false")?;
        }
        Ok(())
    }

    /// Closes the legacy nav immediately, as after an in-page jump.
    pub(crate) fn collapse_legacy_nav(&mut self) -> Result<()> {
        if let Some(nav) = self.elements.nav_menu.clone() {
            if self.dom.has_class(&nav, SHOW) {
                self.dom.remove_class(&nav, SHOW)?;
                self.trace_nav_classes(&nav);
                if let Some(toggle) = self.elements.menu_toggle.clone() {
                    self.dom.set_attr(&toggle, "aria-expanded", "false")?;
                }
            }
        }
        if let Some(toggle) = self.elements.menu_toggle.clone() {
            if self.dom.has_class(&toggle, ACTIVE) {
                self.dom.remove_class(&toggle, ACTIVE)?;
            }
        }
        Ok(())
    }

    pub(crate) fn handle_menu_click(&mut self, now_ms: i64, target: &D::Node) -> Result<()> {
        let on_toggle = self
            .elements
            .menu_toggle
            .as_ref()
            .is_some_and(|toggle| self.dom.contains(toggle, target));
        if on_toggle {
            self.activate_menu(now_ms)?;
        }
        Ok(())
    }

    /// Link clicks inside the drawer close it once the scroll has started.
    pub(crate) fn handle_drawer_click(&mut self, now_ms: i64, target: &D::Node) -> Result<()> {
        let Some(drawer) = self.elements.drawer.as_ref() else {
            return Ok(());
        };
        if !self.dom.contains(drawer, target) {
            return Ok(());
        }
        let in_page_link = self
            .dom
            .closest_with_tag(target, "a")
            .filter(|anchor| self.dom.contains(drawer, anchor))
            .and_then(|anchor| self.dom.attr(&anchor, "href"))
            .is_some_and(|href| href.starts_with('#'));
        if in_page_link {
            self.schedule_drawer_close(now_ms, self.config.drawer_link_close_delay_ms);
        }
        Ok(())
    }

    pub(crate) fn handle_key(&mut self, now_ms: i64, key: &str) -> Result<()> {
        if key == "Escape" && self.drawer_is_open() {
            self.close_drawer(now_ms)?;
        }
        Ok(())
    }

    fn toggle_legacy_nav(&mut self, now_ms: i64) -> Result<()> {
        let Some(nav) = self.elements.nav_menu.clone() else {
            return Ok(());
        };
        if let Some(last) = self.last_toggle_ms {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < self.config.toggle_debounce_ms {
                self.trace
                    .debug(format!("[menu] ignored rapid toggle elapsed_ms={elapsed}"));
                return Ok(());
            }
        }
        self.last_toggle_ms = Some(now_ms);

        let is_open = self.dom.toggle_class(&nav, SHOW)?;
        if let Some(toggle) = self.elements.menu_toggle.clone() {
            self.dom.set_class(&toggle, ACTIVE, is_open)?;
            self.dom.set_attr(&toggle, "aria-expanded", if is_open { "true" } else { "false" })?;
        }
        self.trace.debug(format!("[menu] legacy toggle is_open={is_open}"));
        self.trace_nav_classes(&nav);
        Ok(())
    }

    fn trace_nav_classes(&mut self, nav: &D::Node) {
        if self.trace.is_enabled() {
            let classes = self.dom.attr(nav, "class").unwrap_or_default();
            let line = format!(
                "[menu] #{} class changed -> {classes:?}",
                self.config.ids.nav_menu
            );
            self.trace.debug(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fixture::landing_page;
    use crate::{ControllerConfig, PageHarness, Result};

    #[test]
    fn mobile_activation_alternates_drawer_state() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(375.0))?;
        harness.click("mobile-menu")?;
        assert!(harness.controller().drawer_is_open());
        harness.assert_attr("mobile-drawer", "aria-hidden", "false")?;
        harness.assert_attr("mobile-menu", "aria-expanded", "true")?;

        harness.advance_time(50)?;
        harness.click("mobile-menu")?;
        assert!(!harness.controller().drawer_is_open());
        harness.assert_class("mobile-drawer", "closing", true)?;
        harness.assert_attr("mobile-drawer", "aria-hidden", "true")?;
        harness.assert_attr("mobile-menu", "aria-expanded", "false")?;

        harness.advance_time(299)?;
        harness.assert_class("mobile-drawer", "open", true)?;
        harness.advance_time(1)?;
        harness.assert_class("mobile-drawer", "open", false)?;
        harness.assert_class("mobile-drawer", "closing", false)?;
        harness.assert_class("nav-menu", "show", false)?;
        Ok(())
    }

    #[test]
    fn reopening_during_close_animation_cancels_the_removal() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(375.0))?;
        harness.click("mobile-menu")?;
        harness.click("mobile-menu")?;
        harness.advance_time(100)?;
        harness.click("mobile-menu")?;
        harness.assert_class("mobile-drawer", "closing", false)?;
        harness.advance_time(1_000)?;
        harness.assert_class("mobile-drawer", "open", true)?;
        assert!(harness.controller().pending_tasks().is_empty());
        Ok(())
    }

    #[test]
    fn escape_closes_only_an_open_drawer() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(375.0))?;
        harness.press_key("Escape")?;
        assert!(harness.controller().pending_tasks().is_empty());

        harness.click("mobile-menu")?;
        harness.press_key("Enter")?;
        assert!(harness.controller().drawer_is_open());
        harness.press_key("Escape")?;
        harness.flush()?;
        harness.assert_class("mobile-drawer", "open", false)?;
        Ok(())
    }

    #[test]
    fn legacy_toggle_is_debounced() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(1024.0))?;
        harness.click("mobile-menu")?;
        harness.advance_time(120)?;
        harness.click("mobile-menu")?;
        harness.assert_class("nav-menu", "show", true)?;

        harness.advance_time(180)?;
        harness.click("mobile-menu")?;
        harness.assert_class("nav-menu", "show", false)?;
        harness.assert_class("mobile-menu", "active", false)?;
        harness.assert_attr("mobile-menu", "aria-expanded", "false")?;
        Ok(())
    }

    #[test]
    fn drawer_mirrors_nav_after_resize() -> Result<()> {
        let mut harness = PageHarness::new(landing_page(375.0))?;
        let nav_list = harness.node("nav-list")?;
        let item = harness.document_mut().append_element(nav_list, "li", &[]);
        let link = harness
            .document_mut()
            .append_element(item, "a", &[("href", "#faq"), ("class", "nav-link")]);
        harness.document_mut().append_text(link, "FAQ");

        harness.resize(400.0)?;
        let nav_text = harness.document().text_content(nav_list);
        let drawer_list = harness.node("drawer-list")?;
        assert_eq!(harness.document().text_content(drawer_list), nav_text);
        Ok(())
    }

    #[test]
    fn trace_records_ignored_toggles() -> Result<()> {
        let config = ControllerConfig {
            debug: true,
            ..ControllerConfig::default()
        };
        let mut harness = PageHarness::with_config(landing_page(1024.0), config)?;
        harness.take_trace_logs();
        harness.click("mobile-menu")?;
        harness.click("mobile-menu")?;
        let logs = harness.take_trace_logs();
        assert!(logs.iter().any(|line| line.contains("legacy toggle is_open=true")));
        assert!(logs.iter().any(|line| line.contains("ignored rapid toggle")));
        assert!(logs.iter().any(|line| line.contains("#nav-menu class changed")));
        Ok(())
    }
}
