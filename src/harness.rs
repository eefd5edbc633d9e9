use crate::config::ControllerConfig;
use crate::controller::{EventOutcome, PageController, PageEvent};
use crate::document::{Document, NodeId};
use crate::dom::PageDom;
use crate::{Error, Result};

/// Drives a [`PageController`] over an in-memory [`Document`] with a virtual
/// clock. Elements are addressed by id.
pub struct PageHarness {
    controller: PageController<Document>,
    now_ms: i64,
}

impl PageHarness {
    pub fn new(document: Document) -> Result<Self> {
        Self::with_config(document, ControllerConfig::default())
    }

    pub fn with_config(document: Document, config: ControllerConfig) -> Result<Self> {
        let mut controller = PageController::new(document, config)?;
        controller.init(0);
        Ok(Self {
            controller,
            now_ms: 0,
        })
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn controller(&self) -> &PageController<Document> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PageController<Document> {
        &mut self.controller
    }

    pub fn document(&self) -> &Document {
        self.controller.dom()
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.controller.dom_mut()
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.controller.enable_trace(enabled);
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.controller.take_trace_logs()
    }

    pub fn node(&self, id: &str) -> Result<NodeId> {
        self.document()
            .by_id(id)
            .ok_or_else(|| Error::ElementNotFound(id.to_string()))
    }

    /// First anchor under the element with `id`.
    pub fn first_link_in(&self, id: &str) -> Result<NodeId> {
        let container = self.node(id)?;
        self.document()
            .first_descendant_with_tag(&container, "a")
            .ok_or_else(|| Error::ElementNotFound(format!("{id} a")))
    }

    pub fn click(&mut self, id: &str) -> Result<EventOutcome> {
        let target = self.node(id)?;
        self.click_node(target)
    }

    pub fn click_node(&mut self, target: NodeId) -> Result<EventOutcome> {
        Ok(self.dispatch(PageEvent::Click { target }))
    }

    pub fn press_key(&mut self, key: &str) -> Result<EventOutcome> {
        Ok(self.dispatch(PageEvent::KeyDown {
            key: key.to_string(),
        }))
    }

    /// Jumps to `scroll_y` and fires one scroll event.
    pub fn scroll_to(&mut self, scroll_y: f64) -> Result<()> {
        self.document_mut().set_scroll_y(scroll_y);
        self.dispatch(PageEvent::Scroll);
        Ok(())
    }

    pub fn resize(&mut self, viewport_width: f64) -> Result<()> {
        self.document_mut().set_viewport_width(viewport_width);
        self.dispatch(PageEvent::Resize);
        Ok(())
    }

    pub fn type_text(&mut self, id: &str, text: &str) -> Result<()> {
        let target = self.node(id)?;
        self.document_mut().set_value(target, text)
    }

    pub fn submit(&mut self, id: &str) -> Result<EventOutcome> {
        let form = self.node(id)?;
        Ok(self.dispatch(PageEvent::Submit { form }))
    }

    pub fn transition_end(&mut self, id: &str) -> Result<()> {
        let target = self.node(id)?;
        self.dispatch(PageEvent::TransitionEnd { target });
        Ok(())
    }

    /// Moves the clock forward, running each deferred task at its own due time.
    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::InvalidConfig(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let target = self.now_ms.saturating_add(delta_ms);
        self.run_until(Some(target))?;
        self.now_ms = target;
        Ok(())
    }

    /// Runs every pending task, advancing the clock to the last one.
    pub fn flush(&mut self) -> Result<()> {
        self.run_until(None)
    }

    pub fn style(&self, id: &str, property: &str) -> Result<Option<String>> {
        let node = self.node(id)?;
        Ok(self.document().style(node, property).map(str::to_string))
    }

    pub fn assert_class(&self, id: &str, class_name: &str, expected: bool) -> Result<()> {
        let node = self.node(id)?;
        let actual = self.document().has_class(&node, class_name);
        if actual != expected {
            return Err(Error::AssertionFailed {
                target: format!("#{id}.{class_name}"),
                expected: expected.to_string(),
                actual: format!("{actual} (class={:?})", self.document().class_list(node)),
            });
        }
        Ok(())
    }

    pub fn assert_attr(&self, id: &str, name: &str, expected: &str) -> Result<()> {
        let node = self.node(id)?;
        let actual = self.document().get_attr(node, name);
        if actual != Some(expected) {
            return Err(Error::AssertionFailed {
                target: format!("#{id}[{name}]"),
                expected: expected.to_string(),
                actual: format!("{actual:?}"),
            });
        }
        Ok(())
    }

    pub fn assert_text(&self, id: &str, expected: &str) -> Result<()> {
        let node = self.node(id)?;
        let actual = self.document().text_content(node);
        if actual != expected {
            return Err(Error::AssertionFailed {
                target: format!("#{id}"),
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, id: &str, expected: &str) -> Result<()> {
        let node = self.node(id)?;
        let actual = self.document().value(&node).unwrap_or_default();
        if actual != expected {
            return Err(Error::AssertionFailed {
                target: format!("#{id}.value"),
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }

    pub fn assert_style(&self, id: &str, property: &str, expected: &str) -> Result<()> {
        let actual = self.style(id, property)?;
        if actual.as_deref() != Some(expected) {
            return Err(Error::AssertionFailed {
                target: format!("#{id} style {property}"),
                expected: expected.to_string(),
                actual: format!("{actual:?}"),
            });
        }
        Ok(())
    }

    fn dispatch(&mut self, event: PageEvent<NodeId>) -> EventOutcome {
        self.controller.handle(self.now_ms, event)
    }

    fn run_until(&mut self, limit: Option<i64>) -> Result<()> {
        while let Some(due_at) = self.controller.next_task_due() {
            if limit.is_some_and(|limit| due_at > limit) {
                break;
            }
            self.now_ms = self.now_ms.max(due_at);
            self.controller.run_due_tasks(self.now_ms)?;
        }
        Ok(())
    }
}
