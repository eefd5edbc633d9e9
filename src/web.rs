//! Browser backend over web-sys and the wasm entry point.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::console;
use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, Event, HtmlElement, HtmlFormElement, HtmlImageElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, ScrollToOptions, Window,
};

use crate::config::ControllerConfig;
use crate::controller::{EventOutcome, PageController, PageEvent};
use crate::dom::{PageDom, Rect};
use crate::trace::{TraceLevel, TraceSink};
use crate::{Error, Result};

/// Id of an optional `<script type="application/json">` holding a
/// [`ControllerConfig`].
pub const CONFIG_SCRIPT_ID: &str = "page-config";

fn js_error(context: &str, err: JsValue) -> Error {
    Error::Dom(format!("{context}: {err:?}"))
}

/// Sends trace lines to the browser console.
struct ConsoleSink;

impl TraceSink for ConsoleSink {
    fn emit(&mut self, level: TraceLevel, line: &str) {
        match level {
            TraceLevel::Debug => console::log!(line),
            TraceLevel::Warn => console::warn!(line),
        }
    }
}

fn now_ms(window: &Window) -> i64 {
    window
        .performance()
        .map(|performance| performance.now() as i64)
        .unwrap_or(0)
}

pub struct BrowserDom {
    window: Window,
    document: web_sys::Document,
}

impl BrowserDom {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn html_element<'a>(&self, node: &'a Element, what: &str) -> Result<&'a HtmlElement> {
        node.dyn_ref::<HtmlElement>()
            .ok_or_else(|| Error::Dom(format!("{what} target is not an HTML element")))
    }
}

impl PageDom for BrowserDom {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn elements_with_any_class(&self, classes: &[String]) -> Vec<Element> {
        if classes.is_empty() {
            return Vec::new();
        }
        let selector = classes
            .iter()
            .map(|class| format!(".{class}"))
            .collect::<Vec<_>>()
            .join(", ");
        let Ok(list) = self.document.query_selector_all(&selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|idx| list.item(idx))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn first_descendant_with_tag(&self, node: &Element, tag: &str) -> Option<Element> {
        node.query_selector(tag).ok().flatten()
    }

    fn closest_with_tag(&self, node: &Element, tag: &str) -> Option<Element> {
        node.closest(tag).ok().flatten()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(&**node))
    }

    fn attr(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attr(&mut self, node: &Element, name: &str, value: &str) -> Result<()> {
        node.set_attribute(name, value)
            .map_err(|err| js_error("setAttribute", err))
    }

    fn has_class(&self, node: &Element, class_name: &str) -> bool {
        node.class_list().contains(class_name)
    }

    fn add_class(&mut self, node: &Element, class_name: &str) -> Result<()> {
        node.class_list()
            .add_1(class_name)
            .map_err(|err| js_error("classList.add", err))
    }

    fn remove_class(&mut self, node: &Element, class_name: &str) -> Result<()> {
        node.class_list()
            .remove_1(class_name)
            .map_err(|err| js_error("classList.remove", err))
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) -> Result<()> {
        self.html_element(node, "style")?
            .style()
            .set_property(property, value)
            .map_err(|err| js_error("style.setProperty", err))
    }

    fn set_text(&mut self, node: &Element, text: &str) -> Result<()> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn value(&self, node: &Element) -> Option<String> {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            return Some(input.value());
        }
        if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
            return Some(textarea.value());
        }
        node.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
    }

    fn reset_form(&mut self, form: &Element) -> Result<()> {
        let form = form
            .dyn_ref::<HtmlFormElement>()
            .ok_or_else(|| Error::Dom("reset target is not a form".into()))?;
        form.reset();
        Ok(())
    }

    fn copy_children(&mut self, from: &Element, to: &Element) -> Result<()> {
        to.set_inner_html(&from.inner_html());
        Ok(())
    }

    fn set_root_property(&mut self, name: &str, value: &str) -> Result<()> {
        let root = self
            .document
            .document_element()
            .ok_or_else(|| Error::Dom("document has no root element".into()))?;
        self.set_style(&root, name, value)
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0)
    }

    fn matches_max_width(&self, px: u32) -> bool {
        self.window
            .match_media(&format!("(max-width: {px}px)"))
            .ok()
            .flatten()
            .map(|query| query.matches())
            .unwrap_or_else(|| self.viewport_width() <= f64::from(px))
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn bounding_rect(&self, node: &Element) -> Result<Rect> {
        let rect = node.get_bounding_client_rect();
        Ok(Rect {
            top: rect.top(),
            height: rect.height(),
        })
    }

    fn natural_width(&self, node: &Element) -> f64 {
        node.dyn_ref::<HtmlImageElement>()
            .map(|image| f64::from(image.natural_width()))
            .unwrap_or(0.0)
    }

    fn scroll_into_view(&mut self, node: &Element) -> Result<()> {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        node.scroll_into_view_with_scroll_into_view_options(&options);
        Ok(())
    }

    fn scroll_to(&mut self, top: f64) -> Result<()> {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
        Ok(())
    }
}

/// Shared handle the event listeners and timers hold on to.
#[derive(Clone)]
struct Page {
    controller: Rc<RefCell<PageController<BrowserDom>>>,
    window: Window,
    armed_for: Rc<Cell<Option<i64>>>,
}

impl Page {
    fn dispatch(&self, event: PageEvent<Element>) -> EventOutcome {
        let outcome = self
            .controller
            .borrow_mut()
            .handle(now_ms(&self.window), event);
        self.arm_timer();
        outcome
    }

    /// Keeps one browser timeout armed for the earliest deferred task.
    /// Stale timeouts find nothing due and simply re-arm.
    fn arm_timer(&self) {
        let Some(due_at) = self.controller.borrow().next_task_due() else {
            return;
        };
        if self.armed_for.get().is_some_and(|armed| armed <= due_at) {
            return;
        }
        self.armed_for.set(Some(due_at));
        let delay = due_at.saturating_sub(now_ms(&self.window)).max(0);
        let page = self.clone();
        let timeout = Timeout::new(u32::try_from(delay).unwrap_or(u32::MAX), move || {
            page.run_timers();
        });
        timeout.forget();
    }

    fn run_timers(&self) {
        self.armed_for.set(None);
        let result = self
            .controller
            .borrow_mut()
            .run_due_tasks(now_ms(&self.window));
        if let Err(err) = result {
            console::warn!(format!("site_interactions: {err}"));
        }
        self.arm_timer();
    }
}

fn read_config(document: &web_sys::Document) -> ControllerConfig {
    let Some(source) = document
        .get_element_by_id(CONFIG_SCRIPT_ID)
        .and_then(|script| script.text_content())
    else {
        return ControllerConfig::default();
    };
    ControllerConfig::from_json(&source).unwrap_or_else(|err| {
        console::warn!(format!("site_interactions: ignoring #{CONFIG_SCRIPT_ID}: {err}"));
        ControllerConfig::default()
    })
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

/// Builds the controller and wires every listener. Call once the DOM is
/// parsed.
pub fn boot(dom: BrowserDom) -> std::result::Result<(), JsValue> {
    let config = read_config(&dom.document);
    let window = dom.window.clone();
    let document = dom.document.clone();
    let mut controller =
        PageController::new(dom, config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    controller.set_trace_sink(ConsoleSink);
    controller.init(now_ms(&window));

    let page = Page {
        controller: Rc::new(RefCell::new(controller)),
        window: window.clone(),
        armed_for: Rc::new(Cell::new(None)),
    };

    let click_page = page.clone();
    EventListener::new_with_options(
        &document,
        "click",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            let Some(target) = event_element(event) else {
                return;
            };
            if click_page.dispatch(PageEvent::Click { target }).default_prevented {
                event.prevent_default();
            }
        },
    )
    .forget();

    let submit_page = page.clone();
    EventListener::new_with_options(
        &document,
        "submit",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            let Some(form) = event_element(event) else {
                return;
            };
            if submit_page.dispatch(PageEvent::Submit { form }).default_prevented {
                event.prevent_default();
            }
        },
    )
    .forget();

    let transition_page = page.clone();
    EventListener::new(&document, "transitionend", move |event| {
        if let Some(target) = event_element(event) {
            transition_page.dispatch(PageEvent::TransitionEnd { target });
        }
    })
    .forget();

    let key_page = page.clone();
    EventListener::new(&window, "keydown", move |event| {
        if let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) {
            key_page.dispatch(PageEvent::KeyDown { key });
        }
    })
    .forget();

    let scroll_page = page.clone();
    EventListener::new(&window, "scroll", move |_| {
        scroll_page.dispatch(PageEvent::Scroll);
    })
    .forget();

    EventListener::new(&window, "resize", move |_| {
        page.dispatch(PageEvent::Resize);
    })
    .forget();

    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    let Some(dom) = BrowserDom::new() else {
        return Ok(());
    };
    if dom.document.ready_state() != "loading" {
        return boot(dom);
    }
    let document = dom.document.clone();
    EventListener::once(&document, "DOMContentLoaded", move |_| {
        if let Err(err) = boot(dom) {
            console::error!(err);
        }
    })
    .forget();
    Ok(())
}
