use crate::config::ControllerConfig;
use crate::contact_form::{ContactValidator, FormState};
use crate::dom::PageDom;
use crate::reveal::RevealRegistry;
use crate::scheduler::{PendingTask, Scheduler, TaskKey};
use crate::trace::{TraceLog, TraceSink};
use crate::{Error, Result};

const TASK_STEP_LIMIT: usize = 10_000;

/// Input the host forwards to [`PageController::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<N> {
    Click { target: N },
    KeyDown { key: String },
    Scroll,
    Resize,
    Submit { form: N },
    TransitionEnd { target: N },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub default_prevented: bool,
}

/// Elements resolved once at initialisation.
#[derive(Debug, Clone)]
pub(crate) struct PageElements<N> {
    pub(crate) menu_toggle: Option<N>,
    pub(crate) nav_menu: Option<N>,
    pub(crate) drawer: Option<N>,
    pub(crate) back_to_top: Option<N>,
    pub(crate) header: Option<N>,
    pub(crate) contact_form: Option<N>,
    pub(crate) form_status: Option<N>,
    pub(crate) logo_full: Option<N>,
    pub(crate) logo_small: Option<N>,
    pub(crate) logo_inline: Option<N>,
}

impl<N> PageElements<N> {
    fn empty() -> Self {
        Self {
            menu_toggle: None,
            nav_menu: None,
            drawer: None,
            back_to_top: None,
            header: None,
            contact_form: None,
            form_status: None,
            logo_full: None,
            logo_small: None,
            logo_inline: None,
        }
    }
}

/// Owns every piece of mutable page state. Built once per page; the host
/// forwards events and drives deferred tasks with its own clock.
pub struct PageController<D: PageDom> {
    pub(crate) dom: D,
    pub(crate) config: ControllerConfig,
    pub(crate) elements: PageElements<D::Node>,
    pub(crate) last_scroll_y: f64,
    pub(crate) last_toggle_ms: Option<i64>,
    pub(crate) reveal: RevealRegistry<D::Node>,
    pub(crate) scheduler: Scheduler,
    pub(crate) validator: ContactValidator,
    pub(crate) form_state: FormState,
    pub(crate) trace: TraceLog,
    initialized: bool,
}

impl<D: PageDom> PageController<D> {
    pub fn new(dom: D, config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        let validator = ContactValidator::new()?;
        let trace = TraceLog::new(config.debug, config.trace_log_limit);
        Ok(Self {
            dom,
            config,
            elements: PageElements::empty(),
            last_scroll_y: 0.0,
            last_toggle_ms: None,
            reveal: RevealRegistry::new(),
            scheduler: Scheduler::new(),
            validator,
            form_state: FormState::Idle,
            trace,
            initialized: false,
        })
    }

    /// Resolves bindings and applies the initial state. Runs once; later calls
    /// are ignored.
    pub fn init(&mut self, now_ms: i64) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.resolve_elements();
        let result = self.ensure_aria_expanded();
        self.isolate("menu", result);
        let result = self.refresh_drawer_content();
        self.isolate("drawer", result);
        self.register_reveal_targets();
        let result = self.reveal_visible();
        self.isolate("reveal", result);
        self.sync_header_height();
        self.last_scroll_y = self.dom.scroll_y();
        self.trace.debug(format!(
            "[init] now_ms={now_ms} width={} scroll_y={} reveal_targets={}",
            self.dom.viewport_width(),
            self.last_scroll_y,
            self.reveal.len()
        ));
    }

    /// Dispatches one event. Each feature runs independently: a failure in one
    /// is logged and the others still see the event.
    pub fn handle(&mut self, now_ms: i64, event: PageEvent<D::Node>) -> EventOutcome {
        if !self.initialized {
            self.init(now_ms);
        }
        let mut outcome = EventOutcome::default();
        match event {
            PageEvent::Click { target } => {
                let result = self.handle_anchor_click(now_ms, &target);
                if let Some(prevented) = self.isolate("smooth-scroll", result) {
                    outcome.default_prevented |= prevented;
                }
                let result = self.handle_drawer_click(now_ms, &target);
                self.isolate("drawer", result);
                let result = self.handle_menu_click(now_ms, &target);
                self.isolate("menu", result);
                let result = self.handle_back_to_top_click(&target);
                self.isolate("back-to-top", result);
            }
            PageEvent::KeyDown { key } => {
                let result = self.handle_key(now_ms, &key);
                self.isolate("drawer", result);
            }
            PageEvent::Scroll => {
                let result = self.update_back_to_top();
                self.isolate("back-to-top", result);
                let result = self.reveal_visible();
                self.isolate("reveal", result);
                let result = self.apply_header_scroll();
                self.isolate("header", result);
                self.last_scroll_y = self.dom.scroll_y();
            }
            PageEvent::Resize => {
                let result = self.refresh_drawer_content();
                self.isolate("drawer", result);
                self.sync_header_height();
                let result = self.reveal_visible();
                self.isolate("reveal", result);
            }
            PageEvent::Submit { form } => {
                let result = self.handle_submit(&form);
                if let Some(prevented) = self.isolate("contact-form", result) {
                    outcome.default_prevented |= prevented;
                }
            }
            PageEvent::TransitionEnd { target } => {
                let on_header = self
                    .elements
                    .header
                    .as_ref()
                    .is_some_and(|header| self.dom.contains(header, &target));
                if on_header {
                    self.sync_header_height();
                }
            }
        }
        outcome
    }

    /// Runs every deferred task due at or before `now_ms`, including tasks
    /// those tasks schedule, and returns how many ran.
    pub fn run_due_tasks(&mut self, now_ms: i64) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(task) = self.scheduler.pop_due(now_ms) {
            steps += 1;
            if steps > TASK_STEP_LIMIT {
                return Err(Error::TimerStepLimit {
                    limit: TASK_STEP_LIMIT,
                    now_ms,
                    pending: self.scheduler.len() + 1,
                });
            }
            self.trace.debug(format!(
                "[timer] run key={:?} due_at={} now_ms={now_ms}",
                task.key, task.due_at
            ));
            let result = self.run_task(task.key, task.due_at);
            self.isolate("timer", result);
        }
        Ok(steps)
    }

    pub fn next_task_due(&self) -> Option<i64> {
        self.scheduler.next_due()
    }

    pub fn pending_tasks(&self) -> Vec<PendingTask> {
        self.scheduler.pending()
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn form_state(&self) -> &FormState {
        &self.form_state
    }

    pub fn last_scroll_y(&self) -> f64 {
        self.last_scroll_y
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.set_enabled(enabled);
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.set_stderr(enabled);
    }

    /// Forwards trace lines to `sink` as they happen, in addition to the
    /// in-memory buffer.
    pub fn set_trace_sink(&mut self, sink: impl TraceSink + 'static) {
        self.trace.set_sink(Box::new(sink));
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace.set_limit(max_entries)
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.take()
    }

    fn run_task(&mut self, key: TaskKey, due_at: i64) -> Result<()> {
        match key {
            TaskKey::DrawerClose => {
                if self.drawer_is_open() {
                    self.close_drawer(due_at)?;
                }
                Ok(())
            }
            TaskKey::DrawerCloseFinish => self.finish_drawer_close(),
        }
    }

    fn resolve_elements(&mut self) {
        let ids = &self.config.ids;
        let dom = &self.dom;
        self.elements = PageElements {
            menu_toggle: dom.element_by_id(&ids.menu_toggle),
            nav_menu: dom.element_by_id(&ids.nav_menu),
            drawer: dom.element_by_id(&ids.drawer),
            back_to_top: dom.element_by_id(&ids.back_to_top),
            header: dom.element_by_id(&ids.header),
            contact_form: dom.element_by_id(&ids.contact_form),
            form_status: dom.element_by_id(&ids.form_status),
            logo_full: dom.element_by_id(&ids.logo_full),
            logo_small: dom.element_by_id(&ids.logo_small),
            logo_inline: dom.element_by_id(&ids.logo_inline),
        };
        let missing = ids
            .all()
            .into_iter()
            .map(|(_, id)| id)
            .filter(|id| dom.element_by_id(id).is_none())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            let line = format!(
                "[init] missing elements, features disabled: {}",
                missing.join(", ")
            );
            self.trace.debug(line);
        }
    }

    pub(crate) fn isolate<T>(&mut self, feature: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.trace.warn(format!("[{feature}] {err}"));
                None
            }
        }
    }
}
