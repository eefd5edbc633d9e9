use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Element ids the controller binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub menu_toggle: String,
    pub nav_menu: String,
    pub drawer: String,
    pub back_to_top: String,
    pub header: String,
    pub contact_form: String,
    pub form_status: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    pub logo_full: String,
    pub logo_small: String,
    pub logo_inline: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            menu_toggle: "mobile-menu".into(),
            nav_menu: "nav-menu".into(),
            drawer: "mobile-drawer".into(),
            back_to_top: "backToTop".into(),
            header: "header".into(),
            contact_form: "contactForm".into(),
            form_status: "formStatus".into(),
            name: "name".into(),
            email: "email".into(),
            phone: "phone".into(),
            service: "service".into(),
            message: "message".into(),
            logo_full: "logo-full".into(),
            logo_small: "logo-small".into(),
            logo_inline: "logo-inline".into(),
        }
    }
}

impl ElementIds {
    pub(crate) fn all(&self) -> [(&'static str, &str); 15] {
        [
            ("menu_toggle", self.menu_toggle.as_str()),
            ("nav_menu", self.nav_menu.as_str()),
            ("drawer", self.drawer.as_str()),
            ("back_to_top", self.back_to_top.as_str()),
            ("header", self.header.as_str()),
            ("contact_form", self.contact_form.as_str()),
            ("form_status", self.form_status.as_str()),
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("service", self.service.as_str()),
            ("message", self.message.as_str()),
            ("logo_full", self.logo_full.as_str()),
            ("logo_small", self.logo_small.as_str()),
            ("logo_inline", self.logo_inline.as_str()),
        ]
    }
}

/// Thresholds, delays and bindings for [`crate::PageController`].
///
/// Delays match the CSS transition durations of the site's stylesheet; change
/// them together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Enables the trace log at construction.
    pub debug: bool,
    pub trace_log_limit: usize,
    pub mobile_breakpoint_px: u32,
    pub toggle_debounce_ms: i64,
    pub drawer_close_animation_ms: i64,
    pub drawer_link_close_delay_ms: i64,
    pub anchor_close_delay_ms: i64,
    pub back_to_top_threshold_px: f64,
    pub compact_threshold_px: f64,
    pub hide_after_px: f64,
    pub reveal_threshold: f64,
    pub reveal_bottom_margin_px: f64,
    pub reveal_class: String,
    pub reveal_markers: Vec<String>,
    pub fallback_header_height_px: f64,
    /// Scroll anchors to the target minus the header height instead of
    /// aligning the target with the viewport top.
    pub anchor_offset_header: bool,
    pub ids: ElementIds,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            trace_log_limit: 10_000,
            mobile_breakpoint_px: 768,
            toggle_debounce_ms: 300,
            drawer_close_animation_ms: 300,
            drawer_link_close_delay_ms: 250,
            anchor_close_delay_ms: 260,
            back_to_top_threshold_px: 300.0,
            compact_threshold_px: 80.0,
            hide_after_px: 150.0,
            reveal_threshold: 0.2,
            reveal_bottom_margin_px: 50.0,
            reveal_class: "show".into(),
            reveal_markers: ["fade-in-up", "fade-up", "fade-left", "fade-right"]
                .into_iter()
                .map(String::from)
                .collect(),
            fallback_header_height_px: 64.0,
            anchor_offset_header: false,
            ids: ElementIds::default(),
        }
    }
}

impl ControllerConfig {
    /// Parses a JSON object; absent keys keep their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)
            .map_err(|err| Error::InvalidConfig(format!("malformed config json: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mobile_breakpoint_px == 0 {
            return Err(Error::InvalidConfig(
                "mobile_breakpoint_px must be at least 1".into(),
            ));
        }
        if self.trace_log_limit == 0 {
            return Err(Error::InvalidConfig(
                "trace_log_limit requires at least 1 entry".into(),
            ));
        }
        let delays = [
            ("toggle_debounce_ms", self.toggle_debounce_ms),
            ("drawer_close_animation_ms", self.drawer_close_animation_ms),
            ("drawer_link_close_delay_ms", self.drawer_link_close_delay_ms),
            ("anchor_close_delay_ms", self.anchor_close_delay_ms),
        ];
        if let Some((name, value)) = delays.iter().find(|(_, value)| *value < 0) {
            return Err(Error::InvalidConfig(format!(
                "{name} must be non-negative, got {value}"
            )));
        }
        if !(self.reveal_threshold > 0.0 && self.reveal_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "reveal_threshold must be in (0, 1], got {}",
                self.reveal_threshold
            )));
        }
        if self.reveal_class.trim().is_empty() {
            return Err(Error::InvalidConfig("reveal_class must not be empty".into()));
        }
        if self.reveal_markers.iter().any(|marker| marker.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "reveal_markers must not contain empty class names".into(),
            ));
        }
        if let Some((field, _)) = self.ids.all().into_iter().find(|(_, id)| id.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!("ids.{field} must not be empty")));
        }
        Ok(())
    }
}
