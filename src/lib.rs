//! Page interaction controller for a marketing site.
//!
//! The controller wires a fixed set of behaviours to well-known element ids:
//! the mobile drawer and legacy nav toggle, smooth in-page anchor scrolling, a
//! back-to-top control, one-shot reveal of fade-in markers, the compacting
//! header and the contact form validator. It talks to the page only through
//! [`PageDom`], so the same code drives a real browser (`web` feature) and the
//! in-memory [`Document`] used by [`PageHarness`] in tests.

use std::error::Error as StdError;
use std::fmt;

mod config;
mod contact_form;
mod controller;
mod document;
mod dom;
#[doc(hidden)]
pub mod fixture;
mod harness;
mod header;
mod menu;
mod reveal;
mod scheduler;
mod scroll;
mod trace;
#[cfg(feature = "web")]
pub mod web;

pub use config::{ControllerConfig, ElementIds};
pub use contact_form::{
    ContactFields, ContactValidator, FormState, Rejection, SUCCESS_MESSAGE, StatusKind,
    is_valid_phone, phone_digits,
};
pub use controller::{EventOutcome, PageController, PageEvent};
pub use document::{Document, Layout, NodeId};
pub use dom::{PageDom, Rect};
pub use harness::PageHarness;
pub use header::{HeaderPosition, header_position, rounded_header_height};
pub use reveal::intersection_ratio;
pub use scheduler::{PendingTask, Scheduler, TaskKey};
pub use trace::{TraceLevel, TraceSink};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidConfig(String),
    Pattern(String),
    Dom(String),
    Layout(String),
    ElementNotFound(String),
    TimerStepLimit {
        limit: usize,
        now_ms: i64,
        pending: usize,
    },
    AssertionFailed {
        target: String,
        expected: String,
        actual: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Pattern(msg) => write!(f, "pattern error: {msg}"),
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
            Self::Layout(msg) => write!(f, "layout error: {msg}"),
            Self::ElementNotFound(id) => write!(f, "element not found: #{id}"),
            Self::TimerStepLimit {
                limit,
                now_ms,
                pending,
            } => write!(
                f,
                "deferred task run exceeded max steps: limit={limit}, now_ms={now_ms}, pending_tasks={pending}"
            ),
            Self::AssertionFailed {
                target,
                expected,
                actual,
            } => write!(
                f,
                "assertion failed for {target}: expected {expected}, actual {actual}"
            ),
        }
    }
}

impl StdError for Error {}
