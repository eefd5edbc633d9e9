use fancy_regex::Regex;

use crate::controller::PageController;
use crate::dom::PageDom;
use crate::{Error, Result};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_DIGITS: usize = 10;

pub const SUCCESS_MESSAGE: &str = "✅ Thank you! Your message has been sent successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingField,
    InvalidEmail,
    InvalidPhone,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingField => "⚠️ Please fill in all fields.",
            Self::InvalidEmail => "⚠️ Please enter a valid email address.",
            Self::InvalidPhone => "⚠️ Please enter a valid 10-digit phone number.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Rejected(Rejection),
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Warning,
    Error,
    Info,
}

impl StatusKind {
    pub fn color(self) -> &'static str {
        match self {
            Self::Success => "#00e676",
            Self::Warning => "#fda43a",
            Self::Error => "#ff5252",
            Self::Info => "#fff",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
}

impl ContactFields {
    fn all_present(&self) -> bool {
        [&self.name, &self.email, &self.phone, &self.service, &self.message]
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

/// Digits left after dropping every other character.
pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid_phone(raw: &str) -> bool {
    phone_digits(raw).len() == PHONE_DIGITS
}

#[derive(Debug, Clone)]
pub struct ContactValidator {
    email: Regex,
}

impl ContactValidator {
    pub fn new() -> Result<Self> {
        let email = Regex::new(EMAIL_PATTERN)
            .map_err(|err| Error::Pattern(format!("email pattern: {err}")))?;
        Ok(Self { email })
    }

    pub fn is_valid_email(&self, email: &str) -> bool {
        self.email.is_match(email).unwrap_or(false)
    }

    /// Checks run in order and the first failure wins.
    pub fn validate(&self, fields: &ContactFields) -> std::result::Result<(), Rejection> {
        if !fields.all_present() {
            return Err(Rejection::MissingField);
        }
        if !self.is_valid_email(&fields.email) {
            return Err(Rejection::InvalidEmail);
        }
        if !is_valid_phone(&fields.phone) {
            return Err(Rejection::InvalidPhone);
        }
        Ok(())
    }
}

impl<D: PageDom> PageController<D> {
    /// Writes the status line. A page without the status element drops it.
    pub fn show_status(&mut self, text: &str, kind: StatusKind) -> Result<()> {
        let Some(status) = self.elements.form_status.clone() else {
            return Ok(());
        };
        self.dom.set_text(&status, text)?;
        self.dom.set_style(&status, "font-weight", "600")?;
        self.dom.set_style(&status, "text-align", "center")?;
        self.dom.set_style(&status, "margin-top", "10px")?;
        self.dom.set_style(&status, "color", kind.color())
    }

    pub fn read_contact_fields(&self) -> ContactFields {
        let ids = &self.config.ids;
        let read = |id: &str| {
            self.dom
                .element_by_id(id)
                .and_then(|node| self.dom.value(&node))
                .unwrap_or_default()
        };
        ContactFields {
            name: read(&ids.name),
            email: read(&ids.email),
            phone: read(&ids.phone),
            service: read(&ids.service),
            message: read(&ids.message),
        }
    }

    /// Validates the contact form and reports the outcome. Returns whether
    /// the native submission was prevented.
    pub(crate) fn handle_submit(&mut self, form: &D::Node) -> Result<bool> {
        let Some(contact_form) = self.elements.contact_form.clone() else {
            return Ok(false);
        };
        if *form != contact_form {
            return Ok(false);
        }

        self.form_state = FormState::Validating;
        let fields = self.read_contact_fields();
        match self.validator.validate(&fields) {
            Err(rejection) => {
                self.form_state = FormState::Rejected(rejection);
                self.trace.debug(format!("[form] rejected: {rejection:?}"));
                self.show_status(rejection.message(), StatusKind::Warning)?;
            }
            Ok(()) => {
                self.form_state = FormState::Accepted;
                self.trace.debug("[form] accepted, submission simulated".into());
                self.show_status(SUCCESS_MESSAGE, StatusKind::Success)?;
                self.dom.reset_form(&contact_form)?;
            }
        }
        Ok(true)
    }
}
