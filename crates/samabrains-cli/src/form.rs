//! Client-side contact form guard.
//!
//! [`FormGuard`] mirrors what the site's contact form does in the browser:
//! validate locally, refuse double submission, show `Sending...` while the
//! request is in flight, and turn whatever comes back into one
//! [`Notification`]. The submit control always returns to idle, whatever the
//! outcome, through [`Submitting`]'s `Drop`.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use samabrains_core::error::ValidationError;
use samabrains_core::submission::{ContactForm, validate};

/// Label of the submit control while idle.
pub const IDLE_LABEL: &str = "Send Message";
/// Label of the submit control while a submission is in flight.
pub const SENDING_LABEL: &str = "Sending...";

const SENT: &str = "Message sent successfully! I'll get back to you soon.";
const SERVER_FALLBACK: &str = "There was an error sending your message. Please try again.";
const NETWORK_ERROR: &str = "Network error. Please check your connection and try again.";
const ALREADY_SENDING: &str = "Your message is already being sent. Please wait.";

// ── Types ────────────────────────────────────────────────────────────

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// What the user is told after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }
}

/// A reply from the contact endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReply {
    /// HTTP status was 2xx.
    pub ok: bool,
    pub success: bool,
    pub message: Option<String>,
}

/// Where the form is posted.
#[async_trait::async_trait]
pub trait ContactEndpoint: Send + Sync {
    /// Post `form` and read the JSON reply.
    ///
    /// # Errors
    ///
    /// Fails when no reply arrives or the reply is not the expected JSON.
    async fn post(&self, form: &ContactForm) -> Result<EndpointReply>;
}

// ── HTTP endpoint ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ReplyBody {
    #[serde(default)]
    success: bool,
    message: Option<String>,
}

/// [`ContactEndpoint`] speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    http: reqwest::Client,
    url: String,
}

impl HttpEndpoint {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("samabrains-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl ContactEndpoint for HttpEndpoint {
    async fn post(&self, form: &ContactForm) -> Result<EndpointReply> {
        let resp = self
            .http
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(form)
            .send()
            .await
            .context("request failed")?;

        let ok = resp.status().is_success();
        let body: ReplyBody = resp
            .json()
            .await
            .context("failed to parse response JSON")?;

        Ok(EndpointReply {
            ok,
            success: body.success,
            message: body.message,
        })
    }
}

// ── Submit control ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

#[derive(Debug)]
struct ControlState {
    phase: Phase,
    label: String,
}

/// The submit button: enabled with its own label while idle, disabled with
/// [`SENDING_LABEL`] while submitting.
#[derive(Debug)]
pub struct SubmitControl {
    state: Mutex<ControlState>,
}

impl SubmitControl {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(ControlState {
                phase: Phase::Idle,
                label: label.into(),
            }),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.lock().label.clone()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.phase() == Phase::Idle
    }

    /// Enter `Submitting`, or `None` if a submission is already in flight.
    fn begin(&self) -> Option<Submitting<'_>> {
        let mut state = self.lock();
        if state.phase == Phase::Submitting {
            return None;
        }
        state.phase = Phase::Submitting;
        let original = std::mem::replace(&mut state.label, SENDING_LABEL.to_owned());
        Some(Submitting {
            control: self,
            original,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::new(IDLE_LABEL)
    }
}

/// Restores the control to idle with its original label when dropped.
struct Submitting<'a> {
    control: &'a SubmitControl,
    original: String,
}

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        let mut state = self.control.lock();
        state.phase = Phase::Idle;
        state.label = std::mem::take(&mut self.original);
    }
}

// ── Form guard ───────────────────────────────────────────────────────

/// Validates and submits the contact form to one endpoint.
#[derive(Debug)]
pub struct FormGuard<E> {
    endpoint: E,
    control: SubmitControl,
}

impl<E: ContactEndpoint> FormGuard<E> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            control: SubmitControl::default(),
        }
    }

    pub fn control(&self) -> &SubmitControl {
        &self.control
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Validate and send `input`.
    pub async fn submit(&self, input: FormInput) -> Notification {
        let form = match check(&input) {
            Ok(form) => form,
            Err(notification) => return notification,
        };

        let Some(_submitting) = self.control.begin() else {
            return Notification::error(ALREADY_SENDING);
        };

        match self.endpoint.post(&form).await {
            Ok(reply) if reply.ok && reply.success => Notification::success(SENT),
            Ok(reply) => Notification::error(
                reply
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| SERVER_FALLBACK.to_owned()),
            ),
            Err(_) => Notification::error(NETWORK_ERROR),
        }
    }
}

/// Trim and validate `input` the way the server will.
///
/// # Errors
///
/// Returns the error notification to show instead of submitting.
pub fn check(input: &FormInput) -> Result<ContactForm, Notification> {
    let name = input.name.trim();
    let email = input.email.trim();
    let message = input.message.trim();

    validate(name, email, message).map_err(|e| Notification::error(local_message(&e)))?;

    Ok(ContactForm {
        name: Some(name.to_owned()),
        email: Some(email.to_owned()),
        message: Some(message.to_owned()),
    })
}

fn local_message(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::MissingField { .. } => "Please fill in all fields",
        ValidationError::TooLong { .. } => "Input too long",
        ValidationError::InvalidEmailShape => "Please enter a valid email address",
    }
}
