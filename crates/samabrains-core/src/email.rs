//! Transactional email payload and composition.
//!
//! [`compose`] turns a validated [`ContactSubmission`] into the JSON body the
//! Brevo `smtp/email` endpoint expects. The HTML rendition escapes every
//! submitted value; the text rendition carries them verbatim.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sanitize::{escape_html, escape_html_multiline, header_safe};
use crate::submission::ContactSubmission;

/// Default operator mailbox receiving submissions.
pub const DEFAULT_CONTACT_EMAIL: &str = "info@samabrains.com";
/// Default operator display name.
pub const DEFAULT_CONTACT_NAME: &str = "SamaBrains Solutions";

/// A named email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

impl Mailbox {
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Which address appears as the sender of relayed messages.
///
/// The submitter is always the reply-to address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SenderIdentity {
    /// The operator sends the message to themselves. Works with providers
    /// that only accept verified sender domains.
    #[default]
    Operator,
    /// The message appears to come from the submitter.
    Submitter,
}

impl FromStr for SenderIdentity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "operator" => Ok(Self::Operator),
            "submitter" => Ok(Self::Submitter),
            other => Err(format!(
                "unknown sender identity '{other}', expected 'operator' or 'submitter'"
            )),
        }
    }
}

/// Body of a Brevo transactional email request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionalEmail {
    pub sender: Mailbox,
    pub to: Vec<Mailbox>,
    pub reply_to: Mailbox,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
}

/// Build the email relaying `submission` to `operator`.
#[must_use]
pub fn compose(
    submission: &ContactSubmission,
    operator: &Mailbox,
    sender: SenderIdentity,
) -> TransactionalEmail {
    let submitter = Mailbox::new(submission.email(), header_safe(submission.name()));

    let sender = match sender {
        SenderIdentity::Operator => operator.clone(),
        SenderIdentity::Submitter => submitter.clone(),
    };

    TransactionalEmail {
        sender,
        to: vec![operator.clone()],
        subject: subject_line(submission.name()),
        html_content: html_body(submission),
        text_content: text_body(submission),
        reply_to: submitter,
    }
}

/// Subject line naming the submitter, safe for a header.
#[must_use]
pub fn subject_line(name: &str) -> String {
    format!("New Contact Form Submission from {}", header_safe(name))
}

fn html_body(submission: &ContactSubmission) -> String {
    let name = escape_html(submission.name());
    let email = escape_html(submission.email());
    let message = escape_html_multiline(submission.message());

    format!(
        r##"<!DOCTYPE html>
<html>
  <head>
    <style>
      body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
      .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
      .header {{ background: linear-gradient(135deg, #ff6b35 0%, #f7931e 100%); color: white; padding: 20px; border-radius: 5px 5px 0 0; }}
      .content {{ background: #f9f9f9; padding: 20px; border-radius: 0 0 5px 5px; }}
      .field {{ margin-bottom: 15px; }}
      .label {{ font-weight: bold; color: #ff6b35; }}
      .message-box {{ background: white; padding: 15px; border-left: 4px solid #ff6b35; margin-top: 10px; }}
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h2>New Contact Form Submission</h2>
      </div>
      <div class="content">
        <div class="field">
          <span class="label">Name:</span> {name}
        </div>
        <div class="field">
          <span class="label">Email:</span> {email}
        </div>
        <div class="field">
          <span class="label">Message:</span>
          <div class="message-box">{message}</div>
        </div>
      </div>
    </div>
  </body>
</html>
"##
    )
}

fn text_body(submission: &ContactSubmission) -> String {
    format!(
        "New Contact Form Submission\n\nName: {}\nEmail: {}\n\nMessage:\n{}\n",
        submission.name(),
        submission.email(),
        submission.message()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn operator() -> Mailbox {
        Mailbox::new(DEFAULT_CONTACT_EMAIL, DEFAULT_CONTACT_NAME)
    }

    #[test]
    fn operator_identity_sends_as_operator() {
        let sub = ContactSubmission::new("Jo", "jo@x.com", "hi").unwrap();
        let email = compose(&sub, &operator(), SenderIdentity::Operator);

        assert_eq!(email.sender, operator());
        assert_eq!(email.to, vec![operator()]);
        assert_eq!(email.reply_to, Mailbox::new("jo@x.com", "Jo"));
        assert_eq!(email.subject, "New Contact Form Submission from Jo");
    }

    #[test]
    fn submitter_identity_sends_as_submitter() {
        let sub = ContactSubmission::new("Jo", "jo@x.com", "hi").unwrap();
        let email = compose(&sub, &operator(), SenderIdentity::Submitter);

        assert_eq!(email.sender, Mailbox::new("jo@x.com", "Jo"));
        assert_eq!(email.to, vec![operator()]);
        assert_eq!(email.reply_to, email.sender);
    }

    #[test]
    fn html_body_is_escaped_and_text_body_is_raw() {
        let sub = ContactSubmission::new(
            "<script>alert(1)</script>",
            "jo@x.com",
            "Tom & Jerry\n\"quoted\"",
        )
        .unwrap();
        let email = compose(&sub, &operator(), SenderIdentity::Operator);

        assert!(email.html_content.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!email.html_content.contains("<script>"));
        assert!(email.html_content.contains("Tom &amp; Jerry<br>&quot;quoted&quot;"));

        assert!(email.text_content.contains("Name: <script>alert(1)</script>"));
        assert!(email.text_content.contains("Tom & Jerry\n\"quoted\""));
    }

    #[test]
    fn subject_cannot_inject_headers() {
        let sub = ContactSubmission::new("Eve\r\nBcc: all@example.com", "eve@x.com", "hi").unwrap();
        let email = compose(&sub, &operator(), SenderIdentity::Operator);

        assert!(!email.subject.contains('\r'));
        assert!(!email.subject.contains('\n'));
        assert_eq!(
            email.subject,
            "New Contact Form Submission from Eve Bcc: all@example.com"
        );
        assert!(!email.reply_to.name.contains('\n'));
    }

    #[test]
    fn serializes_with_brevo_field_names() {
        let sub = ContactSubmission::new("Jo", "jo@x.com", "hi").unwrap();
        let value = serde_json::to_value(compose(&sub, &operator(), SenderIdentity::Operator)).unwrap();

        assert_eq!(value["sender"]["email"], DEFAULT_CONTACT_EMAIL);
        assert_eq!(value["to"][0]["name"], DEFAULT_CONTACT_NAME);
        assert_eq!(value["replyTo"]["email"], "jo@x.com");
        assert!(value["htmlContent"].is_string());
        assert!(value["textContent"].is_string());
    }

    #[test]
    fn parses_sender_identity() {
        assert_eq!("operator".parse(), Ok(SenderIdentity::Operator));
        assert_eq!(" Submitter ".parse(), Ok(SenderIdentity::Submitter));
        assert!("someone".parse::<SenderIdentity>().is_err());
    }
}
