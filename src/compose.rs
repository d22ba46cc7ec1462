//! Envelope construction — pure, no I/O.

use crate::submission::ValidatedSubmission;

/// Banner line that opens every relayed message body.
const BODY_BANNER: &str = "Message received from the website contact form";

/// The from/to/subject/body tuple handed to an email provider.
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailEnvelope {
    /// Caller-supplied address, copied verbatim. Attacker-controlled;
    /// trusted only as far as being a header value.
    pub from: String,
    /// Always the process-configured destination — never the caller's,
    /// so the relay cannot be driven as an open mail relay.
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Build the canonical plain-text envelope for a validated submission.
pub fn compose(submission: &ValidatedSubmission, destination: &str) -> EmailEnvelope {
    let body = format!(
        "{BODY_BANNER}\n\n\
         Subject: {subject}\n\n\
         {message}\n\n\
         Phone number: {phone}\n\n\
         Email address: {email}\n",
        subject = submission.subject,
        message = submission.message,
        phone = submission.phone_number,
        email = submission.email,
    );

    EmailEnvelope {
        from: submission.email.clone(),
        to: destination.to_string(),
        subject: submission.subject.clone(),
        body,
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ValidatedSubmission {
        ValidatedSubmission {
            email: "a@b.com".into(),
            phone_number: "555".into(),
            message: "hi there".into(),
            subject: "hello".into(),
            recaptcha_token: None,
        }
    }

    #[test]
    fn to_is_always_the_configured_destination() {
        let envelope = compose(&submission(), "inbox@service.test");
        assert_eq!(envelope.to, "inbox@service.test");
    }

    #[test]
    fn from_and_subject_are_copied_verbatim() {
        let envelope = compose(&submission(), "inbox@service.test");
        assert_eq!(envelope.from, "a@b.com");
        assert_eq!(envelope.subject, "hello");
    }

    #[test]
    fn body_lines_are_in_canonical_order() {
        let envelope = compose(&submission(), "inbox@service.test");
        let lines: Vec<&str> = envelope.body.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(
            lines,
            vec![
                BODY_BANNER,
                "Subject: hello",
                "hi there",
                "Phone number: 555",
                "Email address: a@b.com",
            ]
        );
    }

    #[test]
    fn body_sections_are_blank_line_separated() {
        let envelope = compose(&submission(), "inbox@service.test");
        assert_eq!(envelope.body.matches("\n\n").count(), 4);
    }

    #[test]
    fn subject_is_not_sanitized_or_truncated() {
        let mut s = submission();
        s.subject = "x".repeat(1000);
        let envelope = compose(&s, "inbox@service.test");
        assert_eq!(envelope.subject.len(), 1000);
    }
}
