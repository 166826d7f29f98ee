use tokio::sync::mpsc;
use tracing::{info, warn};

/// An email waiting to be delivered.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundEmail {
    /// The password-reset mail carrying a fresh token.
    pub fn password_reset(to: &str, username: &str, token: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "chirp - Reset Password".to_string(),
            body: format!(
                "Hello {username},\n\n\
                 To reset your password submit the following token within \
                 its validity window:\n\n{token}\n\n\
                 If you did not request a reset, ignore this message."
            ),
        }
    }
}

/// Submit-and-forget mail dispatch.
///
/// Messages are handed to a background task over an unbounded channel;
/// the request path never waits on delivery and delivery is not
/// guaranteed. Actual SMTP transport is an external collaborator;
/// this worker logs the handoff.
#[derive(Debug, Clone)]
pub struct Mailer {
    tx: mpsc::UnboundedSender<OutboundEmail>,
}

impl Mailer {
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<OutboundEmail>();
        tokio::spawn(async move {
            while let Some(mail) = rx.recv().await {
                info!(to = %mail.to, subject = %mail.subject, "dispatching email");
            }
        });
        Self { tx }
    }

    /// Queue a message. Never blocks and never fails the caller; a
    /// closed worker is logged and the mail dropped.
    pub fn dispatch(&self, mail: OutboundEmail) {
        if self.tx.send(mail).is_err() {
            warn!("mail worker is gone; dropping outbound email");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_does_not_block_or_fail() {
        let mailer = Mailer::spawn();
        mailer.dispatch(OutboundEmail::password_reset(
            "bob@example.com",
            "bob",
            "token123",
        ));
    }

    #[test]
    fn password_reset_mail_carries_the_token() {
        let mail = OutboundEmail::password_reset("bob@example.com", "bob", "tok-abc");
        assert_eq!(mail.to, "bob@example.com");
        assert!(mail.body.contains("tok-abc"));
        assert!(mail.body.contains("bob"));
    }
}
