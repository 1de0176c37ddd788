use async_trait::async_trait;
use chirp_core::config::SmtpConfig;
use chirp_core::{Account, ChirpError, ChirpResult, Notifier};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

const CONFIRMATION_SUBJECT: &str = "Thanks for signing up! Please confirm your email address";

/// Link the user follows to confirm their address.
pub fn confirmation_link(public_url: &str, token: &str) -> String {
    format!("{}/signup/confirm/{token}", public_url.trim_end_matches('/'))
}

fn confirmation_body(account: &Account, link: &str) -> String {
    format!(
        "Hi {},\n\nThanks for signing up. Please confirm your email address by visiting:\n\n{link}\n\nIf you did not sign up, you can ignore this message.\n",
        account.name
    )
}

/// Sends confirmation mail over SMTP.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    public_url: String,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig, public_url: impl Into<String>) -> ChirpResult<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| ChirpError::Notification(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(creds)
            .build();
        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            public_url: public_url.into(),
        })
    }

    async fn send_email(&self, to: &str, subject: &str, body: String) -> ChirpResult<()> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| ChirpError::Notification(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| ChirpError::Notification(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| ChirpError::Notification(format!("failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| ChirpError::Notification(format!("failed to send email: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_confirmation(&self, account: &Account, token: &str) -> ChirpResult<()> {
        let link = confirmation_link(&self.public_url, token);
        self.send_email(
            &account.email,
            CONFIRMATION_SUBJECT,
            confirmation_body(account, &link),
        )
        .await?;
        tracing::info!(account_id = %account.id, "confirmation email sent");
        Ok(())
    }
}

/// Used when no SMTP server is configured: the link goes to the log.
pub struct LogNotifier {
    public_url: String,
}

impl LogNotifier {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_confirmation(&self, account: &Account, token: &str) -> ChirpResult<()> {
        tracing::info!(
            account_id = %account.id,
            email = %account.email,
            link = %confirmation_link(&self.public_url, token),
            "SMTP not configured, confirmation link logged instead"
        );
        Ok(())
    }
}
