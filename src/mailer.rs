use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use log::{debug, info};
use thiserror::Error;

use crate::config::{self, MailerAccount};
use crate::template::render_template;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid address '{0}': {1}")]
    AddressError(String, lettre::address::AddressError),

    #[error("Invalid content type: {0}")]
    ContentTypeError(#[from] lettre::message::header::ContentTypeErr),

    #[error("Failed to build message: {0}")]
    MessageError(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),
}

/// Parses a comma-separated recipient string into mailboxes.
///
/// Accepts both bare addresses (`a@b.com`) and display-name forms
/// (`Name <a@b.com>`); empty segments are skipped. Syntax beyond what a
/// mailbox header needs is not validated here, the relay has the final say.
pub fn parse_recipients(to: &str) -> Result<Vec<Mailbox>, EmailError> {
    let mut mailboxes = Vec::new();

    for part in to.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let mailbox = part
            .parse::<Mailbox>()
            .map_err(|e| EmailError::AddressError(part.to_string(), e))?;
        mailboxes.push(mailbox);
    }

    Ok(mailboxes)
}

/// Builds the outgoing message: a multipart/mixed container holding an
/// optional attachment part and a multipart/alternative part that wraps
/// the single HTML body.
pub fn compose_message(
    from: &str,
    to: &str,
    subject: &str,
    html_body: String,
    attachment_path: Option<&Path>,
) -> Result<Message, EmailError> {
    let from_mailbox = from
        .parse::<Mailbox>()
        .map_err(|e| EmailError::AddressError(from.to_string(), e))?;

    let mut builder = Message::builder().from(from_mailbox).subject(subject);
    for mailbox in parse_recipients(to)? {
        builder = builder.to(mailbox);
    }

    let body_part = MultiPart::alternative().singlepart(SinglePart::html(html_body));

    let multipart = match attachment_path {
        Some(path) => {
            let data = fs::read(path)?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            debug!("Attaching {} ({} bytes)", filename, data.len());

            let attachment_part = Attachment::new(filename)
                .body(data, ContentType::parse("application/octet-stream")?);

            MultiPart::mixed()
                .singlepart(attachment_part)
                .multipart(body_part)
        }
        None => MultiPart::mixed().multipart(body_part),
    };

    Ok(builder.multipart(multipart)?)
}

/// Sends templated HTML email through an SMTP relay.
///
/// Holds the sender credentials and resolved server settings; each send
/// re-renders the template, composes a fresh message and opens a fresh
/// STARTTLS session. Construct once, send as often as needed.
#[derive(Debug, Clone)]
pub struct Emailer {
    sender_email: String,
    sender_password: String,
    smtp_server: String,
    smtp_port: u16,
    template_path: PathBuf,
}

impl Emailer {
    /// Creates an emailer. `smtp_server` may be a provider alias
    /// (`"office"`, `"gmail"`) or a hostname; the port defaults to 587.
    pub fn new(
        sender_email: impl Into<String>,
        sender_password: impl Into<String>,
        smtp_server: &str,
        smtp_port: Option<u16>,
    ) -> Self {
        Self {
            sender_email: sender_email.into(),
            sender_password: sender_password.into(),
            smtp_server: config::resolve_smtp_server(smtp_server),
            smtp_port: config::resolve_smtp_port(smtp_port),
            template_path: config::default_template_path(),
        }
    }

    pub fn from_account(account: &MailerAccount) -> Self {
        let mut emailer = Self::new(
            account.sender_email.clone(),
            account.sender_password.clone(),
            &account.smtp_server,
            account.smtp_port,
        );
        if let Some(path) = &account.template_path {
            emailer.template_path = path.clone();
        }
        emailer
    }

    /// Overrides the bundled HTML template.
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    pub fn smtp_server(&self) -> &str {
        &self.smtp_server
    }

    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    /// Renders the template with `template_values`, composes the message
    /// (attaching the file at `attachment_path` if given) and hands it to
    /// the relay over a STARTTLS session authenticated with the sender
    /// credentials.
    ///
    /// `to` is a single comma-separated string of one or more addresses.
    /// Any failure aborts the whole send and surfaces the underlying
    /// error; nothing is retried.
    pub fn send_email(
        &self,
        to: &str,
        subject: &str,
        attachment_path: Option<&Path>,
        template_values: &HashMap<String, String>,
    ) -> Result<(), EmailError> {
        let html_body = render_template(&self.template_path, template_values)?;
        let message = compose_message(
            &self.sender_email,
            to,
            subject,
            html_body,
            attachment_path,
        )?;

        let mailer = self.build_transport()?;

        mailer.send(&message)?;
        info!("Sent '{}' to {} via {}", subject, to, self.smtp_server);

        Ok(())
    }

    // Plaintext connection upgraded to TLS before authentication. No
    // pooling; every send opens and closes its own session.
    fn build_transport(&self) -> Result<SmtpTransport, EmailError> {
        let tls_params = TlsParameters::new(self.smtp_server.clone())?;

        let creds = Credentials::new(
            self.sender_email.clone(),
            self.sender_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.smtp_server)?
            .credentials(creds)
            .port(self.smtp_port)
            .tls(Tls::Required(tls_params))
            .build())
    }
}
