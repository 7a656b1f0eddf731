//! Message drafts: the content sent through a spooler.
//!
//! A draft is a JSON object assembled locally. Scalar fields (subject,
//! sender, ...) are plain local edits; parts, attachments, and unsubscribe
//! blocks are uploaded as remote resources whose ids are recorded in the
//! draft. A spooler's shared template ([`SpoolerMessage`]) is pushed with
//! [`SpoolerMessage::save`]; a per-mail draft ([`MailMessage`]) travels
//! inside the mail payload when it is spooled.

use crate::client::Client;
use crate::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value, json};

fn get_str<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

fn push_value(data: &mut Map<String, Value>, key: &str, value: Value) {
    let slot = data
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(values) = slot {
        values.push(value);
    }
}

async fn upload_part(client: &Client, endpoint: &str, kind: &str, content: &str) -> Result<Value> {
    let params = json!({ "type": kind, "content": content });
    client.call(endpoint, Some(&params)).await
}

async fn upload_attachment(
    client: &Client,
    endpoint: &str,
    kind: &str,
    content: &[u8],
    filename: Option<&str>,
) -> Result<Value> {
    let mut params = json!({ "type": kind, "content": BASE64.encode(content) });
    if let Some(name) = filename {
        params["filename"] = name.into();
    }
    client.call(endpoint, Some(&params)).await
}

/// The spooler's shared message template.
///
/// Obtain it with [`Spooler::message`](crate::Spooler::message) (current
/// server-side template) or [`Spooler::new_message`](crate::Spooler::new_message)
/// (blank draft). Edits stay local until [`SpoolerMessage::save`].
#[derive(Debug, Clone)]
pub struct SpoolerMessage {
    client: Client,
    spooler_token: String,
    data: Map<String, Value>,
}

impl SpoolerMessage {
    pub(crate) fn new(client: Client, spooler_token: String, data: Map<String, Value>) -> Self {
        Self {
            client,
            spooler_token,
            data,
        }
    }

    fn resource_endpoint(&self, resource: &str) -> String {
        format!("spooler/{}/resources/{resource}", self.spooler_token)
    }

    /// Subject line, if set.
    pub fn subject(&self) -> Option<&str> {
        get_str(&self.data, "subject")
    }

    /// Set the subject line.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.data.insert("subject".to_string(), subject.into().into());
    }

    /// Sender address, if set.
    pub fn sender(&self) -> Option<&str> {
        get_str(&self.data, "sender")
    }

    /// Set the sender address.
    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.data.insert("sender".to_string(), sender.into().into());
    }

    /// Recipient display template, if set.
    pub fn recipient(&self) -> Option<&str> {
        get_str(&self.data, "recipient")
    }

    /// Set the recipient display template.
    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.data
            .insert("recipient".to_string(), recipient.into().into());
    }

    /// Additional SMTP headers, if set.
    pub fn headers(&self) -> Option<&Value> {
        self.data.get("headers")
    }

    /// Replace the additional SMTP headers.
    pub fn set_headers(&mut self, headers: Value) {
        self.data.insert("headers".to_string(), headers);
    }

    /// Substitution variables, if set.
    pub fn variables(&self) -> Option<&Value> {
        self.data.get("variables")
    }

    /// Replace the substitution variables.
    pub fn set_variables(&mut self, variables: Value) {
        self.data.insert("variables".to_string(), variables);
    }

    /// Resource ids of the uploaded body parts.
    pub fn parts(&self) -> Option<&Value> {
        self.data.get("parts")
    }

    /// Resource ids of the uploaded attachments.
    pub fn attachments(&self) -> Option<&Value> {
        self.data.get("attachments")
    }

    /// Upload a body part (e.g. `text/html` content) and record its resource
    /// id in the draft.
    pub async fn add_part(&mut self, kind: &str, content: &str) -> Result<()> {
        let id = upload_part(&self.client, &self.resource_endpoint("part"), kind, content).await?;
        push_value(&mut self.data, "parts", id);
        Ok(())
    }

    /// Upload an attachment and record its resource id in the draft. The
    /// content is base64-encoded on the wire.
    pub async fn add_attachment(
        &mut self,
        kind: &str,
        content: &[u8],
        filename: Option<&str>,
    ) -> Result<()> {
        let id = upload_attachment(
            &self.client,
            &self.resource_endpoint("attachment"),
            kind,
            content,
            filename,
        )
        .await?;
        push_value(&mut self.data, "attachments", id);
        Ok(())
    }

    /// Upload an unsubscribe block and record its resource id in the draft.
    pub async fn set_unsubscribe(&mut self, kind: &str, content: &str) -> Result<()> {
        let id = upload_part(
            &self.client,
            &self.resource_endpoint("unsubscribe"),
            kind,
            content,
        )
        .await?;
        self.data.insert("unsubscribe".to_string(), id);
        Ok(())
    }

    /// Drop the whole local draft.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Drop the recorded body parts from the local draft.
    pub fn reset_parts(&mut self) {
        self.data.remove("parts");
    }

    /// Drop the recorded attachments from the local draft.
    pub fn reset_attachments(&mut self) {
        self.data.remove("attachments");
    }

    /// Push the draft as the spooler's message template and replace the
    /// local draft with the stored version.
    pub async fn save(&mut self) -> Result<()> {
        let endpoint = format!("spooler/{}/message", self.spooler_token);
        let body = Value::Object(self.data.clone());
        let stored = self.client.call(&endpoint, Some(&body)).await?;
        if let Value::Object(data) = stored {
            self.data = data;
        }
        Ok(())
    }

    /// The raw draft object.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// Per-mail message draft, borrowed from a [`SpoolerMail`](crate::SpoolerMail).
///
/// Edits land directly in the mail's payload; there is no separate save
/// step. Resource uploads go through the spooler's per-mail resource
/// endpoints.
#[derive(Debug)]
pub struct MailMessage<'a> {
    client: &'a Client,
    spooler_token: &'a str,
    data: &'a mut Map<String, Value>,
}

impl<'a> MailMessage<'a> {
    pub(crate) fn new(
        client: &'a Client,
        spooler_token: &'a str,
        data: &'a mut Map<String, Value>,
    ) -> Self {
        Self {
            client,
            spooler_token,
            data,
        }
    }

    fn resource_endpoint(&self, resource: &str) -> String {
        format!("spooler/{}/mails/resources/{resource}", self.spooler_token)
    }

    /// Subject line, if set.
    pub fn subject(&self) -> Option<&str> {
        get_str(self.data, "subject")
    }

    /// Set the subject line for this mail only.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.data.insert("subject".to_string(), subject.into().into());
    }

    /// Sender address, if set.
    pub fn sender(&self) -> Option<&str> {
        get_str(self.data, "sender")
    }

    /// Set the sender address for this mail only.
    pub fn set_sender(&mut self, sender: impl Into<String>) {
        self.data.insert("sender".to_string(), sender.into().into());
    }

    /// Recipient display template, if set.
    pub fn recipient(&self) -> Option<&str> {
        get_str(self.data, "recipient")
    }

    /// Set the recipient display template for this mail only.
    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.data
            .insert("recipient".to_string(), recipient.into().into());
    }

    /// Replace the additional SMTP headers for this mail only.
    pub fn set_headers(&mut self, headers: Value) {
        self.data.insert("headers".to_string(), headers);
    }

    /// Replace the substitution variables for this mail only.
    pub fn set_variables(&mut self, variables: Value) {
        self.data.insert("variables".to_string(), variables);
    }

    /// Resource ids of the body parts uploaded for this mail.
    pub fn parts(&self) -> Option<&Value> {
        self.data.get("parts")
    }

    /// Resource ids of the attachments uploaded for this mail.
    pub fn attachments(&self) -> Option<&Value> {
        self.data.get("attachments")
    }

    /// Upload a body part for this mail and record its resource id.
    pub async fn add_part(&mut self, kind: &str, content: &str) -> Result<()> {
        let id = upload_part(self.client, &self.resource_endpoint("part"), kind, content).await?;
        push_value(self.data, "parts", id);
        Ok(())
    }

    /// Upload an attachment for this mail and record its resource id. The
    /// content is base64-encoded on the wire.
    pub async fn add_attachment(
        &mut self,
        kind: &str,
        content: &[u8],
        filename: Option<&str>,
    ) -> Result<()> {
        let id = upload_attachment(
            self.client,
            &self.resource_endpoint("attachment"),
            kind,
            content,
            filename,
        )
        .await?;
        push_value(self.data, "attachments", id);
        Ok(())
    }

    /// Upload an unsubscribe block for this mail and record its resource id.
    pub async fn set_unsubscribe(&mut self, kind: &str, content: &str) -> Result<()> {
        let id = upload_part(
            self.client,
            &self.resource_endpoint("unsubscribe"),
            kind,
            content,
        )
        .await?;
        self.data.insert("unsubscribe".to_string(), id);
        Ok(())
    }
}
