//! Pending mail submissions and client-side batching.

use crate::client::Client;
use crate::message::MailMessage;
use crate::Result;
use serde_json::{Map, Value, json};

/// One pending mail submission for a spooler.
///
/// Holds the recipient address plus an optional per-mail draft overriding
/// the spooler's message template. Nothing is sent until [`SpoolerMail::spool`]
/// (or the owning batch) is called.
#[derive(Debug, Clone)]
pub struct SpoolerMail {
    client: Client,
    spooler_token: String,
    email: String,
    data: Map<String, Value>,
}

impl SpoolerMail {
    pub(crate) fn new(client: Client, spooler_token: String, email: impl Into<String>) -> Self {
        Self {
            client,
            spooler_token,
            email: email.into(),
            data: Map::new(),
        }
    }

    /// The recipient address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Per-mail message draft. Edits land in this mail's payload.
    pub fn message(&mut self) -> MailMessage<'_> {
        MailMessage::new(&self.client, &self.spooler_token, &mut self.data)
    }

    fn payload(&self) -> Value {
        let mut record = Map::new();
        record.insert("email".to_string(), self.email.clone().into());
        for (key, value) in &self.data {
            record.insert(key.clone(), value.clone());
        }
        Value::Object(record)
    }

    /// Queue this mail for delivery.
    pub async fn spool(&self) -> Result<Value> {
        self.submit("spool").await
    }

    /// Send a draft copy of this mail to the domain's draft addresses.
    pub async fn draft(&self) -> Result<Value> {
        self.submit("draft").await
    }

    /// Render this mail server-side without queuing it.
    pub async fn preview(&self) -> Result<Value> {
        self.submit("preview").await
    }

    async fn submit(&self, action: &str) -> Result<Value> {
        let endpoint = format!("spooler/{}/{action}", self.spooler_token);
        let params = json!({ "mails": [self.payload()] });
        self.client.call(&endpoint, Some(&params)).await
    }
}

/// Client-side aggregation of pending mails, submitted in one API call.
///
/// # Examples
/// ```no_run
/// # use octosend_client::Client;
/// # #[tokio::main]
/// # async fn main() -> Result<(), octosend_client::Error> {
/// # let client = Client::new("key")?;
/// let spooler = client.spooler("tok").await?;
/// let mut batch = spooler.batch();
/// batch.mail("alice@example.com");
/// batch.mail("bob@example.com").message().set_subject("just for bob");
/// batch.spool().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SpoolerBatch {
    client: Client,
    spooler_token: String,
    mails: Vec<SpoolerMail>,
}

impl SpoolerBatch {
    pub(crate) fn new(client: Client, spooler_token: String) -> Self {
        Self {
            client,
            spooler_token,
            mails: Vec::new(),
        }
    }

    /// Append a pending mail for `email` and return it for per-mail edits.
    pub fn mail(&mut self, email: impl Into<String>) -> &mut SpoolerMail {
        let mail = SpoolerMail::new(self.client.clone(), self.spooler_token.clone(), email);
        self.mails.push(mail);
        self.mails.last_mut().expect("just pushed")
    }

    /// Pending mails accumulated so far.
    pub fn mails(&self) -> &[SpoolerMail] {
        &self.mails
    }

    /// Queue all pending mails for delivery in one call.
    pub async fn spool(&self) -> Result<Value> {
        self.submit("spool").await
    }

    /// Send draft copies of all pending mails.
    pub async fn draft(&self) -> Result<Value> {
        self.submit("draft").await
    }

    /// Render all pending mails server-side without queuing them.
    pub async fn preview(&self) -> Result<Value> {
        self.submit("preview").await
    }

    async fn submit(&self, action: &str) -> Result<Value> {
        let endpoint = format!("spooler/{}/{action}", self.spooler_token);
        let payloads: Vec<Value> = self.mails.iter().map(SpoolerMail::payload).collect();
        let params = json!({ "mails": payloads });
        self.client.call(&endpoint, Some(&params)).await
    }
}
