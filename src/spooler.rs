//! Spooler resource: one outbound campaign or transactional stream.

use crate::client::Client;
use crate::domain::Domain;
use crate::filter::Filter;
use crate::mail::{SpoolerBatch, SpoolerMail};
use crate::message::SpoolerMessage;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// The two kinds of spoolers the platform distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpoolerType {
    /// Bulk campaign traffic.
    Marketing,
    /// One-off transactional traffic.
    Transactional,
}

impl SpoolerType {
    /// Wire name of this spooler type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marketing => "marketing",
            Self::Transactional => "transactional",
        }
    }
}

impl std::fmt::Display for SpoolerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw spooler record as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct SpoolerRecord {
    /// Opaque token identifying the spooler.
    pub token: String,
    /// Marketing or transactional.
    #[serde(rename = "type")]
    pub kind: SpoolerType,
    /// Name of the owning sending domain.
    pub domain: String,
    /// Human-readable spooler name, if one was set.
    #[serde(default)]
    pub name: Option<String>,
    /// Scheduled start as a unix timestamp, if one was set.
    #[serde(default)]
    pub start: Option<i64>,
    /// Free-form tags attached to the spooler.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Remaining record fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Handle on one spooler.
///
/// Read accessors serve the locally cached record; every mutator posts to the
/// API and replaces the cached record with the server's reply, so the
/// getters always reflect the last acknowledged state.
#[derive(Debug, Clone)]
pub struct Spooler {
    client: Client,
    record: SpoolerRecord,
}

impl Spooler {
    pub(crate) fn from_value(client: Client, data: Value) -> Result<Self> {
        let record = serde_json::from_value(data)?;
        Ok(Self { client, record })
    }

    fn path(&self, suffix: &str) -> String {
        format!("spooler/{}{}", self.record.token, suffix)
    }

    /// The spooler's identifying token.
    pub fn token(&self) -> &str {
        &self.record.token
    }

    /// Marketing or transactional.
    pub fn kind(&self) -> SpoolerType {
        self.record.kind
    }

    /// Name of the owning sending domain.
    pub fn domain_name(&self) -> &str {
        &self.record.domain
    }

    /// Human-readable spooler name, if set.
    pub fn name(&self) -> Option<&str> {
        self.record.name.as_deref()
    }

    /// Scheduled start timestamp, if set.
    pub fn start(&self) -> Option<i64> {
        self.record.start
    }

    /// Tags attached to this spooler.
    pub fn tags(&self) -> Option<&[String]> {
        self.record.tags.as_deref()
    }

    /// The full record this handle was built from.
    pub fn record(&self) -> &SpoolerRecord {
        &self.record
    }

    /// Rename the spooler.
    pub async fn set_name(&mut self, name: &str) -> Result<()> {
        let data = self
            .client
            .call(&self.path("/name"), Some(&json!({ "name": name })))
            .await?;
        self.record = serde_json::from_value(data)?;
        Ok(())
    }

    /// Schedule the spooler start (unix timestamp).
    pub async fn set_start(&mut self, timestamp: i64) -> Result<()> {
        let data = self
            .client
            .call(&self.path("/start"), Some(&json!({ "start": timestamp })))
            .await?;
        self.record = serde_json::from_value(data)?;
        Ok(())
    }

    /// Replace the spooler's tag list.
    pub async fn set_tags(&mut self, tags: &[String]) -> Result<()> {
        let data = self
            .client
            .call(&self.path("/tags"), Some(&json!({ "tags": tags })))
            .await?;
        self.record = serde_json::from_value(data)?;
        Ok(())
    }

    /// Mark the spooler ready for sending.
    pub async fn ready(&self) -> Result<()> {
        self.client.call(&self.path("/ready"), Some(&json!({}))).await?;
        Ok(())
    }

    /// Close the spooler: no further mails will be accepted.
    pub async fn finish(&self) -> Result<()> {
        self.client.call(&self.path("/finish"), Some(&json!({}))).await?;
        Ok(())
    }

    /// Cancel the spooler and drop its pending mails.
    pub async fn cancel(&self) -> Result<()> {
        self.client.call(&self.path("/cancel"), Some(&json!({}))).await?;
        Ok(())
    }

    /// Fetch the owning sending domain.
    pub async fn domain(&self) -> Result<Domain> {
        self.client.domain(&self.record.domain).await
    }

    /// Delivery statistics for this spooler.
    pub async fn statistics(&self, group_by: &str) -> Result<Value> {
        let params = json!({ "groupBy": group_by });
        self.client
            .call(&format!("statistics/spooler/{}", self.token()), Some(&params))
            .await
    }

    /// Activity timeline for this spooler.
    pub async fn timeline(&self) -> Result<Value> {
        self.client
            .call(&format!("timeline/spooler/{}", self.token()), Some(&json!({})))
            .await
    }

    /// Fetch the spooler's current message template.
    pub async fn message(&self) -> Result<SpoolerMessage> {
        let data = self.client.call(&self.path("/message"), None).await?;
        let Value::Object(draft) = data else {
            return Err(crate::Error::ResponseParse(
                "message endpoint did not return an object",
            ));
        };
        Ok(SpoolerMessage::new(
            self.client.clone(),
            self.token().to_string(),
            draft,
        ))
    }

    /// Start a blank message template, discarding nothing server-side until
    /// [`SpoolerMessage::save`] is called.
    pub fn new_message(&self) -> SpoolerMessage {
        SpoolerMessage::new(self.client.clone(), self.token().to_string(), Map::new())
    }

    /// Start an empty batch of mail submissions for this spooler.
    pub fn batch(&self) -> SpoolerBatch {
        SpoolerBatch::new(self.client.clone(), self.token().to_string())
    }

    /// Start a single pending mail submission for `email`.
    pub fn mail(&self, email: impl Into<String>) -> SpoolerMail {
        SpoolerMail::new(self.client.clone(), self.token().to_string(), email)
    }

    /// Filter over this spooler's delivery events of the given kind.
    ///
    /// Items are raw event records; the event stream has no richer local
    /// representation.
    pub fn events(&self, event: &str) -> Filter<Value> {
        let mut filter = Filter::new(
            self.client.clone(),
            format!("events/spooler/{}/count", self.token()),
            format!("events/spooler/{}/fetch", self.token()),
            |_, raw| Ok(raw),
        );
        filter.set_criterion("event", event);
        filter
    }
}

impl Filter<Spooler> {
    /// Restrict the listing to spoolers of one sending domain. May be called
    /// repeatedly to select several domains.
    pub fn domain(&mut self, name: &str) {
        self.append_criterion("domains", name);
    }

    /// Restrict the listing to spoolers in one state. May be called
    /// repeatedly to select several states.
    pub fn state(&mut self, state: &str) {
        self.append_criterion("states", state);
    }
}
