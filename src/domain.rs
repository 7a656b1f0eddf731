//! Sending domain resource.

use crate::client::Client;
use crate::filter::Filter;
use crate::spooler::{Spooler, SpoolerType};
use crate::Result;
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Raw domain record as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainRecord {
    /// Fully qualified sending domain name.
    pub name: String,
    /// Remaining record fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Handle on one sending domain.
///
/// A domain groups the spoolers sending on its behalf. Obtain handles from
/// [`Client::domain`], [`Client::domains`], or [`Spooler::domain`].
#[derive(Debug, Clone)]
pub struct Domain {
    client: Client,
    record: DomainRecord,
}

impl Domain {
    pub(crate) fn from_value(client: Client, data: Value) -> Result<Self> {
        let record = serde_json::from_value(data)?;
        Ok(Self { client, record })
    }

    /// The domain name.
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// The full record this handle was built from.
    pub fn record(&self) -> &DomainRecord {
        &self.record
    }

    /// Filter over the spoolers attached to this domain.
    pub fn spoolers(&self) -> Filter<Spooler> {
        let mut filter = self.client.spoolers();
        filter.domain(self.name());
        filter
    }

    /// Create a new spooler of the given type under this domain.
    pub async fn create_spooler(&self, kind: SpoolerType) -> Result<Spooler> {
        let params = json!({ "domain": self.name(), "type": kind });
        let data = self.client.call("spoolers/create", Some(&params)).await?;
        Spooler::from_value(self.client.clone(), data)
    }

    /// Delivery statistics for this domain over a period.
    pub async fn statistics(&self, period: &str, group_by: &str) -> Result<Value> {
        let params = json!({ "period": period, "groupBy": group_by });
        self.client
            .call(&format!("statistics/domain/{}", self.name()), Some(&params))
            .await
    }

    /// Activity timeline for this domain, for one spooler type.
    pub async fn timeline(&self, kind: SpoolerType) -> Result<Value> {
        let params = json!({ "type": kind });
        self.client
            .call(&format!("timeline/domain/{}", self.name()), Some(&params))
            .await
    }

    /// Addresses receiving draft copies for this domain.
    pub async fn draft_addresses(&self) -> Result<Value> {
        self.client
            .call(&format!("domain/{}/draft-addresses", self.name()), None)
            .await
    }

    /// Replace the draft-copy address list; returns the stored list.
    pub async fn set_draft_addresses(&self, addresses: &[String]) -> Result<Value> {
        let params = json!({ "addresses": addresses });
        self.client
            .call(&format!("domain/{}/draft-addresses", self.name()), Some(&params))
            .await
    }
}
