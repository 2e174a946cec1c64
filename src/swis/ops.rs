use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use crate::Result;
use crate::bridge::SuppressionApi;
use crate::error::SwisError;
use crate::types::{NodeUri, SuppressionState};

use super::SwisClient;
use super::models::{
    EntityUris, QueryRequest, QueryResponse, RawSuppressionState, SuppressRequest, UriRow,
};

const NODE_BY_NAME: &str = "SELECT Uri FROM Orion.Nodes WHERE NodeName=@name";
const NODE_BY_IP: &str = "SELECT Uri FROM Orion.Nodes WHERE IPAddress=@ip";
const ALERT_SUPPRESSION: &str = "Orion.AlertSuppression";

impl SwisClient {
    /// Runs a single-parameter SWQL query and returns the first row, if any.
    async fn query_first<T>(&self, query: &str, param: &str, value: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = QueryRequest {
            query,
            parameters: BTreeMap::from([(param, value)]),
        };
        let response: QueryResponse<T> = self.post(&["Query"], &request).await?;
        let count = response.results.len();
        if count > 1 {
            debug!(query, count, "query matched several rows, using the first");
        }
        Ok(response.results.into_iter().next())
    }

    /// Looks a node up by its IP address.
    ///
    /// # Errors
    ///
    /// Returns [`SwisError::NodeNotFound`] when no node carries the address,
    /// or any transport/decoding error from the API.
    pub async fn find_node_uri_by_ip(&self, ip_address: &str) -> Result<NodeUri> {
        self.query_first::<UriRow>(NODE_BY_IP, "ip", ip_address)
            .await?
            .map(|row| row.uri)
            .ok_or_else(|| {
                SwisError::NodeNotFound {
                    key: "IPAddress",
                    value: ip_address.to_string(),
                }
                .into()
            })
    }

    async fn invoke_suppression<B>(&self, verb: &str, body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        self.post_unchecked(&["Invoke", ALERT_SUPPRESSION, verb], body)
            .await
    }
}

impl SuppressionApi for SwisClient {
    async fn find_node_uri(&self, node_name: &str) -> Result<NodeUri> {
        self.query_first::<UriRow>(NODE_BY_NAME, "name", node_name)
            .await?
            .map(|row| row.uri)
            .ok_or_else(|| {
                SwisError::NodeNotFound {
                    key: "NodeName",
                    value: node_name.to_string(),
                }
                .into()
            })
    }

    async fn suppression_state(&self, uri: &NodeUri) -> Result<SuppressionState> {
        let request = EntityUris {
            entity_uris: [uri.as_str()],
        };
        let states: Vec<RawSuppressionState> = self
            .post(
                &["Invoke", ALERT_SUPPRESSION, "GetAlertSuppressionState"],
                &request,
            )
            .await?;
        states
            .into_iter()
            .next()
            .map(SuppressionState::from)
            .ok_or_else(|| {
                SwisError::MissingField {
                    field: "GetAlertSuppressionState[0]",
                }
                .into()
            })
    }

    async fn suppress_alerts(&self, uri: &NodeUri, from: DateTime<Utc>) -> Result<()> {
        let suppress_from = from.to_rfc3339_opts(SecondsFormat::Millis, true);
        info!(%uri, %suppress_from, "suppressing alerts");
        let request = SuppressRequest {
            entity_uris: [uri.as_str()],
            suppress_from,
        };
        self.invoke_suppression("SuppressAlerts", &request).await
    }

    async fn resume_alerts(&self, uri: &NodeUri) -> Result<()> {
        info!(%uri, "resuming alerts");
        let request = EntityUris {
            entity_uris: [uri.as_str()],
        };
        self.invoke_suppression("ResumeAlerts", &request).await
    }
}
