//! Operation records as returned by the Better Call Dev indexing API.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Entrypoint names the watcher cares about.
pub mod entrypoints {
    pub const VOTE: &str = "vote";
    pub const VOTE_CALLBACK: &str = "voteCallback";
    pub const PROPOSE: &str = "propose";
    pub const TRANSFER: &str = "transfer";
    pub const EXECUTE_TIMELOCK: &str = "executeTimelock";
    pub const END_VOTING: &str = "endVoting";
    pub const CANCEL_TIMELOCK: &str = "cancelTimelock";

    /// Entrypoints requested from the indexer. Internal calls such as
    /// `voteCallback` and `transfer` come back alongside these because they
    /// share the originating operation's counter.
    pub const WATCHED: [&str; 5] = [VOTE, PROPOSE, EXECUTE_TIMELOCK, END_VOTING, CANCEL_TIMELOCK];
}

/// The record timestamp could not be parsed as RFC 3339.
#[derive(Debug, Error)]
#[error("invalid operation timestamp {raw:?}: {source}")]
pub struct TimestampError {
    pub raw: String,
    #[source]
    pub source: time::error::Parse,
}

/// One on-chain operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Shared by every call spawned from the same originating transaction.
    pub counter: i64,
    #[serde(default)]
    pub entrypoint: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    /// ISO-8601 timestamp, e.g. `2021-09-08T15:37:24Z`.
    pub timestamp: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<ParameterNode>,
}

impl OperationRecord {
    /// Parsed timestamp.
    pub fn timestamp(&self) -> Result<OffsetDateTime, TimestampError> {
        OffsetDateTime::parse(&self.timestamp, &Rfc3339).map_err(|source| TimestampError {
            raw: self.timestamp.clone(),
            source,
        })
    }

    /// Timestamp in milliseconds since the epoch, truncated to whole seconds.
    ///
    /// The indexer reports second-precision times, so the sub-second part is
    /// dropped to keep cursors comparable with the `from` query parameter.
    pub fn timestamp_millis(&self) -> Result<i64, TimestampError> {
        Ok(self.timestamp()?.unix_timestamp() * 1000)
    }

    /// Parameter at `index` of the top-level parameter list.
    pub fn parameter(&self, index: usize) -> Option<&ParameterNode> {
        self.parameters.get(index)
    }
}

/// A typed Michelson argument node. Pairs and records nest through `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterNode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<ParameterNode>,
}

impl ParameterNode {
    /// Child node at `index`.
    pub fn child(&self, index: usize) -> Option<&ParameterNode> {
        self.children.get(index)
    }

    /// The node value rendered as text. Numbers come back as their decimal
    /// representation; nested values are not rendered.
    pub fn value_str(&self) -> Option<String> {
        match self.value.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// One page of `GET /contract/{network}/{address}/operations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationsPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub operations: Vec<OperationRecord>,
    /// Continuation token for the next (older) page, absent on the last one.
    #[serde(default)]
    pub last_id: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOTE_PAGE: &str = r#"{
        "operations": [
            {
                "counter": 1204,
                "entrypoint": "voteCallback",
                "source": "KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2",
                "destination": "KT1E3aVbNwX5AwpSQ151dp3Qg4Wf9mGEs3ex",
                "timestamp": "2021-09-08T15:37:24Z",
                "hash": "opHASH1",
                "status": "applied",
                "parameters": [
                    {
                        "prim": "pair",
                        "type": "namedtuple",
                        "name": "@pair_1",
                        "children": [
                            { "prim": "address", "type": "address", "name": "address", "value": "tz1voter" },
                            { "prim": "nat", "type": "nat", "name": "voteValue", "value": "0" },
                            { "prim": "nat", "type": "nat", "name": "votes", "value": "2500000000000000000" }
                        ]
                    }
                ]
            },
            {
                "counter": 1204,
                "entrypoint": "vote",
                "source": "tz1voter",
                "timestamp": "2021-09-08T15:37:24Z",
                "hash": "opHASH1",
                "parameters": [ { "prim": "nat", "type": "nat", "name": "vote", "value": 0 } ]
            },
            {
                "counter": 1190,
                "entrypoint": "endVoting",
                "source": "tz1closer",
                "timestamp": "2021-09-07T10:00:00Z",
                "hash": "opHASH0",
                "parameters": null
            }
        ],
        "last_id": "84211"
    }"#;

    #[test]
    fn test_page_deserialization() {
        let page: OperationsPage = serde_json::from_str(VOTE_PAGE).unwrap();
        assert_eq!(page.operations.len(), 3);
        assert_eq!(page.last_id.as_deref(), Some("84211"));

        let callback = &page.operations[0];
        assert_eq!(callback.counter, 1204);
        assert_eq!(callback.entrypoint, entrypoints::VOTE_CALLBACK);
        let votes = callback.parameter(0).and_then(|p| p.child(2)).unwrap();
        assert_eq!(votes.value_str().as_deref(), Some("2500000000000000000"));

        // numeric values render as text
        let vote = page.operations[1].parameter(0).unwrap();
        assert_eq!(vote.value_str().as_deref(), Some("0"));
        assert!(page.operations[1].destination.is_empty());

        assert!(page.operations[2].parameters.is_empty());
    }

    #[test]
    fn test_last_page_has_no_token() {
        let page: OperationsPage = serde_json::from_str(r#"{"operations": []}"#).unwrap();
        assert!(page.operations.is_empty());
        assert!(page.last_id.is_none());
    }

    #[test]
    fn test_timestamp_millis_truncates_to_seconds() {
        let page: OperationsPage = serde_json::from_str(VOTE_PAGE).unwrap();
        assert_eq!(page.operations[0].timestamp_millis().unwrap(), 1_631_115_444_000);

        let mut record = page.operations[0].clone();
        record.timestamp = "2021-09-08T15:37:24.750Z".to_string();
        assert_eq!(record.timestamp_millis().unwrap(), 1_631_115_444_000);

        record.timestamp = "yesterday".to_string();
        assert!(record.timestamp_millis().is_err());
    }
}
