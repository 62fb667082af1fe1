//! Notification formatters, one per [`OperationKind`].
//!
//! Each formatter sees the whole group: the data it needs is often spread
//! over sibling records (the vote amount lives in `voteCallback`, the calls a
//! timelock made are separate records). Formatters are pure; a missing record
//! or parameter fails the group with [`MalformedOperationError`].

mod end_voting;
mod propose;
mod timelock;
mod vote;

pub use end_voting::format_end_voting;
pub use propose::format_propose;
pub use timelock::format_execute_timelock;
pub use vote::{VoteChoice, format_vote};

use dwatch_sdk::objects::{NotificationPayload, OperationRecord, ParameterNode};
use thiserror::Error;

use crate::classifier::OperationKind;
use crate::config::NotificationStyle;
use crate::grouping::OperationGroup;

/// Accent colour of rich embeds.
pub const EMBED_COLOR: u32 = 4111763;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedOperationError {
    #[error("no `{entrypoint}` record in group")]
    MissingRecord { entrypoint: String },

    #[error("`{entrypoint}` record has no parameter at {path}")]
    MissingParameter { entrypoint: String, path: String },

    #[error("`{entrypoint}` parameter at {path} is invalid: {reason}")]
    InvalidValue {
        entrypoint: String,
        path: String,
        reason: String,
    },
}

/// What formatters need besides the group itself.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    /// Tezos network name used in explorer links, e.g. `mainnet`.
    pub network: &'a str,
    pub style: &'a NotificationStyle,
}

impl FormatContext<'_> {
    pub(crate) fn operation_link(&self, hash: &str) -> String {
        format!("https://better-call.dev/{}/opg/{}", self.network, hash)
    }

    pub(crate) fn contract_link(&self, address: &str) -> String {
        format!("https://better-call.dev/{}/{}/operations", self.network, address)
    }
}

/// Format `group` as the notification for `kind`.
pub fn format_notification(
    kind: OperationKind,
    group: &OperationGroup,
    ctx: &FormatContext<'_>,
) -> Result<NotificationPayload, MalformedOperationError> {
    match kind {
        OperationKind::Vote => format_vote(group, ctx),
        OperationKind::Propose => format_propose(group, ctx),
        OperationKind::ExecuteTimelock => format_execute_timelock(group, ctx),
        OperationKind::EndVoting => format_end_voting(group, ctx),
    }
}

/// `tz1AbCdE...vWxYz`: first five and last five characters.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}...{tail}")
}

pub(crate) fn tzkt_url(address: &str) -> String {
    format!("https://tzkt.io/{address}")
}

pub(crate) fn require_record<'g>(
    group: &'g OperationGroup,
    entrypoint: &str,
) -> Result<&'g OperationRecord, MalformedOperationError> {
    group
        .find(entrypoint)
        .ok_or_else(|| MalformedOperationError::MissingRecord {
            entrypoint: entrypoint.to_string(),
        })
}

/// Walk `path` from the record's parameter list: the first index selects a
/// top-level parameter, each following index a child.
pub(crate) fn require_parameter<'r>(
    record: &'r OperationRecord,
    path: &[usize],
) -> Result<&'r ParameterNode, MalformedOperationError> {
    let missing = || MalformedOperationError::MissingParameter {
        entrypoint: record.entrypoint.clone(),
        path: render_path(path),
    };

    let (first, rest) = path.split_first().ok_or_else(missing)?;
    let mut node = record.parameter(*first).ok_or_else(missing)?;
    for index in rest {
        node = node.child(*index).ok_or_else(missing)?;
    }
    Ok(node)
}

/// Text value of the parameter at `path`.
pub(crate) fn require_value(
    record: &OperationRecord,
    path: &[usize],
) -> Result<String, MalformedOperationError> {
    require_parameter(record, path)?
        .value_str()
        .ok_or_else(|| MalformedOperationError::MissingParameter {
            entrypoint: record.entrypoint.clone(),
            path: render_path(path),
        })
}

pub(crate) fn render_path(path: &[usize]) -> String {
    let mut rendered = String::from("parameters");
    for (depth, index) in path.iter().enumerate() {
        if depth == 0 {
            rendered.push_str(&format!("[{index}]"));
        } else {
            rendered.push_str(&format!(".children[{index}]"));
        }
    }
    rendered
}
