use dwatch_sdk::objects::{NotificationPayload, entrypoints};

use super::{
    FormatContext, MalformedOperationError, render_path, require_record, require_value,
    shorten_address, tzkt_url,
};
use crate::grouping::OperationGroup;
use crate::utils::amount::format_token_amount;

/// Governance token decimals.
const TOKEN_DECIMALS: u32 = 18;
/// `vote` parameter holding the vote code.
const VOTE_VALUE_PATH: [usize; 1] = [0];
/// `voteCallback` parameter holding the raw vote weight.
const VOTE_AMOUNT_PATH: [usize; 2] = [0, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChoice {
    Yay,
    Nay,
    Abstain,
}

impl VoteChoice {
    /// 0 is YAY, 1 is NAY; the contract treats anything else as ABSTAIN.
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => VoteChoice::Yay,
            1 => VoteChoice::Nay,
            _ => VoteChoice::Abstain,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VoteChoice::Yay => "YAY",
            VoteChoice::Nay => "NAY",
            VoteChoice::Abstain => "ABSTAIN",
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            VoteChoice::Yay => "<:blobyes:883220230896242718>",
            VoteChoice::Nay => "<:blobno:883220231101763604>",
            VoteChoice::Abstain => "<:shrug:812037587908034590>",
        }
    }
}

pub fn format_vote(
    group: &OperationGroup,
    ctx: &FormatContext<'_>,
) -> Result<NotificationPayload, MalformedOperationError> {
    let vote_call = require_record(group, entrypoints::VOTE)?;
    let raw_choice = require_value(vote_call, &VOTE_VALUE_PATH)?;
    let choice = raw_choice
        .trim()
        .parse::<u64>()
        .map(VoteChoice::from_code)
        .map_err(|e| MalformedOperationError::InvalidValue {
            entrypoint: vote_call.entrypoint.clone(),
            path: render_path(&VOTE_VALUE_PATH),
            reason: e.to_string(),
        })?;

    let callback = require_record(group, entrypoints::VOTE_CALLBACK)?;
    let raw_amount = require_value(callback, &VOTE_AMOUNT_PATH)?;
    let amount = format_token_amount(&raw_amount, TOKEN_DECIMALS).map_err(|e| {
        MalformedOperationError::InvalidValue {
            entrypoint: callback.entrypoint.clone(),
            path: render_path(&VOTE_AMOUNT_PATH),
            reason: e.to_string(),
        }
    })?;

    let voter = &vote_call.source;
    Ok(NotificationPayload::text(format!(
        ":ballot_box: **[{}](<{}>)** voted {} **{}** with **{} {}** | **[TX](<{}>)**",
        shorten_address(voter),
        tzkt_url(voter),
        choice.emoji(),
        choice.label(),
        amount,
        ctx.style.token_symbol,
        ctx.operation_link(&vote_call.hash),
    )))
}
