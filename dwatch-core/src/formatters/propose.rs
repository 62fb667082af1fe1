use dwatch_sdk::objects::{Embed, EmbedField, EmbedThumbnail, NotificationPayload, entrypoints};

use super::{
    EMBED_COLOR, FormatContext, MalformedOperationError, require_record, require_value,
    shorten_address, tzkt_url,
};
use crate::grouping::OperationGroup;

const TITLE_PATH: [usize; 2] = [0, 0];
const DESCRIPTION_LINK_PATH: [usize; 2] = [0, 1];
// child 2 is the proposal hash, which is not shown
const LAMBDA_PATH: [usize; 2] = [0, 3];

pub fn format_propose(
    group: &OperationGroup,
    ctx: &FormatContext<'_>,
) -> Result<NotificationPayload, MalformedOperationError> {
    let propose_call = require_record(group, entrypoints::PROPOSE)?;
    let title = require_value(propose_call, &TITLE_PATH)?;
    let description_link = require_value(propose_call, &DESCRIPTION_LINK_PATH)?;
    let lambda = require_value(propose_call, &LAMBDA_PATH)?;

    let proposer = &propose_call.source;
    let content = format!(
        ":office_worker: :scales: **[{}]({})** submitted a new proposal to the DAO! **[Link]({})**",
        shorten_address(proposer),
        tzkt_url(proposer),
        ctx.style.governance_url,
    );

    Ok(NotificationPayload::text(content).with_embed(Embed {
        color: Some(EMBED_COLOR),
        fields: vec![
            EmbedField::new("Title", title),
            EmbedField::new(
                "Description",
                format!("[Link To Description]({description_link})"),
            ),
            EmbedField::new("Lambda", format!("```{lambda}```")),
        ],
        thumbnail: Some(EmbedThumbnail {
            url: format!("https://services.tzkt.io/v1/avatars/{proposer}"),
        }),
        ..Default::default()
    }))
}
