use dwatch_sdk::objects::{NotificationPayload, entrypoints};

use super::{FormatContext, MalformedOperationError, require_record, shorten_address, tzkt_url};
use crate::grouping::OperationGroup;

pub fn format_end_voting(
    group: &OperationGroup,
    ctx: &FormatContext<'_>,
) -> Result<NotificationPayload, MalformedOperationError> {
    let end_voting_call = require_record(group, entrypoints::END_VOTING)?;
    let closer = &end_voting_call.source;

    Ok(NotificationPayload::text(format!(
        ":lock: **[{}](<{}>)** Closed voting (if things passed, they moved to the timelock and escrow was returned) **[TX](<{}>)**",
        shorten_address(closer),
        tzkt_url(closer),
        ctx.operation_link(&end_voting_call.hash),
    )))
}
