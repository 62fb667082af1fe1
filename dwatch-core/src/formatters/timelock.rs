use dwatch_sdk::objects::{Embed, NotificationPayload, entrypoints};

use super::{
    EMBED_COLOR, FormatContext, MalformedOperationError, require_record, shorten_address, tzkt_url,
};
use crate::grouping::OperationGroup;

/// Header naming the executor, plus one line per call the timelocked lambda
/// made (every record in the group other than `executeTimelock` itself).
pub fn format_execute_timelock(
    group: &OperationGroup,
    ctx: &FormatContext<'_>,
) -> Result<NotificationPayload, MalformedOperationError> {
    let execute_call = require_record(group, entrypoints::EXECUTE_TIMELOCK)?;

    let executed: Vec<String> = group
        .records()
        .iter()
        .filter(|r| r.entrypoint != entrypoints::EXECUTE_TIMELOCK)
        .map(|r| {
            format!(
                "Called `%{}` on [{}](<{}>)",
                r.entrypoint,
                ctx.style.known_contracts.display_name(&r.destination),
                ctx.contract_link(&r.destination),
            )
        })
        .collect();

    let executor = &execute_call.source;
    let content = format!(
        ":timer_clock:  **[{}]({})** Executed the proposal in the {} timelock!",
        shorten_address(executor),
        tzkt_url(executor),
        ctx.style.dao_name,
    );

    Ok(NotificationPayload::text(content).with_embed(Embed {
        title: Some("Executed Operations".to_string()),
        description: (!executed.is_empty()).then(|| executed.join("\n")),
        color: Some(EMBED_COLOR),
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{op, single_group};
    use super::*;
    use crate::config::NotificationStyle;

    const EXECUTOR: &str = "tz1ExecutorAddressxxxxxxxxxxxxxxABCDE";

    fn render(group: &OperationGroup) -> Result<NotificationPayload, MalformedOperationError> {
        let style = NotificationStyle::default();
        let ctx = FormatContext {
            network: "mainnet",
            style: &style,
        };
        format_execute_timelock(group, &ctx)
    }

    #[test]
    fn test_execute_timelock_lists_side_effects() {
        let group = single_group(vec![
            op("executeTimelock", EXECUTOR, "KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2", vec![]),
            op(
                "setStabilityFee",
                "KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2",
                "KT1E3aVbNwX5AwpSQ151dp3Qg4Wf9mGEs3ex",
                vec![],
            ),
            op("setPaused", "KT1WZ1HJyx5wPt96ZTjtWPotoPUk7pXNPfT2", "KT1Other", vec![]),
        ]);

        let payload = render(&group).unwrap();

        assert_eq!(
            payload.content,
            ":timer_clock:  **[tz1Ex...ABCDE](https://tzkt.io/tz1ExecutorAddressxxxxxxxxxxxxxxABCDE)** \
             Executed the proposal in the Kolibri DAO timelock!"
        );
        let embed = &payload.embeds[0];
        assert_eq!(embed.title.as_deref(), Some("Executed Operations"));
        assert_eq!(
            embed.description.as_deref(),
            Some(
                "Called `%setStabilityFee` on [The Kolibri DAO](<https://better-call.dev/mainnet/KT1E3aVbNwX5AwpSQ151dp3Qg4Wf9mGEs3ex/operations>)\n\
                 Called `%setPaused` on [KT1Other](<https://better-call.dev/mainnet/KT1Other/operations>)"
            )
        );
    }

    #[test]
    fn test_execute_timelock_without_side_effects() {
        let group = single_group(vec![op("executeTimelock", EXECUTOR, "KT1dao", vec![])]);
        let payload = render(&group).unwrap();
        assert!(payload.embeds[0].description.is_none());
    }

    #[test]
    fn test_execute_timelock_requires_execute_record() {
        let group = single_group(vec![op("setPaused", "KT1dao", "KT1Other", vec![])]);
        assert!(matches!(
            render(&group),
            Err(MalformedOperationError::MissingRecord { .. })
        ));
    }
}
