//! `onceonly policy`: per-agent allow/deny lists and ceilings.

use onceonly_client::{ClientError, PolicyUpsert};

use super::Context;
use crate::cli::args::PolicyCmd;
use crate::render;

pub async fn run(ctx: &Context, cmd: PolicyCmd) -> anyhow::Result<i32> {
    let client = &ctx.client;

    match cmd {
        PolicyCmd::Get(agent) => {
            let policy = client.get_policy(&agent.agent_id).await?;
            ctx.emit(&policy, render::policy)
        }
        PolicyCmd::List => {
            let policies = client.list_policies().await?;
            ctx.emit(&policies, |policies| {
                if policies.is_empty() {
                    return "No policies.".to_string();
                }
                policies
                    .iter()
                    .map(render::policy)
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })
        }
        PolicyCmd::Set(args) => {
            let payload = PolicyUpsert::from_form(
                args.allow,
                args.block,
                args.max_actions_per_hour,
                args.max_spend_usd_per_day,
            );
            let policy = client.upsert_policy(&args.agent_id, &payload).await?;
            ctx.emit(&policy, render::policy)
        }
        PolicyCmd::Template(args) => {
            let overrides = args
                .overrides
                .as_deref()
                .map(serde_json::from_str::<serde_json::Value>)
                .transpose()
                .map_err(|e| ClientError::InvalidInput {
                    message: format!("--overrides is not valid JSON: {}", e),
                })?;

            let policy = client
                .policy_from_template(&args.agent_id, args.template, overrides)
                .await?;
            ctx.emit(&policy, render::policy)
        }
    }
}
