use super::Context;
use crate::cli::args::AgentCmd;
use crate::render;

pub async fn run(ctx: &Context, cmd: AgentCmd) -> anyhow::Result<i32> {
    let client = &ctx.client;

    match cmd {
        AgentCmd::Disable(args) => {
            let status = client
                .disable_agent(&args.agent_id, args.reason.as_deref())
                .await?;
            ctx.emit(&status, render::agent_status)
        }
        AgentCmd::Enable(agent) => {
            let status = client.enable_agent(&agent.agent_id).await?;
            ctx.emit(&status, render::agent_status)
        }
        AgentCmd::Logs(args) => {
            let logs = client.agent_logs(&args.agent_id, args.limit).await?;
            ctx.emit(&logs, |logs| {
                logs.iter()
                    .map(|entry| entry.to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        AgentCmd::Metrics(args) => {
            let metrics = client.agent_metrics(&args.agent_id, args.period).await?;
            ctx.emit(&metrics, render::agent_metrics)
        }
    }
}
