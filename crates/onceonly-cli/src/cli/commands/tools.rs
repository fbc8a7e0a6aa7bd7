//! `onceonly tools`: webhook tools of a scope.

use onceonly_client::ToolUpsert;

use super::Context;
use crate::cli::args::{Switch, ToolsCmd};
use crate::render;

pub async fn run(ctx: &Context, cmd: ToolsCmd) -> anyhow::Result<i32> {
    let client = &ctx.client;

    match cmd {
        ToolsCmd::List(scope) => {
            let tools = client.list_tools(scope.scope.as_deref()).await?;
            ctx.emit(&tools, |tools| {
                if tools.is_empty() {
                    return "No tools registered.".to_string();
                }
                tools.iter().map(render::tool_line).collect::<Vec<_>>().join("\n")
            })
        }
        ToolsCmd::Get(tool) => {
            let tool = client.get_tool(&tool.name, tool.scope.scope.as_deref()).await?;
            ctx.emit(&tool, render::tool_line)
        }
        ToolsCmd::Upsert(args) => {
            let mut payload = ToolUpsert::new(args.name, args.url, args.secret)
                .with_scope(args.scope.scope.unwrap_or_default())
                .with_timeout_ms(args.timeout_ms)
                .with_max_retries(args.max_retries);
            if let Some(description) = args.description {
                payload = payload.with_description(description);
            }

            let tool = client.upsert_tool(&payload).await?;
            ctx.emit(&tool, |t| format!("Saved.\n{}", render::tool_line(t)))
        }
        ToolsCmd::Toggle(args) => {
            let toggled = client
                .toggle_tool(&args.name, args.state == Switch::On, args.scope.scope.as_deref())
                .await?;
            ctx.emit(&toggled, |t| {
                format!("{} {}", t.name, if t.enabled { "enabled" } else { "disabled" })
            })
        }
        ToolsCmd::Delete(tool) => {
            let deleted = client.delete_tool(&tool.name, tool.scope.scope.as_deref()).await?;
            ctx.emit(&deleted, |d| format!("Deleted {} from {}", d.deleted, d.scope_id))
        }
    }
}
