//! Session, account and billing commands.

use onceonly_client::ClientError;
use tracing::debug;

use super::Context;
use crate::cli::args::{LoginArgs, RecoverArgs, RecoverRotateArgs, UpgradeArgs, UsageArgs};
use crate::exit_codes::SUCCESS;
use crate::render;

pub async fn login(ctx: &Context, args: LoginArgs) -> anyhow::Result<i32> {
    let key = match args.key {
        Some(key) => key,
        None => dialoguer::Password::new()
            .with_prompt("OnceOnly API key")
            .interact()?,
    };

    if key.trim().is_empty() {
        return Err(ClientError::InvalidInput {
            message: "API key must not be empty".to_string(),
        }
        .into());
    }

    let me = ctx.client.login(&key).await?;
    ctx.emit(&me, |me| format!("Logged in.\n{}", render::account(me)))
}

pub fn logout(ctx: &Context) -> anyhow::Result<i32> {
    ctx.client.logout()?;
    if !ctx.json {
        println!("Logged out.");
    }
    Ok(SUCCESS)
}

pub async fn me(ctx: &Context) -> anyhow::Result<i32> {
    let me = ctx.client.me().await?;
    ctx.emit(&me, render::account)
}

pub async fn usage(ctx: &Context, args: UsageArgs) -> anyhow::Result<i32> {
    if args.legacy {
        let usage = ctx.client.usage().await?;
        return ctx.emit(&usage, render::legacy_usage);
    }

    let usage = ctx.client.usage_all().await?;
    ctx.emit(&usage, render::usage_snapshot)
}

pub async fn upgrade(ctx: &Context, args: UpgradeArgs) -> anyhow::Result<i32> {
    let url = ctx.client.checkout_url(args.plan).await?;
    debug!(plan = %args.plan, "resolved checkout URL");
    ctx.emit(&serde_json::json!({ "plan": args.plan, "url": url }), |_| {
        format!("Open this page to upgrade to {}:\n{}", args.plan, url)
    })
}

pub async fn recover(ctx: &Context, args: RecoverArgs) -> anyhow::Result<i32> {
    ctx.client.request_recovery(&args.email).await?;
    if !ctx.json {
        println!("If that address has an account, a recovery link is on its way.");
    }
    Ok(SUCCESS)
}

pub async fn recover_rotate(ctx: &Context, args: RecoverRotateArgs) -> anyhow::Result<i32> {
    let api_key = ctx.client.rotate_recovered_key(&args.token).await?;
    ctx.emit(&serde_json::json!({ "api_key": api_key }), |_| {
        format!(
            "New API key (shown once, now stored):\n{}\nThe previous key no longer works.",
            api_key
        )
    })
}
