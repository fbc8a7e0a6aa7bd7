//! `onceonly events`: one page, several pages, or a live tail.

use std::collections::HashSet;
use std::time::Duration;

use onceonly_client::watch::watch_events;
use onceonly_client::{event_key, ClientError, ErrorCode, EventFeed, EventRecord};
use tracing::{debug, info};

use super::Context;
use crate::cli::args::EventsArgs;
use crate::exit_codes::SUCCESS;
use crate::render;

pub async fn run(ctx: &Context, args: EventsArgs) -> anyhow::Result<i32> {
    if args.limit == 0 {
        return Err(ClientError::InvalidInput {
            message: "--limit must be at least 1".to_string(),
        }
        .into());
    }

    if args.follow {
        return follow(ctx, &args).await;
    }

    let base = ctx.client.events(args.limit, None).await?;
    let mut feed = EventFeed::new(ctx.client.clone(), args.limit);
    for _ in 0..args.pages {
        if !feed.has_more() {
            break;
        }
        feed.load_more(base.len()).await?;
    }
    let events = feed.merged(&base);

    if ctx.json {
        println!("{}", render::json(&events)?);
        return Ok(SUCCESS);
    }

    if events.is_empty() {
        println!("No events yet.");
    }
    for event in &events {
        println!("{}", render::event_line(event));
    }
    // Only meaningful once at least one older page was requested.
    if args.pages > 0 && feed.has_more() {
        eprintln!("More events available: rerun with --pages {}", args.pages + 1);
    }
    Ok(SUCCESS)
}

/// Poll until ctrl-c, printing events not seen before (oldest first).
async fn follow(ctx: &Context, args: &EventsArgs) -> anyhow::Result<i32> {
    let interval = Duration::from_secs(args.interval_secs);
    let mut sub = watch_events(&ctx.client, args.limit, interval);
    let mut seen = HashSet::new();
    let mut last_error: Option<ClientError> = None;

    info!(limit = args.limit, interval_secs = interval.as_secs(), "following events");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("interrupted");
                break;
            }
            changed = sub.changed() => {
                if !changed {
                    break;
                }
            }
        }

        let state = sub.state();

        if state.error != last_error {
            if let Some(err) = &state.error {
                // The credential is gone; polling cannot recover.
                if err.code() == ErrorCode::Unauthorized {
                    sub.cancel();
                    return Err(err.clone().into());
                }
                eprintln!("{}", render::error_banner(err));
            }
            last_error = state.error.clone();
        }

        if let Some(events) = &state.data {
            print_unseen(ctx, events, &mut seen)?;
        }
    }

    sub.cancel();
    Ok(SUCCESS)
}

fn print_unseen(
    ctx: &Context,
    events: &[EventRecord],
    seen: &mut HashSet<String>,
) -> anyhow::Result<()> {
    // Pages are most-recent-first.
    for event in events.iter().rev() {
        if !seen.insert(event_key(event)) {
            continue;
        }
        if ctx.json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{}", render::event_line(event));
        }
    }
    Ok(())
}
