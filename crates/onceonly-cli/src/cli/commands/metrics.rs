use onceonly_client::{ClientError, DayRange};

use super::Context;
use crate::cli::args::MetricsArgs;
use crate::render;

pub async fn run(ctx: &Context, args: MetricsArgs) -> anyhow::Result<i32> {
    let range = match (args.from, args.to) {
        (Some(from), Some(to)) => DayRange::new(from, to),
        _ if args.today => DayRange::today(),
        _ => DayRange::last_days(args.days).ok_or_else(|| ClientError::InvalidInput {
            message: format!("--days {} reaches outside the supported calendar", args.days),
        })?,
    };

    if range.from > range.to {
        return Err(ClientError::InvalidInput {
            message: format!("--from {} is after --to {}", range.from_day(), range.to_day()),
        }
        .into());
    }

    let rows = ctx.client.metrics(&range).await?;
    ctx.emit(&rows, |rows| render::metrics_table(rows))
}
