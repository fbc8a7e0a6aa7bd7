use clap::Parser;
use onceonly_client::ClientError;

mod cli;
pub mod exit_codes;
mod logging;
mod render;

use cli::args::Cli;
use cli::commands::dispatch;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => report(&e),
    };
    std::process::exit(code);
}

/// Print a failure and pick the exit code.
fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ClientError>() {
        Some(client_err) => {
            eprintln!("{}", render::error_banner(client_err));
            client_err.exit_code()
        }
        None => {
            eprintln!("error: {err:#}");
            exit_codes::INTERNAL_ERROR
        }
    }
}
