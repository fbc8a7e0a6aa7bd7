use std::sync::Arc;

use onceonly_client::{ApiClient, ClientConfig, CredentialStore, FileStore};
use serde::Serialize;

use super::args::*;
use crate::exit_codes::SUCCESS;
use crate::render;

pub mod account;
pub mod agent;
pub mod events;
pub mod metrics;
pub mod policy;
pub mod tools;

/// Shared state handed to every command.
pub struct Context {
    pub client: ApiClient,
    pub json: bool,
}

impl Context {
    pub fn from_args(global: &GlobalArgs) -> anyhow::Result<Self> {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &global.console_url {
            config = config.with_console_url(url.trim());
        }
        if let Some(secs) = global.timeout_secs {
            config = config.with_timeout_secs(secs);
        }

        let store: Arc<dyn CredentialStore> = match &global.credentials {
            Some(path) => Arc::new(FileStore::with_path(path)),
            None => Arc::new(FileStore::new()?),
        };

        Ok(Self {
            client: ApiClient::new(config, store)?,
            json: global.json,
        })
    }

    /// Print `value` as JSON with `--json`, otherwise through `human`.
    pub fn emit<T: Serialize + ?Sized>(
        &self,
        value: &T,
        human: impl FnOnce(&T) -> String,
    ) -> anyhow::Result<i32> {
        if self.json {
            println!("{}", render::json(value)?);
        } else {
            println!("{}", human(value));
        }
        Ok(SUCCESS)
    }
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let ctx = Context::from_args(&cli.global)?;

    match cli.cmd {
        Command::Login(args) => account::login(&ctx, args).await,
        Command::Logout => account::logout(&ctx),
        Command::Me => account::me(&ctx).await,
        Command::Usage(args) => account::usage(&ctx, args).await,
        Command::Upgrade(args) => account::upgrade(&ctx, args).await,
        Command::Recover(args) => account::recover(&ctx, args).await,
        Command::RecoverRotate(args) => account::recover_rotate(&ctx, args).await,
        Command::Events(args) => events::run(&ctx, args).await,
        Command::Metrics(args) => metrics::run(&ctx, args).await,
        Command::Tools(args) => tools::run(&ctx, args.cmd).await,
        Command::Policy(args) => policy::run(&ctx, args.cmd).await,
        Command::Agent(args) => agent::run(&ctx, args.cmd).await,
    }
}
