use mindwell_core::session::KeyringVault;
use mindwell_core::session::TokenVault;
use mindwell_core::storage::config::TokenStorage;

use crate::context::{CliResult, Context};

pub fn run(yes: bool) -> CliResult {
    if !yes {
        return Err("this deletes every mood, habit and the saved login; re-run with --yes".into());
    }
    let mut ctx = Context::load()?;
    ctx.tracker.reset()?;
    if ctx.config.session.token_storage == TokenStorage::Keyring {
        KeyringVault.clear()?;
    }
    println!("All local data cleared");
    Ok(())
}
