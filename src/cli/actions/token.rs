use crate::auth::token;
use crate::cli::actions::Action;
use anyhow::{anyhow, Context, Result};

/// Handle the token action
pub fn handle(action: Action) -> Result<()> {
    let Action::Token { token: raw } = action else {
        return Err(anyhow!("token handler called with {action:?}"));
    };

    let payload = token::decode(&raw).context("token is malformed")?;
    let expired = token::is_expired(&raw, token::unix_now());

    println!("{}", serde_json::to_string_pretty(&payload)?);
    println!("expired: {expired}");

    Ok(())
}
