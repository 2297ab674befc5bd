use crate::auth::{FormState, LoginForm};
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Context, Result};
use secrecy::ExposeSecret;

/// Handle the login action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let Action::Login { username, password } = action else {
        return Err(anyhow!("login handler called with {action:?}"));
    };

    let validator = globals
        .validator()
        .context("failed to configure credential validator")?;

    let mut store = globals.session_store();
    store.init();

    let mut form = LoginForm::new();
    form.set_username(username);
    form.set_password(password.expose_secret());

    match form.submit(&validator, &mut store).await {
        FormState::Success => {
            let session = store
                .get()
                .ok_or_else(|| anyhow!("session missing after login"))?;
            println!(
                "Signed in as {} ({}, {} shift)",
                session.user.full_name, session.user.role, session.user.shift
            );
            Ok(())
        }
        FormState::Error(err) => Err(anyhow!("{err}")),
        state => Err(anyhow!("login ended in unexpected state: {state:?}")),
    }
}
