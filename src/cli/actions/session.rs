use crate::auth::{policy, token, Role, Session};
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, bail, Result};

/// Handle the logout, session and authorize actions
pub fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let mut store = globals.session_store();
    store.init();
    let now = token::unix_now();

    match action {
        Action::Logout => {
            store.clear()?;
            println!("Signed out");
        }
        Action::Session => match store.active(now) {
            Some(session) => println!("{}", describe(&session, now)),
            None => println!("Not signed in"),
        },
        Action::Authorize { role } => {
            let required: Role = role.parse()?;
            let session = store.active(now).ok_or_else(|| anyhow!("not signed in"))?;
            if !policy::can_access(&session.user, required) {
                bail!(
                    "access denied: {} requires {required}",
                    session.user.role
                );
            }
            println!("access granted: {} covers {required}", session.user.role);
        }
        other => return Err(anyhow!("session handler called with {other:?}")),
    }

    Ok(())
}

/// One-line summary of a session for the terminal. Token material is omitted.
fn describe(session: &Session, now: i64) -> String {
    let user = &session.user;
    let remaining = token::decode(&session.token)
        .map(|payload| format_remaining(payload.exp - now))
        .unwrap_or_else(|_| "unknown".to_string());

    format!(
        "{} <{}> id={} role={} shift={} expires_in={remaining}",
        user.full_name, user.email, user.id, user.role, user.shift
    )
}

fn format_remaining(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}h{:02}m", seconds / 3600, (seconds % 3600) / 60)
}
