use anyhow::Result;
use shiftgate::cli::{actions, actions::Action, start};

// Main function
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Login { .. } => actions::login::handle(action, &globals).await?,
        Action::Logout | Action::Session | Action::Authorize { .. } => {
            actions::session::handle(action, &globals)?;
        }
        Action::Token { .. } => actions::token::handle(action)?,
    }

    Ok(())
}
