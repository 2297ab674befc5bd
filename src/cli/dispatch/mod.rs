use crate::cli::{
    actions::Action,
    globals::{normalize_value, AuthMode, GlobalArgs},
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let (name, sub_m) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("missing subcommand"))?;

    let value = |id: &str| -> Option<String> {
        sub_m
            .get_one::<String>(id)
            .and_then(|s| normalize_value(s))
    };

    let action = match name {
        "login" => Action::Login {
            username: value("username").unwrap_or_default(),
            password: SecretString::from(
                sub_m
                    .get_one::<String>("password")
                    .cloned()
                    .unwrap_or_default(),
            ),
        },
        "logout" => Action::Logout,
        "session" => Action::Session,
        "authorize" => Action::Authorize {
            role: value("role").ok_or_else(|| anyhow!("missing required argument: role"))?,
        },
        "token" => Action::Token {
            token: value("token").ok_or_else(|| anyhow!("missing required argument: token"))?,
        },
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok((action, globals(sub_m)?))
}

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let storage_dir = matches
        .get_one::<String>("storage-dir")
        .and_then(|s| normalize_value(s))
        .unwrap_or_else(|| ".shiftgate".to_string());

    let mut globals = GlobalArgs::new(storage_dir);

    globals.mode = match matches.get_one::<String>("mode").map(String::as_str) {
        Some("remote") => AuthMode::Remote,
        Some("local") | None => AuthMode::Local,
        Some(other) => return Err(anyhow!("unsupported mode: {other}")),
    };
    globals.api_url = matches
        .get_one::<String>("api-url")
        .and_then(|s| normalize_value(s));
    globals.timeout = match matches.get_one::<u64>("timeout").copied().unwrap_or(10) {
        0 => None,
        seconds => Some(Duration::from_secs(seconds)),
    };
    globals.directory = matches
        .get_one::<String>("directory")
        .and_then(|s| normalize_value(s))
        .map(PathBuf::from);

    Ok(globals)
}
