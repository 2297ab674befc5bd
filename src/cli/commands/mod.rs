use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("shiftgate")
        .about("Staff login and session management")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .help("Where credentials are checked")
                .default_value("local")
                .env("SHIFTGATE_AUTH_MODE")
                .global(true)
                .value_parser(["local", "remote"]),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Staff API base URL, example: http://localhost:3000")
                .env("SHIFTGATE_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Seconds to wait for the staff API, 0 waits forever")
                .default_value("10")
                .env("SHIFTGATE_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("storage-dir")
                .long("storage-dir")
                .help("Directory holding the persisted session")
                .default_value(".shiftgate")
                .env("SHIFTGATE_STORAGE_DIR")
                .global(true),
        )
        .arg(
            Arg::new("directory")
                .long("directory")
                .help("JSON file with local staff accounts (local mode)")
                .env("SHIFTGATE_DIRECTORY")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("SHIFTGATE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and persist the session")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Staff username")
                        .env("SHIFTGATE_USERNAME"),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Staff password")
                        .env("SHIFTGATE_PASSWORD")
                        .hide_env_values(true),
                ),
        )
        .subcommand(Command::new("logout").about("Remove the persisted session"))
        .subcommand(Command::new("session").about("Show the current session"))
        .subcommand(
            Command::new("authorize")
                .about("Check whether the signed-in role reaches a required role")
                .arg(
                    Arg::new("role")
                        .help("Required role: admin, empleado, cajero, viewer")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("token")
                .about("Decode a session token and report its expiry")
                .arg(Arg::new("token").help("Token to inspect").required(true)),
        )
}
