pub mod login;
pub mod session;
pub mod token;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login {
        username: String,
        password: SecretString,
    },
    Logout,
    Session,
    Authorize {
        role: String,
    },
    Token {
        token: String,
    },
}
