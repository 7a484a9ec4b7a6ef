pub mod credential;
pub mod email;
pub mod identity;
pub mod login;
pub mod message_template;
pub mod session;
pub mod token;
pub mod two_fa_code;
pub mod two_fa_error;
pub mod user;
