pub mod authenticator;
pub mod login_flow;
