pub mod enrollment;
pub mod issue_token;
pub mod login_flow;
pub mod second_factor;
