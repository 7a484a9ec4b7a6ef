mod helpers;
mod login;
mod login_token;
mod resend_token;
