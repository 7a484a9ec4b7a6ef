pub mod clock;
pub mod repositories;
pub mod services;
