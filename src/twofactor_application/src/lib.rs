pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use use_cases::{
    enrollment::EnrollmentPolicy,
    issue_token::{DeliveryError, SiteInfo, TokenDelivery, TokenIssuer},
    login_flow::{LoginFlowConfig, LoginFlowError, LoginOrchestrator},
    second_factor::{
        INVALID_CODE_MESSAGE, MISSING_CODE_MESSAGE, SecondFactorAuthenticator,
        SecondFactorError,
    },
};
