//!
//! Standard library of executors for the Turnstile flow engine
//!
//! Executors cover password sign-in, SMS one-time passcodes, federated
//! sign-in, attribute collection and user provisioning. They reach users,
//! message gateways and external providers only through the traits in
//! [`services`].

use std::sync::Arc;
use turnstile_core::{CoreError, ExecutorRegistry};

pub mod executors;
pub mod idp_client;
pub mod notification;
pub mod services;

pub use executors::{
    AttributeCollectorExecutor, BasicAuthExecutor, FederatedAuthExecutor, OtpSettings,
    ProvisioningExecutor, SmsOtpExecutor,
};
pub use idp_client::{HttpIdentityProviderClient, IdpEndpoint};
pub use notification::LoggingNotificationSender;
pub use services::{
    FederatedIdentity, IdentityProviderClient, NewUser, NotificationSender, ServiceError,
    UserRecord, UserStore,
};

/// Collaborators shared by the stock executors
#[derive(Clone)]
pub struct StdlibServices {
    /// Local user directory
    pub users: Arc<dyn UserStore>,
    /// SMS gateway
    pub notifications: Arc<dyn NotificationSender>,
    /// External identity providers
    pub identity_providers: Arc<dyn IdentityProviderClient>,
    /// OTP defaults
    pub otp: OtpSettings,
}

/// Register every stock executor under its default name
pub fn register_defaults(registry: &mut ExecutorRegistry, services: &StdlibServices) -> Result<(), CoreError> {
    registry.register(Arc::new(BasicAuthExecutor::new(services.users.clone())))?;
    registry.register(Arc::new(SmsOtpExecutor::new(
        services.users.clone(),
        services.notifications.clone(),
        services.otp.clone(),
    )))?;
    registry.register(Arc::new(FederatedAuthExecutor::new(
        services.identity_providers.clone(),
        services.users.clone(),
    )))?;
    registry.register(Arc::new(ProvisioningExecutor::new(services.users.clone())))?;
    registry.register(Arc::new(AttributeCollectorExecutor::new()))?;
    Ok(())
}
