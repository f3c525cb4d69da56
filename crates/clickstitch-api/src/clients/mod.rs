// HTTP clients for external collaborators

pub mod publisher;
pub mod validator;

pub use publisher::HttpEventPublisher;
pub use validator::RegistryValidator;
