mod acl;
mod identity;

pub use acl::AclMiddlewareFactory;
pub use identity::IdentityMiddlewareFactory;
