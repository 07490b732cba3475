//! Identity middleware for the Boostgate server.
//!
//! Reads the trusted `x-user-id` and `x-user-roles` headers (set by the auth proxy in front of
//! this server) and attaches [`UserClaims`] to the request extensions. Requests without the
//! headers pass through unauthenticated; the ACL middleware rejects them at protected routes.

use std::{pin::Pin, rc::Rc, str::FromStr};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorBadRequest,
    Error,
    HttpMessage,
};
use boost_engine::db_types::Role;
use futures::future::{ok, Future, Ready};

use crate::auth::{UserClaims, USER_ID_HEADER, USER_ROLES_HEADER};

pub struct IdentityMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = IdentityMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(IdentityMiddlewareService { service: Rc::new(service) })
    }
}

pub struct IdentityMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            if let Some(claims) = extract_claims(&req)? {
                log::trace!("🔐️ Request from user {} with roles {:?}", claims.user_id, claims.roles);
                req.extensions_mut().insert(claims);
            }
            service.call(req).await
        })
    }
}

fn extract_claims(req: &ServiceRequest) -> Result<Option<UserClaims>, Error> {
    let Some(user_id) = req.headers().get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let user_id = user_id
        .to_str()
        .map_err(|_| ErrorBadRequest(format!("{USER_ID_HEADER} is not valid text")))?
        .parse::<i64>()
        .map_err(|_| ErrorBadRequest(format!("{USER_ID_HEADER} is not a valid user id")))?;
    let roles = match req.headers().get(USER_ROLES_HEADER) {
        Some(roles) => roles
            .to_str()
            .map_err(|_| ErrorBadRequest(format!("{USER_ROLES_HEADER} is not valid text")))?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Role::from_str)
            .collect::<Result<Vec<Role>, _>>()
            .map_err(|e| ErrorBadRequest(e.to_string()))?,
        None => Vec::new(),
    };
    Ok(Some(UserClaims { user_id, roles }))
}
