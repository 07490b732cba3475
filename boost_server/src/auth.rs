//! Request identity.
//!
//! Token issuance and verification live in the auth proxy in front of this server. By the time a
//! request arrives here, the proxy has already stripped any client-supplied identity headers and
//! replaced them with trusted `x-user-id` and `x-user-roles` values. The identity middleware
//! parses those into [`UserClaims`] and stashes them in the request extensions; handlers pull
//! them out via the [`FromRequest`] impl below.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use boost_engine::db_types::Role;

use crate::errors::ServerError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

#[derive(Clone, Debug)]
pub struct UserClaims {
    pub user_id: i64,
    pub roles: Vec<Role>,
}

impl UserClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl FromRequest for UserClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<UserClaims>().cloned().ok_or(ServerError::Unauthenticated);
        ready(claims)
    }
}
