use std::future::{ready, Ready};

use actix_web::{
    dev::Payload, error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest,
};
use mongodb::bson::oid::ObjectId;

use crate::middleware::auth::Claims;

/// The signed-in console operator, taken from the claims the auth middleware
/// stored on the request.
#[derive(Clone, Debug)]
pub struct AuthenticatedAdmin {
    pub admin_id: ObjectId,
    pub email: String,
}

impl FromRequest for AuthenticatedAdmin {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        let Some(claims) = extensions.get::<Claims>() else {
            return ready(Err(ErrorUnauthorized("User not authenticated")));
        };

        match ObjectId::parse_str(&claims.admin_id) {
            Ok(admin_id) => ready(Ok(AuthenticatedAdmin {
                admin_id,
                email: claims.sub.clone(),
            })),
            Err(_) => ready(Err(ErrorUnauthorized("Invalid admin id in token"))),
        }
    }
}
