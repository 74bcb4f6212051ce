use actix_web::{error, web, HttpRequest, HttpResponse};
use log::warn;

use crate::{error::ValidationError, models::BaseResponse, models::User};

pub const NAME_MAX_LEN: usize = 100;

pub fn validate_user(user: &User) -> Result<(), ValidationError> {
    let name = user.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ValidationError::NameTooLong { max: NAME_MAX_LEN });
    }

    if let Some(email) = &user.email {
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid {
            return Err(ValidationError::InvalidEmail(email.to_owned()));
        }
    }

    Ok(())
}

/// Body extractor config: undecodable payloads get the same failure shape
/// as every other create error, with a 422 status.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> error::Error {
    warn!("rejected payload on {}: {}", req.path(), err);
    let response = HttpResponse::UnprocessableEntity().json(BaseResponse::failure(&err));
    error::InternalError::from_response(err, response).into()
}
