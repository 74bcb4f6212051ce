use std::error::Error;

use actix_web::{get, post, web, HttpResponse, Responder};
use log::{error, warn};

use crate::{
    error::StoreError,
    models::{BaseResponse, User, UserListResponse},
    validator::validate_user,
    AppState,
};

#[post("/users")]
async fn create_user(state: web::Data<AppState>, input: web::Json<User>) -> impl Responder {
    let user: User = input.into_inner();

    match add_user(&state, user).await {
        Ok(()) => HttpResponse::Ok().json(BaseResponse::ok()),
        Err(why) => {
            warn!("Error creating the user: {}", why);
            HttpResponse::Ok().json(BaseResponse::failure(why))
        }
    }
}

async fn add_user(state: &AppState, user: User) -> Result<(), Box<dyn Error>> {
    validate_user(&user)?;
    state.store.add_user_data(user).await?;
    Ok(())
}

#[get("/users")]
async fn list_users(state: web::Data<AppState>) -> Result<web::Json<UserListResponse>, StoreError> {
    let users = state.store.read_users_data().await.map_err(|why| {
        error!("Error reading the users: {}", why);
        why
    })?;
    Ok(web::Json(UserListResponse { users }))
}
