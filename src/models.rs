pub mod response;
pub mod user;

pub use response::{BaseResponse, IndexResponse, UserListResponse};
pub use user::User;
