pub mod users;

pub use users::{UserListParams, UserRowView, UsersResponse};
