// handlers/protected/mod.rs - Protected handlers (bearer session required)
//
// Every route here sits behind `jwt_auth_middleware`, so handlers can rely on
// an `AuthUser` extension and scope all work to `auth_user.user_id`.
pub mod auth;     // Session introspection
pub mod resource; // Notes and bookmarks CRUD, generic over the resource kind

pub use auth::*;
