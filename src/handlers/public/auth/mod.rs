pub mod login;
pub mod register;

pub use login::post as login_post;
pub use register::post as register_post;
