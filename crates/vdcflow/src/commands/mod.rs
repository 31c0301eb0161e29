pub mod apply;
pub mod login;
pub mod validate;
