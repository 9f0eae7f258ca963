pub mod ai;
pub mod auth;
pub mod nav;
pub mod schema;
pub mod wellness;
