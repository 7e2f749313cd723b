//! Storage-backed operations. Each function takes the connection and the
//! acting user explicitly; handlers own request parsing and responses.

pub mod catalogue;
pub mod media;
pub mod memberships;
pub mod read_models;
pub mod recipes;
pub mod shopping_list;
pub mod short_links;
pub mod subscriptions;
pub mod users;
