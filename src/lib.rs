pub mod catalog;
pub mod chats;
pub mod config;
pub mod errors;
pub mod paging;
pub mod patch;
pub mod query;
pub mod web;

#[cfg(test)]
mod tests;
