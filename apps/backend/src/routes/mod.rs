pub mod auth;
pub mod catalog;
pub mod learners;
pub mod words;
