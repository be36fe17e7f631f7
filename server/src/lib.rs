pub mod config;
pub mod db;
pub mod detail;
pub mod environment;
pub mod errors;
pub mod io;
pub mod logic;
pub mod media;
pub mod normalization;
pub mod password;
pub mod picture;
pub mod place;
pub mod routes;
pub mod scoring;
pub mod search;
pub mod store;
pub mod summary;
pub mod tip;
pub mod urls;
pub mod user;
pub mod validation;
