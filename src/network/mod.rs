pub mod client;
pub mod errors;

pub use client::{FetchedPage, PageClient};
pub use errors::FetchError;
