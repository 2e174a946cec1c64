pub(crate) mod client;
pub(crate) mod models;
pub(crate) mod ops;

pub use client::SwisClient;
