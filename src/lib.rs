pub mod app;
pub mod browser;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod favorites;
pub mod filter;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod pagination;
pub mod profile;
pub mod store;

#[cfg(test)]
mod tests;
