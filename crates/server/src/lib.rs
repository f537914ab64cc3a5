pub mod error;
pub mod extract;
pub mod routes;
pub mod session;
pub mod state;

pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_util;
