//! Account lifecycle for LMS.

mod service;

pub use service::{AccountService, LoginResult, SessionTokens};
