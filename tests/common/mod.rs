//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fake;
pub mod git;

pub use self::fake::{failed, ok, timed_out, ScriptedTransport};
pub use self::git::{create_test_commit, is_git_available, setup_git_repo};
