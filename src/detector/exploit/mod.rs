//! Exploit signature detector

mod adapter;
mod signatures;

pub use adapter::{ExploitCheckAdapter, ExploitChecker};
pub use signatures::{check_exploits, signature_rules, RawExploitFinding};
