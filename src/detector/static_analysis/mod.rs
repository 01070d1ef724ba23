//! Static-analysis detector (Semgrep-compatible engine)

mod adapter;
mod parser;
mod process;

pub use adapter::StaticAnalysisAdapter;
pub use parser::{parse_semgrep_json, ParsedScan};
