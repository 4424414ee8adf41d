pub mod completions;
pub mod deps;
pub mod export;
pub mod impact;
pub mod match_cmd;
pub mod node;
pub mod path;
pub mod stats;
