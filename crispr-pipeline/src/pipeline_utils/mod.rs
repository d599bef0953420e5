//! Execution utilities shared by the agents and the executor
//!
//! - **batch**: Bounded concurrent execution that waits for every item
//! - **task**: Agent steps wrapped in progress notifications
//! - **json**: Fence stripping and strict parsing of completion text

pub mod batch;
pub mod json;
pub mod task;

pub use batch::{execute_settled, BatchContext};
pub use json::{parse_json, parse_json_value, strip_code_fence, ParseError};
pub use task::execute_step;
