//! Built-in extraction strategies, in cascade order:
//! direct parse, fenced block, boundary scan, cleanup-and-retry.

mod boundary;
mod cleanup;
mod direct;
mod fenced;

pub use boundary::BoundaryScanStrategy;
pub use cleanup::CleanupStrategy;
pub use direct::DirectParseStrategy;
pub use fenced::FencedBlockStrategy;

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening or closing code-fence marker, with an optional language tag
pub(crate) static FENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+\-]*").expect("fence marker regex"));
