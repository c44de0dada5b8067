mod json;

pub use json::JsonFormatter;

use crate::chain::LookupResult;
use crate::error::Result;

pub trait OutputFormatter {
    fn format_result(&self, result: &LookupResult) -> Result<String>;
    /// A whole batch, in input order.
    fn format_results(&self, results: &[LookupResult]) -> Result<String>;
}
