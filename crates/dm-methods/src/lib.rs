//! Method catalog: the closed family of 14 phylogenetic/selection-analysis
//! methods, their command-line construction, input validation, result
//! parsing, and deterministic output/log paths.

pub mod command;
pub mod error;
pub mod method_tag;
pub mod paths;
pub mod request;
pub mod result;
pub mod validate;

pub use command::{get_command, CatalogConfig};
pub use error::{Error, Result};
pub use method_tag::MethodTag;
pub use paths::{get_log_path, get_output_path};
pub use request::{adapt_request, AnyMethodRequest, MethodRequestView};
pub use result::{parse_result, MethodResult};
pub use validate::validate_input;
