//! `ParseResult`: dispatches on the method tag to a tagged parse of the
//! native binary's JSON output.

use std::str::FromStr;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::method_tag::MethodTag;

/// A parsed result, still tagged with the method that produced it. The
/// payload stays a `serde_json::Value` here since each method's output
/// schema is owned by the (out-of-scope) native binary, not this crate;
/// the tag is what `ParseResult` is actually responsible for getting right.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResult {
    pub tag: MethodTag,
    pub payload: Value,
}

/// Resolves `method_tag` against the closed set, then parses `json`.
/// An unrecognized tag fails `unknown method type`; malformed JSON fails
/// with a parse error.
pub fn parse_result(method_tag: &str, json: &str) -> Result<MethodResult> {
    let tag = MethodTag::from_str(method_tag)?;
    let payload: Value = serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
    Ok(MethodResult { tag, payload })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_method_tag_fails() {
        assert!(matches!(
            parse_result("not-a-method", "{}"),
            Err(Error::UnknownMethodType)
        ));
    }

    #[test]
    fn invalid_json_fails_with_parse_error() {
        assert!(matches!(parse_result("fel", "not json"), Err(Error::Parse(_))));
    }

    #[test]
    fn valid_result_parses_tagged() {
        let result = parse_result("busted", r#"{"p-value": 0.01}"#).unwrap();
        assert_eq!(result.tag, MethodTag::Busted);
        assert_eq!(result.payload["p-value"], 0.01);
    }
}
