//! The 14 concrete method request shapes, widened into one uniform view.
//!
//! Each concrete struct is the same record of optional fields
//! (`alignment`, `tree`, `branches[]`, `genetic_code`, `ci`,
//! `srv`, `rates`, `syn_rates`, `grid_size`, `starting_points`,
//! `samples`, `resample`); they are kept as fourteen distinct types
//! rather than one shared struct so `AnyMethodRequest` is a real closed
//! sum type, matching the corpus's tagged-enum style.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::method_tag::MethodTag;

/// Uniform getter-only view the command builder and validator consume,
/// regardless of which of the 14 concrete request types backs it.
pub trait MethodRequestView {
    fn alignment(&self) -> Option<&str>;
    fn tree(&self) -> Option<&str>;
    fn branches(&self) -> &[String];
    fn genetic_code(&self) -> Option<&str>;
    fn ci(&self) -> Option<&str>;
    fn srv(&self) -> Option<&str>;
    fn rates(&self) -> Option<i64>;
    fn syn_rates(&self) -> Option<i64>;
    fn grid_size(&self) -> Option<i64>;
    fn starting_points(&self) -> Option<i64>;
    fn samples(&self) -> Option<i64>;
    fn resample(&self) -> Option<i64>;
}

macro_rules! method_requests {
    ($($struct_name:ident => $tag:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct $struct_name {
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub alignment: Option<String>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub tree: Option<String>,
                #[serde(skip_serializing_if = "Vec::is_empty", default)]
                pub branches: Vec<String>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub genetic_code: Option<String>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub ci: Option<String>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub srv: Option<String>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub rates: Option<i64>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub syn_rates: Option<i64>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub grid_size: Option<i64>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub starting_points: Option<i64>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub samples: Option<i64>,
                #[serde(skip_serializing_if = "Option::is_none", default)]
                pub resample: Option<i64>,
            }

            impl MethodRequestView for $struct_name {
                fn alignment(&self) -> Option<&str> { self.alignment.as_deref() }
                fn tree(&self) -> Option<&str> { self.tree.as_deref() }
                fn branches(&self) -> &[String] { &self.branches }
                fn genetic_code(&self) -> Option<&str> { self.genetic_code.as_deref() }
                fn ci(&self) -> Option<&str> { self.ci.as_deref() }
                fn srv(&self) -> Option<&str> { self.srv.as_deref() }
                fn rates(&self) -> Option<i64> { self.rates }
                fn syn_rates(&self) -> Option<i64> { self.syn_rates }
                fn grid_size(&self) -> Option<i64> { self.grid_size }
                fn starting_points(&self) -> Option<i64> { self.starting_points }
                fn samples(&self) -> Option<i64> { self.samples }
                fn resample(&self) -> Option<i64> { self.resample }
            }
        )*

        /// Closed sum type over the 14 concrete request shapes.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "method", rename_all = "lowercase")]
        pub enum AnyMethodRequest {
            $($tag($struct_name)),*
        }

        impl AnyMethodRequest {
            pub fn tag(&self) -> MethodTag {
                match self {
                    $(AnyMethodRequest::$tag(_) => MethodTag::$tag),*
                }
            }

            fn as_view(&self) -> &dyn MethodRequestView {
                match self {
                    $(AnyMethodRequest::$tag(r) => r),*
                }
            }
        }
    };
}

method_requests!(
    FelRequest => Fel,
    BustedRequest => Busted,
    AbsrelRequest => Absrel,
    SlacRequest => Slac,
    MultihitRequest => Multihit,
    GardRequest => Gard,
    MemeRequest => Meme,
    FubarRequest => Fubar,
    ContrastfelRequest => Contrastfel,
    RelaxRequest => Relax,
    BgmRequest => Bgm,
    NrmRequest => Nrm,
    FadeRequest => Fade,
    SlatkinRequest => Slatkin,
);

/// Widens a concrete request into the uniform view the command builder
/// and validator consume. A `None` request fails with `request is required`.
pub fn adapt_request(request: Option<&AnyMethodRequest>) -> Result<&dyn MethodRequestView> {
    request.map(AnyMethodRequest::as_view).ok_or(Error::NilRequest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_request_fails() {
        assert!(matches!(adapt_request(None), Err(Error::NilRequest)));
    }

    #[test]
    fn adapts_to_uniform_view() {
        let request = AnyMethodRequest::Fel(FelRequest {
            alignment: Some("test.fas".to_string()),
            rates: Some(3),
            ..Default::default()
        });
        let view = adapt_request(Some(&request)).unwrap();
        assert_eq!(view.alignment(), Some("test.fas"));
        assert_eq!(view.rates(), Some(3));
        assert_eq!(request.tag(), MethodTag::Fel);
    }
}
