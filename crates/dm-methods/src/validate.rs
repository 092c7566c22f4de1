//! `ValidateInput`: dataset-type whitelist plus numeric preconditions.

use crate::error::{Error, Result};
use crate::method_tag::MethodTag;
use crate::request::MethodRequestView;

const GENERAL_TYPES: &[&str] = &["fasta", "nexus", "newick", "phylip"];

fn allowed_dataset_types(tag: MethodTag) -> &'static [&'static str] {
    match tag {
        // the sole tree-only method takes no alignment, so only tree formats apply
        MethodTag::Slatkin => &["newick"],
        MethodTag::Gard => &["fasta", "phylip"],
        _ => GENERAL_TYPES,
    }
}

/// Asserts `dataset_type` is permitted for `tag`, then checks the
/// method-specific non-negativity preconditions on `view`.
pub fn validate_input(tag: MethodTag, dataset_type: &str, view: &dyn MethodRequestView) -> Result<()> {
    if !allowed_dataset_types(tag).contains(&dataset_type) {
        return Err(Error::InvalidDatasetType);
    }
    if let Some(resample) = view.resample() {
        if resample < 0 {
            return Err(Error::NegativeResample);
        }
    }
    if let Some(rates) = view.rates() {
        if rates < 0 {
            return Err(Error::NegativeRates);
        }
    }
    if let Some(syn_rates) = view.syn_rates() {
        if syn_rates < 0 {
            return Err(Error::NegativeSynRates);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{adapt_request, AnyMethodRequest, FelRequest, SlatkinRequest};

    #[test]
    fn rejects_disallowed_dataset_type() {
        let request = AnyMethodRequest::Slatkin(SlatkinRequest::default());
        let view = adapt_request(Some(&request)).unwrap();
        assert!(matches!(
            validate_input(MethodTag::Slatkin, "fasta", view),
            Err(Error::InvalidDatasetType)
        ));
        assert!(validate_input(MethodTag::Slatkin, "newick", view).is_ok());
    }

    #[test]
    fn rejects_negative_numeric_fields() {
        let request = AnyMethodRequest::Fel(FelRequest { resample: Some(-1), ..Default::default() });
        let view = adapt_request(Some(&request)).unwrap();
        assert!(matches!(
            validate_input(MethodTag::Fel, "fasta", view),
            Err(Error::NegativeResample)
        ));

        let request = AnyMethodRequest::Fel(FelRequest { rates: Some(-1), ..Default::default() });
        let view = adapt_request(Some(&request)).unwrap();
        assert!(matches!(
            validate_input(MethodTag::Fel, "fasta", view),
            Err(Error::NegativeRates)
        ));

        let request = AnyMethodRequest::Fel(FelRequest { syn_rates: Some(-1), ..Default::default() });
        let view = adapt_request(Some(&request)).unwrap();
        assert!(matches!(
            validate_input(MethodTag::Fel, "fasta", view),
            Err(Error::NegativeSynRates)
        ));
    }
}
