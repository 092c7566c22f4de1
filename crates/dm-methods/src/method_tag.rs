//! The closed set of analysis methods the catalog knows how to build a
//! command line, validate input, and parse output for.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodTag {
    Fel,
    Busted,
    Absrel,
    Slac,
    Multihit,
    Gard,
    Meme,
    Fubar,
    Contrastfel,
    Relax,
    Bgm,
    Nrm,
    Fade,
    Slatkin,
}

impl MethodTag {
    pub const ALL: [MethodTag; 14] = [
        MethodTag::Fel,
        MethodTag::Busted,
        MethodTag::Absrel,
        MethodTag::Slac,
        MethodTag::Multihit,
        MethodTag::Gard,
        MethodTag::Meme,
        MethodTag::Fubar,
        MethodTag::Contrastfel,
        MethodTag::Relax,
        MethodTag::Bgm,
        MethodTag::Nrm,
        MethodTag::Fade,
        MethodTag::Slatkin,
    ];

    /// The literal token passed to `hyphy` as the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodTag::Fel => "fel",
            MethodTag::Busted => "busted",
            MethodTag::Absrel => "absrel",
            MethodTag::Slac => "slac",
            MethodTag::Multihit => "multihit",
            MethodTag::Gard => "gard",
            MethodTag::Meme => "meme",
            MethodTag::Fubar => "fubar",
            MethodTag::Contrastfel => "contrast-fel",
            MethodTag::Relax => "relax",
            MethodTag::Bgm => "bgm",
            MethodTag::Nrm => "nrm",
            MethodTag::Fade => "fade",
            MethodTag::Slatkin => "slatkin",
        }
    }

    /// `SLATKIN` is the sole tree-only method: no `--alignment` flag is
    /// ever emitted for it.
    pub fn is_tree_only(&self) -> bool {
        matches!(self, MethodTag::Slatkin)
    }
}

impl std::fmt::Display for MethodTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MethodTag {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MethodTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or(crate::error::Error::UnknownMethodType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_slatkin_is_tree_only() {
        for tag in MethodTag::ALL {
            assert_eq!(tag.is_tree_only(), tag == MethodTag::Slatkin);
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MethodTag::Fel).unwrap(), "\"fel\"");
        assert_eq!(serde_json::to_string(&MethodTag::Absrel).unwrap(), "\"absrel\"");
    }
}
