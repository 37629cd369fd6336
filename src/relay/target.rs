use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateIp;

use crate::Error;

/// Four dot-separated groups of one to three digits. Octet values are not
/// range-checked here.
static DOTTED_QUAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").expect("dotted quad pattern is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub enum TargetPolicy {
    /// Shape only: `999.999.999.999` is accepted.
    #[default]
    DottedQuad,
    /// Shape plus a real IPv4 parse.
    Strict,
}

impl TargetPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            TargetPolicy::Strict
        } else {
            TargetPolicy::DottedQuad
        }
    }

    pub fn check<'a>(&self, target: &'a str) -> Result<&'a str, Error> {
        // `\d` is unicode-aware; the ascii check keeps non-latin digits out.
        let shaped = target.is_ascii() && DOTTED_QUAD.is_match(target);
        let accepted = match self {
            TargetPolicy::DottedQuad => shaped,
            TargetPolicy::Strict => shaped && target.validate_ipv4(),
        };
        if accepted {
            Ok(target)
        } else {
            Err(Error::unsupported_format())
        }
    }
}
