//! CPID codec
//!
//! A CPID names one purchasable reward variant:
//!
//! ```text
//! <PREFIX>-<BRAND>-<LANG>-<VALUE>[-<SUFFIX>]
//! OC-ACMEHEALTH-EN-10-K3Q9ZB
//! ```
//!
//! The first four segments form the *exact* (family) CPID shared by every
//! source item of one logical reward. The fifth segment is either the random
//! suffix produced at creation time or a source letter (`A`, `B`, ...)
//! appended when another source is attached to the family.

use std::str::FromStr;

use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::error::{AppError, ErrorCode};

/// Prefix for offers created by the admin service
pub const OFFER_PREFIX: &str = "OC";
/// Prefix used by upstream systems for gift cards (opaque on read)
pub const GIFT_CARD_PREFIX: &str = "GC";
/// Language segment used when none is given
pub const DEFAULT_LANGUAGE: &str = "EN";

/// Brands shorter than this (after cleaning) produce an empty slug
pub const MIN_BRAND_LEN: usize = 5;
/// Brand slugs are cut to this many characters
pub const MAX_BRAND_LEN: usize = 10;
/// Length of the random uniqueness suffix
pub const SUFFIX_LEN: usize = 6;
/// Number of segments in an exact (family) CPID
pub const EXACT_SEGMENTS: usize = 4;

const SUFFIX_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpidError {
    #[error("brand name needs at least {MIN_BRAND_LEN} letters or digits, got {0}")]
    BrandTooShort(usize),
    #[error("CPID '{0}' must have at least {EXACT_SEGMENTS} non-empty segments")]
    Invalid(String),
}

impl From<CpidError> for AppError {
    fn from(err: CpidError) -> Self {
        match &err {
            CpidError::BrandTooShort(len) => {
                AppError::with_message(ErrorCode::CpidBrandTooShort, err.to_string())
                    .with_detail("brand_length", *len as u64)
            }
            CpidError::Invalid(cpid) => {
                AppError::with_message(ErrorCode::InvalidCpid, err.to_string())
                    .with_detail("cpid", cpid.clone())
            }
        }
    }
}

/// Structured view of a CPID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpidParts {
    pub prefix: String,
    pub brand: String,
    pub language: String,
    pub value: String,
    /// Everything after the fourth segment (random suffix or source letter)
    pub suffix: Option<String>,
}

impl CpidParts {
    /// The family identifier `PREFIX-BRAND-LANG-VALUE`
    pub fn exact(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.prefix, self.brand, self.language, self.value
        )
    }
}

// ── Generation ──

/// Uppercase alphanumeric brand slug, or `""` when fewer than
/// [`MIN_BRAND_LEN`] usable characters remain.
pub fn brand_slug(brand_name: &str) -> String {
    let cleaned: String = brand_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.len() < MIN_BRAND_LEN {
        return String::new();
    }
    cleaned.chars().take(MAX_BRAND_LEN).collect()
}

/// Uppercased alphanumeric language code, [`DEFAULT_LANGUAGE`] when nothing usable remains.
///
/// Dashes and other separators are dropped so the code always stays one segment
/// (`en-US` becomes `ENUS`).
pub fn language_segment(language: &str) -> String {
    let cleaned: String = language
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        cleaned
    }
}

/// Integer-rounded value rendering; anything that is not a representable number becomes `"0"`.
pub fn value_segment(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "0".to_string();
    }
    let parsed = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed));
    // half-way values round towards +inf, matching the admin frontend
    match parsed.ok().and_then(|v| v.checked_add(Decimal::new(5, 1))) {
        Some(v) => v.floor().normalize().to_string(),
        None => "0".to_string(),
    }
}

/// Random `[A-Z0-9]` suffix of [`SUFFIX_LEN`] characters.
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Lenient generator.
///
/// Never fails: a brand with fewer than five usable characters yields an
/// empty brand segment (`OC--EN-10-XXXXXX`). Callers check the brand length
/// first, or use [`try_generate`].
pub fn generate(brand_name: &str, language: &str, value: &str) -> String {
    generate_with_rng(brand_name, language, value, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    brand_name: &str,
    language: &str,
    value: &str,
    rng: &mut R,
) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        OFFER_PREFIX,
        brand_slug(brand_name),
        language_segment(language),
        value_segment(value),
        random_suffix(rng)
    )
}

/// Strict generator: rejects brands that would produce an empty slug.
pub fn try_generate(brand_name: &str, language: &str, value: &str) -> Result<String, CpidError> {
    try_generate_with_rng(brand_name, language, value, &mut rand::thread_rng())
}

pub fn try_generate_with_rng<R: Rng + ?Sized>(
    brand_name: &str,
    language: &str,
    value: &str,
    rng: &mut R,
) -> Result<String, CpidError> {
    let usable = brand_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .count();
    if usable < MIN_BRAND_LEN {
        return Err(CpidError::BrandTooShort(usable));
    }
    Ok(generate_with_rng(brand_name, language, value, rng))
}

// ── Parsing ──

/// First four dash-delimited segments, re-joined.
///
/// Lenient: shorter input is returned with whatever segments exist. Use
/// [`parse_exact`] when the segment count matters.
pub fn truncate(cpid: &str) -> String {
    cpid.split('-')
        .take(EXACT_SEGMENTS)
        .collect::<Vec<_>>()
        .join("-")
}

/// True when `candidate` is the family id itself or one of its variants.
pub fn matches_family(candidate: &str, exact_cpid: &str) -> bool {
    candidate == exact_cpid
        || candidate
            .strip_prefix(exact_cpid)
            .is_some_and(|rest| rest.starts_with('-'))
}

/// Whether `cpid` has at least four segments and none of them empty.
pub fn is_valid_exact(cpid: &str) -> bool {
    let segments: Vec<&str> = cpid.split('-').collect();
    segments.len() >= EXACT_SEGMENTS
        && segments[..EXACT_SEGMENTS].iter().all(|s| !s.is_empty())
}

/// Strict truncation used by lookups: invalid CPIDs never match anything.
pub fn parse_exact(cpid: &str) -> Result<String, CpidError> {
    if !is_valid_exact(cpid) {
        return Err(CpidError::Invalid(cpid.to_string()));
    }
    Ok(truncate(cpid))
}

pub fn parse(cpid: &str) -> Result<CpidParts, CpidError> {
    if !is_valid_exact(cpid) {
        return Err(CpidError::Invalid(cpid.to_string()));
    }
    let mut segments = cpid.splitn(EXACT_SEGMENTS + 1, '-');
    let mut next = || segments.next().unwrap_or_default().to_string();
    let prefix = next();
    let brand = next();
    let language = next();
    let value = next();
    let suffix = Some(next()).filter(|s| !s.is_empty());
    Ok(CpidParts {
        prefix,
        brand,
        language,
        value,
        suffix,
    })
}

// ── Source variants ──

/// CPIDx for an additional source: `<exact>-<LETTER>`.
pub fn with_source_suffix(exact_cpid: &str, letter: char) -> String {
    format!("{}-{}", truncate(exact_cpid), letter.to_ascii_uppercase())
}

/// Source letter carried in the fifth segment, if it is a single `A`-`Z`.
pub fn source_letter(cpid: &str) -> Option<char> {
    let fifth = cpid.split('-').nth(EXACT_SEGMENTS)?;
    let mut chars = fifth.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Some(c),
        _ => None,
    }
}

/// First letter `A`..=`Z` not yet used by the family; `None` when all are taken.
pub fn next_source_letter<S: AsRef<str>>(family_cpids: &[S]) -> Option<char> {
    let used: Vec<char> = family_cpids
        .iter()
        .filter_map(|c| source_letter(c.as_ref()))
        .collect();
    ('A'..='Z').find(|c| !used.contains(c))
}
