//! Supported language codes.
//!
//! The gateway accepts ISO 639-2 (bibliographic) three-letter codes from a
//! closed allow-list. Codes are matched case-insensitively and normalized to
//! lower case before they reach the backend.

use std::collections::BTreeSet;

/// ISO 639-2 codes accepted out of the box.
const ISO_639_2_CODES: &[&str] = &[
    "aar", "abk", "ace", "ach", "ada", "ady", "afr", "aka", "alb", "amh",
    "ara", "arg", "arm", "asm", "ava", "ave", "aym", "aze", "bak", "bam",
    "baq", "bel", "ben", "bih", "bis", "bos", "bre", "bul", "bur", "cat",
    "ceb", "cha", "che", "chi", "chu", "chv", "cor", "cos", "cre", "cze",
    "dan", "div", "dut", "dzo", "eng", "epo", "est", "ewe", "fao", "fij",
    "fin", "fre", "fry", "ful", "geo", "ger", "gla", "gle", "glg", "glv",
    "gre", "grn", "guj", "hat", "hau", "heb", "her", "hin", "hmo", "hrv",
    "hun", "ibo", "ice", "ido", "iii", "iku", "ile", "ina", "ind", "ipk",
    "ita", "jav", "jpn", "kal", "kan", "kas", "kaz", "khm", "kik", "kin",
    "kir", "kom", "kon", "kor", "kua", "kur", "lao", "lat", "lav", "lim",
    "lin", "lit", "ltz", "lub", "lug", "mac", "mah", "mal", "mao", "mar",
    "may", "mlg", "mlt", "mon", "nau", "nav", "nbl", "nde", "ndo", "nep",
    "nno", "nob", "nor", "nya", "oci", "oji", "ori", "orm", "oss", "pan",
    "per", "pli", "pol", "por", "pus", "que", "roh", "rum", "run", "rus",
    "sag", "san", "sin", "slo", "slv", "sme", "smo", "sna", "snd", "som",
    "sot", "spa", "srd", "srp", "ssw", "sun", "swa", "swe", "tah", "tam",
    "tat", "tel", "tgk", "tgl", "tha", "tib", "tir", "ton", "tsn", "tso",
    "tuk", "tur", "twi", "uig", "ukr", "urd", "uzb", "ven", "vie", "vol",
    "wel", "wln", "wol", "xho", "yid", "yor", "zha", "zul",
];

/// English display names used when building backend prompts.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("eng", "English"),
    ("kor", "Korean"),
    ("jpn", "Japanese"),
    ("chi", "Chinese"),
    ("spa", "Spanish"),
    ("fre", "French"),
    ("ger", "German"),
    ("rus", "Russian"),
    ("ara", "Arabic"),
    ("por", "Portuguese"),
    ("ita", "Italian"),
    ("dut", "Dutch"),
    ("pol", "Polish"),
    ("tur", "Turkish"),
    ("vie", "Vietnamese"),
    ("tha", "Thai"),
    ("ind", "Indonesian"),
    ("may", "Malay"),
    ("hin", "Hindi"),
    ("ben", "Bengali"),
];

/// Closed set of language codes the gateway will dispatch.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    codes: BTreeSet<String>,
}

impl LanguageRegistry {
    /// Build the registry from the built-in list plus deployment extras.
    ///
    /// Extras that are not three ASCII letters are ignored; config
    /// validation reports them before the registry is ever built.
    pub fn new(extra_codes: &[String]) -> Self {
        let mut codes: BTreeSet<String> =
            ISO_639_2_CODES.iter().map(|c| (*c).to_string()).collect();

        for code in extra_codes {
            if is_code_shaped(code) {
                codes.insert(code.to_ascii_lowercase());
            }
        }

        Self { codes }
    }

    /// Return the lower-case form of `code` if it is supported.
    pub fn normalize(&self, code: &str) -> Option<String> {
        if !is_code_shaped(code) {
            return None;
        }
        let lower = code.to_ascii_lowercase();
        self.codes.contains(&lower).then_some(lower)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.normalize(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Three ASCII letters, any case.
pub fn is_code_shaped(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Human-readable language name for prompts, if one is known.
pub fn display_name(code: &str) -> Option<&'static str> {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}
