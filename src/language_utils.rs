use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO language code helpers
///
/// Configuration accepts ISO 639-1 (2-letter) and ISO 639-2 (3-letter, T or B
/// variant) codes. Judgment prompts need the English language name.
/// Bibliographic (639-2/B) codes that differ from their terminology (639-2/T) form
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Resolve a code to its `isolang` language
fn resolve(code: &str) -> Option<Language> {
    let code = code.trim().to_lowercase();
    match code.len() {
        2 => Language::from_639_1(&code),
        3 => {
            let part2t = PART2B_TO_PART2T
                .iter()
                .find(|(b, _)| *b == code)
                .map(|(_, t)| *t)
                .unwrap_or(code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate that `code` is a known ISO 639-1 or 639-2 code
pub fn validate_language_code(code: &str) -> Result<()> {
    resolve(code)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    resolve(code)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (resolve(code1), resolve(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name for a code
pub fn get_language_name(code: &str) -> Result<String> {
    resolve(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))
}

/// Language name for prompts, falling back to the raw code
pub fn display_language(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validateLanguageCode_withPart1AndPart2Codes_shouldAccept() {
        assert!(validate_language_code("ko").is_ok());
        assert!(validate_language_code("kor").is_ok());
        assert!(validate_language_code("ger").is_ok());
        assert!(validate_language_code(" EN ").is_ok());
    }

    #[test]
    fn test_validateLanguageCode_withUnknownCode_shouldFail() {
        assert!(validate_language_code("xx").is_err());
        assert!(validate_language_code("korean").is_err());
        assert!(validate_language_code("").is_err());
    }

    #[test]
    fn test_normalizeToPart2t_withBibliographicCode_shouldConvert() {
        assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
        assert_eq!(normalize_to_part2t("ko").unwrap(), "kor");
    }

    #[test]
    fn test_languageCodesMatch_acrossFormats_shouldMatch() {
        assert!(language_codes_match("de", "ger"));
        assert!(language_codes_match("ko", "kor"));
        assert!(!language_codes_match("ko", "ja"));
        assert!(!language_codes_match("zz", "zz"));
    }

    #[test]
    fn test_getLanguageName_shouldReturnEnglishName() {
        assert_eq!(get_language_name("ko").unwrap(), "Korean");
        assert_eq!(get_language_name("en").unwrap(), "English");
        assert_eq!(display_language("q1"), "q1");
    }
}
