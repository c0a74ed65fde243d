/*!
 * Tests for ISO language code utilities
 */

use vertrans::language_utils::{
    display_language, get_language_name, language_codes_match, normalize_to_part2t, validate_language_code,
};

#[test]
fn test_normalizeToPart2t_withPart1AndPart2bCodes_shouldReturnPart2t() {
    assert_eq!(normalize_to_part2t("ko").unwrap(), "kor");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("deu").unwrap(), "deu");
    assert!(normalize_to_part2t("zz").is_err());
}

#[test]
fn test_languageCodesMatch_acrossFormats_shouldMatch() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("ger", "de"));
    assert!(!language_codes_match("en", "ko"));
    assert!(!language_codes_match("xx", "xx"));
}

#[test]
fn test_languageNames_shouldResolveOrFallBack() {
    assert_eq!(get_language_name("ko").unwrap(), "Korean");
    assert_eq!(display_language("en"), "English");
    assert_eq!(display_language("qq"), "qq");
    assert!(validate_language_code("").is_err());
}
