//! Image-reference extraction from page markup
//!
//! A page unit's markup is opaque to the pipeline except for one thing:
//! its leading relative image reference. The contract is a deliberate
//! mini-grammar, not a markup parse:
//!
//! ```text
//! image-ref = `src="../images/` name `"`
//! name      = one or more characters other than `"`
//! ```
//!
//! The first occurrence wins; everything else in the markup is ignored.
//! Keeping this a dedicated scanner makes behavior on malformed markup
//! deterministic and testable.

/// Literal prefix of a recognized image reference
const IMAGE_REF_PREFIX: &str = "src=\"../images/";

/// Extract the image name from the first recognized reference
///
/// Returns `None` when no reference exists, when the reference is
/// unterminated, or when the name is empty. A page unit without a
/// resolvable reference contributes nothing to the page list.
pub fn first_image_ref(markup: &str) -> Option<&str> {
    let start = markup.find(IMAGE_REF_PREFIX)? + IMAGE_REF_PREFIX.len();
    let rest = &markup[start..];
    let end = rest.find('"')?;
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_name() {
        let markup = r#"<div><img src="../images/cover.png" alt=""/></div>"#;
        assert_eq!(first_image_ref(markup), Some("cover.png"));
    }

    #[test]
    fn test_first_of_many_wins() {
        let markup = r#"<img src="../images/a.png"/><img src="../images/b.png"/>"#;
        assert_eq!(first_image_ref(markup), Some("a.png"));
    }

    #[test]
    fn test_no_reference() {
        assert_eq!(first_image_ref("<p>plain text page</p>"), None);
        assert_eq!(first_image_ref(""), None);
    }

    #[test]
    fn test_other_src_attributes_ignored() {
        // Only the literal `../images/` prefix is recognized
        let markup = r#"<img src="images/a.png"/><img src="../media/b.png"/>"#;
        assert_eq!(first_image_ref(markup), None);
    }

    #[test]
    fn test_unterminated_reference() {
        assert_eq!(first_image_ref(r#"<img src="../images/a.png"#), None);
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(first_image_ref(r#"<img src="../images/"/>"#), None);
    }

    #[test]
    fn test_name_may_contain_subdirectories() {
        // The grammar stops at the closing quote, nothing else
        let markup = r#"<img src="../images/hi-res/page 1.png"/>"#;
        assert_eq!(first_image_ref(markup), Some("hi-res/page 1.png"));
    }
}
