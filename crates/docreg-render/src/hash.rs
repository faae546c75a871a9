//! Content hashing for generated artifacts.
//!
//! The hash is a pure function of the rendered content, so identical
//! visual output always maps to the same storage path.

use sha2::{Digest, Sha256};

use docreg_core::types::RenderedContent;

/// Blob storage prefix for generated PDFs.
pub const GENERATED_DIR: &str = "documents/generated";

/// Hex-encoded SHA-256 of the rendered content.
///
/// Layout content hashes the filled text together with the field map it
/// was filled with. Markup content hashes the substituted text alone.
pub fn content_hash(content: &RenderedContent) -> String {
    let mut hasher = Sha256::new();
    match content {
        RenderedContent::Layout { text, field_map } => {
            hasher.update(b"layout\0");
            hasher.update(text.as_bytes());
            hasher.update([0u8]);
            hasher.update(field_map.as_bytes());
        }
        RenderedContent::Markup { text } => {
            hasher.update(text.as_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

/// Storage path of the PDF generated for `hash`.
pub fn generated_path(hash: &str) -> String {
    format!("{GENERATED_DIR}/{hash}.pdf")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_markup_hash_is_sha256_of_text() {
        let content = RenderedContent::Markup {
            text: "abc".into(),
        };
        assert_eq!(
            content_hash(&content),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_layout_hash_depends_on_field_map() {
        let a = RenderedContent::Layout {
            text: "Subject: Budget".into(),
            field_map: r##"[{"field":"subject","placeholder":"#S#"}]"##.into(),
        };
        let b = RenderedContent::Layout {
            text: "Subject: Budget".into(),
            field_map: r##"[{"field":"subject","placeholder":"#SUBJ#"}]"##.into(),
        };
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_layout_and_markup_never_collide() {
        let layout = RenderedContent::Layout {
            text: "same".into(),
            field_map: String::new(),
        };
        let markup = RenderedContent::Markup {
            text: "same".into(),
        };
        assert_ne!(content_hash(&layout), content_hash(&markup));
    }

    #[test]
    fn test_generated_path() {
        assert_eq!(generated_path("ff00"), "documents/generated/ff00.pdf");
    }

    proptest! {
        #[test]
        fn prop_hash_is_pure_and_hex(text in ".{0,200}") {
            let content = RenderedContent::Markup { text: text.clone() };
            let first = content_hash(&content);
            let again = content_hash(&RenderedContent::Markup { text });
            prop_assert_eq!(first.len(), 64);
            prop_assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
            prop_assert_eq!(first, again);
        }

        #[test]
        fn prop_distinct_text_distinct_hash(a in "[a-z]{1,30}", b in "[a-z]{1,30}") {
            prop_assume!(a != b);
            let ha = content_hash(&RenderedContent::Markup { text: a });
            let hb = content_hash(&RenderedContent::Markup { text: b });
            prop_assert_ne!(ha, hb);
        }
    }
}
