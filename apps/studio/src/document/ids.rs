//! Stable identifiers for list items.

use uuid::Uuid;

use crate::document::actions::Section;

/// `<section>-<uuid>`. Random v4 ids stay unique under rapid successive adds,
/// where a timestamp would not.
pub fn new_item_id(section: Section) -> String {
    format!("{}-{}", section.key(), Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_carry_section_prefix_and_differ() {
        let a = new_item_id(Section::Projects);
        let b = new_item_id(Section::Projects);
        assert!(a.starts_with("projects-"));
        assert_ne!(a, b);
    }
}
