pub const DEFAULT_SUBJECT_IMAGE: &str = "/images/subjects/default.jpg";

// Order matters for the containment fallback: the first key found wins.
const SUBJECT_IMAGES: &[(&str, &str)] = &[
    ("الرياضيات", "/images/subjects/math.jpg"),
    ("رياضيات", "/images/subjects/math.jpg"),
    ("اللغة العربية", "/images/subjects/arabic.jpg"),
    ("العربية", "/images/subjects/arabic.jpg"),
    ("اللغة الإنجليزية", "/images/subjects/english.jpg"),
    ("اللغة الانجليزية", "/images/subjects/english.jpg"),
    ("الإنجليزية", "/images/subjects/english.jpg"),
    ("الانجليزية", "/images/subjects/english.jpg"),
    ("العلوم", "/images/subjects/science.jpg"),
    ("علوم", "/images/subjects/science.jpg"),
    ("الفيزياء", "/images/subjects/physics.jpg"),
    ("الكيمياء", "/images/subjects/chemistry.jpg"),
    ("الأحياء", "/images/subjects/biology.jpg"),
    ("الاحياء", "/images/subjects/biology.jpg"),
    ("التاريخ", "/images/subjects/history.jpg"),
    ("الجغرافيا", "/images/subjects/geography.jpg"),
    ("الدراسات الاجتماعية", "/images/subjects/social.jpg"),
    ("التربية الإسلامية", "/images/subjects/islamic.jpg"),
    ("التربية الاسلامية", "/images/subjects/islamic.jpg"),
    ("الحاسوب", "/images/subjects/computer.jpg"),
    ("الحاسب", "/images/subjects/computer.jpg"),
    ("التربية الفنية", "/images/subjects/art.jpg"),
    ("التربية البدنية", "/images/subjects/sports.jpg"),
];

/// Resolve the illustration for a subject: exact name, then the first known
/// key contained in the name, then the default image.
pub fn resolve(name: &str) -> &'static str {
    let name = name.trim();
    if name.is_empty() {
        return DEFAULT_SUBJECT_IMAGE;
    }

    if let Some((_, image)) = SUBJECT_IMAGES.iter().find(|(key, _)| *key == name) {
        return *image;
    }

    SUBJECT_IMAGES
        .iter()
        .find(|(key, _)| name.contains(key))
        .map(|(_, image)| *image)
        .unwrap_or(DEFAULT_SUBJECT_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_names_resolve_directly() {
        assert_eq!(resolve("الرياضيات"), "/images/subjects/math.jpg");
        assert_eq!(resolve(" الكيمياء "), "/images/subjects/chemistry.jpg");
    }

    #[test]
    fn spelling_variants_resolve_through_containment() {
        assert_eq!(resolve("اللغة الإنجليزية المتقدمة"), "/images/subjects/english.jpg");
        assert_eq!(resolve("مهارات الانجليزية"), "/images/subjects/english.jpg");
        assert_eq!(resolve("الرياضيات 2"), "/images/subjects/math.jpg");
    }

    #[test]
    fn unknown_names_use_the_default() {
        assert_eq!(resolve("Robotics"), DEFAULT_SUBJECT_IMAGE);
        assert_eq!(resolve(""), DEFAULT_SUBJECT_IMAGE);
    }
}
