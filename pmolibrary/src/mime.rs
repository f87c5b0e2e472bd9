//! Correspondance suffixe -> type MIME

/// Type MIME annoncé pour un suffixe de fichier (insensible à la casse)
///
/// Retourne `application/octet-stream` pour un suffixe inconnu.
pub fn mime_type(suffix: &str) -> String {
    mime_guess::from_ext(&suffix.trim().to_lowercase())
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_suffixes() {
        assert_eq!(mime_type("mp3"), "audio/mpeg");
        assert_eq!(mime_type("MP3"), "audio/mpeg");
    }

    #[test]
    fn test_unknown_suffix() {
        assert_eq!(mime_type("zzunknown"), "application/octet-stream");
        assert_eq!(mime_type(""), "application/octet-stream");
    }
}
