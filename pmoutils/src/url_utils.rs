/// Normalise un chemin de contexte HTTP pour qu'il commence et se termine par `/`.
///
/// `""` et `"/"` donnent `"/"`, `"music"` et `"/music/"` donnent `"/music/"`.
pub fn normalize_context_path(context_path: &str) -> String {
    let trimmed = context_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Construit l'URL de base publiée vers les clients : `http://<host>:<port><context>`.
///
/// Un `host` déjà préfixé par `http://` ou `https://` est conservé tel quel
/// (sans le port, supposé inclus).
pub fn build_base_url(host: &str, port: u16, context_path: &str) -> String {
    let context = normalize_context_path(context_path);
    let host = host.trim().trim_end_matches('/');

    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}{}", host, context)
    } else {
        format!("http://{}:{}{}", host, port, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_context_path() {
        assert_eq!(normalize_context_path(""), "/");
        assert_eq!(normalize_context_path("/"), "/");
        assert_eq!(normalize_context_path("music"), "/music/");
        assert_eq!(normalize_context_path("/music/"), "/music/");
        assert_eq!(normalize_context_path("//a/b//"), "/a/b/");
    }

    #[test]
    fn test_build_base_url() {
        assert_eq!(build_base_url("10.0.0.2", 4040, "/"), "http://10.0.0.2:4040/");
        assert_eq!(
            build_base_url("10.0.0.2", 8080, "subsonic"),
            "http://10.0.0.2:8080/subsonic/"
        );
    }

    #[test]
    fn test_build_base_url_with_scheme() {
        assert_eq!(
            build_base_url("https://music.example.org/", 443, "/"),
            "https://music.example.org/"
        );
    }
}
