//! Media type guesses for local files.

use std::path::Path;

/// Media type implied by the file extension, for the asset kinds a loader
/// typically fetches.
pub fn guess_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mt = match ext.as_str() {
        "glb" => "model/gltf-binary",
        "gltf" => "model/gltf+json",
        "obj" => "model/obj",
        "bin" => "application/octet-stream",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "ktx2" => "image/ktx2",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        _ => return None,
    };
    Some(mt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(guess_from_path(Path::new("scene.GLB")), Some("model/gltf-binary"));
        assert_eq!(guess_from_path(Path::new("/a/b/tex.jpeg")), Some("image/jpeg"));
        assert_eq!(guess_from_path(Path::new("notes.txt")), Some("text/plain"));
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(guess_from_path(Path::new("archive.xyz")), None);
        assert_eq!(guess_from_path(Path::new("README")), None);
    }
}
