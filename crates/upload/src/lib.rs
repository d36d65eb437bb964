//! Attachment normalization for the Kelp chat client.
//!
//! Turns a raw file into a typed content block the core consumes
//! unmodified: image, document, text, or binary. Files whose extension is
//! not in the allow-list produce no block at all.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use kcore::{BlockSource, ContentBlock};
use std::path::Path;

mod pdf;

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "gif", "png", "webp"];

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];

const TEXT_EXTENSIONS: &[&str] = &[
    "html", "htm", "xhtml", "css", "scss", "sass", "less", "js", "jsx", "mjs", "ts", "fpp",
    "tsx", "php", "phtml", "php3", "php4", "php5", "php7", "vue", "svelte", "py", "lsp", "lisp",
    "pyw", "pyc", "pyd", "pyo", "ipynb", "ipynb_checkpoints", "c", "cc", "cpp", "cxx", "c++",
    "h", "hpp", "hxx", "h++", "cs", "csx", "java", "class", "jar", "kt", "kts", "groovy",
    "scala", "clj", "rb", "rbw", "rake", "gemspec", "sh", "bash", "zsh", "ps1", "psm1", "bat",
    "cmd", "pl", "pm", "tcl", "asm", "s", "f", "for", "f90", "f95", "swift", "m", "mm", "dart",
    "sql", "mysql", "pgsql", "nosql", "go", "rs", "rlib", "lua", "ino", "ex", "exs", "erl",
    "hrl", "hs", "xml", "xsl", "xslt", "json", "jsonc", "yaml", "yml", "toml", "wasm", "wat",
    "r", "rmd", "jl", "d", "nim", "ml", "mli", "fs", "fsx", "coffee", "ls", "v", "zig", "pkl",
    "model", "weights", "tex", "txt", "rst", "md", "markdown", "cmake", "mak", "make", "gradle",
    "pom", "editorconfig", "conf", "sublime-project", "vscode", "idea", "gitignore",
    "gitattributes", "gitmodules",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Image,
    Document,
    Text,
}

/// Normalizes uploaded files into content blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadManager;

impl UploadManager {
    pub fn new() -> Self {
        Self
    }

    /// Normalize the file at `path`.
    ///
    /// Returns `None` for disallowed extensions and on any read failure.
    pub fn upload(&self, path: &Path) -> Option<ContentBlock> {
        let name = path.file_name()?.to_string_lossy();
        let (category, extension) = classify(&name)?;

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("upload failed: {e}");
                return None;
            }
        };

        Some(match category {
            Category::Image => ContentBlock::Image {
                source: BlockSource::base64(media_type_for(&extension), BASE64.encode(&bytes)),
            },
            Category::Document => ContentBlock::Document {
                source: BlockSource::base64("application/pdf", BASE64.encode(pdf::cap_pages(bytes))),
            },
            Category::Text => match String::from_utf8(bytes) {
                Ok(text) => ContentBlock::Text { text },
                // Unreadable as text: fall back to an opaque binary block.
                Err(e) => ContentBlock::Binary {
                    source: BlockSource::base64(
                        "application/octet-stream",
                        BASE64.encode(e.into_bytes()),
                    ),
                },
            },
        })
    }
}

/// Match a filename against the allow-lists by suffix, case-insensitive.
/// The first matching category wins; a name without an extension matches
/// nothing.
fn classify(filename: &str) -> Option<(Category, String)> {
    let (_, extension) = filename.rsplit_once('.')?;
    let extension = extension.to_lowercase();

    for (category, extensions) in [
        (Category::Image, IMAGE_EXTENSIONS),
        (Category::Document, DOCUMENT_EXTENSIONS),
        (Category::Text, TEXT_EXTENSIONS),
    ] {
        if extensions.contains(&extension.as_str()) {
            return Some((category, extension));
        }
    }

    None
}

fn media_type_for(extension: &str) -> &'static str {
    match extension {
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_case_insensitive_suffix_match() {
        assert_eq!(classify("photo.PNG"), Some((Category::Image, "png".into())));
        assert_eq!(
            classify("paper.pdf"),
            Some((Category::Document, "pdf".into()))
        );
        assert_eq!(classify("main.rs"), Some((Category::Text, "rs".into())));
        assert_eq!(
            classify("archive.tar.GZ"),
            None,
            "only the final suffix is consulted"
        );
    }

    #[test]
    fn classify_rejects_missing_or_unknown_extensions() {
        assert_eq!(classify("README"), None);
        assert_eq!(classify("movie.mp4"), None);
    }

    #[test]
    fn dotfiles_match_on_their_whole_suffix() {
        assert_eq!(
            classify(".gitignore"),
            Some((Category::Text, "gitignore".into()))
        );
    }

    #[test]
    fn first_matching_category_wins() {
        // "v" appears only in the text list, but the probe guards the
        // image-before-text precedence for shared suffixes.
        assert_eq!(classify("module.v"), Some((Category::Text, "v".into())));
        assert_eq!(classify("pic.webp"), Some((Category::Image, "webp".into())));
    }
}
