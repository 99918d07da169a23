//! File extension → language tag lookup.

/// Tag used when a path has no extension or an unmapped one.
pub const PLAIN_TEXT: &str = "plaintext";

const LANGUAGES: &[(&str, &str)] = &[
    ("bash", "shell"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("cs", "csharp"),
    ("css", "css"),
    ("go", "go"),
    ("h", "c"),
    ("hpp", "cpp"),
    ("html", "html"),
    ("java", "java"),
    ("js", "javascript"),
    ("json", "json"),
    ("jsx", "javascript"),
    ("kt", "kotlin"),
    ("md", "markdown"),
    ("php", "php"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("scss", "scss"),
    ("sh", "shell"),
    ("sql", "sql"),
    ("swift", "swift"),
    ("toml", "toml"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("xml", "xml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
];

/// Language tag for a file path, derived from its extension.
#[must_use]
pub fn language_for_path(path: &str) -> &'static str {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return PLAIN_TEXT;
    };
    // dotfiles like `.bashrc` have no extension
    if stem.is_empty() {
        return PLAIN_TEXT;
    }
    let ext = ext.to_ascii_lowercase();
    LANGUAGES
        .binary_search_by(|(key, _)| (*key).cmp(ext.as_str()))
        .map_or(PLAIN_TEXT, |idx| LANGUAGES[idx].1)
}
