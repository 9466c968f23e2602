use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Broad file type, derived from the extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Images,
    Documents,
    Spreadsheets,
    Videos,
    Audio,
    Archives,
    Code,
    Others,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Images,
        Self::Documents,
        Self::Spreadsheets,
        Self::Videos,
        Self::Audio,
        Self::Archives,
        Self::Code,
        Self::Others,
    ];

    /// Directory name used under an organize target.
    pub fn label(self) -> &'static str {
        match self {
            Self::Images => "Images",
            Self::Documents => "Documents",
            Self::Spreadsheets => "Spreadsheets",
            Self::Videos => "Videos",
            Self::Audio => "Audio",
            Self::Archives => "Archives",
            Self::Code => "Code",
            Self::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    /// Lower-cased, with the leading dot.
    pub extensions: Vec<String>,
}

/// Ordered extension rules. The first rule listing an extension wins and
/// anything unlisted falls through to [`Category::Others`].
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl CategoryTable {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Accepts "PNG", "png" or ".png".
    pub fn categorize(&self, extension: &str) -> Category {
        let normalized = normalize_extension(extension);
        if normalized.is_empty() {
            return Category::Others;
        }

        for rule in &self.rules {
            if rule.extensions.iter().any(|ext| *ext == normalized) {
                return rule.category;
            }
        }
        Category::Others
    }

    pub fn categorize_path(&self, path: &Path) -> Category {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        self.categorize(&extension)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let rule = |category: Category, extensions: &[&str]| CategoryRule {
            category,
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        };

        Self::new(vec![
            rule(
                Category::Images,
                &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp"],
            ),
            rule(
                Category::Documents,
                &[".pdf", ".doc", ".docx", ".txt", ".md", ".odt"],
            ),
            rule(Category::Spreadsheets, &[".xls", ".xlsx", ".csv", ".ods"]),
            rule(
                Category::Videos,
                &[".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv"],
            ),
            rule(
                Category::Audio,
                &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a"],
            ),
            rule(Category::Archives, &[".zip", ".rar", ".7z", ".tar", ".gz"]),
            rule(
                Category::Code,
                &[".py", ".js", ".java", ".cpp", ".c", ".h", ".cs", ".html", ".css"],
            ),
        ])
    }
}

/// Process-wide read-only table used by the file tools.
pub static CATEGORY_TABLE: Lazy<CategoryTable> = Lazy::new(CategoryTable::default);

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}
