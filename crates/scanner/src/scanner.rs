use crate::error::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Controls which files a scan yields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanOptions {
    /// Files larger than this are skipped
    pub max_file_size: u64,

    /// Lowercase extensions (without dot) to keep; empty keeps every extension
    pub allowed_extensions: Vec<String>,

    /// Extra glob patterns, matched against file names, to exclude
    pub extra_excludes: Vec<String>,

    /// Walk hidden files and directories
    pub include_hidden: bool,

    /// Number of files read concurrently while loading
    pub read_concurrency: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_BYTES,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            extra_excludes: Vec::new(),
            include_hidden: false,
            read_concurrency: 16,
        }
    }
}

impl ScanOptions {
    /// Keep files of every extension
    #[must_use]
    pub fn any_extension(mut self) -> Self {
        self.allowed_extensions.clear();
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_file_size == 0 {
            return Err("max_file_size must be > 0".to_string());
        }
        if self.read_concurrency == 0 {
            return Err("read_concurrency must be > 0".to_string());
        }
        Ok(())
    }
}

/// Scanner for finding analysable files in a project
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options: ScanOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan the project (.gitignore aware), returning paths sorted for stable output
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let excludes = self.exclude_set()?;
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(!self.options.include_hidden)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false);
        builder.filter_entry(move |entry| !is_excluded_dir(entry.path(), &root));

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if let Ok(meta) = entry.metadata() {
                if meta.len() > self.options.max_file_size {
                    log::debug!(
                        "Skipping large file {} ({} bytes > {})",
                        path.display(),
                        meta.len(),
                        self.options.max_file_size
                    );
                    continue;
                }
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if excludes.is_match(name.to_lowercase()) {
                log::debug!("Skipping excluded file {}", path.display());
                continue;
            }

            if !self.is_allowed_extension(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        log::info!("Found {} files under {}", files.len(), self.root.display());
        Ok(files)
    }

    /// Project-relative path with `/` separators
    pub fn relative_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn is_allowed_extension(&self, path: &Path) -> bool {
        if self.options.allowed_extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.options.allowed_extensions.iter().any(|a| a == &ext))
    }

    fn exclude_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        let patterns = EXCLUDED_FILE_PATTERNS
            .iter()
            .copied()
            .chain(self.options.extra_excludes.iter().map(String::as_str));
        for pattern in patterns {
            builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
        }
        Ok(builder.build()?)
    }
}

fn is_excluded_dir(path: &Path, root: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    relative.components().any(|component| match component {
        Component::Normal(name) => {
            let lowered = name.to_string_lossy().to_lowercase();
            EXCLUDED_DIRS.iter().any(|dir| *dir == lowered)
        }
        _ => false,
    })
}

const EXCLUDED_DIRS: &[&str] = &[
    // build output
    "node_modules",
    "dist",
    "build",
    "out",
    ".next",
    "coverage",
    "__pycache__",
    "venv",
    "target",
    "bin",
    "obj",
    // VCS / editors
    ".git",
    ".svn",
    ".idea",
    ".vscode",
    ".nyc_output",
];

const EXCLUDED_FILE_PATTERNS: &[&str] = &[
    // lock files
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "gemfile.lock",
    "poetry.lock",
    // compiled artifacts
    "*.pyc",
    "*.pyo",
    "*.pyd",
    "*.class",
    "*.o",
    "*.obj",
    "*.exe",
    "*.dll",
    "*.so",
    "*.dylib",
    // editor files
    ".ds_store",
    "thumbs.db",
    "*.swp",
    "*.swo",
    "*~",
    // logs and temp files
    "*.log",
    "*.tmp",
    "*.temp",
    "*.cache",
    // coverage reports
    "*.lcov",
    "coverage.xml",
    // media and archives
    "*.jpg",
    "*.jpeg",
    "*.png",
    "*.gif",
    "*.ico",
    "*.pdf",
    "*.zip",
    "*.tar",
    "*.gz",
    "*.rar",
    // env and secrets
    ".env*",
    "*.pem",
    "*.key",
    "*.cert",
    "secrets.*",
];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

const ALLOWED_EXTENSIONS: &[&str] = &[
    // Web
    "js", "jsx", "ts", "tsx", "vue", "svelte", "html", "htm", "css", "scss", "sass", "less",
    // Backend
    "py", "rb", "php", "java", "go", "rs", "cs", "cpp", "c", "h", "hpp",
    // Config and data
    "json", "yaml", "yml", "toml", "xml", "sql", "graphql", "gql",
    // Docs
    "md", "mdx", "rst", "txt",
];
