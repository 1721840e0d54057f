use std::path::Path;

/// Display name used when an extension is not recognised
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Lowercase extension of a project-relative file name.
///
/// Names without a dot yield the whole (lowercased) file name, so `Makefile` maps to `makefile`.
pub fn extension_of(filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(filename);

    name.rsplit('.').next().unwrap_or(name).to_lowercase()
}

/// Human readable language name for a lowercase extension
pub fn language_for_extension(ext: &str) -> &'static str {
    match ext {
        // Web
        "js" => "JavaScript",
        "jsx" => "React JSX",
        "ts" => "TypeScript",
        "tsx" => "React TSX",
        "html" | "htm" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "sass" => "SASS",
        "less" => "LESS",
        "vue" => "Vue",
        "svelte" => "Svelte",

        // Backend
        "py" => "Python",
        "java" => "Java",
        "class" => "Java Bytecode",
        "cpp" | "cc" | "cxx" => "C++",
        "c" => "C",
        "h" => "C/C++ Header",
        "hpp" => "C++ Header",
        "cs" => "C#",
        "go" => "Go",
        "rs" => "Rust",
        "rb" => "Ruby",
        "php" => "PHP",
        "pl" => "Perl",
        "swift" => "Swift",
        "kt" => "Kotlin",
        "scala" => "Scala",
        "m" => "Objective-C",
        "mm" => "Objective-C++",

        // Shell
        "sh" => "Shell Script",
        "bash" => "Bash Script",
        "zsh" => "Zsh Script",
        "fish" => "Fish Script",
        "ps1" => "PowerShell",
        "bat" => "Batch Script",
        "cmd" => "Command Script",

        // Data and config
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "xml" => "XML",
        "toml" => "TOML",
        "ini" => "INI",
        "conf" | "config" => "Configuration",
        "env" => "Environment Variables",
        "graphql" | "gql" => "GraphQL",

        // Docs
        "md" => "Markdown",
        "mdx" => "MDX",
        "txt" => "Plain Text",
        "rst" => "reStructuredText",
        "tex" => "LaTeX",
        "doc" | "docx" => "Word Document",
        "pdf" => "PDF",

        // Database
        "sql" => "SQL",
        "psql" => "PostgreSQL",
        "mysql" => "MySQL",
        "sqlite" => "SQLite",

        // Other
        "r" => "R",
        "matlab" => "MATLAB",
        "f" => "Fortran",
        "f90" => "Fortran 90",
        "asm" | "s" => "Assembly",
        "dart" => "Dart",
        "lua" => "Lua",
        "ex" => "Elixir",
        "exs" => "Elixir Script",
        "erl" => "Erlang",
        "hrl" => "Erlang Header",
        "clj" => "Clojure",
        "elm" => "Elm",
        "hs" => "Haskell",
        "lhs" => "Literate Haskell",

        _ => UNKNOWN_LANGUAGE,
    }
}

/// Language name for a file name
pub fn detect_language(filename: &str) -> &'static str {
    language_for_extension(&extension_of(filename))
}
