//! Path-based language detection. Extension lookup only — no content
//! heuristics.

/// Lowercase extension -> canonical language id. ~80 entries per spec §4.5.
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("c", "c"), ("h", "c"),
    ("cc", "cpp"), ("cpp", "cpp"), ("cxx", "cpp"), ("hpp", "cpp"), ("hh", "cpp"),
    ("rs", "rust"),
    ("go", "go"),
    ("py", "python"), ("pyi", "python"),
    ("js", "javascript"), ("jsx", "javascript"), ("mjs", "javascript"), ("cjs", "javascript"),
    ("ts", "typescript"), ("tsx", "typescript"),
    ("java", "java"),
    ("kt", "kotlin"), ("kts", "kotlin"),
    ("scala", "scala"), ("sc", "scala"),
    ("rb", "ruby"), ("rake", "ruby"),
    ("php", "php"),
    ("swift", "swift"),
    ("dart", "dart"),
    ("sh", "shell"), ("bash", "shell"), ("zsh", "shell"),
    ("ps1", "powershell"), ("psm1", "powershell"),
    ("lua", "lua"),
    ("pl", "perl"), ("pm", "perl"),
    ("r", "r"),
    ("sql", "sql"),
    ("yaml", "yaml"), ("yml", "yaml"),
    ("json", "json"), ("jsonc", "json"),
    ("toml", "toml"),
    ("xml", "xml"),
    ("html", "html"), ("htm", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "sass"),
    ("less", "less"),
    ("md", "markdown"), ("markdown", "markdown"),
    ("graphql", "graphql"), ("gql", "graphql"),
    ("proto", "protobuf"),
    ("tf", "terraform"), ("tfvars", "terraform"),
    ("hs", "haskell"), ("lhs", "haskell"),
    ("ml", "ocaml"), ("mli", "ocaml"),
    ("fs", "fsharp"), ("fsx", "fsharp"), ("fsi", "fsharp"),
    ("ex", "elixir"), ("exs", "elixir"),
    ("erl", "erlang"), ("hrl", "erlang"),
    ("zig", "zig"),
    ("nim", "nim"), ("nims", "nim"),
    ("clj", "clojure"), ("cljs", "clojure"), ("cljc", "clojure"),
    ("groovy", "groovy"), ("gradle", "groovy"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("jl", "julia"),
    ("cs", "csharp"),
    ("vb", "vbnet"),
    ("d", "d"),
    ("elm", "elm"),
    ("nix", "nix"),
    ("cmake", "cmake"),
    ("mk", "makefile"),
    ("csv", "csv"),
    ("ini", "ini"), ("cfg", "ini"),
    ("env", "dotenv"),
    ("dockerfile", "dockerfile"),
];

/// Lowercase file-name stems that identify a language independent of
/// extension (e.g. `Dockerfile` has none).
const FILENAME_TABLE: &[(&str, &str)] = &[("dockerfile", "dockerfile"), ("makefile", "makefile")];

/// Returns `""` (not `None`) on an unrecognized extension, matching the
/// spec's "unknown extension -> empty string" contract.
pub fn detect_language_from_path(path: &str) -> String {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path).to_lowercase();

    if let Some((_, lang)) = FILENAME_TABLE.iter().find(|(name, _)| *name == file_name) {
        return lang.to_string();
    }

    match file_name.rsplit_once('.') {
        Some((_, ext)) => EXTENSION_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, lang)| lang.to_string())
            .unwrap_or_default(),
        None => String::new(),
    }
}
