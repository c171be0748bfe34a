use std::path::PathBuf;

pub const STDLIB_ENV: &str = "N1_STDLIB";
pub const BUILTINS: &str = "builtins.asmn1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Standard library directory, searched last when resolving includes.
    pub stdlib: PathBuf,
    /// Suffixes tried after the literal path, in order.
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stdlib: default_stdlib(),
            extensions: vec![".asm".to_owned(), ".asmn1".to_owned()],
        }
    }
}

impl Config {
    pub fn with_stdlib(stdlib: impl Into<PathBuf>) -> Self {
        Self {
            stdlib: stdlib.into(),
            ..Self::default()
        }
    }

    pub fn builtins(&self) -> PathBuf {
        self.stdlib.join(BUILTINS)
    }
}

fn default_stdlib() -> PathBuf {
    if let Some(dir) = std::env::var_os(STDLIB_ENV) {
        return PathBuf::from(dir);
    }
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("stdlib")))
        .filter(|dir| dir.is_dir());
    beside_exe.unwrap_or_else(|| PathBuf::from("stdlib"))
}
