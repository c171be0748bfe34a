use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ahash::{AHashMap, AHashSet};

use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::module::Module;
use crate::token::{self, Token, TokenType};
use crate::Include;


/// A claimed path waiting to be loaded, with the include that asked for it.
#[derive(Debug)]
struct Pending {
    path: PathBuf,
    from: Option<(PathBuf, Token)>,
}

/// Registry of loaded modules keyed by canonical path. Every path is loaded
/// at most once, however many modules include it.
#[derive(Debug)]
pub struct Loader {
    config: Config,
    root_dir: Option<PathBuf>,
    builtins: Option<PathBuf>,
    modules: AHashMap<PathBuf, Module>,
    order: Vec<PathBuf>,
    claimed: AHashSet<PathBuf>,
    queue: VecDeque<Pending>,
}

impl Loader {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            root_dir: None,
            builtins: None,
            modules: AHashMap::new(),
            order: Vec::new(),
            claimed: AHashSet::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads `path` and everything it includes. Returns the canonical root path.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let root = path.canonicalize().map_err(|e| {
            Error::bare(path, ErrorKind::Include, format!("cannot open module: {e}"))
        })?;
        if self.root_dir.is_none() {
            self.root_dir = root.parent().map(Path::to_path_buf);
        }
        self.claim(root.clone(), None);
        while let Some(pending) = self.queue.pop_front() {
            self.load_one(pending)?;
        }
        Ok(root)
    }

    pub fn get(&self, path: &Path) -> Option<&Module> {
        self.modules.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.modules.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules in load order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.order.iter().filter_map(|path| self.modules.get(path))
    }

    pub fn into_modules(mut self) -> Vec<Module> {
        self.order
            .iter()
            .filter_map(|path| self.modules.remove(path))
            .collect()
    }

    /// Queues `path` unless it was claimed before.
    fn claim(&mut self, path: PathBuf, from: Option<(PathBuf, Token)>) -> bool {
        if !self.claimed.insert(path.clone()) {
            tracing::trace!(path = %path.display(), "already claimed");
            return false;
        }
        tracing::debug!(path = %path.display(), "claimed");
        self.queue.push_back(Pending { path, from });
        true
    }

    fn load_one(&mut self, pending: Pending) -> Result<()> {
        let Pending { path, from } = pending;
        let source = std::fs::read_to_string(&path).map_err(|e| {
            let message = format!("cannot read module \"{}\": {e}", path.display());
            match from.as_ref().and_then(|(parent, at)| Some((self.modules.get(parent)?, at))) {
                Some((parent, at)) => Error::new(
                    &parent.path,
                    &parent.source,
                    at.line,
                    ErrorKind::Include,
                    message,
                )
                .at_token(at),
                None => Error::bare(&path, ErrorKind::Include, message),
            }
        })?;
        let mut module = Module::build(path.clone(), source)?;
        tracing::debug!(
            path = %path.display(),
            includes = module.includes.len(),
            macros = module.macros.len(),
            instructions = module.instructions.len(),
            "loaded"
        );

        if !self.is_builtins(&path) {
            let builtins = self.builtins_path(&module)?;
            self.claim(builtins, None);
        }

        let includes = std::mem::take(&mut module.includes);
        for include in &includes {
            let resolved = self.resolve(&module, include)?;
            tracing::debug!(
                from = %path.display(),
                to = %resolved.display(),
                "resolved include"
            );
            module.include_paths.push(resolved.clone());
            let at = include.path.first().copied();
            self.claim(resolved, at.map(|at| (path.clone(), at)));
        }
        module.includes = includes;

        self.order.push(path.clone());
        self.modules.insert(path, module);
        Ok(())
    }

    fn is_builtins(&self, path: &Path) -> bool {
        match &self.builtins {
            Some(builtins) => builtins == path,
            None => self
                .config
                .builtins()
                .canonicalize()
                .is_ok_and(|builtins| builtins == path),
        }
    }

    fn builtins_path(&mut self, module: &Module) -> Result<PathBuf> {
        if let Some(builtins) = &self.builtins {
            return Ok(builtins.clone());
        }
        let wanted = self.config.builtins();
        let builtins = wanted.canonicalize().map_err(|e| {
            Error::new(
                &module.path,
                &module.source,
                0,
                ErrorKind::Include,
                format!(
                    "cannot find the standard library module \"{}\": {e}",
                    wanted.display()
                ),
            )
        })?;
        self.builtins = Some(builtins.clone());
        Ok(builtins)
    }

    /// Finds the file an include names, trying the literal path, then the root
    /// file's directory, then the standard library.
    pub fn resolve(&self, module: &Module, include: &Include) -> Result<PathBuf> {
        let at = include.path.first().copied();
        let error = |kind, message: String| {
            let err = Error::new(&module.path, &module.source, 0, kind, message);
            match &at {
                Some(at) => err.at_token(at),
                None => err,
            }
        };
        let target = include_target(module, &include.path).ok_or_else(|| {
            error(
                ErrorKind::Syntax,
                "include path must be a string or names separated by '/'".to_owned(),
            )
        })?;

        let bases = [None, self.root_dir.as_deref(), Some(self.config.stdlib.as_path())];
        for base in bases {
            for candidate in self.candidates(&target) {
                let candidate = match base {
                    Some(base) => base.join(candidate),
                    None => candidate,
                };
                if candidate.is_file() {
                    return candidate.canonicalize().map_err(|e| {
                        error(
                            ErrorKind::Include,
                            format!("cannot open module \"{}\": {e}", candidate.display()),
                        )
                    });
                }
            }
        }
        Err(error(
            ErrorKind::Include,
            format!(
                "cannot find module \"{target}\" (tried {}, relative to the root directory and in \"{}\")",
                self.tried(&target),
                self.config.stdlib.display()
            ),
        ))
    }

    fn candidates(&self, target: &str) -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(target)];
        for extension in &self.config.extensions {
            let mut path = OsString::from(target);
            path.push(extension);
            candidates.push(PathBuf::from(path));
        }
        candidates
    }

    fn tried(&self, target: &str) -> String {
        let names: Vec<String> = self
            .candidates(target)
            .iter()
            .map(|c| format!("\"{}\"", c.display()))
            .collect();
        names.join(", ")
    }
}

/// Path text of an include: a single STRING, or NAME tokens with SLASH
/// separators turned into `/`.
fn include_target(module: &Module, tokens: &[Token]) -> Option<String> {
    match tokens {
        [single] if single.is(TokenType::String) => Some(module.text(single).to_owned()),
        [] => None,
        _ => {
            let rest = token::without(&token::without(tokens, TokenType::Slash), TokenType::Name);
            if !rest.is_empty() {
                return None;
            }
            let target = tokens
                .iter()
                .map(|t| match t.kind {
                    TokenType::Slash => "/",
                    _ => module.text(t),
                })
                .collect();
            Some(target)
        }
    }
}
