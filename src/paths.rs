//! Model file discovery across installation layouts.
//!
//! Process state (executable location, argv[0], environment, working
//! directory) is read only in [`SearchRoots::discover`]. Ordering and
//! resolution are plain functions over explicit inputs.

use std::env;
use std::path::{Path, PathBuf};

/// Default model file names, tried in order inside every search root.
pub const DEFAULT_MODEL_NAMES: &[&str] = &["model/RF_binary_v1.pickle", "RF_binary_v1.pickle"];

/// Environment variable naming a frozen-bundle extraction directory.
pub const BUNDLE_DIR_ENV: &str = "BPA_PREDICT_BUNDLE_DIR";

// ---------------------------------------------------------------------------
// Search roots
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated directories searched for model files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRoots {
    dirs: Vec<PathBuf>,
}

impl SearchRoots {
    /// Gather candidate directories from the running process.
    pub fn discover() -> Self {
        let roots = Self::from_sources(
            program_dir(),
            argv0_dir(),
            bundle_dir(),
            env::current_dir().ok(),
        );
        log::debug!("model search roots: {:?}", roots.dirs);
        roots
    }

    /// Order candidate directories: the bundle directory first, then the
    /// program directory, the argv[0] directory and the working directory.
    /// Later duplicates are dropped.
    pub fn from_sources(
        program: Option<PathBuf>,
        argv0: Option<PathBuf>,
        bundle: Option<PathBuf>,
        cwd: Option<PathBuf>,
    ) -> Self {
        let mut dirs: Vec<PathBuf> = Vec::new();
        dirs.extend(program);
        if let Some(dir) = argv0 {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        if let Some(dir) = bundle {
            if !dirs.contains(&dir) {
                dirs.insert(0, dir);
            }
        }
        if let Some(dir) = cwd {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        SearchRoots { dirs }
    }

    pub fn from_dirs(dirs: Vec<PathBuf>) -> Self {
        SearchRoots { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

fn program_dir() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(Path::to_path_buf)
}

fn argv0_dir() -> Option<PathBuf> {
    let argv0 = PathBuf::from(env::args_os().next()?);
    argv0.canonicalize().ok()?.parent().map(Path::to_path_buf)
}

fn bundle_dir() -> Option<PathBuf> {
    env::var_os(BUNDLE_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Outcome of a model path search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocation {
    /// The first existing candidate, or the first default name when none exist.
    pub path: PathBuf,
    /// Every path checked, in order, up to and including a match.
    pub attempted: Vec<PathBuf>,
    pub found: bool,
}

/// Locate the model file.
///
/// An explicit path is tried as given (absolute, or relative to the working
/// directory) and then joined onto each root. Failing that, every root is
/// searched for every default name, root-major. When nothing exists the
/// first default name is returned as a literal path with `found == false`;
/// the caller discovers the absence when loading. An empty explicit path
/// counts as no override.
pub fn resolve_model_path(
    explicit: Option<&Path>,
    roots: &[PathBuf],
    names: &[&str],
) -> ModelLocation {
    let mut attempted = Vec::new();

    if let Some(explicit) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        let candidates =
            std::iter::once(explicit.to_path_buf()).chain(roots.iter().map(|r| r.join(explicit)));
        for candidate in candidates {
            attempted.push(candidate.clone());
            if candidate.exists() {
                return ModelLocation {
                    path: candidate,
                    attempted,
                    found: true,
                };
            }
        }
    }

    for root in roots {
        for name in names {
            let candidate = root.join(name);
            attempted.push(candidate.clone());
            if candidate.exists() {
                return ModelLocation {
                    path: candidate,
                    attempted,
                    found: true,
                };
            }
        }
    }

    ModelLocation {
        path: names.first().map(PathBuf::from).unwrap_or_default(),
        attempted,
        found: false,
    }
}
