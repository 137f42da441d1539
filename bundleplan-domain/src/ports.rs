use camino::{Utf8Path, Utf8PathBuf};

/// Read-only file-existence check used during alias resolution.
///
/// Injected so resolution stays pure and testable without a real file system.
pub trait FileProbe {
    fn is_file(&self, path: &Utf8Path) -> bool;
}

impl<F> FileProbe for F
where
    F: Fn(&Utf8Path) -> bool,
{
    fn is_file(&self, path: &Utf8Path) -> bool {
        self(path)
    }
}

/// File-system backed `FileProbe`. Relative candidates are joined onto `root`.
#[derive(Debug, Clone)]
pub struct FsFileProbe {
    root: Utf8PathBuf,
}

impl FsFileProbe {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    fn abs(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl FileProbe for FsFileProbe {
    fn is_file(&self, path: &Utf8Path) -> bool {
        self.abs(path).is_file()
    }
}
