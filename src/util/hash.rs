//! Hashing utilities for plan fingerprints.

use std::path::Path;

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0"); // Separator
        self
    }

    /// Add multiple strings to the fingerprint.
    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for s in items {
            self.update_str(s);
        }
        self
    }

    /// Add a path component.
    pub fn update_path(&mut self, path: &Path) -> &mut Self {
        self.update_str(&path.to_string_lossy())
    }

    /// Add multiple paths.
    pub fn update_paths<P: AsRef<Path>>(&mut self, paths: impl IntoIterator<Item = P>) -> &mut Self {
        for path in paths {
            self.update_path(path.as_ref());
        }
        self
    }

    /// Add an optional string component.
    pub fn update_opt(&mut self, opt: Option<&str>) -> &mut Self {
        match opt {
            Some(s) => {
                self.hasher.update(b"\x01"); // Present marker
                self.update_str(s);
            }
            None => {
                self.hasher.update(b"\x00"); // Absent marker
            }
        }
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let mut fp = Fingerprint::new();
        fp.update_str("hello");
        let digest = fp.finish();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_separates_components() {
        let mut joined = Fingerprint::new();
        joined.update_strs(["ab", "c"]);

        let mut split = Fingerprint::new();
        split.update_strs(["a", "bc"]);

        assert_ne!(joined.finish(), split.finish());
    }

    #[test]
    fn test_fingerprint_paths_and_options() {
        let mut a = Fingerprint::new();
        a.update_paths(["/x/a.o", "/x/b.o"]).update_opt(None);

        let mut b = Fingerprint::new();
        b.update_paths(["/x/a.o", "/x/b.o"]).update_opt(Some(""));

        assert_ne!(a.finish(), b.finish());

        let mut c = Fingerprint::new();
        c.update_path(Path::new("/x/a.o"));
        let mut d = Fingerprint::new();
        d.update_str("/x/a.o");
        assert_eq!(c.finish(), d.finish());
    }
}
