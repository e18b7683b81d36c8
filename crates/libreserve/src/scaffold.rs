use std::{
    fs, io,
    path::{Path, PathBuf},
};

use time::OffsetDateTime;
use tracing::debug;

use crate::{config::Config, error::ScaffoldError, request::PackageRequest};

/// Placeholder version used for every reservation.
pub const PLACEHOLDER_VERSION: &str = "0.0.1";

/// Module marker written inside the package directory.
pub const INIT_FILE: &str = "__init__.py";
/// Manifest file name.
pub const MANIFEST_FILE: &str = "setup.py";
/// README file name.
pub const README_FILE: &str = "README.md";
/// License file name.
pub const LICENSE_FILE: &str = "LICENSE";

/// Write the package skeleton for `request` and return the project root.
///
/// Directories that already exist are reused and files are overwritten, so
/// calling this repeatedly yields the same tree. A failure part-way leaves
/// whatever was already written in place.
pub fn create_package(config: &Config, request: &PackageRequest) -> Result<PathBuf, ScaffoldError> {
    let base_dir = request.base_dir();
    if base_dir.exists() && !base_dir.is_dir() {
        return Err(ScaffoldError::NotADirectory {
            path: base_dir.to_path_buf(),
        });
    }

    let root = request.root();
    let module_dir = root.join(request.name());
    create_dir(&module_dir)?;

    write_file(&module_dir.join(INIT_FILE), "")?;
    write_file(&root.join(MANIFEST_FILE), &render_manifest(config, request))?;
    write_file(&root.join(README_FILE), &render_readme(request))?;
    write_file(
        &root.join(LICENSE_FILE),
        &render_license(&config.author, current_year()),
    )?;

    Ok(root)
}

/// Create `path` and all of its parents.
fn create_dir(path: &Path) -> Result<(), ScaffoldError> {
    fs::create_dir_all(path).map_err(|source| io_error(path, source))
}

/// Overwrite `path` with `contents`.
fn write_file(path: &Path, contents: &str) -> Result<(), ScaffoldError> {
    debug!(path = %path.display(), "writing");
    fs::write(path, contents).map_err(|source| io_error(path, source))
}

/// Attach the failing path to an I/O error.
fn io_error(path: &Path, source: io::Error) -> ScaffoldError {
    ScaffoldError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// README body: a level-1 heading of the name followed by the description.
pub fn render_readme(request: &PackageRequest) -> String {
    format!("# {}\n{}", request.name(), request.description())
}

/// setuptools manifest for the placeholder release.
pub fn render_manifest(config: &Config, request: &PackageRequest) -> String {
    let name = request.name();
    let url = format!("https://example.com/{name}");
    format!(
        "from setuptools import setup, find_packages

setup(
    name={name},
    version={version},
    packages=find_packages(),
    description={description},
    long_description=open('README.md', encoding='utf-8').read(),
    long_description_content_type='text/markdown',
    author={author},
    author_email={email},
    url={url},
    classifiers=[
        'Programming Language :: Python :: 3',
        'License :: OSI Approved :: MIT License',
        'Operating System :: OS Independent',
    ],
    python_requires='>=3.6',
)",
        name = python_literal(name),
        version = python_literal(PLACEHOLDER_VERSION),
        description = python_literal(request.description()),
        author = python_literal(&config.author),
        email = python_literal(&config.author_email),
        url = python_literal(&url),
    )
}

/// MIT license text for `author` in `year`.
pub fn render_license(author: &str, year: i32) -> String {
    format!(
        "MIT License

Copyright (c) {year} {author}

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
"
    )
}

/// Encode `value` as a single-quoted Python string literal.
pub fn python_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(ch))),
            ch => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Current calendar year in UTC.
fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    /// Read back a single-quoted literal produced by [`python_literal`].
    fn parse_literal(src: &str) -> Option<(String, &str)> {
        let rest = src.strip_prefix('\'')?;
        let mut out = String::new();
        let mut chars = rest.char_indices();
        while let Some((idx, ch)) = chars.next() {
            match ch {
                '\'' => return Some((out, &rest[idx + 1..])),
                '\\' => {
                    let (_, esc) = chars.next()?;
                    match esc {
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        'u' => {
                            let hex: String = (0..4)
                                .filter_map(|_| chars.next())
                                .map(|(_, c)| c)
                                .collect();
                            out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
                        }
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
        None
    }

    /// Extract the literal value of keyword argument `key` from a manifest.
    fn manifest_field(manifest: &str, key: &str) -> Option<String> {
        let marker = format!("\n    {key}=");
        let start = manifest.find(&marker)? + marker.len();
        parse_literal(&manifest[start..]).map(|(value, _)| value)
    }

    fn config() -> Config {
        let temp_dir = TempDir::new().unwrap();
        Config::from_lookup(|_| None, temp_dir.path())
    }

    #[test]
    fn test_end_to_end_layout() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let request = PackageRequest::new("demoLib123", "demo package", temp_dir.path())?;
        let root = create_package(&config(), &request)?;

        assert_eq!(root, temp_dir.path().join("demoLib123"));
        assert!(root.join("demoLib123").join("__init__.py").is_file());
        assert!(root.join("setup.py").is_file());
        assert!(root.join("LICENSE").is_file());
        assert_eq!(
            fs::read_to_string(root.join("README.md"))?,
            "# demoLib123\ndemo package"
        );
        assert_eq!(fs::read_to_string(root.join("demoLib123/__init__.py"))?, "");
        Ok(())
    }

    #[test]
    fn test_scaffold_is_idempotent() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let request = PackageRequest::new("foo", "desc", temp_dir.path())?;
        let config = config();

        let root = create_package(&config, &request)?;
        let snapshot = |root: &Path| -> Result<Vec<(PathBuf, String)>> {
            let mut files = Vec::new();
            for rel in ["foo/__init__.py", "setup.py", "README.md", "LICENSE"] {
                files.push((PathBuf::from(rel), fs::read_to_string(root.join(rel))?));
            }
            Ok(files)
        };
        let first = snapshot(&root)?;

        let again = create_package(&config, &request)?;
        assert_eq!(again, root);
        assert_eq!(snapshot(&root)?, first);
        assert_eq!(fs::read_dir(&root)?.count(), 4);
        Ok(())
    }

    #[test]
    fn test_scaffold_overwrites_existing_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let request = PackageRequest::new("foo", "new", temp_dir.path())?;
        let root = temp_dir.path().join("foo");
        fs::create_dir_all(&root)?;
        fs::write(root.join("README.md"), "stale contents that are longer")?;

        create_package(&config(), &request)?;
        assert_eq!(fs::read_to_string(root.join("README.md"))?, "# foo\nnew");
        Ok(())
    }

    #[test]
    fn test_scaffold_creates_missing_base_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path().join("nested").join("base");
        let request = PackageRequest::new("foo", "", &base)?;
        create_package(&config(), &request)?;
        assert!(base.join("foo").join("foo").is_dir());
        Ok(())
    }

    #[test]
    fn test_scaffold_rejects_file_as_base_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = temp_dir.path().join("file");
        fs::write(&base, "")?;
        let request = PackageRequest::new("foo", "", &base)?;
        let err = create_package(&config(), &request).unwrap_err();
        assert!(matches!(err, ScaffoldError::NotADirectory { .. }));
        Ok(())
    }

    #[test]
    fn test_readme_with_multiline_description() -> Result<()> {
        for description in ["demo package", "first\nsecond\n", "  spaced  ", "# not a heading"] {
            let request = PackageRequest::new("pkg", description, "/tmp")?;
            assert_eq!(render_readme(&request), format!("# pkg\n{description}"));
        }
        Ok(())
    }

    #[test]
    fn test_manifest_round_trips_name_and_description() -> Result<()> {
        let config = config();
        for (name, description) in [
            ("demoLib123", "demo package"),
            ("a.b_c-d", "multi\nline\tdescription"),
            ("quoted", "it's a \"test\" with \\ backslash"),
            ("unicode", "Größe und Maße"),
        ] {
            let request = PackageRequest::new(name, description, "/tmp")?;
            let manifest = render_manifest(&config, &request);
            assert_eq!(manifest_field(&manifest, "name").as_deref(), Some(name));
            assert_eq!(
                manifest_field(&manifest, "description").as_deref(),
                Some(description)
            );
            assert_eq!(
                manifest_field(&manifest, "version").as_deref(),
                Some(PLACEHOLDER_VERSION)
            );
            assert_eq!(
                manifest_field(&manifest, "url"),
                Some(format!("https://example.com/{name}"))
            );
        }
        Ok(())
    }

    #[test]
    fn test_license_names_author_and_year() {
        let license = render_license("Jane Doe", 2031);
        assert!(license.starts_with("MIT License\n\nCopyright (c) 2031 Jane Doe\n"));
        assert!(license.contains("WITHOUT WARRANTY OF ANY KIND"));
    }

    #[test]
    fn test_python_literal_escapes() {
        assert_eq!(python_literal("plain"), "'plain'");
        assert_eq!(python_literal("it's"), "'it\\'s'");
        assert_eq!(python_literal("a\\b"), "'a\\\\b'");
        assert_eq!(python_literal("x\ny"), "'x\\ny'");
        assert_eq!(python_literal("\u{1}"), "'\\u0001'");
    }

    #[test]
    fn test_license_uses_current_year() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let request = PackageRequest::new("demo", "", temp_dir.path())?;
        let root = create_package(&config(), &request)?;

        let year = OffsetDateTime::now_utc().year();
        let license = fs::read_to_string(root.join(LICENSE_FILE))?;
        assert!(license.contains(&format!("Copyright (c) {year} Your Name")));
        Ok(())
    }
}
