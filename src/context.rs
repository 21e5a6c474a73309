use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use tracing::info;

use crate::{
    config::Config,
    error::{BuildError, PathContext},
};

pub struct Context {
    site_name: String,
    config: Config,
}

impl Context {
    pub fn new(site_name: impl Into<String>, config: Config) -> Result<Self, BuildError> {
        let site_name = site_name.into();

        let mut components = Path::new(&site_name).components();
        let single_component = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_component || site_name.contains(['/', '\\']) {
            return Err(BuildError::InvalidSiteName(site_name));
        }

        Ok(Self { site_name, config })
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn input_root(&self) -> &Path {
        &self.config.input_root
    }

    /// `<output>/<site>`, home of the rewritten entry page.
    pub fn page_dir(&self) -> PathBuf {
        self.config.output_root.join(&self.site_name)
    }

    /// `<output>/<static>/<site>`, the flat asset directory.
    pub fn static_site_dir(&self) -> PathBuf {
        self.config
            .output_root
            .join(&self.config.static_dir)
            .join(&self.site_name)
    }

    pub fn entry_output(&self) -> PathBuf {
        self.page_dir().join("index.html")
    }

    pub fn asset_output<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.static_site_dir().join(name)
    }

    /// Path relative to the input root, for log lines.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(self.input_root()).unwrap_or(path)
    }

    /// Creates both site directories. Either one already existing is an
    /// error; the shared static directory above them may exist.
    pub fn create_output_dirs(&self) -> Result<(), BuildError> {
        let static_root = self.config.output_root.join(&self.config.static_dir);
        fs::create_dir_all(&static_root).at(&static_root)?;

        for dir in [self.page_dir(), self.static_site_dir()] {
            match fs::create_dir(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    return Err(BuildError::OutputExists(dir));
                }
                Err(e) => return Err(e).at(&dir),
            }
        }

        Ok(())
    }

    pub fn clean_output_dirs(&self) -> Result<(), BuildError> {
        for dir in [self.page_dir(), self.static_site_dir()] {
            match fs::remove_dir_all(&dir) {
                Ok(()) => info!("removed {}", dir.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e).at(&dir),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_in(root: &Path) -> Context {
        let config = Config {
            input_root: root.join("download"),
            output_root: root.to_path_buf(),
            ..Config::default()
        };
        Context::new("example.com", config).unwrap()
    }

    #[test]
    fn test_rejects_path_like_site_names() {
        for name in ["", ".", "..", "a/b", "a\\b", "/abs"] {
            assert!(
                matches!(
                    Context::new(name, Config::default()),
                    Err(BuildError::InvalidSiteName(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_accepts_domain_names() {
        assert!(Context::new("example.com", Config::default()).is_ok());
        assert!(Context::new("我的网站", Config::default()).is_ok());
    }

    #[test]
    fn test_output_layout() {
        let context = Context::new("example.com", Config::default()).unwrap();

        assert_eq!(
            context.entry_output(),
            Path::new(".").join("example.com").join("index.html")
        );
        assert_eq!(
            context.asset_output("img.png"),
            Path::new(".")
                .join("static")
                .join("example.com")
                .join("img.png")
        );
    }

    #[test]
    fn test_create_output_dirs_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(dir.path());

        context.create_output_dirs().unwrap();
        assert!(context.page_dir().is_dir());
        assert!(context.static_site_dir().is_dir());

        assert!(matches!(
            context.create_output_dirs(),
            Err(BuildError::OutputExists(p)) if p == context.page_dir()
        ));
    }

    #[test]
    fn test_static_root_may_already_exist() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(dir.path());
        fs::create_dir_all(dir.path().join("static").join("other.org")).unwrap();

        context.create_output_dirs().unwrap();
    }

    #[test]
    fn test_clean_output_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(dir.path());

        context.clean_output_dirs().unwrap();
        context.create_output_dirs().unwrap();
        fs::write(context.asset_output("a.css"), "a{}").unwrap();

        context.clean_output_dirs().unwrap();

        assert!(!context.page_dir().exists());
        assert!(!context.static_site_dir().exists());
        context.create_output_dirs().unwrap();
    }
}
