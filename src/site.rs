use std::{
    collections::HashMap,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    asset,
    config::CollisionPolicy,
    context::Context,
    error::{BuildError, PathContext},
    page::Payload,
    rewrite::rewrite_html,
};

/// What a run did. `fallbacks` counts HTML assets that were not UTF-8 and
/// are therefore also included in `copied`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub entry_page: bool,
    pub rewritten: usize,
    pub copied: usize,
    pub fallbacks: usize,
    pub collisions: usize,
}

pub enum Outcome {
    Rewritten,
    Opaque(Vec<u8>),
}

pub struct Site {
    entry_page: Option<PathBuf>,
    /// Output name to the source it was written from.
    assets: HashMap<OsString, PathBuf>,
    report: BuildReport,
}

impl Site {
    pub fn new() -> Self {
        Self {
            entry_page: None,
            assets: HashMap::new(),
            report: BuildReport::default(),
        }
    }

    fn claim_entry_page(&mut self, path: &Path) -> Result<(), BuildError> {
        if let Some(first) = &self.entry_page {
            return Err(BuildError::MultipleEntryPages {
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        self.entry_page = Some(path.to_path_buf());
        Ok(())
    }

    fn claim_asset(
        &mut self,
        context: &Context,
        name: &OsString,
        path: &Path,
    ) -> Result<(), BuildError> {
        if let Some(first) = self.assets.get(name) {
            let output = context.asset_output(name);
            match context.config().on_collision {
                CollisionPolicy::Error => {
                    return Err(BuildError::Collision {
                        first: first.clone(),
                        second: path.to_path_buf(),
                        output,
                    })
                }
                CollisionPolicy::Overwrite => {
                    warn!(
                        "{} overwrites {} at {}",
                        context.relative(path).display(),
                        context.relative(first).display(),
                        output.display()
                    );
                    self.report.collisions += 1;
                }
            }
        }
        self.assets.insert(name.clone(), path.to_path_buf());
        Ok(())
    }
}

/// Reads `input` and, if it is UTF-8, writes the rewritten text to
/// `output`. Non UTF-8 input is handed back untouched and nothing is
/// written.
pub fn rewrite_html_file(
    input: &Path,
    output: &Path,
    site_name: &str,
    static_dir: &str,
) -> Result<Outcome, BuildError> {
    match Payload::read(input).at(input)? {
        Payload::Html(text) => {
            fs::write(output, rewrite_html(&text, site_name, static_dir)).at(output)?;
            Ok(Outcome::Rewritten)
        }
        Payload::Opaque(bytes) => Ok(Outcome::Opaque(bytes)),
    }
}

pub fn copy_binary(input: &Path, output: &Path) -> Result<(), BuildError> {
    let bytes = fs::read(input).at(input)?;
    fs::write(output, bytes).at(output)
}

fn sorted_entries(dir: &Path) -> WalkDir {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
}

fn process_entry_page(context: &Context, site: &mut Site, path: &Path) -> Result<(), BuildError> {
    site.claim_entry_page(path)?;

    info!("rewriting entry page {}", context.relative(path).display());

    let config = context.config();
    let output = context.entry_output();
    match rewrite_html_file(path, &output, context.site_name(), &config.static_dir)? {
        Outcome::Rewritten => {
            site.report.entry_page = true;
            Ok(())
        }
        Outcome::Opaque(_) => Err(BuildError::EntryNotUtf8(path.to_path_buf())),
    }
}

fn process_asset(context: &Context, site: &mut Site, path: &Path) -> Result<(), BuildError> {
    let file_name = path.file_name().unwrap_or_default();
    let output_name = asset::strip_download_marker(file_name).to_os_string();
    let html = asset::is_html(file_name);

    site.claim_asset(context, &output_name, path)?;

    let output = context.asset_output(&output_name);

    if html {
        let static_dir = &context.config().static_dir;
        match rewrite_html_file(path, &output, context.site_name(), static_dir)? {
            Outcome::Rewritten => {
                info!("rewriting {}", context.relative(path).display());
                site.report.rewritten += 1;
            }
            Outcome::Opaque(bytes) => {
                debug!(
                    "{} is not UTF-8, copying it verbatim",
                    context.relative(path).display()
                );
                fs::write(&output, bytes).at(&output)?;
                site.report.copied += 1;
                site.report.fallbacks += 1;
            }
        }
    } else {
        info!("copying {}", context.relative(path).display());
        copy_binary(path, &output)?;
        site.report.copied += 1;
    }

    Ok(())
}

fn process_page_dir(context: &Context, site: &mut Site, dir: &Path) -> Result<(), BuildError> {
    for entry in sorted_entries(dir) {
        let entry = entry?;

        if !entry.file_type().is_file() {
            return Err(BuildError::UnexpectedEntry(entry.into_path()));
        }

        process_asset(context, site, entry.path())?;
    }

    Ok(())
}

/// Rewrites the download tree into `<output>/<site>/index.html` and the
/// flat `<output>/<static>/<site>/` asset directory.
pub fn build_site(context: &Context) -> Result<BuildReport, BuildError> {
    context.create_output_dirs()?;

    let mut site = Site::new();

    for entry in sorted_entries(context.input_root()) {
        let entry = entry?;
        let file_type = entry.file_type();

        let is_entry_page = file_type.is_file() && asset::is_html(entry.file_name());

        if is_entry_page {
            process_entry_page(context, &mut site, entry.path())?;
        } else if file_type.is_dir() {
            process_page_dir(context, &mut site, entry.path())?;
        } else {
            return Err(BuildError::UnexpectedEntry(entry.into_path()));
        }
    }

    if site.entry_page.is_none() {
        warn!(
            "no entry page found in {}, {} was not written",
            context.input_root().display(),
            context.entry_output().display()
        );
    }

    let report = site.report;
    info!(
        rewritten = report.rewritten,
        copied = report.copied,
        fallbacks = report.fallbacks,
        collisions = report.collisions,
        "built site {}",
        context.site_name()
    );

    Ok(report)
}
