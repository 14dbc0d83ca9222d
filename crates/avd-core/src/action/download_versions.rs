//! The Download Versions action: resolves media components for the selected
//! versions, derives destination filenames, and serially downloads each file
//! while reporting progress to the invoking user.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::action::{ActionContext, ActionHandler, ActionResult};
use crate::config::AvdConfig;
use crate::filename;
use crate::model::{AssetVersion, DownloadTask, SelectedEntity, UserId, VersionRef};
use crate::session::{Notifier, Session, VersionQuery};
use crate::sources::{self, ComponentSource, SessionSource};
use crate::transfer;

pub struct DownloadVersionsAction {
    download_root: PathBuf,
    file_types: Vec<String>,
    locations: Vec<String>,
}

impl DownloadVersionsAction {
    pub fn new(config: &AvdConfig) -> Result<Self> {
        Ok(Self {
            download_root: config.download_root()?,
            file_types: config.file_types(),
            locations: config.locations(),
        })
    }
}

impl ActionHandler for DownloadVersionsAction {
    fn label(&self) -> &str {
        "Download Versions"
    }

    fn identifier(&self) -> &str {
        "avd.download.versions"
    }

    fn description(&self) -> &str {
        "Download selected versions"
    }

    fn discover(&self, selection: &[SelectedEntity]) -> bool {
        // Any non-empty selection qualifies; the per-entity type sent by the
        // host is not inspected. Tighten here if version-only selections are
        // ever required.
        !selection.is_empty()
    }

    fn launch(
        &self,
        session: &Session,
        selection: &[SelectedEntity],
        context: &ActionContext,
    ) -> Result<ActionResult> {
        let user = context.user_id.as_ref();
        session.notify_user(user, "Building list of media to download...");
        session.notify_user(user, "Please be patient - this can take awhile");

        let refs: Vec<VersionRef> = selection
            .iter()
            .map(|entity| VersionRef::new(entity.entity_id.clone()))
            .collect();
        let versions = session.versions_by_ids(&refs)?;

        let locations: Vec<SessionSource<'_>> = self
            .locations
            .iter()
            .map(|name| SessionSource::new(session, name.clone()))
            .collect();
        let sources: Vec<&dyn ComponentSource> =
            locations.iter().map(|s| s as &dyn ComponentSource).collect();

        let tasks =
            build_download_tasks(&versions, &self.file_types, &sources, &self.download_root);
        tracing::info!(
            tasks = tasks.len(),
            versions = refs.len(),
            "download list built"
        );

        run_downloads(&tasks, session, user)?;

        Ok(ActionResult::message(summary_message(tasks.len(), refs.len())))
    }
}

/// Builds the ordered download list: allow-listed components only, filenames
/// derived from version and component names, source URL from the first
/// location that yields one. Components without a resolvable URL are skipped
/// silently.
pub fn build_download_tasks(
    versions: &[AssetVersion],
    file_types: &[String],
    sources: &[&dyn ComponentSource],
    download_root: &Path,
) -> Vec<DownloadTask> {
    let mut tasks = Vec::new();
    for version in versions {
        let version_name = version.version_name();
        for component in &version.components {
            if !file_types.iter().any(|t| t == &component.file_type) {
                tracing::debug!(
                    component = %component.name,
                    file_type = %component.file_type,
                    "skipping non-media component"
                );
                continue;
            }
            let Some(source_url) = sources::first_available_url(sources, component) else {
                tracing::debug!(component = %component.name, "no location yields a URL; skipping");
                continue;
            };
            let file_name =
                filename::derive_file_name(&version_name, &component.name, &component.file_type);
            tasks.push(DownloadTask {
                destination: download_root.join(&file_name),
                file_name,
                source_url,
            });
        }
    }
    tasks
}

/// Runs the downloads strictly in list order, announcing each one to the
/// user first. A transfer failure propagates immediately and aborts the
/// remaining tasks; files already written stay on disk.
pub fn run_downloads(
    tasks: &[DownloadTask],
    notifier: &dyn Notifier,
    user: Option<&UserId>,
) -> Result<()> {
    let total = tasks.len();
    for (index, task) in tasks.iter().enumerate() {
        notifier.notify_user(
            user,
            &format!("Downloading {} of {}: {}...", index + 1, total, task.file_name),
        );
        transfer::fetch_to_disk(&task.source_url, &task.destination)
            .with_context(|| format!("downloading {}", task.file_name))?;
    }
    Ok(())
}

fn summary_message(files: usize, versions: usize) -> String {
    format!("Download Complete: {files} media files from {versions} versions")
}
