use super::storage;
use super::types::{
    CleanupReport, ImportFailure, ImportOptions, ImportReport, NewTemplate, RemoveRootReport,
    Template, TemplateIndex, TemplateUpdate,
};
use super::TemplateError;
use crate::config::CoreConfig;
use crate::paths::{contains_traversal, is_within, normalize_path};
use crate::scanner;
use crate::workspace::{WorkspaceManager, PROJECT_ROOT_ID};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Owns the template metadata index and keeps it consistent with both the
/// filesystem and the workspace manager's evolving set of approved roots.
///
/// Every path decision is delegated to the [`WorkspaceManager`]; the store
/// never decides paths itself.
pub struct TemplateManager {
    workspaces: Arc<WorkspaceManager>,
    index_path: PathBuf,
    index: RwLock<TemplateIndex>,
}

impl TemplateManager {
    /// Load the persisted index. A corrupted document is an operational
    /// fault and propagates; a missing one starts empty.
    pub async fn init(
        workspaces: Arc<WorkspaceManager>,
        config: &CoreConfig,
    ) -> Result<Self, TemplateError> {
        let index = storage::read_index(&config.index_path).await?;
        info!("Template index loaded: {} templates", index.templates.len());

        Ok(Self {
            workspaces,
            index_path: config.index_path.clone(),
            index: RwLock::new(index),
        })
    }

    /// Register a single template file.
    ///
    /// Auto-registers a workspace for the containing directory when the
    /// path is not already covered: importing a file implicitly grants
    /// standing access to its directory. Rejects duplicates by exact
    /// normalized path.
    pub async fn add_template(
        &self,
        raw_path: &str,
        meta: NewTemplate,
    ) -> Result<Template, TemplateError> {
        let record = self.build_record(raw_path, meta).await?;

        let mut index = self.index.write().await;
        if index
            .templates
            .iter()
            .any(|t| t.file_path == record.file_path)
        {
            return Err(TemplateError::DuplicateTemplate(record.file_path.clone()));
        }

        info!("Added template '{}' ({})", record.name, record.file_path);
        index.templates.push(record.clone());
        index.last_updated = Utc::now();
        self.persist(&index).await?;

        Ok(record)
    }

    /// Update a template's classification. `id` and `file_path` are
    /// immutable.
    pub async fn update_template(
        &self,
        id: &str,
        update: TemplateUpdate,
    ) -> Result<Template, TemplateError> {
        let mut index = self.index.write().await;
        let template = index
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TemplateError::TemplateNotFound(id.to_string()))?;

        if let Some(name) = update.name {
            template.name = name;
        }
        if let Some(category) = update.category {
            template.category = category;
        }
        if let Some(tags) = update.tags {
            template.tags = tags;
        }
        if let Some(description) = update.description {
            template.description = description;
        }

        let updated = template.clone();
        index.last_updated = Utc::now();
        self.persist(&index).await?;

        Ok(updated)
    }

    /// Remove a template record. Metadata only; the backing file is never
    /// deleted.
    pub async fn remove_template(&self, id: &str) -> Result<Template, TemplateError> {
        let mut index = self.index.write().await;
        let pos = index
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TemplateError::TemplateNotFound(id.to_string()))?;

        let removed = index.templates.remove(pos);
        index.last_updated = Utc::now();
        self.persist(&index).await?;

        info!("Removed template '{}' ({})", removed.name, removed.file_path);
        Ok(removed)
    }

    pub async fn get_template(&self, id: &str) -> Result<Template, TemplateError> {
        let index = self.index.read().await;
        index
            .templates
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| TemplateError::TemplateNotFound(id.to_string()))
    }

    /// All records in insertion order. Records whose backing file has
    /// since vanished are still listed; reconciliation is
    /// [`cleanup_missing_files`](Self::cleanup_missing_files)'s job.
    pub async fn list_templates(&self) -> Vec<Template> {
        let index = self.index.read().await;
        index.templates.clone()
    }

    /// Read the backing file's content, re-checking existence immediately
    /// before the read. Counts as an access on the covering workspace.
    pub async fn get_template_content(&self, id: &str) -> Result<String, TemplateError> {
        let file_path = {
            let index = self.index.read().await;
            index
                .templates
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.file_path.clone())
                .ok_or_else(|| TemplateError::TemplateNotFound(id.to_string()))?
        };

        let decision = self.workspaces.can_access(&file_path, false).await;
        if !decision.allowed {
            return Err(TemplateError::AccessDenied(
                decision.reason.unwrap_or_else(|| "access denied".to_string()),
            ));
        }

        let metadata = match fs::metadata(&file_path).await {
            Ok(meta) if meta.is_file() => meta,
            _ => return Err(TemplateError::FileNotFound(file_path)),
        };

        let limit = self.workspaces.policy().max_file_size;
        if metadata.len() > limit {
            return Err(TemplateError::FileTooLarge {
                path: file_path,
                limit,
            });
        }

        let content = fs::read_to_string(&file_path).await?;
        self.workspaces.track_access(&file_path).await;
        Ok(content)
    }

    /// Import every template file under a folder, preserving each file's
    /// path relative to the imported folder for later grouping.
    ///
    /// Per-file failures are collected and skipped; a bulk import over an
    /// arbitrary directory tree is expected to partially succeed.
    pub async fn import_folder(
        &self,
        raw_folder: &str,
        options: ImportOptions,
    ) -> Result<ImportReport, TemplateError> {
        let decision = self.workspaces.validate_directory(raw_folder).await;
        if !decision.allowed {
            return Err(TemplateError::AccessDenied(
                decision.reason.unwrap_or_else(|| "invalid folder".to_string()),
            ));
        }

        let root = normalize_path(raw_folder);
        let coverage = self.workspaces.can_access(&root.to_string_lossy(), false).await;
        if !coverage.allowed {
            self.workspaces
                .request_access(&root.to_string_lossy(), None, false)
                .await?;
        }

        let extensions = self.workspaces.policy().allowed_extensions;
        let files = scanner::scan_files(&root, options.recursive, extensions);

        let mut report = ImportReport::default();
        for file in files {
            let relative = file.strip_prefix(&root).unwrap_or(&file);
            let folder_path = relative
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();

            let meta = NewTemplate {
                name: None,
                category: options.category.clone(),
                tags: options.tags.clone(),
                description: None,
                relative_path: Some(relative.to_string_lossy().into_owned()),
                folder_path: Some(folder_path),
            };

            match self.add_template(&file.to_string_lossy(), meta).await {
                Ok(template) => report.imported.push(template),
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    report.failed.push(ImportFailure {
                        path: file.to_string_lossy().into_owned(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Imported {} templates from {} ({} skipped)",
            report.imported.len(),
            root.display(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Refresh a record's cached stat data from the actual file.
    pub async fn sync_template(&self, id: &str) -> Result<Template, TemplateError> {
        let mut index = self.index.write().await;
        let pos = index
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TemplateError::TemplateNotFound(id.to_string()))?;

        let file_path = index.templates[pos].file_path.clone();
        let metadata = match fs::metadata(&file_path).await {
            Ok(meta) if meta.is_file() => meta,
            _ => return Err(TemplateError::FileNotFound(file_path)),
        };

        let template = &mut index.templates[pos];
        template.file_size = metadata.len();
        template.last_modified = file_mtime(&metadata);

        let updated = template.clone();
        index.last_updated = Utc::now();
        self.persist(&index).await?;

        Ok(updated)
    }

    /// Drop every record whose backing file no longer exists. This is the
    /// mechanism that reconciles the index after out-of-band filesystem
    /// changes. A file that exists but cannot be statted is kept and
    /// logged.
    pub async fn cleanup_missing_files(&self) -> Result<CleanupReport, TemplateError> {
        let mut index = self.index.write().await;
        let all = std::mem::take(&mut index.templates);

        let mut kept = Vec::with_capacity(all.len());
        let mut removed = Vec::new();
        for template in all {
            match fs::metadata(&template.file_path).await {
                Ok(_) => kept.push(template),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    info!(
                        "Dropping template '{}': {} no longer exists",
                        template.name, template.file_path
                    );
                    removed.push(template);
                }
                Err(e) => {
                    warn!("Could not stat {}: {}", template.file_path, e);
                    kept.push(template);
                }
            }
        }

        index.templates = kept;
        if !removed.is_empty() {
            index.last_updated = Utc::now();
            self.persist(&index).await?;
        }

        Ok(CleanupReport { removed })
    }

    /// Remove an allowed root and every template record nested under it in
    /// one persisted batch, so no record is left pointing outside the
    /// approved set.
    pub async fn remove_allowed_root(
        &self,
        raw_path: &str,
    ) -> Result<RemoveRootReport, TemplateError> {
        let root = normalize_path(raw_path);

        let workspace_removed = match self.workspaces.workspace_at(&root).await {
            Some(ws) if ws.id == PROJECT_ROOT_ID => {
                return Err(TemplateError::AccessDenied(
                    "the project root workspace cannot be removed".to_string(),
                ));
            }
            Some(ws) => self.workspaces.remove_workspace(&ws.id).await,
            None => false,
        };

        let mut index = self.index.write().await;
        let before = index.templates.len();
        index
            .templates
            .retain(|t| !is_within(Path::new(&t.file_path), &root));
        let templates_removed = before - index.templates.len();

        if templates_removed > 0 {
            index.last_updated = Utc::now();
            self.persist(&index).await?;
        }

        info!(
            "Removed root {}: workspace_removed={}, {} templates dropped",
            root.display(),
            workspace_removed,
            templates_removed
        );
        Ok(RemoveRootReport {
            workspace_removed,
            templates_removed,
        })
    }

    /// Normalize, validate, and stat a candidate file, producing the record
    /// to insert.
    async fn build_record(
        &self,
        raw_path: &str,
        meta: NewTemplate,
    ) -> Result<Template, TemplateError> {
        if contains_traversal(raw_path) {
            return Err(TemplateError::AccessDenied(
                "path contains a directory traversal sequence".to_string(),
            ));
        }

        let normalized = normalize_path(raw_path);
        let normalized_str = normalized.to_string_lossy().into_owned();

        let policy = self.workspaces.policy();
        if !policy.allows_extension(&normalized) {
            return Err(TemplateError::UnsupportedExtension(normalized_str));
        }

        self.ensure_access(&normalized).await?;

        let metadata = match fs::metadata(&normalized).await {
            Ok(m) if m.is_file() => m,
            _ => return Err(TemplateError::FileNotFound(normalized_str)),
        };
        if metadata.len() > policy.max_file_size {
            return Err(TemplateError::FileTooLarge {
                path: normalized_str,
                limit: policy.max_file_size,
            });
        }

        let file_name = normalized
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| normalized_str.clone());
        let name = meta.name.unwrap_or_else(|| {
            normalized
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.clone())
        });

        Ok(Template {
            id: Uuid::new_v4().to_string(),
            file_path: normalized_str,
            name,
            category: meta.category.unwrap_or_else(|| "general".to_string()),
            tags: meta.tags,
            description: meta.description.unwrap_or_default(),
            relative_path: meta.relative_path.unwrap_or(file_name),
            folder_path: meta.folder_path.unwrap_or_default(),
            file_size: metadata.len(),
            last_modified: file_mtime(&metadata),
            created_at: Utc::now(),
        })
    }

    /// Check coverage for a normalized file path, auto-registering its
    /// containing directory on a miss.
    async fn ensure_access(&self, normalized: &Path) -> Result<(), TemplateError> {
        let normalized_str = normalized.to_string_lossy();
        let decision = self.workspaces.can_access(&normalized_str, false).await;
        if decision.allowed {
            return Ok(());
        }

        let parent = normalized.parent().unwrap_or(normalized);
        self.workspaces
            .request_access(&parent.to_string_lossy(), None, false)
            .await?;

        let decision = self.workspaces.can_access(&normalized_str, false).await;
        if decision.allowed {
            Ok(())
        } else {
            Err(TemplateError::AccessDenied(
                decision.reason.unwrap_or_else(|| "access denied".to_string()),
            ))
        }
    }

    async fn persist(&self, index: &TemplateIndex) -> Result<(), TemplateError> {
        storage::write_index(&self.index_path, index).await
    }
}

fn file_mtime(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}
