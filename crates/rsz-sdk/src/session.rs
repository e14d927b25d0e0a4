use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rsz_handlers::{ContentResource, HandlerRegistry, NewEntity, ResourceHandler, ResourceMap};
use rsz_ledger::{normalize_native_path, Bundle, EntityRecord};
use rsz_types::{BaseFile, Environment};
use serde_json::{Map, Value as Json};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::error::{SdkError, SdkResult};
use crate::report::BundleReport;

/// A native file opened for editing.
#[derive(Debug)]
struct LoadedFile {
    resource_type: String,
    /// In-memory file the live resources are written back into.
    base: BaseFile,
    /// Resources as read at open time. Never edited.
    pristine: ResourceMap,
    /// Working copies.
    live: ResourceMap,
    /// Labels of entities created during the session.
    created: BTreeMap<i64, String>,
}

/// An editing session over a set of native files.
///
/// Open files are cached behind a reader/writer lock: diffing and lookups
/// take the read side, edits and bundle application take the write side.
pub struct Session {
    env: Environment,
    config: EditorConfig,
    handlers: BTreeMap<String, Box<dyn ResourceHandler>>,
    files: RwLock<HashMap<String, LoadedFile>>,
}

impl Session {
    /// Build one handler per configured resource type. Fails on the first
    /// unknown discriminator or invalid handler configuration.
    pub fn new(env: Environment, config: EditorConfig) -> SdkResult<Self> {
        let registry = HandlerRegistry::with_builtin();
        let mut handlers = BTreeMap::new();
        for (name, handler_config) in &config.resource_types {
            let handler = registry.build(handler_config, &env)?;
            handlers.insert(name.clone(), handler);
        }
        for (path, ty) in &config.files {
            if !handlers.contains_key(ty) {
                return Err(SdkError::Config(format!(
                    "file '{path}' maps to unknown resource type '{ty}'"
                )));
            }
        }
        info!(resource_types = handlers.len(), files = config.files.len(), "session started");

        Ok(Self {
            env,
            config,
            handlers,
            files: RwLock::new(HashMap::new()),
        })
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn handler(&self, resource_type: &str) -> SdkResult<&dyn ResourceHandler> {
        self.handlers
            .get(resource_type)
            .map(|h| h.as_ref())
            .ok_or_else(|| SdkError::UnknownResourceType(resource_type.to_string()))
    }

    fn read_files(&self) -> SdkResult<RwLockReadGuard<'_, HashMap<String, LoadedFile>>> {
        self.files.read().map_err(|_| SdkError::Poisoned)
    }

    fn write_files(&self) -> SdkResult<RwLockWriteGuard<'_, HashMap<String, LoadedFile>>> {
        self.files.write().map_err(|_| SdkError::Poisoned)
    }

    // ---- Files ----

    /// Open `base` as `native_path`. The resource type falls back to the
    /// configured file mapping. Reopening a path discards its edits.
    /// Returns the number of resources read.
    pub fn open_file(
        &self,
        native_path: &str,
        resource_type: Option<&str>,
        base: BaseFile,
    ) -> SdkResult<usize> {
        let path = normalize_native_path(native_path);
        let resource_type = match resource_type {
            Some(ty) => ty.to_string(),
            None => self
                .config
                .resource_type_for(&path)
                .ok_or_else(|| SdkError::UnmappedFile(path.clone()))?
                .to_string(),
        };
        let handler = self.handler(&resource_type)?;
        let pristine = handler.read_resources(&path, &base, &self.env)?;
        let count = pristine.len();

        let loaded = LoadedFile {
            resource_type,
            live: pristine.clone(),
            pristine,
            base,
            created: BTreeMap::new(),
        };
        if self.write_files()?.insert(path.clone(), loaded).is_some() {
            debug!(path = %path, "file reopened, edits discarded");
        }
        debug!(path = %path, resources = count, "file opened");
        Ok(count)
    }

    pub fn is_open(&self, native_path: &str) -> bool {
        self.read_files()
            .map(|files| files.contains_key(&normalize_native_path(native_path)))
            .unwrap_or(false)
    }

    /// Normalized paths of every open file, sorted.
    pub fn open_files(&self) -> SdkResult<Vec<String>> {
        let mut paths: Vec<String> = self.read_files()?.keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }

    /// Replace the working copies of `native_path` with the resources of an
    /// edited version of the same file.
    pub fn load_edits(&self, native_path: &str, edited: &BaseFile) -> SdkResult<usize> {
        let path = normalize_native_path(native_path);
        let mut files = self.write_files()?;
        let file = files
            .get_mut(&path)
            .ok_or_else(|| SdkError::FileNotOpen(path.clone()))?;
        let handler = self.handler(&file.resource_type)?;
        file.live = handler.read_resources(&path, edited, &self.env)?;
        Ok(file.live.len())
    }

    /// Clone of one working copy.
    pub fn resource(&self, native_path: &str, id: i64) -> SdkResult<Option<ContentResource>> {
        let path = normalize_native_path(native_path);
        let files = self.read_files()?;
        let file = files.get(&path).ok_or(SdkError::FileNotOpen(path))?;
        Ok(file.live.get(&id).cloned())
    }

    /// Exclusive access to the working copies of `native_path`.
    pub fn with_live_mut<R>(
        &self,
        native_path: &str,
        f: impl FnOnce(&mut ResourceMap) -> R,
    ) -> SdkResult<R> {
        let path = normalize_native_path(native_path);
        let mut files = self.write_files()?;
        let file = files.get_mut(&path).ok_or(SdkError::FileNotOpen(path))?;
        Ok(f(&mut file.live))
    }

    /// Create a new entity resource in `native_path` through its handler.
    /// Returns the ID the handler assigned.
    pub fn create_entity(
        &self,
        native_path: &str,
        id: i64,
        label: &str,
        initial_diff: Option<&Json>,
    ) -> SdkResult<i64> {
        let path = normalize_native_path(native_path);
        let mut files = self.write_files()?;
        let file = files
            .get_mut(&path)
            .ok_or_else(|| SdkError::FileNotOpen(path.clone()))?;
        let handler = self.handler(&file.resource_type)?;
        let entity = NewEntity {
            id,
            label,
            initial_diff,
        };
        let (id, resource) = handler.create_resource(&path, entity, &self.env)?;
        file.live.insert(id, resource);
        file.created.insert(id, label.to_string());
        debug!(path = %path, id, "entity created");
        Ok(id)
    }

    /// Write the working copies back into the in-memory file and return it.
    pub fn write_back(&self, native_path: &str) -> SdkResult<BaseFile> {
        let path = normalize_native_path(native_path);
        let mut files = self.write_files()?;
        let file = files.get_mut(&path).ok_or(SdkError::FileNotOpen(path))?;
        let handler = self.handler(&file.resource_type)?;
        handler.modify_resources(&mut file.base, &file.live, &self.env)?;
        Ok(file.base.clone())
    }

    // ---- Diffs ----

    /// Per-resource diff of `native_path`: `{ "<id>": diff }`, or `None`
    /// when nothing changed. Resources with no pristine counterpart are
    /// emitted whole.
    pub fn file_diff(&self, native_path: &str) -> SdkResult<Option<Json>> {
        let path = normalize_native_path(native_path);
        let files = self.read_files()?;
        let file = files.get(&path).ok_or(SdkError::FileNotOpen(path))?;
        self.diff_loaded(file)
    }

    fn diff_loaded(&self, file: &LoadedFile) -> SdkResult<Option<Json>> {
        let mut out = Map::new();
        for (id, live) in &file.live {
            let diff = match file.pristine.get(id) {
                Some(pristine) => live.diff_from(pristine, &self.env)?,
                None => Some(live.to_tree(&self.env)?),
            };
            if let Some(diff) = diff {
                out.insert(id.to_string(), diff);
            }
        }
        Ok((!out.is_empty()).then_some(Json::Object(out)))
    }

    /// Record a listing entry and diff in `bundle` for every changed open
    /// file, and an entity record for every entity created this session.
    /// Returns the number of files collected.
    pub fn collect_into(&self, bundle: &mut Bundle) -> SdkResult<usize> {
        let files = self.read_files()?;
        let mut paths: Vec<&String> = files.keys().collect();
        paths.sort();

        let mut collected = 0;
        for path in paths {
            let file = &files[path];
            let Some(diff) = self.diff_loaded(file)? else {
                continue;
            };
            let local_key = bundle
                .try_find_resource_by_native_path(path)
                .map(str::to_string)
                .unwrap_or_else(|| path.clone());
            if !bundle.add_resource(&local_key, path, false) {
                warn!(path = %path, "bundle listing rejected, file not collected");
                continue;
            }
            bundle.set_resource_diff(&local_key, Some(diff))?;

            for (id, label) in &file.created {
                if let Some(resource) = file.live.get(id) {
                    let record = EntityRecord::new(&file.resource_type, *id, label)
                        .with_data(resource.to_tree(&self.env)?);
                    bundle.record_entity(record);
                }
            }
            collected += 1;
        }
        info!(files = collected, bundle = %bundle.name, "diffs collected");
        Ok(collected)
    }

    /// Apply every listed diff of `bundle` onto the open files and write
    /// the results back.
    ///
    /// Each resource ID is one unit: failures are reported and do not stop
    /// sibling units. IDs missing from a file are created through the
    /// file's handler, labelled from the bundle's entity records.
    pub fn apply_bundle(&self, bundle: &Bundle) -> SdkResult<BundleReport> {
        let mut report = BundleReport::default();
        let mut files = self.write_files()?;

        for (key, listing) in bundle.resource_listing() {
            let target = normalize_native_path(&listing.target);
            let Some(file) = files.get_mut(&target) else {
                debug!(key, path = %target, "listed file not open");
                report.skipped.push(target);
                continue;
            };
            if listing.replace {
                report.replaced.push(target);
                continue;
            }
            let Some(diff) = &listing.diff else {
                report.skipped.push(target);
                continue;
            };
            let Some(units) = diff.as_object() else {
                report.fail(target, SdkError::MalformedBundle(format!("diff of '{key}' is not an object")));
                continue;
            };

            let handler = self.handler(&file.resource_type)?;
            for (id_key, unit) in units {
                let result = self.apply_unit(handler, &target, file, bundle, id_key, unit);
                report.record(format!("{target}#{id_key}"), result);
            }
            match handler.modify_resources(&mut file.base, &file.live, &self.env) {
                Ok(()) => report.patched.push(target),
                Err(e) => report.fail(target, e.into()),
            }
        }

        info!(
            patched = report.patched.len(),
            replaced = report.replaced.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "bundle applied"
        );
        Ok(report)
    }

    fn apply_unit(
        &self,
        handler: &dyn ResourceHandler,
        target: &str,
        file: &mut LoadedFile,
        bundle: &Bundle,
        id_key: &str,
        unit: &Json,
    ) -> SdkResult<()> {
        let id: i64 = id_key
            .parse()
            .map_err(|_| SdkError::InvalidResourceKey(id_key.to_string()))?;

        if let Some(resource) = file.live.get_mut(&id) {
            resource.apply_diff(unit, &self.env)?;
            return Ok(());
        }

        let label = bundle
            .find_entity(&file.resource_type, id)
            .map(|e| e.label.as_str())
            .unwrap_or_default();
        let entity = NewEntity {
            id,
            label,
            initial_diff: Some(unit),
        };
        let (id, resource) = handler.create_resource(target, entity, &self.env)?;
        debug!(path = target, id, "resource created from bundle");
        file.live.insert(id, resource);
        file.created.insert(id, label.to_string());
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("resource_types", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
