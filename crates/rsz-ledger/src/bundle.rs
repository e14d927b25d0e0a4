//! The bundle: resource listing, entity records and the native-path index.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, info, warn};

use crate::entity::{EntityRecord, RecordOutcome};
use crate::error::{LedgerError, LedgerResult};
use crate::listing::{normalize_native_path, ResourceListing};

/// A mod bundle's record of the native files it touches and the entities it
/// defines.
///
/// The reverse index from native path to local key is a cache: it is never
/// persisted, it is dropped by every `&mut self` mutation of the listing,
/// and it is rebuilt on the next lookup.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    resource_listing: BTreeMap<String, ResourceListing>,
    #[serde(default)]
    entities: Vec<EntityRecord>,
    #[serde(skip)]
    native_index: OnceLock<HashMap<String, String>>,
}

impl PartialEq for Bundle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.resource_listing == other.resource_listing
            && self.entities == other.entities
    }
}

impl Bundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // ---------------------------------------------------------------
    // Resource listing
    // ---------------------------------------------------------------

    /// Claim `native_path` for `local_key`.
    ///
    /// Returns `false`, logs and changes nothing when another local key
    /// already claims the same normalized native path.
    pub fn add_resource(&mut self, local_key: &str, native_path: &str, replace: bool) -> bool {
        let target = normalize_native_path(native_path);
        if let Some(owner) = self.native_index().get(&target) {
            if owner != local_key {
                warn!(
                    local_key,
                    native_path = %target,
                    owner = %owner,
                    "native path already claimed by another resource"
                );
                return false;
            }
        }

        match self.resource_listing.get_mut(local_key) {
            Some(listing) => {
                listing.target = target;
                listing.replace = replace;
            }
            None => {
                self.resource_listing
                    .insert(local_key.to_string(), ResourceListing::new(&target, replace));
            }
        }
        self.native_index.take();
        debug!(local_key, "resource listed");
        true
    }

    /// Store the diff for `local_key` and stamp `diff_time`.
    pub fn set_resource_diff(&mut self, local_key: &str, diff: Option<Json>) -> LedgerResult<()> {
        let listing = self
            .resource_listing
            .get_mut(local_key)
            .ok_or_else(|| LedgerError::UnknownResource(local_key.to_string()))?;
        listing.diff = diff;
        listing.diff_time = Some(Utc::now());
        Ok(())
    }

    pub fn remove_resource(&mut self, local_key: &str) -> Option<ResourceListing> {
        let removed = self.resource_listing.remove(local_key);
        if removed.is_some() {
            self.native_index.take();
        }
        removed
    }

    /// Listing entry by local key.
    pub fn resource(&self, local_key: &str) -> Option<&ResourceListing> {
        self.resource_listing.get(local_key)
    }

    /// Every listing entry, ordered by local key.
    pub fn resource_listing(&self) -> impl Iterator<Item = (&str, &ResourceListing)> {
        self.resource_listing.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn resource_count(&self) -> usize {
        self.resource_listing.len()
    }

    /// Local key claiming `native_path`, if any.
    pub fn try_find_resource_by_native_path(&self, native_path: &str) -> Option<&str> {
        self.native_index()
            .get(&normalize_native_path(native_path))
            .map(String::as_str)
    }

    /// Local key and listing entry claiming `native_path`, if any.
    pub fn try_find_resource_listing(&self, native_path: &str) -> Option<(&str, &ResourceListing)> {
        let key = self.try_find_resource_by_native_path(native_path)?;
        self.resource_listing
            .get_key_value(key)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Native path to local key. When two keys share a target the first in
    /// key order wins.
    fn native_index(&self) -> &HashMap<String, String> {
        self.native_index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.resource_listing.len());
            for (key, listing) in &self.resource_listing {
                index
                    .entry(normalize_native_path(&listing.target))
                    .or_insert_with(|| key.clone());
            }
            debug!(entries = index.len(), "native path index rebuilt");
            index
        })
    }

    // ---------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------

    pub fn record_entity(&mut self, entity: EntityRecord) -> RecordOutcome {
        match self.entities.iter_mut().find(|e| e.same_key(&entity)) {
            Some(existing) if *existing == entity => RecordOutcome::AlreadyRecorded,
            Some(existing) => {
                *existing = entity;
                RecordOutcome::Updated
            }
            None => {
                self.entities.push(entity);
                RecordOutcome::Added
            }
        }
    }

    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    pub fn find_entity(&self, entity_type: &str, id: i64) -> Option<&EntityRecord> {
        self.entities
            .iter()
            .find(|e| e.id == id && e.entity_type == entity_type)
    }

    pub fn entities_of_type<'a>(&'a self, entity_type: &'a str) -> impl Iterator<Item = &'a EntityRecord> {
        self.entities.iter().filter(move |e| e.entity_type == entity_type)
    }

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    pub fn load(path: &Path) -> LedgerResult<Self> {
        let text = fs::read_to_string(path)?;
        let bundle: Bundle = serde_json::from_str(&text)?;
        info!(
            path = %path.display(),
            resources = bundle.resource_listing.len(),
            entities = bundle.entities.len(),
            "bundle loaded"
        );
        Ok(bundle)
    }

    pub fn save(&self, path: &Path) -> LedgerResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        info!(path = %path.display(), "bundle saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ---- Test 1 ----
    #[test]
    fn second_claim_on_same_native_path_is_rejected() {
        let mut bundle = Bundle::new("mod");
        assert!(bundle.add_resource("items", "natives/stm/Item.user.2", false));
        assert!(!bundle.add_resource("other", "Natives\\STM\\item.user.2", true));

        assert_eq!(bundle.resource_count(), 1);
        assert_eq!(
            bundle.try_find_resource_by_native_path("NATIVES/stm/item.user.2"),
            Some("items")
        );
    }

    // ---- Test 2 ----
    #[test]
    fn same_key_may_update_its_listing() {
        let mut bundle = Bundle::new("mod");
        assert!(bundle.add_resource("items", "a/b.user", false));
        assert!(bundle.add_resource("items", "a/b.user", true));
        assert!(bundle.resource("items").unwrap().replace);

        assert!(bundle.add_resource("items", "a/c.user", true));
        assert_eq!(bundle.try_find_resource_by_native_path("a/b.user"), None);
        assert_eq!(bundle.try_find_resource_by_native_path("a/c.user"), Some("items"));
    }

    // ---- Test 3 ----
    #[test]
    fn index_follows_removal() {
        let mut bundle = Bundle::new("mod");
        bundle.add_resource("items", "a/b.user", false);
        assert!(bundle.try_find_resource_listing("a/b.user").is_some());
        bundle.remove_resource("items");
        assert!(bundle.try_find_resource_listing("a/b.user").is_none());
        assert!(bundle.add_resource("again", "a/b.user", false));
    }

    // ---- Test 4 ----
    #[test]
    fn diff_is_stamped() {
        let mut bundle = Bundle::new("mod");
        bundle.add_resource("items", "a/b.user", false);
        bundle.set_resource_diff("items", Some(json!({"10": {"Label": "x"}}))).unwrap();
        let listing = bundle.resource("items").unwrap();
        assert!(listing.has_diff());
        assert!(listing.diff_time.is_some());

        assert!(matches!(
            bundle.set_resource_diff("missing", None),
            Err(LedgerError::UnknownResource(_))
        ));
    }

    // ---- Test 5 ----
    #[test]
    fn entity_record_outcomes() {
        let mut bundle = Bundle::new("mod");
        let sword = EntityRecord::new("item", 11, "Sword").with_data(json!({"Power": 10}));

        assert_eq!(bundle.record_entity(sword.clone()), RecordOutcome::Added);
        assert_eq!(bundle.record_entity(sword.clone()), RecordOutcome::AlreadyRecorded);

        let renamed = EntityRecord {
            label: "Great Sword".into(),
            ..sword.clone()
        };
        assert_eq!(bundle.record_entity(renamed), RecordOutcome::Updated);
        assert_eq!(bundle.find_entity("item", 11).unwrap().label, "Great Sword");

        assert_eq!(bundle.record_entity(EntityRecord::new("weapon", 11, "Other")), RecordOutcome::Added);
        assert_eq!(bundle.entities().len(), 2);
        assert_eq!(bundle.entities_of_type("item").count(), 1);
    }

    // ---- Test 6 ----
    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");

        let mut bundle = Bundle::new("mod");
        bundle.add_resource("items", "natives/item.user", false);
        bundle.add_resource("ui", "natives/ui.msg", true);
        bundle.set_resource_diff("items", Some(json!({"10": {"Label": "x"}}))).unwrap();
        bundle.record_entity(EntityRecord::new("item", 10, "Potion"));
        bundle.save(&path).unwrap();

        let saved: Json = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(saved.get("native_index").is_none());
        assert_eq!(saved["entities"][0]["type"], "item");

        let loaded = Bundle::load(&path).unwrap();
        assert_eq!(loaded, bundle);
        assert_eq!(loaded.try_find_resource_by_native_path("natives/ui.msg"), Some("ui"));
    }

    // ---- Test 7 ----
    #[test]
    fn ambiguous_targets_resolve_to_first_key() {
        let bundle: Bundle = serde_json::from_value(json!({
            "resource_listing": {
                "b": {"target": "x/y.user", "replace": false},
                "a": {"target": "X\\Y.user", "replace": true}
            },
            "entities": []
        }))
        .unwrap();
        assert_eq!(bundle.try_find_resource_by_native_path("x/y.user"), Some("a"));
    }

    // ---- Test 8 ----
    #[test]
    fn load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Bundle::load(&path), Err(LedgerError::Serialization(_))));
        assert!(matches!(
            Bundle::load(&dir.path().join("missing.json")),
            Err(LedgerError::Io(_))
        ));
    }
}
