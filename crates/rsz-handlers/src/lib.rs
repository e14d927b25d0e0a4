//! Content resources and the handlers that move them in and out of files.
//!
//! A native file is read into a map of [`ContentResource`]s keyed by ID;
//! edited resources are written back into the same in-memory
//! [`BaseFile`](rsz_types::BaseFile). Which handler reads a file is chosen by
//! a string discriminator resolved through the [`HandlerRegistry`].
//!
//! # Key Types
//!
//! - [`ContentResource`] / [`ResourceBody`]: one editable unit
//! - [`ResourceHandler`]: per-file-shape read/write strategy
//! - [`HandlerConfig`]: TOML handler configuration
//! - [`HandlerRegistry`]: discriminator to handler factory table

pub mod config;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod registry;
pub mod resource;

pub use config::HandlerConfig;
pub use error::{HandlerError, HandlerResult};
pub use handler::{NewEntity, ResourceHandler, ResourceMap};
pub use handlers::{ArrayFileHandler, MsgFileHandler, UserSingletonHandler};
pub use registry::{HandlerFactory, HandlerRegistry};
pub use resource::{ContentResource, Payload, PayloadKind, ResourceBody, PAYLOAD_KEY};

#[cfg(test)]
mod tests {
    use super::*;
    use rsz_ids::{guid_to_id, IdError, IdGenerator};
    use rsz_types::{
        BaseFile, ClassDef, Environment, FieldDef, FieldKind, Instance, MsgEntry, MsgFile, RszFile,
        Uuid, Value,
    };
    use serde_json::json;

    /// Helper: schema with an item table and a settings singleton.
    fn env() -> Environment {
        Environment::new()
            .with_class(
                ClassDef::new("app.ItemTable").with_field(FieldDef::object_array("Items", "app.Item")),
            )
            .with_class(
                ClassDef::new("app.Item")
                    .with_field(FieldDef::scalar("Id", FieldKind::S32))
                    .with_field(FieldDef::scalar("Variant", FieldKind::U8))
                    .with_field(FieldDef::scalar("Label", FieldKind::String)),
            )
            .with_class(ClassDef::new("app.Settings").with_field(FieldDef::scalar("Volume", FieldKind::F32)))
    }

    fn item(id: i32, variant: u8, label: &str) -> Value {
        Instance::new("app.Item", vec![Value::S32(id), Value::U8(variant), label.into()]).into()
    }

    fn table(items: Vec<Value>) -> BaseFile {
        BaseFile::Rsz(RszFile {
            instances: vec![Instance::new("app.ItemTable", vec![Value::Array(items)])],
            game_objects: vec![],
        })
    }

    fn items_of(base: &BaseFile) -> Vec<(i32, u8, String)> {
        let root = &base.as_rsz().unwrap().instances[0];
        root.values[0]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| {
                let inst = v.as_instance().unwrap();
                let Value::S32(id) = inst.values[0] else { panic!("id") };
                let Value::U8(variant) = inst.values[1] else { panic!("variant") };
                (id, variant, inst.values[2].as_str().unwrap().to_string())
            })
            .collect()
    }

    fn array_config() -> HandlerConfig {
        HandlerConfig::new("array-file")
            .with("class", "app.Item")
            .with("array_field", "Items")
            .with("id_fields", vec!["Id"])
    }

    fn grouped_config() -> HandlerConfig {
        array_config().with("sub_id_fields", vec!["Variant"])
    }

    fn set_label(resource: &mut ContentResource, index: usize, label: &str) {
        match &mut resource.body {
            ResourceBody::Object(inst) => inst.values[2] = label.into(),
            ResourceBody::ObjectList(items) => items[index].values[2] = label.into(),
            _ => panic!("not an item resource"),
        }
    }

    // -----------------------------------------------------------------------
    // 1. Registry resolves built-in discriminators
    // -----------------------------------------------------------------------
    #[test]
    fn registry_builds_builtin_handlers() {
        let registry = HandlerRegistry::with_builtin();
        let names: Vec<&str> = registry.discriminators().collect();
        assert_eq!(names, vec!["array-file", "msg-file", "user-singleton"]);

        let handler = registry.build(&array_config(), &env()).unwrap();
        assert_eq!(handler.discriminator(), "array-file");
    }

    // -----------------------------------------------------------------------
    // 2. Unknown discriminators fail fast
    // -----------------------------------------------------------------------
    #[test]
    fn registry_rejects_unknown_discriminator() {
        let registry = HandlerRegistry::with_builtin();
        let err = registry.build(&HandlerConfig::new("tex-file"), &env()).unwrap_err();
        assert_eq!(err, HandlerError::UnknownHandler("tex-file".into()));
        assert!(!HandlerRegistry::new().contains("array-file"));
    }

    // -----------------------------------------------------------------------
    // 3. Configuration errors surface at build time
    // -----------------------------------------------------------------------
    #[test]
    fn array_config_errors() {
        let registry = HandlerRegistry::with_builtin();
        let env = env();

        let missing = HandlerConfig::new("array-file").with("class", "app.Item").with("id_fields", vec!["Id"]);
        assert!(matches!(
            registry.build(&missing, &env),
            Err(HandlerError::MissingConfigField { field, .. }) if field == "array_field"
        ));

        let no_ids = array_config().with("id_fields", Vec::<String>::new());
        assert!(matches!(
            registry.build(&no_ids, &env),
            Err(HandlerError::Id(IdError::NoIdFields { .. }))
        ));

        let bad_sub = array_config().with("sub_id_fields", vec!["Nope"]);
        assert!(matches!(registry.build(&bad_sub, &env), Err(HandlerError::Schema(_))));
    }

    // -----------------------------------------------------------------------
    // 4. Edit one entry, write back, re-read: no reordering
    // -----------------------------------------------------------------------
    #[test]
    fn array_edit_preserves_order() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&array_config(), &env).unwrap();
        let mut base = table(vec![item(10, 0, "a"), item(11, 0, "b"), item(12, 0, "c")]);

        let mut resources = handler.read_resources("natives/items.user", &base, &env).unwrap();
        assert_eq!(resources.keys().copied().collect::<Vec<_>>(), vec![10, 11, 12]);

        set_label(resources.get_mut(&11).unwrap(), 0, "renamed");
        handler.modify_resources(&mut base, &resources, &env).unwrap();

        let fresh = base.clone();
        let reread = handler.read_resources("natives/items.user", &fresh, &env).unwrap();
        assert_eq!(reread.len(), 3);
        assert_eq!(
            items_of(&fresh),
            vec![(10, 0, "a".into()), (11, 0, "renamed".into()), (12, 0, "c".into())]
        );
    }

    // -----------------------------------------------------------------------
    // 5. Write-back keeps file order even when IDs are unsorted
    // -----------------------------------------------------------------------
    #[test]
    fn array_write_back_follows_file_order() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&array_config(), &env).unwrap();
        let mut base = table(vec![item(30, 0, "x"), item(5, 0, "y"), item(17, 0, "z")]);
        let resources = handler.read_resources("f", &base, &env).unwrap();
        handler.modify_resources(&mut base, &resources, &env).unwrap();
        let ids: Vec<i32> = items_of(&base).into_iter().map(|(id, _, _)| id).collect();
        assert_eq!(ids, vec![30, 5, 17]);
    }

    // -----------------------------------------------------------------------
    // 6. Sub-ID grouping uses only the ID fields
    // -----------------------------------------------------------------------
    #[test]
    fn grouped_entries_share_first_seen_id() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&grouped_config(), &env).unwrap();
        let base = table(vec![item(1, 0, "a"), item(2, 0, "b"), item(1, 1, "c"), item(1, 2, "d")]);

        let resources = handler.read_resources("f", &base, &env).unwrap();
        assert_eq!(resources.len(), 2);
        let ResourceBody::ObjectList(group) = &resources[&1].body else {
            panic!("expected a list resource");
        };
        assert_eq!(group.len(), 3);
        assert_eq!(group[2].values[2], Value::String("d".into()));
    }

    // -----------------------------------------------------------------------
    // 7. Interleaved groups are emitted whole at their first position
    // -----------------------------------------------------------------------
    #[test]
    fn grouped_write_back_concatenates_in_first_seen_order() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&grouped_config(), &env).unwrap();
        let mut base = table(vec![item(1, 0, "a"), item(2, 0, "b"), item(1, 1, "c"), item(2, 1, "d")]);

        let mut resources = handler.read_resources("f", &base, &env).unwrap();
        set_label(resources.get_mut(&2).unwrap(), 1, "D");
        handler.modify_resources(&mut base, &resources, &env).unwrap();

        assert_eq!(
            items_of(&base),
            vec![
                (1, 0, "a".into()),
                (1, 1, "c".into()),
                (2, 0, "b".into()),
                (2, 1, "D".into()),
            ]
        );
    }

    // -----------------------------------------------------------------------
    // 8. New resources are appended in ascending ID order
    // -----------------------------------------------------------------------
    #[test]
    fn created_resources_are_appended() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&array_config(), &env).unwrap();
        let mut base = table(vec![item(10, 0, "a")]);
        let mut resources = handler.read_resources("f", &base, &env).unwrap();

        let diff = json!({"Label": "fresh"});
        for id in [40, 20] {
            let (new_id, resource) = handler
                .create_resource("f", NewEntity { id, label: "New", initial_diff: Some(&diff) }, &env)
                .unwrap();
            assert_eq!(new_id, id);
            resources.insert(new_id, resource);
        }
        handler.modify_resources(&mut base, &resources, &env).unwrap();

        assert_eq!(
            items_of(&base),
            vec![(10, 0, "a".into()), (20, 0, "fresh".into()), (40, 0, "fresh".into())]
        );
    }

    // -----------------------------------------------------------------------
    // 9. Entries without a resource are kept
    // -----------------------------------------------------------------------
    #[test]
    fn entries_without_resource_survive() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&array_config(), &env).unwrap();
        let mut base = table(vec![item(1, 0, "a"), item(2, 0, "b")]);
        let mut resources = handler.read_resources("f", &base, &env).unwrap();
        resources.remove(&1);
        handler.modify_resources(&mut base, &resources, &env).unwrap();
        assert_eq!(items_of(&base).len(), 2);
    }

    // -----------------------------------------------------------------------
    // 10. Message tables key entries by folded GUID
    // -----------------------------------------------------------------------
    #[test]
    fn msg_entries_roundtrip() {
        let env = env();
        let handler = MsgFileHandler;
        let guid = Uuid::from_u128(77);
        let mut base = BaseFile::Msg(MsgFile {
            entries: vec![MsgEntry::new(guid, "greeting").with_text("en", "Hello")],
        });

        let mut resources = handler.read_resources("natives/msg/ui.msg", &base, &env).unwrap();
        let id = guid_to_id(&guid);
        assert!(resources.contains_key(&id));

        if let ResourceBody::Message(entry) = &mut resources.get_mut(&id).unwrap().body {
            entry.content.insert("en".into(), "Hi".into());
        }
        let (new_id, created) = handler
            .create_resource("natives/msg/ui.msg", NewEntity { id: 0, label: "farewell", initial_diff: None }, &env)
            .unwrap();
        resources.insert(new_id, created);
        handler.modify_resources(&mut base, &resources, &env).unwrap();

        let table = base.as_msg().unwrap();
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entry(&guid).unwrap().content["en"], "Hi");
        let farewell = table.entry_by_name("farewell").unwrap();
        assert_eq!(guid_to_id(&farewell.guid), new_id);
    }

    // -----------------------------------------------------------------------
    // 11. Singleton handler reads and writes the root instance
    // -----------------------------------------------------------------------
    #[test]
    fn singleton_roundtrip() {
        let env = env();
        let config = HandlerConfig::new("user-singleton").with("class", "app.Settings").with("id", 3);
        let handler = HandlerRegistry::with_builtin().build(&config, &env).unwrap();
        let mut base = BaseFile::Rsz(RszFile {
            instances: vec![Instance::new("app.Settings", vec![Value::F32(0.5)])],
            game_objects: vec![],
        });

        let mut resources = handler.read_resources("f", &base, &env).unwrap();
        let resource = resources.get_mut(&3).unwrap();
        resource.apply_diff(&json!({"Volume": 0.8}), &env).unwrap();
        handler.modify_resources(&mut base, &resources, &env).unwrap();

        assert_eq!(base.as_rsz().unwrap().instances[0].values[0], Value::F32(0.8));
    }

    // -----------------------------------------------------------------------
    // 12. Creation is unsupported by default
    // -----------------------------------------------------------------------
    #[test]
    fn singleton_does_not_create() {
        let env = env();
        let handler = UserSingletonHandler::from_config(
            &HandlerConfig::new("user-singleton").with("class", "app.Settings"),
            &env,
        )
        .unwrap();
        let err = handler
            .create_resource("f", NewEntity { id: 1, label: "x", initial_diff: None }, &env)
            .unwrap_err();
        assert!(matches!(err, HandlerError::Unsupported { .. }));
    }

    // -----------------------------------------------------------------------
    // 13. Handlers refuse files of the wrong format
    // -----------------------------------------------------------------------
    #[test]
    fn wrong_format_is_reported() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&array_config(), &env).unwrap();
        let msg = BaseFile::Msg(MsgFile::default());
        assert!(matches!(
            handler.read_resources("f", &msg, &env),
            Err(HandlerError::WrongFormat { .. })
        ));
        assert!(matches!(
            MsgFileHandler.read_resources("f", &table(vec![]), &env),
            Err(HandlerError::WrongFormat { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // 14. Ungrouped duplicate IDs keep the first and preserve the rest
    // -----------------------------------------------------------------------
    #[test]
    fn ungrouped_duplicates_survive_write_back() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&array_config(), &env).unwrap();
        let mut base = table(vec![item(1, 0, "first"), item(2, 0, "x"), item(1, 5, "second")]);

        let mut resources = handler.read_resources("f", &base, &env).unwrap();
        assert_eq!(resources.len(), 2);
        set_label(resources.get_mut(&1).unwrap(), 0, "edited");
        handler.modify_resources(&mut base, &resources, &env).unwrap();

        assert_eq!(
            items_of(&base),
            vec![(1, 0, "edited".into()), (2, 0, "x".into()), (1, 5, "second".into())]
        );
    }

    // -----------------------------------------------------------------------
    // 15. Full instance trees build entries whatever the ID shape
    // -----------------------------------------------------------------------
    #[test]
    fn full_trees_create_composite_entries() {
        let env = env();
        let config = array_config().with("id_fields", vec!["Id", "Variant"]);
        let handler = ArrayFileHandler::from_config(&config, &env).unwrap();
        let expected = IdGenerator::new(&env, "app.Item", &["Id", "Variant"])
            .unwrap()
            .get_id(item(7, 2, "").as_instance().unwrap())
            .unwrap();

        let tree = json!({"$type": "app.Item", "Id": 7, "Variant": 2, "Label": "new"});
        let (id, resource) = handler
            .create_resource("f", NewEntity { id: expected, label: "New", initial_diff: Some(&tree) }, &env)
            .unwrap();
        assert_eq!(id, expected);

        let mut base = table(vec![item(1, 0, "a")]);
        let mut resources = handler.read_resources("f", &base, &env).unwrap();
        resources.insert(id, resource);
        handler.modify_resources(&mut base, &resources, &env).unwrap();
        assert_eq!(items_of(&base), vec![(1, 0, "a".into()), (7, 2, "new".into())]);

        let partial = json!({"Label": "new"});
        assert!(matches!(
            handler.create_resource("f", NewEntity { id: expected, label: "New", initial_diff: Some(&partial) }, &env),
            Err(HandlerError::IdNotAssignable { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // 16. Grouped resources are created from a list of entry trees
    // -----------------------------------------------------------------------
    #[test]
    fn grouped_resources_created_from_entry_lists() {
        let env = env();
        let handler = ArrayFileHandler::from_config(&grouped_config(), &env).unwrap();
        let trees = json!([
            {"$type": "app.Item", "Id": 40, "Variant": 0, "Label": "plain"},
            {"$type": "app.Item", "Id": 40, "Variant": 1, "Label": "shiny"}
        ]);
        let (id, resource) = handler
            .create_resource("f", NewEntity { id: 40, label: "Elixir", initial_diff: Some(&trees) }, &env)
            .unwrap();
        assert_eq!(id, 40);
        let ResourceBody::ObjectList(group) = &resource.body else {
            panic!("expected a list resource");
        };
        assert_eq!(group.len(), 2);

        let mixed = json!([
            {"$type": "app.Item", "Id": 40, "Variant": 0},
            {"$type": "app.Item", "Id": 41, "Variant": 0}
        ]);
        assert!(matches!(
            handler.create_resource("f", NewEntity { id: 40, label: "", initial_diff: Some(&mixed) }, &env),
            Err(HandlerError::ResourceShape { .. })
        ));
        assert!(matches!(
            handler.create_resource("f", NewEntity { id: 40, label: "", initial_diff: Some(&json!([])) }, &env),
            Err(HandlerError::ResourceShape { .. })
        ));
    }
}
