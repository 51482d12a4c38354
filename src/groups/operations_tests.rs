//! Unit tests for group operations

#[cfg(test)]
mod tests {
    use crate::db::GroupId;
    use crate::document::ReadStatus;
    use crate::executor::Page;
    use crate::groups::error::GroupError;
    use crate::groups::operations::GroupManager;
    use crate::groups::types::{GroupCategory, GroupDraft, GroupUpdate, MAX_DESCRIPTION_LEN, ResolvedGroup};
    use crate::query::{Field, FilterError, FilterSpec, Limits, Predicate, Scalar, SortKey};
    use crate::testing::{ScriptedGenerator, TestDb, doc, owner};
    use crate::translate::{DEFAULT_NAME, GenerationError, TranslateError, Translator};
    use chrono::{Duration, Utc};

    fn manager(test_db: &TestDb) -> GroupManager<'_> {
        GroupManager::new(test_db.db(), Limits::default(), 100)
    }

    fn favorites_spec() -> FilterSpec {
        FilterSpec::new(Predicate::equals(Field::IsFavorite, Scalar::Bool(true)), Vec::new())
    }

    fn seed_library(test_db: &TestDb) {
        let alice = owner("alice");
        let bob = owner("bob");
        test_db.seed(&[
            doc(&alice, "Attention", |d| {
                d.year = Some(2017);
                d.is_favorite = true;
            }),
            doc(&alice, "Diffusion", |d| {
                d.year = Some(2021);
                d.status = ReadStatus::Read;
            }),
            doc(&alice, "Retrieval", |d| {
                d.year = Some(2023);
                d.is_favorite = true;
            }),
            doc(&bob, "Bob's favourite", |d| d.is_favorite = true),
        ]);
    }

    #[test]
    fn test_create_then_resolve_round_trip() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);
        let alice = owner("alice");

        let group = m
            .create(&alice, GroupDraft::new("  Favs  ", favorites_spec()).with_icon("heart"))
            .unwrap();
        assert_eq!(group.name, "Favs");
        assert_eq!(group.category, GroupCategory::Custom);
        assert_eq!(group.color, "#00d4ff");
        assert_eq!(group.document_count, 2);
        assert!(group.last_recomputed.is_some());
        assert!(group.active);

        let ResolvedGroup::Custom(resolved) = m.resolve(&alice, &group.id.to_string()).unwrap() else {
            panic!("expected custom group");
        };
        assert_eq!(resolved, group);

        let listed = m.list(&alice).unwrap();
        assert_eq!(listed.iter().filter(|g| g.id == group.id).count(), 1);
    }

    #[test]
    fn test_invalid_display_fields_store_nothing() {
        let test_db = TestDb::new();
        let m = manager(&test_db);
        let alice = owner("alice");

        let err = m
            .create(&alice, GroupDraft::new("Favs", favorites_spec()).with_icon("rocket"))
            .unwrap_err();
        assert!(matches!(err, GroupError::InvalidInput { field: "icon", .. }));

        let err = m
            .create(&alice, GroupDraft::new("Favs", favorites_spec()).with_color("blue"))
            .unwrap_err();
        assert!(matches!(err, GroupError::InvalidInput { field: "color", .. }));

        assert!(m.create(&alice, GroupDraft::new("", favorites_spec())).is_err());
        assert!(m.list(&alice).unwrap().is_empty());
    }

    #[test]
    fn test_spec_over_limits_is_rejected() {
        let test_db = TestDb::new();
        let limits = Limits {
            max_set_values: 2,
            ..Limits::default()
        };
        let m = GroupManager::new(test_db.db(), limits, 100);
        let spec = FilterSpec::new(
            Predicate::one_of(
                Field::Year,
                vec![Scalar::Number(2019.0), Scalar::Number(2020.0), Scalar::Number(2021.0)],
            ),
            Vec::new(),
        );

        let err = m.create(&owner("alice"), GroupDraft::new("Too many", spec)).unwrap_err();
        assert!(matches!(err, GroupError::Filter(FilterError::TooComplex(_))));
    }

    #[test]
    fn test_resolve_presets_before_ids() {
        let test_db = TestDb::new();
        let m = manager(&test_db);
        let resolved = m.resolve(&owner("alice"), "favorites").unwrap();
        assert!(matches!(resolved, ResolvedGroup::Preset { preset, .. } if preset.key == "favorites"));
    }

    #[test]
    fn test_resolve_unknown_references() {
        let test_db = TestDb::new();
        let m = manager(&test_db);
        let alice = owner("alice");

        assert!(matches!(m.resolve(&alice, "not-a-group"), Err(GroupError::NotFound(_))));
        assert!(matches!(
            m.resolve(&alice, &GroupId::new_v4().to_string()),
            Err(GroupError::NotFound(_))
        ));
    }

    #[test]
    fn test_other_owners_group_is_not_found() {
        let test_db = TestDb::new();
        let m = manager(&test_db);
        let group = m.create(&owner("alice"), GroupDraft::new("Favs", favorites_spec())).unwrap();

        let bob = owner("bob");
        assert!(matches!(m.resolve(&bob, &group.id.to_string()), Err(GroupError::NotFound(_))));
        assert!(matches!(m.delete(&bob, group.id), Err(GroupError::NotFound(_))));
        assert!(matches!(
            m.update(&bob, group.id, GroupUpdate { name: Some("Mine".into()), ..GroupUpdate::default() }),
            Err(GroupError::NotFound(_))
        ));
        assert!(m.get(&owner("alice"), group.id).is_ok());
    }

    #[test]
    fn test_delete_twice() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);
        let alice = owner("alice");
        let group = m.create(&alice, GroupDraft::new("Favs", favorites_spec())).unwrap();

        let removed = m.delete(&alice, group.id).unwrap();
        assert_eq!(removed.id, group.id);
        assert!(matches!(m.delete(&alice, group.id), Err(GroupError::NotFound(_))));
        assert_eq!(test_db.db().list_documents(&alice).unwrap().len(), 3);
    }

    #[test]
    fn test_update_recomputes_count_on_new_spec() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);
        let alice = owner("alice");
        let group = m.create(&alice, GroupDraft::new("Favs", favorites_spec())).unwrap();

        let recent = FilterSpec::new(
            Predicate::at_least(Field::Year, Scalar::Number(2020.0)),
            vec![SortKey::desc(Field::Year)],
        );
        let updated = m
            .update(
                &alice,
                group.id,
                GroupUpdate {
                    name: Some("Recent".into()),
                    color: Some("#ABCDEF".into()),
                    spec: Some(recent.clone()),
                    ..GroupUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, group.id);
        assert_eq!(updated.created_at, group.created_at);
        assert_eq!(updated.category, group.category);
        assert_eq!(updated.name, "Recent");
        assert_eq!(updated.color, "#abcdef");
        assert_eq!(updated.spec, recent);
        assert_eq!(updated.document_count, 2);
        assert!(updated.updated_at >= group.updated_at);
        assert_eq!(m.get(&alice, group.id).unwrap(), updated);
    }

    #[test]
    fn test_rejected_update_leaves_group_unchanged() {
        let test_db = TestDb::new();
        let m = manager(&test_db);
        let alice = owner("alice");
        let group = m.create(&alice, GroupDraft::new("Favs", favorites_spec())).unwrap();

        let err = m
            .update(&alice, group.id, GroupUpdate { icon: Some("rocket".into()), ..GroupUpdate::default() })
            .unwrap_err();
        assert!(matches!(err, GroupError::InvalidInput { .. }));
        assert_eq!(m.get(&alice, group.id).unwrap(), group);
    }

    #[test]
    fn test_list_is_newest_first_and_refreshes_counts() {
        let test_db = TestDb::new();
        let m = manager(&test_db);
        let alice = owner("alice");

        let older = m.create(&alice, GroupDraft::new("Older", favorites_spec())).unwrap();
        let mut newer = m.create(&alice, GroupDraft::new("Newer", favorites_spec())).unwrap();
        newer.created_at = older.created_at + Duration::seconds(5);
        test_db.db().insert_group(&newer).unwrap();
        assert_eq!(older.document_count, 0);

        test_db.seed(&[doc(&alice, "Late favourite", |d| d.is_favorite = true)]);

        let listed = m.list(&alice).unwrap();
        let names: Vec<&str> = listed.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older"]);
        assert!(listed.iter().all(|g| g.document_count == 1));
        assert_eq!(m.get(&alice, older.id).unwrap().document_count, 1);
    }

    #[test]
    fn test_documents_through_preset() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);

        let (group, page) = m.documents(&owner("alice"), "favorites", Page::new(1, 10)).unwrap();
        assert_eq!(group.name(), "Favorites");
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|d| d.is_favorite && d.owner == owner("alice")));
    }

    #[test]
    fn test_list_presets_counts_per_owner() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);

        let presets = m.list_presets(&owner("alice")).unwrap();
        assert_eq!(presets.len(), 6);
        assert_eq!(presets[0].key, "recent-high-impact");
        let favorites = presets.iter().find(|p| p.key == "favorites").unwrap();
        assert_eq!(favorites.document_count, 2);

        let bob_presets = m.list_presets(&owner("bob")).unwrap();
        let favorites = bob_presets.iter().find(|p| p.key == "favorites").unwrap();
        assert_eq!(favorites.document_count, 1);
    }

    #[test]
    fn test_create_from_text() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);
        let generator = ScriptedGenerator::reply(
            r##"{"filter": {"year": {"$gte": 2020}}, "sort": {"year": -1},
                "suggestedName": "Since 2020", "suggestedIcon": "calendar", "suggestedColor": "#45b7d1"}"##,
        );
        let translator = Translator::new(generator.clone(), Limits::default(), 500);

        let group = m
            .create_from_text(&owner("alice"), &translator, "papers since 2020", None)
            .unwrap();
        assert_eq!(group.category, GroupCategory::AiGenerated);
        assert_eq!(group.name, "Since 2020");
        assert_eq!(group.icon, "calendar");
        assert_eq!(group.document_count, 2);
        assert_eq!(group.spec.source_text.as_deref(), Some("papers since 2020"));
        assert_eq!(generator.calls(), 1);

        let named = m
            .create_from_text(&owner("alice"), &translator, "papers since 2020", Some("Mine"))
            .unwrap();
        assert_eq!(named.name, "Mine");
    }

    #[test]
    fn test_unusable_hints_fall_back() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);
        let answer = format!(
            r#"{{"filter": {{"isFavorite": true}}, "suggestedName": "Deep\nLearning", "description": "{}"}}"#,
            "x".repeat(600)
        );
        let translator = Translator::new(ScriptedGenerator::reply(&answer), Limits::default(), 500);

        let group = m
            .create_from_text(&owner("alice"), &translator, "my favourites", None)
            .unwrap();
        assert_eq!(group.name, DEFAULT_NAME);
        assert_eq!(group.description.map(|d| d.chars().count()), Some(MAX_DESCRIPTION_LEN));
        assert_eq!(group.document_count, 2);
    }

    #[test]
    fn test_failed_translation_stores_nothing() {
        let test_db = TestDb::new();
        let m = manager(&test_db);
        let alice = owner("alice");

        let prose = Translator::new(ScriptedGenerator::reply("I cannot help with that"), Limits::default(), 500);
        let err = m.create_from_text(&alice, &prose, "something", None).unwrap_err();
        assert!(matches!(err, GroupError::Translate(TranslateError::Parse(_))));

        let down = Translator::new(
            ScriptedGenerator::failing(GenerationError::Timeout(30)),
            Limits::default(),
            500,
        );
        let err = m.create_from_text(&alice, &down, "something", None).unwrap_err();
        assert!(matches!(err, GroupError::Translate(TranslateError::Upstream(_))));

        assert!(m.list(&alice).unwrap().is_empty());
    }

    #[test]
    fn test_preview_counts_without_storing() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);
        let translator = Translator::new(
            ScriptedGenerator::reply(r#"{"filter": {"isFavorite": true}}"#),
            Limits::default(),
            500,
        );

        let preview = m.preview(&owner("alice"), &translator, "my favourites").unwrap();
        assert_eq!(preview.match_count, 2);
        assert!(m.list(&owner("alice")).unwrap().is_empty());
    }

    #[test]
    fn test_count_is_owner_scoped() {
        let test_db = TestDb::new();
        seed_library(&test_db);
        let m = manager(&test_db);
        assert_eq!(m.count(&owner("alice"), &favorites_spec()).unwrap(), 2);
        assert_eq!(m.count(&owner("bob"), &favorites_spec()).unwrap(), 1);
        assert_eq!(m.count(&owner("carol"), &favorites_spec()).unwrap(), 0);
    }

    #[test]
    fn test_stored_count_is_refreshed_on_open() {
        let test_db = TestDb::new();
        let m = manager(&test_db);
        let alice = owner("alice");
        let group = m.create(&alice, GroupDraft::new("Favs", favorites_spec())).unwrap();
        assert_eq!(group.document_count, 0);

        test_db.seed(&[doc(&alice, "New", |d| d.is_favorite = true)]);
        let before = Utc::now();
        let (_, page) = m.documents(&alice, &group.id.to_string(), Page::default()).unwrap();
        assert_eq!(page.total, 1);

        let stored = m.get(&alice, group.id).unwrap();
        assert_eq!(stored.document_count, 1);
        assert!(stored.last_recomputed.unwrap() >= before);
    }
}
