//! Unit tests for candidate filter validation

#[cfg(test)]
mod tests {
    use crate::document::ReadStatus;
    use crate::query::error::FilterError;
    use crate::query::types::{
        Bound, CompareOp, Field, FilterSpec, Predicate, Scalar, SetOp, SortDirection, SortKey,
    };
    use crate::query::validate::{Limits, parse_sort, parse_timestamp};
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<FilterSpec, FilterError> {
        FilterSpec::from_json(&value, &Limits::default())
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let spec = parse(json!({"filter": {}})).unwrap();
        assert!(spec.predicate.is_always());
        assert!(spec.sort.is_empty());
    }

    #[test]
    fn test_missing_filter_is_malformed() {
        assert!(matches!(parse(json!({"sort": {"year": -1}})), Err(FilterError::Malformed(_))));
        assert!(matches!(parse(json!("year > 2020")), Err(FilterError::Malformed(_))));
        assert!(matches!(parse(json!({"filter": []})), Err(FilterError::Malformed(_))));
    }

    #[test]
    fn test_unknown_top_level_keys_are_dropped() {
        let spec = parse(json!({
            "filter": {"isFavorite": true},
            "description": "favourites",
            "suggestedName": "Favs"
        }))
        .unwrap();
        assert_eq!(spec.predicate, Predicate::equals(Field::IsFavorite, Scalar::Bool(true)));
    }

    #[test]
    fn test_range_operators_merge() {
        let spec = parse(json!({"filter": {"year": {"$gte": 2018, "$lt": 2022}}})).unwrap();
        assert_eq!(
            spec.predicate,
            Predicate::Range {
                field: Field::Year,
                lower: Some(Bound::inclusive(Scalar::Number(2018.0))),
                upper: Some(Bound::exclusive(Scalar::Number(2022.0))),
            }
        );
    }

    #[test]
    fn test_in_on_list_field() {
        let spec = parse(json!({"filter": {"keywords": {"$in": ["深度学习", "deep learning"]}}})).unwrap();
        assert_eq!(
            spec.predicate,
            Predicate::one_of(
                Field::Keywords,
                vec![Scalar::Text("深度学习".into()), Scalar::Text("deep learning".into())]
            )
        );
    }

    #[test]
    fn test_literal_array_on_list_field_means_contains_all() {
        let spec = parse(json!({"filter": {"tags": ["nlp", "survey"]}})).unwrap();
        assert!(matches!(
            spec.predicate,
            Predicate::Membership { field: Field::Tags, op: SetOp::All, .. }
        ));
    }

    #[test]
    fn test_literal_array_on_scalar_field_is_rejected() {
        let err = parse(json!({"filter": {"year": [2020, 2021]}})).unwrap_err();
        assert!(matches!(err, FilterError::InvalidValueType { .. }));
    }

    #[test]
    fn test_null_literal_means_missing() {
        let spec = parse(json!({"filter": {"journal": null}})).unwrap();
        assert_eq!(spec.predicate, Predicate::Exists { field: Field::Journal, present: false });

        let spec = parse(json!({"filter": {"journal": {"$ne": null}}})).unwrap();
        assert_eq!(spec.predicate, Predicate::Exists { field: Field::Journal, present: true });
    }

    #[test]
    fn test_status_accepts_legacy_labels() {
        let spec = parse(json!({"filter": {"status": "未读"}})).unwrap();
        assert_eq!(
            spec.predicate,
            Predicate::equals(Field::Status, Scalar::Status(ReadStatus::Unread))
        );
        assert!(parse(json!({"filter": {"status": "archived"}})).is_err());
    }

    #[test]
    fn test_or_of_conditions() {
        let spec = parse(json!({"filter": {"$or": [{"isFavorite": true}, {"rating": {"$gte": 4}}]}})).unwrap();
        let Predicate::Any(children) = &spec.predicate else {
            panic!("expected Any, got {:?}", spec.predicate);
        };
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_empty_logical_array_is_rejected() {
        assert!(parse(json!({"filter": {"$or": []}})).is_err());
        assert!(parse(json!({"filter": {"$and": {"year": 2020}}})).is_err());
    }

    #[test]
    fn test_ownership_fields_are_rejected() {
        for name in ["owner", "userId", "_id"] {
            let err = parse(json!({"filter": {name: "mallory"}})).unwrap_err();
            assert_eq!(err, FilterError::InvalidField(name.to_string()));
        }
    }

    #[test]
    fn test_ownership_field_nested_in_or_is_rejected() {
        let err = parse(json!({"filter": {"$or": [{"isFavorite": true}, {"userId": "mallory"}]}})).unwrap_err();
        assert_eq!(err, FilterError::InvalidField("userId".into()));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert_eq!(
            parse(json!({"filter": {"password": "x"}})).unwrap_err(),
            FilterError::InvalidField("password".into())
        );
        assert_eq!(
            parse(json!({"filter": {"__proto__": {"admin": true}}})).unwrap_err(),
            FilterError::InvalidField("__proto__".into())
        );
    }

    #[test]
    fn test_dangerous_operators_are_rejected() {
        assert_eq!(
            parse(json!({"filter": {"$where": "sleep(1000)"}})).unwrap_err(),
            FilterError::InvalidOperator("$where".into())
        );
        assert_eq!(
            parse(json!({"filter": {"title": {"$function": "x"}}})).unwrap_err(),
            FilterError::InvalidOperator("$function".into())
        );
        assert!(matches!(
            parse(json!({"filter": {"title": {"$regex": "a", "$expr": 1}}})),
            Err(FilterError::InvalidOperator(_))
        ));
    }

    #[test]
    fn test_operator_field_mismatch() {
        let err = parse(json!({"filter": {"isFavorite": {"$gt": 0}}})).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnsupportedOperator { field: "isFavorite".into(), operator: "$gt".into() }
        );
        assert!(matches!(
            parse(json!({"filter": {"year": {"$regex": "20"}}})),
            Err(FilterError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            parse(json!({"filter": {"createdAt": "2024-01-01"}})),
            Err(FilterError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_value_type_mismatch() {
        assert!(matches!(
            parse(json!({"filter": {"year": "2020"}})),
            Err(FilterError::InvalidValueType { .. })
        ));
        assert!(matches!(
            parse(json!({"filter": {"year": 2020.5}})),
            Err(FilterError::InvalidValueType { .. })
        ));
        assert!(matches!(
            parse(json!({"filter": {"isFavorite": "yes"}})),
            Err(FilterError::InvalidValueType { .. })
        ));
        assert!(matches!(
            parse(json!({"filter": {"title": {"nested": 1}}})),
            Err(FilterError::InvalidValueType { .. })
        ));
    }

    #[test]
    fn test_timestamp_accepts_date_and_rfc3339() {
        let spec = parse(json!({"filter": {"createdAt": {"$gte": "2024-03-01T00:00:00Z"}}})).unwrap();
        let Predicate::Range { lower: Some(bound), .. } = &spec.predicate else {
            panic!("expected range");
        };
        assert_eq!(bound.value, Scalar::Timestamp(parse_timestamp("2024-03-01T00:00:00Z").unwrap()));

        assert!(parse(json!({"filter": {"updatedAt": {"$lt": "2024-03-01"}}})).is_ok());
        assert!(parse(json!({"filter": {"updatedAt": {"$lt": "last tuesday"}}})).is_err());
    }

    #[test]
    fn test_regex_length_includes_inline_flags() {
        let limits = Limits::default();
        let fits = "a".repeat(limits.max_text_len - 4);
        let spec = parse(json!({"filter": {"title": {"$regex": fits, "$options": "m"}}})).unwrap();
        let revalidated = FilterSpec::from_json(&spec.to_json(), &limits).unwrap();
        assert_eq!(revalidated, spec);

        let over = "a".repeat(limits.max_text_len - 3);
        assert!(matches!(
            parse(json!({"filter": {"title": {"$regex": over, "$options": "m"}}})),
            Err(FilterError::InvalidValueType { .. })
        ));
    }

    #[test]
    fn test_regex_options() {
        let spec = parse(json!({"filter": {"title": {"$regex": "^graph", "$options": "im"}}})).unwrap();
        let Predicate::Matches { pattern, .. } = &spec.predicate else {
            panic!("expected pattern");
        };
        assert_eq!(pattern.as_str(), "(?m)^graph");
        assert!(pattern.is_match("intro\nGraph networks"));

        assert!(matches!(
            parse(json!({"filter": {"title": {"$regex": "a", "$options": "g"}}})),
            Err(FilterError::InvalidOperator(_))
        ));
        assert!(matches!(
            parse(json!({"filter": {"title": {"$options": "i"}}})),
            Err(FilterError::InvalidOperator(_))
        ));
        assert!(matches!(
            parse(json!({"filter": {"title": {"$regex": "(oops"}}})),
            Err(FilterError::InvalidValueType { .. })
        ));
    }

    #[test]
    fn test_multiple_operators_are_conjoined() {
        let spec = parse(json!({"filter": {"rating": {"$ne": 1, "$gte": 3}}})).unwrap();
        let Predicate::All(children) = &spec.predicate else {
            panic!("expected All");
        };
        assert_eq!(children.len(), 2);
        assert!(children.iter().any(|c| matches!(c, Predicate::Compare { op: CompareOp::Ne, .. })));
    }

    #[test]
    fn test_depth_limit() {
        let mut filter = json!({"isFavorite": true});
        for _ in 0..10 {
            filter = json!({"$and": [filter]});
        }
        assert!(matches!(parse(json!({"filter": filter})), Err(FilterError::TooComplex(_))));
    }

    #[test]
    fn test_node_limit() {
        let limits = Limits { max_nodes: 3, ..Limits::default() };
        let candidate = json!({"filter": {"$or": [{"year": 2020}, {"year": 2021}, {"year": 2022}]}});
        assert!(matches!(
            FilterSpec::from_json(&candidate, &limits),
            Err(FilterError::TooComplex(_))
        ));
    }

    #[test]
    fn test_set_size_limit() {
        let limits = Limits { max_set_values: 2, ..Limits::default() };
        let candidate = json!({"filter": {"tags": {"$in": ["a", "b", "c"]}}});
        assert!(matches!(
            FilterSpec::from_json(&candidate, &limits),
            Err(FilterError::TooComplex(_))
        ));
    }

    #[test]
    fn test_sort_forms() {
        let limits = Limits::default();
        let expected = vec![SortKey::desc(Field::Year), SortKey::asc(Field::Title)];

        assert_eq!(parse_sort(&json!({"year": -1, "title": 1}), &limits).unwrap(), expected);
        assert_eq!(
            parse_sort(&json!({"year": "desc", "title": "ascending"}), &limits).unwrap(),
            expected
        );
        assert_eq!(
            parse_sort(
                &json!([{"field": "year", "direction": "desc"}, ["title", "asc"]]),
                &limits
            )
            .unwrap(),
            expected
        );
        assert!(parse_sort(&json!(null), &limits).unwrap().is_empty());
    }

    #[test]
    fn test_sort_rejections() {
        let limits = Limits::default();
        assert!(matches!(
            parse_sort(&json!({"owner": 1}), &limits),
            Err(FilterError::InvalidField(_))
        ));
        assert!(parse_sort(&json!({"year": 0}), &limits).is_err());
        assert!(parse_sort(&json!([["year", 1], ["year", -1]]), &limits).is_err());
        assert!(matches!(
            parse_sort(
                &json!({"year": 1, "title": 1, "rating": 1, "createdAt": 1, "updatedAt": 1}),
                &limits
            ),
            Err(FilterError::TooComplex(_))
        ));
    }

    #[test]
    fn test_sort_direction_in_spec() {
        let spec = parse(json!({"filter": {}, "sort": {"updatedAt": -1}})).unwrap();
        assert_eq!(spec.sort[0].direction, SortDirection::Descending);
    }

    #[test]
    fn test_render_then_parse_is_stable() {
        let candidate = json!({
            "filter": {
                "$or": [
                    {"keywords": {"$in": ["gnn"]}},
                    {"title": {"$regex": "graph", "$options": "i"}}
                ],
                "year": {"$gte": 2019, "$lte": 2023},
                "journal": {"$exists": true},
                "status": {"$ne": "read"}
            },
            "sort": {"rating": -1}
        });
        let spec = parse(candidate).unwrap();
        let again = parse(spec.to_json()).unwrap();
        assert_eq!(spec, again);
    }
}
