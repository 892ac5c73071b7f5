use serde_json::json;

use dataviser::data::filter::{Criteria, INDEX_COLUMN};
use dataviser::data::transform::SUM_TABLE;
use dataviser::{
    Metadata, Orientation, Pipeline, PipelineConfig, PipelineError, RawInput, Registry, RowFilter,
    Scalar, Transform,
};

fn raw_from(value: serde_json::Value) -> RawInput {
    serde_json::from_value(value).unwrap()
}

fn single_table_input() -> RawInput {
    raw_from(json!({
        "t1": {
            "table": [["", "a", "b"], ["r1", "1", "2"], ["r2", "3", "x"]],
            "meta": {"group": "g1"}
        }
    }))
}

fn two_group_input() -> RawInput {
    raw_from(json!({
        "t1": {
            "table": [["", "a", "b"], ["r1", 1, 2], ["r2", 3, 4]],
            "meta": {"group": "g1", "year": 2020}
        },
        "t2": {
            "table": [["", "a", "b"], ["r1", 10, 20], ["r3", 30, 40]],
            "meta": {"group": "g1", "year": 2021}
        },
        "t3": {
            "table": [["", "a", "c"], ["r1", 100, 200]],
            "meta": {"group": "g2", "year": 2020}
        }
    }))
}

#[test]
fn end_to_end_column_sums_in_dict_orientation() {
    let mut pipeline = Pipeline::new(PipelineConfig {
        transform: Transform::ColumnSums,
        ..Default::default()
    });
    let output = pipeline.run(Some(&single_table_input())).unwrap();

    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({"t1": {"table": {"a": {"0": 4.0}, "b": {"0": 2.0}}, "meta": {"group": "g1"}}})
    );
}

#[test]
fn preprocessing_coerces_and_reshapes() {
    let registry = Registry::preprocess(Some(&single_table_input()));
    let t1 = registry.table("t1").unwrap();

    assert_eq!(t1.index, vec![Scalar::from("r1"), Scalar::from("r2")]);
    assert_eq!(t1.columns, vec!["a", "b"]);
    assert_eq!(t1.column("a").unwrap(), &[Scalar::Float(1.0), Scalar::Float(3.0)]);
    assert_eq!(t1.column("b").unwrap(), &[Scalar::Float(2.0), Scalar::Float(0.0)]);
}

#[test]
fn empty_filters_are_identity() {
    let mut registry = Registry::preprocess(Some(&two_group_input()));
    let before = registry.tables().unwrap().clone();

    registry.filter_rows("a", &[]).unwrap();
    registry.filter_cols(&[]);
    registry.filter_meta(&Criteria::new());

    assert_eq!(registry.tables().unwrap(), &before);
}

#[test]
fn metadata_filter_requires_every_criterion() {
    let mut pipeline = Pipeline::new(PipelineConfig {
        metadata_filter: serde_json::from_value(json!({
            "group": ["g1"],
            "year": [2020]
        }))
        .unwrap(),
        ..Default::default()
    });
    let output = pipeline.run(Some(&two_group_input())).unwrap();

    // t2 passes on group only, t3 on year only.
    assert_eq!(output.keys().collect::<Vec<_>>(), vec!["t1"]);
}

#[test]
fn row_and_column_filters_compose() {
    let mut pipeline = Pipeline::new(PipelineConfig {
        row_filter: Some(RowFilter {
            column: INDEX_COLUMN.into(),
            values: vec!["r1".into()],
        }),
        column_filter: vec!["a".into()],
        ..Default::default()
    });
    let output = pipeline.run(Some(&two_group_input())).unwrap();

    assert_eq!(output["t1"].table, json!({"a": {"r1": 1.0}}));
    assert_eq!(output["t2"].table, json!({"a": {"r1": 10.0}}));
    assert_eq!(output["t3"].table, json!({"a": {"r1": 100.0}}));
}

#[test]
fn row_filter_on_missing_column_propagates() {
    let mut pipeline = Pipeline::new(PipelineConfig {
        row_filter: Some(RowFilter {
            column: "b".into(),
            values: vec![Scalar::Integer(2)],
        }),
        ..Default::default()
    });
    let err = pipeline.run(Some(&two_group_input())).unwrap_err();

    assert_eq!(
        err,
        PipelineError::UnknownColumn {
            table: "t3".into(),
            column: "b".into()
        }
    );
}

#[test]
fn reductions_keep_shape_and_total() {
    let mut registry = Registry::preprocess(Some(&two_group_input()));
    let original = registry.tables().unwrap().clone();

    registry.column_sums();
    let by_col = registry.tables().unwrap().clone();
    registry.reset();
    registry.row_sums();
    let by_row = registry.tables().unwrap().clone();

    for (id, table) in &original {
        assert_eq!(by_col[id].row_count(), 1);
        assert_eq!(by_col[id].column_count(), table.column_count());
        assert_eq!(by_row[id].row_count(), table.row_count());
        assert_eq!(by_row[id].column_count(), 1);
        assert_eq!(by_col[id].total(), table.total());
        assert_eq!(by_row[id].total(), table.total());
    }
}

#[test]
fn accumulate_sum_fills_missing_columns_with_zero() {
    let input = raw_from(json!({
        "A": {"table": [["", "x"], ["r1", 1], ["r2", 2]], "meta": {}},
        "B": {"table": [["", "y"], ["r1", 10], ["r2", 20]], "meta": {}}
    }));
    let mut pipeline = Pipeline::new(PipelineConfig {
        transform: Transform::AccumulateSum,
        ..Default::default()
    });
    let output = pipeline.run(Some(&input)).unwrap();

    assert_eq!(
        output[SUM_TABLE].table,
        json!({"x": {"r1": 1.0, "r2": 2.0}, "y": {"r1": 10.0, "r2": 20.0}})
    );
    assert_eq!(output[SUM_TABLE].meta, Metadata::new());
    assert!(output.contains_key("A") && output.contains_key("B"));
}

#[test]
fn accumulate_on_load_builds_sum_before_filters() {
    let mut pipeline = Pipeline::new(PipelineConfig {
        accumulate_on_load: true,
        ..Default::default()
    });
    let output = pipeline.run(Some(&two_group_input())).unwrap();

    let sum = &output[SUM_TABLE].table;
    assert_eq!(sum["a"]["r1"], json!(111.0));
    assert_eq!(sum["b"]["r3"], json!(40.0));
    assert_eq!(sum["c"]["r2"], json!(0.0));
    assert!(pipeline.registry.reference().contains_key(SUM_TABLE));
}

#[test]
fn reset_restores_sum_built_on_load() {
    let mut pipeline = Pipeline::new(PipelineConfig {
        accumulate_on_load: true,
        ..Default::default()
    });
    pipeline.load(Some(&two_group_input()));
    let registry = &mut pipeline.registry;
    let pristine = serde_json::to_string(registry.export(Orientation::Dict, false)).unwrap();
    assert!(pristine.contains("\"sum\""));

    registry.column_sums();
    let transformed = serde_json::to_string(registry.export(Orientation::Dict, true)).unwrap();
    assert_ne!(transformed, pristine);

    let restored = serde_json::to_string(registry.export(Orientation::Dict, false)).unwrap();
    assert_eq!(restored, pristine);
}

#[test]
fn nested_metadata_survives_export() {
    let input = raw_from(json!({
        "t1": {
            "table": [["", "a"], ["r1", 1]],
            "meta": {"tags": ["x"], "origin": {"city": "A"}, "year": 2020.0}
        }
    }));
    let mut pipeline = Pipeline::new(PipelineConfig {
        metadata_filter: serde_json::from_value(json!({"year": [2020]})).unwrap(),
        ..Default::default()
    });
    let output = pipeline.run(Some(&input)).unwrap();

    assert_eq!(
        serde_json::to_value(&output["t1"].meta).unwrap(),
        json!({"tags": ["x"], "origin": {"city": "A"}, "year": 2020.0})
    );
}

#[test]
fn reset_after_export_restores_pristine_output() {
    let input = two_group_input();

    let mut registry = Registry::preprocess(Some(&input));
    let pristine = serde_json::to_string(registry.export(Orientation::Dict, false)).unwrap();

    registry.filter_rows(INDEX_COLUMN, &["r1".into()]).unwrap();
    registry.column_sums();
    let transformed = serde_json::to_string(registry.export(Orientation::Dict, true)).unwrap();
    assert_ne!(transformed, pristine);

    let restored = serde_json::to_string(registry.export(Orientation::Dict, false)).unwrap();
    assert_eq!(restored, pristine);
}

#[test]
fn export_without_reset_keeps_working_state() {
    let mut registry = Registry::preprocess(Some(&two_group_input()));
    registry.row_sums();
    let first = registry.export(Orientation::Dict, false).clone();
    let second = registry.export(Orientation::Dict, false).clone();
    assert_eq!(first, second);
    assert_eq!(registry.output(), &second);
}

#[test]
fn uninitialized_registry_exports_nothing() {
    let mut registry = Registry::default();
    registry.filter_cols(&["a".into()]);
    registry.filter_rows("a", &[Scalar::Integer(1)]).unwrap();
    registry.accumulate_sum();
    assert!(registry.export(Orientation::Dict, true).is_empty());
    assert!(!registry.is_initialized());
}

#[test]
fn orientation_is_configurable() {
    let mut pipeline = Pipeline::new(PipelineConfig {
        orientation: Orientation::Split,
        ..Default::default()
    });
    let output = pipeline.run(Some(&single_table_input())).unwrap();

    assert_eq!(
        output["t1"].table,
        json!({"index": ["r1", "r2"], "columns": ["a", "b"], "data": [[1.0, 2.0], [3.0, 0.0]]})
    );
}
