//! Store snapshots feeding the classifier engine

use probabilitas_classifiers::evaluate;
use probabilitas_core::AttributeId;
use probabilitas_store::{NewProject, ProjectStore};

fn store_with_project() -> (ProjectStore, probabilitas_core::ProjectId) {
    let store = ProjectStore::new();
    let project = store
        .create_project(NewProject {
            title: "Laptop faults".to_string(),
            description: None,
            x_label: "Symptom".to_string(),
            y_label: "Fault".to_string(),
            x_count: 3,
            y_count: 2,
        })
        .unwrap();
    (store, project.id)
}

#[test]
fn test_snapshot_evaluates_like_reference() {
    let (store, id) = store_with_project();
    let ws = store.workspace(id).unwrap();
    let (y1, y2) = (ws.classes[0].id, ws.classes[1].id);
    let (x1, x2) = (ws.attributes[0].id, ws.attributes[1].id);

    store.upsert_training(id, y1, x1, true).unwrap();
    store.upsert_training(id, y1, x2, false).unwrap();
    store.upsert_training(id, y2, x2, false).unwrap();

    let snapshot = store.project_snapshot(id).unwrap();
    let result = evaluate(
        &snapshot.classes,
        &snapshot.attributes,
        &snapshot.associations,
        &[x1, x2],
    )
    .unwrap();

    assert_eq!(result.results[0].class_id, y1);
    assert!((result.results[0].percentage - 90.0).abs() < 1e-9);
    assert!((result.results[1].percentage - 10.0).abs() < 1e-9);
}

#[test]
fn test_added_class_changes_uniform_prior() {
    let (store, id) = store_with_project();
    let x1 = store.workspace(id).unwrap().attributes[0].id;

    let before = store.project_snapshot(id).unwrap();
    let result = evaluate(&before.classes, &before.attributes, &before.associations, &[x1]).unwrap();
    assert!((result.class_frequencies[0].prior - 0.5).abs() < 1e-12);

    store.add_class(id, "Battery").unwrap();
    store.add_class(id, "Fan").unwrap();

    let after = store.project_snapshot(id).unwrap();
    let result = evaluate(&after.classes, &after.attributes, &after.associations, &[x1]).unwrap();
    assert!(result
        .class_frequencies
        .iter()
        .all(|f| (f.prior - 0.25).abs() < 1e-12));
}

#[test]
fn test_deleted_project_attribute_is_foreign() {
    let (store, id) = store_with_project();
    let (other_store_id, stale): (_, AttributeId) = {
        let other = store
            .create_project(NewProject {
                title: "Other".to_string(),
                description: None,
                x_label: "A".to_string(),
                y_label: "B".to_string(),
                x_count: 1,
                y_count: 1,
            })
            .unwrap();
        let attr = store.workspace(other.id).unwrap().attributes[0].id;
        (other.id, attr)
    };
    store.delete_project(other_store_id).unwrap();

    let snapshot = store.project_snapshot(id).unwrap();
    let err = evaluate(
        &snapshot.classes,
        &snapshot.attributes,
        &snapshot.associations,
        &[stale],
    )
    .unwrap_err();
    assert!(matches!(err, probabilitas_core::Error::Validation(_)));
}
