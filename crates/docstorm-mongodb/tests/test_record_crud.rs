//! Record CRUD behaviour against the in-memory backend.

mod common;

use common::{init_tracing, random_string, user, User};
use docstorm_mongodb::{
    is_valid_object_id, Cursor, Filter, MemoryBackend, Record, StormError,
};
use std::collections::HashMap;
use tokio_test::assert_ok;

fn backend() -> MemoryBackend {
    init_tracing();
    MemoryBackend::new("perfect_testing")
}

#[tokio::test]
async fn test_save_new() {
    let backend = backend();
    let mut obj = user("No ID Specified", "Y");
    assert_ok!(obj.save(&backend).await);
    assert!(is_valid_object_id(&obj.model.id));
}

#[tokio::test]
async fn test_save_new_with_id() {
    let backend = backend();
    let mut first = user("ID was specified", "Y");
    first.model.id = first.new_uuid();
    let mut second = user("ID was specified", "Y");
    second.model.id = second.new_object_id();

    for obj in [&mut first, &mut second] {
        assert_ok!(obj.save(&backend).await);
    }

    let docs = backend.documents("perfect_testing", "users");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].get_str("_id").unwrap(), first.model.id);
    assert_eq!(docs[1].get_object_id("_id").unwrap().to_hex(), second.model.id);
}

#[tokio::test]
async fn test_save_update() {
    let backend = backend();
    for make_id in [docstorm_mongodb::new_uuid, docstorm_mongodb::new_object_id] {
        let mut obj = user("X for update", "Y");
        obj.model.id = make_id();
        obj.save(&backend).await.unwrap();

        obj.model.firstname = "A updated".to_string();
        obj.model.lastname = "B".to_string();
        obj.save(&backend).await.unwrap();
        assert!(!obj.model.id.is_empty());

        let mut fetched: Record<User> = Record::default();
        fetched.get_by_id(&backend, &obj.model.id).await.unwrap();
        assert_eq!(fetched.results.cursor.total_records, 1);
        assert_eq!(fetched.model.firstname, "A updated");
        assert_eq!(fetched.model.lastname, "B");
    }
}

#[tokio::test]
async fn test_save_without_id_twice_updates_same_document() {
    let backend = backend();
    let mut obj = user("first", "save");
    obj.save(&backend).await.unwrap();
    let assigned = obj.model.id.clone();

    obj.model.firstname = "second".to_string();
    obj.save(&backend).await.unwrap();

    assert_eq!(obj.model.id, assigned);
    let docs = backend.documents("perfect_testing", "users");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get_str("firstname").unwrap(), "second");
}

#[tokio::test]
async fn test_get_by_passing_id() {
    let backend = backend();
    for make_id in [docstorm_mongodb::new_uuid, docstorm_mongodb::new_object_id] {
        let mut obj = user("X", "Y");
        obj.model.id = make_id();
        obj.save(&backend).await.unwrap();

        let mut obj2: Record<User> = Record::default();
        obj2.get_by_id(&backend, &obj.model.id).await.unwrap();

        assert_eq!(obj.model.id, obj2.model.id);
        assert_eq!(obj.model.firstname, obj2.model.firstname);
        assert_eq!(obj.model.lastname, obj2.model.lastname);
    }
}

#[tokio::test]
async fn test_get_by_passing_id_no_record() {
    let backend = backend();
    let mut obj: Record<User> = Record::default();
    obj.get(&backend).await.unwrap();
    assert_eq!(obj.results.cursor.total_records, 0);
    assert_eq!(backend.find_calls(), 0);
}

#[tokio::test]
async fn test_get_by_non_existing_id() {
    let backend = backend();
    let mut obj = user("", "");
    obj.model.id = "funkyid".to_string();
    obj.get(&backend).await.unwrap();
    assert_eq!(obj.results.cursor.total_records, 0);
    assert!(obj.results.is_empty());
    assert_eq!(obj.model.id, "funkyid");
}

#[tokio::test]
async fn test_delete() {
    let backend = backend();
    let mut obj = user("Mister", "PotatoHead");
    obj.model.id = random_string(12);
    obj.model.email = "potato@example.com".to_string();
    obj.save(&backend).await.unwrap();

    assert_ok!(obj.delete(&backend).await);
    assert!(backend.documents("perfect_testing", "users").is_empty());
    assert_eq!(backend.remove_calls(), 1);
}

#[tokio::test]
async fn test_delete_object_id() {
    let backend = backend();
    let mut obj = user("Mister", "PotatoHead");
    obj.model.id = obj.new_object_id();
    obj.save(&backend).await.unwrap();

    obj.delete(&backend).await.unwrap();
    assert!(backend.documents("perfect_testing", "users").is_empty());
}

#[tokio::test]
async fn test_delete_without_id() {
    let backend = backend();
    let mut obj = user("Mister", "PotatoHead");
    let err = obj.delete(&backend).await.unwrap_err();
    assert!(matches!(err, StormError::MissingId));
    assert_eq!(backend.remove_calls(), 0);
}

#[tokio::test]
async fn test_delete_rejected_by_driver() {
    let backend = backend();
    let mut obj = user("Mister", "PotatoHead");
    obj.model.id = random_string(12);
    obj.save(&backend).await.unwrap();

    backend.fail_writes(Some("not authorized"));
    let err = obj.delete(&backend).await.unwrap_err();
    assert!(matches!(
        &err,
        StormError::WriteFailed { operation: "Delete", status } if status == "not authorized"
    ));
    assert_eq!(backend.documents("perfect_testing", "users").len(), 1);
}

#[tokio::test]
async fn test_find_zero() {
    let backend = backend();
    let mut obj: Record<User> = Record::default();
    let filter = Filter::new().equals("firstname", random_string(12));
    obj.find(&backend, &filter, Cursor::default()).await.unwrap();
    assert!(obj.results.rows.is_empty());
    assert_eq!(obj.results.cursor.total_records, 0);
}

#[tokio::test]
async fn test_find_one_populates_model() {
    let backend = backend();
    let rand = random_string(12);
    let mut obj = user(&rand, "PotatoHead");
    obj.model.id = random_string(12);
    obj.model.email = "potato@example.com".to_string();
    obj.save(&backend).await.unwrap();
    user("someone", "else").save(&backend).await.unwrap();

    let mut obj_find: Record<User> = Record::default();
    obj_find
        .find(&backend, &Filter::new().equals("firstname", rand.as_str()), Cursor::default())
        .await
        .unwrap();

    assert_eq!(obj_find.results.rows.len(), 1);
    assert_eq!(obj_find.model, obj.model);
}

#[tokio::test]
async fn test_find_multiple_conditions() {
    let backend = backend();
    user("Ann", "Lee").save(&backend).await.unwrap();
    user("Ann", "Kim").save(&backend).await.unwrap();
    user("Bob", "Lee").save(&backend).await.unwrap();

    let mut obj: Record<User> = Record::default();
    let filter: Filter = vec![("firstname", "Ann"), ("lastname", "Lee")]
        .into_iter()
        .collect();
    obj.find(&backend, &filter, Cursor::default()).await.unwrap();
    assert_eq!(obj.results.len(), 1);
    assert_eq!(obj.model.lastname, "Lee");
}

#[tokio::test]
async fn test_find_all() {
    let backend = backend();
    for i in 0..5 {
        user(&format!("user{}", i), "All").save(&backend).await.unwrap();
    }

    let mut obj: Record<User> = Record::default();
    obj.find_all(&backend, Cursor::default()).await.unwrap();
    assert_eq!(obj.results.rows.len(), 5);
    assert_eq!(obj.results.cursor.total_records, 5);

    let names: Vec<String> = obj
        .rows()
        .unwrap()
        .into_iter()
        .map(|u| u.firstname)
        .collect();
    assert_eq!(names, vec!["user0", "user1", "user2", "user3", "user4"]);
}

#[tokio::test]
async fn test_find_all_paginated() {
    let backend = backend();
    for i in 0..5 {
        user(&format!("user{}", i), "Page").save(&backend).await.unwrap();
    }

    let mut obj: Record<User> = Record::default();
    obj.find_all(&backend, Cursor::new(2, 2).batch_size(2))
        .await
        .unwrap();

    let names: Vec<String> = obj.rows().unwrap().into_iter().map(|u| u.firstname).collect();
    assert_eq!(names, vec!["user2", "user3"]);
    assert_eq!(obj.results.cursor.total_records, 2);
}

#[tokio::test]
async fn test_get_by_id_after_paginated_find() {
    let backend = backend();
    let mut ids = Vec::new();
    for i in 0..5 {
        let mut obj = user(&format!("user{}", i), "Page");
        obj.save(&backend).await.unwrap();
        ids.push(obj.model.id);
    }

    let mut obj: Record<User> = Record::default();
    obj.find_all(&backend, Cursor::new(2, 2)).await.unwrap();
    assert_eq!(obj.results.rows.len(), 2);

    obj.get_by_id(&backend, &ids[0]).await.unwrap();
    assert_eq!(obj.results.rows.len(), 1);
    assert_eq!(obj.model.id, ids[0]);
    assert_eq!(obj.model.firstname, "user0");
}

#[tokio::test]
async fn test_array_data() {
    let backend = backend();
    let pseudonyms: Vec<String> = ["Santa", "SantaClaus", "SC", "Potato", "Not Potato", "What else?"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut obj: Record<User> = Record::default();
    let id = obj.new_object_id();
    obj.model.id = id.clone();
    obj.model.pseudonyms = pseudonyms.clone();
    obj.save(&backend).await.unwrap();

    let mut fetched: Record<User> = Record::default();
    fetched.model.id = id;
    fetched.get(&backend).await.unwrap();
    assert_eq!(fetched.model.pseudonyms, pseudonyms);
}

#[tokio::test]
async fn test_dictionary_data() {
    let backend = backend();
    let data: HashMap<String, String> = [("Foo", "Bar"), ("True", "False"), ("Yellow", "Potato")]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut obj: Record<User> = Record::default();
    let id = obj.new_object_id();
    obj.model.id = id.clone();
    obj.model.data = data.clone();
    obj.save(&backend).await.unwrap();

    let mut fetched: Record<User> = Record::default();
    fetched.model.id = id;
    fetched.get(&backend).await.unwrap();
    assert_eq!(fetched.model.data, data);
}

#[tokio::test]
async fn test_save_rejected_by_driver() {
    let backend = backend();
    backend.fail_writes(Some("E11000 duplicate key error"));

    let mut obj = user("dup", "licate");
    obj.model.id = "dup".to_string();
    let err = obj.save(&backend).await.unwrap_err();
    assert_eq!(err.to_string(), "MongoDB Save error: E11000 duplicate key error");
    assert!(err.is_mapping_error());
}
