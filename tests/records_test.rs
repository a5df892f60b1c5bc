use coopbook::prelude::*;
use coopbook::error::GENERIC_FAILURE_NOTICE;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "user-access-token";

fn book(server: &MockServer) -> CoopBook {
    let config = CoopBookConfig::new(&server.uri(), "test-anon-key").unwrap();
    CoopBook::new(config).unwrap()
}

fn session(user_id: Uuid) -> SessionContext {
    SessionContext::new(
        TOKEN,
        "refresh-token",
        CurrentUser {
            id: user_id,
            email: Some("farmer@example.com".to_string()),
        },
    )
}

fn coop_row(id: Uuid, user_id: Uuid, name: &str, capacity: i32) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "name": name,
        "capacity": capacity,
        "created_at": "2024-03-01T08:00:00+00:00",
        "updated_at": "2024-03-01T08:00:00+00:00"
    })
}

fn sale_row(id: Uuid, egg_count: i32, price_per_unit: f64, status: &str) -> Value {
    json!({
        "id": id,
        "date": "2024-03-02",
        "egg_count": egg_count,
        "price_per_unit": price_per_unit,
        "total": f64::from(egg_count) * price_per_unit,
        "customer": null,
        "status": status,
        "created_at": "2024-03-02T09:00:00+00:00"
    })
}

#[tokio::test]
async fn test_list_coops_is_scoped_to_the_session_user() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();
    let coop = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/coops"))
        .and(query_param("user_id", format!("eq.{}", user)))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", "test-anon-key"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([coop_row(coop, user, "Kandang A", 500)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let coops = book(&server)
        .coops()
        .list(&session(user), &ListFilter::new())
        .await
        .unwrap();

    assert_eq!(coops.len(), 1);
    assert_eq!(coops[0].id, coop);
    assert_eq!(coops[0].name, "Kandang A");
    assert_eq!(coops[0].capacity, 500);
}

#[tokio::test]
async fn test_empty_list_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/health_records"))
        .and(query_param("order", "date.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let rows = book(&server)
        .health_records()
        .list(&session(Uuid::new_v4()), &ListFilter::new())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_create_coop_injects_the_owner() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();
    let coop = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/coops"))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!({
            "name": "Kandang B",
            "capacity": 250,
            "user_id": user
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([coop_row(coop, user, "Kandang B", 250)])))
        .expect(1)
        .mount(&server)
        .await;

    let created = book(&server)
        .coops()
        .create(
            &session(user),
            &CoopDraft {
                name: "Kandang B".to_string(),
                capacity: 250,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, coop);
    assert_eq!(created.user_id, user);
}

#[tokio::test]
async fn test_invalid_draft_never_reaches_the_store() {
    let server = MockServer::start().await;

    let err = book(&server)
        .coops()
        .create(
            &session(Uuid::new_v4()),
            &CoopDraft {
                name: "Kandang C".to_string(),
                capacity: -5,
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.user_message(), "capacity must be greater than zero");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sale_total_is_written_on_create_and_update() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();
    let sale = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/sales"))
        .and(body_json(json!({
            "date": "2024-03-02",
            "egg_count": 1000,
            "price_per_unit": 2.0,
            "total": 2000.0,
            "customer": null,
            "status": "completed",
            "user_id": user
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([sale_row(sale, 1000, 2.0, "completed")])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/sales"))
        .and(query_param("id", format!("eq.{}", sale)))
        .and(query_param("user_id", format!("eq.{}", user)))
        .and(body_json(json!({
            "date": "2024-03-02",
            "egg_count": 1200,
            "price_per_unit": 2.5,
            "total": 3000.0,
            "customer": null,
            "status": "completed"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([sale_row(sale, 1200, 2.5, "completed")])))
        .expect(1)
        .mount(&server)
        .await;

    let book = book(&server);
    let session = session(user);
    let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();

    let draft = SaleForm {
        egg_count: "1000".to_string(),
        price_per_unit: "2".to_string(),
        ..Default::default()
    }
    .into_draft(today)
    .unwrap();
    let created = book.sales().create(&session, &draft).await.unwrap();
    assert_eq!(created.total, f64::from(created.egg_count) * created.price_per_unit);

    let draft = SaleDraft {
        egg_count: 1200,
        price_per_unit: 2.5,
        ..draft
    };
    let updated = book.sales().update(&session, sale, &draft).await.unwrap();
    assert_eq!(updated.total, 3000.0);
    assert_eq!(updated.total, f64::from(updated.egg_count) * updated.price_per_unit);
}

#[tokio::test]
async fn test_update_of_missing_row_is_not_found() {
    let server = MockServer::start().await;
    let coop = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/coops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = book(&server)
        .coops()
        .update(
            &session(Uuid::new_v4()),
            coop,
            &CoopDraft {
                name: "Kandang A".to_string(),
                capacity: 100,
            },
        )
        .await
        .unwrap_err();

    match err {
        Error::NotFound { table, id } => {
            assert_eq!(table, "coops");
            assert_eq!(id, coop.to_string());
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deleting_a_batch_with_production_rows_is_refused() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();
    let chicken = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/chickens"))
        .and(query_param("id", format!("eq.{}", chicken)))
        .and(query_param("user_id", format!("eq.{}", user)))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23503",
            "message": "update or delete on table \"chickens\" violates foreign key constraint \"fk_egg_production_chicken_id\" on table \"egg_production\"",
            "details": format!("Key (id)=({}) is still referenced from table \"egg_production\".", chicken),
            "hint": null
        })))
        .expect(2)
        .mount(&server)
        .await;

    let book = book(&server);
    let session = session(user);

    // The same request is refused the same way every time.
    for _ in 0..2 {
        let err = book.chickens().delete(&session, chicken).await.unwrap_err();
        match &err {
            Error::StillReferenced { table, id } => {
                assert_eq!(*table, "chickens");
                assert_eq!(*id, chicken.to_string());
            }
            other => panic!("expected StillReferenced, got {:?}", other),
        }
        assert!(!err.requires_sign_in());
    }
}

#[tokio::test]
async fn test_delete_of_missing_row_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    book(&server)
        .feed()
        .delete(&session(Uuid::new_v4()), Uuid::new_v4())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_count_without_rows() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();

    Mock::given(method("HEAD"))
        .and(path("/rest/v1/coops"))
        .and(query_param("user_id", format!("eq.{}", user)))
        .and(header("Prefer", "count=exact"))
        .respond_with(ResponseTemplate::new(200).insert_header("Content-Range", "*/0"))
        .expect(1)
        .mount(&server)
        .await;

    let total = book(&server)
        .coops()
        .count(&session(user), &ListFilter::new())
        .await
        .unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_window_and_equality_filters() {
    let server = MockServer::start().await;
    let chicken = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/egg_production"))
        .and(query_param("date", "gte.2024-03-01"))
        .and(query_param("date", "lte.2024-03-08"))
        .and(query_param("chicken_id", format!("eq.{}", chicken)))
        .and(query_param("order", "date.asc"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "chicken_id": chicken,
                "date": "2024-03-01",
                "count": 850,
                "weight": 61.5,
                "quality": "A",
                "notes": null,
                "created_at": "2024-03-01T07:00:00+00:00"
            },
            {
                "id": Uuid::new_v4(),
                "chicken_id": chicken,
                "date": "2024-03-01T16:30:00",
                "count": 150,
                "weight": null,
                "quality": "B",
                "notes": "afternoon collection",
                "created_at": "2024-03-01T16:31:00+00:00"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let range = DateRange::new(
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        chrono::NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
    );
    let filter = ListFilter::new()
        .within(range)
        .eq("chicken_id", chicken)
        .order_by("date", SortOrder::Ascending)
        .limit(10);

    let rows = book(&server)
        .egg_production()
        .list(&session(Uuid::new_v4()), &filter)
        .await
        .unwrap();

    let buckets = coopbook::aggregate::daily_production(&rows);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].date, range.start);
    assert_eq!(buckets[0].count, 1000);
}

#[tokio::test]
async fn test_remote_failure_has_a_generic_notice() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/sales"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream timeout"))
        .mount(&server)
        .await;

    let err = book(&server)
        .sales()
        .list(&session(Uuid::new_v4()), &ListFilter::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Database(_)));
    assert_eq!(err.user_message(), GENERIC_FAILURE_NOTICE);
}

#[tokio::test]
async fn test_missing_token_is_missing_session() {
    let server = MockServer::start().await;
    let mut session = session(Uuid::new_v4());
    session.access_token.clear();

    let err = book(&server)
        .chickens()
        .list(&session, &ListFilter::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingSession));
    assert!(err.requires_sign_in());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_settings() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();
    let profile = json!({
        "id": user,
        "email": "farmer@example.com",
        "farm_name": "Berkah Farm",
        "location": null,
        "created_at": "2024-01-01T00:00:00+00:00",
        "updated_at": "2024-03-01T00:00:00+00:00"
    });

    Mock::given(method("POST"))
        .and(path("/rest/v1/profiles"))
        .and(body_json(json!({
            "id": user,
            "email": "farmer@example.com",
            "farm_name": "Berkah Farm",
            "location": null
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([profile.clone()])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", user)))
        .and(body_json(json!({ "farm_name": "Berkah Farm", "location": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([profile])))
        .expect(1)
        .mount(&server)
        .await;

    let book = book(&server);
    let session = session(user);
    let draft = ProfileDraft::from(ProfileForm {
        farm_name: " Berkah Farm ".to_string(),
        location: "".to_string(),
    });

    let created = book.profiles().create(&session, &draft).await.unwrap();
    assert_eq!(created.id, user);

    let updated = book.profiles().update(&session, &draft).await.unwrap();
    assert_eq!(updated.farm_name.as_deref(), Some("Berkah Farm"));
    assert_eq!(updated.location, None);
}

#[tokio::test]
async fn test_filter_by_egg_grade_sends_the_column_value() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/egg_production"))
        .and(query_param("quality", "eq.B"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "chicken_id": Uuid::new_v4(),
                "date": "2024-03-01",
                "count": 150,
                "weight": null,
                "quality": "B",
                "notes": null,
                "created_at": "2024-03-01T16:31:00+00:00"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = book(&server)
        .egg_production()
        .list(
            &session(Uuid::new_v4()),
            &ListFilter::new().eq("quality", EggGrade::B),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quality, EggGrade::B);
}

#[tokio::test]
async fn test_list_batches_without_a_coop() {
    let server = MockServer::start().await;
    let user = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/chickens"))
        .and(query_param("coop_id", "is.null"))
        .and(query_param("user_id", format!("eq.{}", user)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = book(&server)
        .chickens()
        .list(&session(user), &ListFilter::new().is_null("coop_id"))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_expired_session_is_refused_before_any_request() {
    let server = MockServer::start().await;
    let mut session = session(Uuid::new_v4());
    session.expires_at = Some(1);

    let err = book(&server)
        .coops()
        .list(&session, &ListFilter::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidSession(_)));
    assert!(err.requires_sign_in());
    assert!(server.received_requests().await.unwrap().is_empty());
}
