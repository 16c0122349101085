/// Database scenario tests for leads, pipeline state, comments and filters
///
/// Each test registers its own executives, so tests can share one database.
/// Skipped when DATABASE_URL is not set.

use chrono::{Duration, NaiveDate, Utc};
use leadtrack_shared::db::migrations::run_migrations;
use leadtrack_shared::db::pool::{create_pool, DatabaseConfig};
use leadtrack_shared::models::comment::{Comment, NO_COMMENTS};
use leadtrack_shared::models::course::{Course, CreateCourse};
use leadtrack_shared::models::executive::{CreateExecutive, Executive, ExecutiveRole};
use leadtrack_shared::models::lead::{CreateLead, Lead, LeadError, UpdateLead};
use leadtrack_shared::models::lead_filter::LeadFilter;
use leadtrack_shared::models::pipeline::{self, PipelineState};
use leadtrack_shared::models::stats;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU32, Ordering};

static COUNTER: AtomicU32 = AtomicU32::new(0);

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 5,
        ..Default::default()
    })
    .await
    .expect("Failed to create pool");
    run_migrations(&pool).await.expect("Migrations failed");
    Some(pool)
}

async fn new_executive(pool: &PgPool) -> i64 {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let email = format!(
        "exec-{}-{}@leadtrack.test",
        Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        n
    );

    Executive::create(
        pool,
        CreateExecutive {
            name: format!("Executive {}", n),
            email,
            password_hash: "$argon2id$placeholder".to_string(),
            role: ExecutiveRole::Standard,
        },
    )
    .await
    .expect("Failed to create executive")
    .executive_id
}

async fn new_course(pool: &PgPool, name: &str) -> i64 {
    new_dated_course(pool, name, None).await
}

async fn new_dated_course(pool: &PgPool, name: &str, course_date: Option<NaiveDate>) -> i64 {
    Course::create(
        pool,
        CreateCourse {
            name: name.to_string(),
            course_date,
        },
    )
    .await
    .expect("Failed to create course")
    .course_id
}

fn lead(name: &str, city: &str, interest: i32, course_id: Option<i64>) -> CreateLead {
    CreateLead {
        name: Some(name.to_string()),
        city: Some(city.to_string()),
        phone: Some("999111222".to_string()),
        interest_level: Some(interest),
        course_id,
    }
}

#[tokio::test]
async fn test_enroll_scenario() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let course = new_course(&pool, "Excel Avanzado").await;

    let client_id = Lead::create(&pool, exec, lead("Ana", "Lima", 5, Some(course)))
        .await
        .unwrap();
    assert_eq!(
        pipeline::classify(&pool, client_id, exec).await.unwrap(),
        PipelineState::Lead
    );

    pipeline::move_to(&pool, client_id, PipelineState::Enrolled, exec)
        .await
        .unwrap();
    assert_eq!(
        pipeline::classify(&pool, client_id, exec).await.unwrap(),
        PipelineState::Enrolled
    );

    let raw = LeadFilter {
        status: Some(PipelineState::Lead),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert!(raw.iter().all(|s| s.lead.client_id != client_id));

    let enrolled = LeadFilter {
        status: Some(PipelineState::Enrolled),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0].lead.client_id, client_id);
    assert_eq!(enrolled[0].lead.course_name.as_deref(), Some("Excel Avanzado"));
    assert_eq!(enrolled[0].latest_comment, NO_COMMENTS);

    let by_course = stats::by_course(&pool, exec).await.unwrap();
    assert_eq!(by_course.len(), 1);
    assert_eq!(by_course[0].course_name, "Excel Avanzado");
    assert_eq!(by_course[0].count, 1);
}

#[tokio::test]
async fn test_move_conflicts_and_remove_twice() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let client_id = Lead::create(&pool, exec, lead("Bruno", "Cusco", 2, None))
        .await
        .unwrap();

    pipeline::move_to(&pool, client_id, PipelineState::Declined, exec)
        .await
        .unwrap();

    let again = pipeline::move_to(&pool, client_id, PipelineState::Declined, exec).await;
    assert!(matches!(again, Err(LeadError::AlreadyInState(PipelineState::Declined))));

    let across = pipeline::move_to(&pool, client_id, PipelineState::Enrolled, exec).await;
    assert!(matches!(
        across,
        Err(LeadError::InvalidTransition {
            from: PipelineState::Declined,
            to: PipelineState::Enrolled
        })
    ));

    let to_lead = pipeline::move_to(&pool, client_id, PipelineState::Lead, exec).await;
    assert!(matches!(to_lead, Err(LeadError::Validation(_))));

    pipeline::remove_from(&pool, client_id, PipelineState::Declined, exec)
        .await
        .unwrap();
    let second = pipeline::remove_from(&pool, client_id, PipelineState::Declined, exec).await;
    assert!(matches!(second, Err(LeadError::NotFound)));

    assert_eq!(
        pipeline::classify(&pool, client_id, exec).await.unwrap(),
        PipelineState::Lead
    );
}

#[tokio::test]
async fn test_listings_match_filters() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;

    let a = Lead::create(&pool, exec, lead("A", "Lima", 1, None)).await.unwrap();
    let b = Lead::create(&pool, exec, lead("B", "Arequipa", 3, None)).await.unwrap();
    Lead::create_in_state(&pool, exec, lead("C", "Lima", 0, None), PipelineState::BulkContacted)
        .await
        .unwrap();
    pipeline::move_to(&pool, a, PipelineState::Enrolled, exec).await.unwrap();

    let all = Lead::list_by_executive(&pool, exec).await.unwrap();
    let unfiltered = LeadFilter::default().execute(&pool, exec).await.unwrap();
    assert_eq!(all, unfiltered);
    assert_eq!(all.len(), 3);

    for state in PipelineState::ALL {
        let listed = pipeline::list_by_state(&pool, state, exec).await.unwrap();
        let filtered = LeadFilter {
            status: Some(state),
            ..Default::default()
        }
        .execute(&pool, exec)
        .await
        .unwrap();
        assert_eq!(listed, filtered, "state {}", state);
        assert!(listed.iter().all(|s| s.lead.pipeline_state == state));
    }

    let lima = LeadFilter {
        city: Some("Lima".to_string()),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert_eq!(lima.len(), 2);
    assert!(lima.iter().all(|s| s.lead.client_id != b));

    let zero_interest = LeadFilter {
        interest_level: Some(0),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert_eq!(zero_interest.len(), 1);

    let today = Utc::now().date_naive();
    let around_today = LeadFilter {
        created_from: Some(today - Duration::days(1)),
        created_to: Some(today + Duration::days(1)),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert_eq!(around_today.len(), 3);

    let future = LeadFilter {
        created_from: Some(today + Duration::days(2)),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert!(future.is_empty());

    let cities = Lead::distinct_cities(&pool, exec, None).await.unwrap();
    assert_eq!(cities, vec!["Arequipa".to_string(), "Lima".to_string()]);

    let bulk_cities = stats::by_city(&pool, exec, PipelineState::BulkContacted)
        .await
        .unwrap();
    assert_eq!(bulk_cities.len(), 1);
    assert_eq!(bulk_cities[0].city, "Lima");
}

#[tokio::test]
async fn test_latest_comment_resolution() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let client_id = Lead::create(&pool, exec, lead("Carla", "Piura", 4, None))
        .await
        .unwrap();

    assert_eq!(Comment::latest_for(&pool, client_id).await.unwrap(), NO_COMMENTS);

    Comment::create(&pool, client_id, exec, "first call").await.unwrap();
    Comment::create(&pool, client_id, exec, "sent brochure").await.unwrap();

    assert_eq!(
        Comment::latest_for(&pool, client_id).await.unwrap(),
        "sent brochure"
    );

    let listed = Lead::list_by_executive(&pool, exec).await.unwrap();
    assert_eq!(listed[0].latest_comment, "sent brochure");

    let comments = Comment::list_for_lead(&pool, client_id, exec).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "sent brochure");
}

#[tokio::test]
async fn test_ownership_isolation() {
    let Some(pool) = test_pool().await else { return };
    let owner = new_executive(&pool).await;
    let other = new_executive(&pool).await;
    let client_id = Lead::create(&pool, owner, lead("Diego", "Tacna", 1, None))
        .await
        .unwrap();

    assert!(matches!(Lead::get(&pool, client_id, other).await, Err(LeadError::NotFound)));
    assert!(matches!(
        Lead::update(&pool, client_id, other, UpdateLead::default()).await,
        Err(LeadError::NotFound)
    ));
    assert!(matches!(Lead::delete(&pool, client_id, other).await, Err(LeadError::NotFound)));
    assert!(matches!(
        pipeline::classify(&pool, client_id, other).await,
        Err(LeadError::NotFound)
    ));
    assert!(matches!(
        Comment::create(&pool, client_id, other, "not mine").await,
        Err(LeadError::NotFound)
    ));
    assert!(Lead::list_by_executive(&pool, other).await.unwrap().is_empty());

    // Still intact for the owner
    assert!(Lead::get(&pool, client_id, owner).await.is_ok());
}

#[tokio::test]
async fn test_partial_update() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let client_id = Lead::create(&pool, exec, lead("Elena", "Ica", 2, None))
        .await
        .unwrap();

    let updated = Lead::update(
        &pool,
        client_id,
        exec,
        UpdateLead {
            city: Some("Chiclayo".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.city, "Chiclayo");
    assert_eq!(updated.name, "Elena");
    assert_eq!(updated.interest_level, 2);
}

#[tokio::test]
async fn test_bulk_create_defaults() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;

    let count = Lead::create_bulk(
        &pool,
        exec,
        vec![
            lead("F1", "Lima", 1, None),
            CreateLead {
                name: Some("F2".to_string()),
                ..Default::default()
            },
            lead("F3", "Puno", 3, None),
        ],
    )
    .await
    .unwrap();
    assert_eq!(count, 3);

    let all = Lead::list_by_executive(&pool, exec).await.unwrap();
    assert_eq!(all.len(), 3);
    let f2 = all.iter().find(|s| s.lead.name == "F2").unwrap();
    assert_eq!(f2.lead.city, "");
    assert_eq!(f2.lead.interest_level, 0);
    assert_eq!(f2.lead.course_id, None);

    let empty = Lead::create_bulk(&pool, exec, Vec::new()).await;
    assert!(matches!(empty, Err(LeadError::Validation(_))));
}

#[tokio::test]
async fn test_delete_removes_comments() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let client_id = Lead::create(&pool, exec, lead("Gabriel", "Lima", 1, None))
        .await
        .unwrap();
    Comment::create(&pool, client_id, exec, "note").await.unwrap();

    Lead::delete(&pool, client_id, exec).await.unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE client_id = $1")
        .bind(client_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
    assert!(matches!(Lead::get(&pool, client_id, exec).await, Err(LeadError::NotFound)));
}

#[tokio::test]
async fn test_reassign() {
    let Some(pool) = test_pool().await else { return };
    let owner = new_executive(&pool).await;
    let target = new_executive(&pool).await;
    let client_id = Lead::create(&pool, owner, lead("Hugo", "Lima", 1, None))
        .await
        .unwrap();

    let missing = Lead::reassign(&pool, client_id, i64::MAX, Some(owner)).await;
    assert!(matches!(missing, Err(LeadError::InvalidExecutive(id)) if id == i64::MAX));
    assert_eq!(Lead::get(&pool, client_id, owner).await.unwrap().executive_id, owner);

    let foreign = Lead::reassign(&pool, client_id, target, Some(target)).await;
    assert!(matches!(foreign, Err(LeadError::NotFound)));

    Lead::reassign(&pool, client_id, target, Some(owner)).await.unwrap();
    assert_eq!(Lead::get(&pool, client_id, target).await.unwrap().executive_id, target);

    // Unrestricted scope moves it back
    Lead::reassign(&pool, client_id, owner, None).await.unwrap();
    assert!(Lead::get(&pool, client_id, owner).await.is_ok());
}

#[tokio::test]
async fn test_course_delete_blocked_by_leads() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let course = new_course(&pool, "Power BI").await;
    let client_id = Lead::create(&pool, exec, lead("Iris", "Lima", 1, Some(course)))
        .await
        .unwrap();

    let blocked = Course::delete(&pool, course).await;
    match blocked {
        Err(sqlx::Error::Database(db_err)) => assert!(db_err.is_foreign_key_violation()),
        other => panic!("expected foreign key violation, got {:?}", other),
    }

    Lead::delete(&pool, client_id, exec).await.unwrap();
    assert!(Course::delete(&pool, course).await.unwrap());
}

#[tokio::test]
async fn test_created_date_bounds_are_inclusive() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let client_id = Lead::create(&pool, exec, lead("Julia", "Lima", 2, None))
        .await
        .unwrap();

    // The date as the database sees it, so the session timezone cannot skew it
    let created_on: NaiveDate =
        sqlx::query_scalar("SELECT created_at::date FROM leads WHERE client_id = $1")
            .bind(client_id)
            .fetch_one(&pool)
            .await
            .unwrap();

    let same_day = LeadFilter {
        created_from: Some(created_on),
        created_to: Some(created_on),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert_eq!(same_day.len(), 1);
    assert_eq!(same_day[0].lead.client_id, client_id);

    let day_after = LeadFilter {
        created_from: Some(created_on + Duration::days(1)),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert!(day_after.is_empty());

    let day_before = LeadFilter {
        created_to: Some(created_on - Duration::days(1)),
        ..Default::default()
    }
    .execute(&pool, exec)
    .await
    .unwrap();
    assert!(day_before.is_empty());
}

#[tokio::test]
async fn test_declined_counts_by_city() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;

    for (name, city) in [("K1", "Tacna"), ("K2", "Arica"), ("K3", "Tacna")] {
        Lead::create_in_state(&pool, exec, lead(name, city, 1, None), PipelineState::Declined)
            .await
            .unwrap();
    }
    Lead::create_in_state(&pool, exec, lead("K4", "Tacna", 1, None), PipelineState::BulkContacted)
        .await
        .unwrap();
    Lead::create(&pool, exec, lead("K5", "Arica", 1, None)).await.unwrap();

    let declined = stats::by_city(&pool, exec, PipelineState::Declined)
        .await
        .unwrap();
    let counts: Vec<(&str, i64)> = declined
        .iter()
        .map(|row| (row.city.as_str(), row.count))
        .collect();
    assert_eq!(counts, vec![("Arica", 1), ("Tacna", 2)]);
}

#[tokio::test]
async fn test_course_counts_newest_course_first() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let january = new_dated_course(&pool, "Excel Basico", NaiveDate::from_ymd_opt(2024, 1, 10)).await;
    let june = new_dated_course(&pool, "SQL Inicial", NaiveDate::from_ymd_opt(2024, 6, 1)).await;

    for (name, course) in [("L1", january), ("L2", january), ("L3", june)] {
        let client_id = Lead::create(&pool, exec, lead(name, "Lima", 3, Some(course)))
            .await
            .unwrap();
        pipeline::move_to(&pool, client_id, PipelineState::Enrolled, exec)
            .await
            .unwrap();
    }
    // Raw leads do not count
    Lead::create(&pool, exec, lead("L4", "Lima", 3, Some(june))).await.unwrap();

    let by_course = stats::by_course(&pool, exec).await.unwrap();
    assert_eq!(by_course.len(), 2);
    assert_eq!(by_course[0].course_name, "SQL Inicial");
    assert_eq!(by_course[0].count, 1);
    assert_eq!(by_course[0].course_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    assert_eq!(by_course[1].course_name, "Excel Basico");
    assert_eq!(by_course[1].count, 2);
}

#[tokio::test]
async fn test_latest_comment_tie_break_on_equal_timestamps() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let client_id = Lead::create(&pool, exec, lead("Mario", "Lima", 1, None))
        .await
        .unwrap();

    let stamp = Utc::now() - Duration::minutes(5);
    let mut ids = Vec::new();
    for text in ["first at stamp", "second at stamp"] {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (client_id, text, created_at) VALUES ($1, $2, $3) RETURNING comment_id",
        )
        .bind(client_id)
        .bind(text)
        .bind(stamp)
        .fetch_one(&pool)
        .await
        .unwrap();
        ids.push(id);
    }
    assert!(ids[1] > ids[0]);

    assert_eq!(
        Comment::latest_for(&pool, client_id).await.unwrap(),
        "second at stamp"
    );

    let listed = Lead::list_by_executive(&pool, exec).await.unwrap();
    assert_eq!(listed[0].latest_comment, "second at stamp");
    let latest_at = listed[0].latest_comment_at.unwrap();
    assert!((latest_at - stamp).num_milliseconds().abs() < 1);

    let comments = Comment::list_for_lead(&pool, client_id, exec).await.unwrap();
    assert_eq!(comments[0].comment_id, ids[1]);
    assert_eq!(comments[1].comment_id, ids[0]);
}

#[tokio::test]
async fn test_update_without_course_keeps_course() {
    let Some(pool) = test_pool().await else { return };
    let exec = new_executive(&pool).await;
    let first = new_course(&pool, "Python").await;
    let second = new_course(&pool, "Tableau").await;
    let client_id = Lead::create(&pool, exec, lead("Nora", "Lima", 2, Some(first)))
        .await
        .unwrap();

    let kept = Lead::update(
        &pool,
        client_id,
        exec,
        UpdateLead {
            interest_level: Some(4),
            course_id: None,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(kept.course_id, Some(first));
    assert_eq!(kept.course_name.as_deref(), Some("Python"));

    let changed = Lead::update(
        &pool,
        client_id,
        exec,
        UpdateLead {
            course_id: Some(second),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(changed.course_id, Some(second));
    assert_eq!(changed.course_name.as_deref(), Some("Tableau"));
}
