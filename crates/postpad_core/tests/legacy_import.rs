use chrono::{TimeZone, Utc};
use postpad_core::db::open_db_in_memory;
use postpad_core::migrate::{import_legacy_drafts, ImportError, ImportReport};
use postpad_core::repo::account_repo::SqliteAccountRepository;
use postpad_core::repo::draft_repo::{DraftRepository, SqliteDraftRepository};
use postpad_core::{AuthService, SystemClock};

#[test]
fn imports_every_timestamp_shape_and_skips_bad_documents() {
    let conn = open_db_in_memory().unwrap();
    let session = AuthService::new(SqliteAccountRepository::try_new(&conn).unwrap())
        .sign_up("ada@example.com", "secret1", &SystemClock)
        .unwrap();
    let drafts = SqliteDraftRepository::try_new(&conn, &session).unwrap();

    let export = format!(
        r#"[
            {{"content": "object", "createdAt": {{"seconds": 1700000000, "nanoseconds": 0}}}},
            {{"content": "admin export", "createdAt": {{"_seconds": 1700000100, "_nanoseconds": 0}}}},
            {{"content": "iso", "createdAt": "2024-01-02T03:04:05Z"}},
            {{"content": "millis", "createdAt": 1704164645000}},
            {{"content": "", "createdAt": 1704164645000}},
            {{"content": "{long}", "createdAt": 1704164645000}},
            {{"content": "no date"}},
            {{"content": "bad date", "createdAt": "last week"}}
        ]"#,
        long = "x".repeat(281)
    );

    let report = import_legacy_drafts(&drafts, &session, &export).unwrap();
    assert_eq!(
        report,
        ImportReport {
            imported: 4,
            skipped: 4
        }
    );

    let stored = drafts.list_drafts().unwrap();
    let by_content = |content: &str| {
        stored
            .iter()
            .find(|draft| draft.content == content)
            .map(|draft| draft.created_at)
            .unwrap()
    };
    assert_eq!(by_content("object"), Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    assert_eq!(
        by_content("admin export"),
        Utc.timestamp_opt(1_700_000_100, 0).unwrap()
    );
    let jan_second = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(by_content("iso"), jan_second);
    assert_eq!(by_content("millis"), jan_second);

    let stored_millis: i64 = conn
        .query_row(
            "SELECT created_at FROM drafts WHERE content = 'iso';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored_millis, 1_704_164_645_000);
}

#[test]
fn non_array_input_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let session = AuthService::new(SqliteAccountRepository::try_new(&conn).unwrap())
        .sign_up("ada@example.com", "secret1", &SystemClock)
        .unwrap();
    let drafts = SqliteDraftRepository::try_new(&conn, &session).unwrap();

    assert!(matches!(
        import_legacy_drafts(&drafts, &session, r#"{"content": "x"}"#),
        Err(ImportError::NotAnArray)
    ));
    assert!(matches!(
        import_legacy_drafts(&drafts, &session, "not json"),
        Err(ImportError::Parse(_))
    ));
}
