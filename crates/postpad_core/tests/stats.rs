use chrono::{Duration, TimeZone, Utc};
use postpad_core::db::open_db_in_memory;
use postpad_core::repo::account_repo::SqliteAccountRepository;
use postpad_core::repo::draft_repo::SqliteDraftRepository;
use postpad_core::repo::post_repo::{PostRepository, SqlitePostRepository};
use postpad_core::repo::streak_repo::SqliteStreakRepository;
use postpad_core::repo::tag_repo::SqliteTagRepository;
use postpad_core::repo::todo_repo::SqliteTodoRepository;
use postpad_core::service::draft_service::DraftService;
use postpad_core::service::stats_service::{Stats, StatsService};
use postpad_core::service::streak_service::StreakTracker;
use postpad_core::service::tag_service::TagService;
use postpad_core::service::todo_service::TodoService;
use postpad_core::{
    AuthService, FixedClock, Priority, PublishedPost, ReferenceZone, SystemClock,
};

#[test]
fn fetch_stats_counts_every_collection() {
    let conn = open_db_in_memory().unwrap();
    let session = AuthService::new(SqliteAccountRepository::try_new(&conn).unwrap())
        .sign_up("ada@example.com", "secret1", &SystemClock)
        .unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 18, 0, 0).unwrap();
    let clock = FixedClock(now);
    let zone = ReferenceZone::utc();

    let drafts = DraftService::new(
        SqliteDraftRepository::try_new(&conn, &session).unwrap(),
        &session,
        &clock,
    );
    drafts.save_draft("one").unwrap();
    drafts.save_draft("two").unwrap();

    let posts = SqlitePostRepository::try_new(&conn, &session).unwrap();
    posts
        .append_post(&PublishedPost::new(session.user_id(), "hi", "x-1", now))
        .unwrap();

    let tracker = StreakTracker::new(
        SqliteStreakRepository::try_new(&conn, &session).unwrap(),
        &session,
    );
    tracker
        .record_post(zone.date_of(now - Duration::days(1)))
        .unwrap();
    tracker.record_post(zone.date_of(now)).unwrap();

    let tag_service = TagService::new(
        SqliteTagRepository::try_new(&conn, &session).unwrap(),
        &session,
    );
    tag_service.add_tag("work").unwrap();

    let tag_repo = SqliteTagRepository::try_new(&conn, &session).unwrap();
    let todos = TodoService::new(
        SqliteTodoRepository::try_new(&conn, &session).unwrap(),
        &tag_repo,
        &session,
        &clock,
    );
    let done = todos.add_todo("done", Priority::Low).unwrap();
    todos.add_todo("open", Priority::Low).unwrap();
    todos.toggle_todo(done.id).unwrap();

    let draft_repo = SqliteDraftRepository::try_new(&conn, &session).unwrap();
    let streak_repo = SqliteStreakRepository::try_new(&conn, &session).unwrap();
    let todo_repo = SqliteTodoRepository::try_new(&conn, &session).unwrap();
    let stats = StatsService {
        drafts: &draft_repo,
        posts: &posts,
        streaks: &streak_repo,
        todos: &todo_repo,
        tags: &tag_repo,
        clock: &clock,
        zone,
    };

    assert_eq!(
        stats.fetch_stats().unwrap(),
        Stats {
            drafts: 2,
            published_posts: 1,
            current_streak: 2,
            open_todos: 1,
            completed_todos: 1,
            tags: 1,
        }
    );

    let two_days_later = FixedClock(now + Duration::days(2));
    let stale = StatsService {
        clock: &two_days_later,
        ..stats
    };
    assert_eq!(stale.fetch_stats().unwrap().current_streak, 0);
}
