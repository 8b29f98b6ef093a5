use db::pg::PgDatabase;
use db::{EventQuery, Repositories};
use db_test_fixture::DbFixture;
use normalizer::{Event, EventAction};

fn event(request_id: &str, action: EventAction, timestamp: &str) -> Event {
    Event {
        request_id: request_id.into(),
        author: "octocat".into(),
        action,
        from_branch: String::new(),
        to_branch: "main".into(),
        timestamp: timestamp.into(),
    }
}

#[tokio::test]
async fn events_append_and_list_newest_timestamp_first() -> anyhow::Result<()> {
    let fixture = match DbFixture::from_env() {
        Ok(fixture) => fixture,
        Err(err) => {
            eprintln!("skipping events_append_and_list_newest_timestamp_first: {err}");
            return Ok(());
        }
    };
    let handle = fixture.create("events_list").await?;
    let database = handle.database();
    let events = database.events();

    events
        .insert(&event("a", EventAction::Push, "1st April 2021 - 9:30 PM UTC"))
        .await?;
    events
        .insert(&event("b", EventAction::Merge, "2nd April 2021 - 9:30 PM UTC"))
        .await?;
    // Same request id again: deliveries are not de-duplicated.
    events
        .insert(&event("a", EventAction::Push, "1st April 2021 - 9:30 PM UTC"))
        .await?;

    let rows = events.list_recent(EventQuery::default()).await?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].request_id, "b");
    assert_eq!(rows[0].action, "MERGE");
    assert!(rows[1].id > rows[2].id, "ties fall back to newest insert");

    let limited = events.list_recent(EventQuery { limit: Some(1) }).await?;
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].clone().into_event().action, EventAction::Merge);

    drop(database);
    handle.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn connect_migrates_and_answers_ping() -> anyhow::Result<()> {
    let fixture = match DbFixture::from_env() {
        Ok(fixture) => fixture,
        Err(err) => {
            eprintln!("skipping connect_migrates_and_answers_ping: {err}");
            return Ok(());
        }
    };
    let handle = fixture.create_unmigrated("events_ping").await?;

    let database = PgDatabase::connect(&handle.database_config()).await?;
    database.ping().await?;
    let rows = database.events().list_recent(EventQuery::default()).await?;
    assert!(rows.is_empty());

    drop(database);
    handle.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn listing_sorts_timestamps_byte_wise() -> anyhow::Result<()> {
    let fixture = match DbFixture::from_env() {
        Ok(fixture) => fixture,
        Err(err) => {
            eprintln!("skipping listing_sorts_timestamps_byte_wise: {err}");
            return Ok(());
        }
    };
    let handle = fixture.create("events_collate").await?;
    let database = handle.database();
    let events = database.events();

    // Locale collations put "B" after "a"; byte order puts it before.
    events.insert(&event("upper", EventAction::Push, "B")).await?;
    events.insert(&event("lower", EventAction::Push, "a")).await?;
    events.insert(&event("digit", EventAction::Push, "9th")).await?;

    let rows = events.list_recent(EventQuery::default()).await?;
    let order: Vec<_> = rows.iter().map(|row| row.request_id.as_str()).collect();
    assert_eq!(order, ["lower", "upper", "digit"]);

    drop(database);
    handle.cleanup().await?;
    Ok(())
}
