//! GitHub events collector integration tests against a mock API server.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leaderboard::collectors::{Collector, CollectorContext};
use leaderboard::collectors::github_events::GithubEventsCollector;
use leaderboard::config::OrgConfig;
use leaderboard::db::init_in_memory;
use leaderboard::repositories::{ActivityDefinitionRepository, ActivityRepository, ContributorRepository};

fn org_config() -> OrgConfig {
    OrgConfig {
        name: "Example Org".to_string(),
        description: "Example".to_string(),
        url: "https://example.org".to_string(),
        logo_url: "https://example.org/logo.png".to_string(),
        start_date: None,
        socials: Default::default(),
    }
}

fn repo_json(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "full_name": format!("example/{name}"),
        "archived": false
    })
}

fn pr_opened_event(login: &str, url: &str) -> serde_json::Value {
    json!({
        "type": "PullRequestEvent",
        "actor": {"login": login},
        "created_at": "2024-06-10T12:00:00Z",
        "payload": {
            "action": "opened",
            "pull_request": {
                "number": 7,
                "title": "Add feature",
                "html_url": url,
                "created_at": "2024-06-10T12:00:00Z",
                "merged_at": null,
                "user": {"login": login}
            }
        }
    })
}

async fn mount_empty_page_two(server: &MockServer, repo: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/example/{repo}/events")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn one_failing_repo_does_not_abort_the_collector() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/example/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([repo_json("repo-x"), repo_json("repo-y")])),
        )
        .mount(&mock_server)
        .await;

    // repo-x is broken upstream
    Mock::given(method("GET"))
        .and(path("/repos/example/repo-x/events"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    mount_empty_page_two(&mock_server, "repo-y").await;
    Mock::given(method("GET"))
        .and(path("/repos/example/repo-y/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([pr_opened_event(
            "alice",
            "https://github.com/example/repo-y/pull/7"
        )])))
        .mount(&mock_server)
        .await;

    let db = init_in_memory().await.unwrap();
    let config = json!({"org": "example", "api_base": mock_server.uri()});
    let org = org_config();
    let ctx = CollectorContext {
        db: &db,
        config: &config,
        org: &org,
        since: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    };

    let collector = GithubEventsCollector::new();
    collector.setup(&ctx).await.unwrap();
    // repo-y's activity lands despite repo-x failing
    collector.scrape(&ctx).await.unwrap();

    let activities = ActivityRepository::new(&db).get_all().await.unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].contributor, "alice");
    assert_eq!(activities[0].activity_definition, "pr_opened");
}

#[tokio::test]
async fn rescraping_the_same_window_stays_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/example/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo_json("repo-y")])))
        .mount(&mock_server)
        .await;
    mount_empty_page_two(&mock_server, "repo-y").await;
    Mock::given(method("GET"))
        .and(path("/repos/example/repo-y/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([pr_opened_event(
            "alice",
            "https://github.com/example/repo-y/pull/7"
        )])))
        .mount(&mock_server)
        .await;

    let db = init_in_memory().await.unwrap();
    let config = json!({"org": "example", "api_base": mock_server.uri()});
    let org = org_config();
    let ctx = CollectorContext {
        db: &db,
        config: &config,
        org: &org,
        since: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    };

    let collector = GithubEventsCollector::new();
    collector.setup(&ctx).await.unwrap();
    collector.scrape(&ctx).await.unwrap();
    collector.scrape(&ctx).await.unwrap();

    let repo = ActivityRepository::new(&db);
    assert_eq!(repo.count().await.unwrap(), 1);
    // The NULL override resolves to the seeded pr_opened default
    let row = repo.get_all().await.unwrap().remove(0);
    assert_eq!(row.points, None);
    let def = ActivityDefinitionRepository::new(&db)
        .get_by_slug("pr_opened")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(def.points, Some(5));
}

#[tokio::test]
async fn discovered_usernames_become_stub_contributors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/example/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo_json("repo-y")])))
        .mount(&mock_server)
        .await;
    mount_empty_page_two(&mock_server, "repo-y").await;
    Mock::given(method("GET"))
        .and(path("/repos/example/repo-y/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([pr_opened_event(
            "newcomer",
            "https://github.com/example/repo-y/pull/9"
        )])))
        .mount(&mock_server)
        .await;

    let db = init_in_memory().await.unwrap();
    let config = json!({"org": "example", "api_base": mock_server.uri()});
    let org = org_config();
    let ctx = CollectorContext {
        db: &db,
        config: &config,
        org: &org,
        since: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    };

    let collector = GithubEventsCollector::new();
    collector.setup(&ctx).await.unwrap();
    collector.scrape(&ctx).await.unwrap();

    let newcomer = ContributorRepository::new(&db)
        .get_by_username("newcomer")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(newcomer.name, None);
    assert_eq!(newcomer.role, None);
}
