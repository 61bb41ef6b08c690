// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project board tests against a mock forge
//!
//! Covers:
//! 1. Reading projects - live fetch, shallow fetch, listing
//! 2. Migration - order of creation, card content resolution
//! 3. Clearing - every column deleted, first failure aborts

use forgeyard::client::{Credentials, ForgeClient};
use forgeyard::error::ForgeError;
use forgeyard::migrate::{clear_project, migrate};
use forgeyard::pages::WalkOptions;
use forgeyard::projects::{for_each_org_project, get_project};
use forgeyard::types::{Card, Column, Project};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

// =============================================================================
// Test Helpers
// =============================================================================

fn client_for(server: &ServerGuard) -> ForgeClient {
    ForgeClient::new(
        server.url(),
        Credentials {
            username: "forgeyard".into(),
            token: "test-token".into(),
        },
    )
    .unwrap()
}

/// Page `page` of a card listing
fn cards_page(server: &mut ServerGuard, column_id: u64, page: u32, body: serde_json::Value) -> Mock {
    server
        .mock(
            "GET",
            Matcher::Regex(format!(r"^/projects/columns/{column_id}/cards(\?|$)")),
        )
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("per_page".into(), "100".into()),
            Matcher::UrlEncoded("page".into(), page.to_string()),
        ]))
        .with_status(200)
        .with_body(body.to_string())
        .create()
}

fn created(server: &mut ServerGuard, path: &str, payload: serde_json::Value, id: u64) -> Mock {
    server
        .mock("POST", path)
        .match_body(Matcher::Json(payload))
        .with_status(201)
        .with_body(json!({"id": id, "html_url": format!("https://example.test/{id}")}).to_string())
        .expect(1)
        .create()
}

fn source_project(columns: Vec<Column>) -> Project {
    Project {
        id: 1,
        name: "Roadmap".into(),
        body: Some("Q3 plans".into()),
        state: "open".into(),
        html_url: "https://example.test/orgs/acme/projects/1".into(),
        columns,
    }
}

fn column(id: u64, name: &str, cards: Vec<Card>) -> Column {
    Column {
        id,
        name: name.into(),
        cards,
    }
}

fn note(id: u64, text: &str) -> Card {
    Card {
        id,
        note: Some(text.into()),
        content_url: None,
    }
}

fn content(id: u64, url: String) -> Card {
    Card {
        id,
        note: None,
        content_url: Some(url),
    }
}

// =============================================================================
// Reading projects
// =============================================================================

#[test]
fn test_get_project_with_columns_and_cards() {
    let mut server = Server::new();
    let _project = server
        .mock("GET", "/projects/1")
        .with_status(200)
        .with_body(json!({"id": 1, "name": "Roadmap", "body": "Q3 plans", "state": "open"}).to_string())
        .create();
    let _columns = server
        .mock("GET", "/projects/1/columns")
        .with_status(200)
        .with_body(json!([{"id": 10, "name": "To do"}, {"id": 11, "name": "Done"}]).to_string())
        .create();
    let _c10p1 = cards_page(&mut server, 10, 1, json!([{"id": 100, "note": "first"}, {"id": 101, "note": "second"}]));
    let _c10p2 = cards_page(&mut server, 10, 2, json!([]));
    let _c11p1 = cards_page(&mut server, 11, 1, json!([]));

    let client = client_for(&server);
    let project = get_project(&client, "1", false).unwrap().unwrap();

    assert_eq!(project.name, "Roadmap");
    let names: Vec<_> = project.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["To do", "Done"]);
    let notes: Vec<_> = project.columns[0]
        .cards
        .iter()
        .map(|c| c.note.as_deref().unwrap())
        .collect();
    assert_eq!(notes, vec!["first", "second"]);
    assert!(project.columns[1].cards.is_empty());
}

#[test]
fn test_shallow_fetch_skips_columns() {
    let mut server = Server::new();
    let _project = server
        .mock("GET", "/projects/1")
        .with_status(200)
        .with_body(json!({"id": 1, "name": "Roadmap", "state": "open"}).to_string())
        .create();
    let columns = server.mock("GET", "/projects/1/columns").expect(0).create();

    let client = client_for(&server);
    let project = get_project(&client, "1", true).unwrap().unwrap();

    assert!(project.columns.is_empty());
    columns.assert();
}

#[test]
fn test_missing_project_is_none() {
    let mut server = Server::new();
    let _project = server.mock("GET", "/projects/404").with_status(404).create();

    let client = client_for(&server);
    assert!(get_project(&client, "404", false).unwrap().is_none());
}

#[test]
fn test_columns_must_answer_ok() {
    let mut server = Server::new();
    let _project = server
        .mock("GET", "/projects/1")
        .with_status(200)
        .with_body(json!({"id": 1, "name": "Roadmap", "state": "open"}).to_string())
        .create();
    let _columns = server
        .mock("GET", "/projects/1/columns")
        .with_status(410)
        .with_body(r#"{"message":"Projects (classic) has been deprecated"}"#)
        .create();

    let client = client_for(&server);
    let err = get_project(&client, "1", false).unwrap_err();
    assert!(matches!(err, ForgeError::UnexpectedStatus { .. }));
}

#[test]
fn test_list_projects_skips_closed() {
    let mut server = Server::new();
    let _p1 = server
        .mock("GET", Matcher::Regex(r"^/orgs/acme/projects(\?|$)".into()))
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(
            json!([
                {"id": 1, "name": "Roadmap", "state": "open"},
                {"id": 2, "name": "Legacy", "state": "closed"},
                {"id": 3, "name": "Triage", "state": "open"}
            ])
            .to_string(),
        )
        .create();
    let _p2 = server
        .mock("GET", Matcher::Regex(r"^/orgs/acme/projects(\?|$)".into()))
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_body("[]")
        .create();

    let client = client_for(&server);
    let mut seen = Vec::new();
    let summary = for_each_org_project(
        &client,
        "acme",
        WalkOptions {
            skip_archived: true,
            limit: None,
        },
        |project| {
            seen.push(project.name);
            Ok(())
        },
    )
    .unwrap();

    assert_eq!(seen, vec!["Roadmap", "Triage"]);
    assert_eq!(summary.skipped, 1);
}

// =============================================================================
// Migration
// =============================================================================

#[test]
fn test_migrate_to_new_project() {
    let mut server = Server::new();
    let issue_url = format!("{}/repos/acme/widget/issues/7", server.url());
    let source = source_project(vec![
        column(10, "To do", vec![note(100, "write docs")]),
        column(11, "Done", vec![content(101, issue_url)]),
    ]);

    let project = created(
        &mut server,
        "/orgs/acme/projects",
        json!({"name": "Roadmap", "body": "Q3 plans"}),
        2,
    );
    let todo = created(&mut server, "/projects/2/columns", json!({"name": "To do"}), 20);
    let done = created(&mut server, "/projects/2/columns", json!({"name": "Done"}), 21);
    let issue = server
        .mock("GET", "/repos/acme/widget/issues/7")
        .with_status(200)
        .with_body(json!({"id": 7007, "number": 7}).to_string())
        .expect(1)
        .create();
    let note_card = created(
        &mut server,
        "/projects/columns/20/cards",
        json!({"note": "write docs"}),
        200,
    );
    let content_card = created(
        &mut server,
        "/projects/columns/21/cards",
        json!({"content_id": 7007, "content_type": "Issue"}),
        201,
    );

    let client = client_for(&server);
    let report = migrate(&client, &source, None, "acme").unwrap();

    assert_eq!(report.source, 1);
    assert_eq!(report.destination, 2);
    assert!(report.created_project);
    assert_eq!(report.columns_created, 2);
    assert_eq!(report.cards_created, 2);
    project.assert();
    todo.assert();
    done.assert();
    issue.assert();
    note_card.assert();
    content_card.assert();
}

#[test]
fn test_migrate_to_existing_project_with_pull_request() {
    let mut server = Server::new();
    let pull_url = format!("{}/repos/acme/widget/pulls/8", server.url());
    let source = source_project(vec![column(10, "Review", vec![content(100, pull_url)])]);

    let no_project = server.mock("POST", "/orgs/acme/projects").expect(0).create();
    let review = created(&mut server, "/projects/99/columns", json!({"name": "Review"}), 30);
    let _pull = server
        .mock("GET", "/repos/acme/widget/pulls/8")
        .with_status(200)
        .with_body(json!({"id": 8008, "number": 8}).to_string())
        .create();
    let card = created(
        &mut server,
        "/projects/columns/30/cards",
        json!({"content_id": 8008, "content_type": "PullRequest"}),
        300,
    );

    let client = client_for(&server);
    let report = migrate(&client, &source, Some(99), "").unwrap();

    assert_eq!(report.destination, 99);
    assert!(!report.created_project);
    assert_eq!(report.cards_created, 1);
    no_project.assert();
    review.assert();
    card.assert();
}

#[test]
fn test_failed_write_aborts_migration() {
    let mut server = Server::new();
    let source = source_project(vec![
        column(10, "To do", vec![note(100, "write docs")]),
        column(11, "Done", vec![]),
    ]);

    let _column = server
        .mock("POST", "/projects/5/columns")
        .with_status(422)
        .with_body(r#"{"message":"Validation Failed"}"#)
        .expect(1)
        .create();
    let cards = server.mock("POST", "/projects/columns/20/cards").expect(0).create();

    let client = client_for(&server);
    let err = migrate(&client, &source, Some(5), "acme").unwrap_err();

    match err {
        ForgeError::UnexpectedStatus { expected, actual, .. } => {
            assert_eq!(expected.as_u16(), 201);
            assert_eq!(actual.as_u16(), 422);
        }
        other => panic!("unexpected error: {other}"),
    }
    cards.assert();
}

#[test]
fn test_card_without_payload_is_fatal() {
    let mut server = Server::new();
    let source = source_project(vec![column(
        10,
        "To do",
        vec![Card {
            id: 100,
            note: Some(String::new()),
            content_url: None,
        }],
    )]);
    let _column = created(&mut server, "/projects/5/columns", json!({"name": "To do"}), 20);

    let client = client_for(&server);
    let err = migrate(&client, &source, Some(5), "acme").unwrap_err();
    assert!(matches!(err, ForgeError::EmptyCard(100)));
}

// =============================================================================
// Clearing
// =============================================================================

fn three_columns(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/projects/7/columns")
        .with_status(200)
        .with_body(
            json!([
                {"id": 70, "name": "To do"},
                {"id": 71, "name": "Doing"},
                {"id": 72, "name": "Done"}
            ])
            .to_string(),
        )
        .create()
}

#[test]
fn test_clear_deletes_every_column() {
    let mut server = Server::new();
    let _columns = three_columns(&mut server);
    let deletes: Vec<Mock> = [70, 71, 72]
        .iter()
        .map(|id| {
            server
                .mock("DELETE", format!("/projects/columns/{id}").as_str())
                .with_status(204)
                .expect(1)
                .create()
        })
        .collect();

    let client = client_for(&server);
    assert_eq!(clear_project(&client, 7).unwrap(), 3);
    for delete in &deletes {
        delete.assert();
    }
}

#[test]
fn test_clear_aborts_on_first_failed_delete() {
    let mut server = Server::new();
    let _columns = three_columns(&mut server);
    let first = server
        .mock("DELETE", "/projects/columns/70")
        .with_status(204)
        .expect(1)
        .create();
    let second = server
        .mock("DELETE", "/projects/columns/71")
        .with_status(404)
        .expect(1)
        .create();
    let third = server
        .mock("DELETE", "/projects/columns/72")
        .with_status(204)
        .expect(0)
        .create();

    let client = client_for(&server);
    let err = clear_project(&client, 7).unwrap_err();

    assert!(matches!(err, ForgeError::UnexpectedStatus { .. }));
    first.assert();
    second.assert();
    third.assert();
}
