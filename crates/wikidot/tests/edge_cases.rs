//! Edge cases: name grammar over random input, shared clients.

mod common;

use common::*;
use rand::Rng;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use wikidot::{is_normal, normalize, Client, Params, Wiki};
use wiremock::MockServer;

const NAME_CHARS: &[char] = &[
    'a', 'Z', '0', '_', ':', '-', '/', ' ', '.', '!', 'é', 'ß', '\t', '日',
];

fn random_name(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(0..16);
    (0..len)
        .map(|_| NAME_CHARS[rng.gen_range(0..NAME_CHARS.len())])
        .collect()
}

#[test]
fn test_normalize_properties_on_random_input() {
    let mut rng = rand::thread_rng();
    for _ in 0..5_000 {
        let input = random_name(&mut rng);
        let out = normalize(&input);

        assert_eq!(normalize(&out), out, "idempotence for {input:?}");
        assert!(is_normal(&out, true), "normal output for {input:?}");
        assert_eq!(
            is_normal(&input, true),
            out == input,
            "predicate for {input:?}"
        );
        if input.contains('/') {
            assert!(!is_normal(&input, false));
        }

        assert!(!out.contains("::"), "{input:?} -> {out:?}");
        assert!(!out.contains("//"), "{input:?} -> {out:?}");
        assert!(!out.starts_with('-') && !out.ends_with('-'), "{input:?} -> {out:?}");
        assert!(!out.contains("-/") && !out.contains("/-"), "{input:?} -> {out:?}");
        assert!(out == "/" || !out.ends_with('/'), "{input:?} -> {out:?}");
    }
}

#[test]
fn test_client_is_shareable_across_tasks() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
    assert_send_sync::<Wiki>();
}

#[tokio::test]
async fn test_concurrent_calls_get_distinct_tokens() {
    let server = MockServer::start().await;
    mount_connector(&server, json!({"status": "ok"})).await;
    let wiki = wiki_for(&server, client_for(&server));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let wiki = wiki.clone();
            tokio::spawn(async move { wiki.module("a/A", Params::new().with("i", i)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let reqs = requests_to(&server, CONNECTOR).await;
    assert_eq!(reqs.len(), 8);
    let tokens: HashSet<String> = reqs
        .iter()
        .map(|r| form(r)["wikidot_token7"].clone())
        .collect();
    assert_eq!(tokens.len(), 8);
    for req in &reqs {
        let token = &form(req)["wikidot_token7"];
        assert_eq!(cookie(req), format!("wikidot_token7={token}"));
    }
}

#[tokio::test]
async fn test_login_is_visible_through_every_wiki_handle() {
    let server = MockServer::start().await;
    mount_login_success(&server).await;
    mount_connector(&server, json!({"status": "ok"})).await;

    let client = Arc::new(client_for(&server));
    let first = Wiki::new(client.clone(), &server.uri()).unwrap();
    let second = Wiki::new(client.clone(), &format!("{}/", server.uri())).unwrap();

    client.login("alice", "hunter2").await.unwrap();
    first.module("a/A", Params::new()).await.unwrap();
    second.action("B", Params::new()).await.unwrap();

    for req in requests_to(&server, CONNECTOR).await {
        assert!(cookie(&req).starts_with(SESSION_COOKIE));
    }
}
