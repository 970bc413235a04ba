use gettr_http::{GettrClient, Params};

fn live_username() -> Option<String> {
    std::env::var("GETTR_LIVE_USERNAME")
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[tokio::test]
async fn live_user_info_and_first_posts_page() {
    let Some(username) = live_username() else {
        eprintln!("skipping live test: GETTR_LIVE_USERNAME is not set");
        return;
    };

    let client = GettrClient::new();

    let profile = client
        .get(&format!("/s/uinf/{username}"), ())
        .await
        .expect("live profile fetch must succeed");
    assert!(
        profile.get("nickname").is_some() || profile.get("username").is_some(),
        "profile payload missing expected fields: {profile}"
    );

    let mut pages = client.get_paginated(
        format!("/u/user/{username}/posts"),
        Params::from([("max", 20)]),
    );
    let first = pages
        .next_page()
        .await
        .expect("first page must be yielded")
        .expect("live posts fetch must succeed");
    assert!(
        first.get("data").is_some(),
        "posts payload missing data: {first}"
    );
}
