//! Browser-flow tests for the server-rendered pages.
//!
//! Each test boots the app on an ephemeral port and drives it the way a
//! browser would: form posts, redirects, and cookies. Redirects are not
//! followed automatically so the tests can assert on them.

use huddle::config::Config;
use huddle::db;
use huddle::state::AppState;
use huddle::{community, post};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use tempfile::TempDir;

async fn spawn_app() -> (TempDir, String, huddle::state::DbPool) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let pool = db::create_pool(&db_path).expect("Failed to create test database");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let mut config = Config::default();
    config.database.path = Some(db_path);
    config.storage.path = Some(temp_dir.path().join("uploads"));

    let app = huddle::app(AppState {
        db: pool.clone(),
        config,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (temp_dir, format!("http://{}", addr), pool)
}

fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

// Registers through the form, leaving the client signed in.
async fn sign_up(client: &Client, base: &str, username: &str) {
    let response = client
        .post(format!("{}/register", base))
        .form(&[
            ("username", username),
            ("email", &format!("{}@example.com", username)),
            ("password", "hunter2b22"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

async fn page_text(client: &Client, url: &str) -> String {
    let response = client.get(url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.text().await.unwrap()
}

#[tokio::test]
async fn test_signed_out_writes_redirect_to_login_and_change_nothing() {
    let (_tmp, base, pool) = spawn_app().await;
    let client = browser();

    let c = community::repository::create(&pool, "Trail Runners", "").unwrap();

    let response = client
        .post(format!("{}/community/{}/join", base, c.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // Nothing was written
    let found = community::repository::find(&pool, &c.id).unwrap();
    assert!(found.members.is_empty());

    // The login page explains why the browser ended up there
    let body = page_text(&client, &format!("{}/login", base)).await;
    assert!(body.contains("You must be signed in to perform this action."));
}

#[tokio::test]
async fn test_register_join_and_one_shot_flash() {
    let (_tmp, base, pool) = spawn_app().await;
    let client = browser();

    sign_up(&client, &base, "maya").await;

    // The welcome note shows once on the home page
    let body = page_text(&client, &base).await;
    assert!(body.contains("Welcome, maya!"));
    assert!(body.contains("Welcome back, maya!"), "header greets the signed-in user");

    let c = community::repository::create(&pool, "Trail Runners", "Weekend runs").unwrap();

    let response = client
        .post(format!("{}/community/{}/join", base, c.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/community/{}", c.id));

    let url = format!("{}/community/{}", base, c.id);
    let body = page_text(&client, &url).await;
    assert!(body.contains("You have joined the community!"));
    assert!(body.contains("maya"), "roster should list the new member");
    assert!(body.contains("Leave community"));

    // Reloading does not repeat the flash
    let body = page_text(&client, &url).await;
    assert!(!body.contains("You have joined the community!"));

    // Leaving flips the page back
    client
        .post(format!("{}/community/{}/leave", base, c.id))
        .send()
        .await
        .unwrap();
    let body = page_text(&client, &url).await;
    assert!(body.contains("You have left the community."));
    assert!(body.contains("Join community"));
}

#[tokio::test]
async fn test_liking_twice_shows_the_already_liked_note() {
    let (_tmp, base, pool) = spawn_app().await;
    let client = browser();

    sign_up(&client, &base, "maya").await;

    let c = community::repository::create(&pool, "Climbers", "").unwrap();
    client
        .post(format!("{}/community/{}/join", base, c.id))
        .send()
        .await
        .unwrap();

    client
        .post(format!("{}/community/{}/posts", base, c.id))
        .form(&[("content", "Sent my first V4 today"), ("image", "")])
        .send()
        .await
        .unwrap();

    let url = format!("{}/community/{}", base, c.id);
    let body = page_text(&client, &url).await;
    assert!(body.contains("Sent my first V4 today"));
    assert!(body.contains("0 likes"));

    let p = &post::repository::list_for_community(&pool, &c.id).unwrap()[0];

    client
        .post(format!("{}/community/{}/posts/{}/like", base, c.id, p.id))
        .send()
        .await
        .unwrap();
    let body = page_text(&client, &url).await;
    assert!(body.contains("1 like"));

    // The second attempt is refused and the count holds
    client
        .post(format!("{}/community/{}/posts/{}/like", base, c.id, p.id))
        .send()
        .await
        .unwrap();
    let body = page_text(&client, &url).await;
    assert!(body.contains("already liked this post."));
    assert!(body.contains("1 like"));
}

#[tokio::test]
async fn test_edit_and_delete_community_flow() {
    let (_tmp, base, pool) = spawn_app().await;
    let client = browser();

    let c = community::repository::create(&pool, "Boxers", "Sparring nights").unwrap();

    // Edit mode prefills the form
    let body = page_text(&client, &format!("{}/community/{}?edit=1", base, c.id)).await;
    assert!(body.contains(r#"value="Boxers""#));
    assert!(body.contains("Save changes"));

    let response = client
        .post(format!("{}/community/{}/edit", base, c.id))
        .form(&[("name", "Kickboxers"), ("description", "Tuesdays and Thursdays")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), format!("/community/{}", c.id));

    let body = page_text(&client, &format!("{}/community/{}", base, c.id)).await;
    assert!(body.contains("Community updated successfully!"));
    assert!(body.contains("Kickboxers"));
    assert!(body.contains("Tuesdays and Thursdays"));

    // Delete lands on home with a confirmation note
    let response = client
        .post(format!("{}/community/{}/delete", base, c.id))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/");

    let body = page_text(&client, &base).await;
    assert!(body.contains("Community deleted successfully!"));
    assert!(!body.contains("Kickboxers"));

    let response = client
        .get(format!("{}/community/{}", base, c.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_home_page_lists_communities() {
    let (_tmp, base, pool) = spawn_app().await;
    let client = browser();

    community::repository::create(&pool, "Trail Runners", "").unwrap();
    let c = community::repository::create(&pool, "Climbers", "").unwrap();
    community::repository::join(&pool, &c.id, "maya").unwrap();

    let body = page_text(&client, &base).await;
    assert!(body.contains("Trail Runners"));
    assert!(body.contains("Climbers"));
    assert!(body.contains("0 members"));
    assert!(body.contains("1 member"));
    assert!(body.contains("Find a training partner"));
}

#[tokio::test]
async fn test_creating_a_community_from_the_home_page() {
    let (_tmp, base, pool) = spawn_app().await;
    let client = browser();

    let response = client
        .post(format!("{}/communities", base))
        .form(&[("name", "Rowers"), ("description", "On the water at dawn")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let body = page_text(&client, &base).await;
    assert!(body.contains("Rowers"));

    let all = community::repository::list_all(&pool).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].description, "On the water at dawn");
}

#[tokio::test]
async fn test_logout_clears_the_session() {
    let (_tmp, base, _pool) = spawn_app().await;
    let client = browser();

    sign_up(&client, &base, "carlos").await;

    let body = page_text(&client, &base).await;
    assert!(body.contains("carlos"));
    assert!(body.contains("Log out"));

    let response = client.post(format!("{}/logout", base)).send().await.unwrap();
    assert_eq!(location(&response), "/login");

    let body = page_text(&client, &base).await;
    assert!(body.contains("Sign in"));
    assert!(!body.contains("Log out"));
}
