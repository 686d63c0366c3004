mod common;

use anyhow::Result;
use jobly_api::database::models::{NewUser, User};
use jobly_api::database::{DatabaseError, Repository};
use reqwest::StatusCode;
use serde_json::{json, Map, Value};

fn new_user(username: &str, is_admin: bool) -> NewUser {
    NewUser {
        username: username.into(),
        password: "password1".into(),
        first_name: "First".into(),
        last_name: "Last".into(),
        email: format!("{}@email.com", username),
        is_admin,
    }
}

#[tokio::test]
async fn register_and_authenticate() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    let repo = Repository::<User>::new(pool);

    let user = repo.register(&new_user("u1", false)).await?;
    assert_eq!(user.username, "u1");
    assert!(!user.is_admin);

    let err = repo.register(&new_user("u1", true)).await.unwrap_err();
    assert!(matches!(&err, DatabaseError::Duplicate(msg) if msg == "Duplicate username: u1"), "{:?}", err);

    assert_eq!(repo.authenticate("u1", "password1").await?, Some(user));
    assert_eq!(repo.authenticate("u1", "wrong").await?, None);
    assert_eq!(repo.authenticate("nope", "password1").await?, None);
    Ok(())
}

#[tokio::test]
async fn password_update_is_hashed() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    let repo = Repository::<User>::new(pool.clone());
    repo.register(&new_user("u1", false)).await?;

    let mut data = Map::new();
    data.insert("password".into(), json!("new-password"));
    data.insert("firstName".into(), json!("Renamed"));
    let updated = repo.update_user("u1", data).await?;
    assert_eq!(updated.first_name, "Renamed");

    let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE username = 'u1'")
        .fetch_one(&pool)
        .await?;
    assert!(stored.starts_with("$argon2"));
    assert!(repo.authenticate("u1", "new-password").await?.is_some());
    assert!(repo.authenticate("u1", "password1").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn auth_routes_issue_tokens() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    let server = common::spawn_with_pool(pool, common::test_config()).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/auth/register"))
        .json(&json!({
            "username": "new",
            "password": "password",
            "firstName": "Test",
            "lastName": "Tester",
            "email": "test@test.com",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let token = res.json::<Value>().await?["token"].as_str().unwrap().to_string();
    let claims = server.state.jwt.verify(&token)?;
    assert_eq!(claims.username, "new");
    assert!(!claims.is_admin);

    let res = client
        .post(server.url("/auth/token"))
        .json(&json!({ "username": "new", "password": "password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(server.url("/auth/token"))
        .json(&json!({ "username": "new", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?["error"]["message"], "Invalid username/password");

    // self may read, others may not
    let res = client.get(server.url("/users/new")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["user"]["email"], "test@test.com");

    let res = client.get(server.url("/users/new")).bearer_auth(server.token("other", false)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_manages_users() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    let server = common::spawn_with_pool(pool, common::test_config()).await?;
    let client = reqwest::Client::new();
    let admin = server.token("admin", true);

    let res = client
        .post(server.url("/users"))
        .bearer_auth(&admin)
        .json(&json!({
            "username": "boss",
            "password": "password",
            "firstName": "B",
            "lastName": "Oss",
            "email": "boss@test.com",
            "isAdmin": true,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["user"]["isAdmin"], true);
    assert!(server.state.jwt.verify(body["token"].as_str().unwrap())?.is_admin);

    let res = client.get(server.url("/users")).bearer_auth(&admin).send().await?;
    assert_eq!(res.json::<Value>().await?["users"].as_array().unwrap().len(), 1);

    let res = client
        .patch(server.url("/users/boss"))
        .bearer_auth(&admin)
        .json(&json!({ "lastName": "Renamed" }))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["user"]["lastName"], "Renamed");

    let res = client.delete(server.url("/users/boss")).bearer_auth(&admin).send().await?;
    assert_eq!(res.json::<Value>().await?, json!({ "deleted": "boss" }));

    let res = client.get(server.url("/users/boss")).bearer_auth(&admin).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
