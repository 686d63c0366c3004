mod common;

use anyhow::Result;
use jobly_api::database::models::{Job, NewJob};
use jobly_api::database::{DatabaseError, Repository};
use jobly_api::filter::{FilterError, JobFilter};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

fn filter(key: &str, value: &str) -> JobFilter {
    JobFilter::parse(&[(key.to_string(), value.to_string())]).expect("valid filter")
}

#[tokio::test]
async fn invalid_filters_are_bad_requests() -> Result<()> {
    let server = common::spawn_app().await?;

    for query in ["title=j&minSalary=1", "company=c1", "hasEquity=maybe", "minSalary=lots"] {
        let res = reqwest::get(server.url(&format!("/jobs?{}", query))).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "query: {}", query);
    }

    let res = reqwest::get(server.url("/jobs?title=j&minSalary=1")).await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"]["message"], "Too many query parameters, please update.");
    Ok(())
}

#[tokio::test]
async fn listing_and_filters() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    common::seed(&pool).await?;
    let repo = Repository::<Job>::new(pool);

    let all = repo.find_listing().await?;
    let titles: Vec<&str> = all.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, vec!["j1", "j2", "j3"]);
    assert_eq!(all[0].company_name.as_deref(), Some("C1"));
    assert_eq!(all[1].num_employees, Some(3));

    let rich = repo.filtered(&filter("minSalary", "250000")).await?;
    let titles: Vec<&str> = rich.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, vec!["j2"]);

    let by_title = repo.filtered(&filter("title", "j3")).await?;
    assert_eq!(by_title.len(), 1);

    let with_equity = repo.filtered(&filter("hasEquity", "true")).await?;
    let titles: Vec<&str> = with_equity.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, vec!["j1", "j2"]);
    assert!(with_equity[0].equity > with_equity[1].equity);

    let without_equity = repo.filtered(&filter("hasEquity", "false")).await?;
    let titles: Vec<&str> = without_equity.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, vec!["j3"]);
    assert!(without_equity.iter().all(|j| j.equity == Some(Decimal::ZERO)));
    assert_eq!(repo.filtered(&filter("hasEquity", "")).await?, without_equity);
    Ok(())
}

#[tokio::test]
async fn no_equity_filter_with_no_match_is_an_error() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    common::seed(&pool).await?;
    let repo = Repository::<Job>::new(pool);

    let mut data = Map::new();
    data.insert("equity".into(), json!(0.01));
    for job in repo.filtered(&filter("hasEquity", "false")).await? {
        repo.update(&job.id, &data).await?;
    }

    let err = repo.filtered(&filter("hasEquity", "false")).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Filter(FilterError::NoResults)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn oversized_salary_is_a_bad_request() -> Result<()> {
    let server = common::spawn_app().await?;
    let res = reqwest::Client::new()
        .post(server.url("/jobs"))
        .bearer_auth(server.token("admin", true))
        .json(&json!({ "title": "t", "salary": 3000000000u64, "company_handle": "c1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"]["errors"][0], "instance.salary must be less than or equal to 2147483647");
    Ok(())
}

#[tokio::test]
async fn equity_round_trips_as_string() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    common::seed(&pool).await?;
    let repo = Repository::<Job>::new(pool);

    let new = NewJob {
        title: "New Job".into(),
        salary: Some(500000),
        equity: Some(0.5),
        company_handle: "c3".into(),
    };
    let job = repo.create(&new).await?;
    assert_eq!(job.company_handle, "c3");

    let fetched = repo.get(&job.id).await?;
    let value = serde_json::to_value(&fetched)?;
    assert_eq!(value["equity"], json!("0.5"));
    assert_eq!(value["salary"], json!(500000));

    let detail = repo.get_detail(job.id).await?;
    assert_eq!(detail.company_name.as_deref(), Some("C3"));
    assert_eq!(detail.company_description.as_deref(), Some("Desc3"));
    Ok(())
}

#[tokio::test]
async fn create_for_missing_company_is_rejected() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    let repo = Repository::<Job>::new(pool);

    let new = NewJob { title: "t".into(), salary: None, equity: None, company_handle: "nope".into() };
    let err = repo.create(&new).await.unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidReference(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn salary_outside_integer_range_is_an_invalid_value() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    common::seed(&pool).await?;
    let repo = Repository::<Job>::new(pool);

    let new = NewJob { title: "t".into(), salary: Some(3_000_000_000), equity: None, company_handle: "c1".into() };
    let err = repo.create(&new).await.unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidValue(_)), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn update_and_remove() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    common::seed(&pool).await?;
    let repo = Repository::<Job>::new(pool);
    let j1 = repo.filtered(&filter("title", "j1")).await?.remove(0);

    let mut data = Map::new();
    data.insert("title".into(), json!("j1 renamed"));
    data.insert("salary".into(), Value::Null);
    data.insert("equity".into(), json!(0.25));
    let updated = repo.update(&j1.id, &data).await?;
    assert_eq!(updated.title, "j1 renamed");
    assert_eq!(updated.salary, None);
    assert_eq!(serde_json::to_value(&updated)?["equity"], json!("0.25"));

    let err = repo.update(&j1.id, &Map::new()).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Filter(FilterError::NoData)));

    let err = repo.update(&0, &data).await.unwrap_err();
    assert_eq!(err.to_string(), "No job: 0");

    repo.remove(&j1.id).await?;
    assert!(matches!(repo.get_detail(j1.id).await, Err(DatabaseError::NotFound(_))));
    assert!(matches!(repo.remove(&j1.id).await, Err(DatabaseError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn job_routes_round_trip() -> Result<()> {
    let Some(pool) = common::test_pool().await? else { return Ok(()) };
    common::seed(&pool).await?;
    let server = common::spawn_with_pool(pool, common::test_config()).await?;
    let client = reqwest::Client::new();
    let admin = server.token("admin", true);

    let res = client
        .post(server.url("/jobs"))
        .bearer_auth(&admin)
        .json(&json!({ "title": "j4", "salary": 100, "equity": 0.5, "company_handle": "c2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["job"]["equity"], "0.5");
    assert_eq!(body["job"]["companyHandle"], "c2");
    let id = body["job"]["id"].as_i64().unwrap();

    let res = reqwest::get(server.url("/jobs?minSalary=250000")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(body["jobs"][0]["title"], "j2");
    assert_eq!(body["jobs"][0]["companyName"], "C3");

    let res = client
        .patch(server.url(&format!("/jobs/{}", id)))
        .bearer_auth(&admin)
        .json(&json!({ "salary": 200 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["job"]["salary"], 200);

    let res = client.delete(server.url(&format!("/jobs/{}", id))).bearer_auth(&admin).send().await?;
    assert_eq!(res.json::<Value>().await?, json!({ "deleted": id.to_string() }));

    let res = reqwest::get(server.url(&format!("/jobs/{}", id))).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = reqwest::get(server.url("/jobs/abc")).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
