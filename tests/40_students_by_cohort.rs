mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

async fn create(client: &reqwest::Client, url: String, payload: &Value) -> Result<Value> {
    let res = client.post(url).json(payload).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json::<Value>().await?)
}

#[tokio::test]
async fn cohort_lookup_is_scoped_and_expands_the_reference() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique_tag();

    let cohorts_url = format!("{}/api/cohorts", server.base_url);
    let students_url = format!("{}/api/students", server.base_url);

    let cohort_c = create(&client, cohorts_url.clone(), &common::cohort_payload(&format!("{}-c", tag))).await?;
    let cohort_d = create(&client, cohorts_url.clone(), &common::cohort_payload(&format!("{}-d", tag))).await?;
    let c_id = cohort_c["id"].as_str().expect("id");
    let d_id = cohort_d["id"].as_str().expect("id");

    let mut s1 = common::student_payload(&format!("{}-s1", tag));
    s1["cohort"] = cohort_c["id"].clone();
    let mut s2 = common::student_payload(&format!("{}-s2", tag));
    s2["cohort"] = cohort_c["id"].clone();
    let mut s3 = common::student_payload(&format!("{}-s3", tag));
    s3["cohort"] = cohort_d["id"].clone();

    let s1 = create(&client, students_url.clone(), &s1).await?;
    let s2 = create(&client, students_url.clone(), &s2).await?;
    let s3 = create(&client, students_url.clone(), &s3).await?;

    let res = client
        .get(format!("{}/api/students/cohort/{}", server.base_url, c_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let members = res.json::<Value>().await?;
    let members = members.as_array().expect("array response");

    let ids: Vec<&str> = members
        .iter()
        .map(|m| m["id"].as_str().expect("member id"))
        .collect();
    assert!(ids.contains(&s1["id"].as_str().unwrap()));
    assert!(ids.contains(&s2["id"].as_str().unwrap()));
    assert!(!ids.contains(&s3["id"].as_str().unwrap()));

    // Each member carries the full cohort record, not just its id
    for member in members {
        assert_eq!(member["cohort"], cohort_c, "cohort not expanded: {}", member);
    }

    // The other cohort only sees its own student
    let res = client
        .get(format!("{}/api/students/cohort/{}", server.base_url, d_id))
        .send()
        .await?;
    let members = res.json::<Value>().await?;
    let ids: Vec<String> = members
        .as_array()
        .expect("array response")
        .iter()
        .map(|m| m["id"].as_str().expect("member id").to_string())
        .collect();
    assert_eq!(ids, vec![s3["id"].as_str().unwrap().to_string()]);

    Ok(())
}

#[tokio::test]
async fn unknown_cohort_yields_empty_array() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let absent = uuid::Uuid::new_v4();
    let res = client
        .get(format!("{}/api/students/cohort/{}", server.base_url, absent))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, Value::Array(vec![]));

    Ok(())
}

#[tokio::test]
async fn malformed_cohort_id_is_404_envelope() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/students/cohort/not-an-id", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "fail");

    Ok(())
}

#[tokio::test]
async fn deleting_the_cohort_leaves_students_with_null_reference() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let tag = common::unique_tag();

    let cohort = create(
        &client,
        format!("{}/api/cohorts", server.base_url),
        &common::cohort_payload(&tag),
    )
    .await?;
    let cohort_id = cohort["id"].as_str().expect("id");

    let mut student = common::student_payload(&tag);
    student["cohort"] = cohort["id"].clone();
    let student = create(&client, format!("{}/api/students", server.base_url), &student).await?;

    // Weak reference: no cascade on cohort delete
    client
        .delete(format!("{}/api/cohorts/{}", server.base_url, cohort_id))
        .send()
        .await?;

    let res = client
        .get(format!("{}/api/students/cohort/{}", server.base_url, cohort_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let members = res.json::<Value>().await?;
    let members = members.as_array().expect("array response");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"], student["id"]);
    assert_eq!(members[0]["cohort"], Value::Null);

    Ok(())
}
