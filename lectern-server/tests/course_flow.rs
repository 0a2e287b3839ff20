use anyhow::Result;
use axum::http::StatusCode;
use axum_test::TestServer;
use lectern_core::api::routes::{utils::replace_param, utils::replace_params, v1};
use lectern_model::{ContentKind, ItemFields, UserId};
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;

use support::{actor_header, as_actor, build_test_app};

async fn post_as(server: &TestServer, path: &str, actor: UserId, body: Value) -> (StatusCode, Value) {
    let response = server
        .post(path)
        .add_header(actor_header(), as_actor(actor))
        .json(&body)
        .await;
    (response.status_code(), response.json())
}

fn data_id(body: &Value) -> String {
    body["data"]["id"]
        .as_str()
        .unwrap_or_else(|| panic!("response carries an id: {body}"))
        .to_string()
}

#[tokio::test]
async fn instructor_builds_and_student_studies_a_course() -> Result<()> {
    let app = build_test_app()?;
    let server = &app.server;
    let author = UserId::new();
    let student = UserId::new();

    let (status, subject) = post_as(
        server,
        v1::subjects::COLLECTION,
        author,
        json!({ "title": "Mathematics", "slug": "mathematics" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, course) = post_as(
        server,
        v1::courses::COLLECTION,
        author,
        json!({
            "subject_id": subject["data"]["id"],
            "title": "Linear algebra",
            "slug": "linear-algebra",
            "overview": "Vectors and matrices",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = data_id(&course);

    let modules_path = replace_param(v1::courses::MODULES, "{id}", &course_id);
    let mut module_ids = Vec::new();
    for (expected, title) in ["Vectors", "Matrices"].into_iter().enumerate() {
        let (status, module) =
            post_as(server, &modules_path, author, json!({ "title": title })).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(module["data"]["position"], json!(expected));
        module_ids.push(data_id(&module));
    }

    let video_path = replace_params(
        v1::modules::CREATE_CONTENT,
        &[("{id}", module_ids[0].as_str()), ("{kind}", "video")],
    );
    let (status, video) = post_as(
        server,
        &video_path,
        author,
        json!({ "title": "Dot product", "url": "https://example.com/watch?v=dot" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(video["data"]["kind"], "video");
    assert_eq!(video["data"]["position"], 0);

    let contents_path = replace_param(v1::courses::CONTENTS, "{id}", &course_id);
    server
        .get(&contents_path)
        .add_header(actor_header(), as_actor(student))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let enroll_path = replace_param(v1::courses::ENROLL, "{id}", &course_id);
    let (status, _) = post_as(server, &enroll_path, student, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let enrolled: Value = server
        .get(v1::courses::ENROLLED)
        .add_header(actor_header(), as_actor(student))
        .await
        .json();
    assert_eq!(enrolled["data"][0]["id"], json!(course_id));

    let contents = server
        .get(&contents_path)
        .add_header(actor_header(), as_actor(student))
        .await;
    contents.assert_status_ok();
    let contents: Value = contents.json();
    assert_eq!(contents["data"]["modules"][0]["title"], "Vectors");
    assert_eq!(contents["data"]["modules"][1]["title"], "Matrices");
    assert_eq!(contents["data"]["modules"][0]["contents"][0]["title"], "Dot product");

    let study: Value = server
        .get(&replace_param(v1::courses::STUDY, "{id}", &course_id))
        .add_header(actor_header(), as_actor(student))
        .await
        .json();
    assert_eq!(study["data"]["current"]["title"], "Vectors");

    let second = replace_params(
        v1::courses::STUDY_MODULE,
        &[("{id}", course_id.as_str()), ("{module_id}", module_ids[1].as_str())],
    );
    let study: Value = server
        .get(&second)
        .add_header(actor_header(), as_actor(student))
        .await
        .json();
    assert_eq!(study["data"]["current"]["title"], "Matrices");
    Ok(())
}

#[tokio::test]
async fn only_the_owner_may_delete_a_course() -> Result<()> {
    let app = build_test_app()?;
    let author = UserId::new();
    let course = support::seed_course(&app.state, author, "deletable").await?;
    support::seed_modules(&app.state, &course, author, &["one"]).await?;
    let item = replace_param(v1::courses::ITEM, "{id}", course.id.to_string());

    app.server
        .delete(&item)
        .add_header(actor_header(), as_actor(UserId::new()))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .delete(&item)
        .add_header(actor_header(), as_actor(author))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let missing = app.server.get(&item).await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let error: Value = missing.json();
    assert_eq!(error["error"]["status"], 404);
    assert!(app.state.service().list_modules(course.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn module_contents_are_hidden_from_outsiders() -> Result<()> {
    let app = build_test_app()?;
    let author = UserId::new();
    let outsider = UserId::new();
    let course = support::seed_course(&app.state, author, "hidden").await?;
    let module = support::seed_modules(&app.state, &course, author, &["exam"]).await?.remove(0);
    app.state
        .service()
        .create_content(
            module.id,
            ContentKind::Text,
            ItemFields {
                title: "answers".into(),
                content: Some("exam key".into()),
                ..Default::default()
            },
            author,
        )
        .await?;
    let path = replace_param(v1::modules::CONTENTS, "{id}", module.id.to_string());

    app.server
        .get(&path)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let denied = app
        .server
        .get(&path)
        .add_header(actor_header(), as_actor(outsider))
        .await;
    denied.assert_status(StatusCode::FORBIDDEN);
    assert!(!denied.text().contains("exam key"));

    app.server
        .get(&path)
        .add_header(actor_header(), as_actor(author))
        .await
        .assert_status_ok();

    app.state.service().enroll(course.id, outsider).await?;
    let listed: Value = app
        .server
        .get(&path)
        .add_header(actor_header(), as_actor(outsider))
        .await
        .json();
    assert_eq!(listed["data"][0]["title"], "answers");
    Ok(())
}

#[tokio::test]
async fn unknown_content_kind_is_a_bad_request() -> Result<()> {
    let app = build_test_app()?;
    let author = UserId::new();
    let course = support::seed_course(&app.state, author, "kinds").await?;
    let module = support::seed_modules(&app.state, &course, author, &["m"]).await?.remove(0);
    let module_id = module.id.to_string();

    let path = replace_params(
        v1::modules::CREATE_CONTENT,
        &[("{id}", module_id.as_str()), ("{kind}", "podcast")],
    );
    let (status, body) = post_as(&app.server, &path, author, json!({ "title": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], 400);
    Ok(())
}

#[tokio::test]
async fn health_is_public() {
    let app = build_test_app().expect("test app");
    let response = app.server.get(v1::HEALTH).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}
