//! Integration tests for the bootcamp and course lifecycle.

use serde_json::{Value, json};

use campfinder_integration_tests::{TestApp, error_code, error_message};

const ADD_BOOTCAMP: &str = r"
    mutation($input: NewBootcampInput!) {
        addNewBootcamp(input: $input) {
            id name slug address averageCost
            location { type coordinates city zipcode }
            careers
            user { email }
        }
    }";

const ADD_COURSE: &str = r"
    mutation($input: NewCourseInput!) {
        addNewCourse(input: $input) { id title tuition subject bootcamp { id } }
    }";

const BOOTCAMP_COST: &str = r"
    query($id: ID!) { bootcamp(id: $id) { averageCost } }";

fn bootcamp_input(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Full stack web development bootcamp",
        "website": "https://devworks.com",
        "phone": "6175551234",
        "email": "enroll@devworks.com",
        "address": "233 Bay State Rd Boston MA 02215",
        "careers": ["WEB_DEVELOPMENT", "UI_UX", "BUSINESS"],
        "housing": true,
        "jobAssistance": true,
    })
}

fn course_input(bootcamp_id: &str, title: &str, tuition: f64, credits: i32) -> Value {
    json!({
        "bootcampId": bootcamp_id,
        "title": title,
        "description": "Learn the basics",
        "weeks": "8",
        "tuition": tuition,
        "minimumSkill": "BEGINNER",
        "scholarshipAvailable": false,
        "credits": credits,
        "subject": "WEB_DEVELOPMENT",
    })
}

async fn add_bootcamp(app: &TestApp, token: &str, name: &str) -> String {
    let body = app
        .graphql(ADD_BOOTCAMP, json!({"input": bootcamp_input(name)}), Some(token))
        .await;
    body["data"]["addNewBootcamp"]["id"]
        .as_str()
        .unwrap_or_else(|| panic!("bootcamp creation failed: {body}"))
        .to_owned()
}

async fn add_course(app: &TestApp, token: &str, input: Value) -> String {
    let body = app.graphql(ADD_COURSE, json!({"input": input}), Some(token)).await;
    body["data"]["addNewCourse"]["id"]
        .as_str()
        .unwrap_or_else(|| panic!("course creation failed: {body}"))
        .to_owned()
}

// ============================================================================
// Bootcamps
// ============================================================================

#[tokio::test]
async fn test_publisher_creates_bootcamp_with_derived_fields() {
    let app = TestApp::new();
    let token = app.register("Pat", "pat@devworks.com", "publisher").await;

    let body = app
        .graphql(ADD_BOOTCAMP, json!({"input": bootcamp_input("Devworks Bootcamp")}), Some(&token))
        .await;
    let bootcamp = &body["data"]["addNewBootcamp"];

    assert_eq!(bootcamp["slug"], "devworks-bootcamp");
    assert_eq!(bootcamp["address"], "233 Bay State Rd, Boston, MA 02215-1405, US");
    assert_eq!(bootcamp["location"]["type"], "Point");
    assert_eq!(bootcamp["location"]["city"], "Boston");
    assert_eq!(bootcamp["location"]["coordinates"][0], -71.105_18);
    assert_eq!(bootcamp["averageCost"], Value::Null);
    assert_eq!(bootcamp["user"]["email"], "pat@devworks.com");
}

#[tokio::test]
async fn test_plain_user_cannot_create_bootcamp() {
    let app = TestApp::new();
    let token = app.register("Uma", "uma@email.com", "user").await;

    let body = app
        .graphql(ADD_BOOTCAMP, json!({"input": bootcamp_input("Devworks")}), Some(&token))
        .await;

    assert_eq!(error_message(&body), Some("Not Authorised!"));
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_publisher_owns_at_most_one_bootcamp() {
    let app = TestApp::new();
    let token = app.register("Pat", "pat@devworks.com", "publisher").await;
    add_bootcamp(&app, &token, "Devworks").await;

    let body = app
        .graphql(ADD_BOOTCAMP, json!({"input": bootcamp_input("Codemasters")}), Some(&token))
        .await;

    assert_eq!(error_code(&body), Some("OWNERSHIP_CONFLICT"));
}

#[tokio::test]
async fn test_only_owner_updates_bootcamp() {
    let app = TestApp::new();
    let owner = app.register("Pat", "pat@devworks.com", "publisher").await;
    let rival = app.register("Rex", "rex@codemasters.com", "publisher").await;
    let id = add_bootcamp(&app, &owner, "Devworks").await;

    let update = r"mutation($id: ID!, $input: BootcampUpdateInput!) {
        updateBootcamp(id: $id, input: $input) { name slug website housing }
    }";

    let body = app
        .graphql(update, json!({"id": id, "input": {"name": "Hijacked"}}), Some(&rival))
        .await;
    assert_eq!(error_code(&body), Some("PERMISSION_DENIED"));

    let body = app
        .graphql(
            update,
            json!({"id": id, "input": {"name": "Devworks Academy", "website": null}}),
            Some(&owner),
        )
        .await;
    let bootcamp = &body["data"]["updateBootcamp"];
    assert_eq!(bootcamp["name"], "Devworks Academy");
    assert_eq!(bootcamp["slug"], "devworks-academy");
    assert_eq!(bootcamp["website"], Value::Null);
    assert_eq!(bootcamp["housing"], true);
}

#[tokio::test]
async fn test_bootcamp_listing_is_public_and_paginated() {
    let app = TestApp::new();
    for (name, email) in [("Alpha", "a@email.com"), ("Beta", "b@email.com"), ("Gamma", "c@email.com")] {
        let token = app.register(name, email, "publisher").await;
        add_bootcamp(&app, &token, name).await;
    }

    let query = r"query($limit: Int, $page: Int) { bootcamps(limit: $limit, page: $page) { name } }";

    let body = app.graphql(query, json!({}), None).await;
    assert_eq!(body["data"]["bootcamps"].as_array().map(Vec::len), Some(3));

    let body = app.graphql(query, json!({"limit": 2, "page": 2}), None).await;
    assert_eq!(body["data"]["bootcamps"], json!([{"name": "Gamma"}]));

    let body = app.graphql(query, json!({"limit": 0}), None).await;
    assert_eq!(error_message(&body), Some("Limit and page must be greater than 0"));
}

#[tokio::test]
async fn test_unknown_bootcamp_id() {
    let app = TestApp::new();

    for id in ["9999", "not-a-number"] {
        let body = app
            .graphql("query($id: ID!) { bootcamp(id: $id) { id } }", json!({"id": id}), None)
            .await;
        assert_eq!(error_code(&body), Some("NOT_FOUND"), "{id}");
    }
}

// ============================================================================
// Courses & Average Cost
// ============================================================================

#[tokio::test]
async fn test_average_cost_follows_courses() {
    let app = TestApp::new();
    let token = app.register("Pat", "pat@devworks.com", "publisher").await;
    let bootcamp = add_bootcamp(&app, &token, "Devworks").await;

    add_course(&app, &token, course_input(&bootcamp, "Front End", 100.0, 1)).await;
    let body = app.graphql(BOOTCAMP_COST, json!({"id": bootcamp}), None).await;
    assert_eq!(body["data"]["bootcamp"]["averageCost"], 100.0);

    let back_end = add_course(&app, &token, course_input(&bootcamp, "Back End", 400.0, 1)).await;
    let body = app.graphql(BOOTCAMP_COST, json!({"id": bootcamp}), None).await;
    assert_eq!(body["data"]["bootcamp"]["averageCost"], 250.0);

    let body = app
        .graphql(
            "mutation($id: ID!) { deleteCourse(id: $id) { title } }",
            json!({"id": back_end}),
            Some(&token),
        )
        .await;
    assert_eq!(body["data"]["deleteCourse"]["title"], "Back End");

    let body = app.graphql(BOOTCAMP_COST, json!({"id": bootcamp}), None).await;
    assert_eq!(body["data"]["bootcamp"]["averageCost"], 100.0);
}

#[tokio::test]
async fn test_course_subject_must_be_a_bootcamp_career() {
    let app = TestApp::new();
    let token = app.register("Pat", "pat@devworks.com", "publisher").await;
    let bootcamp = add_bootcamp(&app, &token, "Devworks").await;

    let mut input = course_input(&bootcamp, "Data 101", 100.0, 1);
    input["subject"] = json!("DATA_SCIENCE");
    let body = app.graphql(ADD_COURSE, json!({"input": input}), Some(&token)).await;

    assert_eq!(error_code(&body), Some("INVALID_SUBJECT"));
}

#[tokio::test]
async fn test_only_course_owner_deletes_course() {
    let app = TestApp::new();
    let owner = app.register("Pat", "pat@devworks.com", "publisher").await;
    let rival = app.register("Rex", "rex@codemasters.com", "publisher").await;
    let bootcamp = add_bootcamp(&app, &owner, "Devworks").await;
    let course = add_course(&app, &owner, course_input(&bootcamp, "Front End", 10.0, 1)).await;

    let delete = "mutation($id: ID!) { deleteCourse(id: $id) { id } }";

    let body = app.graphql(delete, json!({"id": course}), Some(&rival)).await;
    assert_eq!(error_code(&body), Some("PERMISSION_DENIED"));

    let body = app.graphql(delete, json!({"id": course}), Some(&owner)).await;
    assert_eq!(body["data"]["deleteCourse"]["id"], json!(course));
}

#[tokio::test]
async fn test_enroll_and_disenroll() {
    let app = TestApp::new();
    let publisher = app.register("Pat", "pat@devworks.com", "publisher").await;
    let student = app.register("Sam", "sam@email.com", "user").await;
    let bootcamp = add_bootcamp(&app, &publisher, "Devworks").await;
    let course = add_course(&app, &publisher, course_input(&bootcamp, "Front End", 100.0, 1)).await;

    let enroll = r"mutation($id: ID!) { enrollCourse(courseId: $id) { students { email } } }";
    let disenroll = r"mutation($id: ID!) { disenrollCourse(courseId: $id) { students { email } } }";

    let body = app.graphql(enroll, json!({"id": course}), Some(&student)).await;
    assert_eq!(body["data"]["enrollCourse"]["students"], json!([{"email": "sam@email.com"}]));

    let body = app.graphql(enroll, json!({"id": course}), Some(&student)).await;
    assert_eq!(error_code(&body), Some("ALREADY_ENROLLED"));

    let body = app.graphql(disenroll, json!({"id": course}), Some(&student)).await;
    assert_eq!(body["data"]["disenrollCourse"]["students"], json!([]));

    let body = app.graphql(disenroll, json!({"id": course}), Some(&student)).await;
    assert_eq!(error_code(&body), Some("NOT_ENROLLED"));
}

#[tokio::test]
async fn test_deleting_bootcamp_removes_its_courses() {
    let app = TestApp::new();
    let token = app.register("Pat", "pat@devworks.com", "publisher").await;
    let bootcamp = add_bootcamp(&app, &token, "Devworks").await;
    let course = add_course(&app, &token, course_input(&bootcamp, "Front End", 100.0, 1)).await;

    let body = app
        .graphql(
            "mutation($id: ID!) { deleteBootcamp(id: $id) { name } }",
            json!({"id": bootcamp}),
            Some(&token),
        )
        .await;
    assert_eq!(body["data"]["deleteBootcamp"]["name"], "Devworks");

    let body = app
        .graphql("query($id: ID!) { course(id: $id) { id } }", json!({"id": course}), None)
        .await;
    assert_eq!(error_code(&body), Some("NOT_FOUND"));

    let body = app
        .graphql(
            "query($id: ID!) { bootcampCourses(bootcampId: $id) { id } }",
            json!({"id": bootcamp}),
            None,
        )
        .await;
    assert_eq!(error_code(&body), Some("NOT_FOUND"));
}
