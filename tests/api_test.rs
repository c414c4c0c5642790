use std::collections::HashMap;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};

use policypulse::nlp::stopwords::is_stopword;
use policypulse::nlp::KeywordExtractor;
use policypulse::server::{configure, payload_config};
use policypulse::{Analysis, Analyzer, Settings};

const LONG_COMMENT: &str = "I strongly support the proposed bike lane network. Bike lanes make \
    streets safer for children and older residents, and the bike lane pilot on Elm Street cut \
    crashes in half. However, the city must keep parking for small businesses along Main Street. \
    Please fund the bike lane network in this budget and publish the parking study.";

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Analyzer::default()))
                .app_data(payload_config(&Settings::default()))
                .configure(configure),
        )
        .await
    };
}

async fn post_text(text: &str) -> Analysis {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/analyze")
        .set_json(json!({ "text": text }))
        .to_request();
    test::call_and_read_body_json(&app, req).await
}

#[actix_web::test]
async fn long_comment_is_summarized_and_ranked() {
    assert!(LONG_COMMENT.split_whitespace().count() > 30);
    let analysis = post_text(LONG_COMMENT).await;

    assert!(!analysis.summary.is_empty());
    assert!(analysis.summary.len() < LONG_COMMENT.len());
    assert!(["POSITIVE", "NEGATIVE"].contains(&analysis.sentiment.as_str()));
    assert!((0.0..=1.0).contains(&analysis.confidence));

    assert!(!analysis.keywords.is_empty());
    assert!(analysis.keywords.len() <= 7);
    let counts: HashMap<String, usize> = KeywordExtractor::default()
        .word_frequencies(LONG_COMMENT)
        .into_iter()
        .collect();
    let ranked: Vec<usize> = analysis.keywords.iter().map(|k| counts[k]).collect();
    assert!(ranked.windows(2).all(|w| w[0] >= w[1]), "{:?}", analysis.keywords);
    for keyword in &analysis.keywords {
        for word in keyword.split(' ') {
            assert!(!is_stopword(word), "{keyword}");
        }
    }
}

#[actix_web::test]
async fn short_comment_summary_is_verbatim() {
    let text = "The library hours are too short on weekends.";
    let analysis = post_text(text).await;
    assert_eq!(analysis.summary, text);
}

#[actix_web::test]
async fn error_responses_use_error_field() {
    let app = app!();
    let cases = [
        (r#"{"comment": "wrong field"}"#, StatusCode::BAD_REQUEST),
        (r#"{"text": false}"#, StatusCode::BAD_REQUEST),
        (r#"{"text": ["a"]}"#, StatusCode::INTERNAL_SERVER_ERROR),
        ("", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (body, status) in cases {
        let req = test::TestRequest::post()
            .uri("/analyze")
            .insert_header(header::ContentType::json())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{body}");
        let value: Value = test::read_body_json(resp).await;
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj["error"].is_string());
    }
}

#[actix_web::test]
async fn get_analyze_is_not_allowed() {
    let app = app!();
    let req = test::TestRequest::get().uri("/analyze").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn script_is_served() {
    let app = app!();
    let req = test::TestRequest::get().uri("/static/index.js").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("/analyze"));
}
