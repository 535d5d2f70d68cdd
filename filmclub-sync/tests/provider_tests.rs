//! OMDb / TMDB clients and the sheet fetcher against a local mock server

use filmclub_sync::providers::{OmdbClient, ProviderError, SecondaryProvider, TmdbClient};
use filmclub_sync::sheet::{SheetClient, SheetError, SheetSource};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UA: &str = "filmclub-sync-tests";

fn omdb(server: &MockServer) -> OmdbClient {
    OmdbClient::new(Some("omdb-key".to_string()), UA)
        .unwrap()
        .with_base_url(format!("{}/", server.uri()))
}

fn tmdb(server: &MockServer) -> TmdbClient {
    TmdbClient::new(Some("tmdb-token".to_string()), UA)
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_omdb_lookup_strips_transport_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("i", "tt0078748"))
        .and(query_param("apikey", "omdb-key"))
        .and(query_param("plot", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": "Alien",
            "Year": "1979",
            "imdbID": "tt0078748",
            "Response": "True"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = omdb(&server).lookup("tt0078748").await.unwrap();

    assert_eq!(record["Title"], json!("Alien"));
    assert!(!record.contains_key("Response"));
    assert!(!record.contains_key("Error"));
}

#[tokio::test]
async fn test_omdb_false_response_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": "False",
            "Error": "Incorrect IMDb ID."
        })))
        .mount(&server)
        .await;

    let err = omdb(&server).lookup("tt_bad").await.unwrap_err();
    match err {
        ProviderError::NotFound(message) => assert!(message.contains("Incorrect IMDb ID.")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_omdb_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key!"))
        .mount(&server)
        .await;

    let err = omdb(&server).lookup("tt0078748").await.unwrap_err();
    assert!(matches!(err, ProviderError::ApiError(401, _)));
}

#[tokio::test]
async fn test_omdb_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = omdb(&server).lookup("tt0078748").await.unwrap_err();
    assert!(matches!(err, ProviderError::ParseError(_)));
}

#[tokio::test]
async fn test_tmdb_movie_credits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/find/tt0116282"))
        .and(query_param("external_source", "imdb_id"))
        .and(header("authorization", "Bearer tmdb-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [{"id": 275}],
            "tv_results": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/275/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 275,
            "crew": [
                {"name": "Roger Deakins", "job": "Director of Photography"},
                {"name": "Carter Burwell", "job": "Original Music Composer"},
                {"name": "Roderick Jaynes", "job": "Editor"},
                {"name": "Ethan Coen", "job": "Editor"},
                {"name": "Rick Heinrichs", "job": "Production Design"},
                {"name": "Mary Zophres", "job": "Costume Design"},
                {"name": "Joel Coen", "job": "Director"}
            ]
        })))
        .mount(&server)
        .await;

    let fields = tmdb(&server).crew_fields("tt0116282").await;

    assert_eq!(fields.len(), 5);
    assert_eq!(fields["cinematographer"], json!("Roger Deakins"));
    assert_eq!(fields["composer"], json!("Carter Burwell"));
    assert_eq!(fields["editor"], json!("Ethan Coen, Roderick Jaynes"));
    assert_eq!(fields["productionDesigner"], json!("Rick Heinrichs"));
    assert_eq!(fields["costumeDesigner"], json!("Mary Zophres"));
}

#[tokio::test]
async fn test_tmdb_falls_back_to_tv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/find/tt0903747"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [],
            "tv_results": [{"id": 1396}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tv/1396/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "crew": [{"name": "Michael Slovis", "job": "Director of Photography"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fields = tmdb(&server).lookup_crew("tt0903747").await.unwrap();
    assert_eq!(fields["cinematographer"], json!("Michael Slovis"));
}

#[tokio::test]
async fn test_tmdb_no_match_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/find/tt0000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [],
            "tv_results": []
        })))
        .mount(&server)
        .await;

    let client = tmdb(&server);
    assert!(client.lookup_crew("tt0000000").await.unwrap().is_empty());
    assert!(client.crew_fields("tt0000000").await.is_empty());
}

#[tokio::test]
async fn test_tmdb_identifier_stays_in_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [],
            "tv_results": []
        })))
        .mount(&server)
        .await;

    let fields = tmdb(&server).lookup_crew("tt1/../movie/2?x=1#frag").await.unwrap();
    assert!(fields.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/find/tt1%2F..%2Fmovie%2F2%3Fx=1%23frag");
    assert_eq!(requests[0].url.query(), Some("external_source=imdb_id"));
}

#[tokio::test]
async fn test_tmdb_errors_degrade_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = tmdb(&server);
    assert!(matches!(
        client.lookup_crew("tt0116282").await,
        Err(ProviderError::ApiError(500, _))
    ));
    assert!(client.crew_fields("tt0116282").await.is_empty());
}

#[tokio::test]
async fn test_sheet_fetch_from_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sheet.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "IMDB_ID , Watch Date,andy_rating\ntt1,2024-01-05,8\n,,\n,2024-02-01,\ntt2\n",
        ))
        .mount(&server)
        .await;

    let source = SheetSource::parse(&format!("{}/sheet.csv", server.uri()));
    let rows = SheetClient::new(UA).unwrap().fetch_rows(&source).await.unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].identifier().as_deref(), Some("tt1"));
    assert_eq!(rows[0].watch_date(), Some("2024-01-05"));
    assert_eq!(rows[0].rating("andy"), Some("8"));
    assert_eq!(rows[1].identifier(), None);
    assert_eq!(rows[2].identifier().as_deref(), Some("tt2"));
    assert!(rows[2].has_column("andy_rating"));
    assert_eq!(rows[2].rating("andy"), Some(""));
}

#[tokio::test]
async fn test_sheet_fetch_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = SheetSource::Url(format!("{}/missing.csv", server.uri()));
    let err = SheetClient::new(UA).unwrap().fetch_rows(&source).await.unwrap_err();
    assert!(matches!(err, SheetError::HttpStatus(404)));
}
