//! HTTP-level tests for the TMDb and OMDb clients

use media_catalog::aggregator::{HttpProviderGateway, OmdbClient, ProviderGateway, TmdbClient};
use media_catalog::normalizer::MediaType;
use media_catalog::{CatalogError, RateLimitManager};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tmdb(server: &MockServer) -> TmdbClient {
    TmdbClient::new("tmdb-key".to_string()).with_base_url(server.uri())
}

fn omdb(server: &MockServer) -> OmdbClient {
    OmdbClient::new("omdb-key".to_string()).with_base_url(server.uri())
}

#[tokio::test]
async fn test_tmdb_search_multi_parses_hits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .and(query_param("api_key", "tmdb-key"))
        .and(query_param("query", "The Matrix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                {"id": 603, "media_type": "movie", "title": "The Matrix"},
                {"id": 6384, "media_type": "person", "name": "Keanu Reeves"},
                {"media_type": "movie", "title": "No ID"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = tmdb(&server);
    let hits = client.search_multi("The Matrix").await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "603");
    assert_eq!(hits[0].display_name(), "The Matrix");
    assert_eq!(hits[1].media_type, "person");

    // Served from cache, the mock expects a single request
    let cached = client.search_multi("The Matrix").await.unwrap();
    assert_eq!(cached, hits);
}

#[tokio::test]
async fn test_tmdb_movie_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/603"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 603,
            "title": "The Matrix",
            "status": "Released",
            "imdb_id": "tt0133093",
            "runtime": 136
        })))
        .mount(&server)
        .await;

    let detail = tmdb(&server).get_movie_details("603").await.unwrap();

    assert_eq!(detail.title.as_deref(), Some("The Matrix"));
    assert_eq!(detail.status.as_deref(), Some("Released"));
    assert_eq!(detail.imdb_id.as_deref(), Some("tt0133093"));
}

#[tokio::test]
async fn test_tmdb_tv_videos() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tv/66732/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 66732,
            "results": [
                {"site": "YouTube", "key": "b9EkMc79ZSU", "type": "Trailer"},
                {"site": "Vimeo", "key": "12345", "type": "Clip"}
            ]
        })))
        .mount(&server)
        .await;

    let trailers = tmdb(&server)
        .get_videos(MediaType::Series, "66732")
        .await
        .unwrap();

    assert_eq!(trailers.len(), 2);
    assert_eq!(trailers[0].key, "b9EkMc79ZSU");
    assert_eq!(trailers[1].site, "Vimeo");
}

#[tokio::test]
async fn test_tmdb_translation_uses_configured_language() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/603"))
        .and(query_param("language", "es-ES"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Matrix",
            "overview": "Un pirata informático descubre la verdad."
        })))
        .mount(&server)
        .await;

    let translation = tmdb(&server)
        .with_language("es-ES".to_string())
        .get_translation(MediaType::Movie, "603")
        .await
        .unwrap();

    assert_eq!(translation.title.as_deref(), Some("Matrix"));
    assert!(translation.overview.unwrap().starts_with("Un pirata"));
}

#[tokio::test]
async fn test_tmdb_error_status_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 34,
            "status_message": "The resource you requested could not be found."
        })))
        .mount(&server)
        .await;

    let err = tmdb(&server).get_movie_details("999999").await.unwrap_err();

    assert!(matches!(
        err,
        CatalogError::UpstreamUnavailable { ref provider, .. } if provider == "tmdb"
    ));
}

#[tokio::test]
async fn test_omdb_detail_by_imdb_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("apikey", "omdb-key"))
        .and(query_param("i", "tt0133093"))
        .and(query_param("plot", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": "The Matrix",
            "Year": "1999",
            "Genre": "Action, Sci-Fi",
            "Director": "Lana Wachowski, Lilly Wachowski",
            "Actors": "Keanu Reeves, Laurence Fishburne, Carrie-Anne Moss",
            "Plot": "When a beautiful stranger leads computer hacker Neo...",
            "Poster": "https://m.media-amazon.com/images/M/matrix.jpg",
            "imdbRating": "8.7",
            "imdbID": "tt0133093",
            "Type": "movie",
            "Response": "True"
        })))
        .mount(&server)
        .await;

    let detail = omdb(&server)
        .get_by_imdb_id("tt0133093")
        .await
        .unwrap()
        .unwrap();

    assert!(detail.response);
    assert_eq!(detail.title.as_deref(), Some("The Matrix"));
    assert_eq!(detail.imdb_rating.as_deref(), Some("8.7"));
    assert_eq!(detail.media_type.as_deref(), Some("movie"));
}

#[tokio::test]
async fn test_omdb_failure_envelope_is_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("i", "tt0000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": "False",
            "Error": "Incorrect IMDb ID."
        })))
        .mount(&server)
        .await;

    let detail = omdb(&server)
        .get_by_imdb_id("tt0000000")
        .await
        .unwrap()
        .unwrap();

    assert!(!detail.response);
    assert_eq!(detail.error.as_deref(), Some("Incorrect IMDb ID."));
}

#[tokio::test]
async fn test_omdb_empty_body_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let detail = omdb(&server).get_by_imdb_id("tt0000001").await.unwrap();

    assert!(detail.is_none());
}

#[tokio::test]
async fn test_omdb_search_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("s", "Stranger Things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Search": [
                {"Title": "Stranger Things", "Year": "2016–2025", "imdbID": "tt4574334", "Type": "series"}
            ],
            "totalResults": "1",
            "Response": "True"
        })))
        .mount(&server)
        .await;

    let lookup = omdb(&server).search_by_name("Stranger Things").await.unwrap();

    assert!(lookup.response);
    assert_eq!(lookup.matches.len(), 1);
    assert_eq!(lookup.matches[0].imdb_id, "tt4574334");
}

#[tokio::test]
async fn test_omdb_search_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("s", "qwertyuiop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": "False",
            "Error": "Movie not found!"
        })))
        .mount(&server)
        .await;

    let lookup = omdb(&server).search_by_name("qwertyuiop").await.unwrap();

    assert!(!lookup.response);
    assert!(lookup.matches.is_empty());
}

#[tokio::test]
async fn test_gateway_routes_to_both_providers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/multi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 66732, "media_type": "tv", "name": "Stranger Things"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("i", "tt4574334"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": "Stranger Things",
            "imdbID": "tt4574334",
            "Type": "series",
            "Response": "True"
        })))
        .mount(&server)
        .await;

    let rate_limiter = Arc::new(RateLimitManager::new());
    rate_limiter
        .register_provider("tmdb", 40, std::time::Duration::from_secs(10))
        .await
        .unwrap();
    rate_limiter
        .register_provider("omdb", 1000, std::time::Duration::from_secs(86_400))
        .await
        .unwrap();
    let gateway = HttpProviderGateway::new(tmdb(&server), omdb(&server), rate_limiter);

    let hits = gateway.search_titles("Stranger").await.unwrap();
    assert_eq!(hits[0].display_name(), "Stranger Things");

    let detail = gateway
        .detail_by_canonical_id("tt4574334")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.title.as_deref(), Some("Stranger Things"));
}

#[tokio::test]
async fn test_transport_failure_hides_api_key() {
    let client = TmdbClient::new("SECRET-KEY".to_string())
        .with_base_url("http://127.0.0.1:1".to_string());

    let err = client.get_movie_details("603").await.unwrap_err();

    assert!(matches!(err, CatalogError::HttpError(_)));
    assert!(!err.to_string().contains("SECRET-KEY"));
}

#[tokio::test]
async fn test_omdb_failure_envelope_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("i", "tt0133093"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": "False",
            "Error": "Request limit reached!"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("i", "tt0133093"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Title": "The Matrix",
            "imdbID": "tt0133093",
            "Response": "True"
        })))
        .mount(&server)
        .await;

    let client = omdb(&server);
    let first = client.get_by_imdb_id("tt0133093").await.unwrap().unwrap();
    let second = client.get_by_imdb_id("tt0133093").await.unwrap().unwrap();
    let third = client.get_by_imdb_id("tt0133093").await.unwrap().unwrap();

    assert!(!first.response);
    assert!(second.response);
    assert_eq!(third, second);
    // The successful detail is served from cache on the third call
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
