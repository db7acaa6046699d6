use crate::config::Config;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockBuilder, MockServer};

pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:generateContent$";

pub fn post_path_regex(regex: &str) -> MockBuilder {
    Mock::given(method("POST")).and(path_regex(regex))
}

/// Config pointed at `server` with the `/v1beta` version segment.
pub fn config_for(server: &MockServer, api_key: &str) -> Config {
    Config::with_api_key(api_key).with_base_url(format!("{}/v1beta", server.uri()))
}
