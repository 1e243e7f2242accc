pub mod availability;
pub mod dataselect;
pub mod station;
pub mod wadl;

use axum::{
  http::header,
  response::{IntoResponse, Response},
};

pub(super) fn text_response(body: String) -> Response {
  ([(header::CONTENT_TYPE, crate::text::CONTENT_TYPE)], body).into_response()
}

pub(super) fn xml_response(body: Vec<u8>) -> Response {
  ([(header::CONTENT_TYPE, crate::xml::CONTENT_TYPE)], body).into_response()
}

/// Plain-text `version` body.
pub(super) fn version_response(version: &'static str) -> Response {
  ([(header::CONTENT_TYPE, crate::text::CONTENT_TYPE)], version).into_response()
}
