//! Upload form.

use axum::{Router, response::Html, routing::get};
use upgate_core::storage::Uploader;

use crate::AppState;

const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Upload a file</title>
</head>
<body>
<h2>Upload a file</h2>
<form action="/upload" method="post" enctype="multipart/form-data">
  <label for="file">Filename:</label>
  <input type="file" name="file" id="file">
  <br>
  <input type="submit" name="submit" value="Submit">
</form>
</body>
</html>
"#;

async fn home() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

/// Creates the home page route.
pub fn routes<U: Uploader>() -> Router<AppState<U>> {
    Router::new().route("/", get(home))
}
