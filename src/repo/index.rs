//! HTML index of the repository's installable archives

use handlebars::{Handlebars, RenderError};
use serde_json::json;

use crate::repo::snapshot::RepositorySnapshot;

const INDEX_TEMPLATE: &str = r#"<html>
    <head><title>Index</title></head>
    <body>
        <ul>
           {{#each entries}}<li><a href="{{this.id}}/{{this.file}}">{{this.file}}</a></li>
           {{/each}}
        </ul>
    </body>
</html>"#;

/// Render the index page listing each project's primary archive
pub fn render_index(snapshot: &RepositorySnapshot) -> Result<String, RenderError> {
    let entries: Vec<_> = snapshot
        .index()
        .into_iter()
        .map(|(id, asset)| json!({ "id": id, "file": asset.name }))
        .collect();

    Handlebars::new().render_template(INDEX_TEMPLATE, &json!({ "entries": entries }))
}
