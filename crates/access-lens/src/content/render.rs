use serde_json::Value;

/// Render the root of a story: the concatenation of its `body` bloks.
pub fn render_story(content: &Value) -> String {
    children(content, "body").map(render_blok).collect()
}

/// Render one blok. Unknown components render as nothing.
pub fn render_blok(blok: &Value) -> String {
    match text(blok, "component") {
        "page" => {
            let body: String = children(blok, "body").map(render_blok).collect();
            format!("<main>{body}</main>")
        }
        "grid" => {
            let columns: String = children(blok, "columns").map(render_blok).collect();
            format!("<div class=\"grid\">{columns}</div>")
        }
        "feature" => format!(
            "<div class=\"feature\"><h3>{}</h3></div>",
            escape_html(text(blok, "name"))
        ),
        "teaser" => format!(
            "<div class=\"teaser\"><h2>{}</h2></div>",
            escape_html(text(blok, "headline"))
        ),
        "blog_post" => render_blog_post(blok),
        _ => String::new(),
    }
}

fn render_blog_post(blok: &Value) -> String {
    let mut html = String::from("<article>");

    if let Some(image) = blok.get("featured_image") {
        let src = text(image, "filename");
        if !src.is_empty() {
            let alt = text(image, "alt");
            if alt.is_empty() {
                html.push_str(&format!("<img src=\"{}\">", escape_html(src)));
            } else {
                html.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    escape_html(src),
                    escape_html(alt)
                ));
            }
        }
    }

    html.push_str(&format!("<h1>{}</h1>", escape_html(text(blok, "title"))));
    let author = match text(blok, "author") {
        "" => "Unknown Author",
        author => author,
    };
    html.push_str(&format!("<p>By {}</p>", escape_html(author)));
    // Rich text arrives as authored HTML.
    html.push_str(&format!("<div>{}</div>", text(blok, "content")));
    html.push_str("</article>");
    html
}

fn children<'a>(blok: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    blok.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn text<'a>(blok: &'a Value, key: &str) -> &'a str {
    blok.get(key).and_then(Value::as_str).unwrap_or_default()
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
