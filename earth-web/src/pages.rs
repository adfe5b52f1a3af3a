//! HTML pages for the explorer.

use chrono::Utc;
use earth_core::{AreaCode, ImageRequest, StoredImage};

pub const MARS_MESSAGE: &str = "Welcome to Mars! More data coming soon...";

const STYLE: &str = r#"
        body { font-family: system-ui, sans-serif; margin: 0; background: #0b1020; color: #e8ecf5; }
        header { padding: 20px 40px; background: linear-gradient(135deg, #1a365d 0%, #2d4a6f 100%); }
        header h1 { margin: 0; font-size: 1.5rem; }
        header a { color: #cbd5e1; margin-right: 15px; text-decoration: none; }
        main { padding: 30px 40px; max-width: 900px; }
        form { display: grid; grid-template-columns: 160px 1fr; gap: 10px 16px; align-items: center; }
        input, select { padding: 6px 8px; border-radius: 4px; border: 1px solid #475569; }
        button { grid-column: 2; justify-self: start; padding: 8px 18px; }
        .error { background: #7f1d1d; padding: 12px 16px; border-radius: 4px; margin-top: 20px; }
        .result img { max-width: 100%; margin-top: 20px; border-radius: 4px; }
        .cards a { display: inline-block; padding: 24px 32px; margin-right: 16px; background: #1e293b;
                   border-radius: 6px; color: #e8ecf5; text-decoration: none; }
"#;

/// What the Earth page shows besides the form itself.
#[derive(Debug, Default)]
pub struct EarthView {
    pub latitude: String,
    pub longitude: String,
    pub date: String,
    pub image: Option<StoredImage>,
    pub error: Option<String>,
}

impl EarthView {
    /// Keep what the user typed so the form can be corrected and resubmitted.
    pub fn for_request(request: &ImageRequest) -> Self {
        Self {
            latitude: request.latitude.clone(),
            longitude: request.longitude.clone(),
            date: request.date.clone(),
            ..Default::default()
        }
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <header>
        <h1>Planetary Mission Explorer</h1>
        <nav><a href="/">Home</a><a href="/earth">Earth</a><a href="/mars">Mars</a></nav>
    </header>
    <main>
{body}
    </main>
</body>
</html>"#,
        title = escape(title),
    )
}

pub fn index() -> String {
    layout(
        "Planetary Mission Explorer",
        r#"        <p>Pick a destination.</p>
        <div class="cards">
            <a href="/earth">Earth imagery</a>
            <a href="/mars">Mars</a>
        </div>"#,
    )
}

pub fn mars() -> String {
    layout("Mars", &format!("        <h2>Mars</h2>\n        <p>{}</p>", escape(MARS_MESSAGE)))
}

pub fn earth(view: &EarthView) -> String {
    let options: String = AreaCode::all()
        .iter()
        .map(|a| format!(r#"<option value="{}">{}</option>"#, a.square_km(), a.label()))
        .collect();

    let mut body = format!(
        r#"        <h2>Earth imagery</h2>
        <form method="post" action="/earth">
            <label for="api">API key</label>
            <input type="password" id="api" name="api" required>
            <label for="latitude">Latitude</label>
            <input type="text" id="latitude" name="latitude" value="{lat}" placeholder="37.77" required>
            <label for="longitude">Longitude</label>
            <input type="text" id="longitude" name="longitude" value="{lon}" placeholder="-122.41" required>
            <label for="date">Date</label>
            <input type="date" id="date" name="date" value="{date}" max="{today}" required>
            <label for="area">Image area</label>
            <select id="area" name="area">{options}</select>
            <button type="submit">Fetch image</button>
        </form>"#,
        lat = escape(&view.latitude),
        lon = escape(&view.longitude),
        date = escape(&view.date),
        today = Utc::now().date_naive(),
    );

    if let Some(error) = &view.error {
        body.push_str(&format!("\n        <div class=\"error\">{}</div>", escape(error)));
    }

    if let Some(image) = &view.image {
        let caption = match &image.captured_at {
            Some(at) => format!("Captured {}", escape(at)),
            None => "Earth image".to_string(),
        };
        body.push_str(&format!(
            "\n        <div class=\"result\">\n            <img src=\"{src}\" alt=\"Earth image\">\n            <p>{caption}</p>\n        </div>",
            src = escape(&image.public_url),
        ));
    }

    layout("Earth", &body)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
