use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::info;

use crate::config::RouteConfig;
use crate::http::{HttpRequest, HttpResponse};
use crate::listing::{
    DirectoryEntry, ListingError, OrderPolicy, OrderState, PathState, SortKey, format_size,
    format_timestamp, read_entries, sort_entries,
};

/// Column order of the rendered table
const COLUMNS: [(SortKey, &str); 3] = [
    (SortKey::Name, "Name"),
    (SortKey::Date, "Date"),
    (SortKey::Size, "Size"),
];

/// Everything the page template needs for one request.
pub struct ListingPage<'a> {
    /// URL prefix static files are served under
    pub route_path: &'a str,
    pub title: &'a str,
    pub path: &'a PathState,
    pub order: &'a OrderState,
    /// Already sorted
    pub entries: &'a [DirectoryEntry],
}

impl ListingPage<'_> {
    /// `<title>/<sub dirs>/`
    pub fn heading(&self) -> String {
        let mut heading = format!("{}/", self.title);
        for segment in self.path.named_segments() {
            heading.push_str(segment);
            heading.push('/');
        }
        heading
    }

    fn column_href(&self, key: SortKey) -> String {
        format!(
            "?dir={}&order={}",
            urlencoding::encode(&self.path.resolved_path),
            urlencoding::encode(self.order.next_token(key))
        )
    }

    fn dir_href(&self, dir: &str) -> String {
        format!(
            "?dir={}&order={}",
            urlencoding::encode(dir),
            urlencoding::encode(&self.order.raw_token)
        )
    }

    fn file_href(&self, name: &str) -> String {
        let mut href = self.route_path.trim_end_matches('/').to_string();
        for segment in self.path.named_segments().chain(std::iter::once(name)) {
            href.push('/');
            href.push_str(&urlencoding::encode(segment));
        }
        href
    }
}

/// Build the listing for `request` on an autoindex route.
pub fn list_directory(route: &RouteConfig, request: &HttpRequest) -> Result<HttpResponse, ListingError> {
    let dir_param = request.query_param("dir");
    let order_param = request.query_param("order");

    let path = PathState::resolve(dir_param.as_deref());
    let dir = path.confine(&route.root)?;
    let order = OrderState::from_token(order_param.as_deref(), &OrderPolicy::default());

    let mut entries = read_entries(&dir, &path, &route.listing_options())?;
    sort_entries(&mut entries, order.active_key, order.reversed);

    info!(
        dir = %path.resolved_path,
        order = %order.active_key,
        reversed = order.reversed,
        entries = entries.len(),
        "listing directory"
    );

    let title = route.title();
    let page = ListingPage {
        route_path: &route.path,
        title: &title,
        path: &path,
        order: &order,
        entries: &entries,
    };

    Ok(HttpResponse::html(render_listing(&page)))
}

pub fn render_listing(page: &ListingPage) -> String {
    let heading = encode_text(&page.heading()).into_owned();
    let mut html = String::with_capacity(4096 + page.entries.len() * 256);

    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{heading}</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>{STYLE}</style>
</head>
<body>
<h1>{heading}</h1>
<table>
<thead>
<tr>
"#
    ));

    for (key, label) in COLUMNS {
        html.push_str(&format!(
            "<th class=\"{key} {class}\"><a href=\"{href}\">{label}</a><div class=\"order-icon\"></div></th>\n",
            class = page.order.css_class(key),
            href = encode_double_quoted_attribute(&page.column_href(key)),
        ));
    }

    html.push_str("</tr>\n</thead>\n<tbody>\n");

    if let Some(parent) = &page.path.parent_path {
        html.push_str(&format!(
            "<tr><td class=\"name\"><a href=\"{}\">../</a></td><td class=\"date\">--</td><td class=\"size\">--</td></tr>\n",
            encode_double_quoted_attribute(&page.dir_href(parent)),
        ));
    }

    for entry in page.entries {
        let href = if entry.is_dir {
            page.dir_href(&format!("{}/{}", page.path.resolved_path, entry.name))
        } else {
            page.file_href(&entry.name)
        };
        let size = if entry.is_dir {
            "--".to_string()
        } else {
            format_size(entry.size_bytes)
        };

        html.push_str(&format!(
            "<tr><td class=\"name\"><a href=\"{}\">{}</a></td><td class=\"date\">{}</td><td class=\"size\">{}</td></tr>\n",
            encode_double_quoted_attribute(&href),
            encode_text(&entry.name),
            format_timestamp(entry.modified_at),
            size,
        ));
    }

    html.push_str(&format!(
        "</tbody>\n</table>\n<script>{SCRIPT}</script>\n</body>\n</html>\n"
    ));
    html
}

const STYLE: &str = r#"
html, body { font-family: Verdana, sans-serif; font-size: 15px; margin: 0; padding: 0.5%; }
a { color: #000; text-decoration: none; }
h1 { padding: 0 0 10px; margin: 0; }
table { width: 100%; border-spacing: 0; border: solid 1px #AAA; border-radius: 7px; }
th, td { cursor: pointer; padding: 8px 10px; text-align: left; }
thead th { font-weight: bold; background: #CCC; }
thead th:hover { background: #DDD; }
thead .order-asc .order-icon, thead .order-desc .order-icon {
    float: right; width: 0; height: 0; margin-top: 6px;
    border-left: 5px solid transparent; border-right: 5px solid transparent;
}
thead .order-asc .order-icon { border-bottom: 6px solid #333; }
thead .order-desc .order-icon { border-top: 6px solid #333; }
tbody tr:nth-child(2n) td { background-color: #FAFAFA; }
tbody tr:nth-child(2n + 1) td { background-color: #F0F0F0; }
tbody tr:hover td { background-color: #DDD; }
"#;

// A click anywhere on a row or header follows its first link
const SCRIPT: &str = r#"
function openFirstLink(el, tag) {
    while (el && el.tagName !== tag) { el = el.parentNode; }
    if (el) { window.location = el.querySelector('a').getAttribute('href'); }
}
document.querySelector('table tbody').addEventListener('click', function (e) { openFirstLink(e.target, 'TR'); });
document.querySelector('table thead').addEventListener('click', function (e) { openFirstLink(e.target, 'TH'); });
"#;
