//! Browser rendering: Plotly figure JSON and a self-contained HTML page.
//!
//! The crate does no drawing of its own. Each chart is a Plotly figure
//! (`{"data": [...], "layout": {...}}`) that the page hands to `Plotly.newPlot`.

use crate::dashboard::{DashboardView, NoticeLevel};
use crate::map::{DATA_STOPS, MapFrame, NO_DATA_COLOR};
use crate::reshape::{LongRow, SeriesTable};
use chrono::Utc;
use serde_json::{Value, json};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

fn hover_layout() -> Value {
    json!({ "font": { "color": "black" }, "bgcolor": "white" })
}

pub fn line_title(view: &DashboardView) -> String {
    format!(
        "{} for {} from {} to {}",
        view.indicator.name,
        view.selected_names.join(", "),
        view.range.start(),
        view.range.end()
    )
}

pub fn bar_title(view: &DashboardView) -> String {
    format!(
        "{} in {} for {}",
        view.indicator.name,
        view.focus_year,
        view.selected_names.join(", ")
    )
}

pub fn map_title(view: &DashboardView) -> String {
    format!("Map of the countries {} in {}", view.indicator.name, view.focus_year)
}

/// One line trace per country; missing years stay as gaps.
pub fn line_figure(table: &SeriesTable, title: &str, indicator_name: &str) -> Value {
    let traces: Vec<Value> = table
        .countries()
        .into_iter()
        .map(|country| {
            let rows = table.series(country);
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": country,
                "x": rows.iter().map(|r| r.year).collect::<Vec<_>>(),
                "y": rows.iter().map(|r| r.value).collect::<Vec<_>>(),
                "customdata": rows.iter().map(|r| [r.country.as_str(), r.formatted.as_str()]).collect::<Vec<_>>(),
                "hovertemplate": format!(
                    "<b>Country: %{{customdata[0]}}</b><br>Year: %{{x}}<br>{indicator_name}: %{{customdata[1]}}<extra></extra>"
                ),
            })
        })
        .collect();
    json!({
        "data": traces,
        "layout": {
            "title": { "text": title },
            "xaxis": { "title": { "text": "Year" } },
            "yaxis": { "title": { "text": indicator_name } },
            "legend": { "title": { "text": "Countries" } },
            "hoverlabel": hover_layout(),
        }
    })
}

/// Bars for one year, in the order given (largest first).
pub fn bar_figure(bars: &[LongRow], title: &str, indicator_name: &str) -> Value {
    json!({
        "data": [{
            "type": "bar",
            "x": bars.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
            "y": bars.iter().map(|r| r.value).collect::<Vec<_>>(),
            "customdata": bars.iter().map(|r| [r.country.as_str(), r.formatted.as_str()]).collect::<Vec<_>>(),
            "hovertemplate": format!(
                "<b>Country: %{{customdata[0]}}</b><br>{indicator_name}: %{{customdata[1]}}<extra></extra>"
            ),
        }],
        "layout": {
            "title": { "text": title },
            "xaxis": { "title": { "text": "Country" } },
            "yaxis": { "title": { "text": indicator_name } },
            "hoverlabel": hover_layout(),
        }
    })
}

/// Choropleth with two traces: real data on the viridis scale and, separately,
/// countries without data in a flat grey.
pub fn map_figure(frame: &MapFrame, title: &str, indicator_name: &str) -> Value {
    let hover = format!(
        "<b>%{{customdata[2]}}</b><br>Country Code: %{{customdata[0]}}<br>{indicator_name}: %{{customdata[1]}}<extra></extra>"
    );
    let trace = |rows: Vec<&crate::map::MapRow>| {
        (
            rows.iter().map(|r| r.iso3.clone()).collect::<Vec<_>>(),
            rows.iter().map(|r| r.value).collect::<Vec<_>>(),
            rows.iter()
                .map(|r| [r.iso3.clone(), r.formatted.clone(), r.country.clone()])
                .collect::<Vec<_>>(),
        )
    };
    let (locs, z, custom) = trace(frame.data_rows().collect());
    let colorscale: Vec<Value> = DATA_STOPS.iter().map(|(p, c)| json!([p, c])).collect();
    let mut data = vec![json!({
        "type": "choropleth",
        "locationmode": "ISO-3",
        "locations": locs,
        "z": z,
        "zmin": frame.range.min,
        "zmax": frame.range.max,
        "colorscale": colorscale,
        "colorbar": { "title": { "text": indicator_name } },
        "customdata": custom,
        "hovertemplate": hover,
        "name": "data",
    })];

    let (locs, z, custom) = trace(frame.no_data_rows().collect());
    if !locs.is_empty() {
        data.push(json!({
            "type": "choropleth",
            "locationmode": "ISO-3",
            "locations": locs,
            "z": z,
            "colorscale": [[0.0, NO_DATA_COLOR], [1.0, NO_DATA_COLOR]],
            "showscale": false,
            "customdata": custom,
            "hovertemplate": hover,
            "name": "no data",
        }));
    }

    json!({
        "data": data,
        "layout": {
            "title": { "text": title },
            "geo": {
                "showland": true,
                "landcolor": "lightblue",
                "showocean": true,
                "oceancolor": "lightgrey",
                "showframe": false,
                "showcountries": true,
                "countrycolor": "black",
                "projection": { "type": "natural earth" },
            },
            "hoverlabel": hover_layout(),
        }
    })
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Figures for the enabled charts, as `(element id, figure)`.
pub fn figures(view: &DashboardView) -> Vec<(&'static str, Value)> {
    let name = view.indicator.name.as_str();
    let mut out = Vec::new();
    if view.series.is_empty() {
        return out;
    }
    if view.charts.line {
        out.push(("line", line_figure(&view.series, &line_title(view), name)));
    }
    if view.charts.bar && !view.bars.is_empty() {
        out.push(("bar", bar_figure(&view.bars, &bar_title(view), name)));
    }
    if let Some(frame) = view.map.as_ref().filter(|_| view.charts.map) {
        out.push(("map", map_figure(frame, &map_title(view), name)));
    }
    out
}

/// A complete HTML page: notices, enabled charts, and the member listing.
pub fn render_html(view: &DashboardView) -> String {
    let mut body = String::new();
    body.push_str("<h1 style=\"text-align: center; color: #2c3e50;\">Economics Data Viewer</h1>\n");

    for n in &view.notices {
        let class = match n.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
        };
        body.push_str(&format!(
            "<div class=\"notice {class}\">{}</div>\n",
            escape_html(&n.message)
        ));
    }

    let figures = figures(view);
    for (id, _) in &figures {
        body.push_str(&format!("<div id=\"{id}\" class=\"chart\"></div>\n"));
    }

    let listing = view.expansion.member_listing();
    if !listing.is_empty() && (view.charts.map || view.charts.line) {
        body.push_str(&format!(
            "<details><summary>View all countries in selected regions</summary><p>{}</p></details>\n",
            escape_html(&listing)
        ));
    }

    let mut script = String::new();
    for (id, fig) in &figures {
        // `</` inside a JSON string would close the script element early.
        let json = fig.to_string().replace("</", "<\\/");
        script.push_str(&format!(
            "(function(f){{Plotly.newPlot(\"{id}\", f.data, f.layout, {{responsive: true}});}})({json});\n"
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
.notice {{ padding: 0.6rem 1rem; margin: 0.5rem 0; border-radius: 4px; }}
.notice.info {{ background: #e8f1fb; }}
.notice.warning {{ background: #fff4e0; }}
.chart {{ width: 100%; min-height: 480px; }}
footer {{ color: #888; font-size: 0.8rem; margin-top: 2rem; }}
</style>
</head>
<body>
{body}<footer>Generated {generated} from the World Bank Indicators API.</footer>
<script>
{script}</script>
</body>
</html>
"#,
        title = escape_html(&view.indicator.name),
        generated = Utc::now().format("%Y-%m-%d %H:%M UTC"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{ColorRange, MISSING_SENTINEL, MapRow};

    fn row(iso3: &str, value: f64) -> MapRow {
        MapRow {
            country: iso3.to_string(),
            value,
            formatted: String::new(),
            iso3: iso3.to_string(),
        }
    }

    #[test]
    fn missing_countries_get_their_own_trace() {
        let frame = MapFrame {
            year: 2020,
            rows: vec![row("AAA", MISSING_SENTINEL), row("BBB", 5.0)],
            range: ColorRange { min: 5.0, max: 5.0 },
        };
        let fig = map_figure(&frame, "t", "GDP");
        let data = fig["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["locations"], json!(["BBB"]));
        assert_eq!(data[0]["zmin"], json!(5.0));
        assert_eq!(data[1]["locations"], json!(["AAA"]));
        assert_eq!(data[1]["showscale"], json!(false));
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
