use floodaware_common::ids::PageId;
use floodaware_common::types::{AnalysisMode, ImageContentType, RiskAssessment};
use floodaware_common::validation;

use crate::submission::SubmissionSnapshot;

use super::{escape, layout, NavItem};

/// Seconds between reloads while an analysis is in flight.
const LOADING_REFRESH_SECS: u32 = 2;

/// Canonical URL of a mounted page.
pub fn page_path(page_id: PageId) -> String {
    format!("/flood-detection/{}", page_id)
}

/// Render the analyzer page for one mounted page's current state.
pub fn flood_detection_page(
    page_id: PageId,
    snapshot: &SubmissionSnapshot,
    max_image_bytes: u64,
) -> String {
    let base = page_path(page_id);

    let input_panel = match snapshot.mode {
        AnalysisMode::Coordinates => coordinates_panel(&base, snapshot),
        AnalysisMode::Image => image_panel(&base, snapshot, max_image_bytes),
    };

    let results = if snapshot.is_loading {
        let text = match snapshot.pending_mode.unwrap_or(snapshot.mode) {
            AnalysisMode::Coordinates => "Analyzing coordinates...",
            AnalysisMode::Image => "Analyzing image...",
        };
        format!(
            r#"<div class="loading"><span class="spinner"></span><p>{}</p></div>"#,
            text
        )
    } else if let Some(record) = &snapshot.last_result {
        results_panel(&record.assessment)
    } else {
        r#"<div class="empty"><p>Choose an analysis method to see flood risk assessment</p></div>"#
            .to_string()
    };

    let dialog = snapshot
        .last_error
        .as_deref()
        .map(|message| error_dialog(&base, message))
        .unwrap_or_default();

    let content = format!(
        r#"<section class="container detector">
<header class="detector-head">
<h1>Flood Detection System</h1>
<p>Analyze flood risk using coordinates or upload images for AI-powered terrain analysis</p>
</header>
<div class="grid">
<article class="card" id="analysis-methods">
<h2>Analysis Methods</h2>
{tabs}
{input_panel}
</article>
<article class="card" id="risk-assessment">
<h2>Risk Assessment</h2>
{results}
</article>
</div>
</section>
{dialog}"#,
        tabs = mode_tabs(&base, snapshot.mode),
        input_panel = input_panel,
        results = results,
        dialog = dialog,
    );

    let refresh = snapshot.is_loading.then_some(LOADING_REFRESH_SECS);
    layout("Flood Risk Analyzer", NavItem::Analyzer, refresh, &content)
}

// ---------------------------------------------------------------------------
// Input side
// ---------------------------------------------------------------------------

fn mode_tabs(base: &str, active: AnalysisMode) -> String {
    let tab = |mode: AnalysisMode, label: &str| {
        let class = if mode == active { r#" class="active""# } else { "" };
        format!(
            r#"<form method="post" action="{base}/mode"><input type="hidden" name="mode" value="{value}"><button type="submit"{class}>{label}</button></form>"#,
            base = base,
            value = mode.as_str(),
            class = class,
            label = label,
        )
    };
    format!(
        r#"<nav class="tabs">{}{}</nav>"#,
        tab(AnalysisMode::Coordinates, "Coordinates"),
        tab(AnalysisMode::Image, "Image Analysis")
    )
}

fn submit_button(label: &str, disabled: bool) -> String {
    if disabled {
        r#"<button class="button wide" type="submit" disabled>Analyzing...</button>"#.to_string()
    } else {
        format!(r#"<button class="button wide" type="submit">{}</button>"#, label)
    }
}

fn coordinates_panel(base: &str, snapshot: &SubmissionSnapshot) -> String {
    let button = if snapshot.is_loading {
        submit_button("", true)
    } else {
        submit_button("Analyze Coordinates", false)
    };
    format!(
        r#"<form class="coordinates" method="post" action="{base}/coordinates">
<div class="fields">
<div><label for="latitude">Latitude</label><input id="latitude" name="latitude" type="text" inputmode="decimal" placeholder="31.5204" value="{lat}"></div>
<div><label for="longitude">Longitude</label><input id="longitude" name="longitude" type="text" inputmode="decimal" placeholder="74.3587" value="{lng}"></div>
</div>
{button}
</form>"#,
        base = base,
        lat = escape(&snapshot.coordinate_input.latitude),
        lng = escape(&snapshot.coordinate_input.longitude),
        button = button,
    )
}

fn accept_list() -> String {
    ImageContentType::ALL
        .iter()
        .map(ImageContentType::as_mime)
        .collect::<Vec<_>>()
        .join(", ")
}

fn image_panel(base: &str, snapshot: &SubmissionSnapshot, max_image_bytes: u64) -> String {
    let upload = |label: &str| {
        format!(
            r#"<form class="upload" method="post" action="{base}/image" enctype="multipart/form-data"><input type="file" name="file" accept="{accept}" required><button class="button outline" type="submit">{label}</button></form>"#,
            base = base,
            accept = accept_list(),
            label = label,
        )
    };

    let dropzone = match &snapshot.selected_image {
        None => format!(
            r#"<div class="dropzone">
<p><strong>Upload terrain image</strong></p>
<p>JPG, PNG, or GIF up to {}</p>
{}
</div>"#,
            validation::size_label(max_image_bytes),
            upload("Choose Image")
        ),
        Some(info) => format!(
            r#"<div class="dropzone">
<img src="{base}/image/preview" alt="Preview">
<p class="file-name">{name}</p>
{change}
<form method="post" action="{base}/image/remove"><button class="button outline" type="submit">Remove</button></form>
</div>"#,
            base = base,
            name = escape(&info.file_name),
            change = upload("Change Image"),
        ),
    };

    let button = if snapshot.is_loading {
        submit_button("", true)
    } else if snapshot.selected_image.is_none() {
        r#"<button class="button wide" type="submit" disabled>Analyze Image</button>"#.to_string()
    } else {
        submit_button("Analyze Image", false)
    };

    format!(
        r#"{dropzone}
<form class="analyze-image" method="post" action="{base}/image/analyze">{button}</form>"#,
        dropzone = dropzone,
        base = base,
        button = button,
    )
}

// ---------------------------------------------------------------------------
// Result side
// ---------------------------------------------------------------------------

fn optional_section(title: &str, text: Option<&str>) -> String {
    match text {
        Some(text) => format!(
            r#"<div class="detail"><h4>{}</h4><p>{}</p></div>"#,
            title,
            escape(text)
        ),
        None => String::new(),
    }
}

fn results_panel(assessment: &RiskAssessment) -> String {
    let severity = assessment.risk_level.severity();

    let ai_analysis = match assessment.ai_analysis.as_deref() {
        Some(text) => format!(
            r#"<div class="ai-analysis"><h4>AI Analysis</h4><p class="narrative">{}</p></div>"#,
            escape(text)
        ),
        None => String::new(),
    };

    let recommendations: String = assessment
        .recommendations
        .iter()
        .map(|r| format!("<li>{}</li>", escape(r)))
        .collect();

    format!(
        r#"<div class="results">
<div class="risk-head"><span class="risk-label"><span class="icon">{icon}</span> Risk Level</span><span class="badge badge-{variant}">{level}</span></div>
<p class="description">{description}</p>
{location}
{water}
<div class="stats">
<div class="stat"><div class="value elevation">{elevation}m</div><div class="label">Elevation</div></div>
<div class="stat"><div class="value distance">{distance}m</div><div class="label">From Water</div></div>
</div>
{ai_analysis}
<div class="recommendations"><h4>Recommendations</h4><ul>{recommendations}</ul></div>
</div>"#,
        icon = severity.icon(),
        variant = severity.badge_variant(),
        level = assessment.risk_level,
        description = escape(&assessment.description),
        location = optional_section("Location Information", assessment.location_info.as_deref()),
        water = optional_section("Water Bodies", assessment.water_bodies.as_deref()),
        elevation = assessment.elevation,
        distance = assessment.distance_from_water,
        ai_analysis = ai_analysis,
        recommendations = recommendations,
    )
}

fn error_dialog(base: &str, message: &str) -> String {
    format!(
        r#"<div class="backdrop">
<div class="dialog" role="alertdialog" aria-labelledby="dialog-title">
<h3 id="dialog-title">&#9888; Input Error</h3>
<p class="message">{message}</p>
<form method="post" action="{base}/dismiss"><button class="button" type="submit">OK</button></form>
</div>
</div>"#,
        message = escape(message),
        base = base,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use floodaware_common::types::{
        AssessmentRecord, CoordinateInput, RiskLevel, SelectedImageInfo,
    };
    use scraper::{Html, Selector};

    fn empty_snapshot() -> SubmissionSnapshot {
        SubmissionSnapshot {
            mode: AnalysisMode::Coordinates,
            coordinate_input: CoordinateInput::default(),
            selected_image: None,
            is_loading: false,
            pending_mode: None,
            last_result: None,
            last_error: None,
        }
    }

    fn record(level: RiskLevel) -> AssessmentRecord {
        AssessmentRecord {
            assessment: RiskAssessment {
                risk_level: level,
                description: "Low-lying floodplain".into(),
                recommendations: vec!["Move valuables upstairs".into(), "Plan an exit".into()],
                elevation: 208.0,
                distance_from_water: 1250.5,
                location_info: Some("Lahore, Punjab".into()),
                water_bodies: None,
                ai_analysis: Some("Standing water visible.".into()),
            },
            mode: AnalysisMode::Coordinates,
            completed_at: Utc::now(),
        }
    }

    fn select<'a>(doc: &'a Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
        let selector = Selector::parse(selector).unwrap();
        doc.select(&selector).collect()
    }

    fn text(doc: &Html, selector: &str) -> String {
        select(doc, selector)
            .first()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default()
    }

    #[test]
    fn test_empty_page_prompts_for_method() {
        let id = PageId::new();
        let doc = Html::parse_document(&flood_detection_page(id, &empty_snapshot(), 10 << 20));

        assert_eq!(
            text(&doc, "#risk-assessment .empty p"),
            "Choose an analysis method to see flood risk assessment"
        );
        assert!(select(&doc, ".dialog").is_empty());
        assert!(select(&doc, r#"meta[http-equiv="refresh"]"#).is_empty());

        let form = select(&doc, "form.coordinates");
        assert_eq!(
            form[0].value().attr("action"),
            Some(format!("/flood-detection/{}/coordinates", id).as_str())
        );
        assert_eq!(text(&doc, "nav.tabs button.active"), "Coordinates");
    }

    #[test]
    fn test_high_risk_renders_destructive_badge() {
        let mut snapshot = empty_snapshot();
        snapshot.last_result = Some(record(RiskLevel::High));
        let doc = Html::parse_document(&flood_detection_page(PageId::new(), &snapshot, 10 << 20));

        assert_eq!(text(&doc, ".badge.badge-destructive"), "High");
        assert_eq!(text(&doc, ".value.elevation"), "208m");
        assert_eq!(text(&doc, ".value.distance"), "1250.5m");
        assert_eq!(select(&doc, ".recommendations li").len(), 2);
        assert_eq!(text(&doc, ".narrative"), "Standing water visible.");

        let headings: Vec<String> = select(&doc, ".detail h4")
            .iter()
            .map(|e| e.text().collect())
            .collect();
        assert_eq!(headings, vec!["Location Information".to_string()]);
    }

    #[test]
    fn test_badge_variants_by_level() {
        for (level, class) in [
            (RiskLevel::Low, ".badge-default"),
            (RiskLevel::Medium, ".badge-secondary"),
            (RiskLevel::VeryHigh, ".badge-destructive"),
        ] {
            let mut snapshot = empty_snapshot();
            snapshot.last_result = Some(record(level));
            let doc =
                Html::parse_document(&flood_detection_page(PageId::new(), &snapshot, 10 << 20));
            assert_eq!(text(&doc, class), level.as_str());
        }
    }

    #[test]
    fn test_loading_hides_result_and_refreshes() {
        let mut snapshot = empty_snapshot();
        snapshot.last_result = Some(record(RiskLevel::Low));
        snapshot.is_loading = true;
        snapshot.pending_mode = Some(AnalysisMode::Coordinates);
        let doc = Html::parse_document(&flood_detection_page(PageId::new(), &snapshot, 10 << 20));

        assert_eq!(text(&doc, ".loading p"), "Analyzing coordinates...");
        assert!(select(&doc, ".results").is_empty());
        assert_eq!(select(&doc, r#"meta[http-equiv="refresh"]"#).len(), 1);

        let button = select(&doc, "form.coordinates button");
        assert!(button[0].value().attr("disabled").is_some());
        assert_eq!(button[0].text().collect::<String>(), "Analyzing...");
    }

    #[test]
    fn test_error_dialog_escapes_message() {
        let mut snapshot = empty_snapshot();
        snapshot.last_error = Some("<script>alert(1)</script>".into());
        snapshot.coordinate_input = CoordinateInput::new("\"91", "abc");
        let html = flood_detection_page(PageId::new(), &snapshot, 10 << 20);
        let doc = Html::parse_document(&html);

        assert_eq!(text(&doc, ".dialog h3"), "\u{26A0} Input Error");
        assert_eq!(text(&doc, ".dialog .message"), "<script>alert(1)</script>");
        assert_eq!(text(&doc, ".dialog button"), "OK");
        assert!(!html.contains("<script>"));

        let lat = select(&doc, "#latitude");
        assert_eq!(lat[0].value().attr("value"), Some("\"91"));
    }

    #[test]
    fn test_image_mode_without_selection() {
        let mut snapshot = empty_snapshot();
        snapshot.mode = AnalysisMode::Image;
        let doc = Html::parse_document(&flood_detection_page(PageId::new(), &snapshot, 10 << 20));

        assert_eq!(text(&doc, "nav.tabs button.active"), "Image Analysis");
        assert_eq!(
            select(&doc, r#"input[type="file"]"#)[0].value().attr("accept"),
            Some("image/jpeg, image/jpg, image/png, image/gif")
        );
        assert!(text(&doc, ".dropzone").contains("JPG, PNG, or GIF up to 10MB"));
        let analyze = select(&doc, "form.analyze-image button");
        assert!(analyze[0].value().attr("disabled").is_some());
        assert!(select(&doc, ".dropzone img").is_empty());
    }

    #[test]
    fn test_upload_hint_for_sub_megabyte_limit() {
        let mut snapshot = empty_snapshot();
        snapshot.mode = AnalysisMode::Image;
        let doc = Html::parse_document(&flood_detection_page(PageId::new(), &snapshot, 256 << 10));

        assert!(text(&doc, ".dropzone").contains("JPG, PNG, or GIF up to 256KB"));
    }

    #[test]
    fn test_image_mode_with_selection_shows_preview() {
        let id = PageId::new();
        let mut snapshot = empty_snapshot();
        snapshot.mode = AnalysisMode::Image;
        snapshot.selected_image = Some(SelectedImageInfo {
            file_name: "river.png".into(),
            content_type: ImageContentType::Png,
            size: 2048,
        });
        let doc = Html::parse_document(&flood_detection_page(id, &snapshot, 10 << 20));

        let img = select(&doc, ".dropzone img");
        assert_eq!(
            img[0].value().attr("src"),
            Some(format!("/flood-detection/{}/image/preview", id).as_str())
        );
        assert_eq!(text(&doc, ".file-name"), "river.png");
        let analyze = select(&doc, "form.analyze-image button");
        assert!(analyze[0].value().attr("disabled").is_none());
        assert_eq!(analyze[0].text().collect::<String>(), "Analyze Image");
        assert!(text(&doc, ".dropzone").contains("Remove"));
    }

    #[test]
    fn test_loading_image_text() {
        let mut snapshot = empty_snapshot();
        snapshot.mode = AnalysisMode::Image;
        snapshot.is_loading = true;
        snapshot.pending_mode = Some(AnalysisMode::Image);
        let doc = Html::parse_document(&flood_detection_page(PageId::new(), &snapshot, 10 << 20));
        assert_eq!(text(&doc, ".loading p"), "Analyzing image...");
    }
}
