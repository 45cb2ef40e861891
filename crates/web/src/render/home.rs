use super::{escape, layout, NavItem};

struct Feature {
    title: &'static str,
    description: &'static str,
}

struct CallToAction {
    title: &'static str,
    description: &'static str,
    button: &'static str,
    href: &'static str,
}

const FEATURES: &[Feature] = &[
    Feature {
        title: "AI-Powered Image Analysis",
        description: "Upload images of terrain or flood-prone areas for an AI-powered flood risk \
                      assessment with risk level, recommendations and AI analysis.",
    },
    Feature {
        title: "AI-Powered Coordinates Analysis",
        description: "Analyze flood risk from latitude and longitude. Shows elevation, distance \
                      from water, the overall risk level and what to do about it.",
    },
    Feature {
        title: "Blog: Reducing Food Waste During Flood Relief",
        description: "Practical tips on safe packaging, pre-positioning, suitable foods, cold \
                      chain solutions and digital tools that cut food waste in relief operations.",
    },
];

const CALLS_TO_ACTION: &[CallToAction] = &[
    CallToAction {
        title: "AI-Powered Flood Detection",
        description: "Analyze flood risk using images or coordinates, view risk levels, elevation \
                      and distance from water, and get actionable recommendations.",
        button: "Start Flood Detection",
        href: "/flood-detection",
    },
    CallToAction {
        title: "Flood Relief Insights",
        description: "Strategies for reducing food waste during flood relief, from packaging \
                      to cold chains.",
        button: "Read Full Blog",
        href: "https://medium.com/@namranasir547/reducing-food-waste-during-flood-relief-why-it-matters-more-than-we-think-62330fde22d4",
    },
];

pub fn home_page() -> String {
    let features: String = FEATURES
        .iter()
        .map(|f| {
            format!(
                r#"<article class="card feature"><h3>{}</h3><p>{}</p></article>"#,
                escape(f.title),
                escape(f.description)
            )
        })
        .collect();

    let ctas: String = CALLS_TO_ACTION
        .iter()
        .map(|c| {
            // External links open in a new tab.
            let target = if c.href.starts_with("http") {
                r#" target="_blank" rel="noopener noreferrer""#
            } else {
                ""
            };
            format!(
                r#"<article class="card cta"><h2>{}</h2><p>{}</p><a class="button" href="{}"{}>{}</a></article>"#,
                escape(c.title),
                escape(c.description),
                escape(c.href),
                target,
                escape(c.button)
            )
        })
        .collect();

    let content = format!(
        r##"<section class="container hero">
<h2>Welcome to <span class="accent">Flood Aware!</span></h2>
<span class="badge badge-secondary">AI-Driven Flood Risk Detection</span>
<h1>Stay Safe, Stay Informed <br><span class="accent">anytime, anywhere</span></h1>
<p>Analyze your surroundings and prepare for flood risks with our AI-powered detection.</p>
<a class="button" href="#features-section">Explore Features</a>
</section>
<section id="features-section" class="container">
<h2>Features &amp; Insights</h2>
<p>Our platform helps communities assess flood risks through AI-powered image and coordinates analysis, with practical guidance from real-world flood relief operations.</p>
<div class="grid">{features}</div>
</section>
<section class="container">
<div class="grid">{ctas}</div>
</section>"##,
        features = features,
        ctas = ctas,
    );

    layout("FloodAware", NavItem::Home, None, &content)
}
