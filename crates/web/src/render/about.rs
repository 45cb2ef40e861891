use super::{layout, NavItem};

const CONTENT: &str = r#"<section class="container about">
<h1>About FloodAware</h1>
<p>FloodAware is an AI-powered flood risk platform. Enter coordinates or upload a photo of the terrain and it returns a risk level, the elevation and distance from nearby water, and concrete recommendations.</p>
<p>We keep improving our AI models, the accuracy of their predictions, and what the platform can do for the communities that rely on it.</p>

<h2>The Reason Behind FloodAware</h2>
<p>Floods displace families, destroy crops and cut off supply routes every year. Warnings often arrive late or never reach the people who need them most. During relief, food that could feed affected families is wasted through poor packaging, storage and planning.</p>
<ul>
<li>Risk information is hard to find and harder to read.</li>
<li>Preparation starts too late.</li>
<li>Relief supplies are lost before they reach people.</li>
</ul>

<h2>Our Team</h2>
<div class="grid">
<article class="card"><h3>Software Developer</h3><p>Built the technical foundation of FloodAware, including the flood detection pipeline and the platform infrastructure.</p></article>
<article class="card"><h3>Food Science Specialist</h3><p>Raised awareness around food waste in relief work and shared community-driven relief insights through the blog.</p></article>
</div>

<h2>Our Mission</h2>
<p>FloodAware is a mission-driven platform that uses AI to detect flood risks, provide actionable insights and support resilience.</p>
<p>Our goal is to empower communities with tools and knowledge so they can prepare, respond and recover faster in the face of natural disasters.</p>

<h2>What We Do</h2>
<ul>
<li>Assess flood risk for any location from its coordinates.</li>
<li>Analyze uploaded terrain images for visible flood hazards.</li>
<li>Share guidance on reducing waste during flood relief.</li>
</ul>
<a class="button" href="/flood-detection">Try the Flood Risk Analyzer</a>
</section>"#;

pub fn about_page() -> String {
    layout("About FloodAware", NavItem::About, None, CONTENT)
}
