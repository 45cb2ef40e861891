use super::escape;

/// Which header link is highlighted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavItem {
    Home,
    Analyzer,
    About,
}

const STYLES: &str = r#"
*{box-sizing:border-box}
body{margin:0;font-family:Inter,system-ui,sans-serif;color:#111827;background:#fff}
a{color:inherit}
.accent{color:#059669}
.hero{padding:6rem 1rem}
.site-header{position:sticky;top:0;z-index:20;border-bottom:1px solid #e5e7eb;background:rgba(255,255,255,.9)}
.site-header nav{max-width:72rem;margin:0 auto;padding:0 1rem;height:4rem;display:flex;align-items:center;justify-content:space-between}
.brand{font-size:1.25rem;font-weight:700;color:#059669;text-decoration:none}
.nav-links a{margin-left:.75rem;padding:.5rem .9rem;border:1px solid #d1d5db;border-radius:.4rem;text-decoration:none}
.nav-links a.active,.nav-links a:hover{background:#059669;color:#fff;border-color:#059669}
main{min-height:100vh}
.container{max-width:72rem;margin:0 auto;padding:2rem 1rem}
.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(20rem,1fr));gap:1.5rem}
.card{border:1px solid #a7f3d0;border-radius:.75rem;padding:1.5rem;background:#fff;box-shadow:0 4px 12px rgba(0,0,0,.06)}
.card h2{margin-top:0;color:#334155}
.button{display:inline-block;padding:.7rem 1.2rem;border:0;border-radius:.4rem;background:#059669;color:#fff;font-weight:600;cursor:pointer;text-decoration:none}
.button[disabled]{opacity:.5;cursor:not-allowed}
.button.outline{background:#fff;color:#047857;border:1px solid #6ee7b7}
.button.wide{width:100%}
.tabs{display:grid;grid-template-columns:1fr 1fr;gap:.25rem;margin-bottom:1rem}
.tabs button{width:100%;padding:.5rem;border:0;border-radius:.3rem;background:#f3f4f6;cursor:pointer}
.tabs button.active{background:#d1fae5;color:#047857;font-weight:600}
label{display:block;font-weight:500;margin-bottom:.25rem}
input[type=text]{width:100%;padding:.5rem;border:1px solid #d1d5db;border-radius:.3rem}
.fields{display:grid;grid-template-columns:1fr 1fr;gap:1rem;margin-bottom:1rem}
.dropzone{border:2px dashed #6ee7b7;border-radius:.5rem;padding:1.5rem;text-align:center;margin-bottom:1rem}
.dropzone img{max-height:12rem;border-radius:.5rem}
.badge{padding:.25rem .6rem;border-radius:999px;font-size:.85rem;font-weight:600}
.badge-default{background:#059669;color:#fff}
.badge-secondary{background:#f3f4f6;color:#111827}
.badge-destructive{background:#dc2626;color:#fff}
.risk-head{display:flex;justify-content:space-between;align-items:center}
.stats{display:grid;grid-template-columns:1fr 1fr;gap:1rem}
.stat{padding:1rem;background:#ecfdf5;border-radius:.5rem}
.stat .value{font-size:1.5rem;font-weight:700;color:#047857}
.stat .label{font-size:.75rem;color:#059669}
.narrative{padding:.75rem;background:#ecfdf5;border-radius:.5rem;white-space:pre-wrap}
.empty,.loading{text-align:center;padding:3rem 0;color:#10b981}
.spinner{display:inline-block;width:2rem;height:2rem;border:4px solid #059669;border-top-color:transparent;border-radius:50%;animation:spin 1s linear infinite}
@keyframes spin{to{transform:rotate(360deg)}}
.backdrop{position:fixed;inset:0;background:rgba(0,0,0,.4);display:flex;align-items:center;justify-content:center;z-index:50}
.dialog{max-width:28rem;background:#fff;border-radius:.75rem;padding:1.5rem}
.dialog h3{margin-top:0;color:#065f46}
.dialog p{color:#059669}
.site-footer{background:#065f46;padding:3rem 1rem;text-align:center;color:#d1fae5}
.site-footer .name{font-size:1.1rem;font-weight:700;color:#fff}
"#;

/// Wrap page content in the shared document shell: head, header navigation
/// and footer. `refresh_secs` adds a meta refresh, used while an analysis
/// is in flight.
pub fn layout(title: &str, active: NavItem, refresh_secs: Option<u32>, content: &str) -> String {
    let refresh = refresh_secs
        .map(|s| format!(r#"<meta http-equiv="refresh" content="{}">"#, s))
        .unwrap_or_default();

    let link = |item: NavItem, href: &str, text: &str| {
        let class = if item == active { r#" class="active""# } else { "" };
        format!(r#"<a href="{}"{}>{}</a>"#, href, class, text)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="description" content="AI-Driven Flood Risk Detection">
{refresh}
<title>{title}</title>
<style>{styles}</style>
</head>
<body>
<header class="site-header">
<nav>
<a class="brand" href="/">&#127754; FloodAware</a>
<div class="nav-links">{analyzer}{about}</div>
</nav>
</header>
<main>
{content}
</main>
<footer class="site-footer">
<p class="name">FloodAware</p>
<p>Empowering communities with AI-powered flood risk detection and awareness.</p>
</footer>
</body>
</html>
"#,
        refresh = refresh,
        title = escape(title),
        styles = STYLES,
        analyzer = link(NavItem::Analyzer, "/flood-detection", "Flood Risk Analyzer"),
        about = link(NavItem::About, "/about", "About"),
        content = content,
    )
}
