use console::style;
use libsibir_trace::{
    whois::truncate_for_display, GeoInfo, GithubProfile, PresenceState, ProbeResult,
};
use serde::Serialize;

pub const WHOIS_DISPLAY_LIMIT: usize = 3800;

pub const MSG_INVALID_DOMAIN: &str = "Invalid domain.";
pub const MSG_INVALID_TARGET: &str = "Invalid IP address or domain.";
pub const MSG_GITHUB_NOT_FOUND: &str = "Profile not found / rate limited.";
pub const MSG_GEO_FAILED: &str = "Could not get data for this IP.";

const PLACEHOLDER: &str = "—";

pub fn status_label(state: &PresenceState) -> String {
    match state {
        PresenceState::Found => style("Found").green().bold().to_string(),
        PresenceState::NotFound => style("Not found").red().to_string(),
        PresenceState::Unknown { code: 0 } => style("Unknown (no response)").yellow().to_string(),
        PresenceState::Unknown { code } => style(format!("Unknown ({code})")).yellow().to_string(),
    }
}

pub fn render_lookup(username: &str, results: &[ProbeResult]) -> String {
    let found = results.iter().filter(|r| r.outcome.is_found()).count();
    let mut out = format!(
        "{} {} ({}/{} found)\n\n",
        style("Username scan:").cyan().bold(),
        style(username).bold(),
        found,
        results.len()
    );
    for result in results {
        out.push_str(&format!(
            "  {:<12} {}\n  {:<12} {}\n",
            result.platform,
            status_label(&result.outcome),
            "",
            style(&result.url).dim()
        ));
    }
    out
}

pub fn render_github(profile: &GithubProfile) -> String {
    let mut out = format!(
        "{} {} {}\n\n",
        style("GitHub:").cyan().bold(),
        style(&profile.name).bold(),
        profile.html_url
    );
    let fields = [
        ("Bio", profile.bio.clone().unwrap_or_else(|| PLACEHOLDER.to_string())),
        ("Repositories", profile.public_repos.to_string()),
        (
            "Followers",
            format!("{}/{}", profile.followers, profile.following),
        ),
        (
            "Created",
            profile.created_at.clone().unwrap_or_else(|| "?".to_string()),
        ),
    ];
    for (label, value) in fields {
        out.push_str(&format!("  {:<14} {}\n", label, value));
    }
    if let Some(avatar) = &profile.avatar_url {
        out.push_str(&format!("  {:<14} {}\n", "Avatar", avatar));
    }
    out
}

pub fn render_geo(info: &GeoInfo) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| PLACEHOLDER.to_string());
    let coord = |v: Option<f64>| v.map_or_else(|| PLACEHOLDER.to_string(), |c| c.to_string());

    let mut out = format!("{} {}\n\n", style("IP:").cyan().bold(), style(info.ip).bold());
    let fields = [
        ("Country", text(&info.country)),
        ("Region", text(&info.region_name)),
        ("City", text(&info.city)),
        ("ISP", text(&info.isp)),
        ("Org", text(&info.org)),
        ("AS", text(&info.as_name)),
        ("Coordinates", format!("{}, {}", coord(info.lat), coord(info.lon))),
    ];
    for (label, value) in fields {
        out.push_str(&format!("  {:<12} {}\n", label, value));
    }
    out
}

pub fn render_whois(domain: &str, text: &str) -> String {
    format!(
        "{} {}\n\n{}\n",
        style("WHOIS:").cyan().bold(),
        style(domain).bold(),
        truncate_for_display(text, WHOIS_DISPLAY_LIMIT)
    )
}

#[derive(Serialize)]
struct ErrorLine<'a> {
    error: &'a str,
}

pub fn error_json(message: &str) -> String {
    serde_json::to_string(&ErrorLine { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        console::set_colors_enabled(false);
    }

    fn result(platform: &str, outcome: PresenceState, raw_status: u16) -> ProbeResult {
        ProbeResult {
            platform: platform.to_string(),
            url: format!("https://{}.test/alice", platform.to_lowercase()),
            outcome,
            raw_status,
            errored: raw_status == 0,
        }
    }

    #[test]
    fn status_labels_show_the_code() {
        plain();
        assert_eq!(status_label(&PresenceState::Found), "Found");
        assert_eq!(status_label(&PresenceState::NotFound), "Not found");
        assert_eq!(
            status_label(&PresenceState::Unknown { code: 0 }),
            "Unknown (no response)"
        );
        assert_eq!(
            status_label(&PresenceState::Unknown { code: 429 }),
            "Unknown (429)"
        );
    }

    #[test]
    fn lookup_report_keeps_order_and_counts() {
        plain();
        let report = render_lookup(
            "alice",
            &[
                result("A", PresenceState::Found, 200),
                result("B", PresenceState::NotFound, 404),
            ],
        );
        assert!(report.contains("(1/2 found)"));
        let a = report.find("https://a.test/alice").unwrap();
        let b = report.find("https://b.test/alice").unwrap();
        assert!(a < b);
    }

    #[test]
    fn whois_report_is_truncated() {
        plain();
        let long = "x".repeat(WHOIS_DISPLAY_LIMIT + 50);
        let report = render_whois("example.com", &long);
        assert!(report.contains("... (truncated)"));
        assert!(!report.contains(&"x".repeat(WHOIS_DISPLAY_LIMIT + 1)));
    }

    #[test]
    fn error_json_escapes() {
        assert_eq!(error_json("bad \"x\""), r#"{"error":"bad \"x\""}"#);
    }
}
