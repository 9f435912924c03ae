//! URL feature extraction
//!
//! Deterministic `raw URL -> FeatureVector` mapping. This is a contract, not
//! an implementation detail: the local model was trained against these exact
//! formulas, so order and scaling must stay bit-stable (see layout.rs and
//! the literal tests in tests.rs).

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::layout::FEATURE_COUNT;
use super::vector::FeatureVector;

/// Keywords that mark a URL as login/credential themed (case-insensitive,
/// matched against the raw URL).
pub const LOGIN_KEYWORDS: &[&str] = &["login", "verify", "secure", "account", "update", "confirm"];

/// Dotted-quad IPv4 literal
static IPV4_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("valid ipv4 pattern"));

/// Extract the 10-value feature vector from a raw URL.
///
/// Never fails: any parse error yields the all-zero vector. Every value is
/// clamped to [0, 1].
pub fn extract(raw_url: &str) -> FeatureVector {
    let parsed = match Url::parse(raw_url) {
        Ok(u) => u,
        Err(e) => {
            log::debug!("feature extraction fallback for {:?}: {}", raw_url, e);
            return FeatureVector::zero();
        }
    };

    let host = parsed.host_str().unwrap_or("").to_lowercase();
    let path = parsed.path();

    let mut values = [0.0f32; FEATURE_COUNT];

    // 0: url_length = min(len, 512) / 512
    values[0] = (raw_url.len().min(512) as f32) / 512.0;

    // 1: host_dots = dots in hostname / 5, capped at 1
    values[1] = (count_char(&host, '.') as f32 / 5.0).min(1.0);

    // 2: host_is_ip
    values[2] = if IPV4_PATTERN.is_match(&host) { 1.0 } else { 0.0 };

    // 3: login_keyword (raw URL, case-insensitive)
    values[3] = if has_login_keyword(raw_url) { 1.0 } else { 0.0 };

    // 4: host_hyphens = hyphens in hostname / 5, capped at 1
    values[4] = (count_char(&host, '-') as f32 / 5.0).min(1.0);

    // 5: has_at_symbol (raw URL)
    values[5] = if raw_url.contains('@') { 1.0 } else { 0.0 };

    // 6: punycode_host
    values[6] = if host.contains("xn--") { 1.0 } else { 0.0 };

    // 7: path_length = min(len, 200) / 200
    values[7] = (path.len().min(200) as f32) / 200.0;

    // 8: query_params = parameter count / 10, capped at 1
    values[8] = (parsed.query_pairs().count() as f32 / 10.0).min(1.0);

    // 9: host_entropy = Shannon entropy of hostname chars / 8, capped at 1
    values[9] = (shannon_entropy(&host) / 8.0).min(1.0);

    FeatureVector::from_values(values)
}

/// True if the raw URL contains any login-related keyword.
pub fn has_login_keyword(raw_url: &str) -> bool {
    let lower = raw_url.to_lowercase();
    LOGIN_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn count_char(s: &str, c: char) -> usize {
    s.chars().filter(|&x| x == c).count()
}

/// Shannon entropy of the character distribution, in bits per character.
fn shannon_entropy(s: &str) -> f32 {
    let len = s.chars().count();
    if len == 0 {
        return 0.0;
    }

    let mut freq = std::collections::HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0usize) += 1;
    }

    let total = len as f32;
    freq.values()
        .map(|&count| {
            let p = count as f32 / total;
            -p * p.log2()
        })
        .sum()
}
