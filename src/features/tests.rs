//! Feature pipeline contract tests
//!
//! These pin every formula with literal examples. If any of them breaks, the
//! extractor no longer matches the pipeline the model was trained against —
//! fix the code, never the test.

use super::extract::extract;
use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};

fn assert_all_in_unit_range(url: &str) {
    let v = extract(url);
    assert_eq!(v.values.len(), FEATURE_COUNT);
    for (i, &x) in v.values.iter().enumerate() {
        assert!(
            (0.0..=1.0).contains(&x) && x.is_finite(),
            "feature {} ({}) out of range for {:?}: {}",
            i,
            FEATURE_LAYOUT[i],
            url,
            x
        );
    }
}

#[test]
fn test_always_ten_values_in_range() {
    for url in [
        "http://example.com",
        "https://login.secure-bank.com-verify.account.evil.tk/confirm?user=1",
        "http://192.168.0.1/login",
        "http://user@evil.com",
        "http://xn--80ak6aa92e.com",
        "not a url",
        "",
        "https://",
        "ftp://weird.example/path",
        "http://a.b.c.d.e.f.g.h.i.j.com/very/long/path/segments/x?a=1&b=2&c=3",
    ] {
        assert_all_in_unit_range(url);
    }
}

#[test]
fn test_malformed_url_yields_zero_vector() {
    for bad in ["not a url", "", "://missing-scheme", "   "] {
        let v = extract(bad);
        assert!(
            v.values.iter().all(|&x| x == 0.0),
            "expected zero vector for {:?}, got {:?}",
            bad,
            v.values
        );
    }
}

#[test]
fn test_ip_literal_and_login_keyword() {
    let v = extract("http://192.168.0.1/login");
    assert_eq!(v.get_by_name("host_is_ip"), Some(1.0));
    assert_eq!(v.get_by_name("login_keyword"), Some(1.0));
}

#[test]
fn test_punycode_host() {
    let v = extract("http://xn--80ak6aa92e.com");
    assert_eq!(v.get_by_name("punycode_host"), Some(1.0));

    let v = extract("http://example.com");
    assert_eq!(v.get_by_name("punycode_host"), Some(0.0));
}

#[test]
fn test_url_length_scaling() {
    // 18 characters / 512
    let v = extract("http://example.com");
    assert!((v.values[0] - 18.0 / 512.0).abs() < 1e-6);

    // Anything >= 512 chars saturates at 1.0
    let long = format!("http://example.com/{}", "a".repeat(600));
    let v = extract(&long);
    assert_eq!(v.values[0], 1.0);
}

#[test]
fn test_host_dots_scaling_and_cap() {
    let v = extract("http://example.com");
    assert!((v.get_by_name("host_dots").unwrap() - 0.2).abs() < 1e-6);

    // 6 dots / 5 caps at 1.0
    let v = extract("http://a.b.c.d.e.f.com");
    assert_eq!(v.get_by_name("host_dots"), Some(1.0));
}

#[test]
fn test_host_hyphens_scaling() {
    let v = extract("http://a-b-c.com");
    assert!((v.get_by_name("host_hyphens").unwrap() - 0.4).abs() < 1e-6);
}

#[test]
fn test_at_symbol() {
    assert_eq!(extract("http://user@evil.com").get_by_name("has_at_symbol"), Some(1.0));
    assert_eq!(extract("http://evil.com").get_by_name("has_at_symbol"), Some(0.0));
}

#[test]
fn test_path_length_scaling() {
    // path "/" = 1 char
    let v = extract("http://example.com");
    assert!((v.get_by_name("path_length").unwrap() - 1.0 / 200.0).abs() < 1e-6);

    let long = format!("http://example.com/{}", "p".repeat(400));
    let v = extract(&long);
    assert_eq!(v.get_by_name("path_length"), Some(1.0));
}

#[test]
fn test_query_param_count() {
    let v = extract("http://a.com/?a=1&b=2&c=3");
    assert!((v.get_by_name("query_params").unwrap() - 0.3).abs() < 1e-6);

    let v = extract("http://a.com/plain");
    assert_eq!(v.get_by_name("query_params"), Some(0.0));
}

#[test]
fn test_host_entropy() {
    // Single repeated character: zero entropy
    let v = extract("http://aaaa");
    assert_eq!(v.get_by_name("host_entropy"), Some(0.0));

    // "example.com": H ~= 3.0957 bits -> /8
    let v = extract("http://example.com");
    let e = v.get_by_name("host_entropy").unwrap();
    assert!((e - 3.0957 / 8.0).abs() < 1e-3, "entropy was {}", e);
}

#[test]
fn test_login_keywords_case_insensitive() {
    for url in [
        "http://x.com/LOGIN",
        "http://x.com/Verify",
        "http://secure.x.com/",
        "http://x.com/account",
        "http://x.com/update",
        "http://x.com/confirm",
    ] {
        assert_eq!(
            extract(url).get_by_name("login_keyword"),
            Some(1.0),
            "keyword not detected in {}",
            url
        );
    }
    assert_eq!(extract("http://plain.example.com/page").get_by_name("login_keyword"), Some(0.0));
}

#[test]
fn test_determinism() {
    let a = extract("http://secure-login-verify.badsite.tk");
    let b = extract("http://secure-login-verify.badsite.tk");
    assert_eq!(a, b);
}
