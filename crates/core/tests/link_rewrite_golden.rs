use insta::assert_snapshot;
use notion_tidy_core::links::{LinkRewriter, rewrite_links};

#[test]
fn golden_security_index() {
    let input = include_str!("fixtures/security_index.md");

    let result = rewrite_links(input);

    assert_snapshot!(result.trim_end(), @r"
    # Security Cheat Sheets

    - [SQL Injection Cheat Sheet Injection Cheat Sheet](Cheat%20Sheets/SQL%20Injection%20Cheat%20Sheet.md)
    - [XSS Cheat Sheet Cheat Sheet](Cheat%20Sheets/XSS%20Cheat%20Sheet.md)
    - [Password Storage](Cheat%20Sheets/Password%20Storage.md)

    See [OWASP](https://owasp.org) and ![logo](logo.png).
    ");
}

#[test]
fn golden_security_index_is_stable() {
    let input = include_str!("fixtures/security_index.md");

    let once = rewrite_links(input);
    let twice = rewrite_links(&once);

    assert_eq!(once, twice);
}

#[test]
fn rewritten_targets_are_clean() {
    let input = include_str!("fixtures/security_index.md");
    let rewriter = LinkRewriter::default();

    let links = rewriter.find_links(input);
    let rewritten: Vec<_> = links.iter().filter_map(|l| l.rewritten_path.as_deref()).collect();

    assert_eq!(rewritten.len(), 3);
    for target in rewritten {
        assert!(target.starts_with("Cheat%20Sheets/"), "{target}");
        assert!(target.ends_with(".md"), "{target}");
        assert!(!target.contains(' '), "{target}");
        assert!(!target.contains("Sheet%20Cheat%20Sheet"), "{target}");
    }
}
