use verlock_core::constraint::VersionConstraint;
use verlock_core::version::Version;

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

fn c(s: &str) -> VersionConstraint {
    VersionConstraint::parse(s).unwrap()
}

#[test]
fn highest_compatible_wins() {
    // Candidates arrive sorted descending, the order an index cache serves.
    let candidates: Vec<Version> = ["1.2.5", "1.2.0", "1.0.0"].iter().map(|s| v(s)).collect();
    assert_eq!(
        c("^1.0.0").highest_satisfying(&candidates),
        Some(&v("1.2.5"))
    );
}

#[test]
fn intersection_order_is_irrelevant() {
    let a = c("^1.0.0");
    let b = c("<1.5.0");
    let d = c("!=1.2.0");

    let left = a.intersect(&b).intersect(&d);
    let right = d.intersect(&b).intersect(&a);

    for s in ["1.0.0", "1.2.0", "1.4.9", "1.5.0", "2.0.0"] {
        assert_eq!(left.matches(&v(s)), right.matches(&v(s)), "version {s}");
    }
}

#[test]
fn intersection_narrows() {
    let merged = c("^1.0.0").intersect(&c(">=1.2.0"));
    assert!(!merged.matches(&v("1.1.0")));
    assert!(merged.matches(&v("1.2.0")));
    assert!(!merged.matches(&v("2.0.0")));
}

#[test]
fn matches_is_total_over_pre_releases() {
    // No operator panics on pre-release input.
    for expr in ["^1.0.0", "~1.0.0", ">=1.0.0", "*", "1.*", "!=1.0.0", "==1.0.0"] {
        let constraint = c(expr);
        constraint.matches(&v("1.0.0-alpha.1"));
        constraint.matches(&v("0.0.0-x"));
    }
}

#[test]
fn caret_and_tilde_differ_on_minor_bumps() {
    assert!(c("^1.2.0").matches(&v("1.3.0")));
    assert!(!c("~1.2.0").matches(&v("1.3.0")));
}

#[test]
fn disjoint_detects_the_classic_split() {
    // The shared-dependency conflict shape: ^1.0 vs ^2.0.
    assert!(c("^1.0.0").disjoint(&c("^2.0.0")));
    assert!(c("~1.2.0").disjoint(&c("~1.3.0")));
    assert!(c("1.*").disjoint(&c("2.*")));
    assert!(!c("*").disjoint(&c("^2.0.0")));
}

#[test]
fn exact_pin_round_trips_through_display() {
    let pin = c("==1.4.2");
    let reparsed: VersionConstraint = pin.to_string().parse().unwrap();
    assert_eq!(reparsed, pin);
}
