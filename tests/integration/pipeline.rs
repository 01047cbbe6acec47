//! End-to-end card pipeline tests.
//!
//! Drives `CardBuilder` with scripted providers and checks isolation,
//! concurrency and determinism of the whole request path.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use goalcard::engine::CardBuilder;
use goalcard::odds::checked_no_vig;
use goalcard::strategy::scan;
use goalcard::types::{CardRequest, GoalcardError, OddsQuote};

use crate::mock_provider::{attacking_prior, cagey_prior, MockProvider};

fn builder(timeout: Duration) -> CardBuilder {
    CardBuilder::new(0.40, timeout)
}

fn request() -> CardRequest {
    CardRequest {
        home: Some("Brentford".into()),
        away: Some("Fulham".into()),
        league_code: Some("PL".into()),
        markets: vec![
            OddsQuote::new("FT Over 1.5", 1.18, 4.60),
            OddsQuote::new("FT Over 2.5", 1.62, 2.30),
            OddsQuote::new("FT Under 3.5", 1.36, 3.10),
        ],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_anchor_only_card() {
    let req = CardRequest {
        markets: vec![OddsQuote::new("FT Over 1.5", 1.18, 4.60)],
        ..Default::default()
    };
    let report = builder(Duration::from_secs(6)).build(&req).await.unwrap();

    assert_eq!(report.fixture, "unknown fixture");
    assert_eq!(report.sources.len(), 1);
    assert_eq!(report.sources[0].name, "bookmaker");
    assert!((report.sources[0].weight - 0.40).abs() < 1e-12);
    assert_eq!(report.disagreement, 0.0);
    assert!((report.p_card.coverage - 0.40).abs() < 1e-12);

    let expected = checked_no_vig(1.18, 4.60).unwrap();
    assert!((report.p_card.vector.over_15 - expected).abs() < 1e-12);
    assert!((report.p_card.vector.ht_over_05 - (0.70 * expected + 0.05)).abs() < 1e-12);
}

#[tokio::test]
async fn test_empty_markets_rejected_before_providers() {
    let provider = MockProvider::returning("ratings", attacking_prior("ratings", 0.3));
    let calls = provider.call_counter();
    let b = builder(Duration::from_secs(6)).with_provider(Arc::new(provider));

    let err = b.build(&CardRequest::default()).await.unwrap_err();
    assert!(matches!(err, GoalcardError::InvalidRequest(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_provider_prior_shifts_consensus() {
    let anchor_only = builder(Duration::from_secs(6)).build(&request()).await.unwrap();
    let with_prior = builder(Duration::from_secs(6))
        .with_provider(Arc::new(MockProvider::returning(
            "ratings",
            attacking_prior("ratings", 0.3),
        )))
        .build(&request())
        .await
        .unwrap();

    assert_eq!(with_prior.sources.len(), 2);
    assert_eq!(with_prior.sources[1].name, "ratings");
    assert!(with_prior.p_card.coverage > anchor_only.p_card.coverage);
    assert!((with_prior.p_card.coverage - 0.5).abs() < 1e-12);
    assert!(with_prior.disagreement > 0.0);
    // Attacking prior pulls Over 2.5 above the market's no-vig 0.587.
    assert!(with_prior.p_card.vector.over_25 > anchor_only.p_card.vector.over_25);
}

#[tokio::test]
async fn test_slow_provider_times_out_in_isolation() {
    let b = builder(Duration::from_millis(150))
        .with_provider(Arc::new(MockProvider::returning(
            "ratings",
            attacking_prior("ratings", 0.3),
        )))
        .with_provider(Arc::new(
            MockProvider::returning("sluggish", cagey_prior("sluggish", 0.5))
                .delayed(Duration::from_secs(5)),
        ));

    let started = Instant::now();
    let report = b.build(&request()).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());

    let names: Vec<_> = report.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["bookmaker", "ratings", "sluggish"]);
    let slow = &report.sources[2];
    assert_eq!(slow.weight, 0.0);
    assert!(slow.note.starts_with("failed:"), "{}", slow.note);
    assert!(slow.note.contains("timed out"), "{}", slow.note);

    // The timed-out card never enters the blend.
    let without_slow = builder(Duration::from_secs(6))
        .with_provider(Arc::new(MockProvider::returning(
            "ratings",
            attacking_prior("ratings", 0.3),
        )))
        .build(&request())
        .await
        .unwrap();
    assert_eq!(report.p_card, without_slow.p_card);
    assert_eq!(report.disagreement, without_slow.disagreement);
}

#[tokio::test]
async fn test_failed_and_skipped_providers() {
    let report = builder(Duration::from_secs(6))
        .with_provider(Arc::new(MockProvider::failing("broken", "HTTP 503")))
        .with_provider(Arc::new(MockProvider::skipping("no-credential")))
        .build(&request())
        .await
        .unwrap();

    let names: Vec<_> = report.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["bookmaker", "broken"]);
    assert!(report.sources[1].note.contains("HTTP 503"));
    assert_eq!(report.disagreement, 0.0);
    assert!((report.p_card.coverage - 0.40).abs() < 1e-12);

    let providers = report.reasons.iter().find(|r| r.key == "providers").unwrap();
    assert!(providers.note.contains("0 of 2"), "{}", providers.note);
    assert!(providers.note.contains("1 skipped"));
    assert!(providers.note.contains("1 failed"));
}

#[tokio::test]
async fn test_panicking_provider_is_isolated() {
    let b = builder(Duration::from_secs(6))
        .with_provider(Arc::new(MockProvider::returning(
            "ratings",
            attacking_prior("ratings", 0.3),
        )))
        .with_provider(Arc::new(MockProvider::panicking("buggy", "provider bug")));

    let report = tokio::spawn(async move { b.build(&request()).await })
        .await
        .expect("card build must survive a provider panic")
        .unwrap();

    let names: Vec<_> = report.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["bookmaker", "ratings", "buggy"]);
    let buggy = &report.sources[2];
    assert_eq!(buggy.weight, 0.0);
    assert!(buggy.note.starts_with("failed: provider panicked"), "{}", buggy.note);
    assert!(buggy.note.contains("provider bug"));
    assert!(report.sources[1].weight > 0.0);
    assert!(report.p_card.vector.iter().all(|(_, v)| v.is_finite()));
}

#[tokio::test]
async fn test_infinite_weight_prior_never_reaches_card() {
    let report = builder(Duration::from_secs(6))
        .with_provider(Arc::new(MockProvider::returning(
            "runaway",
            attacking_prior("runaway", f64::INFINITY),
        )))
        .build(&request())
        .await
        .unwrap();

    assert!(report.p_card.vector.iter().all(|(_, v)| v.is_finite()));
    assert!((report.p_card.coverage - 0.40).abs() < 1e-12);
    assert_eq!(report.sources[1].weight, 0.0);
    assert!(report.sources[1].note.contains("non-finite weight"));
}

#[tokio::test]
async fn test_providers_called_concurrently() {
    let delay = Duration::from_millis(400);
    let b = builder(Duration::from_secs(3))
        .with_provider(Arc::new(
            MockProvider::returning("a", attacking_prior("a", 0.2)).delayed(delay),
        ))
        .with_provider(Arc::new(
            MockProvider::returning("b", cagey_prior("b", 0.2)).delayed(delay),
        ))
        .with_provider(Arc::new(
            MockProvider::returning("c", attacking_prior("c", 0.2)).delayed(delay),
        ));

    let started = Instant::now();
    let report = b.build(&request()).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(1000), "took {elapsed:?}");
    assert_eq!(report.sources.len(), 4);
    assert!(report.sources.iter().all(|s| s.weight > 0.0));
}

#[tokio::test]
async fn test_identical_inputs_give_identical_cards() {
    let first = MockProvider::returning("ratings", attacking_prior("ratings", 0.3));
    let second = MockProvider::returning("model", cagey_prior("model", 0.25));
    let (c1, c2) = (first.call_counter(), second.call_counter());
    let b = builder(Duration::from_secs(6))
        .with_provider(Arc::new(first))
        .with_provider(Arc::new(second));

    let a = b.build(&request()).await.unwrap();
    let z = b.build(&request()).await.unwrap();

    assert_eq!(a.p_card, z.p_card);
    assert_eq!(a.disagreement, z.disagreement);
    assert_eq!(a.reasons, z.reasons);
    assert_eq!(c1.load(Ordering::SeqCst), 2);
    assert_eq!(c2.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_card_then_scan() {
    let report = builder(Duration::from_secs(6))
        .with_provider(Arc::new(MockProvider::returning(
            "ratings",
            cagey_prior("ratings", 0.3),
        )))
        .build(&request())
        .await
        .unwrap();

    let candidates = vec![
        OddsQuote::new("FT Under 4.5", 1.22, 4.20),
        OddsQuote::new("FT Over 2.5", 1.62, 2.30),
        OddsQuote::new("Asian Handicap -1", 2.1, 1.75),
    ];
    let outcome = scan(&report.p_card, &candidates);

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.passes.len() + outcome.near_misses.len(), 2);
    for d in outcome.passes.iter().chain(&outcome.near_misses) {
        assert_eq!(
            d.blended_probability,
            report.p_card.vector.get(d.quote.outcome().unwrap())
        );
        assert_eq!(d.passes, d.shortfall == 0.0);
    }
}
