//! Full discovery runs against mock sources.

use std::sync::Arc;
use std::time::Duration;

use prospector_common::{
    AudienceMetrics, ContentItem, ContentType, FileConfig, PricingTier, SourceError, SourceKind,
    SourceRecord,
};
use prospector_resolve::testing::{record, InFlight, MockAdapter};
use prospector_resolve::{DiscoveryRequest, Prospector, ResolveError, SourceRegistry};
use tokio_util::sync::CancellationToken;

fn jane_fit_youtube() -> SourceRecord {
    let mut a = record(SourceKind::YouTube, "UCjanefit", "Jane Fit");
    a.bio = "Daily workouts. Join the community: patreon.com/janefit".into();
    a.social = prospector_common::extract::social_references(&a.bio);
    a.audience = AudienceMetrics {
        subscribers: 5000,
        ..Default::default()
    };
    a
}

fn jane_fit_patreon() -> SourceRecord {
    let mut b = record(SourceKind::Patreon, "janefit", "Jane Fit");
    b.email = Some("jane@fit.com".into());
    b
}

fn jane_fitness_skool() -> SourceRecord {
    let mut c = record(SourceKind::Skool, "jane-fitness", "Jane Fitness");
    c.audience = AudienceMetrics {
        members: 200,
        ..Default::default()
    };
    c
}

fn prospector(registry: SourceRegistry) -> Prospector {
    Prospector::new(registry, &FileConfig::default())
}

#[tokio::test]
async fn jane_fit_resolves_to_two_ranked_entities() {
    let youtube = Arc::new(MockAdapter::new(SourceKind::YouTube).on_discover(vec![jane_fit_youtube()]));
    let skool = Arc::new(MockAdapter::new(SourceKind::Skool).on_discover(vec![jane_fitness_skool()]));
    let patreon = Arc::new(MockAdapter::new(SourceKind::Patreon).on_entity(jane_fit_patreon()));

    let registry = SourceRegistry::new()
        .with(youtube)
        .with(skool)
        .with(patreon.clone());

    let outcome = prospector(registry)
        .discover(DiscoveryRequest::new(["fitness coach"]))
        .await
        .unwrap();

    assert_eq!(outcome.entities.len(), 2);

    let merged = &outcome.entities[0];
    assert_eq!(merged.name(), "Jane Fit");
    assert_eq!(merged.email(), Some("jane@fit.com"));
    assert_eq!(merged.audience_size(), 5000);
    assert_eq!(merged.record_count(), 2);
    assert_eq!(patreon.fetched_ids(), vec!["janefit"]);

    let standalone = &outcome.entities[1];
    assert_eq!(standalone.name(), "Jane Fitness");
    assert_eq!(standalone.record_count(), 1);
    assert_eq!(standalone.audience_size(), 200);

    assert_eq!(outcome.report.discovered[&SourceKind::YouTube], 1);
    assert_eq!(outcome.report.enrichment.merged, 1);
}

#[tokio::test]
async fn jane_fit_discovered_on_both_sources_merges_by_name_without_refetch() {
    let youtube = Arc::new(MockAdapter::new(SourceKind::YouTube).on_discover(vec![jane_fit_youtube()]));
    let skool = Arc::new(MockAdapter::new(SourceKind::Skool).on_discover(vec![jane_fitness_skool()]));
    let patreon = Arc::new(
        MockAdapter::new(SourceKind::Patreon)
            .on_discover(vec![jane_fit_patreon()])
            .on_entity(jane_fit_patreon()),
    );

    let registry = SourceRegistry::new()
        .with(youtube)
        .with(skool)
        .with(patreon.clone());

    let outcome = prospector(registry)
        .discover(DiscoveryRequest::new(["fitness coach"]))
        .await
        .unwrap();

    assert_eq!(outcome.entities.len(), 2);
    assert_eq!(outcome.entities[0].email(), Some("jane@fit.com"));
    assert_eq!(outcome.entities[0].audience_size(), 5000);
    assert!(patreon.fetched_ids().is_empty());
    assert_eq!(outcome.report.resolve.merged_by_name, 1);
    assert_eq!(outcome.report.enrichment.skipped_claimed, 1);
}

#[tokio::test]
async fn failing_source_does_not_abort_the_run() {
    let youtube = Arc::new(MockAdapter::new(SourceKind::YouTube).failing_discover());
    let skool = Arc::new(MockAdapter::new(SourceKind::Skool).on_discover(vec![jane_fitness_skool()]));
    let patreon = Arc::new(MockAdapter::new(SourceKind::Patreon));

    let registry = SourceRegistry::new().with(youtube).with(skool).with(patreon);
    let outcome = prospector(registry)
        .discover(DiscoveryRequest::new(["yoga"]))
        .await
        .unwrap();

    assert_eq!(outcome.entities.len(), 1);
    assert_eq!(outcome.report.failed_sources, vec![SourceKind::YouTube]);
    // Patreon has no discovery: a silent skip, not a failure.
    assert!(!outcome.report.discovered.contains_key(&SourceKind::Patreon));
}

#[tokio::test]
async fn source_filter_and_max_results_are_honoured() {
    let youtube = Arc::new(MockAdapter::new(SourceKind::YouTube).on_discover(vec![
        record(SourceKind::YouTube, "UC1", "Alpha Fitness"),
        record(SourceKind::YouTube, "UC2", "Bravo Yoga"),
        record(SourceKind::YouTube, "UC3", "Charlie Pilates"),
    ]));
    let skool = Arc::new(MockAdapter::new(SourceKind::Skool).on_discover(vec![jane_fitness_skool()]));

    let registry = SourceRegistry::new().with(youtube).with(skool);
    let outcome = prospector(registry)
        .discover(
            DiscoveryRequest::new(["coach"])
                .with_sources(vec![SourceKind::YouTube])
                .with_max_results(2),
        )
        .await
        .unwrap();

    let names: Vec<&str> = outcome.entities.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["Alpha Fitness", "Bravo Yoga"]);
    assert!(!outcome.report.discovered.contains_key(&SourceKind::Skool));
}

#[tokio::test]
async fn duplicate_records_across_a_batch_are_resolved_once() {
    let dup = record(SourceKind::YouTube, "UC1", "");
    let youtube = Arc::new(MockAdapter::new(SourceKind::YouTube).on_discover(vec![dup.clone(), dup]));

    let outcome = prospector(SourceRegistry::new().with(youtube))
        .discover(DiscoveryRequest::new(["coach"]))
        .await
        .unwrap();

    assert_eq!(outcome.entities.len(), 1);
    assert_eq!(outcome.entities[0].record_count(), 1);
    assert_eq!(outcome.report.duplicate_records, 1);
}

#[tokio::test]
async fn invalid_requests_fail_immediately() {
    let empty = prospector(SourceRegistry::new());
    let err = empty.discover(DiscoveryRequest::new(["coach"])).await.unwrap_err();
    assert!(matches!(err, ResolveError::InvalidInput(_)));

    let registry = SourceRegistry::new().with(Arc::new(
        MockAdapter::new(SourceKind::YouTube).on_discover(vec![]),
    ));
    let p = prospector(registry);

    let err = p.discover(DiscoveryRequest::new(["  ", ""])).await.unwrap_err();
    assert!(matches!(err, ResolveError::InvalidInput(_)));

    let err = p
        .discover(DiscoveryRequest::new(Vec::<String>::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidInput(_)));

    let err = p
        .discover(DiscoveryRequest::new(["coach"]).with_sources(vec![SourceKind::TikTok]))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidInput(_)));

    let err = p
        .discover(DiscoveryRequest::new(["coach"]).with_max_results(0))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidInput(_)));
}

#[tokio::test]
async fn cancelled_run_returns_no_entities() {
    let youtube = Arc::new(
        MockAdapter::new(SourceKind::YouTube)
            .on_discover(vec![jane_fit_youtube()])
            .with_discover_delay(Duration::from_secs(30)),
    );
    let p = prospector(SourceRegistry::new().with(youtube));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = p
        .discover_with_cancel(DiscoveryRequest::new(["coach"]), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Cancelled));
}

#[tokio::test]
async fn already_cancelled_token_short_circuits() {
    let youtube = Arc::new(MockAdapter::new(SourceKind::YouTube).on_discover(vec![jane_fit_youtube()]));
    let p = prospector(SourceRegistry::new().with(youtube));

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = p
        .discover_with_cancel(DiscoveryRequest::new(["coach"]), &cancel)
        .await;
    assert!(matches!(result, Err(ResolveError::Cancelled)));
}

#[tokio::test]
async fn scrape_single_fetches_profile_content_pricing_and_enriches() {
    let mut profile = record(SourceKind::Skool, "fit-club", "Fit Club");
    profile.bio = "Email club@fit.io, videos at youtube.com/@fitclub".into();
    profile.social = prospector_common::extract::social_references(&profile.bio);

    let skool = Arc::new(
        MockAdapter::new(SourceKind::Skool)
            .on_entity(profile)
            .on_content(
                "fit-club",
                vec![ContentItem::new(SourceKind::Skool, "course-1", ContentType::Course)],
            )
            .on_pricing(
                "fit-club",
                vec![PricingTier::new(SourceKind::Skool, "fit-club", "Membership", 29.0)],
            ),
    );
    let youtube = Arc::new(
        MockAdapter::new(SourceKind::YouTube).on_entity(record(SourceKind::YouTube, "fitclub", "Fit Club")),
    );

    let p = prospector(SourceRegistry::new().with(skool).with(youtube));
    let entity = p.scrape_single(SourceKind::Skool, "fit-club").await.unwrap();

    assert_eq!(entity.primary().kind, SourceKind::Skool);
    assert_eq!(entity.email(), Some("club@fit.io"));
    assert_eq!(entity.content().len(), 1);
    assert_eq!(entity.pricing().len(), 1);
    assert_eq!(entity.record_count(), 2);
}

#[tokio::test]
async fn scrape_single_reports_missing_adapter_and_missing_profile() {
    let p = prospector(SourceRegistry::new().with(Arc::new(MockAdapter::new(SourceKind::Skool))));

    let err = p.scrape_single(SourceKind::Patreon, "x").await.unwrap_err();
    assert!(matches!(err, ResolveError::NoAdapter(SourceKind::Patreon)));

    let err = p.scrape_single(SourceKind::Skool, "ghost").await.unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Source(SourceError::NotFound { .. })
    ));
}

async fn peak_sources_with_limit(limit: usize) -> usize {
    let in_flight = InFlight::new();
    let sources = [
        (SourceKind::YouTube, "Alpha Strength"),
        (SourceKind::Patreon, "Bravo Pilates"),
        (SourceKind::Skool, "Charlie Nutrition"),
        (SourceKind::Instagram, "Delta Running"),
    ];

    let mut registry = SourceRegistry::new();
    for (kind, name) in sources {
        registry.register(Arc::new(
            MockAdapter::new(kind)
                .on_discover(vec![record(kind, "creator", name)])
                .with_discover_delay(Duration::from_millis(20))
                .tracked_by(in_flight.clone()),
        ));
    }

    let mut config = FileConfig::default();
    config.discovery.max_concurrent_sources = limit;
    let outcome = Prospector::new(registry, &config)
        .discover(DiscoveryRequest::new(["fitness"]))
        .await
        .unwrap();

    assert_eq!(outcome.entities.len(), 4);
    in_flight.peak()
}

#[tokio::test]
async fn concurrent_source_queries_stay_within_configured_limit() {
    let peak = peak_sources_with_limit(2).await;
    assert!(peak <= 2, "peak {peak} exceeded limit 2");
    assert!(peak > 1, "sources were never queried together");

    assert_eq!(peak_sources_with_limit(1).await, 1);
}
