use verbatim::config::CompareConfig;
use verbatim::diff::{align, block_similarity, Aligner, AlignmentRecord, AlignmentTag};
use verbatim::text::{blocks_from_strings, prepare_blocks};

// * Test Suite for the block aligner through the public API

#[test]
fn test_identical_page_scenario() {
    let seq = blocks_from_strings(&["<h1>Home</h1>", "Welcome to our site.", "Contact us today."]);
    let result = align(&seq, &seq);

    assert_eq!(result.count(AlignmentTag::Matched), 3);
    assert_eq!(result.records.len(), 3);
    assert!((result.similarity - 1.0).abs() < 1e-9);
}

#[test]
fn test_heading_mismatch_scenario() {
    let result = align(
        &blocks_from_strings(&["<h1>Home</h1>"]),
        &blocks_from_strings(&["<h1>About</h1>"]),
    );
    assert_eq!(block_similarity("<h1>Home</h1>", "<h1>About</h1>"), 0.0);
    assert_eq!(
        result.records,
        vec![
            AlignmentRecord::Missing {
                draft_text: "<h1>Home</h1>".into()
            },
            AlignmentRecord::Current {
                live_text: "<h1>About</h1>".into()
            },
        ]
    );
}

#[test]
fn test_metadata_must_match_exactly() {
    let draft = prepare_blocks("Meta Title: Acme Widgets\n\nPage Name: Home");
    let live = prepare_blocks("Meta Title: Acme Widget\n\nPage Name: Home");
    let result = align(&draft, &live);

    assert_eq!(result.count(AlignmentTag::Matched), 1);
    assert_eq!(result.count(AlignmentTag::Missing), 1);
    assert_eq!(result.count(AlignmentTag::Current), 1);
}

#[test]
fn test_records_never_empty_on_both_sides() {
    let draft = prepare_blocks("<h1>Home</h1>\n\nOld text here.\n\nShared line.");
    let live = prepare_blocks("<h1>Home</h1>\n\nShared line.\n\nBrand new line.");
    let result = align(&draft, &live);

    for record in &result.records {
        assert!(record.draft_text().is_some() || record.live_text().is_some());
    }
    assert!((0.0..=1.0).contains(&result.similarity));
}

#[test]
fn test_raising_threshold_never_adds_matches() {
    let draft = blocks_from_strings(&[
        "<h1>Services</h1>",
        "We repair bicycles of every kind.",
        "Open Monday to Friday from nine.",
        "Call us for a quote.",
    ]);
    let live = blocks_from_strings(&[
        "<h1>Services</h1>",
        "We repair bikes of every kind!",
        "Open Monday through Friday from 9.",
        "Email us for a free quote today.",
    ]);

    let mut previous = usize::MAX;
    for step in 0..=10 {
        let config = CompareConfig {
            threshold: step as f64 / 10.0,
            ..CompareConfig::default()
        };
        let matched = Aligner::with_config(config)
            .align(&draft, &live)
            .count(AlignmentTag::Matched);
        assert!(matched <= previous, "threshold {step}/10 raised matches");
        previous = matched;
    }
}
