use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseResult};
use site_interactions::fixture::landing_page;
use site_interactions::{ContactValidator, PageDom, PageHarness, is_valid_phone, phone_digits};

const PROPTEST_REGRESSION_FILE: &str = "tests/proptest-regressions/interaction_property_test.txt";
const DEFAULT_PROPTEST_CASES: u32 = 96;
const MARKERS: [&str; 4] = ["services", "card-left", "card-right", "about-body"];

fn proptest_cases() -> u32 {
    std::env::var("SITE_INTERACTIONS_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PROPTEST_CASES)
}

fn proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: proptest_cases(),
        failure_persistence: Some(Box::new(FileFailurePersistence::Direct(
            PROPTEST_REGRESSION_FILE,
        ))),
        ..ProptestConfig::default()
    }
}

/// Phone-like input paired with the number of digits it contains. Digits and
/// separators are drawn apart so the count never depends on the parser.
fn phone_input_strategy() -> BoxedStrategy<(String, usize)> {
    let digit = prop_oneof![Just('0'), Just('4'), Just('7'), Just('9')];
    let separator = prop_oneof![
        Just(' '),
        Just('-'),
        Just('('),
        Just(')'),
        Just('+'),
        Just('.'),
        Just('x'),
    ];
    (vec(digit, 0..=14), vec(separator, 0..=8), any::<bool>())
        .prop_map(|(digits, separators, lead_with_separator)| {
            let mut raw = String::new();
            let mut rest = separators.iter();
            if lead_with_separator {
                raw.extend(rest.next());
            }
            for digit in &digits {
                raw.push(*digit);
                raw.extend(rest.next());
            }
            raw.extend(rest);
            (raw, digits.len())
        })
        .boxed()
}

fn to_test_error(err: site_interactions::Error) -> TestCaseError {
    TestCaseError::fail(err.to_string())
}

fn check_mobile_alternation(width: f64, gaps: &[i64]) -> TestCaseResult {
    let mut harness = PageHarness::new(landing_page(width)).map_err(to_test_error)?;
    for (idx, gap) in gaps.iter().enumerate() {
        harness.click("mobile-menu").map_err(to_test_error)?;
        prop_assert_eq!(harness.controller().drawer_is_open(), idx % 2 == 0);
        prop_assert!(!harness.document().has_class(
            &harness.node("nav-menu").map_err(to_test_error)?,
            "show"
        ));
        harness.advance_time(*gap).map_err(to_test_error)?;
    }
    Ok(())
}

fn check_debounce_model(gaps: &[i64]) -> TestCaseResult {
    let mut harness = PageHarness::new(landing_page(1280.0)).map_err(to_test_error)?;
    let nav = harness.node("nav-menu").map_err(to_test_error)?;
    let mut expected_open = false;
    let mut last_accepted: Option<i64> = None;
    for gap in gaps {
        harness.advance_time(*gap).map_err(to_test_error)?;
        let now = harness.now_ms();
        let accepted = last_accepted.is_none_or(|last| now - last >= 300);
        if accepted {
            last_accepted = Some(now);
            expected_open = !expected_open;
        }
        harness.click("mobile-menu").map_err(to_test_error)?;
        prop_assert_eq!(harness.document().has_class(&nav, "show"), expected_open);
        prop_assert!(!harness.controller().drawer_is_open());
    }
    Ok(())
}

fn check_reveal_is_one_shot(positions: &[f64]) -> TestCaseResult {
    let mut harness = PageHarness::new(landing_page(1024.0)).map_err(to_test_error)?;
    let mut reveal_counts = [0usize; MARKERS.len()];
    for position in positions {
        harness.scroll_to(*position).map_err(to_test_error)?;
        for (idx, id) in MARKERS.iter().enumerate() {
            let node = harness.node(id).map_err(to_test_error)?;
            if harness.document().has_class(&node, "show") {
                reveal_counts[idx] += 1;
                harness
                    .document_mut()
                    .remove_class(&node, "show")
                    .map_err(to_test_error)?;
                prop_assert!(harness.controller().is_revealed(&node));
            }
        }
    }
    prop_assert!(reveal_counts.iter().all(|count| *count <= 1), "{reveal_counts:?}");
    Ok(())
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn phone_is_valid_exactly_with_ten_digits((raw, digit_count) in phone_input_strategy()) {
        prop_assert_eq!(is_valid_phone(&raw), digit_count == 10, "{:?}", raw);
        prop_assert_eq!(phone_digits(&raw).len(), digit_count);
    }

    #[test]
    fn email_with_whitespace_is_never_valid(
        local in "[a-z]{1,6}",
        domain in "[a-z]{1,6}",
        tld in "[a-z]{2,3}",
        split in 0usize..3,
    ) {
        let validator = ContactValidator::new().map_err(to_test_error)?;
        let email = format!("{local}@{domain}.{tld}");
        prop_assert!(validator.is_valid_email(&email));
        let mut broken = email.clone();
        let at = [0, local.len(), email.len()][split];
        broken.insert(at, ' ');
        prop_assert!(!validator.is_valid_email(&broken));
    }

    #[test]
    fn mobile_activation_alternates(
        width in 280u32..=768,
        gaps in vec(0i64..800, 1..10),
    ) {
        check_mobile_alternation(f64::from(width), &gaps)?;
    }

    #[test]
    fn legacy_toggle_follows_debounce_model(gaps in vec(0i64..700, 1..16)) {
        check_debounce_model(&gaps)?;
    }

    #[test]
    fn markers_are_revealed_at_most_once(positions in vec(0.0f64..3_500.0, 1..24)) {
        check_reveal_is_one_shot(&positions)?;
    }
}
