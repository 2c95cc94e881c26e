use super::*;

const PAGE: &str = r#"
<html>
  <body>
    <div id="app">
      <header><span class="title">Barber Kaze</span></header>
      <div class="waiting-view">
        <span class="waiting-view__label">待ち人数</span>
        <span class="waiting-view__number">  3組 </span>
      </div>
      <div class="waiting-view">
        <span class="waiting-view__number">-</span>
      </div>
    </div>
  </body>
</html>
"#;

fn selector(kind: SelectorKind, value: &str) -> Selector {
    Selector {
        kind,
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// xpath_to_css
// ---------------------------------------------------------------------------

#[test]
fn xpath_child_and_descendant_axes() {
    assert_eq!(xpath_to_css("/html/body/div").unwrap(), "html > body > div");
    assert_eq!(xpath_to_css("//div//span").unwrap(), "div span");
}

#[test]
fn xpath_positional_predicates() {
    assert_eq!(
        xpath_to_css("//div[2]/span[1]").unwrap(),
        "div:nth-of-type(2) > span:nth-of-type(1)"
    );
    assert_eq!(xpath_to_css("//*[3]").unwrap(), "*:nth-child(3)");
}

#[test]
fn xpath_attribute_predicates() {
    assert_eq!(
        xpath_to_css(r#"//*[@id="app"]/div"#).unwrap(),
        r#"*[id="app"] > div"#
    );
    assert_eq!(xpath_to_css("//span[@title]").unwrap(), "span[title]");
    assert_eq!(
        xpath_to_css("//span[contains(@class, 'number')]").unwrap(),
        r#"span[class*="number"]"#
    );
}

#[test]
fn xpath_trailing_text_step_is_ignored() {
    assert_eq!(
        xpath_to_css("//div[@class='waiting-view']/span/text()").unwrap(),
        r#"div[class="waiting-view"] > span"#
    );
}

#[test]
fn xpath_quoted_bracket_inside_predicate() {
    assert_eq!(
        xpath_to_css("//a[@title='x]y']").unwrap(),
        r#"a[title="x]y"]"#
    );
}

#[test]
fn xpath_rejects_relative_path() {
    let result = xpath_to_css("div/span");
    assert!(
        matches!(result, Err(ScraperError::InvalidSelector { .. })),
        "expected InvalidSelector, got: {result:?}"
    );
}

#[test]
fn xpath_rejects_unsupported_predicates() {
    for xpath in [
        "//div[last()]",
        "//div[0]",
        "//div[@id='a' and @class='b']",
        "//div[",
        "//div/following-sibling::span",
    ] {
        assert!(
            matches!(xpath_to_css(xpath), Err(ScraperError::InvalidSelector { .. })),
            "expected {xpath} to be rejected"
        );
    }
}

// ---------------------------------------------------------------------------
// extract_wait_text
// ---------------------------------------------------------------------------

#[test]
fn extracts_by_class_name() {
    let text = extract_wait_text(PAGE, &selector(SelectorKind::Class, "waiting-view__number"));
    assert_eq!(text.unwrap(), "3組");
}

#[test]
fn extracts_by_css() {
    let text = extract_wait_text(
        PAGE,
        &selector(SelectorKind::Css, "div.waiting-view:nth-of-type(2) span"),
    );
    assert_eq!(text.unwrap(), "-");
}

#[test]
fn extracts_by_xpath() {
    let text = extract_wait_text(
        PAGE,
        &selector(SelectorKind::Xpath, r#"//*[@id="app"]/div[1]/span[2]"#),
    );
    assert_eq!(text.unwrap(), "3組");
}

#[test]
fn missing_element_is_no_match() {
    let result = extract_wait_text(PAGE, &selector(SelectorKind::Class, "queue-size"));
    assert!(
        matches!(result, Err(ScraperError::NoMatch { .. })),
        "expected NoMatch, got: {result:?}"
    );
}

#[test]
fn malformed_css_is_invalid_selector() {
    let result = extract_wait_text(PAGE, &selector(SelectorKind::Css, "span[[["));
    assert!(
        matches!(result, Err(ScraperError::InvalidSelector { .. })),
        "expected InvalidSelector, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// parse_wait_count
// ---------------------------------------------------------------------------

#[test]
fn dash_means_zero() {
    assert_eq!(parse_wait_count("-"), Some(0));
    assert_eq!(parse_wait_count(" - "), Some(0));
}

#[test]
fn first_digit_run_wins() {
    assert_eq!(parse_wait_count("3組"), Some(3));
    assert_eq!(parse_wait_count("待ち 12 人 (最大 30)"), Some(12));
}

#[test]
fn full_width_digits_are_read() {
    assert_eq!(parse_wait_count("待ち ３ 人"), Some(3));
    assert_eq!(parse_wait_count("１０組"), Some(10));
}

#[test]
fn no_digits_is_none() {
    assert_eq!(parse_wait_count(""), None);
    assert_eq!(parse_wait_count("受付終了"), None);
    assert_eq!(parse_wait_count("--"), None);
}

#[test]
fn overflow_is_none() {
    assert_eq!(parse_wait_count("99999999999"), None);
}
