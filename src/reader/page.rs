// * HTML Page Reader
// * Title, meta description and ordered content paragraphs from raw markup.
// * Element filtering is driven by an enumerable table of exclusion rules;
// * FAQ / accordion sections are emitted afterwards as Q: / A: paragraphs.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{trace, warn};

use super::{PageContent, PageReader};

const UNTITLED: &str = "Untitled Page";

static SPACE_BEFORE_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ([.,;:!?)])").unwrap());

static SELECTOR_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static SELECTOR_META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description" i]"#).unwrap());

// * Content containers in priority order
static CONTENT_CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "main",
        "article",
        "div.content, div.main-content, div.page-content",
        "body",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static SELECTOR_TEXT_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, li, h1, h2, h3, h4, h5, h6").unwrap());

// * Structured (FAQ / accordion / tab) sections
static SELECTOR_SECTIONS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[class*="faq" i], [class*="frequently-asked" i],
           [class*="accordion" i], [class*="expandable" i], [class*="collapse" i],
           [role="tablist"], [role="tab"],
           [class*="uagb-container-inner-blocks-wrap"]"#,
    )
    .unwrap()
});
static SELECTOR_SECTION_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="uagb-heading-text"]"#).unwrap());

// * UAGB FAQ block markup
static SELECTOR_UAGB_QUESTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".uagb-question").unwrap());
static SELECTOR_UAGB_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="uagb-faq-item"]"#).unwrap());
static SELECTOR_UAGB_ANSWER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".uagb-faq-content").unwrap());

// * Generic FAQ / accordion markup
static SELECTOR_QUESTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"dt, summary, [role="tab"],
           [class*="question" i], [class*="header" i], [class*="title" i], [class*="summary" i]"#,
    )
    .unwrap()
});
static SELECTOR_ANSWER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"dd, [role="tabpanel"],
           [class*="answer" i], [class*="content" i], [class*="panel" i], [class*="body" i]"#,
    )
    .unwrap()
});

/// Which extracted elements a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// `h1`..`h6` only
    Headings,
    /// Every text block (`p`, `li`, headings)
    All,
}

impl RuleScope {
    fn applies(self, is_heading: bool) -> bool {
        match self {
            RuleScope::Headings => is_heading,
            RuleScope::All => true,
        }
    }
}

/// One entry of the exclusion table: a text block matching `selector` is
/// dropped from the regular paragraph stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    /// CSS selector tested against the candidate element itself
    pub selector: String,
    /// Human-readable reason, surfaced by [`HtmlPageReader::exclusion_for`]
    pub reason: String,
    pub scope: RuleScope,
}

impl ExclusionRule {
    pub fn new(selector: impl Into<String>, reason: impl Into<String>, scope: RuleScope) -> Self {
        Self {
            selector: selector.into(),
            reason: reason.into(),
            scope,
        }
    }
}

/// Default exclusion table
pub fn default_rules() -> Vec<ExclusionRule> {
    vec![
        ExclusionRule::new(
            r#"[class*="faq" i] *, [class*="accordion" i] *, [class*="expandable" i] *,
               [class*="collapse" i] *, [class*="toggle" i] *,
               [class*="uagb-container"] *, [class*="wp-block-uagb"] *"#,
            "inside a structured FAQ/accordion section (emitted separately)",
            RuleScope::All,
        ),
        ExclusionRule::new(
            "nav *, header *, footer *",
            "heading inside navigation, header or footer",
            RuleScope::Headings,
        ),
        ExclusionRule::new(
            r#"[class*="menu" i], [class*="nav" i]"#,
            "heading styled as menu or navigation",
            RuleScope::Headings,
        ),
        ExclusionRule::new(
            r#"[style*="display: none" i], [style*="display: none" i] *,
               [style*="display:none" i], [style*="display:none" i] *,
               [style*="visibility: hidden" i], [style*="visibility: hidden" i] *,
               [style*="visibility:hidden" i], [style*="visibility:hidden" i] *"#,
            "heading hidden by inline style",
            RuleScope::Headings,
        ),
    ]
}

struct CompiledRule {
    rule: ExclusionRule,
    selector: Selector,
}

/// Rule-table driven HTML reader
pub struct HtmlPageReader {
    rules: Vec<CompiledRule>,
}

impl HtmlPageReader {
    /// Creates a reader with the default exclusion table
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Creates a reader with a custom exclusion table.
    /// Rules whose selector does not parse are skipped with a warning.
    pub fn with_rules(rules: Vec<ExclusionRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter_map(|rule| {
                let parsed = Selector::parse(&rule.selector).map_err(|e| format!("{e:?}"));
                match parsed {
                    Ok(selector) => Some(CompiledRule { rule, selector }),
                    Err(error) => {
                        warn!(selector = %rule.selector, %error, "Skipping invalid exclusion rule");
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Active exclusion rules
    pub fn rules(&self) -> impl Iterator<Item = &ExclusionRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// First rule excluding `element`, if any
    pub fn exclusion_for(&self, element: &ElementRef) -> Option<&ExclusionRule> {
        let is_heading = heading_level(element).is_some();
        self.rules
            .iter()
            .find(|c| c.rule.scope.applies(is_heading) && c.selector.matches(element))
            .map(|c| &c.rule)
    }

    /// Parses raw markup into [`PageContent`]
    pub fn extract(&self, html: &str) -> PageContent {
        let document = Html::parse_document(html);

        let title = document
            .select(&SELECTOR_TITLE)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        let meta_description = document
            .select(&SELECTOR_META_DESCRIPTION)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        let paragraphs = match find_container(&document) {
            Some(container) => {
                let mut paragraphs = self.text_blocks(container);
                paragraphs.extend(structured_blocks(container));
                paragraphs
            }
            None => Vec::new(),
        };

        PageContent {
            title,
            meta_description,
            paragraphs,
        }
    }

    /// Regular content: `p`, `li` and headings in document order
    fn text_blocks(&self, container: ElementRef) -> Vec<String> {
        let mut out = Vec::new();
        for element in container.select(&SELECTOR_TEXT_BLOCKS) {
            let text = joined_text(element);
            if text.chars().count() <= 1 {
                continue;
            }
            if let Some(rule) = self.exclusion_for(&element) {
                trace!(reason = %rule.reason, "Excluded text block");
                continue;
            }
            match heading_level(&element) {
                Some(level) => out.push(format!("<h{level}>{text}</h{level}>")),
                None => out.push(text),
            }
        }
        out
    }
}

impl Default for HtmlPageReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PageReader for HtmlPageReader {
    fn read(&self, html: &str) -> PageContent {
        self.extract(html)
    }
}

fn find_container(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT_CONTAINERS
        .iter()
        .find_map(|selector| document.select(selector).next())
}

/// Element text: text nodes joined by a space, whitespace runs collapsed,
/// no space left before closing punctuation
fn joined_text(element: ElementRef) -> String {
    let joined = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    SPACE_BEFORE_PUNCT.replace_all(&joined, "$1").into_owned()
}

fn heading_level(element: &ElementRef) -> Option<u8> {
    let name = element.value().name();
    let mut chars = name.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('h'), Some(d @ '1'..='6'), None) => d.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

/// FAQ / accordion sections as `Q:` / `A:` paragraph pairs.
/// Nested sections are folded into their outermost match.
fn structured_blocks(container: ElementRef) -> Vec<String> {
    let sections: Vec<ElementRef> = container.select(&SELECTOR_SECTIONS).collect();
    let ids: HashSet<_> = sections.iter().map(|s| s.id()).collect();
    let nested = |el: &ElementRef| el.ancestors().any(|a| ids.contains(&a.id()));

    let mut out = Vec::new();
    for section in sections.iter().filter(|s| !nested(s)) {
        if let Some(heading) = section
            .select(&SELECTOR_SECTION_HEADING)
            .map(joined_text)
            .find(|t| !t.is_empty())
        {
            out.push(format!("<h2>{heading}</h2>"));
        }

        let mut pairs = uagb_pairs(*section);
        if pairs.is_empty() {
            pairs = generic_pairs(*section);
        }
        for (question, answer) in pairs {
            out.push(format!("Q: {question}"));
            out.push(format!("A: {answer}"));
        }
    }
    out
}

fn uagb_pairs(section: ElementRef) -> Vec<(String, String)> {
    section
        .select(&SELECTOR_UAGB_QUESTION)
        .filter_map(|question| {
            let item = question
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| SELECTOR_UAGB_ITEM.matches(a))?;
            let answer = item.select(&SELECTOR_UAGB_ANSWER).next()?;
            let (q, a) = (joined_text(question), joined_text(answer));
            (!q.is_empty() && !a.is_empty()).then_some((q, a))
        })
        .collect()
}

fn generic_pairs(section: ElementRef) -> Vec<(String, String)> {
    let questions: Vec<ElementRef> = section
        .select(&SELECTOR_QUESTION)
        .filter(|q| q.id() != section.id())
        .collect();
    let ids: HashSet<_> = questions.iter().map(|q| q.id()).collect();
    let nested = |el: &ElementRef| el.ancestors().any(|a| ids.contains(&a.id()));

    questions
        .iter()
        .filter(|q| !nested(q))
        .filter_map(|question| {
            let q = joined_text(*question);
            if q.is_empty() {
                return None;
            }
            let a = find_answer(*question).map(joined_text)?;
            (!a.is_empty()).then_some((q, a))
        })
        .collect()
}

/// Answer for a question: a following sibling, else the first match at or
/// below one of the parent's following siblings.
fn find_answer(question: ElementRef) -> Option<ElementRef> {
    let sibling = question
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|s| SELECTOR_ANSWER.matches(s));
    if sibling.is_some() {
        return sibling;
    }

    let parent = question.parent().and_then(ElementRef::wrap)?;
    parent
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find_map(|s| {
            if SELECTOR_ANSWER.matches(&s) {
                Some(s)
            } else {
                s.select(&SELECTOR_ANSWER).next()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(html: &str) -> PageContent {
        HtmlPageReader::new().read(html)
    }

    #[test]
    fn test_title_and_meta() {
        let page = read(
            r#"<html><head><title> Home | Acme </title>
               <meta name="description" content=" We build things. "></head>
               <body><p>Hello world.</p></body></html>"#,
        );
        assert_eq!(page.title, "Home | Acme");
        assert_eq!(page.meta_description, "We build things.");
        assert_eq!(page.paragraphs, vec!["Hello world."]);
    }

    #[test]
    fn test_untitled_fallback() {
        let page = read("<html><body><p>Text here</p></body></html>");
        assert_eq!(page.title, "Untitled Page");
        assert_eq!(page.meta_description, "");
    }

    #[test]
    fn test_main_container_preferred() {
        let page = read(
            r#"<body><div>Outside <p>Sidebar text</p></div>
               <main><h1>Home</h1><p>Welcome to <a href="/x">our site</a>.</p><ul><li>One item</li></ul></main></body>"#,
        );
        assert_eq!(
            page.paragraphs,
            vec!["<h1>Home</h1>", "Welcome to our site.", "One item"]
        );
    }

    #[test]
    fn test_text_nodes_are_space_separated() {
        let page = read(
            r#"<body><p>Call us<br>today</p><p><strong>Note:</strong>Open late</p>
               <p>Read <em>more</em>, then <a href="/x">sign up</a>!</p></body>"#,
        );
        assert_eq!(
            page.paragraphs,
            vec!["Call us today", "Note: Open late", "Read more, then sign up!"]
        );
    }

    #[test]
    fn test_content_div_container() {
        let page = read(
            r#"<body><p>Chrome text</p><div class="page-content"><p>Body copy</p></div></body>"#,
        );
        assert_eq!(page.paragraphs, vec!["Body copy"]);
    }

    #[test]
    fn test_heading_exclusions() {
        let page = read(
            r#"<body>
                 <header><h2>Site Name</h2></header>
                 <h2 class="menu-title">Menu</h2>
                 <div style="display: none"><h3>Hidden</h3></div>
                 <h2>Visible</h2>
                 <nav><p>Nav paragraph kept</p></nav>
               </body>"#,
        );
        assert_eq!(page.paragraphs, vec!["<h2>Visible</h2>", "Nav paragraph kept"]);
    }

    #[test]
    fn test_single_char_blocks_skipped() {
        let page = read("<body><p>x</p><p>ok</p><li> </li></body>");
        assert_eq!(page.paragraphs, vec!["ok"]);
    }

    #[test]
    fn test_generic_faq_section() {
        let page = read(
            r#"<body><p>Intro text.</p>
               <div class="faq">
                 <dl>
                   <dt>What do you do?</dt><dd>We <b>build</b> things.</dd>
                   <dt>Where?</dt><dd>Everywhere.</dd>
                 </dl>
                 <p>Paragraph inside FAQ is not duplicated</p>
               </div></body>"#,
        );
        assert_eq!(
            page.paragraphs,
            vec![
                "Intro text.",
                "Q: What do you do?",
                "A: We build things.",
                "Q: Where?",
                "A: Everywhere.",
            ]
        );
    }

    #[test]
    fn test_uagb_faq_section() {
        let page = read(
            r#"<body>
               <div class="wp-block-uagb-faq uagb-faq__outer-wrap">
                 <div class="uagb-heading-text">Common Questions</div>
                 <div class="uagb-faq-child uagb-faq-item">
                   <div class="uagb-faq-questions-button"><span class="uagb-question">Is it free?</span></div>
                   <div class="uagb-faq-content"><p>Yes, always.</p></div>
                 </div>
               </div></body>"#,
        );
        assert_eq!(
            page.paragraphs,
            vec!["<h2>Common Questions</h2>", "Q: Is it free?", "A: Yes, always."]
        );
    }

    #[test]
    fn test_details_summary_accordion() {
        let page = read(
            r#"<body><div class="accordion">
                 <details><summary>Hours?</summary><div class="panel">Nine to five.</div></details>
               </div></body>"#,
        );
        assert_eq!(page.paragraphs, vec!["Q: Hours?", "A: Nine to five."]);
    }

    #[test]
    fn test_custom_rules_and_reasons() {
        let reader = HtmlPageReader::with_rules(vec![
            ExclusionRule::new(".legal", "legal boilerplate", RuleScope::All),
            ExclusionRule::new("[[[", "broken", RuleScope::All),
        ]);
        assert_eq!(reader.rules().count(), 1);

        let page = reader.read(r#"<body><p class="legal">Fine print here</p><p>Real text</p></body>"#);
        assert_eq!(page.paragraphs, vec!["Real text"]);

        let html = Html::parse_document(r#"<body><p class="legal">Fine print</p></body>"#);
        let selector = Selector::parse("p").unwrap();
        let p = html.select(&selector).next().unwrap();
        assert_eq!(reader.exclusion_for(&p).unwrap().reason, "legal boilerplate");
    }

    #[test]
    fn test_default_rules_are_valid() {
        let rules = default_rules();
        assert_eq!(HtmlPageReader::new().rules().count(), rules.len());
    }
}
