//! Integration tests for the document facade.

use dominic::{Dom, DomError, Element};

const PARAGRAPHS: &str = r#"<html><body>
<div id="intro">
<p class="lead first">one</p>
<p class="lead">two</p>
<p id="the-only-paragraph" lang="en">the only one in the whole thing!?</p>
</div>
<ul id="objects">
<li class="geometry">a</li>
<li class="food">b</li>
<li class="geometry solid">c</li>
</ul>
<ul id="others"><li class="geometry">d</li></ul>
</body></html>"#;

const DRINKS: &str = r#"<div class="drinks"><h1 id="header">X</h1></div>"#;

const LANGUAGES: &str = r#"<div><span id="python-2">py</span><span id="java">jv</span><span id="python">py3</span></div>"#;

/// Helper: the text of every element in a query result.
fn texts(dom: &Dom, selector: &str) -> anyhow::Result<Vec<String>> {
    Ok(dom.find(selector)?.iter().map(Element::text).collect())
}

// ========== construction ==========

#[test]
fn test_empty_markup_is_a_parse_error() {
    assert!(matches!(Dom::new(""), Err(DomError::Parse(_))));
    assert!(matches!(Dom::new("   \n"), Err(DomError::Parse(_))));
}

#[test]
fn test_text_only_markup_is_a_parse_error() {
    assert!(matches!(Dom::new("just text"), Err(DomError::Parse(_))));
}

#[test]
fn test_recovered_errors_are_reported() -> anyhow::Result<()> {
    let dom = Dom::new("<div><p>unclosed")?;
    assert!(!dom.issues().is_empty());
    assert_eq!(dom.get("p")?.text(), "unclosed");
    Ok(())
}

#[test]
fn test_document_html_round_trip() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    assert_eq!(dom.html(), PARAGRAPHS);
    assert_eq!(dom.root().map(|root| root.tag().to_string()).as_deref(), Some("html"));
    Ok(())
}

// ========== find ==========

#[test]
fn test_find_by_tag_in_document_order() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    assert_eq!(
        texts(&dom, "p")?,
        vec!["one", "two", "the only one in the whole thing!?"]
    );
    Ok(())
}

#[test]
fn test_find_by_id() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let found = dom.find("#the-only-paragraph")?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].tag(), "p");
    assert_eq!(found[0].text(), "the only one in the whole thing!?");
    Ok(())
}

#[test]
fn test_find_by_class_matches_whole_tokens() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    assert_eq!(texts(&dom, ".lead")?, vec!["one", "two"]);
    assert_eq!(texts(&dom, "p.lead.first")?, vec!["one"]);
    assert!(dom.find(".lea")?.is_empty());
    Ok(())
}

#[test]
fn test_find_by_attribute() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    assert_eq!(texts(&dom, "p[lang]")?, vec!["the only one in the whole thing!?"]);
    assert_eq!(texts(&dom, "[lang='en']")?, vec!["the only one in the whole thing!?"]);
    assert_eq!(texts(&dom, "li[class^=geo]")?, vec!["a", "c", "d"]);
    assert_eq!(texts(&dom, "li[class$=solid]")?, vec!["c"]);
    assert_eq!(texts(&dom, "li[class*=oo]")?, vec!["b"]);
    Ok(())
}

#[test]
fn test_find_child_combinator() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let items = dom.find("ul#objects > li.geometry")?;
    assert_eq!(items.len(), 2);
    assert_eq!(items.first().map(Element::text).as_deref(), Some("a"));
    assert_eq!(items.last().map(Element::text).as_deref(), Some("c"));
    Ok(())
}

#[test]
fn test_find_descendant_combinator() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    assert_eq!(texts(&dom, "body li.geometry")?, vec!["a", "c", "d"]);
    assert!(dom.find("ul p")?.is_empty());
    Ok(())
}

#[test]
fn test_find_selector_list_is_deduplicated() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    assert_eq!(texts(&dom, "li.food, #objects > li")?, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn test_dash_match() -> anyhow::Result<()> {
    let dom = Dom::new(LANGUAGES)?;
    assert_eq!(texts(&dom, "[id|=python]")?, vec!["py", "py3"]);
    assert_eq!(texts(&dom, "[id|=java]")?, vec!["jv"]);
    Ok(())
}

#[test]
fn test_dash_match_needs_a_hyphen_boundary() -> anyhow::Result<()> {
    let dom = Dom::new(r#"<p><a id="python-django">d</a><a id="javascript">js</a></p>"#)?;
    assert_eq!(texts(&dom, "[id|=python]")?, vec!["d"]);
    assert!(dom.find("[id|=java]")?.is_empty());
    Ok(())
}

#[test]
fn test_no_match_is_empty() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    assert!(dom.find("blink")?.is_empty());
    Ok(())
}

#[test]
fn test_malformed_selector_is_an_error() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    assert!(matches!(dom.find("p ~ p"), Err(DomError::MalformedSelector(_))));
    assert!(matches!(dom.find("a:hover"), Err(DomError::MalformedSelector(_))));
    assert!(matches!(dom.find(""), Err(DomError::MalformedSelector(_))));
    Ok(())
}

#[test]
fn test_empty_attribute_values_match_nothing() -> anyhow::Result<()> {
    let dom = Dom::new(r#"<div><p id="a">1</p><p>2</p></div>"#)?;
    for selector in ["p[id^='']", "p[id$='']", "p[id*='']", "p[id~='']", "p[id~='a b']"] {
        assert!(dom.find(selector)?.is_empty(), "{selector:?} matched");
    }
    assert_eq!(dom.find("p[id~=a]")?.len(), 1);
    assert_eq!(dom.find("p[id^=a]")?.len(), 1);
    Ok(())
}

#[test]
fn test_selector_names_cannot_inject_xpath() -> anyhow::Result<()> {
    let dom = Dom::new(DRINKS)?;
    assert!(matches!(
        dom.find("div\\[\\@class\\]"),
        Err(DomError::MalformedSelector(_))
    ));
    assert!(matches!(dom.find("[1=x]"), Err(DomError::MalformedSelector(_))));
    Ok(())
}

// ========== get ==========

#[test]
fn test_get_returns_the_first_match() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let p = dom.get("p")?;
    assert_eq!(p.tag(), "p");
    assert_eq!(p.text(), "one");
    Ok(())
}

#[test]
fn test_get_without_match_is_not_found() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let err = dom.get("blink").unwrap_err();
    assert_eq!(
        err,
        DomError::NotFound {
            selector: "blink".to_string()
        }
    );
    Ok(())
}

// ========== attributes ==========

#[test]
fn test_attr_reads_current_value() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let p = dom.get("#the-only-paragraph")?;
    assert_eq!(p.attr("lang").as_deref(), Some("en"));
    assert_eq!(p.attr("missing"), None);
    Ok(())
}

#[test]
fn test_set_attr_is_idempotent() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let p = dom.get("#the-only-paragraph")?;
    p.set_attr("title", "hello");
    p.set_attr("title", "hello");
    assert_eq!(p.attr("title").as_deref(), Some("hello"));
    assert_eq!(
        p.html(),
        r#"<p id="the-only-paragraph" lang="en" title="hello">the only one in the whole thing!?</p>"#
    );
    Ok(())
}

#[test]
fn test_set_attr_is_visible_to_queries() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    dom.get("li.food")?.set_attr("class", "geometry");
    assert_eq!(texts(&dom, "#objects > .geometry")?, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn test_remove_attr_is_shared_between_handles() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let first = dom.get("#the-only-paragraph")?;
    let second = dom.get("p[lang]")?;
    assert_eq!(first, second);

    first.remove_attr("lang");
    assert_eq!(first.attr("lang"), None);
    assert_eq!(second.attr("lang"), None);
    assert!(dom.find("[lang]")?.is_empty());

    first.remove_attr("lang");
    assert_eq!(first.attr("id").as_deref(), Some("the-only-paragraph"));
    Ok(())
}

#[test]
fn test_snapshot_keeps_attributes_at_creation() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let p = dom.get("#the-only-paragraph")?;
    p.set_attr("lang", "fr");
    assert_eq!(p.snapshot().get("lang").map(String::as_str), Some("en"));
    assert_eq!(p.attrs().get("lang").map(String::as_str), Some("fr"));
    let names: Vec<&String> = p.snapshot().keys().collect();
    assert_eq!(names, ["id", "lang"]);
    Ok(())
}

#[test]
fn test_mutation_after_dropping_tree_guard() -> anyhow::Result<()> {
    let dom = Dom::new(DRINKS)?;
    let header = dom.get("h1")?;
    let count = dom.tree().len();
    header.set_attr("title", "drinks");
    assert_eq!(count, dom.tree().len());
    assert_eq!(header.attr("title").as_deref(), Some("drinks"));
    Ok(())
}

#[test]
#[should_panic(expected = "already borrowed")]
fn test_mutation_while_holding_tree_guard_panics() {
    let dom = Dom::new(DRINKS).unwrap();
    let header = dom.get("h1").unwrap();
    let _guard = dom.tree();
    header.set_attr("title", "drinks");
}

// ========== text ==========

#[test]
fn test_text_excludes_child_elements() -> anyhow::Result<()> {
    let dom = Dom::new("<p>a<b>bold</b>c</p>")?;
    assert_eq!(dom.get("p")?.text(), "ac");
    Ok(())
}

#[test]
fn test_set_text_updates_the_document() -> anyhow::Result<()> {
    let dom = Dom::new(DRINKS)?;
    let header = dom.get("div.drinks h1")?;
    header.set_text("Y");
    assert_eq!(header.text(), "Y");
    assert_eq!(
        dom.get("div")?.html(),
        r#"<div class="drinks"><h1 id="header">Y</h1></div>"#
    );
    Ok(())
}

#[test]
fn test_set_text_keeps_child_elements() -> anyhow::Result<()> {
    let dom = Dom::new("<p>a<b>bold</b>c</p>")?;
    let p = dom.get("p")?;
    p.set_text("z");
    assert_eq!(p.html(), "<p>z<b>bold</b>c</p>");
    Ok(())
}

#[test]
fn test_set_text_on_empty_element_appends() -> anyhow::Result<()> {
    let dom = Dom::new("<div><span></span></div>")?;
    let span = dom.get("span")?;
    span.set_text("<new>");
    assert_eq!(span.text(), "<new>");
    assert_eq!(span.html(), "<span>&lt;new&gt;</span>");
    Ok(())
}

// ========== html ==========

#[test]
fn test_html_serializes_the_element() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let p = dom.get("#the-only-paragraph")?;
    assert_eq!(
        p.html(),
        r#"<p id="the-only-paragraph" lang="en">the only one in the whole thing!?</p>"#
    );
    assert_eq!(p.to_string(), p.html());
    assert_eq!(dom.get("#others")?.inner_html(), r#"<li class="geometry">d</li>"#);
    Ok(())
}

#[test]
fn test_set_html_replaces_and_rebinds() -> anyhow::Result<()> {
    let dom = Dom::new(DRINKS)?;
    let mut header = dom.get("h1")?;
    let stale = header.clone();

    header.set_html(r#"<h2 class="title">Z</h2>"#)?;

    assert_eq!(header.tag(), "h2");
    assert_eq!(header.text(), "Z");
    assert!(header.is_connected());
    assert_eq!(
        dom.html(),
        r#"<div class="drinks"><h2 class="title">Z</h2></div>"#
    );

    assert!(!stale.is_connected());
    assert_eq!(stale.text(), "X");
    assert!(dom.find("h1")?.is_empty());
    assert_eq!(dom.get(".drinks > .title")?, header);
    Ok(())
}

#[test]
fn test_set_html_with_several_nodes() -> anyhow::Result<()> {
    let dom = Dom::new("<ul><li>old</li></ul>")?;
    let mut item = dom.get("li")?;
    item.set_html("<li>1</li> <li>2</li>")?;
    assert_eq!(item.text(), "1");
    assert_eq!(dom.html(), "<ul><li>1</li> <li>2</li></ul>");
    assert_eq!(texts(&dom, "ul > li")?, vec!["1", "2"]);
    Ok(())
}

#[test]
fn test_set_html_without_element_is_rejected() -> anyhow::Result<()> {
    let dom = Dom::new(DRINKS)?;
    let mut header = dom.get("h1")?;
    assert!(matches!(
        header.set_html("only text"),
        Err(DomError::Parse(_))
    ));
    assert_eq!(header.tag(), "h1");
    assert!(header.is_connected());
    assert_eq!(dom.html(), DRINKS);
    Ok(())
}

#[test]
fn test_rejected_set_html_keeps_parsed_nodes_detached() -> anyhow::Result<()> {
    let dom = Dom::new(DRINKS)?;
    let mut header = dom.get("h1")?;
    let before = dom.tree().len();
    assert!(header.set_html("only text").is_err());
    let tree = dom.tree();
    assert!(tree.len() > before);
    let leftovers: Vec<_> = (before..tree.len())
        .map(dominic::tree::NodeId)
        .filter(|&id| tree.is_connected(id))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}

// ========== element queries ==========

#[test]
fn test_element_find_is_scoped() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let objects = dom.get("#objects")?;
    let items = objects.find(".geometry")?;
    assert_eq!(items.iter().map(Element::text).collect::<Vec<_>>(), vec!["a", "c"]);
    assert!(objects.find("ul")?.is_empty());
    assert_eq!(objects.get("li")?.text(), "a");
    Ok(())
}

#[test]
fn test_xpath_queries() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let items = dom.xpath("//li[position() = last()]")?;
    assert_eq!(items.iter().map(Element::text).collect::<Vec<_>>(), vec!["c", "d"]);

    let objects = dom.get("#objects")?;
    assert_eq!(objects.xpath("li[2]")?[0].text(), "b");
    assert!(dom.xpath("//p/text()")?.is_empty());

    assert!(matches!(dom.xpath("count(//p)"), Err(DomError::XPath(_))));
    assert!(matches!(dom.xpath("//p["), Err(DomError::XPath(_))));
    Ok(())
}

#[test]
fn test_parent_and_children() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let item = dom.get("li.food")?;
    let list = item.parent().expect("li has a parent");
    assert_eq!(list.attr("id").as_deref(), Some("objects"));
    assert_eq!(list.children().len(), 3);
    assert_eq!(list.children()[1], item);
    assert!(dom.root().expect("document element").parent().is_none());
    Ok(())
}

// ========== result sets ==========

#[test]
fn test_result_set_access() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    let items = dom.find("li")?;
    assert_eq!(items.len(), 4);
    assert_eq!(items.get(3).map(Element::text).as_deref(), Some("d"));
    assert!(items.get(4).is_none());

    let mut seen = Vec::new();
    for item in &items {
        seen.push(item.text());
    }
    assert_eq!(seen, vec!["a", "b", "c", "d"]);

    let tags: Vec<String> = items.into_iter().map(|e| e.tag().to_string()).collect();
    assert_eq!(tags, vec!["li"; 4]);
    Ok(())
}

#[test]
fn test_result_set_mutations_reach_the_document() -> anyhow::Result<()> {
    let dom = Dom::new(PARAGRAPHS)?;
    for item in &dom.find("#objects li")? {
        item.set_attr("data-seen", "1");
    }
    assert_eq!(dom.find("[data-seen='1']")?.len(), 3);
    Ok(())
}
