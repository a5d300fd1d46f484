//! Integration tests for expression evaluation over parsed trees.

use dominic_dom::{DomTree, NodeId};
use dominic_markup::{ParseOptions, parse_document};
use dominic_xpath::{
    Value, XPath, XPathContext, XPathError, XPathNode, evaluate, find_node, find_nodes,
    find_value, find_values,
};

const AXES_DOC: &str = r#"
<doc id="0">
    <chapter id="1">
        <section id="1.1">
            <item id="1.1.1" />
        </section>
    </chapter>
    <chapter id="2">
        <section id="2.1">
            <item id="2.1.1" />
        </section>
        <section id="2.2">
            <item id="2.2.1" /><item id="2.2.2" /><item id="2.2.3" />
        </section>
        <section id="2.3">
            <item id="2.3.1" />
        </section>
    </chapter>
    <chapter id="3">
        <section id="3.1">
            <item id="3.1.1" />
        </section>
    </chapter>
</doc>
"#;

const ITEMS_DOC: &str = r#"
<doc>
    <item id="1" /><item id="2" /><item id="3" /><item id="4" /><item id="5" />
    <item id="6" /><item id="7" /><item id="8" /><item id="9" />
</doc>
"#;

/// Helper to parse markup with default options and return the tree.
fn parse(markup: &str) -> DomTree {
    parse_document(markup, &ParseOptions::default()).tree
}

/// Helper: the `id` attribute of every element `expression` selects from
/// `node`.
fn ids_from(tree: &DomTree, expression: &str, node: NodeId) -> Vec<String> {
    find_nodes(expression, tree, node)
        .unwrap()
        .into_iter()
        .filter_map(|n| n.element_id(tree))
        .map(|id| {
            tree.as_element(id)
                .unwrap()
                .get_attribute("id")
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

fn ids(tree: &DomTree, expression: &str) -> Vec<String> {
    ids_from(tree, expression, NodeId::ROOT)
}

fn number(tree: &DomTree, expression: &str) -> f64 {
    match evaluate(expression, tree, NodeId::ROOT).unwrap() {
        Value::Number(n) => n,
        other => panic!("expected a number, got {other:?}"),
    }
}

fn boolean(tree: &DomTree, expression: &str) -> bool {
    match evaluate(expression, tree, NodeId::ROOT).unwrap() {
        Value::Boolean(b) => b,
        other => panic!("expected a boolean, got {other:?}"),
    }
}

fn string(tree: &DomTree, expression: &str) -> String {
    match evaluate(expression, tree, NodeId::ROOT).unwrap() {
        Value::String(s) => s,
        other => panic!("expected a string, got {other:?}"),
    }
}

// ========== axes ==========

#[test]
fn test_child_and_parent_axes() {
    let tree = parse(AXES_DOC);
    assert_eq!(ids(&tree, "//*[@id=\"2\"]/child::*"), ["2.1", "2.2", "2.3"]);
    assert_eq!(ids(&tree, "//*[@id=\"2.2\"]/parent::*"), ["2"]);
}

#[test]
fn test_ancestor_axes_return_document_order() {
    let tree = parse(AXES_DOC);
    assert_eq!(ids(&tree, "//*[@id=\"2.2\"]/ancestor::*"), ["0", "2"]);
    assert_eq!(
        ids(&tree, "//*[@id=\"2.2\"]/ancestor-or-self::*"),
        ["0", "2", "2.2"]
    );
}

#[test]
fn test_sibling_axes() {
    let tree = parse(AXES_DOC);
    assert_eq!(ids(&tree, "//*[@id=\"2.2\"]/following-sibling::*"), ["2.3"]);
    assert_eq!(ids(&tree, "//*[@id=\"2.2\"]/preceding-sibling::*"), ["2.1"]);
}

#[test]
fn test_following_and_preceding_axes() {
    let tree = parse(AXES_DOC);
    assert_eq!(
        ids(&tree, "//*[@id=\"2.2\"]/following::*"),
        ["2.3", "2.3.1", "3", "3.1", "3.1.1"]
    );
    assert_eq!(
        ids(&tree, "//*[@id=\"2.2\"]/preceding::*"),
        ["1", "1.1", "1.1.1", "2.1", "2.1.1"]
    );
}

#[test]
fn test_self_and_descendant_or_self_axes() {
    let tree = parse(AXES_DOC);
    assert_eq!(ids(&tree, "//*[@id=\"2.2\"]/self::*"), ["2.2"]);
    assert_eq!(
        ids(&tree, "//*[@id=\"1\"]/descendant-or-self::*"),
        ["1", "1.1", "1.1.1"]
    );
}

#[test]
fn test_attribute_and_namespace_axes() {
    let tree = parse(AXES_DOC);
    assert_eq!(
        find_values("//*[@id=\"2.2\"]/attribute::*", &tree, NodeId::ROOT).unwrap(),
        ["2.2"]
    );
    assert!(
        find_nodes("//*[@id=\"2.2\"]/namespace::*", &tree, NodeId::ROOT)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_axes_partition_the_document() {
    let tree = parse(AXES_DOC);
    let mut all = ids(&tree, "//*");
    let node = find_node("//*[@id=\"2.2\"]", &tree, NodeId::ROOT)
        .unwrap()
        .and_then(XPathNode::node_id)
        .unwrap();

    let mut parts = Vec::new();
    for axis in ["ancestor", "descendant", "following", "preceding", "self"] {
        parts.extend(ids_from(&tree, &format!("{axis}::*"), node));
    }
    all.sort();
    parts.sort();
    assert_eq!(all, parts);
}

// ========== abbreviations ==========

#[test]
fn test_child_name_and_wildcard() {
    let tree = parse("<doc><para id=\"1\"></para><div id=\"2\"></div><para id=\"3\"></para></doc>");
    let doc = tree.document_element().unwrap();
    assert_eq!(ids_from(&tree, "para", doc), ["1", "3"]);
    assert_eq!(ids_from(&tree, "*", doc), ["1", "2", "3"]);
}

#[test]
fn test_text_children() {
    let tree = parse("<doc>This is <i>some</i> text.</doc>");
    let doc = tree.document_element().unwrap();
    assert_eq!(
        XPath::compile("text()")
            .unwrap()
            .find_values(&tree, doc, &XPathContext::new())
            .unwrap(),
        ["This is ", " text."]
    );
}

#[test]
fn test_named_and_all_attributes() {
    let tree = parse("<doc name=\"foo\" value=\"bar\"></doc>");
    let doc = tree.document_element().unwrap();
    let attributes = find_nodes("@*", &tree, doc).unwrap();
    let pairs: Vec<(&str, String)> = attributes
        .iter()
        .map(|a| (a.name(&tree), a.string_value(&tree)))
        .collect();
    assert_eq!(
        pairs,
        [("name", "foo".to_string()), ("value", "bar".to_string())]
    );
    assert_eq!(
        find_value("@name", &tree, doc).unwrap(),
        Some("foo".to_string())
    );
}

#[test]
fn test_positional_predicates() {
    let tree = parse("<doc><para id=\"1\"/><para id=\"2\"/><para id=\"3\"/></doc>");
    let doc = tree.document_element().unwrap();
    assert_eq!(ids_from(&tree, "para[1]", doc), ["1"]);
    assert_eq!(ids_from(&tree, "para[last()]", doc), ["3"]);
    assert_eq!(ids_from(&tree, "para[position() > 1]", doc), ["2", "3"]);
}

#[test]
fn test_reverse_axis_positions_count_from_the_context_node() {
    let tree = parse(AXES_DOC);
    assert_eq!(ids(&tree, "//*[@id=\"2.2.3\"]/preceding-sibling::*[1]"), ["2.2.2"]);
    assert_eq!(ids(&tree, "//*[@id=\"2.2.1\"]/ancestor::*[2]"), ["2"]);
}

#[test]
fn test_grandchildren_and_descendants() {
    let tree = parse(
        "<doc><chapter><para id=\"1\"/><para id=\"2\"/></chapter>\
         <chapter><section><para id=\"3\"/></section></chapter><para id=\"4\"/></doc>",
    );
    let doc = tree.document_element().unwrap();
    assert_eq!(ids_from(&tree, "*/para", doc), ["1", "2"]);
    assert_eq!(ids_from(&tree, "chapter//para", doc), ["1", "2", "3"]);
    assert_eq!(ids_from(&tree, ".//para", doc), ["1", "2", "3", "4"]);
}

#[test]
fn test_absolute_path_with_positions() {
    let tree = parse(
        "<doc><chapter id=\"1\"/><chapter id=\"2\"/><chapter id=\"3\"/>\
         <chapter id=\"4\"><section id=\"4.1\"/><section id=\"4.2\"/></chapter>\
         <chapter id=\"5\"><section id=\"5.1\"/><section id=\"5.2\"/></chapter></doc>",
    );
    assert_eq!(ids(&tree, "/doc/chapter[5]/section[2]"), ["5.2"]);
    // An absolute path starts at the root whatever the context node.
    let section = find_node("//section", &tree, NodeId::ROOT)
        .unwrap()
        .and_then(XPathNode::node_id)
        .unwrap();
    assert_eq!(ids_from(&tree, "/doc/chapter[1]", section), ["1"]);
    assert_eq!(ids_from(&tree, "../@id/..", section), ["4"]);
}

// ========== node-sets ==========

#[test]
fn test_union_is_sorted_and_deduplicated() {
    let tree = parse(ITEMS_DOC);
    assert_eq!(
        ids(&tree, "//item[@id mod 2 = 0] | //item[@id mod 3 = 0]"),
        ["2", "3", "4", "6", "8", "9"]
    );
}

#[test]
fn test_wide_sibling_lists_stay_in_order() {
    let mut tree = DomTree::new();
    let doc = tree.alloc_element("doc");
    tree.append_child(NodeId::ROOT, doc);
    for i in 0..5000 {
        let item = tree.alloc_element("item");
        tree.as_element_mut(item)
            .unwrap()
            .set_attribute("id", i.to_string());
        tree.append_child(doc, item);
    }

    let union = "//item[@id mod 2 = 0] | //item[@id mod 3 = 0]";
    let selected = ids(&tree, union);
    assert_eq!(selected.len(), 3333);
    assert_eq!(selected[..4], ["0", "2", "3", "4"]);
    assert_eq!(selected.last().map(String::as_str), Some("4998"));
    assert_eq!(ids(&tree, "(//item)[last()]"), ["4999"]);
}

#[test]
fn test_attributes_sort_between_owner_and_children() {
    let tree = parse(r#"<doc><item id="1" class="x">text</item></doc>"#);
    let item = find_node("//item", &tree, NodeId::ROOT).unwrap().unwrap();
    let owner = item.element_id(&tree).unwrap();
    let nodes = find_nodes("//item/text() | //item/@* | //item", &tree, NodeId::ROOT).unwrap();
    assert_eq!(nodes.len(), 4);
    assert_eq!(nodes[0], item);
    assert_eq!(nodes[1], XPathNode::Attribute { owner, index: 0 });
    assert_eq!(nodes[2], XPathNode::Attribute { owner, index: 1 });
    assert_eq!(nodes[3], XPathNode::Node(tree.children(owner)[0]));
}

#[test]
fn test_detached_subtrees_follow_the_document() {
    let mut tree = parse(r#"<doc><item id="in" /></doc>"#);
    let loose = tree.alloc_element("item");
    tree.as_element_mut(loose)
        .unwrap()
        .set_attribute("id", "out");
    let items = find_nodes("//item", &tree, NodeId::ROOT).unwrap();
    let context = XPathContext::new()
        .with_variable("loose", vec![XPathNode::Node(loose)])
        .with_variable("items", items.clone());
    let nodes = XPath::compile("$loose | $items")
        .unwrap()
        .find_nodes(&tree, NodeId::ROOT, &context)
        .unwrap();
    assert_eq!(nodes, [items[0], XPathNode::Node(loose)]);
    let ids = XPath::compile("($loose | $items)/@id")
        .unwrap()
        .find_values(&tree, NodeId::ROOT, &context)
        .unwrap();
    assert_eq!(ids, ["in", "out"]);
}

#[test]
fn test_filter_expressions() {
    let tree = parse(ITEMS_DOC);
    assert_eq!(ids(&tree, "(//item)[last()]"), ["9"]);
    assert_eq!(ids(&tree, "(//item[@id > 7] | //item[1])[2]"), ["8"]);
    assert_eq!(
        find_values("(//item)[3]/@id", &tree, NodeId::ROOT).unwrap(),
        ["3"]
    );
}

#[test]
fn test_node_set_type_errors() {
    let tree = parse(ITEMS_DOC);
    let type_error = |expression: &str| {
        matches!(
            evaluate(expression, &tree, NodeId::ROOT),
            Err(XPathError::Type {
                expected: "node-set",
                ..
            })
        )
    };
    assert!(type_error("//item | 42"));
    assert!(type_error("\"monty\"/anaconda"));
    assert!(type_error("(1)[1]"));
    assert!(type_error("count(100)"));
}

// ========== variables ==========

#[test]
fn test_variables() {
    let tree = parse(ITEMS_DOC);
    let xpath = XPath::compile("//item[@id >= $start and @id <= $end]").unwrap();
    let mut context = XPathContext::new()
        .with_variable("start", 2)
        .with_variable("end", "4");

    let select = |context: &XPathContext| -> Vec<NodeId> {
        xpath
            .select_elements(&tree, NodeId::ROOT, context)
            .unwrap()
    };
    assert_eq!(select(&context).len(), 3);

    let previous = context.set_variable("end", 3);
    assert_eq!(previous, Some(Value::from("4")));
    assert_eq!(select(&context).len(), 2);

    let _ = context.remove_variable("start");
    assert_eq!(
        xpath.evaluate(&tree, NodeId::ROOT, &context),
        Err(XPathError::UndefinedVariable("start".to_string()))
    );
}

#[test]
fn test_node_set_variable_as_path_start() {
    let tree = parse(AXES_DOC);
    let chapters = find_nodes("//chapter", &tree, NodeId::ROOT).unwrap();
    let context = XPathContext::new().with_variable("chapters", chapters);
    let nodes = XPath::compile("$chapters[2]/section/@id")
        .unwrap()
        .find_values(&tree, NodeId::ROOT, &context)
        .unwrap();
    assert_eq!(nodes, ["2.1", "2.2", "2.3"]);
}

// ========== operators ==========

#[test]
fn test_boolean_operators() {
    let tree = parse(ITEMS_DOC);
    assert!(boolean(&tree, "1 or 0"));
    assert!(!boolean(&tree, "0 or 0"));
    assert!(!boolean(&tree, "1 and 0"));
    assert!(boolean(&tree, "//item and 'x'"));
}

#[test]
fn test_node_set_comparisons_are_existential() {
    let tree = parse(
        "<doc><set id=\"1\"><item>1</item><item>2</item></set>\
         <set id=\"2\"><item>2</item><item>3</item></set>\
         <set id=\"3\"><item>42.0</item></set></doc>",
    );
    assert!(boolean(&tree, "//set[@id=1]/item = //set[@id=2]/item"));
    assert!(boolean(&tree, "//set[@id=1]/item != //set[@id=1]/item"));
    assert!(boolean(&tree, "//set[@id=3]/item = 42"));
    assert!(!boolean(&tree, "//set[@id=3]/item = '42'"));
    assert!(boolean(&tree, "//set[@id=1]/item < 2"));
    assert!(!boolean(&tree, "//missing = ''"));
    assert!(boolean(&tree, "//missing = false()"));
    assert_eq!(ids(&tree, "//set[item > 2]"), ["2", "3"]);
}

#[test]
fn test_arithmetic() {
    let tree = DomTree::new();
    assert!((number(&tree, "1 + 2 * 3") - 7.0).abs() < f64::EPSILON);
    assert!((number(&tree, "7 mod -3") - 1.0).abs() < f64::EPSILON);
    assert!((number(&tree, "-7 mod 3") + 1.0).abs() < f64::EPSILON);
    assert!((number(&tree, "- - 2") - 2.0).abs() < f64::EPSILON);
    assert!(number(&tree, "1 div 0").is_infinite());
    assert!(number(&tree, "0 div 0").is_nan());
}

// ========== functions ==========

#[test]
fn test_node_set_functions() {
    let tree = parse(AXES_DOC);
    assert!((number(&tree, "count(//item)") - 7.0).abs() < f64::EPSILON);
    assert_eq!(string(&tree, "name(//section)"), "section");
    assert_eq!(string(&tree, "local-name(//@id)"), "id");
    assert_eq!(string(&tree, "namespace-uri(//doc)"), "");
    assert_eq!(ids(&tree, "id('2.2 3.1  missing')"), ["2.2", "3.1"]);
    assert_eq!(ids(&tree, "id(//item[@id='1.1.1']/@id)"), ["1.1.1"]);
}

#[test]
fn test_string_functions() {
    let tree = parse("<doc><a> one  two </a><b>x</b></doc>");
    assert_eq!(string(&tree, "string(//a)"), " one  two ");
    assert_eq!(string(&tree, "normalize-space(//a)"), "one two");
    assert_eq!(string(&tree, "concat('a', //b, 1)"), "ax1");
    assert!(boolean(&tree, "starts-with('dominic', 'dom')"));
    assert!(boolean(&tree, "contains('dominic', 'min')"));
    assert_eq!(string(&tree, "substring-before('1999/04/01', '/')"), "1999");
    assert_eq!(string(&tree, "substring-after('1999/04/01', '/')"), "04/01");
    assert_eq!(string(&tree, "substring('12345', 1.5, 2.6)"), "234");
    assert_eq!(string(&tree, "substring('12345', 2)"), "2345");
    assert_eq!(string(&tree, "translate('bar', 'abc', 'ABC')"), "BAr");
    assert!((number(&tree, "string-length('héllo')") - 5.0).abs() < f64::EPSILON);
    assert_eq!(string(&tree, "string(1 div 0)"), "Infinity");
    assert_eq!(string(&tree, "string(2.50)"), "2.5");
}

#[test]
fn test_boolean_and_number_functions() {
    let tree = parse(
        "<doc lang=\"en-GB\"><p><q>x</q></p><n>1</n><n>2.5</n></doc>",
    );
    assert!(boolean(&tree, "not(false())"));
    assert!(boolean(&tree, "boolean('0')"));
    assert!(!boolean(&tree, "boolean(0)"));
    assert!(boolean(&tree, "//q[lang('en')]"));
    assert!(!boolean(&tree, "//q[lang('e')]"));
    assert!((number(&tree, "sum(//n)") - 3.5).abs() < f64::EPSILON);
    assert!((number(&tree, "floor(-1.5)") + 2.0).abs() < f64::EPSILON);
    assert!((number(&tree, "ceiling(1.2)") - 2.0).abs() < f64::EPSILON);
    assert!((number(&tree, "round(2.5)") - 3.0).abs() < f64::EPSILON);
    assert!(number(&tree, "number('abc')").is_nan());
}

#[test]
fn test_bad_calls_fail_to_compile() {
    assert!(matches!(
        XPath::compile("position(1)"),
        Err(XPathError::Arity { found: 1, .. })
    ));
    assert!(matches!(
        XPath::compile("not()"),
        Err(XPathError::Arity { found: 0, .. })
    ));
    assert!(matches!(
        XPath::compile("//a[adumbrate()]"),
        Err(XPathError::UnknownFunction(name)) if name == "adumbrate"
    ));
}

// ========== results ==========

#[test]
fn test_find_value_converts_non_node_sets() {
    let tree = parse(ITEMS_DOC);
    assert_eq!(
        find_value("1 + 1", &tree, NodeId::ROOT).unwrap(),
        Some("2".to_string())
    );
    assert_eq!(find_value("//missing", &tree, NodeId::ROOT).unwrap(), None);
    assert!(matches!(
        find_values("1", &tree, NodeId::ROOT),
        Err(XPathError::Type { found: "number", .. })
    ));
    assert!(find_node("//missing", &tree, NodeId::ROOT).unwrap().is_none());
}

#[test]
fn test_compiled_expression_round_trips_its_source() {
    let xpath: XPath = "//item[@id = 2]".parse().unwrap();
    assert_eq!(xpath.source(), "//item[@id = 2]");
    assert_eq!(xpath.to_string(), "//item[@id = 2]");
}

#[test]
fn test_detached_subtree_root() {
    let mut tree = parse("<doc><a id=\"x\"><b id=\"y\"/></a></doc>");
    let a = find_node("//a", &tree, NodeId::ROOT)
        .unwrap()
        .and_then(XPathNode::node_id)
        .unwrap();
    tree.detach(a);
    assert!(ids(&tree, "//a").is_empty());
    // From inside the detached subtree, `/` is the top of that subtree.
    assert_eq!(ids_from(&tree, "//*", a), ["y"]);
    assert_eq!(ids_from(&tree, "/self::*", a), ["x"]);
}
