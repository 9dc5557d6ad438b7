//! XPath subset parser and evaluator
//!
//! Implements the expression dialect the synthesis strategies emit:
//! absolute `/` and `//` paths, explicit axes (`ancestor`, `parent`,
//! `descendant`, `following-sibling`, `preceding-sibling`, `self`),
//! attribute and text predicates (`@a='v'`, `contains(...)`, `text()`,
//! `normalize-space(...)`, `.`), `local-name()`, positional predicates,
//! whole-path indexing `( ... )[k]`, `concat(...)` literals, and a ` >>> `
//! separator that pierces shadow scopes segment by segment.
//!
//! Evaluation is defined over any `TreeAdapter`, so the same oracle serves
//! virtual fixtures and any future live-tree backend.

use std::collections::HashSet;

use tracing::trace;

use crate::errors::OracleError;
use crate::ports::{EvalOracle, NodeId, TreeAdapter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
    Parent,
    Ancestor,
    FollowingSibling,
    PrecedingSibling,
    SelfAxis,
}

#[derive(Clone, Debug)]
enum NodeTest {
    Any,
    Tag(String),
}

#[derive(Clone, Copy, Debug)]
enum ValueRef {
    Attr,
    DirectText,
    FullText,
}

#[derive(Clone, Debug)]
enum Cond {
    Position(usize),
    AttrExists(String),
    AttrEq(String, String),
    Contains {
        target: ValueRef,
        attr: Option<String>,
        needle: String,
    },
    TextEq(String),
    NormTextEq(String),
    NormFullEq(String),
    FullEq(String),
    LocalNameEq(String),
}

#[derive(Clone, Debug)]
struct Step {
    axis: Axis,
    deep: bool,
    test: NodeTest,
    preds: Vec<Vec<Cond>>,
}

#[derive(Clone, Debug)]
struct PathExpr {
    absolute: bool,
    steps: Vec<Step>,
    index: Option<usize>,
}

/// Oracle over a `TreeAdapter`, stateless apart from the borrowed tree
pub struct XPathOracle<'a> {
    adapter: &'a dyn TreeAdapter,
}

impl<'a> XPathOracle<'a> {
    pub fn new(adapter: &'a dyn TreeAdapter) -> Self {
        Self { adapter }
    }
}

impl<'a> EvalOracle for XPathOracle<'a> {
    fn evaluate(&self, expression: &str, scope: NodeId) -> Result<Vec<NodeId>, OracleError> {
        let segments = split_shadow_segments(expression);
        if segments.is_empty() {
            return Err(OracleError::syntax(expression, "empty expression"));
        }

        let mut scope = scope;
        for (i, segment) in segments.iter().enumerate() {
            let path = parse_path(segment)
                .map_err(|reason| OracleError::syntax(expression, reason))?;
            let matches = eval_path(self.adapter, &path, scope);
            trace!(segment = %segment, matched = matches.len(), "segment evaluated");
            if i + 1 == segments.len() {
                return Ok(matches);
            }
            // Intermediate segments resolve the next shadow host in the chain
            let host = matches
                .into_iter()
                .find(|&node| self.adapter.shadow_root(node).is_some());
            scope = match host.and_then(|h| self.adapter.shadow_root(h)) {
                Some(root) => root,
                None => return Ok(Vec::new()),
            };
        }
        Ok(Vec::new())
    }
}

/// Split on the shadow-piercing separator, honoring quoted literals
fn split_shadow_segments(expression: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let chars: Vec<char> = expression.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) if c == q => quote = None,
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == '>' && chars.get(i + 1) == Some(&'>') && chars.get(i + 2) == Some(&'>') => {
                segments.push(current.trim().to_string());
                current = String::new();
                i += 3;
                continue;
            }
            _ => {}
        }
        current.push(c);
        i += 1;
    }
    let tail = current.trim().to_string();
    if !tail.is_empty() || segments.is_empty() {
        segments.push(tail);
    }
    segments.retain(|s| !s.is_empty());
    segments
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    src: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            src,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        let mut probe = self.pos;
        for expected in s.chars() {
            if self.chars.get(probe).copied() != Some(expected) {
                return false;
            }
            probe += 1;
        }
        self.pos = probe;
        true
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn expect(&mut self, c: char) -> Result<(), String> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(format!(
                "expected '{}' at offset {} in '{}'",
                c, self.pos, self.src
            ))
        }
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        name
    }

    fn read_number(&mut self) -> Option<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .parse()
            .ok()
    }

    /// Quoted literal or `concat('a', "b", ...)`
    fn read_literal(&mut self) -> Result<String, String> {
        self.skip_ws();
        if self.eat_str("concat(") {
            let mut out = String::new();
            loop {
                out.push_str(&self.read_quoted()?);
                self.skip_ws();
                if self.eat(',') {
                    continue;
                }
                self.expect(')')?;
                return Ok(out);
            }
        }
        self.read_quoted()
    }

    fn read_quoted(&mut self) -> Result<String, String> {
        self.skip_ws();
        let quote = match self.peek() {
            Some(c @ ('\'' | '"')) => c,
            _ => return Err(format!("expected string literal in '{}'", self.src)),
        };
        self.pos += 1;
        let mut out = String::new();
        while let Some(c) = self.bump() {
            if c == quote {
                return Ok(out);
            }
            out.push(c);
        }
        Err(format!("unterminated literal in '{}'", self.src))
    }
}

fn parse_path(src: &str) -> Result<PathExpr, String> {
    let mut cur = Cursor::new(src.trim());
    if cur.at_end() {
        return Err("empty path".to_string());
    }

    // Whole-path index: ( path )[k]
    if cur.peek() == Some('(') {
        cur.bump();
        let mut depth = 1usize;
        let start = cur.pos;
        let mut quote: Option<char> = None;
        while let Some(c) = cur.peek() {
            match quote {
                Some(q) if c == q => quote = None,
                None if c == '\'' || c == '"' => quote = Some(c),
                None if c == '(' => depth += 1,
                None if c == ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            cur.pos += 1;
        }
        if depth != 0 {
            return Err(format!("unbalanced parentheses in '{}'", src));
        }
        let inner: String = cur.chars[start..cur.pos].iter().collect();
        cur.expect(')')?;
        cur.expect('[')?;
        let index = cur
            .read_number()
            .ok_or_else(|| format!("expected index in '{}'", src))?;
        cur.expect(']')?;
        cur.skip_ws();
        if !cur.at_end() {
            return Err(format!("trailing input after indexed path in '{}'", src));
        }
        let mut path = parse_path(&inner)?;
        if path.index.is_some() {
            return Err("nested indexed paths are not supported".to_string());
        }
        path.index = Some(index);
        return Ok(path);
    }

    let mut steps = Vec::new();
    let mut absolute = false;
    let mut deep = if cur.eat_str("//") {
        true
    } else if cur.eat('/') {
        absolute = true;
        false
    } else {
        // Relative paths are evaluated from the scope node
        false
    };

    loop {
        steps.push(parse_step(&mut cur, deep)?);
        cur.skip_ws();
        if cur.at_end() {
            break;
        }
        deep = if cur.eat_str("//") {
            true
        } else if cur.eat('/') {
            false
        } else {
            return Err(format!(
                "unexpected character '{}' at offset {} in '{}'",
                cur.peek().unwrap_or(' '),
                cur.pos,
                src
            ));
        };
    }

    Ok(PathExpr {
        absolute,
        steps,
        index: None,
    })
}

fn parse_step(cur: &mut Cursor<'_>, deep: bool) -> Result<Step, String> {
    cur.skip_ws();
    let mut axis = Axis::Child;
    for (name, parsed) in [
        ("following-sibling::", Axis::FollowingSibling),
        ("preceding-sibling::", Axis::PrecedingSibling),
        ("ancestor::", Axis::Ancestor),
        ("descendant::", Axis::Descendant),
        ("parent::", Axis::Parent),
        ("self::", Axis::SelfAxis),
        ("child::", Axis::Child),
    ] {
        if cur.eat_str(name) {
            axis = parsed;
            break;
        }
    }

    let test = if cur.eat('*') {
        NodeTest::Any
    } else {
        let name = cur.read_name();
        if name.is_empty() {
            return Err(format!("expected node test at offset {}", cur.pos));
        }
        NodeTest::Tag(name.to_ascii_lowercase())
    };

    let mut preds = Vec::new();
    while cur.peek() == Some('[') {
        cur.bump();
        preds.push(parse_conditions(cur)?);
        cur.expect(']')?;
    }

    Ok(Step {
        axis,
        deep,
        test,
        preds,
    })
}

fn parse_conditions(cur: &mut Cursor<'_>) -> Result<Vec<Cond>, String> {
    let mut conds = vec![parse_condition(cur)?];
    loop {
        cur.skip_ws();
        if cur.eat_str("and") {
            conds.push(parse_condition(cur)?);
        } else {
            return Ok(conds);
        }
    }
}

fn parse_condition(cur: &mut Cursor<'_>) -> Result<Cond, String> {
    cur.skip_ws();

    if let Some(n) = cur.read_number() {
        return Ok(Cond::Position(n));
    }

    if cur.eat('@') {
        let name = cur.read_name();
        cur.skip_ws();
        if cur.eat('=') {
            let value = cur.read_literal()?;
            return Ok(Cond::AttrEq(name, value));
        }
        return Ok(Cond::AttrExists(name));
    }

    if cur.eat_str("contains(") {
        cur.skip_ws();
        let (target, attr) = if cur.eat('@') {
            (ValueRef::Attr, Some(cur.read_name()))
        } else if cur.eat_str("text()") {
            (ValueRef::DirectText, None)
        } else if cur.eat('.') {
            (ValueRef::FullText, None)
        } else {
            return Err("unsupported contains() argument".to_string());
        };
        cur.skip_ws();
        cur.expect(',')?;
        let needle = cur.read_literal()?;
        cur.skip_ws();
        cur.expect(')')?;
        return Ok(Cond::Contains {
            target,
            attr,
            needle,
        });
    }

    if cur.eat_str("normalize-space(") {
        cur.skip_ws();
        let full = if cur.eat_str("text()") {
            false
        } else if cur.eat('.') {
            true
        } else {
            return Err("unsupported normalize-space() argument".to_string());
        };
        cur.skip_ws();
        cur.expect(')')?;
        cur.skip_ws();
        cur.expect('=')?;
        let value = cur.read_literal()?;
        return Ok(if full {
            Cond::NormFullEq(value)
        } else {
            Cond::NormTextEq(value)
        });
    }

    if cur.eat_str("text()") {
        cur.skip_ws();
        cur.expect('=')?;
        let value = cur.read_literal()?;
        return Ok(Cond::TextEq(value));
    }

    if cur.eat_str("local-name()") {
        cur.skip_ws();
        cur.expect('=')?;
        let value = cur.read_literal()?;
        return Ok(Cond::LocalNameEq(value.to_ascii_lowercase()));
    }

    if cur.eat('.') {
        cur.skip_ws();
        cur.expect('=')?;
        let value = cur.read_literal()?;
        return Ok(Cond::FullEq(value));
    }

    Err(format!("unsupported predicate at offset {}", cur.pos))
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn eval_path(adapter: &dyn TreeAdapter, path: &PathExpr, scope: NodeId) -> Vec<NodeId> {
    let mut context = vec![scope];
    for (i, step) in path.steps.iter().enumerate() {
        let first = i == 0;
        let mut next = Vec::new();
        let mut seen = HashSet::new();
        for &ctx in &context {
            let candidates = axis_nodes(adapter, step, ctx, first, path.absolute);
            let filtered = apply_step(adapter, step, candidates);
            for node in filtered {
                if seen.insert(node) {
                    next.push(node);
                }
            }
        }
        context = next;
        if context.is_empty() {
            break;
        }
    }

    match path.index {
        Some(k) => context
            .get(k.saturating_sub(1))
            .copied()
            .map(|n| vec![n])
            .unwrap_or_default(),
        None => context,
    }
}

fn axis_nodes(
    adapter: &dyn TreeAdapter,
    step: &Step,
    ctx: NodeId,
    first: bool,
    absolute: bool,
) -> Vec<NodeId> {
    match step.axis {
        Axis::Child if step.deep => {
            // `//x` from the conceptual document node includes the scope
            // element itself; every later `//` covers descendants only
            let mut out = Vec::new();
            if first {
                out.push(ctx);
            }
            collect_descendants(adapter, ctx, &mut out);
            out
        }
        Axis::Child => {
            if first && absolute {
                // `/html/...`: the document's only element child is the root
                vec![ctx]
            } else {
                adapter.children(ctx)
            }
        }
        Axis::Descendant => {
            let mut out = Vec::new();
            collect_descendants(adapter, ctx, &mut out);
            out
        }
        Axis::Parent => adapter.parent(ctx).into_iter().collect(),
        Axis::Ancestor => {
            // Nearest first, so `ancestor::div[1]` is the closest div
            let mut out = Vec::new();
            let mut current = ctx;
            while let Some(parent) = adapter.parent(current) {
                out.push(parent);
                current = parent;
            }
            out
        }
        Axis::FollowingSibling => siblings(adapter, ctx, true),
        Axis::PrecedingSibling => siblings(adapter, ctx, false),
        Axis::SelfAxis => vec![ctx],
    }
}

fn collect_descendants(adapter: &dyn TreeAdapter, node: NodeId, out: &mut Vec<NodeId>) {
    for child in adapter.children(node) {
        out.push(child);
        collect_descendants(adapter, child, out);
    }
}

fn siblings(adapter: &dyn TreeAdapter, node: NodeId, following: bool) -> Vec<NodeId> {
    let parent = match adapter.parent(node) {
        Some(p) => p,
        None => return Vec::new(),
    };
    let all = adapter.children(parent);
    let pos = match all.iter().position(|&c| c == node) {
        Some(p) => p,
        None => return Vec::new(),
    };
    if following {
        all[pos + 1..].to_vec()
    } else {
        // Reverse axis: nearest preceding sibling first
        let mut before = all[..pos].to_vec();
        before.reverse();
        before
    }
}

fn apply_step(adapter: &dyn TreeAdapter, step: &Step, candidates: Vec<NodeId>) -> Vec<NodeId> {
    let mut current: Vec<NodeId> = candidates
        .into_iter()
        .filter(|&node| test_matches(adapter, &step.test, node))
        .collect();

    for conds in &step.preds {
        // A position inside a conjunction applies to the list as filtered
        // so far, matching XPath's left-to-right predicate semantics
        if let Some(Cond::Position(k)) = conds
            .iter()
            .find(|c| matches!(c, Cond::Position(_)))
            .cloned()
        {
            let value_conds: Vec<&Cond> = conds
                .iter()
                .filter(|c| !matches!(c, Cond::Position(_)))
                .collect();
            current.retain(|&node| value_conds.iter().all(|c| cond_matches(adapter, c, node)));
            current = current
                .get(k.saturating_sub(1))
                .copied()
                .map(|n| vec![n])
                .unwrap_or_default();
        } else {
            current.retain(|&node| conds.iter().all(|c| cond_matches(adapter, c, node)));
        }
    }
    current
}

fn test_matches(adapter: &dyn TreeAdapter, test: &NodeTest, node: NodeId) -> bool {
    let tag = match adapter.tag(node) {
        Some(t) => t,
        None => return false,
    };
    // Scope fragment roots are not addressable elements
    if tag.starts_with('#') {
        return false;
    }
    match test {
        NodeTest::Any => true,
        NodeTest::Tag(expected) => tag == *expected,
    }
}

fn cond_matches(adapter: &dyn TreeAdapter, cond: &Cond, node: NodeId) -> bool {
    match cond {
        Cond::Position(_) => true,
        Cond::AttrExists(name) => adapter.attribute(node, name).is_some(),
        Cond::AttrEq(name, value) => adapter.attribute(node, name).as_deref() == Some(value),
        Cond::Contains {
            target,
            attr,
            needle,
        } => match target {
            ValueRef::Attr => attr
                .as_ref()
                .and_then(|a| adapter.attribute(node, a))
                .map(|v| v.contains(needle))
                .unwrap_or(false),
            ValueRef::DirectText => adapter.direct_text(node).contains(needle),
            ValueRef::FullText => adapter.full_text(node).contains(needle),
        },
        // Fixtures carry pre-trimmed or raw text; accept either form so
        // generation and validation agree
        Cond::TextEq(value) => {
            let text = adapter.direct_text(node);
            text == *value || text.trim() == value.as_str()
        }
        Cond::NormTextEq(value) => normalize_space(&adapter.direct_text(node)) == *value,
        Cond::NormFullEq(value) => normalize_space(&adapter.full_text(node)) == *value,
        Cond::FullEq(value) => {
            let text = adapter.full_text(node);
            text == *value || text.trim() == value.as_str()
        }
        Cond::LocalNameEq(value) => adapter
            .tag(node)
            .map(|t| t == *value)
            .unwrap_or(false),
    }
}

/// XPath normalize-space: trim and collapse internal whitespace runs
pub fn normalize_space(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_tree::VirtualTree;

    fn fixture() -> VirtualTree {
        VirtualTree::from_json(
            r#"{
                "tag": "html",
                "children": [
                    { "tag": "body", "children": [
                        { "tag": "div", "attrs": { "id": "menu", "class": "nav main" }, "children": [
                            { "tag": "span", "text": "Active" },
                            { "tag": "span", "text": "Active" },
                            { "tag": "span", "text": "Done" }
                        ]},
                        { "tag": "button", "attrs": { "aria-label": "Close" }, "children": [
                            { "tag": "svg", "children": [
                                { "tag": "title", "text": "Close" },
                                { "tag": "path", "attrs": { "d": "M12 4L4 12" } }
                            ]}
                        ]},
                        { "tag": "label", "attrs": { "for": "email" }, "text": "Email" },
                        { "tag": "input", "attrs": { "name": "email", "type": "text" } }
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn eval(tree: &VirtualTree, expr: &str) -> Vec<NodeId> {
        XPathOracle::new(tree).evaluate(expr, tree.root()).unwrap()
    }

    #[test]
    fn test_descendant_and_attribute() {
        let tree = fixture();
        assert_eq!(eval(&tree, "//div[@id='menu']").len(), 1);
        assert_eq!(eval(&tree, "//span").len(), 3);
        assert_eq!(eval(&tree, "//*[@aria-label='Close']").len(), 1);
        assert!(eval(&tree, "//div[@id='nope']").is_empty());
    }

    #[test]
    fn test_text_predicates() {
        let tree = fixture();
        assert_eq!(eval(&tree, "//span[text()='Active']").len(), 2);
        assert_eq!(eval(&tree, "//span[normalize-space(text())='Done']").len(), 1);
        assert_eq!(eval(&tree, "(//span[text()='Active'])[2]").len(), 1);
        let second = eval(&tree, "(//span[text()='Active'])[2]")[0];
        let menu = tree.node_by_id("menu").unwrap();
        assert_eq!(tree.children(menu)[1], second);
    }

    #[test]
    fn test_class_contains_and_pair() {
        let tree = fixture();
        assert_eq!(eval(&tree, "//div[contains(@class,'nav')]").len(), 1);
        assert_eq!(
            eval(&tree, "//div[contains(@class,'nav') and contains(@class,'main')]").len(),
            1
        );
        assert!(eval(&tree, "//div[contains(@class,'nav') and contains(@class,'side')]").is_empty());
    }

    #[test]
    fn test_axes() {
        let tree = fixture();
        // label -> following input
        let found = eval(&tree, "//label[@for='email']/following-sibling::input[1]");
        assert_eq!(found.len(), 1);
        assert_eq!(tree.tag(found[0]).as_deref(), Some("input"));

        // nearest ancestor via reverse axis
        let found = eval(&tree, "//title/ancestor::*[local-name()='svg'][1]");
        assert_eq!(found.len(), 1);
        assert_eq!(tree.tag(found[0]).as_deref(), Some("svg"));

        // parent axis
        let found = eval(&tree, "//path/parent::svg");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_positional_path() {
        let tree = fixture();
        let found = eval(&tree, "//div[@id='menu']/span[3]");
        assert_eq!(found.len(), 1);
        assert_eq!(tree.direct_text(found[0]), "Done");

        let found = eval(&tree, "/html/body/div[1]/span[2]");
        assert_eq!(found.len(), 1);
        assert_eq!(tree.direct_text(found[0]), "Active");
    }

    #[test]
    fn test_scoped_evaluation() {
        let tree = fixture();
        let menu = tree.node_by_id("menu").unwrap();
        let oracle = XPathOracle::new(&tree);
        // Relative to the menu scope only
        let found = oracle.evaluate("//span[text()='Done']", menu).unwrap();
        assert_eq!(found.len(), 1);
        assert!(oracle.evaluate("//button", menu).unwrap().is_empty());
    }

    #[test]
    fn test_shadow_piercing() {
        let tree = VirtualTree::from_json(
            r##"{
                "tag": "html",
                "children": [
                    { "tag": "my-widget", "attrs": { "id": "w1" }, "shadow": {
                        "tag": "#fragment",
                        "children": [ { "tag": "button", "text": "Go" } ]
                    }}
                ]
            }"##,
        )
        .unwrap();
        let oracle = XPathOracle::new(&tree);
        let found = oracle
            .evaluate("//my-widget[@id='w1'] >>> //button[text()='Go']", tree.root())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(tree.tag(found[0]).as_deref(), Some("button"));
        // Shadow content is invisible to a plain document query
        assert!(oracle.evaluate("//button", tree.root()).unwrap().is_empty());
    }

    #[test]
    fn test_concat_literal() {
        let tree = VirtualTree::from_json(
            r#"{ "tag": "div", "children": [ { "tag": "span", "text": "it's \"here\"" } ] }"#,
        )
        .unwrap();
        let found = eval(&tree, r#"//span[text()=concat('it', "'", 's "here"')]"#);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_syntax_error_is_local() {
        let tree = fixture();
        let oracle = XPathOracle::new(&tree);
        let err = oracle.evaluate("//span[", tree.root()).unwrap_err();
        assert!(err.is_local());
        let err = oracle.evaluate("//span[starts-with(@x,'y')]", tree.root()).unwrap_err();
        assert!(matches!(err, OracleError::Syntax { .. }));
    }

    #[test]
    fn test_matches_contract() {
        let tree = fixture();
        let oracle = XPathOracle::new(&tree);
        let menu = tree.node_by_id("menu").unwrap();
        assert!(oracle.matches("//div[@id='menu']", tree.root(), menu));
        // Two matches is not a match
        let first_active = tree.children(menu)[0];
        assert!(!oracle.matches("//span[text()='Active']", tree.root(), first_active));
        // Malformed never matches
        assert!(!oracle.matches("//span[", tree.root(), first_active));
    }
}
