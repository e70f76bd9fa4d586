use braid::action::{arg, kwarg, set_var, var};
use braid::parser::{alpha, eps, lit, optional, text, ParseConfig, ParseState, Parser};
use braid::rule::{Grammar, Rule};
use braid::{AttrType, Fault, Value};

fn parse(parser: impl Into<Parser>, input: &str) -> Result<Option<Value>, Fault> {
    braid::parse(&parser.into(), input).map(|parsed| parsed.value)
}

#[test]
fn invoking_unbound_rule_faults() {
    let rule = Rule::new("expr");
    assert_eq!(
        parse(&rule, "x"),
        Err(Fault::UnboundRule {
            name: "expr".to_string()
        })
    );
    assert!(!rule.is_bound());
}

#[test]
fn bound_rule_parses_its_body() {
    let rule = Rule::new("word");
    rule.bind(text("hello")).unwrap();
    assert!(rule.is_bound());
    assert_eq!(parse(&rule, "hello"), Ok(Some(Value::from("hello"))));
}

#[test]
fn rebinding_replaces_body() {
    let rule = Rule::new("word");
    rule.bind(text("a")).unwrap();
    rule.bind(text("b")).unwrap();
    assert_eq!(parse(&rule, "a"), Ok(None));
    assert_eq!(parse(&rule, "b"), Ok(Some(Value::from("b"))));
}

#[test]
fn typed_bind_rejects_mismatch() {
    let tag = Rule::typed("tag", AttrType::String);
    assert_eq!(
        tag.bind(lit("<")),
        Err(Fault::AttrTypeMismatch {
            rule: "tag".to_string(),
            expected: AttrType::String,
            found: AttrType::Unused,
        })
    );
    assert!(!tag.is_bound());

    tag.bind(lit("<") + text("a") + lit(">")).unwrap();
    assert_eq!(tag.attr_type(), Ok(AttrType::String));
}

#[test]
fn typed_rule_keeps_its_shape_without_optional_match() {
    let tag = Rule::typed("tag", AttrType::String);
    tag.bind(lit("<") + text("a") + optional(lit(" ")) + lit(">"))
        .unwrap();
    assert_eq!(parse(&tag, "<a>"), Ok(Some(Value::from("a"))));
    assert_eq!(parse(&tag, "<a >"), Ok(Some(Value::from("a"))));
}

#[test]
fn inferred_type_of_recursive_rule() {
    // list := "a" list?
    let list = Rule::new("list");
    list.bind(text("a") + optional(&list)).unwrap();
    assert_eq!(list.attr_type(), Ok(AttrType::Tuple));
}

#[test]
fn dropped_rule_faults_at_call_site() {
    let parser = {
        let rule = Rule::new("gone");
        rule.bind(text("a")).unwrap();
        rule.as_parser()
    };
    assert_eq!(
        parse(parser, "a"),
        Err(Fault::RuleDropped {
            name: "gone".to_string()
        })
    );
}

#[test]
fn recursion_limit() {
    let rule = Rule::new("left");
    rule.bind(rule.as_parser() + "a" | lit("a")).unwrap();
    let config = ParseConfig::new().max_depth(16);
    assert_eq!(
        braid::parse_with(&rule.as_parser(), "aaa", config),
        Err(Fault::RecursionLimit {
            name: "left".to_string(),
            limit: 16
        })
    );
}

#[test]
fn positional_arguments() {
    let greet = Rule::new("greet");
    greet.bind(text(arg(0))).unwrap();
    assert_eq!(
        parse(greet.call().arg("hi"), "hi"),
        Ok(Some(Value::from("hi")))
    );
    assert_eq!(parse(greet.call().arg("hi"), "ho"), Ok(None));
}

#[test]
fn keyword_arguments() {
    let pair = Rule::new("pair");
    pair.bind(text(arg(0)) + lit(kwarg("sep")) + text(arg(1)))
        .unwrap();
    let call = pair.call().arg("a").arg("b").kwarg("sep", ",");
    assert_eq!(
        parse(call, "a,b"),
        Ok(Some(Value::tuple([Value::from("a"), Value::from("b")])))
    );
}

#[test]
fn actions_see_keyword_arguments_of_the_rule() {
    let tagged = Rule::new("tagged");
    tagged.bind(eps() >> kwarg("tag")).unwrap();
    assert_eq!(
        parse(tagged.call().kwarg("tag", 7), ""),
        Ok(Some(Value::Int(7)))
    );
}

#[test]
fn variables_are_visible_to_nested_calls() {
    let reader = Rule::new("reader");
    reader.bind(eps() >> var("x")).unwrap();

    let outer = Rule::new("outer");
    outer
        .bind((text("a") >> set_var("x", arg(0))) + &reader)
        .unwrap();
    assert_eq!(
        parse(&outer, "a"),
        Ok(Some(Value::tuple([Value::from("a"), Value::from("a")])))
    );
}

#[test]
fn variables_do_not_leak_to_siblings() {
    let setter = Rule::new("setter");
    setter.bind(alpha() >> set_var("x", arg(0))).unwrap();
    let reader = Rule::new("reader");
    reader.bind(eps() >> var("x")).unwrap();

    let top = Rule::new("top");
    top.bind(setter.as_parser() + &reader).unwrap();
    assert_eq!(
        parse(&top, "a"),
        Err(Fault::UnknownVariable {
            name: "x".to_string()
        })
    );
}

#[test]
fn variables_do_not_leak_to_callers() {
    let setter = Rule::new("setter");
    setter.bind(alpha() >> set_var("x", arg(0))).unwrap();

    let top = Rule::new("top");
    top.bind(setter.as_parser() + (eps() >> var("x"))).unwrap();
    assert!(matches!(
        parse(&top, "a"),
        Err(Fault::UnknownVariable { .. })
    ));
}

#[test]
fn arguments_are_evaluated_in_the_caller() {
    let echo = Rule::new("echo");
    echo.bind(text(arg(0))).unwrap();

    let top = Rule::new("top");
    top.bind((alpha() >> set_var("c", arg(0))) + echo.call().arg(var("c")))
        .unwrap();
    assert_eq!(
        parse(&top, "xx"),
        Ok(Some(Value::tuple([Value::from("x"), Value::from("x")])))
    );
    assert_eq!(parse(&top, "xy"), Ok(None));
}

#[test]
fn scopes_close_after_failure() {
    let rule = Rule::new("r");
    rule.bind(text("a") + text("b")).unwrap();
    let mut state = ParseState::new("ax");
    assert_eq!(rule.parse(&mut state), Ok(None));
    assert!(state.scopes().is_empty());
    assert_eq!(state.position(), 0);
}

#[test]
fn grammar_shares_rules_by_name() {
    let mut grammar = Grammar::new();
    let expr = grammar.rule("expr");
    let digit = grammar.typed_rule("digit", AttrType::String);
    digit.bind(text("1")).unwrap();
    assert_eq!(
        grammar.verify(),
        Err(Fault::UnboundRule {
            name: "expr".to_string()
        })
    );

    expr.bind(&digit).unwrap();
    assert!(grammar.rule("expr").is_bound());
    assert_eq!(grammar.verify(), Ok(()));
    assert_eq!(grammar.len(), 2);
    assert_eq!(
        grammar.get("digit").map(Rule::expected),
        Some(Some(AttrType::String))
    );
    assert_eq!(
        parse(grammar.rule("expr").as_parser(), "1"),
        Ok(Some(Value::from("1")))
    );
}
