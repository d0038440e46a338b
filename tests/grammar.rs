use std::mem::discriminant;

use mini::{Document, ParseError, Position};
use proptest::prelude::*;
use rstest::rstest;

const AT: Position = Position { line: 0, column: 0 };

#[rstest]
#[case("[html page]\n", ParseError::InvalidSection { at: AT, found: ' ' })]
#[case("[htmlPage]\n", ParseError::InvalidSection { at: AT, found: 'P' })]
#[case("[1html]\n", ParseError::InvalidSection { at: AT, found: '1' })]
#[case("[]\n", ParseError::InvalidSection { at: AT, found: ']' })]
#[case("[S]\n", ParseError::InvalidSection { at: AT, found: 'S' })]
#[case("[html]", ParseError::UnexpectedEof { at: AT })]
#[case("[html", ParseError::UnexpectedEof { at: AT })]
#[case("[html]\n]", ParseError::InvalidChar { at: AT, found: ']' })]
#[case("[html]\nkey\n", ParseError::InvalidKey { at: AT, found: '\n' })]
#[case("[html]\nkey=value\n", ParseError::InvalidKey { at: AT, found: '=' })]
#[case("[html]\nKEY = value\n", ParseError::InvalidChar { at: AT, found: 'K' })]
#[case("[html]\n1key = value\n", ParseError::InvalidChar { at: AT, found: '1' })]
#[case("[html]\nkey= value\n", ParseError::InvalidKey { at: AT, found: '=' })]
#[case("[html]\nkey =value\n", ParseError::ExpectedSpace { at: AT, found: 'v' })]
#[case("[html]\nkey = value", ParseError::UnexpectedEof { at: AT })]
#[case("[html]\nkey  = value\n", ParseError::ExpectedEqual { at: AT, found: ' ' })]
#[case("[html]\nkey = value[html]\n[html]", ParseError::UnexpectedEof { at: AT })]
#[case("[html] # section\n", ParseError::ExpectedNewLine { at: AT, found: ' ' })]
#[case("# section\n[html]\nkey = 1\nkey2\n", ParseError::InvalidKey { at: AT, found: '\n' })]
#[case("[html]\nkey = \"bababababayka\nbrrry\"\n", ParseError::InvalidKey { at: AT, found: '"' })]
#[case(" [html]\n", ParseError::LeadingSpace { at: AT })]
#[case("[html]\n key = value\n", ParseError::LeadingSpace { at: AT })]
#[case("[html]\n = value\n", ParseError::LeadingSpace { at: AT })]
#[case("[html]\n\tkey = value\n", ParseError::LeadingSpace { at: AT })]
#[case("key = value\n", ParseError::RootSectionExpected { at: AT })]
#[case("# comment\nkey = value\n", ParseError::RootSectionExpected { at: AT })]
#[case("# unterminated comment", ParseError::UnexpectedEof { at: AT })]
fn rejects(#[case] input: &str, #[case] expected: ParseError) {
    let err = Document::parse(input).expect_err("input is malformed");

    assert_eq!(discriminant(&err), discriminant(&expected), "{input:?}: {err}");

    // Compare everything except the position.
    let found = |e: &ParseError| match *e {
        ParseError::InvalidChar { found, .. }
        | ParseError::ExpectedNewLine { found, .. }
        | ParseError::InvalidSection { found, .. }
        | ParseError::InvalidKey { found, .. }
        | ParseError::ExpectedEqual { found, .. }
        | ParseError::ExpectedSpace { found, .. } => Some(found),
        _ => None,
    };
    assert_eq!(found(&err), found(&expected), "{input:?}: {err}");
}

#[test]
fn error_positions_are_one_based() {
    let err = Document::parse("[html]\n\n  key = value\n").expect_err("leading space");

    assert_eq!(err.position(), Position { line: 3, column: 1 });
}

#[test]
fn order_is_preserved() {
    let doc = Document::parse(
        "[core]\nid = a\n[extra]\n[core]\nid = b\nid = c\n# skip\n\n[core]\n",
    )
    .expect("failed to parse hardcoded input");

    let names = doc.sections().iter().map(|s| s.name()).collect::<Vec<_>>();
    assert_eq!(names, ["core", "extra"]);

    let core = doc.records("core");
    assert_eq!(core.len(), 3);
    assert_eq!(core[0].values("id"), ["a"]);
    assert_eq!(core[1].values("id"), ["b", "c"]);
    assert!(core[2].is_empty());
    assert!(doc.records("extra")[0].is_empty());
}

fn varname() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}

fn value() -> impl Strategy<Value = String> {
    "[^\n]{0,16}"
}

prop_compose! {
    fn section()(
        name in varname(),
        lines in prop::collection::vec((varname(), value()), 0..6),
    ) -> (String, Vec<(String, String)>) {
        (name, lines)
    }
}

fn render(sections: &[(String, Vec<(String, String)>)]) -> String {
    let mut text = String::new();
    for (name, lines) in sections {
        text.push_str(&format!("[{name}]\n"));
        for (key, value) in lines {
            text.push_str(&format!("{key} = {value}\n"));
        }
    }
    text
}

proptest! {
    #[test]
    fn parsing_is_deterministic(sections in prop::collection::vec(section(), 0..5)) {
        let text = render(&sections);

        let first = Document::parse(&text).expect("generated input is well formed");
        let second = Document::parse(&text).expect("generated input is well formed");

        prop_assert_eq!(first, second);
    }

    #[test]
    fn records_and_values_keep_file_order(sections in prop::collection::vec(section(), 0..5)) {
        let text = render(&sections);
        let doc = Document::parse(&text).expect("generated input is well formed");

        for (name, _) in &sections {
            let expected = sections.iter().filter(|(n, _)| n == name).collect::<Vec<_>>();
            let records = doc.records(name);
            prop_assert_eq!(records.len(), expected.len());

            for (record, (_, lines)) in records.iter().zip(expected) {
                for (key, _) in lines {
                    let want = lines
                        .iter()
                        .filter(|(k, _)| k == key)
                        .map(|(_, v)| v.as_str())
                        .collect::<Vec<_>>();
                    prop_assert_eq!(record.values(key), want.as_slice());
                }
            }
        }
    }
}
