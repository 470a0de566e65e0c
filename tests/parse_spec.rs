/// Spec tests for the annotation grammar.
///
/// Round-trips parsed expressions through `display` and pins down the error
/// cases a declaration author is likely to hit.
use argtype::parse::parse_type;

fn round_trip(src: &str) {
    let ty = parse_type(src).expect("should parse");
    assert_eq!(ty.display(), src, "display diverged from input");
    assert_eq!(parse_type(&ty.display()).unwrap(), ty, "reparse diverged");
}

#[test]
fn canonical_annotations_round_trip() {
    round_trip("Number");
    round_trip("String");
    round_trip("Boolean");
    round_trip("Function");
    round_trip("Any");
    round_trip("Number | String");
    round_trip("[Number, String]");
    round_trip("[Number * 10]");
    round_trip("[...Number]");
    round_trip("{x: Number, y: Number}");
    round_trip("Vector");
    round_trip("[Number, [Number, [Number]]]");
    round_trip("{pos: {x: Number, y: Number}, tags: [...String]}");
    round_trip("[Number | String * 3]");
}

#[test]
fn whitespace_is_insignificant() {
    assert_eq!(
        parse_type("  [ Number*10 ]  ").unwrap(),
        parse_type("[Number * 10]").unwrap()
    );
    assert_eq!(
        parse_type("{x:Number,y:Number}").unwrap(),
        parse_type("{x: Number, y: Number}").unwrap()
    );
}

#[test]
fn bool_is_an_accepted_spelling_of_boolean() {
    assert_eq!(parse_type("Bool").unwrap(), parse_type("Boolean").unwrap());
}

#[test]
fn zero_repetition_counts_parse() {
    assert_eq!(parse_type("[Number * 0]").unwrap().display(), "[Number * 0]");
}

#[test]
fn errors_carry_a_column() {
    let err = parse_type("Number !").unwrap_err();
    assert_eq!(err.col, 8);
    assert!(err.to_string().contains("column 8"));
}

#[test]
fn lowercase_unknowns_are_rejected() {
    assert!(parse_type("number").is_err());
    assert!(parse_type("{x: string}").is_err());
}

#[test]
fn duplicate_shape_fields_are_rejected() {
    let err = parse_type("{x: Number, x: String}").unwrap_err();
    assert!(err.msg.contains("duplicate field 'x'"));
}

#[test]
fn unterminated_constructs_are_rejected() {
    assert!(parse_type("[Number, String").is_err());
    assert!(parse_type("{x: Number").is_err());
    assert!(parse_type("[Number * ]").is_err());
    assert!(parse_type("Number |").is_err());
}
