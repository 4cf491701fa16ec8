// Print/re-parse idempotence: rendering a parsed tree back to source and
// parsing it again reaches a fixed point after one round.

use pretty_assertions::assert_eq;
use stp_ast::source::program_to_source;
use tests::parse_ok;

fn round_trips(source: &str) {
    let first = program_to_source(&parse_ok(source));
    let second = program_to_source(&parse_ok(&first));
    assert_eq!(first, second, "printer not idempotent for:\n{source}");
}

#[test]
fn expressions_round_trip() {
    round_trips("a + b * c\n");
    round_trips("(a + b) * c\n");
    round_trips("a ^ b ^ c\n");
    round_trips("(a ^ b) ^ c\n");
    round_trips("-a' + ~b!\n");
    round_trips("not a == b\n");
    round_trips("(not a) and b\n");
    round_trips("x mod y mod z\n");
    round_trips("a .* b ./ c .^ d\n");
    round_trips("m @ m' & mask\n");
    round_trips("50% * amount\n");
}

#[test]
fn literals_round_trip() {
    round_trips("x = 1.50\n");
    round_trips("r = 1...2...10\n");
    round_trips("r = -3...0.5...3\n");
    round_trips("m = [1 2; 3 4]\n");
    round_trips("m = [1 (-2) (3 + 4)]\n");
    round_trips("s = \"plain\"\n");
    round_trips("s = \"tab\\there\"\n");
    round_trips("s = \"u\\x0041 o\\101\"\n");
    round_trips("s = \"x=\\{a + 1\\}\"\n");
}

#[test]
fn statements_round_trip() {
    round_trips("sym speed\n");
    round_trips("import linalg\n");
    round_trips("x = f(1, 2, scale = 3).norm\n");
    round_trips("if a { x = 1 } elseif b { x = 2 } else { x = 3 }\n");
    round_trips("while x < 10 { x = x + 1\n cont }\n");
    round_trips("for i in 1...10 { total = total + i\n break }\n");
    round_trips("fn f(a, b, c=1) { ret a }\n");
    round_trips("fn g(k=1) { ret k }\n");
    round_trips("# just a comment\n");
    round_trips("exit\n");
}

#[test]
fn a_whole_program_round_trips() {
    let source = "\
sym n\n\
total = 0\n\
for i in 1...100 {\n\
    total = total + i\n\
}\n\
msg = \"sum=\\{total\\}\"\n\
";
    round_trips(source);
}
