use jscst_cst::{Schema, build, project, reconstruct};
use jscst_errors::{Diagnostic, TextRange};
use jscst_inputs::File;
use jscst_parse::Parse;

use crate::{explain, report};

/// Runs the round-trip checks of every schema and returns how many failed.
pub(crate) fn run(schemas: &[Schema], file: &File, parse: &Parse) -> usize {
    let mut failures = 0;
    let mut texts = Vec::new();

    for schema in schemas {
        let strategy = schema.strategy().name();
        let _span = tracing::info_span!("check", strategy).entered();

        let cst = match build(schema, &parse.ast, &parse.tokens) {
            Ok(cst) => cst,
            Err(error) => {
                explain(file, &error);
                eprintln!("{strategy}: {error}");
                failures += 1;
                continue;
            }
        };

        let mut ok = true;
        match reconstruct(schema, &cst) {
            Ok(text) => {
                if text != file.text() {
                    report(file, &divergence(file.text(), &text, strategy));
                    ok = false;
                }
                texts.push((strategy, text));
            }
            Err(error) => {
                eprintln!("{strategy}: {error}");
                ok = false;
            }
        }

        match project(&cst) {
            Ok(ast) if ast == parse.ast => {}
            Ok(_) => {
                eprintln!("{strategy}: projection differs from the parsed AST");
                ok = false;
            }
            Err(error) => {
                eprintln!("{strategy}: {error}");
                ok = false;
            }
        }

        if ok {
            println!("ok {} ({strategy})", file.path());
        } else {
            failures += 1;
        }
    }

    if let Some(((first, expected), rest)) = texts.split_first() {
        for (strategy, text) in rest {
            if text != expected {
                eprintln!("{first} and {strategy} reconstruct different text");
                failures += 1;
            }
        }
    }

    failures
}

/// Points at the first byte where `actual` stops matching `expected`.
fn divergence(expected: &str, actual: &str, strategy: &str) -> Diagnostic {
    let offset = expected
        .char_indices()
        .zip(actual.chars())
        .find(|&((_, a), b)| a != b)
        .map_or(expected.len().min(actual.len()), |((offset, _), _)| offset);
    let offset = offset as u32;

    Diagnostic::error(
        format!("{strategy}: reconstructed text differs from the source"),
        TextRange::new(offset.into(), (offset + 1).into()),
    )
    .with_label("first difference")
}
